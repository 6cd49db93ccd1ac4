//! List posts

use anyhow::Result;

use crate::content::PostMeta;
use crate::Site;

/// Print every post, newest first
pub fn run(site: &Site, json: bool) -> Result<()> {
    let posts = site.repository().list_all()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&posts)?);
    } else {
        print!("{}", format_listing(&posts));
    }

    Ok(())
}

fn format_listing(posts: &[PostMeta]) -> String {
    let mut out = format!("Posts ({}):\n", posts.len());
    for post in posts {
        let date = if post.date.is_empty() {
            "(undated)"
        } else {
            post.date.as_str()
        };
        out.push_str(&format!("  {} - {} [{}]\n", date, post.title, post.slug));
    }
    out
}
