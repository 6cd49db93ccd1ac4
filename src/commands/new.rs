//! Create a new post

use anyhow::{bail, Result};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use crate::content::loader::is_safe_slug;
use crate::Site;

#[derive(Serialize)]
struct Scaffold<'a> {
    title: &'a str,
    date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

/// Create a new post in the posts directory and return its path
pub fn create_post(site: &Site, title: &str, description: Option<&str>) -> Result<PathBuf> {
    let now = chrono::Local::now();
    let slug = slug::slugify(title);

    let mut filename = site
        .config
        .new_post_name
        .replace(":title", &slug)
        .replace(":year", &now.format("%Y").to_string())
        .replace(":month", &now.format("%m").to_string())
        .replace(":day", &now.format("%d").to_string());
    if !filename.ends_with(".md") {
        filename.push_str(".md");
    }

    let stem = filename.trim_end_matches(".md");
    if !is_safe_slug(stem) {
        bail!("Invalid post file name: {:?}", filename);
    }

    fs::create_dir_all(&site.posts_dir)?;
    let file_path = site.posts_dir.join(&filename);

    // Check if file already exists
    if file_path.exists() {
        bail!("File already exists: {:?}", file_path);
    }

    let front_matter = serde_yaml::to_string(&Scaffold {
        title,
        date: now.format("%Y-%m-%d").to_string(),
        description,
    })?;
    fs::write(&file_path, format!("---\n{}---\n", front_matter))?;

    tracing::info!("Created: {:?}", file_path);
    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_post_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path()).unwrap();

        let path = create_post(&site, "Hello: A \"Quoted\" Title", Some("Short")).unwrap();
        assert_eq!(path, site.posts_dir.join("hello-a-quoted-title.md"));

        let post = site
            .repository()
            .get_by_slug("hello-a-quoted-title")
            .unwrap()
            .unwrap();
        assert_eq!(post.meta.title, "Hello: A \"Quoted\" Title");
        assert_eq!(post.meta.description, "Short");
        assert_eq!(post.meta.date.len(), "2024-01-01".len());
        assert_eq!(post.content, "");
    }

    #[test]
    fn test_create_post_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path()).unwrap();

        create_post(&site, "Twice", None).unwrap();
        assert!(create_post(&site, "Twice", None).is_err());
    }

    #[test]
    fn test_create_post_with_dated_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut site = Site::new(dir.path()).unwrap();
        site.config.new_post_name = ":year-:month-:day-:title".to_string();

        let path = create_post(&site, "Dated", None).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.ends_with("-dated.md"));
        assert_eq!(name.len(), "2024-01-01-dated.md".len());
    }
}
