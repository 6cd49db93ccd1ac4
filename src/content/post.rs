//! Post models

use serde::{Deserialize, Serialize};

use super::FrontMatter;

/// Listing metadata for a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMeta {
    /// Front-matter title, or the slug when none is given
    pub title: String,

    /// Front-matter date as written; empty when absent
    pub date: String,

    /// Filename minus the `.md` extension
    pub slug: String,

    /// Public URL of the cover image, if one exists
    pub image: Option<String>,

    pub description: String,
}

impl PostMeta {
    /// Build metadata from parsed front-matter, applying field defaults
    pub fn from_front_matter(slug: &str, fm: FrontMatter, image: Option<String>) -> Self {
        Self {
            title: fm.title.unwrap_or_else(|| slug.to_string()),
            date: fm.date.unwrap_or_default(),
            slug: slug.to_string(),
            image,
            description: fm.description.unwrap_or_default(),
        }
    }
}

/// A post with its raw markdown body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub meta: PostMeta,

    /// Markdown body with the front-matter block stripped
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_front_matter() {
        let meta = PostMeta::from_front_matter("hello-world", FrontMatter::default(), None);
        assert_eq!(meta.title, "hello-world");
        assert_eq!(meta.date, "");
        assert_eq!(meta.description, "");
        assert_eq!(meta.image, None);
    }
}
