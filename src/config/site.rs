//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::theme::Theme;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub language: String,

    // URL
    pub root: String,

    // Directory
    pub posts_dir: String,
    pub public_dir: String,
    pub output_dir: String,

    // Writing
    pub new_post_name: String,

    // Rendering
    pub default_theme: Theme,
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub markdown: MarkdownConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "log file".to_string(),
            description: "A markdown blog.".to_string(),
            language: "en".to_string(),

            root: "/".to_string(),

            posts_dir: "posts".to_string(),
            public_dir: "public".to_string(),
            output_dir: "dist".to_string(),

            new_post_name: ":title.md".to_string(),

            default_theme: Theme::default(),
            highlight: HighlightConfig::default(),
            markdown: MarkdownConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        // An empty file deserializes to `null`, which should mean "all defaults"
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Site root with exactly one trailing slash, e.g. `/` or `/blog/`
    pub fn root_path(&self) -> String {
        let trimmed = self.root.trim_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", trimmed)
        }
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "github-dark".to_string(),
            line_number: false,
        }
    }
}

/// Markdown extension switches
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    pub tables: bool,
    pub task_lists: bool,
    pub autolinks: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            tables: true,
            task_lists: true,
            autolinks: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "log file");
        assert_eq!(config.posts_dir, "posts");
        assert_eq!(config.highlight.theme, "github-dark");
        assert_eq!(config.default_theme, Theme::Dark);
        assert!(config.markdown.autolinks);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Notes
root: /blog
default_theme: light
highlight:
  theme: github-light
markdown:
  autolinks: false
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Notes");
        assert_eq!(config.default_theme, Theme::Light);
        assert_eq!(config.highlight.theme, "github-light");
        assert!(!config.highlight.line_number);
        assert!(!config.markdown.autolinks);
        assert!(config.markdown.tables);
        assert_eq!(config.root_path(), "/blog/");
    }

    #[test]
    fn test_load_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "").unwrap();
        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.title, "log file");
        assert_eq!(config.root_path(), "/");
    }
}
