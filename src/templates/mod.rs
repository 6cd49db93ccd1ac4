//! Built-in page templates using the Tera template engine
//!
//! Templates and the stylesheet are embedded directly in the binary.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::{Post, PostMeta};
use crate::helpers::{long_date, post_url, short_date, url_for};
use crate::theme::{bootstrap_script, toggle_script};

/// Stylesheet shared by every page
pub const STYLESHEET: &str = include_str!("site/style.css");

/// File name of the stylesheet below the site root
pub const STYLESHEET_PATH: &str = "style.css";

/// Template renderer with the embedded site theme
pub struct TemplateRenderer {
    tera: Tera,
    config: ConfigData,
    theme: ThemeData,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("index.html", include_str!("site/index.html")),
            ("post.html", include_str!("site/post.html")),
            ("404.html", include_str!("site/404.html")),
            (
                "partials/toolbar.html",
                include_str!("site/partials/toolbar.html"),
            ),
        ])?;

        // Register custom filters
        tera.register_filter("long_date", long_date_filter);
        tera.register_filter("short_date", short_date_filter);

        Ok(Self {
            tera,
            config: ConfigData::from(config),
            theme: ThemeData::from(config),
        })
    }

    /// Render the post listing
    pub fn render_index(&self, posts: &[PostMeta]) -> Result<String> {
        let cards: Vec<PostCard> = posts
            .iter()
            .map(|meta| PostCard::new(meta, &self.config.root))
            .collect();

        let mut context = self.create_base_context(false);
        context.insert("posts", &cards);
        self.render("index.html", &context)
    }

    /// Render a post detail page around its already rendered body
    pub fn render_post(&self, post: &Post, content_html: &str) -> Result<String> {
        let mut context = self.create_base_context(true);
        context.insert("post", &post.meta);
        context.insert("content", content_html);
        self.render("post.html", &context)
    }

    /// Render the not-found page
    pub fn render_not_found(&self) -> Result<String> {
        let context = self.create_base_context(true);
        self.render("404.html", &context)
    }

    fn create_base_context(&self, show_back: bool) -> Context {
        let mut context = Context::new();
        context.insert("config", &self.config);
        context.insert("theme", &self.theme);
        context.insert("show_back", &show_back);
        context
    }

    fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: "January 5, 2024"
fn long_date_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("long_date", "value", String, value);
    Ok(tera::Value::String(long_date(&s)))
}

/// Tera filter: "Jan 5, 2024"
fn short_date_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("short_date", "value", String, value);
    Ok(tera::Value::String(short_date(&s)))
}

// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub description: String,
    pub language: String,
    pub root: String,
    pub style_url: String,
    pub default_theme: String,
}

impl From<&SiteConfig> for ConfigData {
    fn from(config: &SiteConfig) -> Self {
        let root = config.root_path();
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            language: config.language.clone(),
            style_url: url_for(&root, STYLESHEET_PATH),
            root,
            default_theme: config.default_theme.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ThemeData {
    pub toggle_label: String,
    pub bootstrap_script: String,
    pub toggle_script: String,
}

impl From<&SiteConfig> for ThemeData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            toggle_label: config.default_theme.toggle_label().to_string(),
            bootstrap_script: bootstrap_script(),
            toggle_script: toggle_script(config.default_theme),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub title: String,
    pub date: String,
    pub url: String,
    pub image: Option<String>,
    pub description: String,
}

impl PostCard {
    fn new(meta: &PostMeta, root: &str) -> Self {
        Self {
            title: meta.title.clone(),
            date: meta.date.clone(),
            url: post_url(root, &meta.slug),
            image: meta.image.clone(),
            description: meta.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;

    fn meta(slug: &str, date: &str, image: Option<&str>, description: &str) -> PostMeta {
        PostMeta {
            title: format!("Title of {}", slug),
            date: date.to_string(),
            slug: slug.to_string(),
            image: image.map(str::to_string),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_render_index_cards() {
        let renderer = TemplateRenderer::new(&SiteConfig::default()).unwrap();
        let html = renderer
            .render_index(&[
                meta("newer", "2024-06-02", Some("/images/posts/newer.jpg"), "About it"),
                meta("older", "2024-06-01", None, ""),
            ])
            .unwrap();

        assert!(html.contains(r#"href="/posts/newer""#));
        assert!(html.contains(r#"src="/images/posts/newer.jpg""#));
        assert!(html.contains("Jun 2, 2024"));
        assert!(html.contains(r#"<span class="card-description">About it</span>"#));
        assert_eq!(html.matches("card-description").count(), 1);
        assert!(html.find("Title of newer").unwrap() < html.find("Title of older").unwrap());
        assert!(!html.contains("Back to home"));
        assert!(html.contains("<title>log file</title>"));
    }

    #[test]
    fn test_render_post_page() {
        let renderer = TemplateRenderer::new(&SiteConfig::default()).unwrap();
        let post = Post {
            meta: meta("hello", "2024-01-05", None, ""),
            content: "# Hello".to_string(),
        };
        let html = renderer.render_post(&post, "<h1>Hello</h1>").unwrap();

        assert!(html.contains("<title>Title of hello — log file</title>"));
        assert!(html.contains("January 5, 2024"));
        assert!(html.contains("<h1>Hello</h1>"));
        assert!(html.contains("Back to home"));
    }

    #[test]
    fn test_titles_are_escaped() {
        let renderer = TemplateRenderer::new(&SiteConfig::default()).unwrap();
        let mut post_meta = meta("x", "", None, "");
        post_meta.title = "<script>alert(1)</script>".to_string();
        let html = renderer.render_index(&[post_meta]).unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
    }

    #[test]
    fn test_theme_bootstrap_in_head() {
        let config = SiteConfig {
            default_theme: Theme::Light,
            ..Default::default()
        };
        let renderer = TemplateRenderer::new(&config).unwrap();
        let html = renderer.render_not_found().unwrap();

        let head_end = html.find("</head>").unwrap();
        let bootstrap = html.find("localStorage.getItem('reader-theme')").unwrap();
        assert!(bootstrap < head_end);
        assert!(html.contains(r#"data-theme="light""#));
        assert!(html.contains(r#"aria-label="Switch to dark mode""#));
        assert!(html.contains("404"));
    }
}
