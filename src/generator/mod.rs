//! Generator module - renders pages and writes the static site

use anyhow::{Context as _, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::content::{MarkdownRenderer, PostMeta, PostRepository, RenderOptions};
use crate::templates::{TemplateRenderer, STYLESHEET, STYLESHEET_PATH};
use crate::Site;

/// Renders pages straight from the post repository. Nothing is cached:
/// every call reads the posts directory again.
pub struct Generator {
    site: Site,
    repository: PostRepository,
    markdown: MarkdownRenderer,
    templates: TemplateRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Site) -> Result<Self> {
        let markdown = MarkdownRenderer::with_options(RenderOptions::from_config(&site.config));
        let templates = TemplateRenderer::new(&site.config)?;

        Ok(Self {
            site: site.clone(),
            repository: site.repository(),
            markdown,
            templates,
        })
    }

    /// HTML of the post listing
    pub fn index_html(&self) -> Result<String> {
        let posts = self.repository.list_all()?;
        self.templates.render_index(&posts)
    }

    /// HTML of a post page, `None` when the slug has no backing file
    pub fn post_html(&self, slug: &str) -> Result<Option<String>> {
        let Some(post) = self.repository.get_by_slug(slug)? else {
            return Ok(None);
        };

        let content = self.markdown.render(&post.content);
        let html = self.templates.render_post(&post, &content)?;
        Ok(Some(html))
    }

    /// HTML of the not-found page
    pub fn not_found_html(&self) -> Result<String> {
        self.templates.render_not_found()
    }

    /// Generate the entire site into the output directory
    pub fn generate(&self) -> Result<Vec<PostMeta>> {
        let output_dir = &self.site.output_dir;
        fs::create_dir_all(output_dir)?;

        // Copy public assets (cover images, etc.)
        self.copy_public_assets()?;

        fs::write(output_dir.join(STYLESHEET_PATH), STYLESHEET)?;

        let posts = self.repository.list_all()?;

        let index = self.templates.render_index(&posts)?;
        fs::write(output_dir.join("index.html"), index)?;

        self.generate_post_pages(&posts)?;

        fs::write(output_dir.join("404.html"), self.not_found_html()?)?;

        Ok(posts)
    }

    /// Write `posts/<slug>/index.html` for every post
    fn generate_post_pages(&self, posts: &[PostMeta]) -> Result<()> {
        let posts_out = self.site.output_dir.join("posts");

        // Drop pages of posts that no longer exist
        if posts_out.exists() {
            fs::remove_dir_all(&posts_out)?;
        }

        for meta in posts {
            let html = self
                .post_html(&meta.slug)?
                .with_context(|| format!("Post {:?} disappeared while generating", meta.slug))?;

            let dir = posts_out.join(&meta.slug);
            fs::create_dir_all(&dir)?;
            fs::write(dir.join("index.html"), html)?;
            tracing::debug!("Generated post {}", meta.slug);
        }

        Ok(())
    }

    /// Copy everything under the public directory into the output directory
    fn copy_public_assets(&self) -> Result<()> {
        let public_dir = &self.site.public_dir;
        if !public_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(public_dir).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping public asset: {}", e);
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(public_dir)?;
            let dest = self.site.output_dir.join(relative);
            copy_file(path, &dest)?;
        }

        Ok(())
    }
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to).with_context(|| format!("Failed to copy {:?} to {:?}", from, to))?;
    Ok(())
}
