//! Post repository - loads posts from the posts directory

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::frontmatter::FrontMatter;
use super::{ContentError, Post, PostMeta, Result};
use crate::helpers::{encode_segment, url_for};
use crate::Site;

/// Cover image extensions, in lookup priority order
pub const IMAGE_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".webp"];

/// Public URL prefix (and path below the public dir) of cover images
pub const IMAGE_URL_DIR: &str = "images/posts";

const MARKDOWN_EXTENSION: &str = ".md";

/// Reads posts straight from disk on every call
#[derive(Debug, Clone)]
pub struct PostRepository {
    posts_dir: PathBuf,
    images_dir: PathBuf,
    root: String,
}

impl PostRepository {
    /// Create a repository for a site
    pub fn new(site: &Site) -> Self {
        Self::with_dirs(
            &site.posts_dir,
            site.public_dir.join(IMAGE_URL_DIR),
            site.config.root_path(),
        )
    }

    /// Create a repository over explicit directories
    pub fn with_dirs(
        posts_dir: impl Into<PathBuf>,
        images_dir: impl Into<PathBuf>,
        root: impl Into<String>,
    ) -> Self {
        Self {
            posts_dir: posts_dir.into(),
            images_dir: images_dir.into(),
            root: root.into(),
        }
    }

    /// Metadata for every post, newest first. Equal dates order by slug.
    pub fn list_all(&self) -> Result<Vec<PostMeta>> {
        if !self.posts_dir.is_dir() {
            tracing::debug!("Posts directory {:?} not found", self.posts_dir);
            return Ok(Vec::new());
        }

        let mut posts = Vec::new();

        for entry in WalkDir::new(&self.posts_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = entry.map_err(|e| {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.posts_dir.clone());
                ContentError::io(path, e.into())
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let Some(slug) = slug_from_file_name(entry.path()) else {
                continue;
            };

            // A listed post must be reachable through get_by_slug
            if !is_safe_slug(&slug) {
                tracing::warn!("Skipping {:?}: file name is not a usable slug", entry.path());
                continue;
            }

            let post = self.read_post(entry.path(), &slug)?;
            posts.push(post.meta);
        }

        posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));

        tracing::debug!("Listed {} posts from {:?}", posts.len(), self.posts_dir);
        Ok(posts)
    }

    /// Look up a single post. Unknown or unsafe slugs yield `None`.
    pub fn get_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        if !is_safe_slug(slug) {
            tracing::debug!("Rejected unsafe slug {:?}", slug);
            return Ok(None);
        }

        let path = self
            .posts_dir
            .join(format!("{}{}", slug, MARKDOWN_EXTENSION));
        if !path.is_file() {
            return Ok(None);
        }

        match self.read_post(&path, slug) {
            Ok(post) => Ok(Some(post)),
            // Deleted between the check and the read
            Err(ContentError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Public URL of the first existing `<slug>.{jpg,jpeg,png,webp}` cover
    pub fn resolve_cover_image(&self, slug: &str) -> Option<String> {
        if !is_safe_slug(slug) {
            return None;
        }

        IMAGE_EXTENSIONS.iter().find_map(|ext| {
            let file_name = format!("{}{}", slug, ext);
            if self.images_dir.join(&file_name).is_file() {
                Some(url_for(
                    &self.root,
                    &format!("{}/{}", IMAGE_URL_DIR, encode_segment(&file_name)),
                ))
            } else {
                None
            }
        })
    }

    /// Load a single post from a file
    fn read_post(&self, path: &Path, slug: &str) -> Result<Post> {
        let raw = fs::read_to_string(path).map_err(|e| ContentError::io(path, e))?;
        let (fm, body) =
            FrontMatter::parse(&raw).map_err(|e| ContentError::MalformedFrontMatter {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let meta = PostMeta::from_front_matter(slug, fm, self.resolve_cover_image(slug));

        Ok(Post {
            meta,
            content: body.to_string(),
        })
    }
}

/// Slug for a markdown file name, `None` for anything else
fn slug_from_file_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let slug = name.strip_suffix(MARKDOWN_EXTENSION)?;
    if slug.is_empty() {
        return None;
    }
    Some(slug.to_string())
}

/// A slug must name a file directly inside the posts directory
pub fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug != "."
        && slug != ".."
        && !slug.contains(['/', '\\', '\0'])
}
