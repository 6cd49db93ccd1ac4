//! Content module - post repository, front-matter and markdown rendering

mod error;
mod frontmatter;
pub mod loader;
mod markdown;
mod post;

pub use error::{ContentError, Result};
pub use frontmatter::{FrontMatter, FrontMatterError};
pub use loader::PostRepository;
pub use markdown::{MarkdownRenderer, RenderOptions};
pub use post::{Post, PostMeta};
