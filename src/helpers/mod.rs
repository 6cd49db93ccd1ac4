//! Helper functions shared by the generator, server and templates

mod date;
mod url;

pub use date::*;
pub use url::*;
