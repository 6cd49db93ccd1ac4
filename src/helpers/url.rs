//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped inside a single path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Generate a URL under the site root
///
/// # Examples
/// ```ignore
/// url_for("/blog/", "/style.css") // -> "/blog/style.css"
/// ```
pub fn url_for(root: &str, path: &str) -> String {
    let root = root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Percent-encode a value for use as one path segment
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// URL of a post's detail page
pub fn post_url(root: &str, slug: &str) -> String {
    url_for(root, &format!("posts/{}", encode_segment(slug)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for() {
        assert_eq!(url_for("/", "/style.css"), "/style.css");
        assert_eq!(url_for("/", ""), "/");
        assert_eq!(url_for("/blog/", "style.css"), "/blog/style.css");
        assert_eq!(url_for("/blog/", "/"), "/blog/");
    }

    #[test]
    fn test_post_url_encodes_slug() {
        assert_eq!(post_url("/", "hello-world"), "/posts/hello-world");
        assert_eq!(post_url("/", "two words"), "/posts/two%20words");
        assert_eq!(post_url("/blog/", "a#b"), "/blog/posts/a%23b");
    }
}
