//! Markdown rendering with syntax highlighting

use lazy_static::lazy_static;
use pulldown_cmark::{
    html, CodeBlockKind, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, TextMergeStream,
};
use regex::Regex;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::SiteConfig;

/// Bundled syntect theme used when the configured one is unknown
const FALLBACK_THEME: &str = "base16-ocean.dark";

lazy_static! {
    /// Bare URLs in text, minus trailing punctuation
    static ref AUTOLINK_RE: Regex =
        Regex::new(r#"\b(?:https?://|www\.)[^\s<>"]*[^\s<>".,:;'!?)\]]"#).unwrap();
}

/// Markdown extensions and highlighting settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub extended_tables: bool,
    pub task_lists: bool,
    pub autolinks: bool,
    pub code_highlight_theme: String,
    pub line_numbers: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            extended_tables: true,
            task_lists: true,
            autolinks: true,
            code_highlight_theme: "github-dark".to_string(),
            line_numbers: false,
        }
    }
}

impl RenderOptions {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            extended_tables: config.markdown.tables,
            task_lists: config.markdown.task_lists,
            autolinks: config.markdown.autolinks,
            code_highlight_theme: config.highlight.theme.clone(),
            line_numbers: config.highlight.line_number,
        }
    }
}

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme: Theme,
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer with default options
    pub fn new() -> Self {
        Self::with_options(RenderOptions::default())
    }

    /// Create with custom settings
    pub fn with_options(options: RenderOptions) -> Self {
        let mut theme_set = ThemeSet::load_defaults();
        let theme_name = resolve_theme_name(&options.code_highlight_theme);
        let theme = match theme_set.themes.remove(theme_name) {
            Some(theme) => theme,
            None => {
                tracing::warn!(
                    "Unknown highlight theme {:?}, using {}",
                    options.code_highlight_theme,
                    FALLBACK_THEME
                );
                theme_set
                    .themes
                    .remove(FALLBACK_THEME)
                    .unwrap_or_default()
            }
        };

        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
            options,
        }
    }

    /// Render markdown to HTML. Never fails: anything the parser does not
    /// recognize comes out as paragraphs of text.
    pub fn render(&self, markdown: &str) -> String {
        let mut options =
            Options::ENABLE_FOOTNOTES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_GFM;
        if self.options.extended_tables {
            options |= Options::ENABLE_TABLES;
        }
        if self.options.task_lists {
            options |= Options::ENABLE_TASKLISTS;
        }
        let parser = TextMergeStream::new(Parser::new_ext(markdown, options));

        let mut events: Vec<Event> = Vec::new();
        let mut code_block: Option<(Option<String>, String)> = None;
        let mut link_depth = 0usize;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => fence_language(&info),
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, code)) = code_block.take() {
                        let highlighted = self.highlight_code(&code, lang.as_deref());
                        events.push(Event::Html(CowStr::from(highlighted)));
                    }
                }
                Event::Text(text) if code_block.is_some() => {
                    if let Some((_, code)) = code_block.as_mut() {
                        code.push_str(&text);
                    }
                }
                Event::Start(Tag::Link { .. }) => {
                    link_depth += 1;
                    events.push(event);
                }
                Event::End(TagEnd::Link) => {
                    link_depth = link_depth.saturating_sub(1);
                    events.push(event);
                }
                Event::Text(text) if self.options.autolinks && link_depth == 0 => {
                    push_autolinked(&mut events, text);
                }
                _ => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        // Try to find syntax for the language
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let class = html_escape(lang);
        match highlighted_html_for_string(code, &self.syntax_set, syntax, &self.theme) {
            Ok(highlighted) => {
                if self.options.line_numbers {
                    add_line_numbers(&highlighted, &class)
                } else {
                    format!(
                        r#"<figure class="highlight" data-language="{}">{}</figure>"#,
                        class, highlighted
                    )
                }
            }
            Err(e) => {
                tracing::debug!("Highlighting failed for {}: {}", lang, e);
                format!(
                    r#"<pre><code class="language-{}">{}</code></pre>"#,
                    class,
                    html_escape(code)
                )
            }
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Map the configured theme name onto a bundled syntect theme
fn resolve_theme_name(name: &str) -> &str {
    match name {
        "github-dark" => "base16-ocean.dark",
        "github-light" => "InspiredGitHub",
        other => other,
    }
}

/// Language token of a fence info string, e.g. `rust` in ```` ```rust,ignore ````
fn fence_language(info: &str) -> Option<String> {
    info.split(|c: char| c.is_whitespace() || c == ',' || c == '{')
        .next()
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
}

/// Split a text event around bare URLs, turning each into a link
fn push_autolinked<'a>(events: &mut Vec<Event<'a>>, text: CowStr<'a>) {
    if !AUTOLINK_RE.is_match(&text) {
        events.push(Event::Text(text));
        return;
    }

    let mut last = 0;
    for m in AUTOLINK_RE.find_iter(&text) {
        if m.start() > last {
            events.push(Event::Text(CowStr::from(text[last..m.start()].to_string())));
        }

        let url = m.as_str();
        let dest = if url.starts_with("www.") {
            format!("http://{}", url)
        } else {
            url.to_string()
        };
        events.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: CowStr::from(dest),
            title: CowStr::from(""),
            id: CowStr::from(""),
        }));
        events.push(Event::Text(CowStr::from(url.to_string())));
        events.push(Event::End(TagEnd::Link));

        last = m.end();
    }

    if last < text.len() {
        events.push(Event::Text(CowStr::from(text[last..].to_string())));
    }
}

/// Add line numbers to highlighted code
fn add_line_numbers(code: &str, lang: &str) -> String {
    let lines: Vec<&str> = code.lines().collect();

    let gutter = (1..=lines.len())
        .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<figure class="highlight" data-language="{}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
        lang,
        gutter,
        lines.join("\n")
    )
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a test.");
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() {}\n```");
        assert!(html.contains(r#"<figure class="highlight" data-language="rust">"#));
        assert!(html.contains("<pre style="));
        assert!(html.contains("main"));
    }

    #[test]
    fn test_code_block_content_not_autolinked() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```\nsee https://example.com\n```");
        assert!(html.contains("https://example.com"));
        assert!(!html.contains("<a href"));
    }

    #[test]
    fn test_render_table() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn test_tables_can_be_disabled() {
        let renderer = MarkdownRenderer::with_options(RenderOptions {
            extended_tables: false,
            ..Default::default()
        });
        let html = renderer.render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(!html.contains("<table>"));
    }

    #[test]
    fn test_render_task_list() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("- [x] done\n- [ ] todo\n");
        assert!(html.contains(r#"type="checkbox""#));
        assert!(html.contains("checked"));
    }

    #[test]
    fn test_autolinks() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("Visit https://example.com/path. Or www.rust-lang.org!");
        assert!(html.contains(r#"<a href="https://example.com/path">https://example.com/path</a>."#));
        assert!(html.contains(r#"<a href="http://www.rust-lang.org">www.rust-lang.org</a>!"#));
    }

    #[test]
    fn test_autolinks_need_word_boundary() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("awww.example.com and xhttps://example.com");
        assert!(!html.contains("<a href"));

        let html = renderer.render("(www.example.com)");
        assert!(html.contains(r#"(<a href="http://www.example.com">www.example.com</a>)"#));
    }

    #[test]
    fn test_existing_links_untouched() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("[https://example.com](https://example.com)");
        assert_eq!(html.matches("<a href").count(), 1);
    }

    #[test]
    fn test_autolinks_can_be_disabled() {
        let renderer = MarkdownRenderer::with_options(RenderOptions {
            autolinks: false,
            ..Default::default()
        });
        let html = renderer.render("Visit https://example.com");
        assert!(!html.contains("<a href"));
    }

    #[test]
    fn test_malformed_markdown_degrades() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("**unclosed *emphasis [link](\n\n```");
        assert!(html.contains("unclosed"));
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let renderer = MarkdownRenderer::with_options(RenderOptions {
            code_highlight_theme: "no-such-theme".to_string(),
            ..Default::default()
        });
        let html = renderer.render("```python\nprint(1)\n```");
        assert!(html.contains("highlight"));
    }

    #[test]
    fn test_line_numbers() {
        let renderer = MarkdownRenderer::with_options(RenderOptions {
            line_numbers: true,
            ..Default::default()
        });
        let html = renderer.render("```js\nlet a = 1;\nlet b = 2;\n```");
        assert!(html.contains(r#"<span class="line-number">1</span>"#));
    }

    #[test]
    fn test_fence_language() {
        assert_eq!(fence_language("rust,ignore"), Some("rust".to_string()));
        assert_eq!(fence_language("js {1,3}"), Some("js".to_string()));
        assert_eq!(fence_language(""), None);
    }
}
