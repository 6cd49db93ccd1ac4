//! Front-matter parsing

use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

/// Custom deserializer that coerces any YAML scalar into a string.
/// Null, `false` and the empty string count as absent.
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = Value::deserialize(deserializer)?;
    scalar_to_string(value).map_err(D::Error::custom)
}

fn scalar_to_string(value: Value) -> Result<Option<String>, String> {
    match value {
        Value::Null | Value::Bool(false) => Ok(None),
        Value::Bool(true) => Ok(Some("true".to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Tagged(tagged) => scalar_to_string(tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => {
            Err("expected a scalar value, found a list or mapping".to_string())
        }
    }
}

/// Front-matter data from a post. Unrecognized keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(deserialize_with = "scalar_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub date: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub description: Option<String>,
}

/// Errors that can occur when parsing front-matter.
#[derive(Debug, thiserror::Error)]
pub enum FrontMatterError {
    #[error("unclosed front-matter block - missing closing ---")]
    Unclosed,

    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("front-matter must be a mapping of keys to values")]
    NotAMapping,
}

impl FrontMatter {
    /// Parse front-matter from content string.
    /// Returns (front_matter, remaining_content); content without a leading
    /// `---` line is returned untouched with default front-matter.
    pub fn parse(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let Some(rest) = strip_opening_delimiter(content) else {
            return Ok((FrontMatter::default(), content));
        };

        let mut offset = 0;
        for line in rest.split_inclusive('\n') {
            if is_delimiter(line) {
                let yaml_content = &rest[..offset];
                // The closing line (and its line break) is not part of the body
                let remaining = &rest[offset + line.len()..];
                return Ok((Self::parse_yaml(yaml_content)?, remaining));
            }
            offset += line.len();
        }

        Err(FrontMatterError::Unclosed)
    }

    fn parse_yaml(yaml_content: &str) -> Result<Self, FrontMatterError> {
        if yaml_content.trim().is_empty() {
            return Ok(FrontMatter::default());
        }

        match serde_yaml::from_str::<Value>(yaml_content)? {
            // Only comments
            Value::Null => Ok(FrontMatter::default()),
            value @ Value::Mapping(_) => Ok(serde_yaml::from_value(value)?),
            _ => Err(FrontMatterError::NotAMapping),
        }
    }
}

fn strip_opening_delimiter(content: &str) -> Option<&str> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let line_end = content.find('\n')?;
    if is_delimiter(&content[..=line_end]) {
        Some(&content[line_end + 1..])
    } else {
        None
    }
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == "---"
}
