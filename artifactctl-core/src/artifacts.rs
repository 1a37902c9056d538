use once_cell::sync::Lazy;
use regex::Regex;

pub const OPEN_TAG: &str = "<antArtifact";
pub const CLOSE_TAG: &str = "</antArtifact>";

pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_LANGUAGE: &str = "txt";

static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z_][\w-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("attribute regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub title: String,
    pub language: String,
    pub content: String,
}

impl Artifact {
    pub fn new(
        title: impl Into<String>,
        language: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            language: language.into(),
            content: content.into(),
        }
    }
}

/// Extract every artifact block from `text`, in order of appearance.
///
/// Matching is non-recursive: the body of a block runs to the first closing
/// tag after its opening tag, so an opening tag nested inside a body is plain
/// content. A tag mention whose `>` never arrives outside quotes is skipped.
/// An opening tag without a closing tag ends the scan.
pub fn extract(text: &str) -> Vec<Artifact> {
    let mut artifacts = Vec::new();
    let mut cursor = 0;

    while let Some(found) = find_open_tag(text, cursor) {
        let Some(attrs_end) = end_of_open_tag(text, found + OPEN_TAG.len()) else {
            cursor = found + OPEN_TAG.len();
            continue;
        };
        let attrs = &text[found + OPEN_TAG.len()..attrs_end];
        let body_start = attrs_end + 1;

        let Some(rel_close) = text[body_start..].find(CLOSE_TAG) else {
            break;
        };
        let body_end = body_start + rel_close;

        artifacts.push(Artifact {
            title: attribute(attrs, "title").unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            language: attribute(attrs, "language")
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            content: text[body_start..body_end].trim().to_string(),
        });

        cursor = body_end + CLOSE_TAG.len();
    }

    artifacts
}

/// Byte offset of the next opening tag at or after `from`. The tag name must
/// be followed by whitespace or `>` so `<antArtifactX>` is not a match.
fn find_open_tag(text: &str, from: usize) -> Option<usize> {
    let mut cursor = from;
    while let Some(rel) = text[cursor..].find(OPEN_TAG) {
        let at = cursor + rel;
        let after = at + OPEN_TAG.len();
        match text[after..].chars().next() {
            Some(c) if c == '>' || c.is_whitespace() => return Some(at),
            Some(_) => cursor = after,
            None => return None,
        }
    }
    None
}

/// Offset of the `>` closing the opening tag; quoted values may contain `>`.
fn end_of_open_tag(text: &str, from: usize) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (offset, ch) in text[from..].char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, '>') => return Some(from + offset),
            (None, _) => {}
        }
    }
    None
}

fn attribute(attrs: &str, name: &str) -> Option<String> {
    ATTR_RE
        .captures_iter(attrs)
        .find(|caps| caps.get(1).map(|m| m.as_str()) == Some(name))
        .and_then(|caps| caps.get(2).or_else(|| caps.get(3)))
        .map(|m| m.as_str().to_string())
}
