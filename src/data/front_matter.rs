use std::path::Path;

use super::PageMetadata;

const FENCE: &str = "---";

/// Splits a leading `---` fenced YAML block from the rest of the text.
/// Returns `None` for the block if there is none or it is never closed.
pub fn split_front_matter(text: &str) -> (Option<&str>, &str) {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let Some(first_line_end) = text.find('\n') else {
        return (None, text);
    };
    if text[..first_line_end].trim_end() != FENCE {
        return (None, text);
    }
    let yaml_start = first_line_end + 1;
    let mut offset = yaml_start;

    for line in text[yaml_start..].split_inclusive('\n') {
        let content = line.trim_end();
        if content == FENCE || content == "..." {
            return (
                Some(&text[yaml_start..offset]),
                &text[offset + line.len()..],
            );
        }
        offset += line.len();
    }

    (None, text)
}

/// Parses the front matter of a document. Malformed metadata falls back to
/// the defaults so that a cosmetic error never blocks a build.
pub fn parse_front_matter<'a>(text: &'a str, path: &Path) -> (PageMetadata, &'a str) {
    let (yaml, body) = split_front_matter(text);
    let Some(yaml) = yaml else {
        return (PageMetadata::default(), body);
    };
    if yaml.trim().is_empty() {
        return (PageMetadata::default(), body);
    }

    match serde_yaml::from_str::<PageMetadata>(yaml) {
        Ok(metadata) => (metadata, body),
        Err(e) => {
            tracing::warn!("Ignoring malformed front matter in {path:?}: {e}");
            (PageMetadata::default(), body)
        }
    }
}
