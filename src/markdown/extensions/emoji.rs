use super::Extension;

/// Replaces `:shortcode:` with the unicode emoji outside of code
pub struct Emoji;

impl Extension for Emoji {
    fn name(&self) -> &'static str {
        "emoji"
    }

    fn preprocess(&self, markdown: String) -> String {
        let mut out = String::with_capacity(markdown.len());
        let mut fence: Option<&str> = None;

        for line in markdown.split_inclusive('\n') {
            let trimmed = line.trim_start();
            if let Some(open) = fence {
                if trimmed.starts_with(open) {
                    fence = None;
                }
                out.push_str(line);
                continue;
            }
            if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
                fence = Some(&trimmed[..3]);
                out.push_str(line);
                continue;
            }

            // odd segments are inside inline code spans
            for (i, segment) in line.split('`').enumerate() {
                if i > 0 {
                    out.push('`');
                }
                if i % 2 == 0 {
                    out.push_str(&replace_shortcodes(segment));
                } else {
                    out.push_str(segment);
                }
            }
        }

        out
    }
}

fn is_shortcode(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '+')
}

pub fn replace_shortcodes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(':') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        if let Some(end) = after.find(':') {
            let name = &after[..end];
            if is_shortcode(name) {
                if let Some(emoji) = emojis::get_by_shortcode(name) {
                    out.push_str(emoji.as_str());
                    rest = &after[end + 1..];
                    continue;
                }
            }
        }
        out.push(':');
        rest = after;
    }
    out.push_str(rest);

    out
}
