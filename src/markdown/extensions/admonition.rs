use super::Extension;

/// `!!! note "Title"` blocks
pub struct Admonition;

/// `??? note "Title"` collapsible blocks, `???+` renders them expanded
pub struct Details;

impl Extension for Admonition {
    fn name(&self) -> &'static str {
        "admonition"
    }

    fn preprocess(&self, markdown: String) -> String {
        transform_blocks(&markdown, BlockKind::Admonition)
    }
}

impl Extension for Details {
    fn name(&self) -> &'static str {
        "details"
    }

    fn preprocess(&self, markdown: String) -> String {
        transform_blocks(&markdown, BlockKind::Details)
    }
}

#[derive(Clone, Copy, PartialEq)]
enum BlockKind {
    Admonition,
    Details,
}

struct BlockHeader {
    classes: Vec<String>,
    title: Option<String>,
    open: bool,
}

fn transform_blocks(markdown: &str, kind: BlockKind) -> String {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut out = String::with_capacity(markdown.len());
    let mut fence: Option<&str> = None;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim_start();

        if let Some(open) = fence {
            if trimmed.starts_with(open) {
                fence = None;
            }
            push_line(&mut out, line);
            i += 1;
            continue;
        }
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            fence = Some(&trimmed[..3]);
            push_line(&mut out, line);
            i += 1;
            continue;
        }

        let Some(header) = parse_header(line, kind) else {
            push_line(&mut out, line);
            i += 1;
            continue;
        };

        let mut body_lines = Vec::new();
        i += 1;
        while i < lines.len() {
            let next = lines[i];
            if next.trim().is_empty() {
                body_lines.push("");
            } else if let Some(dedented) = dedent(next) {
                body_lines.push(dedented);
            } else {
                break;
            }
            i += 1;
        }
        let mut trailing_blank = 0;
        while body_lines.last() == Some(&"") {
            body_lines.pop();
            trailing_blank += 1;
        }

        let body = transform_blocks(&body_lines.join("\n"), kind);
        render_block(&mut out, &header, body.trim_end_matches('\n'), kind);
        for _ in 0..trailing_blank {
            out.push('\n');
        }
    }

    out
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

fn dedent(line: &str) -> Option<&str> {
    line.strip_prefix("    ").or_else(|| line.strip_prefix('\t'))
}

fn parse_header(line: &str, kind: BlockKind) -> Option<BlockHeader> {
    let (rest, open) = match kind {
        BlockKind::Admonition => (line.strip_prefix("!!!")?, false),
        BlockKind::Details => match line.strip_prefix("???+") {
            Some(rest) => (rest, true),
            None => (line.strip_prefix("???")?, false),
        },
    };
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim();

    let (class_part, title) = match (rest.find('"'), rest.rfind('"')) {
        (Some(start), Some(end)) if end > start => {
            (&rest[..start], Some(rest[start + 1..end].to_owned()))
        }
        _ => (rest, None),
    };
    let classes: Vec<String> = class_part
        .split_whitespace()
        .map(sanitize_class)
        .filter(|c| !c.is_empty())
        .collect();
    let first = classes.first()?;
    let title = title.unwrap_or_else(|| capitalize(first));

    Some(BlockHeader {
        title: (!title.is_empty()).then_some(title),
        classes,
        open,
    })
}

fn sanitize_class(class: &str) -> String {
    class
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn render_block(out: &mut String, header: &BlockHeader, body: &str, kind: BlockKind) {
    let classes = header.classes.join(" ");
    let title = header
        .title
        .as_deref()
        .map(|t| html_escape::encode_text(t).into_owned());

    match kind {
        BlockKind::Admonition => {
            out.push_str(&format!("<div class=\"admonition {classes}\">\n"));
            if let Some(title) = title {
                out.push_str(&format!("<p class=\"admonition-title\">{title}</p>\n"));
            }
            out.push('\n');
            out.push_str(body);
            out.push_str("\n\n</div>\n");
        }
        BlockKind::Details => {
            let open = if header.open { " open" } else { "" };
            out.push_str(&format!("<details class=\"{classes}\"{open}>\n"));
            let summary = title.unwrap_or_default();
            out.push_str(&format!("<summary>{summary}</summary>\n"));
            out.push('\n');
            out.push_str(body);
            out.push_str("\n\n</details>\n");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn converts_admonition_with_title() {
        let md = "Intro\n\n!!! tip \"Pro tip\"\n    Use **cache**.\n\nAfter\n";
        let out = Admonition.preprocess(md.into());

        assert_eq!(
            out,
            "Intro\n\n<div class=\"admonition tip\">\n<p class=\"admonition-title\">Pro tip</p>\n\nUse **cache**.\n\n</div>\n\nAfter\n"
        );
    }

    #[test]
    fn default_title_is_capitalized_type() {
        let out = Admonition.preprocess("!!! note\n    body\n".into());
        assert!(out.contains("<p class=\"admonition-title\">Note</p>"));
    }

    #[test]
    fn empty_title_is_omitted() {
        let out = Admonition.preprocess("!!! note \"\"\n    body\n".into());
        assert!(!out.contains("admonition-title"));
        assert!(out.contains("<div class=\"admonition note\">"));
    }

    #[test]
    fn title_is_escaped() {
        let out = Admonition.preprocess("!!! warning \"<b>&\"\n    body\n".into());
        assert!(out.contains("&lt;b&gt;&amp;"));
    }

    #[test]
    fn nested_admonitions() {
        let md = "!!! note\n    outer\n\n    !!! danger\n        inner\n";
        let out = Admonition.preprocess(md.into());

        assert!(out.contains("<div class=\"admonition note\">"));
        assert!(out.contains("<div class=\"admonition danger\">"));
        assert!(out.contains("\ninner\n"));
        assert_eq!(out.matches("</div>").count(), 2);
    }

    #[test]
    fn ignores_markers_in_code_fences() {
        let md = "```\n!!! note\n    code\n```\n";
        assert_eq!(Admonition.preprocess(md.into()), md);
    }

    #[test]
    fn details_blocks() {
        let out = Details.preprocess("???+ info \"More\"\n    hidden\n".into());
        assert!(out.contains("<details class=\"info\" open>"));
        assert!(out.contains("<summary>More</summary>"));

        let out = Details.preprocess("??? info\n    hidden\n".into());
        assert!(out.contains("<details class=\"info\">"));
    }

    #[test]
    fn admonition_pass_leaves_details_alone() {
        let md = "??? info\n    hidden\n";
        assert_eq!(Admonition.preprocess(md.into()), md);
    }
}
