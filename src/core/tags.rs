//! Lexing of `/** ... */` documentation comments into typed tags.

/// A tag found in a documentation comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocTag {
    /// `@docsCategory`
    Category(String),
    /// `@docsWeight`, kept raw so malformed values can fall back
    Weight(String),
    /// `@description`
    Description(String),
    /// `@example`
    Example(String),
    /// `@default`
    Default(String),
    /// Any other tag; carries the tag name
    Unknown(String),
}

impl DocTag {
    fn from_parts(name: &str, content: String) -> Self {
        match name {
            "docsCategory" => DocTag::Category(content.trim().to_string()),
            "docsWeight" => DocTag::Weight(content.trim().to_string()),
            "description" => DocTag::Description(content.trim().to_string()),
            "example" => DocTag::Example(trim_blank_lines(&content)),
            "default" => DocTag::Default(content.trim().to_string()),
            other => DocTag::Unknown(other.to_string()),
        }
    }
}

/// Whether a comment uses the `/** */` documentation form
pub fn is_doc_comment(text: &str) -> bool {
    text.starts_with("/**") && !text.starts_with("/**/")
}

/// Parse every tag out of a documentation comment, in source order.
///
/// Text before the first tag is ignored. A line inside a fenced code block
/// never starts a tag, so decorators in examples survive.
pub fn parse_doc_comment(raw: &str) -> Vec<DocTag> {
    let mut tags = Vec::new();
    let mut current: Option<(String, String)> = None;
    let mut in_fence = false;

    for line in comment_lines(raw) {
        let trimmed = line.trim_start();

        if !in_fence && trimmed.starts_with('@') {
            if let Some((name, content)) = current.take() {
                tags.push(DocTag::from_parts(&name, content));
            }
            let rest = &trimmed[1..];
            let name_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let name = rest[..name_end].to_string();
            let content = rest[name_end..].trim_start().to_string();
            current = Some((name, content));
            continue;
        }

        if trimmed.starts_with("```") {
            in_fence = !in_fence;
        }

        if let Some((_, content)) = current.as_mut() {
            content.push('\n');
            content.push_str(line);
        }
    }

    if let Some((name, content)) = current.take() {
        tags.push(DocTag::from_parts(&name, content));
    }

    tags
}

/// Strip the comment delimiters and the leading `*` convention from each line.
///
/// Leading whitespace, one `*` and one following space are removed, so
/// indentation inside code samples beyond that single space is preserved.
fn comment_lines(raw: &str) -> Vec<&str> {
    let body = raw.trim();
    let body = body.strip_prefix("/**").unwrap_or(body);
    let body = body.strip_suffix("*/").unwrap_or(body);

    body.lines()
        .map(|line| {
            let line = line.trim_start();
            let line = line.strip_prefix('*').unwrap_or(line);
            let line = line.strip_prefix(' ').unwrap_or(line);
            line.trim_end()
        })
        .collect()
}

fn trim_blank_lines(content: &str) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(s), Some(e)) => lines[s..=e].join("\n"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_single_line_tags() {
        let tags = parse_doc_comment("/**\n * @docsCategory common\n * @docsWeight 5\n */");
        assert_eq!(
            tags,
            vec![
                DocTag::Category("common".to_string()),
                DocTag::Weight("5".to_string()),
            ]
        );
    }

    #[test]
    fn test_multiline_description() {
        let raw = "/**\n * @description\n * First line.\n * Second line.\n *\n * @docsCategory orders\n */";
        let tags = parse_doc_comment(raw);
        assert_eq!(tags[0], DocTag::Description("First line.\nSecond line.".to_string()));
        assert_eq!(tags[1], DocTag::Category("orders".to_string()));
    }

    #[test]
    fn test_example_keeps_code_indentation_and_decorators() {
        let raw = r#"/**
 * @example
 * ```ts
 * @Component()
 * class Foo {
 *     bar = 1;
 * }
 * ```
 * @docsCategory common
 */"#;
        let tags = parse_doc_comment(raw);
        assert_eq!(tags.len(), 2);
        assert_eq!(
            tags[0],
            DocTag::Example("```ts\n@Component()\nclass Foo {\n    bar = 1;\n}\n```".to_string())
        );
    }

    #[test]
    fn test_unknown_tags_and_leading_text() {
        let raw = "/**\n * Some summary text.\n * @deprecated use Bar\n * @default 5\n */";
        let tags = parse_doc_comment(raw);
        assert_eq!(
            tags,
            vec![
                DocTag::Unknown("deprecated".to_string()),
                DocTag::Default("5".to_string()),
            ]
        );
    }

    #[test]
    fn test_single_line_comment() {
        let tags = parse_doc_comment("/** @description the bar value */");
        assert_eq!(tags, vec![DocTag::Description("the bar value".to_string())]);
    }

    #[test]
    fn test_is_doc_comment() {
        assert!(is_doc_comment("/** docs */"));
        assert!(!is_doc_comment("/* plain */"));
        assert!(!is_doc_comment("// line"));
        assert!(!is_doc_comment("/**/"));
    }
}
