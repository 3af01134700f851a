use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser, Tree};

use crate::error::{DocgenError, Result};
use super::tags::is_doc_comment;

/// Shape of a top-level statement, as far as documentation is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Interface,
    TypeAlias,
    Other,
}

/// A top-level statement with its attached documentation comment
#[derive(Debug, Clone, Copy)]
pub struct Statement<'a> {
    pub kind: StatementKind,

    /// The declaration node, with any `export` wrapper removed
    pub node: Node<'a>,

    /// 1-based line where the statement (including `export`) begins
    pub line: usize,

    /// The `/** */` comment directly preceding the statement
    pub doc_comment: Option<&'a str>,
}

/// A successfully parsed TypeScript source file
pub struct ParsedSource {
    /// Path relative to the source root
    pub path: PathBuf,

    /// Raw source text
    pub text: String,

    tree: Tree,
}

impl ParsedSource {
    /// Top-level statements in source order
    pub fn statements(&self) -> Vec<Statement<'_>> {
        let root = self.tree.root_node();
        let mut statements = Vec::new();
        let mut pending_doc: Option<&str> = None;
        let mut cursor = root.walk();

        for child in root.named_children(&mut cursor) {
            if child.is_extra() {
                let text = self.node_text(child);
                pending_doc = if is_doc_comment(text) { Some(text) } else { pending_doc };
                continue;
            }

            let node = unwrap_export(child);
            let kind = match node.kind() {
                "interface_declaration" => StatementKind::Interface,
                "type_alias_declaration" => StatementKind::TypeAlias,
                _ => StatementKind::Other,
            };

            statements.push(Statement {
                kind,
                node,
                line: child.start_position().row + 1,
                doc_comment: pending_doc.take(),
            });
        }

        statements
    }

    /// Source text covered by a node
    pub fn node_text(&self, node: Node) -> &str {
        &self.text[node.byte_range()]
    }
}

/// TypeScript parser using Tree-sitter
pub struct SourceParser {
    parser: Parser,
    source_root: PathBuf,
    canonical_root: PathBuf,
}

impl SourceParser {
    pub fn new(source_root: &Path) -> Result<Self> {
        let mut parser = Parser::new();
        let typescript_language = tree_sitter_typescript::language_typescript();
        parser.set_language(&typescript_language).map_err(|e| DocgenError::Parse {
            path: PathBuf::new(),
            line: 0,
            message: format!("Failed to set TypeScript language: {}", e),
        })?;

        let canonical_root = source_root
            .canonicalize()
            .unwrap_or_else(|_| source_root.to_path_buf());

        Ok(Self {
            parser,
            source_root: source_root.to_path_buf(),
            canonical_root,
        })
    }

    /// Parse source text. Any syntax error fails the whole file.
    pub fn parse(&mut self, file_path: &Path, content: String) -> Result<ParsedSource> {
        let path = self.relative_path(file_path);

        let tree = self.parser.parse(&content, None).ok_or_else(|| DocgenError::Parse {
            path: path.clone(),
            line: 0,
            message: "Failed to parse TypeScript code".to_string(),
        })?;

        let root = tree.root_node();
        if root.has_error() {
            let (line, message) = match first_error(root) {
                Some(node) if node.is_missing() => {
                    (node.start_position().row + 1, format!("missing `{}`", node.kind()))
                }
                Some(node) => (
                    node.start_position().row + 1,
                    format!("unexpected syntax near column {}", node.start_position().column + 1),
                ),
                None => (1, "syntax error".to_string()),
            };
            return Err(DocgenError::Parse { path, line, message });
        }

        Ok(ParsedSource { path, text: content, tree })
    }

    /// Path relative to the configured source root, with forward slashes
    fn relative_path(&self, file_path: &Path) -> PathBuf {
        let absolute = file_path.canonicalize().ok();
        let relative = absolute
            .as_deref()
            .and_then(|abs| abs.strip_prefix(&self.canonical_root).ok())
            .or_else(|| file_path.strip_prefix(&self.source_root).ok())
            .unwrap_or(file_path);

        let normalized: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        PathBuf::from(normalized.join("/"))
    }
}

fn unwrap_export(node: Node) -> Node {
    if node.kind() == "export_statement" {
        if let Some(declaration) = node.child_by_field_name("declaration") {
            return declaration;
        }
    }
    node
}

/// Depth-first search for the first ERROR or MISSING node
fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() || child.is_missing() {
            if let Some(found) = first_error(child) {
                return Some(found);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<ParsedSource> {
        let root = std::env::temp_dir();
        let mut parser = SourceParser::new(&root).unwrap();
        parser.parse(&root.join("sample.ts"), source.to_string())
    }

    #[test]
    fn test_classifies_top_level_statements() {
        let source = r#"import { Foo } from './foo';

/**
 * @docsCategory common
 */
export interface Bar {
    id: string;
}

type Baz = string | number;

export const qux = 1;
"#;
        let parsed = parse(source).unwrap();
        let kinds: Vec<StatementKind> = parsed.statements().iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StatementKind::Other,
                StatementKind::Interface,
                StatementKind::TypeAlias,
                StatementKind::Other,
            ]
        );
    }

    #[test]
    fn test_lines_and_doc_comments() {
        let source = "// plain\n\n/** @docsCategory a */\nexport interface A {}\n\ninterface B {}\n";
        let parsed = parse(source).unwrap();
        let statements = parsed.statements();

        assert_eq!(statements[0].line, 4);
        assert_eq!(statements[0].doc_comment, Some("/** @docsCategory a */"));
        assert_eq!(statements[1].line, 6);
        assert_eq!(statements[1].doc_comment, None);
    }

    #[test]
    fn test_relative_path() {
        let parsed = parse("interface A {}").unwrap();
        assert_eq!(parsed.path, PathBuf::from("sample.ts"));
    }

    #[test]
    fn test_syntax_error_is_fatal() {
        let err = match parse("interface A {\n  id: string;\n\ninterface B {") {
            Err(e) => e,
            Ok(_) => panic!("expected a parse error"),
        };
        assert!(matches!(err, DocgenError::Parse { .. }));
    }
}
