use tracing::{debug, warn};
use tree_sitter::Node;

use super::model::{
    title_to_slug, DeclarationInfo, DeclarationKind, MemberInfo, MemberKind, MethodParameter,
    ParsedDeclaration, DEFAULT_WEIGHT,
};
use super::parser::{ParsedSource, Statement, StatementKind};
use super::tags::{is_doc_comment, parse_doc_comment, DocTag};
use super::type_index::TypeReferenceIndex;

/// Turns tagged interface and type-alias statements into declaration records
#[derive(Debug, Default)]
pub struct DeclarationExtractor;

impl DeclarationExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract every documented declaration of a file, in source order.
    ///
    /// Each produced record is registered in `index` before this returns, so
    /// callers must finish extraction of a whole batch before rendering.
    pub fn extract(&self, source: &ParsedSource, index: &mut TypeReferenceIndex) -> Vec<ParsedDeclaration> {
        let mut declarations = Vec::new();

        for statement in source.statements() {
            let declaration = match statement.kind {
                StatementKind::Interface => self.extract_interface(source, &statement),
                StatementKind::TypeAlias => self.extract_type_alias(source, &statement),
                StatementKind::Other => None,
            };

            if let Some(declaration) = declaration {
                let path = declaration.info.output_path();
                if let Some(previous) = index.register(&declaration.info.title, &path) {
                    if previous != path {
                        warn!(
                            "Title `{}` re-registered: {} replaces {}",
                            declaration.info.title, path, previous
                        );
                    }
                }
                debug!("Extracted {} -> {}", declaration.info.title, path);
                declarations.push(declaration);
            }
        }

        declarations
    }

    fn extract_interface(&self, source: &ParsedSource, statement: &Statement) -> Option<ParsedDeclaration> {
        let node = statement.node;
        let info = self.declaration_info(source, statement)?;

        let mut heritage = None;
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if matches!(child.kind(), "extends_type_clause" | "extends_clause") {
                heritage = Some(source.node_text(child).to_string());
            }
        }

        let members = node
            .child_by_field_name("body")
            .map(|body| self.extract_members(source, body))
            .unwrap_or_default();

        Some(ParsedDeclaration {
            info,
            kind: DeclarationKind::Interface { members, heritage },
        })
    }

    fn extract_type_alias(&self, source: &ParsedSource, statement: &Statement) -> Option<ParsedDeclaration> {
        let info = self.declaration_info(source, statement)?;
        let ty = statement
            .node
            .child_by_field_name("value")
            .map(|value| source.node_text(value).to_string())
            .unwrap_or_default();

        Some(ParsedDeclaration {
            info,
            kind: DeclarationKind::TypeAlias { ty },
        })
    }

    /// Shared attributes; `None` when the declaration is not tagged for documentation
    fn declaration_info(&self, source: &ParsedSource, statement: &Statement) -> Option<DeclarationInfo> {
        let node = statement.node;
        let title = source.node_text(node.child_by_field_name("name")?).to_string();

        let mut builder = DeclarationBuilder::default();
        if let Some(comment) = statement.doc_comment {
            for tag in parse_doc_comment(comment) {
                builder.apply(tag);
            }
        }

        let Some(category) = builder.category else {
            debug!("Skipping {}: no @docsCategory", title);
            return None;
        };

        let type_parameters = node
            .child_by_field_name("type_parameters")
            .map(|tp| source.node_text(tp))
            .unwrap_or("");

        Some(DeclarationInfo {
            source_file: source.path.clone(),
            source_line: statement.line,
            full_text: format!("{}{}", title, type_parameters),
            file_name: title_to_slug(&title),
            title,
            category,
            weight: builder.weight,
            description: builder.description,
        })
    }

    fn extract_members(&self, source: &ParsedSource, body: Node) -> Vec<MemberInfo> {
        let mut members = Vec::new();
        let mut pending_doc: Option<&str> = None;
        let mut cursor = body.walk();

        for child in body.named_children(&mut cursor) {
            // Comments inside a body take the body's alias as their kind
            if child.is_extra() {
                let text = source.node_text(child);
                if is_doc_comment(text) {
                    pending_doc = Some(text);
                }
                continue;
            }

            match child.kind() {
                "property_signature" | "method_signature" => {
                    if let Some(member) = self.extract_member(source, child, pending_doc.take()) {
                        members.push(member);
                    }
                }
                _ => {
                    // Index, call and construct signatures are not documented
                    pending_doc = None;
                }
            }
        }

        members
    }

    fn extract_member(&self, source: &ParsedSource, node: Node, doc: Option<&str>) -> Option<MemberInfo> {
        let name = source.node_text(node.child_by_field_name("name")?).to_string();

        let mut builder = MemberBuilder::default();
        if let Some(comment) = doc {
            for tag in parse_doc_comment(comment) {
                builder.apply(tag);
            }
        }

        let (ty, kind) = if node.kind() == "method_signature" {
            let parameters = node
                .child_by_field_name("parameters")
                .map(|params| self.extract_parameters(source, params))
                .unwrap_or_default();
            let return_type = annotation_text(source, node.child_by_field_name("return_type"));
            (return_type, MemberKind::Method { parameters })
        } else {
            let ty = annotation_text(source, node.child_by_field_name("type"));
            (ty, MemberKind::Property { default_value: builder.default_value })
        };

        Some(MemberInfo {
            name,
            description: builder.description,
            ty,
            full_text: source.node_text(node).to_string(),
            kind,
        })
    }

    fn extract_parameters(&self, source: &ParsedSource, params: Node) -> Vec<MethodParameter> {
        let mut parameters = Vec::new();
        let mut cursor = params.walk();

        for param in params.named_children(&mut cursor) {
            if !matches!(param.kind(), "required_parameter" | "optional_parameter") {
                continue;
            }
            let name = param
                .child_by_field_name("pattern")
                .or_else(|| param.child_by_field_name("name"))
                .map(|n| source.node_text(n).to_string())
                .unwrap_or_default();
            let ty = annotation_text(source, param.child_by_field_name("type"));
            parameters.push(MethodParameter { name, ty });
        }

        parameters
    }
}

/// Text of a `: Type` annotation without the colon; empty when absent
fn annotation_text(source: &ParsedSource, annotation: Option<Node>) -> String {
    annotation
        .map(|node| {
            let text = source.node_text(node).trim();
            text.strip_prefix(':').unwrap_or(text).trim().to_string()
        })
        .unwrap_or_default()
}

fn append_paragraph(target: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    if !target.is_empty() {
        target.push_str("\n\n");
    }
    target.push_str(text);
}

/// Declaration-in-progress; each tag applies one typed effect
#[derive(Debug)]
struct DeclarationBuilder {
    category: Option<String>,
    weight: i32,
    description: String,
}

impl Default for DeclarationBuilder {
    fn default() -> Self {
        Self {
            category: None,
            weight: DEFAULT_WEIGHT,
            description: String::new(),
        }
    }
}

impl DeclarationBuilder {
    fn apply(&mut self, tag: DocTag) {
        match tag {
            DocTag::Category(category) => {
                self.category = if category.is_empty() { None } else { Some(category) };
            }
            DocTag::Weight(raw) => {
                self.weight = raw.parse().unwrap_or_else(|_| {
                    debug!("Malformed @docsWeight `{}`, using {}", raw, DEFAULT_WEIGHT);
                    DEFAULT_WEIGHT
                });
            }
            DocTag::Description(text) | DocTag::Example(text) => {
                append_paragraph(&mut self.description, &text);
            }
            DocTag::Default(_) | DocTag::Unknown(_) => {}
        }
    }
}

#[derive(Debug, Default)]
struct MemberBuilder {
    description: String,
    default_value: String,
}

impl MemberBuilder {
    fn apply(&mut self, tag: DocTag) {
        match tag {
            DocTag::Description(text) | DocTag::Example(text) => {
                append_paragraph(&mut self.description, &text);
            }
            DocTag::Default(value) => self.default_value = value,
            DocTag::Category(_) | DocTag::Weight(_) | DocTag::Unknown(_) => {}
        }
    }
}
