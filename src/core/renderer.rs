use std::sync::LazyLock;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::{Captures, Regex};
use serde::Serialize;
use tera::{Context, Tera};
use tracing::debug;

use crate::config::TemplateConfig;
use crate::error::{DocgenError, Result};
use super::model::{DeclarationKind, MemberInfo, MemberKind, MethodParameter, ParsedDeclaration};
use super::type_index::TypeReferenceIndex;

/// Literal line every generated document carries in its front matter
pub const GENERATED_MARKER: &str = "generated: true";

const DECLARATION_TEMPLATE: &str = "declaration.md";
const CATEGORY_INDEX_TEMPLATE: &str = "category_index.md";

const DEFAULT_DECLARATION: &str = include_str!("../../templates/declaration.md");
const DEFAULT_CATEGORY_INDEX: &str = include_str!("../../templates/category_index.md");

static SPECIAL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\x{00A0}-\x{9999}<>&"`]"#).unwrap());

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z_$][A-Za-z0-9_$]*").unwrap());

#[derive(Serialize)]
struct DocumentView<'a> {
    title: &'a str,
    weight: i32,
    date: String,
    show_toc: bool,
    source_file: String,
    source_line: usize,
    description: &'a str,
    signature: String,
    members: Vec<MemberView<'a>>,
}

#[derive(Serialize)]
struct MemberView<'a> {
    name: &'a str,
    kind: &'static str,
    type_text: String,
    default_value: Option<String>,
    description: &'a str,
}

#[derive(Serialize)]
struct CategoryIndexView<'a> {
    title: &'a str,
    date: String,
}

/// Renders declaration records into Hugo-flavoured Markdown documents
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    pub fn new(config: &TemplateConfig) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(DECLARATION_TEMPLATE, DEFAULT_DECLARATION)?;
        tera.add_raw_template(CATEGORY_INDEX_TEMPLATE, DEFAULT_CATEGORY_INDEX)?;

        if let Some(dir) = &config.template_dir {
            for name in [DECLARATION_TEMPLATE, CATEGORY_INDEX_TEMPLATE] {
                let path = dir.join(name);
                if path.is_file() {
                    debug!("Using template override {}", path.display());
                    tera.add_template_file(&path, Some(name))?;
                }
            }
        }

        Ok(Self { tera })
    }

    /// Render one declaration against the current index
    pub fn render(
        &self,
        declaration: &ParsedDeclaration,
        index: &TypeReferenceIndex,
        generated_at: DateTime<Utc>,
    ) -> Result<String> {
        let info = &declaration.info;
        let members: Vec<MemberView> = match &declaration.kind {
            DeclarationKind::Interface { members, .. } => {
                members.iter().map(|m| member_view(m, index)).collect()
            }
            DeclarationKind::TypeAlias { .. } => Vec::new(),
        };

        let view = DocumentView {
            title: &info.title,
            weight: info.weight,
            date: format_date(generated_at),
            show_toc: true,
            source_file: info.source_file.to_string_lossy().to_string(),
            source_line: info.source_line,
            description: &info.description,
            signature: signature(declaration),
            members,
        };

        let output = self.tera.render(DECLARATION_TEMPLATE, &Context::from_serialize(&view)?)?;
        ensure_marker(output, DECLARATION_TEMPLATE)
    }

    /// Minimal document introducing a category directory
    pub fn render_category_index(&self, category: &str, generated_at: DateTime<Utc>) -> Result<String> {
        let view = CategoryIndexView {
            title: category,
            date: format_date(generated_at),
        };
        let output = self.tera.render(CATEGORY_INDEX_TEMPLATE, &Context::from_serialize(&view)?)?;
        ensure_marker(output, CATEGORY_INDEX_TEMPLATE)
    }
}

fn ensure_marker(output: String, template: &str) -> Result<String> {
    if output.contains(GENERATED_MARKER) {
        Ok(output)
    } else {
        Err(DocgenError::Output(format!(
            "template `{}` does not emit the `{}` marker",
            template, GENERATED_MARKER
        )))
    }
}

fn format_date(generated_at: DateTime<Utc>) -> String {
    generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn member_view<'a>(member: &'a MemberInfo, index: &TypeReferenceIndex) -> MemberView<'a> {
    let (type_text, default_value) = match &member.kind {
        MemberKind::Property { default_value } => {
            let default_value = if default_value.is_empty() {
                None
            } else {
                Some(escape_type_text(default_value))
            };
            (render_type(&member.ty, index), default_value)
        }
        MemberKind::Method { parameters } => (render_method_type(parameters, &member.ty, index), None),
    };

    MemberView {
        name: &member.name,
        kind: member.kind.label(),
        type_text,
        default_value,
        description: &member.description,
    }
}

/// Source-like signature block body
fn signature(declaration: &ParsedDeclaration) -> String {
    let info = &declaration.info;
    match &declaration.kind {
        DeclarationKind::Interface { members, heritage } => {
            let mut out = format!("interface {}", info.full_text);
            if let Some(heritage) = heritage {
                out.push(' ');
                out.push_str(heritage);
            }
            out.push_str(" {\n");
            for member in members {
                out.push_str("  ");
                out.push_str(&member.full_text);
                if !member.full_text.ends_with(';') && !member.full_text.ends_with(',') {
                    out.push(';');
                }
                out.push('\n');
            }
            out.push('}');
            out
        }
        DeclarationKind::TypeAlias { ty } => format!("type {} = {};", info.full_text, ty),
    }
}

/// Escape symbol characters into numeric references and flatten line breaks.
///
/// Quotes and backticks are escaped too, since the result lands inside
/// shortcode attribute values.
fn escape_type_text(ty: &str) -> String {
    let escaped = SPECIAL_CHARS.replace_all(ty.trim(), |caps: &Captures| {
        let c = caps[0].chars().next().map(u32::from).unwrap_or_default();
        format!("&#{};", c)
    });
    escaped.replace("\r\n", " ").replace('\n', " ")
}

/// Escape a type string and hyperlink every identifier that names a registered declaration.
///
/// Matching is on whole identifiers, so `Order` is never linked inside
/// `OrderLine`, and inserted markup is never scanned again.
pub fn render_type(ty: &str, index: &TypeReferenceIndex) -> String {
    let escaped = escape_type_text(ty);
    IDENTIFIER
        .replace_all(&escaped, |caps: &Captures| {
            let name = &caps[0];
            match index.get(name) {
                Some(path) => format!("<a href='{{{{< relref \"{}\" >}}}}'>{}</a>", path, name),
                None => name.to_string(),
            }
        })
        .into_owned()
}

/// `(a: A, b: B) => R`, with every type rendered through [`render_type`]
pub fn render_method_type(parameters: &[MethodParameter], return_type: &str, index: &TypeReferenceIndex) -> String {
    let params: Vec<String> = parameters
        .iter()
        .map(|p| {
            if p.ty.is_empty() {
                p.name.clone()
            } else {
                format!("{}: {}", p.name, render_type(&p.ty, index))
            }
        })
        .collect();
    format!("({}) => {}", params.join(", "), render_type(return_type, index))
}
