//! Normalized declaration records produced by the extractor.

use serde::Serialize;
use std::path::PathBuf;

/// Ordering weight used when a declaration carries no valid `@docsWeight`
pub const DEFAULT_WEIGHT: i32 = 10;

/// Attributes shared by every documentable declaration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeclarationInfo {
    /// Path of origin, relative to the source root
    pub source_file: PathBuf,

    /// 1-based line of the declaration start
    pub source_line: usize,

    /// Declaration identifier
    pub title: String,

    /// Name plus generic type parameters, as written in source
    pub full_text: String,

    /// Documentation grouping; always non-empty on a produced record
    pub category: String,

    /// Ordering weight within the category
    pub weight: i32,

    /// Free-text documentation, possibly empty
    pub description: String,

    /// Filesystem-safe slug derived from the title
    pub file_name: String,
}

impl DeclarationInfo {
    /// `category/fileName`, the location other documents link to
    pub fn output_path(&self) -> String {
        format!("{}/{}", self.category, self.file_name)
    }
}

/// A declaration that made it through extraction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedDeclaration {
    #[serde(flatten)]
    pub info: DeclarationInfo,

    #[serde(flatten)]
    pub kind: DeclarationKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeclarationKind {
    Interface {
        /// Members in source order
        members: Vec<MemberInfo>,
        /// `extends ...` clause text, if any
        heritage: Option<String>,
    },
    TypeAlias {
        /// Full text of the aliased type expression
        #[serde(rename = "type")]
        ty: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberInfo {
    pub name: String,
    pub description: String,

    /// Raw type text; empty when not annotated
    #[serde(rename = "type")]
    pub ty: String,

    /// Verbatim member source, used for the signature block
    pub full_text: String,

    #[serde(flatten)]
    pub kind: MemberKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "member_kind", rename_all = "snake_case")]
pub enum MemberKind {
    Property { default_value: String },
    Method { parameters: Vec<MethodParameter> },
}

impl MemberKind {
    pub fn label(&self) -> &'static str {
        match self {
            MemberKind::Property { .. } => "property",
            MemberKind::Method { .. } => "method",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodParameter {
    pub name: String,
    /// Empty when the parameter has no type annotation
    #[serde(rename = "type")]
    pub ty: String,
}

/// Split a title at ASCII uppercase boundaries and join with hyphens, lower-cased.
///
/// `ShippingMethodQuote` becomes `shipping-method-quote`. Runs of capitals are
/// split letter by letter (`ID` becomes `i-d`).
pub fn title_to_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len() + 4);
    for (i, c) in title.chars().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            slug.push('-');
        }
        slug.push(c.to_ascii_lowercase());
    }
    slug
}
