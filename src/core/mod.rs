mod engine;
mod extractor;
mod model;
mod parser;
mod renderer;
mod tags;
mod type_index;
mod writer;

pub use engine::{category_listing, Engine, FileFailure, GenerationReport};
pub use extractor::DeclarationExtractor;
pub use model::{
    title_to_slug, DeclarationInfo, DeclarationKind, MemberInfo, MemberKind, MethodParameter,
    ParsedDeclaration, DEFAULT_WEIGHT,
};
pub use parser::{ParsedSource, SourceParser, Statement, StatementKind};
pub use renderer::{render_method_type, render_type, Renderer, GENERATED_MARKER};
pub use tags::{parse_doc_comment, DocTag};
pub use type_index::{SharedTypeIndex, TypeReferenceIndex};
pub use writer::{delete_generated, OutputWriter};
