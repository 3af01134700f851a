use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

use tsdocgen::core::{category_listing, GENERATED_MARKER};
use tsdocgen::{Config, Engine, TypeReferenceIndex};

const COMMON_TS: &str = r#"import { ShippingMethod } from './shipping';

/**
 * @description
 * Something with a bar.
 *
 * @docsCategory common
 */
export interface Foo {
    /**
     * @description the bar value
     */
    bar: string;
    /**
     * @description How many to fetch.
     * @default 5
     */
    take?: number;
    method: ShippingMethod;
    lookup(id: string, method: ShippingMethod): Promise<ShippingMethod | undefined>;
}

/**
 * @docsCategory common
 * @docsWeight 5
 */
export type FooId = string | number;

export interface Undocumented {
    hidden: boolean;
}
"#;

const SHIPPING_TS: &str = r#"/**
 * @description A shipping method.
 * @docsCategory shipping
 */
export interface ShippingMethod {
    code: string;
}
"#;

fn engine(root: &TempDir) -> Engine {
    let mut config = Config::default();
    config.project.source_root = root.path().to_path_buf();
    Engine::from_config(config).unwrap()
}

fn sources(src: &TempDir) -> Vec<std::path::PathBuf> {
    src.child("common.ts").write_str(COMMON_TS).unwrap();
    src.child("shipping.ts").write_str(SHIPPING_TS).unwrap();
    vec![src.child("common.ts").path().to_path_buf(), src.child("shipping.ts").path().to_path_buf()]
}

fn strip_dates(content: &str) -> String {
    content
        .lines()
        .filter(|line| !line.starts_with("date: "))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn generates_category_tree() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let files = sources(&src);

    let mut index = TypeReferenceIndex::new();
    let report = engine(&src).generate(&files, out.path(), &mut index).unwrap();

    assert!(report.is_success());
    assert_eq!(report.documents_written, 3);

    out.child("common/foo.md").assert(predicate::path::exists());
    out.child("common/foo-id.md").assert(predicate::path::exists());
    out.child("common/_index.md").assert(predicate::str::contains(GENERATED_MARKER));
    out.child("shipping/shipping-method.md").assert(predicate::path::exists());
    out.child("shipping/_index.md").assert(predicate::path::exists());
    out.child("common/undocumented.md").assert(predicate::path::missing());
}

#[test]
fn foo_document_contents() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let files = sources(&src);

    let mut index = TypeReferenceIndex::new();
    engine(&src).generate(&files, out.path(), &mut index).unwrap();

    let foo = out.child("common/foo.md");
    foo.assert(predicate::str::contains("# Foo\n"));
    foo.assert(predicate::str::contains("sourceFile=\"common.ts\" sourceLine=\"9\""));
    foo.assert(predicate::str::contains("Something with a bar."));
    foo.assert(predicate::str::contains(
        "### bar\n\n{{< member-info kind=\"property\" type=`string` >}}\n\nthe bar value\n",
    ));
    foo.assert(predicate::str::contains(
        "{{< member-info kind=\"property\" type=`number` default=\"5\" >}}",
    ));
    foo.assert(predicate::str::contains("kind=\"method\""));
    foo.assert(predicate::str::contains("  take?: number;\n"));
    foo.assert(predicate::str::contains("interface Foo {\n"));

    let link = "<a href='{{< relref \"shipping/shipping-method\" >}}'>ShippingMethod</a>";
    let content = std::fs::read_to_string(foo.path()).unwrap();
    assert!(content.contains(&format!("type=`{}`", link)));
    assert!(content.contains(&format!(
        "type=`(id: string, method: {}) => Promise&#60;{} | undefined&#62;`",
        link, link
    )));

    out.child("common/foo-id.md")
        .assert(predicate::str::contains("type FooId = string | number;"))
        .assert(predicate::str::contains("weight: 5\n"));
}

#[test]
fn regeneration_is_idempotent_apart_from_date() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let files = sources(&src);
    let engine = engine(&src);

    engine.generate(&files, out.path(), &mut TypeReferenceIndex::new()).unwrap();
    let first = std::fs::read_to_string(out.child("common/foo.md").path()).unwrap();

    let report = engine.generate(&files, out.path(), &mut TypeReferenceIndex::new()).unwrap();
    let second = std::fs::read_to_string(out.child("common/foo.md").path()).unwrap();

    assert_eq!(report.stale_removed, 5);
    assert_eq!(strip_dates(&first), strip_dates(&second));
}

#[test]
fn prepass_removes_only_generated_files() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let files = sources(&src);

    out.child("common/stale.md")
        .write_str(&format!("---\n{}\n---\n# Stale\n", GENERATED_MARKER))
        .unwrap();
    out.child("common/guide.md").write_str("# Hand-written guide\n").unwrap();

    let mut index = TypeReferenceIndex::new();
    engine(&src).generate(&files, out.path(), &mut index).unwrap();

    out.child("common/stale.md").assert(predicate::path::missing());
    out.child("common/guide.md").assert("# Hand-written guide\n");
}

#[test]
fn listing_uses_stored_weight() {
    let src = TempDir::new().unwrap();
    let files = sources(&src);
    let engine = engine(&src);

    let mut index = TypeReferenceIndex::new();
    let mut declarations = Vec::new();
    for file in &files {
        declarations.extend(engine.extract_file(file, &mut index).unwrap());
    }

    let listing = category_listing(&declarations);
    let common: Vec<(&str, i32)> = listing["common"]
        .iter()
        .map(|d| (d.info.title.as_str(), d.info.weight))
        .collect();
    assert_eq!(common, vec![("FooId", 5), ("Foo", 10)]);
}
