use std::fs;
use std::path::Path;

use apisplit_core::{
    ComponentKind, Document, Error, Format, PathEntry, Referenced, Report, SpecVersion, Status,
    codec, split,
};
use serde_json::json;

fn doc(value: serde_json::Value) -> Document {
    serde_json::from_value(value).unwrap()
}

fn listing(dir: &Path) -> Vec<String> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                pending.push(path);
            } else {
                files.push(path.strip_prefix(dir).unwrap().to_string_lossy().replace('\\', "/"));
            }
        }
    }
    files.sort();
    files
}

fn pets() -> Document {
    doc(json!({
        "openapi": "3.0.3",
        "info": {"title": "Pets", "version": "1.0.0"},
        "paths": {
            "/pets": {"get": {"responses": {"200": {"description": "ok"}}}},
            "/pets/{id}": {"get": {"responses": {"200": {"description": "ok"}}}},
        },
        "components": {
            "schemas": {"Pet": {"type": "object", "properties": {"name": {"type": "string"}}}},
        },
    }))
}

#[test]
fn split_pets_layout() {
    let dir = tempfile::tempdir().unwrap();
    let report = split(&pets(), dir.path(), SpecVersion::V3_0, Format::Yaml).unwrap();
    assert_eq!(report.status(), Status::Success);

    insta::assert_snapshot!(listing(dir.path()).join("\n"), @r"
    paths/pets.yaml
    paths/pets_{id}.yaml
    root.yaml
    schemas/Pet.yaml
    ");
}

#[test]
fn split_root_holds_stubs() {
    let dir = tempfile::tempdir().unwrap();
    split(&pets(), dir.path(), SpecVersion::V3_0, Format::Yaml).unwrap();

    let text = fs::read_to_string(dir.path().join("root.yaml")).unwrap();
    let root = codec::deserialize(text.as_bytes(), SpecVersion::V3_0, Format::Yaml);
    assert!(root.diagnostics.is_empty());
    let root = root.document;

    match &root.paths["/pets/{id}"] {
        PathEntry::Stub(stub) => {
            assert_eq!(stub.location, "paths/pets_{id}.yaml");
            assert_eq!(stub.id, "/pets/{id}");
            assert_eq!(stub.kind().unwrap(), ComponentKind::Path);
        }
        other => panic!("expected a stub, got {other:?}"),
    }
    match &root.components.schemas["Pet"] {
        Referenced::Stub(stub) => {
            assert_eq!(stub.location, "schemas/Pet.yaml");
            assert_eq!(stub.kind_tag, "Schema");
        }
        other => panic!("expected a stub, got {other:?}"),
    }
    assert_eq!(root.stub_count(), 3);
    assert_eq!(root.info.unwrap().title, "Pets");
}

#[test]
fn split_fragment_keeps_its_key() {
    let dir = tempfile::tempdir().unwrap();
    split(&pets(), dir.path(), SpecVersion::V3_0, Format::Json).unwrap();

    let text = fs::read_to_string(dir.path().join("paths").join("pets_{id}.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        value,
        json!({"paths": {"/pets/{id}": {"get": {"responses": {"200": {"description": "ok"}}}}}})
    );

    let text = fs::read_to_string(dir.path().join("schemas").join("Pet.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["components"]["schemas"]["Pet"]["type"], "object");
}

#[test]
fn split_skips_empty_families() {
    let dir = tempfile::tempdir().unwrap();
    let report = split(&pets(), dir.path(), SpecVersion::V3_0, Format::Yaml).unwrap();

    for kind in [
        ComponentKind::Parameter,
        ComponentKind::Example,
        ComponentKind::Header,
        ComponentKind::Response,
        ComponentKind::Link,
        ComponentKind::Callback,
        ComponentKind::RequestBody,
        ComponentKind::SecurityScheme,
    ] {
        assert!(report.empty_families.contains(&kind), "{kind} not reported");
    }
    for name in ["parameters", "responses", "securityschemes", "requestbodies"] {
        assert!(!dir.path().join(name).exists(), "{name} should not be created");
    }
}

#[test]
fn split_root_path_uses_reserved_stem() {
    let document = doc(json!({
        "openapi": "3.0.3",
        "info": {"title": "t", "version": "1"},
        "paths": {"/": {"get": {"responses": {}}}},
    }));
    let dir = tempfile::tempdir().unwrap();
    split(&document, dir.path(), SpecVersion::V3_0, Format::Yaml).unwrap();
    assert!(dir.path().join("paths").join("_root.yaml").is_file());
}

#[test]
fn split_path_collision_keeps_second_inline() {
    let document = doc(json!({
        "openapi": "3.0.3",
        "info": {"title": "t", "version": "1"},
        "paths": {
            "/a/b": {"get": {"operationId": "first", "responses": {}}},
            "/a_b": {"get": {"operationId": "second", "responses": {}}},
        },
    }));
    let dir = tempfile::tempdir().unwrap();
    let report = split(&document, dir.path(), SpecVersion::V3_0, Format::Yaml).unwrap();

    assert_eq!(report.status(), Status::SuccessWithWarnings);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].key, "/a_b");
    assert!(matches!(
        report.skipped[0].error,
        Error::FilenameCollision { .. }
    ));
    assert!(report.skeleton.paths["/a/b"].is_stub());
    assert!(!report.skeleton.paths["/a_b"].is_stub());

    // The first file was not overwritten.
    let text = fs::read_to_string(dir.path().join("paths").join("a_b.yaml")).unwrap();
    assert!(text.contains("first"));
    assert!(!text.contains("second"));
}

// Needs a case-sensitive file system.
#[cfg(target_os = "linux")]
#[test]
fn split_case_variants_are_written_with_a_warning() {
    let document = doc(json!({
        "openapi": "3.0.3",
        "info": {"title": "t", "version": "1"},
        "components": {"schemas": {"Pet": {"type": "object"}, "pet": {"type": "string"}}},
    }));
    let dir = tempfile::tempdir().unwrap();
    let report = split(&document, dir.path(), SpecVersion::V3_0, Format::Yaml).unwrap();
    assert!(report.skipped.is_empty(), "{:?}", report.skipped);
    assert_eq!(report.status(), Status::SuccessWithWarnings);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("pet.yaml"), "{}", report.warnings[0]);
    assert!(report.skeleton.components.schemas["Pet"].is_stub());
    assert!(report.skeleton.components.schemas["pet"].is_stub());

    let upper = fs::read_to_string(dir.path().join("schemas").join("Pet.yaml")).unwrap();
    let lower = fs::read_to_string(dir.path().join("schemas").join("pet.yaml")).unwrap();
    assert!(upper.contains("object"));
    assert!(lower.contains("string"));
}

#[test]
fn split_keeps_unnamed_top_level_fields() {
    let document = doc(json!({
        "openapi": "3.0.3",
        "info": {"title": "t", "version": "1", "x-team": "pets"},
        "servers": [{"url": "https://example.com"}],
        "x-internal": true,
        "components": {"x-shared": {"a": 1}},
    }));
    let dir = tempfile::tempdir().unwrap();
    let report = split(&document, dir.path(), SpecVersion::V3_0, Format::Yaml).unwrap();
    assert_eq!(report.skeleton.extra["x-internal"], json!(true));
    assert_eq!(report.skeleton.extra["servers"][0]["url"], "https://example.com");
    assert_eq!(report.skeleton.components.extra["x-shared"], json!({"a": 1}));
    assert_eq!(report.skeleton.info.as_ref().unwrap().extra["x-team"], "pets");
}
