//! End-to-end tests for the derive workflow.

use std::fs;

use rankc::build::{run_derive, GLOBAL_DIR};
use rankc::codec::decode_properties;
use tempfile::TempDir;

const MANIFEST: &str = r#"{
    "version": 1,
    "schemas": [
        {
            "name": "music",
            "attributes": [{"name": "popularity", "value_type": "int"}],
            "constants": [
                {"name": "w", "type": "tensor(x[2])", "file_reference": "ref-w"},
                {"name": "pending", "type": "tensor(x[2])", "file_reference": ""}
            ],
            "onnx_models": [
                {"name": "ranker", "file_reference": "ref-onnx", "inputs": {"in": "query(q)"}}
            ],
            "rank_profiles": [
                {
                    "name": "base",
                    "first_phase": "nativeRank",
                    "rank_settings": [{"field": "popularity", "rank_type": "about"}],
                    "filter_fields": ["genre"]
                },
                {
                    "name": "child",
                    "inherits": ["base"],
                    "first_phase": "nativeRank + attribute(popularity)",
                    "summary_features": ["nativeRank", "attribute(popularity)"]
                }
            ]
        }
    ],
    "global_profiles": [{"name": "shared", "second_phase": "bm25(title)"}],
    "options": {"threads": 2}
}"#;

fn write_manifest(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("manifest.json");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_run_derive_e2e() {
    let temp_dir = TempDir::new().unwrap();
    let manifest = write_manifest(&temp_dir, MANIFEST);
    let output = temp_dir.path().join("out");

    let summary = run_derive(&manifest, &output, None).unwrap();
    assert_eq!(summary.schemas, 1);
    assert_eq!(summary.profiles, 4);
    assert!(summary.bytes_written > 0);
    assert_eq!(summary.output_dirs.len(), 2);
    assert_eq!(summary.warnings.len(), 1);
    assert!(summary.warnings[0].contains("pending"));

    let music = output.join("music");
    for file in [
        "default.fef",
        "base.fef",
        "child.fef",
        "rank-profiles.json",
        "ranking-constants.json",
        "ranking-expressions.json",
        "onnx-models.json",
    ] {
        assert!(music.join(file).exists(), "{} should be written", file);
    }
    assert!(output.join(GLOBAL_DIR).join("shared.fef").exists());

    let child = decode_properties(&fs::read(music.join("child.fef")).unwrap()).unwrap();
    assert!(child.contains(&(
        "vespa.rank.firstphase".to_string(),
        "rankingExpression(firstphase)".to_string()
    )));
    assert!(child.contains(&(
        "vespa.isfilterfield.genre.part42".to_string(),
        "true".to_string()
    )));
    assert!(child.contains(&(
        "vespa.summary.feature.part1".to_string(),
        "attribute(popularity)".to_string()
    )));

    let base = decode_properties(&fs::read(music.join("base.fef")).unwrap()).unwrap();
    assert_eq!(
        base[0],
        ("vespa.rank.firstphase".to_string(), "nativeRank".to_string())
    );
    assert!(base.contains(&(
        "nativeAttributeMatch.weight.popularity".to_string(),
        "linear(1,0)".to_string()
    )));
}

#[test]
fn test_exported_config_json() {
    let temp_dir = TempDir::new().unwrap();
    let manifest = write_manifest(&temp_dir, MANIFEST);
    let output = temp_dir.path().join("out");
    run_derive(&manifest, &output, Some(1)).unwrap();

    let music = output.join("music");
    let profiles: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(music.join("rank-profiles.json")).unwrap())
            .unwrap();
    assert_eq!(profiles["kind"], "rank-profiles");
    let names: Vec<&str> = profiles["rankprofile"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["default", "base", "child"]);

    let child_fef = &profiles["rankprofile"][2]["fef"]["property"];
    assert!(child_fef
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p["name"] == "vespa.summary.feature"));

    let constants: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(music.join("ranking-constants.json")).unwrap())
            .unwrap();
    let constant = constants["constant"].as_array().unwrap();
    assert_eq!(constant.len(), 1);
    assert_eq!(constant[0]["fileref"], "ref-w");

    let models: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(music.join("onnx-models.json")).unwrap())
            .unwrap();
    assert_eq!(models["model"][0]["input"][0]["source"], "query(q)");
}

#[test]
fn test_same_output_for_any_thread_count() {
    let temp_dir = TempDir::new().unwrap();
    let manifest = write_manifest(&temp_dir, MANIFEST);
    let one = temp_dir.path().join("one");
    let many = temp_dir.path().join("many");
    run_derive(&manifest, &one, Some(1)).unwrap();
    run_derive(&manifest, &many, Some(8)).unwrap();

    for file in ["default.fef", "base.fef", "child.fef", "rank-profiles.json"] {
        assert_eq!(
            fs::read(one.join("music").join(file)).unwrap(),
            fs::read(many.join("music").join(file)).unwrap(),
            "{} differs",
            file
        );
    }
}

#[test]
fn test_missing_manifest_fails() {
    let temp_dir = TempDir::new().unwrap();
    let result = run_derive(
        &temp_dir.path().join("nope.json"),
        &temp_dir.path().join("out"),
        None,
    );
    assert!(result.is_err());
}

#[test]
fn test_cyclic_manifest_fails_without_output() {
    let temp_dir = TempDir::new().unwrap();
    let manifest = write_manifest(
        &temp_dir,
        r#"{
            "version": 1,
            "schemas": [{
                "name": "s",
                "rank_profiles": [
                    {"name": "a", "inherits": ["b"]},
                    {"name": "b", "inherits": ["a"]}
                ]
            }]
        }"#,
    );
    let output = temp_dir.path().join("out");
    let err = run_derive(&manifest, &output, None).unwrap_err();
    assert!(format!("{:#}", err).contains("unresolvable or cyclic"));
    assert!(!output.join("s").exists());
}

#[test]
fn test_escaping_profile_name_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let manifest = write_manifest(
        &temp_dir,
        r#"{
            "version": 1,
            "global_profiles": [{"name": "../../escaped", "first_phase": "nativeRank"}]
        }"#,
    );
    let output = temp_dir.path().join("out");
    let err = run_derive(&manifest, &output, None).unwrap_err();
    assert!(format!("{:#}", err).contains("Invalid rank profile name"));
    assert!(!output.exists());
    assert!(!temp_dir.path().join("escaped.fef").exists());
}
