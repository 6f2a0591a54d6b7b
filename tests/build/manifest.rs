//! Tests for manifest parsing.

use rankc::build::{DeploymentManifest, DeriveOptions};
use rankc::model::{RankSettingValue, RankType};

const MANIFEST: &str = r#"{
    "version": 1,
    "schemas": [
        {
            "name": "music",
            "attributes": [
                {"name": "year", "value_type": "int"},
                {"name": "embedding", "tensor_type": "tensor<float>(x[8])"}
            ],
            "constants": [
                {"name": "weights", "type": "tensor(x[8])", "file_reference": "abc123"}
            ],
            "rank_profiles": [
                {
                    "name": "popular",
                    "first_phase": "attribute(year) * 0.5",
                    "functions": [{"name": "scale", "params": ["x"], "body": "x * 2"}],
                    "rank_settings": [
                        {"field": "title", "rank_type": "identity"},
                        {"field": "title", "weight": 300}
                    ],
                    "tuning": {"rerank_count": 200},
                    "summary_features": ["attribute(year)"]
                }
            ]
        },
        {"name": "video", "inherits": "music"}
    ],
    "query_profile_types": {"q": "tensor<float>(x[8])"}
}"#;

#[test]
fn test_parse_full_manifest() {
    let manifest = DeploymentManifest::from_json(MANIFEST).unwrap();
    assert_eq!(manifest.schemas.len(), 2);
    assert_eq!(manifest.options, DeriveOptions::default());

    let music = &manifest.schemas[0];
    assert_eq!(music.schema.attributes.len(), 2);
    assert_eq!(music.schema.constants[0].tensor_type, "tensor(x[8])");

    let popular = &music.rank_profiles[0];
    assert_eq!(
        popular.first_phase.as_ref().unwrap().to_string(),
        "attribute(year) * 0.5"
    );
    assert_eq!(popular.functions[0].params, vec!["x".to_string()]);
    assert_eq!(
        popular.rank_settings[0].value,
        RankSettingValue::RankType(RankType::Identity)
    );
    assert_eq!(popular.rank_settings[1].value, RankSettingValue::Weight(300));
    assert_eq!(popular.tuning.rerank_count, Some(200));
    assert_eq!(manifest.query_profile_types["q"], "tensor<float>(x[8])");
}

#[test]
fn test_registry_knows_schema_inheritance() {
    let registry = DeploymentManifest::from_json(MANIFEST).unwrap().registry();
    let schemas: Vec<&str> = registry.schemas().collect();
    assert_eq!(schemas, vec!["music", "video"]);
    let found = registry.resolve(Some("video"), "popular").unwrap();
    assert_eq!(found.schema.as_deref(), Some("music"));
}

#[test]
fn test_bad_expression_rejected_at_parse_time() {
    let json = r#"{
        "version": 1,
        "global_profiles": [{"name": "p", "first_phase": "a + "}]
    }"#;
    let err = DeploymentManifest::from_json(json).unwrap_err();
    assert!(err.starts_with("Invalid manifest JSON"), "{}", err);
}

#[test]
fn test_unknown_rank_type_rejected() {
    let json = r#"{
        "version": 1,
        "global_profiles": [
            {"name": "p", "rank_settings": [{"field": "f", "rank_type": "fancy"}]}
        ]
    }"#;
    assert!(DeploymentManifest::from_json(json).is_err());
}

#[test]
fn test_options_override_defaults() {
    let json = r#"{"version": 1, "options": {"threads": 3, "compression_quality": 5}}"#;
    let manifest = DeploymentManifest::from_json(json).unwrap();
    assert_eq!(manifest.options.threads, 3);
    assert_eq!(manifest.options.compression_quality, 5);
    assert_eq!(
        manifest.options.max_properties,
        DeriveOptions::default().max_properties
    );
}

#[test]
fn test_names_must_be_plain_path_components() {
    let cases = [
        r#"{"version": 1, "schemas": [{"name": "../escape"}]}"#,
        r#"{"version": 1, "schemas": [{"name": "s", "rank_profiles": [{"name": "a/b"}]}]}"#,
        r#"{"version": 1, "global_profiles": [{"name": ".."}]}"#,
        r#"{"version": 1, "global_profiles": [{"name": "c:\\x"}]}"#,
        r#"{"version": 1, "global_profiles": [{"name": ""}]}"#,
    ];
    for json in cases {
        let err = DeploymentManifest::from_json(json).unwrap_err();
        assert!(err.starts_with("Invalid "), "{}: {}", json, err);
    }
}

#[test]
fn test_schema_may_not_take_global_dir() {
    let json = r#"{"version": 1, "schemas": [{"name": "_global"}]}"#;
    let err = DeploymentManifest::from_json(json).unwrap_err();
    assert!(err.contains("reserved"), "{}", err);
}
