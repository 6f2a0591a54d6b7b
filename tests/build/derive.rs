//! Tests for single-profile derivation.

use rankc::derive::derive_profile;
use rankc::model::{
    Attribute, DiversitySettings, MatchPhaseSettings, RankProperty, RankType, Tuning,
};
use rankc::native::{NativeRankTypeDefinition, NativeRankTypeDefinitionSet, NativeTableType};
use rankc::testing::{
    function, make_child, make_profile, profile_with_first_phase, rank_type, weight,
    DeriveFixture,
};
use rankc::{DeriveError, DeriveWarning, RankProfile};

fn keys(profile: &rankc::DerivedProfile) -> Vec<&str> {
    profile.properties.iter().map(|(k, _)| k.as_str()).collect()
}

#[test]
fn test_bare_first_phase_is_passed_through() {
    let fixture = DeriveFixture::new();
    let derived =
        derive_profile(&profile_with_first_phase("p", "nativeRank"), &fixture.ctx()).unwrap();
    assert_eq!(derived.get("vespa.rank.firstphase"), Some("nativeRank"));
    assert!(!derived.has("rankingExpression(firstphase).rankingScript"));
}

#[test]
fn test_computed_first_phase_gets_a_script() {
    let fixture = DeriveFixture::new();
    let profile = profile_with_first_phase("p", "nativeRank + attribute(popularity)");
    let derived = derive_profile(&profile, &fixture.ctx()).unwrap();
    assert_eq!(
        derived.properties,
        vec![
            (
                "vespa.rank.firstphase".to_string(),
                "rankingExpression(firstphase)".to_string()
            ),
            (
                "rankingExpression(firstphase).rankingScript".to_string(),
                "nativeRank + attribute(popularity)".to_string()
            ),
        ]
    );
}

#[test]
fn test_phase_override_replaces_declared_phase() {
    let fixture = DeriveFixture::new();
    let mut profile = profile_with_first_phase("p", "nativeRank");
    profile.rank_properties.push(RankProperty {
        name: "rankingExpression(firstphase).rankingScript".to_string(),
        value: "attribute(a) * 2".to_string(),
    });
    let derived = derive_profile(&profile, &fixture.ctx()).unwrap();
    assert_eq!(
        derived.get("vespa.rank.firstphase"),
        Some("rankingExpression(firstphase)")
    );
    assert_eq!(
        derived.get("rankingExpression(firstphase).rankingScript"),
        Some("attribute(a) * 2")
    );
    assert_eq!(derived.properties.len(), 2);
}

#[test]
fn test_unparseable_override_fails() {
    let fixture = DeriveFixture::new();
    let mut profile = make_profile("broken", None);
    profile.rank_properties.push(RankProperty {
        name: "rankingExpression(secondphase).rankingScript".to_string(),
        value: "a +".to_string(),
    });
    match derive_profile(&profile, &fixture.ctx()) {
        Err(DeriveError::InvalidPhaseExpression { profile, phase, .. }) => {
            assert_eq!(profile, "broken");
            assert_eq!(phase, "secondphase");
        }
        other => panic!("expected InvalidPhaseExpression, got {:?}", other),
    }
}

#[test]
fn test_about_on_attribute_versus_index_field() {
    let fixture = DeriveFixture::with_attributes(&["popularity"]);
    let mut profile = make_profile("p", None);
    profile.rank_settings = vec![
        rank_type("popularity", RankType::About),
        rank_type("body", RankType::About),
    ];
    let derived = derive_profile(&profile, &fixture.ctx()).unwrap();
    assert_eq!(
        keys(&derived),
        vec![
            "nativeAttributeMatch.weight.popularity",
            "nativeFieldMatch.firstOccurrenceTable.body",
            "nativeFieldMatch.occurrenceCountTable.body",
            "nativeProximity.proximityTable.body",
            "nativeProximity.reverseProximityTable.body",
        ]
    );
    assert_eq!(
        derived.get("nativeAttributeMatch.weight.popularity"),
        Some("linear(1,0)")
    );
    assert_eq!(
        derived.get("nativeFieldMatch.firstOccurrenceTable.body"),
        Some("expdecay(8000,12.50)")
    );
}

#[test]
fn test_default_rank_type_emits_nothing() {
    let fixture = DeriveFixture::new();
    let mut profile = make_profile("p", None);
    profile.rank_settings = vec![rank_type("body", RankType::Default)];
    assert!(derive_profile(&profile, &fixture.ctx())
        .unwrap()
        .properties
        .is_empty());
}

#[test]
fn test_duplicate_tables_warn_and_keep_first() {
    let fixture = DeriveFixture::new();
    let mut profile = make_profile("dup", None);
    profile.rank_settings = vec![
        rank_type("title", RankType::Identity),
        rank_type("title", RankType::About),
    ];
    let derived = derive_profile(&profile, &fixture.ctx()).unwrap();

    assert_eq!(
        derived.get("nativeFieldMatch.firstOccurrenceTable.title"),
        Some("expdecay(100,12.50)")
    );
    assert_eq!(derived.properties.len(), 4);
    assert_eq!(derived.warnings.len(), 4);
    assert_eq!(
        derived.warnings[0],
        DeriveWarning::DuplicateNativeTable {
            profile: "dup".to_string(),
            field: "title".to_string(),
            kept: "firstOccurrenceTable expdecay(100,12.50)".to_string(),
            ignored: "firstOccurrenceTable expdecay(8000,12.50)".to_string(),
        }
    );
}

#[test]
fn test_duplicate_field_weight_keeps_first() {
    let fixture = DeriveFixture::new();
    let mut profile = make_profile("weights", None);
    profile.rank_settings = vec![
        weight("title", 100),
        weight("body", 50),
        weight("title", 200),
    ];
    let derived = derive_profile(&profile, &fixture.ctx()).unwrap();

    let weights: Vec<_> = derived
        .properties
        .iter()
        .filter(|(k, _)| k.starts_with("vespa.fieldweight."))
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    assert_eq!(
        weights,
        vec![
            ("vespa.fieldweight.title", "100"),
            ("vespa.fieldweight.body", "50"),
        ]
    );
    assert_eq!(
        derived.warnings,
        vec![DeriveWarning::DuplicateFieldWeight {
            profile: "weights".to_string(),
            field: "title".to_string(),
            kept: 100,
            ignored: 200,
        }]
    );
}

#[test]
fn test_unsupported_rank_type_names_alternatives() {
    let mut fixture = DeriveFixture::new();
    let mut rank_types = NativeRankTypeDefinitionSet::new("limited");
    rank_types.add(
        NativeRankTypeDefinition::new(RankType::About)
            .with(NativeTableType::FirstOccurrence, "expdecay(8000,12.50)"),
    );
    fixture.rank_types = rank_types;

    let mut profile = make_profile("p", None);
    profile.rank_settings = vec![rank_type("tags_field", RankType::Tags)];
    match derive_profile(&profile, &fixture.ctx()) {
        Err(DeriveError::UnsupportedRankType {
            field,
            rank_type,
            supported,
            ..
        }) => {
            assert_eq!(field, "tags_field");
            assert_eq!(rank_type, "tags");
            assert_eq!(supported, vec!["about".to_string()]);
        }
        other => panic!("expected UnsupportedRankType, got {:?}", other),
    }
}

#[test]
fn test_functions_become_scripts_and_calls_inline() {
    let fixture = DeriveFixture::new();
    let mut profile = profile_with_first_phase("p", "boost + scale(attribute(a) + 1)");
    profile.functions = vec![
        function("boost", &[], "query(w) * 2"),
        function("scale", &["x"], "x * 10"),
    ];
    let derived = derive_profile(&profile, &fixture.ctx()).unwrap();

    assert_eq!(
        derived.get("rankingExpression(boost).rankingScript"),
        Some("query(w) * 2")
    );
    assert!(!derived.has("rankingExpression(scale).rankingScript"));
    assert_eq!(
        derived.get("rankingExpression(firstphase).rankingScript"),
        Some("rankingExpression(boost) + ((attribute(a) + 1) * 10)")
    );
}

#[test]
fn test_recursive_function_fails() {
    let fixture = DeriveFixture::new();
    let mut profile = profile_with_first_phase("p", "f(1)");
    profile.functions = vec![function("f", &["x"], "f(x) + 1")];
    assert!(matches!(
        derive_profile(&profile, &fixture.ctx()),
        Err(DeriveError::RecursiveFunction { .. })
    ));
}

#[test]
fn test_wrong_arity_fails() {
    let fixture = DeriveFixture::new();
    let mut profile = profile_with_first_phase("p", "scale(1, 2)");
    profile.functions = vec![function("scale", &["x"], "x * 10")];
    match derive_profile(&profile, &fixture.ctx()) {
        Err(DeriveError::FunctionArity {
            expected, actual, ..
        }) => assert_eq!((expected, actual), (1, 2)),
        other => panic!("expected FunctionArity, got {:?}", other),
    }
}

#[test]
fn test_features_weights_and_flags() {
    let fixture = DeriveFixture::new();
    let mut profile = make_profile("p", None);
    profile.functions = vec![function("boost", &[], "2")];
    profile.rank_settings = vec![weight("title", 200)];
    profile.summary_features.insert("boost".to_string());
    profile.summary_features.insert("bm25(title)".to_string());
    profile.rank_features.insert("nativeRank".to_string());
    profile.ignore_default_rank_features = true;

    let derived = derive_profile(&profile, &fixture.ctx()).unwrap();
    assert_eq!(
        keys(&derived),
        vec![
            "rankingExpression(boost).rankingScript",
            "vespa.fieldweight.title",
            "vespa.summary.feature.part0",
            "vespa.summary.feature.part1",
            "vespa.dump.feature.part2",
            "vespa.dump.ignoredefaultfeatures",
        ]
    );
    assert_eq!(derived.get("vespa.fieldweight.title"), Some("200"));
    assert_eq!(
        derived.get("vespa.summary.feature.part0"),
        Some("rankingExpression(boost)")
    );
    assert_eq!(derived.get("vespa.summary.feature.part1"), Some("bm25(title)"));
}

#[test]
fn test_tuning_and_match_phase() {
    let fixture = DeriveFixture::new();
    let mut profile = make_profile("p", None);
    profile.tuning = Tuning {
        rerank_count: Some(100),
        keep_rank_count: Some(-1),
        rank_score_drop_limit: Some(-5.0),
        num_threads_per_search: Some(0),
        termwise_limit: Some(1.0),
        ..Tuning::default()
    };
    profile.match_phase = Some(MatchPhaseSettings {
        attribute: "popularity".to_string(),
        ascending: false,
        max_hits: 1000,
        max_filter_coverage: 0.2,
        evaluation_point: 0.2,
        post_filter_multiplier: 1.0,
        diversity: Some(DiversitySettings {
            attribute: "artist".to_string(),
            min_groups: 5,
            cutoff_factor: 10.0,
            cutoff_strategy: Default::default(),
        }),
    });

    let derived = derive_profile(&profile, &fixture.ctx()).unwrap();
    assert_eq!(derived.get("vespa.hitcollector.heapsize"), Some("100"));
    assert!(!derived.has("vespa.hitcollector.arraysize"));
    assert_eq!(
        derived.get("vespa.hitcollector.rankscoredroplimit"),
        Some("-5.0")
    );
    assert!(!derived.has("vespa.matching.numthreadspersearch"));
    assert!(!derived.has("vespa.matching.termwise_limit"));
    assert_eq!(
        derived.get("vespa.matchphase.degradation.maxhits"),
        Some("1000")
    );
    assert_eq!(
        derived.get("vespa.matchphase.degradation.postfiltermultiplier"),
        Some("1.0")
    );
    assert_eq!(
        derived.get("vespa.matchphase.diversity.cutoff.strategy"),
        Some("loose")
    );
    assert_eq!(derived.get("vespa.matchphase.diversity.mingroups"), Some("5"));
}

#[test]
fn test_filter_fields_are_inherited() {
    let mut fixture = DeriveFixture::new();
    let mut parent = make_profile("parent", Some("music"));
    parent.filter_fields.insert("genre".to_string());
    fixture.registry.add(parent);

    let mut child = make_child("child", Some("music"), &["parent"]);
    child.filter_fields.insert("album".to_string());
    fixture.registry.add(child.clone());

    let derived = derive_profile(&child, &fixture.ctx()).unwrap();
    assert_eq!(
        keys(&derived),
        vec![
            "vespa.isfilterfield.album.part42",
            "vespa.isfilterfield.genre.part42",
        ]
    );
}

#[test]
fn test_attribute_and_query_types() {
    let mut fixture = DeriveFixture::new();
    fixture
        .attributes
        .add(Attribute::tensor("embedding", "tensor<float>(x[4])"));
    fixture
        .query_types
        .insert("q".to_string(), "tensor<float>(x[4])".to_string());
    fixture
        .query_types
        .insert("w".to_string(), "double".to_string());

    let mut profile = make_profile("p", None);
    profile
        .inputs
        .insert("w".to_string(), "tensor(x[2])".to_string());
    let derived = derive_profile(&profile, &fixture.ctx()).unwrap();

    assert_eq!(
        derived.get("vespa.type.attribute.embedding"),
        Some("tensor<float>(x[4])")
    );
    assert_eq!(
        derived.get("vespa.type.query.q"),
        Some("tensor<float>(x[4])")
    );
    assert_eq!(derived.get("vespa.type.query.w"), Some("tensor(x[2])"));
}

#[test]
fn test_property_cap() {
    let mut fixture = DeriveFixture::new();
    fixture.max_properties = 3;
    let mut profile = make_profile("big", None);
    for i in 0..5 {
        profile.rank_properties.push(RankProperty {
            name: "foo".to_string(),
            value: i.to_string(),
        });
    }
    match derive_profile(&profile, &fixture.ctx()) {
        Err(DeriveError::TooManyProperties { profile, limit, .. }) => {
            assert_eq!(profile, "big");
            assert_eq!(limit, 3);
        }
        other => panic!("expected TooManyProperties, got {:?}", other),
    }
}

#[test]
fn test_derivation_is_deterministic() {
    let fixture = DeriveFixture::with_attributes(&["price"]);
    let profile: RankProfile = rankc::testing::independent_profiles(1).remove(0);
    let first = derive_profile(&profile, &fixture.ctx()).unwrap();
    let second = derive_profile(&profile, &fixture.ctx()).unwrap();
    assert_eq!(first, second);
}
