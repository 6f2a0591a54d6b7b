//! Tests for rank type resolution into native tables.

use rankc::model::RankType;
use rankc::native::{
    FieldRankSettings, NativeRankTypeDefinition, NativeRankTypeDefinitionSet, NativeTable,
    NativeTableType,
};

fn tables(set: &NativeRankTypeDefinitionSet, rank_type: RankType, attribute: bool) -> Vec<String> {
    set.definition(rank_type)
        .unwrap()
        .tables_for(attribute)
        .map(|t| t.to_string())
        .collect()
}

#[test]
fn test_builtin_about_index_field() {
    let set = NativeRankTypeDefinitionSet::builtin();
    assert_eq!(
        tables(&set, RankType::About, false),
        vec![
            "firstOccurrenceTable expdecay(8000,12.50)",
            "occurrenceCountTable loggrowth(1500,4000,19)",
            "proximityTable expdecay(500,3)",
            "reverseProximityTable expdecay(400,3)",
        ]
    );
}

#[test]
fn test_builtin_attribute_tables() {
    let set = NativeRankTypeDefinitionSet::builtin();
    assert_eq!(tables(&set, RankType::About, true), vec!["weight linear(1,0)"]);
    assert_eq!(tables(&set, RankType::Identity, true), vec!["weight linear(1,0)"]);
    assert_eq!(
        tables(&set, RankType::Tags, true),
        vec!["weight loggrowth(38,50,1)"]
    );
    assert_eq!(tables(&set, RankType::Empty, true), vec!["weight linear(0,0)"]);
}

#[test]
fn test_identity_differs_from_about() {
    let set = NativeRankTypeDefinitionSet::builtin();
    let identity = tables(&set, RankType::Identity, false);
    assert_eq!(identity[0], "firstOccurrenceTable expdecay(100,12.50)");
    assert_eq!(identity[2], "proximityTable expdecay(5000,3)");
    assert_eq!(identity[3], "reverseProximityTable expdecay(3000,3)");
}

#[test]
fn test_empty_zeroes_everything() {
    let set = NativeRankTypeDefinitionSet::builtin();
    let definition = set.definition(RankType::Empty).unwrap();
    assert_eq!(definition.tables.len(), NativeTableType::ALL.len());
    assert!(definition.tables.iter().all(|t| t.name == "linear(0,0)"));
}

#[test]
fn test_default_has_no_definition() {
    let set = NativeRankTypeDefinitionSet::builtin();
    assert!(set.definition(RankType::Default).is_none());
    assert_eq!(set.supported(), vec!["identity", "about", "tags", "empty"]);
}

#[test]
fn test_storage_split_is_exhaustive() {
    for table_type in NativeTableType::ALL {
        assert_ne!(
            table_type.applies_to(true),
            table_type.applies_to(false),
            "{:?} must apply to exactly one storage kind",
            table_type
        );
    }
}

#[test]
fn test_custom_set() {
    let mut set = NativeRankTypeDefinitionSet::new("custom");
    set.add(
        NativeRankTypeDefinition::new(RankType::About)
            .with(NativeTableType::FirstOccurrence, "linear(2,0)"),
    );
    assert_eq!(set.name(), "custom");
    assert_eq!(set.supported(), vec!["about"]);
    assert!(set.definition(RankType::Tags).is_none());
    assert_eq!(tables(&set, RankType::About, true), Vec::<String>::new());
}

#[test]
fn test_field_settings_keys() {
    let mut settings = FieldRankSettings::new("title");
    assert!(settings
        .add_table(NativeTable::new(
            NativeTableType::FirstOccurrence,
            "expdecay(100,12.50)"
        ))
        .is_none());
    assert!(settings
        .add_table(NativeTable::new(NativeTableType::Proximity, "expdecay(5000,3)"))
        .is_none());

    let properties: Vec<(String, String)> = settings.properties().collect();
    assert_eq!(
        properties,
        vec![
            (
                "nativeFieldMatch.firstOccurrenceTable.title".to_string(),
                "expdecay(100,12.50)".to_string()
            ),
            (
                "nativeProximity.proximityTable.title".to_string(),
                "expdecay(5000,3)".to_string()
            ),
        ]
    );
}

#[test]
fn test_field_settings_first_table_wins() {
    let mut settings = FieldRankSettings::new("body");
    settings.add_table(NativeTable::new(NativeTableType::Weight, "linear(1,0)"));
    let duplicate = settings
        .add_table(NativeTable::new(NativeTableType::Weight, "linear(0,0)"))
        .unwrap();
    assert_eq!(duplicate.kept.name, "linear(1,0)");
    assert_eq!(duplicate.ignored.name, "linear(0,0)");
    assert_eq!(
        settings.table(NativeTableType::Weight).unwrap().name,
        "linear(1,0)"
    );
}
