//! Persistence round trips through JSON files

use delve::{
    from_json, generate, load_from_path, save_to_path, to_json, DelveError, DelveResult,
    GenerationConfig, GraphValidator, Map, PropertyValue, RegionId, Violation,
};
use std::collections::BTreeSet;

fn region_ids(map: &Map) -> BTreeSet<RegionId> {
    map.regions().iter().map(|r| r.id).collect()
}

fn connection_ids(map: &Map) -> BTreeSet<u32> {
    map.connections().iter().map(|c| c.id.0).collect()
}

#[test]
fn test_file_round_trip_preserves_everything() -> DelveResult<()> {
    let generated = generate(&GenerationConfig::for_detailed_generation(8))?;
    let map = generated.map;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("map.json");
    save_to_path(&map, &path)?;
    let loaded = load_from_path(&path)?;

    assert_eq!(region_ids(&loaded), region_ids(&map));
    assert_eq!(connection_ids(&loaded), connection_ids(&map));
    assert_eq!(loaded.regions(), map.regions());
    assert_eq!(loaded.connections(), map.connections());
    assert_eq!(loaded.corridors(), map.corridors());
    assert_eq!(loaded.header(), map.header());
    Ok(())
}

#[test]
fn test_extensions_survive_round_trip() -> DelveResult<()> {
    let map = generate(&GenerationConfig::for_testing(4))?.map;
    let mut record = map.to_record()?;

    let mut extended = Map::from_record(record.clone())?.regions()[0].clone();
    extended.set_extension("torch_count", PropertyValue::Int(3));
    extended.set_extension("haunted", PropertyValue::Bool(true));
    record.regions[0] = delve::RegionRecord::from_region(&extended)?;

    let reloaded = from_json(&to_json(&Map::from_record(record)?)?)?;
    let region = &reloaded.regions()[0];
    assert_eq!(
        region.extension("torch_count"),
        Some(&PropertyValue::Int(3))
    );
    assert_eq!(
        region.extension("haunted"),
        Some(&PropertyValue::Bool(true))
    );
    Ok(())
}

#[test]
fn test_loaded_map_validates_like_original() -> DelveResult<()> {
    let map = generate(&GenerationConfig::new(17))?.map;
    let loaded = from_json(&to_json(&map)?)?;

    let validator = GraphValidator::new();
    assert_eq!(validator.validate(&loaded), validator.validate(&map));
    Ok(())
}

#[test]
fn test_far_out_region_is_reported_not_fatal() -> DelveResult<()> {
    let map = generate(&GenerationConfig::for_testing(42))?.map;
    let mut value: serde_json::Value = serde_json::from_str(&to_json(&map)?)?;
    value["regions"][0]["position"]["x"] = serde_json::json!(2_147_483_600i64);

    let loaded = from_json(&value.to_string())?;
    let moved = loaded.regions()[0].id;
    assert_eq!(loaded.corridors().len(), loaded.connections().len());

    let report = GraphValidator::new().validate(&loaded);
    let out_of_bounds = report.violations.iter().any(|v| match v {
        Violation::RegionOutOfBounds { region } => *region == moved,
        _ => false,
    });
    assert!(out_of_bounds, "{}", report);
    assert!(!report.is_acceptable());
    Ok(())
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_from_path(dir.path().join("absent.json"));
    assert!(matches!(result, Err(DelveError::Io(_))));
}

#[test]
fn test_serialized_shape() -> DelveResult<()> {
    let map = generate(&GenerationConfig::for_testing(9))?.map;
    let value: serde_json::Value = serde_json::from_str(&to_json(&map)?)?;

    assert_eq!(value["type"], "Dungeon");
    assert_eq!(value["size"]["width"], 800);
    let region = &value["regions"][0];
    assert_eq!(region["type"], "Spawn");
    assert!(region["position"]["x"].is_number());
    assert!(region["properties"]["difficulty"].is_number());

    if let Some(connection) = value["connections"].get(0) {
        assert!(connection["sourceRegionId"].is_number());
        assert!(connection["targetRegionId"].is_number());
    }
    Ok(())
}
