use std::path::PathBuf;

use aq_core::UnitSystem;
use aq_project::{NodeData, load_yaml};

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos/flowsheets")
        .join(name)
}

#[test]
fn demos_load_and_validate() {
    for name in ["two_stage_ro.yaml", "hrro_us.yaml", "legacy_v1.yaml"] {
        let path = demo(name);
        let result = load_yaml(&path);
        assert!(
            result.is_ok(),
            "demo failed to load: {} => {:?}",
            path.display(),
            result.err()
        );
    }
}

#[test]
fn legacy_demo_is_migrated() {
    let sheet = load_yaml(&demo("legacy_v1.yaml")).unwrap();
    assert_eq!(sheet.version, aq_project::LATEST_VERSION);
    assert_eq!(sheet.unit_system, UnitSystem::Metric);
    assert_eq!(sheet.feed.flow_rate, Some(50.0));
    assert_eq!(sheet.feed.temperature, Some(22.0));

    let swro = sheet.node("swro").unwrap();
    match &swro.data {
        NodeData::RO(stage) => {
            assert_eq!(stage.elements, Some(42.0));
            assert_eq!(stage.pressure, Some(58.0));
        }
        other => panic!("expected RO, got {other:?}"),
    }
}

#[test]
fn us_demo_keeps_display_units() {
    let sheet = load_yaml(&demo("hrro_us.yaml")).unwrap();
    assert_eq!(sheet.unit_system, UnitSystem::Us);
    match &sheet.node("hrro-1").unwrap().data {
        NodeData::HRRO(stage) => assert_eq!(stage.pressure, Some(200.0)),
        other => panic!("expected HRRO, got {other:?}"),
    }
}
