use aq_chem::{BalanceMode, Ion, IonVector};
use aq_core::UnitSystem;
use aq_project::schema::*;
use aq_project::{FileStore, FlowsheetStore, load_json, load_yaml, save_json, save_yaml};

fn sample() -> Flowsheet {
    let mut sheet = Flowsheet::new("Roundtrip", UnitSystem::Metric);
    sheet.defaults.charge_balance = Some(BalanceMode::Cations);
    sheet.feed = FeedDef {
        flow_rate: Some(80.0),
        temperature: Some(18.0),
        ph: Some(7.1),
        ions: IonVector::new().with(Ion::Na, 250.0).with(Ion::Cl, 380.0),
        ..Default::default()
    };
    let ro = sheet.add_unit(
        NodeData::RO(MembraneStage {
            elements: Some(12.0),
            pressure: Some(11.5),
            ..Default::default()
        }),
        200.0,
    );
    let hrro = sheet.add_unit(
        NodeData::HRRO(HrroStage {
            stop_recovery_pct: Some(92.0),
            membrane: MembraneSelection {
                mode: MembraneMode::Custom,
                a_lmh_bar: Some(2.8),
                ..Default::default()
            },
            ..Default::default()
        }),
        400.0,
    );
    sheet.connect("feed", ro.clone());
    sheet.connect(ro, hrro.clone());
    sheet.connect(hrro, "product");
    sheet
}

#[test]
fn roundtrip_yaml() {
    let sheet = sample();
    let path = std::env::temp_dir().join("aq_project_roundtrip.yaml");
    save_yaml(&path, &sheet).unwrap();
    let loaded = load_yaml(&path).unwrap();
    assert_eq!(sheet, loaded);
}

#[test]
fn roundtrip_json() {
    let sheet = sample();
    let path = std::env::temp_dir().join("aq_project_roundtrip.json");
    save_json(&path, &sheet).unwrap();
    let loaded = load_json(&path).unwrap();
    assert_eq!(sheet, loaded);
}

#[test]
fn file_store_round_trip() {
    let sheet = sample();
    let store = FileStore::new(std::env::temp_dir().join("aq_project_store.yml"));
    store.save(&sheet).unwrap();
    assert_eq!(store.load().unwrap(), sheet);
}
