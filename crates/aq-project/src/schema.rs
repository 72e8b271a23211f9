//! Flowsheet schema definitions.
//!
//! Every unit-bearing number in a flowsheet is stored in the flowsheet's own
//! `unit_system`; conversion to SI happens once, when stages are compiled.
//! Membrane parameters and HRRO loop volumes are always SI.

use aq_chem::{BalanceMode, IonVector, ScalingInputs};
use aq_core::UnitSystem;
use aq_graph::{Endpoint, FlowEdge, FlowNode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::migrate::LATEST_VERSION;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Flowsheet {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub unit_system: UnitSystem,
    #[serde(default)]
    pub defaults: GlobalDefaults,
    #[serde(default)]
    pub feed: FeedDef,
    #[serde(default)]
    pub nodes: Vec<ProcessNode>,
    #[serde(default)]
    pub edges: Vec<ProcessEdge>,
}

impl Flowsheet {
    /// Empty flowsheet holding only the feed and product endpoints.
    pub fn new(name: impl Into<String>, unit_system: UnitSystem) -> Self {
        Self {
            version: LATEST_VERSION,
            name: name.into(),
            unit_system,
            defaults: GlobalDefaults::default(),
            feed: FeedDef::default(),
            nodes: vec![
                ProcessNode::endpoint("feed", NodeData::Feed, 0.0),
                ProcessNode::endpoint("product", NodeData::Product, 1000.0),
            ],
            edges: Vec::new(),
        }
    }

    /// Add a unit with a fresh id and return the id.
    pub fn add_unit(&mut self, data: NodeData, x: f64) -> String {
        let prefix = data.kind_label().to_ascii_lowercase();
        let short = Uuid::new_v4().simple().to_string();
        let id = format!("{prefix}-{}", &short[..8]);
        self.nodes.push(ProcessNode {
            id: id.clone(),
            data,
            position: Some(Position { x, y: 0.0 }),
            chips: Vec::new(),
        });
        id
    }

    pub fn connect(&mut self, source: impl Into<String>, target: impl Into<String>) {
        self.edges.push(ProcessEdge {
            source: source.into(),
            target: target.into(),
        });
    }

    pub fn node(&self, id: &str) -> Option<&ProcessNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Process-wide defaults. Unset fields fall through to the application
/// config.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GlobalDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_membrane_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charge_balance: Option<BalanceMode>,
}

impl GlobalDefaults {
    /// Field-by-field overlay: values set in `over` win.
    pub fn overlay(&self, over: &GlobalDefaults) -> GlobalDefaults {
        GlobalDefaults {
            default_membrane_model: over
                .default_membrane_model
                .clone()
                .or_else(|| self.default_membrane_model.clone()),
            charge_balance: over.charge_balance.or(self.charge_balance),
        }
    }
}

/// Raw feed water as entered, in the flowsheet's unit system.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeedDef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ph: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tds_mg_l: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fouling: Option<FoulingIndicators>,
    #[serde(skip_serializing_if = "IonVector::is_empty")]
    pub ions: IonVector,
    #[serde(skip_serializing_if = "ScalingInputs::is_empty")]
    pub chemistry: ScalingInputs,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FoulingIndicators {
    #[serde(rename = "tss_mgL", skip_serializing_if = "Option::is_none")]
    pub tss_mg_l: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turbidity_ntu: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdi15: Option<f64>,
    #[serde(rename = "toc_mgL", skip_serializing_if = "Option::is_none")]
    pub toc_mg_l: Option<f64>,
    #[serde(rename = "cod_mgL", skip_serializing_if = "Option::is_none")]
    pub cod_mg_l: Option<f64>,
    #[serde(rename = "bod_mgL", skip_serializing_if = "Option::is_none")]
    pub bod_mg_l: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessNode {
    pub id: String,
    pub data: NodeData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chips: Vec<Chip>,
}

impl ProcessNode {
    pub fn endpoint(id: impl Into<String>, data: NodeData, x: f64) -> Self {
        Self {
            id: id.into(),
            data,
            position: Some(Position { x, y: 0.0 }),
            chips: Vec::new(),
        }
    }
}

impl FlowNode for ProcessNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn endpoint(&self) -> Option<Endpoint> {
        match self.data {
            NodeData::Feed => Some(Endpoint::Feed),
            NodeData::Product => Some(Endpoint::Product),
            _ => None,
        }
    }

    fn x_position(&self) -> Option<f64> {
        self.position.map(|p| p.x)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Labeled value shown on a unit node after a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chip {
    pub label: String,
    pub value: Option<f64>,
    pub unit: String,
    #[serde(default)]
    pub warn: bool,
}

/// Per-kind node configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind")]
pub enum NodeData {
    #[serde(rename = "feed")]
    Feed,
    #[serde(rename = "product")]
    Product,
    RO(MembraneStage),
    NF(MembraneStage),
    UF(FiltrationStage),
    MF(FiltrationStage),
    HRRO(HrroStage),
    PUMP(PumpStage),
}

impl NodeData {
    pub fn kind_label(&self) -> &'static str {
        match self {
            NodeData::Feed => "feed",
            NodeData::Product => "product",
            NodeData::RO(_) => "RO",
            NodeData::NF(_) => "NF",
            NodeData::UF(_) => "UF",
            NodeData::MF(_) => "MF",
            NodeData::HRRO(_) => "HRRO",
            NodeData::PUMP(_) => "PUMP",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    #[default]
    Pressure,
    Recovery,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MembraneMode {
    #[default]
    Catalog,
    Custom,
}

/// Which membrane a stage uses: a catalog model, or custom parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MembraneSelection {
    pub mode: MembraneMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_m2: Option<f64>,
    #[serde(rename = "A_lmh_bar", skip_serializing_if = "Option::is_none")]
    pub a_lmh_bar: Option<f64>,
    #[serde(rename = "B_lmh", skip_serializing_if = "Option::is_none")]
    pub b_lmh: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt_rejection_pct: Option<f64>,
}

/// Inter-stage booster fields shared by pressure-driven stages.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BoosterPump {
    pub enable_pump: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pump_pressure: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pump_efficiency_pct: Option<f64>,
}

/// RO / NF configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MembraneStage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements: Option<f64>,
    pub mode: ControlMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_target_pct: Option<f64>,
    pub membrane: MembraneSelection,
    #[serde(flatten)]
    pub pump: BoosterPump,
}

/// UF / MF configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FiltrationStage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtrate_flux: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backwash_flux: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtration_duration_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backwash_duration_s: Option<f64>,
    pub membrane: MembraneSelection,
}

/// Closed-loop (batch-cycle) RO configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HrroStage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_target_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_recovery_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loop_volume_m3: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recirc_flow: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bleed_flow: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestep_s: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_minutes: Option<f64>,
    pub membrane: MembraneSelection,
    #[serde(flatten)]
    pub pump: BoosterPump,
}

/// Stand-alone pump node. Carried for layout only; never compiled to a stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PumpStage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub efficiency_pct: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessEdge {
    pub source: String,
    pub target: String,
}

impl FlowEdge for ProcessEdge {
    fn source(&self) -> &str {
        &self.source
    }

    fn target(&self) -> &str {
        &self.target
    }
}
