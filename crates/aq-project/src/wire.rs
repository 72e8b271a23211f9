//! SI request contract for the simulation engine.
//!
//! Field names follow the engine's JSON keys. Membrane fields are always
//! present (possibly `null`) so the engine can tell "catalog model" from
//! "custom parameters" without guessing; other optional fields are omitted
//! when unset.

use std::collections::BTreeMap;
use std::fmt;

use aq_chem::{IonVector, ScalingInputs};
use serde::{Deserialize, Serialize};

use crate::schema::FoulingIndicators;

/// Engine module type of a compiled stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ModuleType {
    Ro,
    Nf,
    Uf,
    Mf,
    Hrro,
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModuleType::Ro => "RO",
            ModuleType::Nf => "NF",
            ModuleType::Uf => "UF",
            ModuleType::Mf => "MF",
            ModuleType::Hrro => "HRRO",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDescriptor {
    pub stage_id: String,
    pub module_type: ModuleType,
    pub elements: u32,
    pub pressure_bar: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery_target_pct: Option<f64>,

    // UF / MF
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flux_lmh: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backwash_flux_lmh: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filtration_cycle_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backwash_duration_sec: Option<f64>,

    // HRRO
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_volume_m3: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recirc_flow_m3h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bleed_m3h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestep_s: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_minutes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_recovery_pct: Option<f64>,
    /// Older engine builds read the stop condition under this name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ccro_recovery_pct: Option<f64>,

    // Inter-stage booster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbp_pressure_bar: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbp_eff_pct: Option<f64>,

    pub membrane_model: Option<String>,
    pub membrane_area_m2: Option<f64>,
    #[serde(rename = "membrane_A_lmh_bar")]
    pub membrane_a_lmh_bar: Option<f64>,
    #[serde(rename = "membrane_B_lmh")]
    pub membrane_b_lmh: Option<f64>,
    pub membrane_salt_rejection_pct: Option<f64>,
}

impl StageDescriptor {
    /// Descriptor with every optional field unset.
    pub fn new(stage_id: impl Into<String>, module_type: ModuleType, elements: u32) -> Self {
        Self {
            stage_id: stage_id.into(),
            module_type,
            elements,
            pressure_bar: 0.0,
            recovery_target_pct: None,
            flux_lmh: None,
            backwash_flux_lmh: None,
            filtration_cycle_min: None,
            backwash_duration_sec: None,
            loop_volume_m3: None,
            recirc_flow_m3h: None,
            bleed_m3h: None,
            timestep_s: None,
            max_minutes: None,
            stop_recovery_pct: None,
            ccro_recovery_pct: None,
            isbp_pressure_bar: None,
            isbp_eff_pct: None,
            membrane_model: None,
            membrane_area_m2: None,
            membrane_a_lmh_bar: None,
            membrane_b_lmh: None,
            membrane_salt_rejection_pct: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedRequest {
    pub flow_m3h: f64,
    #[serde(rename = "tds_mgL")]
    pub tds_mg_l: f64,
    #[serde(rename = "temperature_C")]
    pub temperature_c: f64,
    pub ph: f64,
    pub pressure_bar: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fouling: Option<FoulingIndicators>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ions: Option<IonVector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chemistry: Option<ScalingInputs>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub scenario_name: String,
    pub feed: FeedRequest,
    pub stages: Vec<StageDescriptor>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, serde_json::Value>,
}
