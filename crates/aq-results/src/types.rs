//! Engine response and run-cache data types.
//!
//! Responses are SI as delivered by the engine. The aliases accept the
//! alternative key spellings older engine builds emit.

use std::collections::BTreeMap;

use aq_chem::ScalingIndices;
use aq_core::UnitLabels;
use serde::{Deserialize, Deserializer, Serialize};

pub type RunId = String;

/// Lists the engine may send as `null` instead of omitting.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_schema_version() -> u32 {
    2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutput {
    #[serde(default)]
    pub scenario_id: String,
    #[serde(default)]
    pub streams: Vec<StreamOut>,
    pub kpi: KpiOut,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub stage_metrics: Vec<StageMetric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_labels: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chemistry: Option<WaterChemistryOut>,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub time_history: Vec<TimeSeriesPoint>,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub warnings: Vec<SimulationWarning>,
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
}

/// Label map attached to display output.
pub fn unit_label_map(labels: UnitLabels) -> BTreeMap<String, String> {
    [
        ("flow", labels.flow),
        ("pressure", labels.pressure),
        ("temperature", labels.temperature),
        ("flux", labels.flux),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiOut {
    pub recovery_pct: f64,
    pub flux_lmh: f64,
    pub ndp_bar: f64,
    #[serde(alias = "sec_kwh_m3")]
    pub sec_kwhm3: f64,
    #[serde(
        default,
        alias = "batch_cycle",
        alias = "batchcycle_min",
        alias = "filtration_cycle_min"
    )]
    pub batchcycle: Option<f64>,
    #[serde(default)]
    pub prod_tds: Option<f64>,
    #[serde(default)]
    pub feed_m3h: Option<f64>,
    #[serde(default)]
    pub permeate_m3h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass_balance: Option<MassBalanceOut>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MassBalanceOut {
    pub flow_error_m3h: f64,
    pub flow_error_pct: f64,
    pub salt_error_kgh: f64,
    pub salt_error_pct: f64,
    pub system_rejection_pct: Option<f64>,
    pub is_balanced: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageMetric {
    /// 1-based position in the compiled stage list.
    #[serde(alias = "idx", alias = "stage_index")]
    pub stage: u32,
    #[serde(default)]
    pub stage_id: Option<String>,
    #[serde(alias = "type")]
    pub module_type: String,
    #[serde(default)]
    pub recovery_pct: Option<f64>,
    #[serde(default, alias = "jw_avg_lmh", alias = "avg_flux_lmh")]
    pub flux_lmh: Option<f64>,
    #[serde(default)]
    pub design_flux_lmh: Option<f64>,
    #[serde(default)]
    pub instantaneous_flux_lmh: Option<f64>,
    #[serde(default)]
    pub average_flux_lmh: Option<f64>,
    #[serde(default, alias = "sec_kwh_m3")]
    pub sec_kwhm3: Option<f64>,
    #[serde(default)]
    pub ndp_bar: Option<f64>,
    #[serde(default, alias = "pin", alias = "pin_bar", alias = "pressure_in")]
    pub p_in_bar: Option<f64>,
    #[serde(default, alias = "pout", alias = "pout_bar", alias = "pressure_out")]
    pub p_out_bar: Option<f64>,
    #[serde(default, alias = "delta_p_bar", alias = "deltaP_bar")]
    pub dp_bar: Option<f64>,
    #[serde(default, alias = "TMP_bar", alias = "tmp")]
    pub tmp_bar: Option<f64>,
    #[serde(default)]
    pub delta_pi_bar: Option<f64>,
    #[serde(default, rename = "Qf")]
    pub qf_m3h: Option<f64>,
    #[serde(default, rename = "Qp")]
    pub qp_m3h: Option<f64>,
    #[serde(default, rename = "Qc")]
    pub qc_m3h: Option<f64>,
    #[serde(default)]
    pub gross_flow_m3h: Option<f64>,
    #[serde(default)]
    pub net_flow_m3h: Option<f64>,
    #[serde(default)]
    pub backwash_loss_m3h: Option<f64>,
    #[serde(default)]
    pub net_recovery_pct: Option<f64>,
    #[serde(default, rename = "Cf")]
    pub cf_mg_l: Option<f64>,
    #[serde(default, rename = "Cp")]
    pub cp_mg_l: Option<f64>,
    #[serde(default, rename = "Cc")]
    pub cc_mg_l: Option<f64>,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub time_history: Vec<TimeSeriesPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chemistry: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidelines: Option<serde_json::Value>,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub warnings: Vec<SimulationWarning>,
}

impl StageMetric {
    /// Metric carrying only its identity; the engine fills the rest.
    pub fn new(stage: u32, module_type: impl Into<String>) -> Self {
        Self {
            stage,
            stage_id: None,
            module_type: module_type.into(),
            recovery_pct: None,
            flux_lmh: None,
            design_flux_lmh: None,
            instantaneous_flux_lmh: None,
            average_flux_lmh: None,
            sec_kwhm3: None,
            ndp_bar: None,
            p_in_bar: None,
            p_out_bar: None,
            dp_bar: None,
            tmp_bar: None,
            delta_pi_bar: None,
            qf_m3h: None,
            qp_m3h: None,
            qc_m3h: None,
            gross_flow_m3h: None,
            net_flow_m3h: None,
            backwash_loss_m3h: None,
            net_recovery_pct: None,
            cf_mg_l: None,
            cp_mg_l: None,
            cc_mg_l: None,
            time_history: Vec::new(),
            chemistry: None,
            guidelines: None,
            warnings: Vec::new(),
        }
    }

    /// Pressure drop across the stage, from `dp_bar` or the inlet/outlet pair.
    pub fn pressure_drop_bar(&self) -> Option<f64> {
        self.dp_bar.or(match (self.p_in_bar, self.p_out_bar) {
            (Some(p_in), Some(p_out)) => Some(p_in - p_out),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamOut {
    pub label: String,
    pub flow_m3h: f64,
    #[serde(rename = "tds_mgL")]
    pub tds_mg_l: f64,
    pub ph: f64,
    pub pressure_bar: f64,
    #[serde(default, rename = "temperature_C")]
    pub temperature_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ions: Option<BTreeMap<String, f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub time_min: f64,
    pub recovery_pct: f64,
    #[serde(alias = "feed_pressure_bar")]
    pub pressure_bar: f64,
    #[serde(rename = "tds_mgL", alias = "loop_tds_mgL")]
    pub tds_mg_l: f64,
    #[serde(default)]
    pub flux_lmh: Option<f64>,
    #[serde(default)]
    pub ndp_bar: Option<f64>,
    #[serde(default)]
    pub permeate_flow_m3h: Option<f64>,
    #[serde(default, rename = "permeate_tds_mgL")]
    pub permeate_tds_mg_l: Option<f64>,
    #[serde(default)]
    pub specific_energy_kwh_m3: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaterChemistryOut {
    #[serde(default)]
    pub feed: Option<ScalingIndices>,
    #[serde(default)]
    pub final_brine: Option<ScalingIndices>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationWarning {
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub module_type: Option<String>,
    pub key: String,
    pub message: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub limit: Option<serde_json::Value>,
    #[serde(default)]
    pub unit: String,
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "WARN".to_string()
}

/// Metadata of one cached run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub scenario_name: String,
    pub timestamp: String,
    pub engine_version: String,
    pub stage_count: usize,
}

impl RunManifest {
    /// Manifest stamped with the current UTC time.
    pub fn new(
        run_id: impl Into<RunId>,
        scenario_name: impl Into<String>,
        engine_version: impl Into<String>,
        stage_count: usize,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            scenario_name: scenario_name.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            engine_version: engine_version.into(),
            stage_count,
        }
    }
}
