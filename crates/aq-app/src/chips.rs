//! Per-unit result chips shown on the flowsheet after a run.

use aq_core::{convert_flux, convert_pressure, UnitSystem};
use aq_project::{Chip, Flowsheet, ModuleType};
use aq_results::{KpiOut, StageMetric};
use serde::Serialize;

use crate::prepare::UnitRef;

pub const SEC_UNIT: &str = "kWh/m3";

/// Highest acceptable average flux per module type, LMH.
pub fn max_flux_lmh(module_type: ModuleType) -> f64 {
    match module_type {
        ModuleType::Ro | ModuleType::Nf => 40.0,
        ModuleType::Hrro => 35.0,
        ModuleType::Uf => 120.0,
        ModuleType::Mf => 150.0,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitChips {
    pub unit_id: String,
    pub chips: Vec<Chip>,
}

/// Chips for every compiled unit, in train order.
///
/// `metrics` and `kpi` are SI. A unit's metric is found by `stage_id`, then
/// by 1-based position; with no metric the KPI values stand in.
pub fn annotate_chips(
    units: &[UnitRef],
    metrics: &[StageMetric],
    kpi: &KpiOut,
    display: UnitSystem,
) -> Vec<UnitChips> {
    let labels = display.labels();

    units
        .iter()
        .enumerate()
        .map(|(idx, unit)| {
            let metric = find_metric(metrics, &unit.id, idx + 1);

            let flux_si = metric
                .and_then(|m| m.flux_lmh.or(m.average_flux_lmh))
                .unwrap_or(kpi.flux_lmh);
            let flux = convert_flux(flux_si, UnitSystem::Metric, display);
            let limit = convert_flux(max_flux_lmh(unit.module_type), UnitSystem::Metric, display);

            let dp = metric
                .and_then(StageMetric::pressure_drop_bar)
                .map(|v| convert_pressure(v, UnitSystem::Metric, display));
            let sec = metric.and_then(|m| m.sec_kwhm3).unwrap_or(kpi.sec_kwhm3);

            UnitChips {
                unit_id: unit.id.clone(),
                chips: vec![
                    Chip {
                        label: "Flux".to_string(),
                        value: Some(flux),
                        unit: labels.flux.to_string(),
                        warn: flux > limit,
                    },
                    Chip {
                        label: "ΔP".to_string(),
                        value: dp,
                        unit: labels.pressure.to_string(),
                        warn: false,
                    },
                    Chip {
                        label: "SEC".to_string(),
                        value: Some(sec),
                        unit: SEC_UNIT.to_string(),
                        warn: false,
                    },
                ],
            }
        })
        .collect()
}

fn find_metric<'a>(metrics: &'a [StageMetric], unit_id: &str, position: usize) -> Option<&'a StageMetric> {
    metrics
        .iter()
        .find(|m| m.stage_id.as_deref() == Some(unit_id))
        .or_else(|| {
            metrics
                .iter()
                .find(|m| m.stage_id.is_none() && m.stage as usize == position)
        })
}

/// Replace the chips on every unit node; units without an entry are cleared.
pub fn apply_chips(sheet: &mut Flowsheet, annotated: &[UnitChips]) {
    for node in &mut sheet.nodes {
        node.chips = annotated
            .iter()
            .find(|a| a.unit_id == node.id)
            .map(|a| a.chips.clone())
            .unwrap_or_default();
    }
}
