//! Flowsheet -> engine request.

use std::collections::BTreeMap;
use std::collections::HashSet;

use aq_chem::{BalanceMode, ChargeBalanceMeta, ScalingIndices};
use aq_core::UnitSystem;
use aq_graph::{linearize, linearize_or_repair, FlowNode, Link};
use aq_project::{Flowsheet, ModuleType, ProcessNode, SimulationRequest};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::feed_compile::compile_feed;
use crate::stage_compile::compile_stage;

/// A compiled stage's identity, in train order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitRef {
    pub id: String,
    pub module_type: ModuleType,
}

/// Everything the run service needs before calling the engine.
#[derive(Debug, Clone)]
pub struct PreparedRun {
    pub request: SimulationRequest,
    /// Compiled stages in flow order; pumps and endpoints excluded.
    pub units: Vec<UnitRef>,
    /// Replacement edges when the drawn graph had to be rebuilt.
    pub repaired: Option<Vec<Link>>,
    pub balance: ChargeBalanceMeta,
    pub feed_scaling: ScalingIndices,
    /// Every field that fell back to a default, as `"<owner>.<field>"`.
    pub defaulted: Vec<String>,
    /// Unit system the form values were read in.
    pub input_units: UnitSystem,
}

pub fn prepare_run(sheet: &Flowsheet, config: &AppConfig) -> AppResult<PreparedRun> {
    let defaults = config.defaults.overlay(&sheet.defaults);

    let (train, repaired): (Vec<&ProcessNode>, Option<Vec<Link>>) = if config.auto_repair {
        let linearized = linearize_or_repair(&sheet.nodes, &sheet.edges)?;
        (linearized.units, linearized.repaired)
    } else {
        (linearize(&sheet.nodes, &sheet.edges)?, None)
    };

    warn_orphans(sheet, &train);

    let mut stages = Vec::with_capacity(train.len());
    let mut units = Vec::with_capacity(train.len());
    let mut defaulted = Vec::new();
    for node in &train {
        if let Some(compiled) = compile_stage(node, sheet.unit_system, &defaults) {
            units.push(UnitRef {
                id: node.id.clone(),
                module_type: compiled.descriptor.module_type,
            });
            stages.push(compiled.descriptor);
            defaulted.extend(compiled.defaulted);
        } else {
            debug!(node_id = %node.id, kind = node.data.kind_label(), "node not compiled to a stage");
        }
    }

    let mode = defaults.charge_balance.unwrap_or(BalanceMode::Off);
    let feed = compile_feed(&sheet.feed, sheet.unit_system, mode);
    defaulted.extend(feed.defaulted);

    info!(
        scenario = %sheet.name,
        stages = stages.len(),
        repaired = repaired.is_some(),
        "run prepared"
    );

    Ok(PreparedRun {
        request: SimulationRequest {
            scenario_name: sheet.name.clone(),
            feed: feed.request,
            stages,
            options: BTreeMap::new(),
        },
        units,
        repaired,
        balance: feed.balance,
        feed_scaling: feed.scaling,
        defaulted,
        input_units: sheet.unit_system,
    })
}

/// Unit nodes that are not on the feed -> product path never reach the engine.
fn warn_orphans(sheet: &Flowsheet, train: &[&ProcessNode]) {
    let on_path: HashSet<&str> = train.iter().map(|n| n.id.as_str()).collect();
    for node in &sheet.nodes {
        if node.endpoint().is_none() && !on_path.contains(node.id.as_str()) {
            warn!(node_id = %node.id, "unit is not on the process train and is ignored");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aq_project::{MembraneStage, NodeData, PumpStage};

    fn two_stage(units: UnitSystem) -> (Flowsheet, String, String, String) {
        let mut sheet = Flowsheet::new("two stage", units);
        let ro1 = sheet.add_unit(
            NodeData::RO(MembraneStage {
                pressure: Some(15.0),
                ..Default::default()
            }),
            100.0,
        );
        let pump = sheet.add_unit(NodeData::PUMP(PumpStage::default()), 200.0);
        let ro2 = sheet.add_unit(NodeData::RO(MembraneStage::default()), 300.0);
        sheet.connect("feed", ro1.clone());
        sheet.connect(ro1.clone(), pump.clone());
        sheet.connect(pump.clone(), ro2.clone());
        sheet.connect(ro2.clone(), "product");
        (sheet, ro1, pump, ro2)
    }

    #[test]
    fn pumps_are_skipped_and_order_kept() {
        let (sheet, ro1, _pump, ro2) = two_stage(UnitSystem::Metric);
        let prepared = prepare_run(&sheet, &AppConfig::default()).unwrap();
        let ids: Vec<&str> = prepared.units.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, [ro1.as_str(), ro2.as_str()]);
        assert_eq!(prepared.request.stages.len(), 2);
        assert_eq!(prepared.request.stages[0].stage_id, ro1);
        assert!(prepared.repaired.is_none());
    }

    #[test]
    fn broken_graph_repaired_only_when_enabled() {
        let (mut sheet, ..) = two_stage(UnitSystem::Metric);
        sheet.edges.truncate(1);

        let prepared = prepare_run(&sheet, &AppConfig::default()).unwrap();
        assert!(prepared.repaired.is_some());
        assert_eq!(prepared.units.len(), 2);

        let strict = AppConfig {
            auto_repair: false,
            ..AppConfig::default()
        };
        let err = prepare_run(&sheet, &strict).unwrap_err();
        assert!(matches!(err, crate::AppError::Topology(_)));
    }

    #[test]
    fn flowsheet_defaults_override_config() {
        let (mut sheet, ..) = two_stage(UnitSystem::Metric);
        sheet.defaults.default_membrane_model = Some("SW30".to_string());
        let mut config = AppConfig::default();
        config.defaults.default_membrane_model = Some("BW30-400".to_string());
        config.defaults.charge_balance = Some(BalanceMode::Cations);

        let prepared = prepare_run(&sheet, &config).unwrap();
        assert_eq!(prepared.request.stages[0].membrane_model.as_deref(), Some("SW30"));
        assert_eq!(prepared.balance.mode, BalanceMode::Cations);
    }
}
