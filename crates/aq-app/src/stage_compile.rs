//! Unit node -> SI stage descriptor.
//!
//! Form values are read in the flowsheet's unit system and converted to SI
//! here, once. Defaults are already SI and are never converted. Missing or
//! non-finite inputs fall back to a per-field default and the field name is
//! recorded on the compiled stage.

use aq_core::{
    convert_flow, convert_flux, convert_pressure, count_or_default, numeric_or_default, UnitSystem,
};
use aq_project::{
    BoosterPump, ControlMode, FiltrationStage, GlobalDefaults, HrroStage, MembraneMode,
    MembraneSelection, MembraneStage, ModuleType, NodeData, ProcessNode, StageDescriptor,
};
use tracing::{debug, warn};

pub const MIN_ELEMENTS: u32 = 1;
pub const MAX_ELEMENTS: u32 = 24;
pub const DEFAULT_ELEMENTS: u32 = 6;

const RO_NOMINAL_PRESSURE_BAR: f64 = 15.0;
const NF_NOMINAL_PRESSURE_BAR: f64 = 10.0;
const DEFAULT_RECOVERY_TARGET_PCT: f64 = 50.0;

const UF_DESIGN_FLUX_LMH: f64 = 55.5;
const MF_DESIGN_FLUX_LMH: f64 = 60.0;
const BACKWASH_FLUX_LMH: f64 = 100.0;
const FILTRATION_CYCLE_MIN: f64 = 60.0;
const BACKWASH_DURATION_S: f64 = 60.0;

const HRRO_PRESSURE_BAR: f64 = 15.0;
const HRRO_LOOP_VOLUME_M3: f64 = 2.0;
const HRRO_RECIRC_M3H: f64 = 120.0;
const HRRO_BLEED_M3H: f64 = 0.0;
const HRRO_TIMESTEP_S: f64 = 30.0;
const HRRO_MAX_MINUTES: f64 = 60.0;
const HRRO_STOP_RECOVERY_PCT: f64 = 90.0;

const BOOSTER_PRESSURE_BAR: f64 = 0.0;
const BOOSTER_EFFICIENCY_PCT: f64 = 80.0;

/// A stage descriptor plus the fields that were defaulted while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStage {
    pub descriptor: StageDescriptor,
    /// `"<stage id>.<field>"` for every substituted default.
    pub defaulted: Vec<String>,
}

/// Compile one unit node. Endpoints and stand-alone pumps yield `None`.
pub fn compile_stage(
    node: &ProcessNode,
    units: UnitSystem,
    defaults: &GlobalDefaults,
) -> Option<CompiledStage> {
    let mut fields = FieldResolver::new(&node.id, units);

    let descriptor = match &node.data {
        NodeData::Feed | NodeData::Product | NodeData::PUMP(_) => return None,
        NodeData::RO(stage) => {
            compile_membrane(&mut fields, ModuleType::Ro, stage, RO_NOMINAL_PRESSURE_BAR, defaults)
        }
        NodeData::NF(stage) => {
            compile_membrane(&mut fields, ModuleType::Nf, stage, NF_NOMINAL_PRESSURE_BAR, defaults)
        }
        NodeData::UF(stage) => {
            compile_filtration(&mut fields, ModuleType::Uf, stage, UF_DESIGN_FLUX_LMH, defaults)
        }
        NodeData::MF(stage) => {
            compile_filtration(&mut fields, ModuleType::Mf, stage, MF_DESIGN_FLUX_LMH, defaults)
        }
        NodeData::HRRO(stage) => compile_hrro(&mut fields, stage, defaults),
    };

    debug!(
        stage_id = %descriptor.stage_id,
        module_type = %descriptor.module_type,
        elements = descriptor.elements,
        pressure_bar = descriptor.pressure_bar,
        "stage compiled"
    );
    if !fields.defaulted.is_empty() {
        warn!(stage_id = %node.id, fields = ?fields.defaulted, "defaults substituted");
    }

    Some(CompiledStage {
        descriptor,
        defaulted: fields.defaulted,
    })
}

fn compile_membrane(
    fields: &mut FieldResolver<'_>,
    module_type: ModuleType,
    stage: &MembraneStage,
    nominal_bar: f64,
    defaults: &GlobalDefaults,
) -> StageDescriptor {
    let elements = fields.count("elements", stage.elements);
    let mut desc = StageDescriptor::new(fields.stage_id, module_type, elements);

    match stage.mode {
        ControlMode::Pressure => {
            desc.pressure_bar =
                fields.quantity("pressure", stage.pressure, nominal_bar, convert_pressure);
        }
        ControlMode::Recovery => {
            // the engine solves for pressure; a given one is its starting point
            desc.pressure_bar = fields.initial_guess(stage.pressure, nominal_bar, convert_pressure);
            desc.recovery_target_pct = Some(fields.number(
                "recovery_target_pct",
                stage.recovery_target_pct,
                DEFAULT_RECOVERY_TARGET_PCT,
            ));
        }
    }

    apply_booster(fields, &mut desc, &stage.pump);
    resolve_membrane(&mut desc, &stage.membrane, defaults);
    desc
}

fn compile_filtration(
    fields: &mut FieldResolver<'_>,
    module_type: ModuleType,
    stage: &FiltrationStage,
    design_flux_lmh: f64,
    defaults: &GlobalDefaults,
) -> StageDescriptor {
    let elements = fields.count("elements", stage.elements);
    let mut desc = StageDescriptor::new(fields.stage_id, module_type, elements);

    desc.pressure_bar = 0.0;
    desc.flux_lmh = Some(fields.quantity(
        "filtrate_flux",
        stage.filtrate_flux,
        design_flux_lmh,
        convert_flux,
    ));
    desc.backwash_flux_lmh = Some(fields.quantity(
        "backwash_flux",
        stage.backwash_flux,
        BACKWASH_FLUX_LMH,
        convert_flux,
    ));
    desc.filtration_cycle_min = Some(fields.number(
        "filtration_duration_min",
        stage.filtration_duration_min,
        FILTRATION_CYCLE_MIN,
    ));
    desc.backwash_duration_sec = Some(fields.number(
        "backwash_duration_s",
        stage.backwash_duration_s,
        BACKWASH_DURATION_S,
    ));

    resolve_membrane(&mut desc, &stage.membrane, defaults);
    desc
}

fn compile_hrro(
    fields: &mut FieldResolver<'_>,
    stage: &HrroStage,
    defaults: &GlobalDefaults,
) -> StageDescriptor {
    let elements = fields.count("elements", stage.elements);
    let mut desc = StageDescriptor::new(fields.stage_id, ModuleType::Hrro, elements);

    desc.pressure_bar =
        fields.quantity("pressure", stage.pressure, HRRO_PRESSURE_BAR, convert_pressure);
    desc.loop_volume_m3 =
        Some(fields.number("loop_volume_m3", stage.loop_volume_m3, HRRO_LOOP_VOLUME_M3));
    desc.recirc_flow_m3h =
        Some(fields.quantity("recirc_flow", stage.recirc_flow, HRRO_RECIRC_M3H, convert_flow));
    desc.bleed_m3h =
        Some(fields.quantity("bleed_flow", stage.bleed_flow, HRRO_BLEED_M3H, convert_flow));
    desc.timestep_s = Some(fields.number("timestep_s", stage.timestep_s, HRRO_TIMESTEP_S));
    desc.max_minutes = Some(fields.number("max_minutes", stage.max_minutes, HRRO_MAX_MINUTES));

    // one derived stop condition, written under every name the engine reads
    let stop = [stage.stop_recovery_pct, stage.recovery_target_pct]
        .into_iter()
        .flatten()
        .find(|v| v.is_finite());
    let stop = fields.number("stop_recovery_pct", stop, HRRO_STOP_RECOVERY_PCT);
    desc.stop_recovery_pct = Some(stop);
    desc.ccro_recovery_pct = Some(stop);
    desc.recovery_target_pct = Some(stop);

    apply_booster(fields, &mut desc, &stage.pump);
    resolve_membrane(&mut desc, &stage.membrane, defaults);
    desc
}

fn apply_booster(fields: &mut FieldResolver<'_>, desc: &mut StageDescriptor, pump: &BoosterPump) {
    if !pump.enable_pump {
        return;
    }
    desc.isbp_pressure_bar = Some(fields.quantity(
        "pump_pressure",
        pump.pump_pressure,
        BOOSTER_PRESSURE_BAR,
        convert_pressure,
    ));
    desc.isbp_eff_pct = Some(fields.number(
        "pump_efficiency_pct",
        pump.pump_efficiency_pct,
        BOOSTER_EFFICIENCY_PCT,
    ));
}

/// Custom membranes send their own physical parameters and no model;
/// catalog membranes send only a model name.
fn resolve_membrane(
    desc: &mut StageDescriptor,
    selection: &MembraneSelection,
    defaults: &GlobalDefaults,
) {
    match selection.mode {
        MembraneMode::Custom => {
            desc.membrane_model = None;
            desc.membrane_area_m2 = finite(selection.area_m2);
            desc.membrane_a_lmh_bar = finite(selection.a_lmh_bar);
            desc.membrane_b_lmh = finite(selection.b_lmh);
            desc.membrane_salt_rejection_pct = finite(selection.salt_rejection_pct);
        }
        MembraneMode::Catalog => {
            desc.membrane_model = selection
                .model
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .or_else(|| defaults.default_membrane_model.clone());
            desc.membrane_area_m2 = None;
            desc.membrane_a_lmh_bar = None;
            desc.membrane_b_lmh = None;
            desc.membrane_salt_rejection_pct = None;
        }
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Per-stage coercion state.
struct FieldResolver<'a> {
    stage_id: &'a str,
    units: UnitSystem,
    defaulted: Vec<String>,
}

impl<'a> FieldResolver<'a> {
    fn new(stage_id: &'a str, units: UnitSystem) -> Self {
        Self {
            stage_id,
            units,
            defaulted: Vec::new(),
        }
    }

    fn note(&mut self, field: &str, defaulted: bool) {
        if defaulted {
            self.defaulted.push(format!("{}.{}", self.stage_id, field));
        }
    }

    fn count(&mut self, field: &str, value: Option<f64>) -> u32 {
        let c = count_or_default(value, DEFAULT_ELEMENTS, MIN_ELEMENTS, MAX_ELEMENTS);
        self.note(field, c.defaulted);
        c.value
    }

    /// Unitless or SI-only value.
    fn number(&mut self, field: &str, value: Option<f64>, default: f64) -> f64 {
        let c = numeric_or_default(value, default);
        self.note(field, c.defaulted);
        c.value
    }

    /// Unit-bearing value: a given value is converted to SI, the SI default
    /// is taken as is.
    fn quantity(
        &mut self,
        field: &str,
        value: Option<f64>,
        default_si: f64,
        convert: fn(f64, UnitSystem, UnitSystem) -> f64,
    ) -> f64 {
        let c = numeric_or_default(value, default_si);
        self.note(field, c.defaulted);
        if c.defaulted {
            c.value
        } else {
            convert(c.value, self.units, UnitSystem::Metric)
        }
    }

    /// Like [`Self::quantity`] for values the engine only starts from. A
    /// missing one is expected and not recorded.
    fn initial_guess(
        &self,
        value: Option<f64>,
        default_si: f64,
        convert: fn(f64, UnitSystem, UnitSystem) -> f64,
    ) -> f64 {
        match value {
            Some(v) if v.is_finite() => convert(v, self.units, UnitSystem::Metric),
            _ => default_si,
        }
    }
}
