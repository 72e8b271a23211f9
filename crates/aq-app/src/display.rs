//! SI scenario output -> display units.
//!
//! Engine output is always SI. Converting it is a pure function of the
//! output and the target unit system; the SI original is kept for caching.
//! Energy figures (kWh/m³) are reported the same in every unit system.

use aq_core::{convert_flow, convert_flux, convert_pressure, convert_temperature, UnitSystem};
use aq_results::{
    unit_label_map, KpiOut, ScenarioOutput, StageMetric, StreamOut, TimeSeriesPoint,
};

const SI: UnitSystem = UnitSystem::Metric;

/// Copy of `output` expressed in `units`, with `unit_labels` attached.
pub fn to_display(output: &ScenarioOutput, units: UnitSystem) -> ScenarioOutput {
    let mut out = output.clone();
    out.unit_labels = Some(unit_label_map(units.labels()));
    if units.is_metric() {
        return out;
    }

    let conv = Converter { to: units };
    conv.kpi(&mut out.kpi);
    out.streams.iter_mut().for_each(|s| conv.stream(s));
    out.stage_metrics.iter_mut().for_each(|m| conv.stage(m));
    out.time_history.iter_mut().for_each(|p| conv.point(p));
    out
}

struct Converter {
    to: UnitSystem,
}

impl Converter {
    fn flow(&self, v: f64) -> f64 {
        convert_flow(v, SI, self.to)
    }

    fn pressure(&self, v: f64) -> f64 {
        convert_pressure(v, SI, self.to)
    }

    fn flux(&self, v: f64) -> f64 {
        convert_flux(v, SI, self.to)
    }

    fn opt(value: &mut Option<f64>, f: impl Fn(f64) -> f64) {
        if let Some(v) = value.as_mut() {
            *v = f(*v);
        }
    }

    fn kpi(&self, kpi: &mut KpiOut) {
        kpi.flux_lmh = self.flux(kpi.flux_lmh);
        kpi.ndp_bar = self.pressure(kpi.ndp_bar);
        Self::opt(&mut kpi.feed_m3h, |v| self.flow(v));
        Self::opt(&mut kpi.permeate_m3h, |v| self.flow(v));
        if let Some(mb) = kpi.mass_balance.as_mut() {
            mb.flow_error_m3h = self.flow(mb.flow_error_m3h);
        }
    }

    fn stream(&self, s: &mut StreamOut) {
        s.flow_m3h = self.flow(s.flow_m3h);
        s.pressure_bar = self.pressure(s.pressure_bar);
        Self::opt(&mut s.temperature_c, |v| convert_temperature(v, SI, self.to));
    }

    fn stage(&self, m: &mut StageMetric) {
        for flux in [
            &mut m.flux_lmh,
            &mut m.design_flux_lmh,
            &mut m.instantaneous_flux_lmh,
            &mut m.average_flux_lmh,
        ] {
            Self::opt(flux, |v| self.flux(v));
        }
        // pressure differences scale like pressures
        for p in [
            &mut m.ndp_bar,
            &mut m.p_in_bar,
            &mut m.p_out_bar,
            &mut m.dp_bar,
            &mut m.tmp_bar,
            &mut m.delta_pi_bar,
        ] {
            Self::opt(p, |v| self.pressure(v));
        }
        for q in [
            &mut m.qf_m3h,
            &mut m.qp_m3h,
            &mut m.qc_m3h,
            &mut m.gross_flow_m3h,
            &mut m.net_flow_m3h,
            &mut m.backwash_loss_m3h,
        ] {
            Self::opt(q, |v| self.flow(v));
        }
        m.time_history.iter_mut().for_each(|p| self.point(p));
    }

    fn point(&self, p: &mut TimeSeriesPoint) {
        p.pressure_bar = self.pressure(p.pressure_bar);
        Self::opt(&mut p.flux_lmh, |v| self.flux(v));
        Self::opt(&mut p.ndp_bar, |v| self.pressure(v));
        Self::opt(&mut p.permeate_flow_m3h, |v| self.flow(v));
    }
}
