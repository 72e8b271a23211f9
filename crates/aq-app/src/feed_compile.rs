//! Feed form -> SI feed request, with the ion map charge-balanced.

use aq_chem::{
    apply_charge_balance, scaling_indices, BalanceMode, ChargeBalanceMeta, ScalingIndices,
    WaterConditions,
};
use aq_core::{convert_flow, convert_pressure, convert_temperature, numeric_or_default, UnitSystem};
use aq_project::{FeedDef, FeedRequest};
use tracing::{debug, warn};

const DEFAULT_FLOW_M3H: f64 = 100.0;
const DEFAULT_TEMPERATURE_C: f64 = 25.0;
const DEFAULT_PH: f64 = 7.0;
const DEFAULT_PRESSURE_BAR: f64 = 0.0;

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFeed {
    pub request: FeedRequest,
    pub balance: ChargeBalanceMeta,
    /// Local saturation preview of the balanced feed.
    pub scaling: ScalingIndices,
    /// `"feed.<field>"` for every substituted default or dropped ion.
    pub defaulted: Vec<String>,
}

pub fn compile_feed(feed: &FeedDef, units: UnitSystem, mode: BalanceMode) -> CompiledFeed {
    let mut defaulted = Vec::new();
    let mut resolve = |field: &str, value: Option<f64>, default_si: f64, convert: Option<Convert>| {
        let c = numeric_or_default(value, default_si);
        if c.defaulted {
            defaulted.push(format!("feed.{field}"));
            return c.value;
        }
        match convert {
            Some(convert) => convert(c.value, units, UnitSystem::Metric),
            None => c.value,
        }
    };

    let flow_m3h = resolve("flow_rate", feed.flow_rate, DEFAULT_FLOW_M3H, Some(convert_flow));
    let temperature_c = resolve(
        "temperature",
        feed.temperature,
        DEFAULT_TEMPERATURE_C,
        Some(convert_temperature),
    );
    let ph = resolve("ph", feed.ph, DEFAULT_PH, None);
    let pressure_bar = resolve(
        "pressure",
        feed.pressure,
        DEFAULT_PRESSURE_BAR,
        Some(convert_pressure),
    );

    let mut ions = feed.ions.clone();
    for ion in ions.sanitize() {
        defaulted.push(format!("feed.ions.{ion}"));
    }
    let outcome = apply_charge_balance(&ions, mode);

    let tds_mg_l = match feed.tds_mg_l.filter(|v| v.is_finite() && *v >= 0.0) {
        Some(tds) => tds,
        None => {
            defaulted.push("feed.tds_mg_l".to_string());
            outcome.ions.total_mg_l()
        }
    };

    let scaling = scaling_indices(
        WaterConditions {
            tds_mg_l,
            temperature_c,
            ph,
        },
        &outcome.ions,
        &feed.chemistry,
    );

    if !defaulted.is_empty() {
        warn!(fields = ?defaulted, "feed defaults substituted");
    }
    debug!(
        flow_m3h,
        tds_mg_l,
        mode = %mode,
        imbalance_meq_l = outcome.meta.adjusted_imbalance_meq_l,
        "feed compiled"
    );

    let request = FeedRequest {
        flow_m3h,
        tds_mg_l,
        temperature_c,
        ph,
        pressure_bar,
        water_type: feed.water_type.clone(),
        fouling: feed.fouling.clone(),
        ions: (!outcome.ions.is_empty()).then(|| outcome.ions.clone()),
        chemistry: (!feed.chemistry.is_empty()).then(|| feed.chemistry.clone()),
    };

    CompiledFeed {
        request,
        balance: outcome.meta,
        scaling,
        defaulted,
    }
}

type Convert = fn(f64, UnitSystem, UnitSystem) -> f64;

#[cfg(test)]
mod tests {
    use super::*;
    use aq_chem::{Ion, IonVector, ScalingInputs};

    fn seawater_feed() -> FeedDef {
        FeedDef {
            flow_rate: Some(50.0),
            temperature: Some(20.0),
            ph: Some(7.8),
            pressure: Some(1.0),
            ions: IonVector::new()
                .with(Ion::Ca, 120.0)
                .with(Ion::Mg, 40.0)
                .with(Ion::Na, 300.0)
                .with(Ion::HCO3, 150.0)
                .with(Ion::Cl, 400.0)
                .with(Ion::SO4, 200.0),
            ..Default::default()
        }
    }

    #[test]
    fn metric_feed_passes_through() {
        let compiled = compile_feed(&seawater_feed(), UnitSystem::Metric, BalanceMode::Off);
        let req = &compiled.request;
        assert_eq!(req.flow_m3h, 50.0);
        assert_eq!(req.temperature_c, 20.0);
        assert_eq!(req.pressure_bar, 1.0);
        assert!(req.chemistry.is_none());
        // TDS missing: summed from ions
        assert!((req.tds_mg_l - 1210.0).abs() < 1e-9);
        assert_eq!(compiled.defaulted, vec!["feed.tds_mg_l".to_string()]);
        assert!(compiled.scaling.lsi.is_some());
    }

    #[test]
    fn us_feed_converted() {
        let feed = FeedDef {
            flow_rate: Some(440.2867),
            temperature: Some(77.0),
            pressure: Some(14.503_773_8),
            tds_mg_l: Some(500.0),
            ..Default::default()
        };
        let req = compile_feed(&feed, UnitSystem::Us, BalanceMode::Off).request;
        assert!((req.flow_m3h - 100.0).abs() < 1e-3);
        assert!((req.temperature_c - 25.0).abs() < 1e-9);
        assert!((req.pressure_bar - 1.0).abs() < 1e-6);
        assert_eq!(req.tds_mg_l, 500.0);
        assert!(req.ions.is_none());
    }

    #[test]
    fn balanced_ions_are_sent() {
        let feed = seawater_feed();
        let compiled = compile_feed(&feed, UnitSystem::Metric, BalanceMode::Anions);
        let ions = compiled.request.ions.unwrap();
        assert!(ions.imbalance_meq().abs() < 1e-6);
        assert_eq!(ions.get(Ion::SO4), Some(200.0));
        assert!(ions.get(Ion::Cl).unwrap() > 400.0);
        // the form itself is untouched
        assert_eq!(feed.ions.get(Ion::Cl), Some(400.0));
        assert_eq!(compiled.balance.mode, BalanceMode::Anions);
    }

    #[test]
    fn bad_values_are_defaulted() {
        let feed = FeedDef {
            flow_rate: Some(f64::NAN),
            ions: IonVector::new().with(Ion::Na, -5.0).with(Ion::Cl, 10.0),
            chemistry: ScalingInputs {
                silica_mg_l: Some(20.0),
                ..Default::default()
            },
            ..Default::default()
        };
        let compiled = compile_feed(&feed, UnitSystem::Metric, BalanceMode::Off);
        assert_eq!(compiled.request.flow_m3h, DEFAULT_FLOW_M3H);
        assert_eq!(compiled.request.ph, DEFAULT_PH);
        assert!(compiled.defaulted.contains(&"feed.flow_rate".to_string()));
        assert!(compiled.defaulted.contains(&"feed.ions.Na".to_string()));
        assert!(compiled.request.chemistry.is_some());
        let ions = compiled.request.ions.unwrap();
        assert_eq!(ions.get(Ion::Na), None);
    }
}
