// aq-core/src/units.rs

//! Metric / US-customary conversions.
//!
//! The engine contract is always metric (m³/h, bar, °C, LMH). Display values
//! may be in either system. Every function here is the identity when
//! `from == to` and otherwise a plain affine map; NaN and infinities pass
//! through unchanged so that callers decide how to sanitize input.

use core::fmt;
use core::str::FromStr;

use uom::si::f64::{
    Pressure as UomPressure, ThermodynamicTemperature as UomTemperature,
    VolumeRate as UomVolumeRate,
};
use uom::si::pressure::{bar, pound_force_per_square_inch};
use uom::si::thermodynamic_temperature::{degree_celsius, degree_fahrenheit};
use uom::si::volume_rate::{cubic_meter_per_hour, gallon_per_minute};

use crate::AqError;

/// US gfd per LMH used by the flux conversion.
pub const GFD_PER_LMH: f64 = 0.408_734_974;

/// Unit system a value is expressed in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum UnitSystem {
    /// m³/h, bar, °C, LMH
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "SI", alias = "si", alias = "METRIC"))]
    Metric,
    /// gpm, psi, °F, gfd
    #[cfg_attr(feature = "serde", serde(alias = "US"))]
    Us,
}

impl UnitSystem {
    pub fn is_metric(self) -> bool {
        matches!(self, UnitSystem::Metric)
    }

    pub fn labels(self) -> UnitLabels {
        match self {
            UnitSystem::Metric => UnitLabels {
                flow: "m3/h",
                pressure: "bar",
                temperature: "C",
                flux: "LMH",
            },
            UnitSystem::Us => UnitLabels {
                flow: "gpm",
                pressure: "psi",
                temperature: "F",
                flux: "gfd",
            },
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitSystem::Metric => write!(f, "metric"),
            UnitSystem::Us => write!(f, "us"),
        }
    }
}

impl FromStr for UnitSystem {
    type Err = AqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "metric" | "si" => Ok(UnitSystem::Metric),
            "us" | "imperial" => Ok(UnitSystem::Us),
            other => Err(AqError::UnknownUnitSystem {
                name: other.to_string(),
            }),
        }
    }
}

/// Short unit labels for one unit system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UnitLabels {
    pub flow: &'static str,
    pub pressure: &'static str,
    pub temperature: &'static str,
    pub flux: &'static str,
}

/// m³/h <-> US gpm.
pub fn convert_flow(value: f64, from: UnitSystem, to: UnitSystem) -> f64 {
    match (from, to) {
        (UnitSystem::Metric, UnitSystem::Us) => {
            UomVolumeRate::new::<cubic_meter_per_hour>(value).get::<gallon_per_minute>()
        }
        (UnitSystem::Us, UnitSystem::Metric) => {
            UomVolumeRate::new::<gallon_per_minute>(value).get::<cubic_meter_per_hour>()
        }
        _ => value,
    }
}

/// bar <-> psi. Also valid for pressure differences.
pub fn convert_pressure(value: f64, from: UnitSystem, to: UnitSystem) -> f64 {
    match (from, to) {
        (UnitSystem::Metric, UnitSystem::Us) => {
            UomPressure::new::<bar>(value).get::<pound_force_per_square_inch>()
        }
        (UnitSystem::Us, UnitSystem::Metric) => {
            UomPressure::new::<pound_force_per_square_inch>(value).get::<bar>()
        }
        _ => value,
    }
}

/// °C <-> °F (absolute temperatures only).
pub fn convert_temperature(value: f64, from: UnitSystem, to: UnitSystem) -> f64 {
    match (from, to) {
        (UnitSystem::Metric, UnitSystem::Us) => {
            UomTemperature::new::<degree_celsius>(value).get::<degree_fahrenheit>()
        }
        (UnitSystem::Us, UnitSystem::Metric) => {
            UomTemperature::new::<degree_fahrenheit>(value).get::<degree_celsius>()
        }
        _ => value,
    }
}

/// LMH <-> US gfd.
pub fn convert_flux(value: f64, from: UnitSystem, to: UnitSystem) -> f64 {
    match (from, to) {
        (UnitSystem::Metric, UnitSystem::Us) => value * GFD_PER_LMH,
        (UnitSystem::Us, UnitSystem::Metric) => value / GFD_PER_LMH,
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::{nearly_equal, Tolerances};

    const TOL: Tolerances = Tolerances {
        abs: 1e-9,
        rel: 1e-9,
    };

    #[test]
    fn factors_match_engine_constants() {
        let gpm = convert_flow(1.0, UnitSystem::Metric, UnitSystem::Us);
        assert!((gpm - 4.402_867).abs() < 1e-5);

        let psi = convert_pressure(1.0, UnitSystem::Metric, UnitSystem::Us);
        assert!((psi - 14.503_773_8).abs() < 1e-6);

        let gfd = convert_flux(1.0, UnitSystem::Metric, UnitSystem::Us);
        assert!(nearly_equal(gfd, GFD_PER_LMH, TOL));
    }

    #[test]
    fn temperature_is_affine() {
        let f = convert_temperature(25.0, UnitSystem::Metric, UnitSystem::Us);
        assert!((f - 77.0).abs() < 1e-9);
        let c = convert_temperature(32.0, UnitSystem::Us, UnitSystem::Metric);
        assert!(c.abs() < 1e-9);
        let f = convert_temperature(-40.0, UnitSystem::Metric, UnitSystem::Us);
        assert!((f + 40.0).abs() < 1e-9);
    }

    #[test]
    fn same_system_is_identity() {
        for system in [UnitSystem::Metric, UnitSystem::Us] {
            assert_eq!(convert_flow(12.5, system, system), 12.5);
            assert_eq!(convert_pressure(12.5, system, system), 12.5);
            assert_eq!(convert_temperature(12.5, system, system), 12.5);
            assert_eq!(convert_flux(12.5, system, system), 12.5);
        }
    }

    #[test]
    fn non_finite_values_propagate() {
        assert!(convert_flow(f64::NAN, UnitSystem::Metric, UnitSystem::Us).is_nan());
        assert!(convert_pressure(f64::NAN, UnitSystem::Us, UnitSystem::Metric).is_nan());
        assert!(convert_flux(f64::INFINITY, UnitSystem::Metric, UnitSystem::Us).is_infinite());
    }

    #[test]
    fn parse_unit_system() {
        assert_eq!("US".parse::<UnitSystem>().unwrap(), UnitSystem::Us);
        assert_eq!("si".parse::<UnitSystem>().unwrap(), UnitSystem::Metric);
        assert!("furlongs".parse::<UnitSystem>().is_err());
    }

    #[test]
    fn labels_per_system() {
        assert_eq!(UnitSystem::Metric.labels().flux, "LMH");
        assert_eq!(UnitSystem::Us.labels().pressure, "psi");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::numeric::{nearly_equal, Tolerances};
    use proptest::prelude::*;

    fn system() -> impl Strategy<Value = UnitSystem> {
        prop_oneof![Just(UnitSystem::Metric), Just(UnitSystem::Us)]
    }

    proptest! {
        #[test]
        fn round_trip_is_exact(
            x in -1.0e6_f64..1.0e6_f64,
            a in system(),
            b in system(),
        ) {
            let tol = Tolerances { abs: 1e-7, rel: 1e-10 };
            type Convert = fn(f64, UnitSystem, UnitSystem) -> f64;
            let fns: [Convert; 4] =
                [convert_flow, convert_pressure, convert_temperature, convert_flux];
            for f in fns {
                let back = f(f(x, a, b), b, a);
                prop_assert!(nearly_equal(back, x, tol), "{} -> {}", x, back);
            }
        }
    }
}
