//! Scaling-tendency preview for a feed water.
//!
//! Langelier family via the APHA method, sulfate and fluoride salts via
//! `log10(IAP / Ksp)` at 25 °C, silica against a fixed saturation limit.
//! Every index is `None` when its inputs are unknown.

use serde::{Deserialize, Serialize};

use crate::ion::Ion;
use crate::vector::IonVector;

const MW_CACO3: f64 = 100.09;
/// Equivalent weight of CaCO3 used for alkalinity.
const EW_CACO3: f64 = 50.0;

const KSP_CASO4: f64 = 2.25e-4;
const KSP_SRSO4: f64 = 1.44e-4;
const KSP_BASO4: f64 = 1.0e-10;
const KSP_CAF2: f64 = 3.9e-11;
const SIO2_SAT_MG_L: f64 = 150.0;

/// Above this TDS the Stiff & Davis index is offset from LSI.
const SDSI_TDS_MG_L: f64 = 10_000.0;
const SDSI_OFFSET: f64 = 0.2;

/// Bulk scaling chemistry entered alongside (or instead of) the ion table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalingInputs {
    #[serde(
        rename = "alkalinity_mgL_as_CaCO3",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub alkalinity_caco3_mg_l: Option<f64>,
    #[serde(
        rename = "calcium_hardness_mgL_as_CaCO3",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub calcium_hardness_caco3_mg_l: Option<f64>,
    #[serde(rename = "sulfate_mgL", default, skip_serializing_if = "Option::is_none")]
    pub sulfate_mg_l: Option<f64>,
    #[serde(rename = "barium_mgL", default, skip_serializing_if = "Option::is_none")]
    pub barium_mg_l: Option<f64>,
    #[serde(rename = "strontium_mgL", default, skip_serializing_if = "Option::is_none")]
    pub strontium_mg_l: Option<f64>,
    #[serde(rename = "silica_mgL_SiO2", default, skip_serializing_if = "Option::is_none")]
    pub silica_mg_l: Option<f64>,
}

impl ScalingInputs {
    pub fn is_empty(&self) -> bool {
        self == &ScalingInputs::default()
    }
}

/// Bulk water state the indices depend on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterConditions {
    pub tds_mg_l: f64,
    pub temperature_c: f64,
    pub ph: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalingIndices {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lsi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s_dsi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caco3_si: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caso4_si: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baso4_si: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srso4_si: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caf2_si: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sio2_si: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caso4_sat_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baso4_sat_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sio2_sat_pct: Option<f64>,
}

pub fn scaling_indices(
    water: WaterConditions,
    ions: &IonVector,
    inputs: &ScalingInputs,
) -> ScalingIndices {
    let ion = |i: Ion| positive(ions.get(i));

    let hardness = positive(inputs.calcium_hardness_caco3_mg_l)
        .or_else(|| ion(Ion::Ca).map(|ca| ca * MW_CACO3 / Ion::Ca.molar_mass()));
    let alkalinity = positive(inputs.alkalinity_caco3_mg_l)
        .or_else(|| ion(Ion::HCO3).map(|hco3| hco3 * EW_CACO3 / Ion::HCO3.molar_mass()));
    let calcium = ion(Ion::Ca).or_else(|| {
        positive(inputs.calcium_hardness_caco3_mg_l).map(|h| h * Ion::Ca.molar_mass() / MW_CACO3)
    });
    let sulfate = ion(Ion::SO4).or(positive(inputs.sulfate_mg_l));
    let barium = ion(Ion::Ba).or(positive(inputs.barium_mg_l));
    let strontium = ion(Ion::Sr).or(positive(inputs.strontium_mg_l));
    let silica = ion(Ion::SiO2).or(positive(inputs.silica_mg_l));
    let fluoride = ion(Ion::F);

    let mut out = ScalingIndices::default();

    if let (Some(ca_h), Some(alk)) = (hardness, alkalinity) {
        if water.tds_mg_l.is_finite() && water.temperature_c.is_finite() && water.ph.is_finite() {
            let a = (safe_log10(water.tds_mg_l) - 1.0) / 10.0;
            let b = -13.12 * safe_log10(water.temperature_c + 273.0) + 34.55;
            let c = safe_log10(ca_h) - 0.4;
            let d = safe_log10(alk);
            let ph_s = (9.3 + a + b) - (c + d);
            let lsi = water.ph - ph_s;

            out.lsi = Some(lsi);
            out.rsi = Some(2.0 * ph_s - water.ph);
            out.caco3_si = Some(lsi);
            out.s_dsi = Some(if water.tds_mg_l > SDSI_TDS_MG_L {
                lsi - SDSI_OFFSET
            } else {
                lsi
            });
        }
    }

    if let Some(so4) = sulfate {
        let so4_mol = molar(so4, Ion::SO4);
        out.caso4_si = calcium.map(|ca| si(molar(ca, Ion::Ca) * so4_mol, KSP_CASO4));
        out.baso4_si = barium.map(|ba| si(molar(ba, Ion::Ba) * so4_mol, KSP_BASO4));
        out.srso4_si = strontium.map(|sr| si(molar(sr, Ion::Sr) * so4_mol, KSP_SRSO4));
    }

    if let (Some(ca), Some(f)) = (calcium, fluoride) {
        out.caf2_si = Some(si(molar(ca, Ion::Ca) * molar(f, Ion::F).powi(2), KSP_CAF2));
    }

    out.sio2_si = silica.map(|s| safe_log10(s / SIO2_SAT_MG_L));

    out.caso4_sat_pct = out.caso4_si.map(saturation_pct);
    out.baso4_sat_pct = out.baso4_si.map(saturation_pct);
    out.sio2_sat_pct = out.sio2_si.map(saturation_pct);

    out
}

fn positive(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite() && *x > 0.0)
}

/// mg/L to mol/L.
fn molar(mg_l: f64, ion: Ion) -> f64 {
    mg_l / 1000.0 / ion.molar_mass()
}

fn safe_log10(x: f64) -> f64 {
    x.max(1e-30).log10()
}

fn si(iap: f64, ksp: f64) -> f64 {
    safe_log10(iap / ksp)
}

/// `10^SI` as a percentage, two decimals.
fn saturation_pct(si: f64) -> f64 {
    (10f64.powf(si) * 100.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> WaterConditions {
        WaterConditions {
            tds_mg_l: 500.0,
            temperature_c: 25.0,
            ph: 7.5,
        }
    }

    #[test]
    fn lsi_apha() {
        let inputs = ScalingInputs {
            alkalinity_caco3_mg_l: Some(150.0),
            calcium_hardness_caco3_mg_l: Some(200.0),
            ..Default::default()
        };
        let out = scaling_indices(water(), &IonVector::new(), &inputs);
        assert!((out.lsi.unwrap() - 0.018_941_6).abs() < 1e-6);
        assert!((out.rsi.unwrap() - 7.462_116_7).abs() < 1e-6);
        assert_eq!(out.s_dsi, out.lsi);
    }

    #[test]
    fn sdsi_offset_for_seawater() {
        let inputs = ScalingInputs {
            alkalinity_caco3_mg_l: Some(120.0),
            calcium_hardness_caco3_mg_l: Some(1000.0),
            ..Default::default()
        };
        let sea = WaterConditions {
            tds_mg_l: 35_000.0,
            ..water()
        };
        let out = scaling_indices(sea, &IonVector::new(), &inputs);
        assert!((out.lsi.unwrap() - out.s_dsi.unwrap() - SDSI_OFFSET).abs() < 1e-12);
    }

    #[test]
    fn calcium_sulfate_from_ions() {
        let ions = IonVector::new().with(Ion::Ca, 120.0).with(Ion::SO4, 200.0);
        let out = scaling_indices(water(), &ions, &ScalingInputs::default());
        assert!((out.caso4_si.unwrap() + 1.557_419_9).abs() < 1e-6);
        assert_eq!(out.caso4_sat_pct, Some(2.77));
        assert!(out.baso4_si.is_none());
        // no HCO3 and no alkalinity given
        assert!(out.lsi.is_none());
    }

    #[test]
    fn silica_from_inputs() {
        let inputs = ScalingInputs {
            silica_mg_l: Some(30.0),
            ..Default::default()
        };
        let out = scaling_indices(water(), &IonVector::new(), &inputs);
        assert!((out.sio2_si.unwrap() + 0.698_970_0).abs() < 1e-6);
        assert_eq!(out.sio2_sat_pct, Some(20.0));
    }

    #[test]
    fn inputs_use_wire_names() {
        let inputs: ScalingInputs =
            serde_json::from_str(r#"{"alkalinity_mgL_as_CaCO3": 100, "silica_mgL_SiO2": 12}"#)
                .unwrap();
        assert_eq!(inputs.alkalinity_caco3_mg_l, Some(100.0));
        assert_eq!(inputs.silica_mg_l, Some(12.0));
        assert!(!inputs.is_empty());
        assert!(ScalingInputs::default().is_empty());
    }
}
