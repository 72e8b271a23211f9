//! Charge balance of a feed-water analysis.
//!
//! Lab analyses rarely close on charge. The engine expects an electroneutral
//! feed, so the imbalance `Δ = C - A` (meq/L) is pushed onto one side, or
//! both, according to [`BalanceMode`]. Single-side modes walk a fixed ion
//! priority list: each ion takes as much of the remaining Δ as it can without
//! going negative, and whatever cannot be placed becomes a residual note.

use std::collections::BTreeMap;
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ChemError;
use crate::ion::{Ion, IonClass};
use crate::vector::IonVector;

/// Remaining imbalance below this is considered closed, meq/L.
pub const BALANCE_EPS_MEQ: f64 = 1e-6;

/// Per-ion changes at or below this are left out of the audit record, mg/L.
pub const DELTA_REPORT_MG_L: f64 = 1e-3;

const ANION_PRIORITY: [Ion; 8] = [
    Ion::Cl,
    Ion::HCO3,
    Ion::SO4,
    Ion::NO3,
    Ion::Br,
    Ion::CO3,
    Ion::PO4,
    Ion::F,
];

const CATION_PRIORITY: [Ion; 9] = [
    Ion::Na,
    Ion::Ca,
    Ion::Mg,
    Ion::K,
    Ion::NH4,
    Ion::Sr,
    Ion::Ba,
    Ion::Fe,
    Ion::Mn,
];

/// Which side absorbs the imbalance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceMode {
    /// Report only.
    #[default]
    Off,
    /// Adjust anions, Cl first.
    Anions,
    /// Adjust cations, Na first.
    Cations,
    /// Scale both sides to their mean.
    All,
}

impl fmt::Display for BalanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BalanceMode::Off => "off",
            BalanceMode::Anions => "anions",
            BalanceMode::Cations => "cations",
            BalanceMode::All => "all",
        };
        f.write_str(name)
    }
}

impl FromStr for BalanceMode {
    type Err = ChemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(BalanceMode::Off),
            "anions" => Ok(BalanceMode::Anions),
            "cations" => Ok(BalanceMode::Cations),
            "all" => Ok(BalanceMode::All),
            other => Err(ChemError::UnknownMode {
                name: other.to_string(),
            }),
        }
    }
}

/// Audit record of one balancing pass. All charge figures in meq/L.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeBalanceMeta {
    pub mode: BalanceMode,
    pub raw_cation_meq_l: f64,
    pub raw_anion_meq_l: f64,
    pub raw_imbalance_meq_l: f64,
    pub adjusted_cation_meq_l: f64,
    pub adjusted_anion_meq_l: f64,
    pub adjusted_imbalance_meq_l: f64,
    /// `adjusted - raw` per ion, mg/L.
    #[serde(default)]
    pub deltas_mg_l: BTreeMap<Ion, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChargeBalanceOutcome {
    pub ions: IonVector,
    pub meta: ChargeBalanceMeta,
}

/// Balance `ions` under `mode`. The input is left untouched.
///
/// Negative and non-finite entries are dropped from the output in every mode,
/// `off` included; the sums already read them as zero.
pub fn apply_charge_balance(ions: &IonVector, mode: BalanceMode) -> ChargeBalanceOutcome {
    let raw_cations = ions.cation_meq();
    let raw_anions = ions.anion_meq();
    let mut balanced = ions.clone();
    let dropped = balanced.sanitize();
    if !dropped.is_empty() {
        debug!(?dropped, "unusable ion entries dropped before balancing");
    }

    let residual = match mode {
        BalanceMode::Off => None,
        BalanceMode::Anions => distribute(&mut balanced, &ANION_PRIORITY, raw_cations - raw_anions),
        BalanceMode::Cations => {
            distribute(&mut balanced, &CATION_PRIORITY, raw_anions - raw_cations)
        }
        BalanceMode::All => balance_both(&mut balanced, raw_cations, raw_anions),
    };

    let note = residual.map(|meq| {
        warn!(%mode, residual_meq_l = meq, "charge imbalance could not be fully assigned");
        format!("Residual imbalance of {meq:.4} meq/L remains after {mode} adjustment")
    });

    let deltas_mg_l = Ion::ALL
        .into_iter()
        .filter_map(|ion| {
            let delta = balanced.concentration(ion) - ions.concentration(ion);
            (delta.abs() > DELTA_REPORT_MG_L).then_some((ion, delta))
        })
        .collect();

    let meta = ChargeBalanceMeta {
        mode,
        raw_cation_meq_l: raw_cations,
        raw_anion_meq_l: raw_anions,
        raw_imbalance_meq_l: raw_cations - raw_anions,
        adjusted_cation_meq_l: balanced.cation_meq(),
        adjusted_anion_meq_l: balanced.anion_meq(),
        adjusted_imbalance_meq_l: balanced.imbalance_meq(),
        deltas_mg_l,
        note,
    };
    debug!(
        %mode,
        raw = meta.raw_imbalance_meq_l,
        adjusted = meta.adjusted_imbalance_meq_l,
        "charge balance applied"
    );

    ChargeBalanceOutcome {
        ions: balanced,
        meta,
    }
}

/// Place `target_meq` onto `priority` in order. Returns the unplaced
/// remainder, if any.
fn distribute(ions: &mut IonVector, priority: &[Ion], target_meq: f64) -> Option<f64> {
    let mut remaining = target_meq;
    for &ion in priority {
        if remaining.abs() < BALANCE_EPS_MEQ {
            break;
        }
        let current = ions.concentration(ion);
        let proposed = (current + ion.mg_per_l(remaining)).max(0.0);
        let applied = ion.meq_per_l(proposed - current);
        if applied == 0.0 {
            continue;
        }
        ions.set(ion, Some(proposed));
        remaining -= applied;
    }
    (remaining.abs() >= BALANCE_EPS_MEQ).then_some(remaining)
}

/// Scale cations and anions onto their mean. A side with no charge cannot be
/// scaled, so the other side is adjusted alone.
fn balance_both(ions: &mut IonVector, cations: f64, anions: f64) -> Option<f64> {
    if cations > 0.0 && anions > 0.0 {
        let target = 0.5 * (cations + anions);
        scale_side(ions, IonClass::Cation, target / cations);
        scale_side(ions, IonClass::Anion, target / anions);
        None
    } else if cations > 0.0 {
        distribute(ions, &ANION_PRIORITY, cations - anions)
    } else if anions > 0.0 {
        distribute(ions, &CATION_PRIORITY, anions - cations)
    } else {
        None
    }
}

fn scale_side(ions: &mut IonVector, class: IonClass, factor: f64) {
    for ion in Ion::ALL.into_iter().filter(|i| i.class() == class) {
        let c = ions.concentration(ion);
        if c > 0.0 {
            ions.set(ion, Some(c * factor));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brackish() -> IonVector {
        IonVector::new()
            .with(Ion::Ca, 120.0)
            .with(Ion::Mg, 40.0)
            .with(Ion::Na, 300.0)
            .with(Ion::HCO3, 150.0)
            .with(Ion::Cl, 400.0)
            .with(Ion::SO4, 200.0)
    }

    #[test]
    fn off_reports_without_changing() {
        let ions = brackish();
        let out = apply_charge_balance(&ions, BalanceMode::Off);
        assert_eq!(out.ions, ions);
        assert!(out.meta.deltas_mg_l.is_empty());
        assert!(out.meta.raw_imbalance_meq_l > 4.0);
        assert_eq!(out.meta.raw_imbalance_meq_l, out.meta.adjusted_imbalance_meq_l);
    }

    #[test]
    fn anions_adds_chloride_only() {
        let ions = brackish();
        let out = apply_charge_balance(&ions, BalanceMode::Anions);
        let delta = out.meta.raw_imbalance_meq_l;

        let cl = out.ions.get(Ion::Cl).unwrap();
        assert!((cl - 400.0 - delta * Ion::Cl.molar_mass()).abs() < 1e-9);
        assert_eq!(out.ions.get(Ion::HCO3), Some(150.0));
        assert_eq!(out.ions.get(Ion::SO4), Some(200.0));
        assert_eq!(out.meta.deltas_mg_l.len(), 1);
        assert!(out.meta.adjusted_imbalance_meq_l.abs() < BALANCE_EPS_MEQ);
        assert!(out.meta.note.is_none());
    }

    #[test]
    fn cations_removal_cascades_down_priority() {
        // 1 meq/L of excess cations carried by Na (0.5) and Ca (1.0)
        let ions = IonVector::new()
            .with(Ion::Na, 0.5 * 22.990)
            .with(Ion::Ca, 40.078 / 2.0)
            .with(Ion::Cl, 0.5 * 35.453);
        let out = apply_charge_balance(&ions, BalanceMode::Cations);
        assert_eq!(out.ions.get(Ion::Na), Some(0.0));
        let ca_meq = Ion::Ca.meq_per_l(out.ions.concentration(Ion::Ca));
        assert!((ca_meq - 0.5).abs() < 1e-9);
        assert!(out.meta.adjusted_imbalance_meq_l.abs() < BALANCE_EPS_MEQ);
    }

    #[test]
    fn cations_removal_floors_every_ion_but_the_last() {
        // 3 meq/L of cations against 0.1 meq/L of chloride
        let ions = IonVector::new()
            .with(Ion::Na, 22.990)
            .with(Ion::Ca, 40.078 / 2.0)
            .with(Ion::Mg, 24.305 / 2.0)
            .with(Ion::Cl, 0.1 * 35.453);
        let out = apply_charge_balance(&ions, BalanceMode::Cations);

        assert_eq!(out.ions.get(Ion::Na), Some(0.0));
        assert_eq!(out.ions.get(Ion::Ca), Some(0.0));
        let mg_meq = Ion::Mg.meq_per_l(out.ions.concentration(Ion::Mg));
        assert!((mg_meq - 0.1).abs() < 1e-9);
        assert!(out.meta.note.is_none());
        assert!(out.meta.adjusted_imbalance_meq_l.abs() < BALANCE_EPS_MEQ);
    }

    #[test]
    fn cations_raise_sodium_against_heavy_anions() {
        let ions = IonVector::new()
            .with(Ion::K, 0.5)
            .with(Ion::Cl, 3000.0)
            .with(Ion::SO4, 1500.0);
        let out = apply_charge_balance(&ions, BalanceMode::Cations);

        let raw = out.meta.raw_imbalance_meq_l;
        assert!(raw < -100.0);
        let na_meq = Ion::Na.meq_per_l(out.ions.concentration(Ion::Na));
        assert!((na_meq + raw).abs() < 1e-6);
        assert_eq!(out.ions.get(Ion::K), Some(0.5));
        assert!(out.meta.note.is_none());
        assert!(out.meta.adjusted_imbalance_meq_l.abs() < raw.abs());
    }

    #[test]
    fn exhausted_priority_list_leaves_residual() {
        // removal larger than Na and Ca can give; both stop at the floor
        let mut ions = IonVector::new()
            .with(Ion::Na, 22.990)
            .with(Ion::Ca, 40.078 / 2.0)
            .with(Ion::Mg, 24.305);
        let residual = distribute(&mut ions, &[Ion::Na, Ion::Ca], -5.0)
            .expect("list exhausted before the target was placed");

        assert_eq!(ions.get(Ion::Na), Some(0.0));
        assert_eq!(ions.get(Ion::Ca), Some(0.0));
        assert_eq!(ions.get(Ion::Mg), Some(24.305));
        assert!((residual + 3.0).abs() < 1e-9);
        assert!(residual.abs() < 5.0);
    }

    #[test]
    fn unusable_entries_never_reach_the_output() {
        let ions = IonVector::new()
            .with(Ion::Na, 22.990)
            .with(Ion::Cl, 35.453)
            .with(Ion::SO4, -10.0)
            .with(Ion::K, f64::NAN);
        for mode in [
            BalanceMode::Off,
            BalanceMode::Anions,
            BalanceMode::Cations,
            BalanceMode::All,
        ] {
            let out = apply_charge_balance(&ions, mode);
            assert_eq!(out.ions.get(Ion::SO4), None, "{mode}");
            assert_eq!(out.ions.get(Ion::K), None, "{mode}");
            assert!(out.meta.deltas_mg_l.is_empty(), "{mode}");
        }
        assert_eq!(ions.get(Ion::SO4), Some(-10.0));
    }

    #[test]
    fn all_scales_to_mean() {
        let ions = brackish();
        let out = apply_charge_balance(&ions, BalanceMode::All);
        let mean = 0.5 * (out.meta.raw_cation_meq_l + out.meta.raw_anion_meq_l);
        assert!((out.meta.adjusted_cation_meq_l - mean).abs() < 1e-9);
        assert!((out.meta.adjusted_anion_meq_l - mean).abs() < 1e-9);
    }

    #[test]
    fn all_with_no_anions_adds_chloride() {
        let ions = IonVector::new().with(Ion::Na, 22.990);
        let out = apply_charge_balance(&ions, BalanceMode::All);
        assert_eq!(out.ions.get(Ion::Na), Some(22.990));
        assert!((out.ions.concentration(Ion::Cl) - 35.453).abs() < 1e-9);
    }

    #[test]
    fn unknown_ions_stay_unknown() {
        let mut ions = brackish();
        ions.set(Ion::K, None);
        let out = apply_charge_balance(&ions, BalanceMode::Cations);
        // excess cations are removed from Na alone
        assert_eq!(out.ions.get(Ion::K), None);
    }

    #[test]
    fn empty_vector_is_noop() {
        let out = apply_charge_balance(&IonVector::new(), BalanceMode::All);
        assert!(out.ions.is_empty());
        assert!(out.meta.note.is_none());
    }

    #[test]
    fn mode_parsing() {
        assert_eq!("ALL".parse::<BalanceMode>().unwrap(), BalanceMode::All);
        assert!("both".parse::<BalanceMode>().is_err());
        assert_eq!(BalanceMode::Anions.to_string(), "anions");
    }
}
