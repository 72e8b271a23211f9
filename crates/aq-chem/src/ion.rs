//! Ion reference data.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ChemError;

/// Ions tracked in a feed-water analysis.
///
/// Serialized with the chemical symbol; lowercase symbols are accepted on
/// input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Ion {
    // Cations
    #[serde(alias = "na")]
    Na,
    #[serde(alias = "k")]
    K,
    #[serde(alias = "ca")]
    Ca,
    #[serde(alias = "mg")]
    Mg,
    #[serde(alias = "nh4")]
    NH4,
    #[serde(alias = "sr")]
    Sr,
    #[serde(alias = "ba")]
    Ba,
    #[serde(alias = "fe")]
    Fe,
    #[serde(alias = "mn")]
    Mn,
    // Anions
    #[serde(alias = "cl")]
    Cl,
    #[serde(alias = "so4")]
    SO4,
    #[serde(alias = "hco3")]
    HCO3,
    #[serde(alias = "no3")]
    NO3,
    #[serde(alias = "f")]
    F,
    #[serde(alias = "br")]
    Br,
    #[serde(alias = "po4")]
    PO4,
    #[serde(alias = "co3")]
    CO3,
    // Neutrals
    #[serde(alias = "sio2")]
    SiO2,
    #[serde(alias = "b", alias = "boron")]
    B,
    #[serde(alias = "co2")]
    CO2,
}

/// Which side of the charge balance an ion sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IonClass {
    Cation,
    Anion,
    Neutral,
}

impl Ion {
    pub const ALL: [Ion; 20] = [
        Ion::Na,
        Ion::K,
        Ion::Ca,
        Ion::Mg,
        Ion::NH4,
        Ion::Sr,
        Ion::Ba,
        Ion::Fe,
        Ion::Mn,
        Ion::Cl,
        Ion::SO4,
        Ion::HCO3,
        Ion::NO3,
        Ion::F,
        Ion::Br,
        Ion::PO4,
        Ion::CO3,
        Ion::SiO2,
        Ion::B,
        Ion::CO2,
    ];

    /// Chemical symbol, also the serialized key.
    pub fn symbol(self) -> &'static str {
        match self {
            Ion::Na => "Na",
            Ion::K => "K",
            Ion::Ca => "Ca",
            Ion::Mg => "Mg",
            Ion::NH4 => "NH4",
            Ion::Sr => "Sr",
            Ion::Ba => "Ba",
            Ion::Fe => "Fe",
            Ion::Mn => "Mn",
            Ion::Cl => "Cl",
            Ion::SO4 => "SO4",
            Ion::HCO3 => "HCO3",
            Ion::NO3 => "NO3",
            Ion::F => "F",
            Ion::Br => "Br",
            Ion::PO4 => "PO4",
            Ion::CO3 => "CO3",
            Ion::SiO2 => "SiO2",
            Ion::B => "B",
            Ion::CO2 => "CO2",
        }
    }

    /// Molar mass in g/mol.
    pub fn molar_mass(self) -> f64 {
        match self {
            Ion::Na => 22.990,
            Ion::K => 39.098,
            Ion::Ca => 40.078,
            Ion::Mg => 24.305,
            Ion::NH4 => 18.039,
            Ion::Sr => 87.62,
            Ion::Ba => 137.327,
            Ion::Fe => 55.845,
            Ion::Mn => 54.938,
            Ion::Cl => 35.453,
            Ion::SO4 => 96.06,
            Ion::HCO3 => 61.017,
            Ion::NO3 => 62.005,
            Ion::F => 18.998,
            Ion::Br => 79.904,
            Ion::PO4 => 94.97,
            Ion::CO3 => 60.008,
            Ion::SiO2 => 60.08,
            Ion::B => 10.811,
            Ion::CO2 => 44.009,
        }
    }

    /// Signed valence. Fe and Mn are taken as divalent.
    pub fn charge(self) -> i32 {
        match self {
            Ion::Na | Ion::K | Ion::NH4 => 1,
            Ion::Ca | Ion::Mg | Ion::Sr | Ion::Ba | Ion::Fe | Ion::Mn => 2,
            Ion::Cl | Ion::HCO3 | Ion::NO3 | Ion::F | Ion::Br => -1,
            Ion::SO4 | Ion::CO3 => -2,
            Ion::PO4 => -3,
            Ion::SiO2 | Ion::B | Ion::CO2 => 0,
        }
    }

    pub fn class(self) -> IonClass {
        match self.charge() {
            z if z > 0 => IonClass::Cation,
            z if z < 0 => IonClass::Anion,
            _ => IonClass::Neutral,
        }
    }

    /// mg/L per meq/L. Undefined (zero) for neutrals.
    pub fn equivalent_weight(self) -> f64 {
        match self.charge().unsigned_abs() {
            0 => 0.0,
            z => self.molar_mass() / f64::from(z),
        }
    }

    /// Convert mg/L to meq/L (`c / M * |z|`).
    pub fn meq_per_l(self, mg_l: f64) -> f64 {
        mg_l / self.molar_mass() * f64::from(self.charge().unsigned_abs())
    }

    /// Convert meq/L back to mg/L. Zero for neutrals.
    pub fn mg_per_l(self, meq_l: f64) -> f64 {
        meq_l * self.equivalent_weight()
    }

    pub fn cations() -> impl Iterator<Item = Ion> {
        Ion::ALL.into_iter().filter(|i| i.class() == IonClass::Cation)
    }

    pub fn anions() -> impl Iterator<Item = Ion> {
        Ion::ALL.into_iter().filter(|i| i.class() == IonClass::Anion)
    }
}

impl fmt::Display for Ion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Ion {
    type Err = ChemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        Ion::ALL
            .into_iter()
            .find(|ion| ion.symbol().eq_ignore_ascii_case(key))
            .ok_or_else(|| ChemError::UnknownIon {
                key: key.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_sizes() {
        assert_eq!(Ion::cations().count(), 9);
        assert_eq!(Ion::anions().count(), 8);
        let neutrals = Ion::ALL
            .iter()
            .filter(|i| i.class() == IonClass::Neutral)
            .count();
        assert_eq!(neutrals, 3);
    }

    #[test]
    fn meq_conversion() {
        // 40.078 mg/L of Ca is 1 mmol/L, 2 meq/L
        assert!((Ion::Ca.meq_per_l(40.078) - 2.0).abs() < 1e-12);
        assert!((Ion::Ca.mg_per_l(2.0) - 40.078).abs() < 1e-12);
        assert_eq!(Ion::SiO2.meq_per_l(100.0), 0.0);
    }

    #[test]
    fn parse_symbols() {
        assert_eq!("so4".parse::<Ion>().unwrap(), Ion::SO4);
        assert_eq!("HCO3".parse::<Ion>().unwrap(), Ion::HCO3);
        assert!("Al".parse::<Ion>().is_err());
    }

    #[test]
    fn serde_uses_symbols() {
        let json = serde_json::to_string(&Ion::SiO2).unwrap();
        assert_eq!(json, "\"SiO2\"");
        let ion: Ion = serde_json::from_str("\"nh4\"").unwrap();
        assert_eq!(ion, Ion::NH4);
    }
}
