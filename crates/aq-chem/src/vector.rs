//! Feed ion composition.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ion::{Ion, IonClass};

/// Ion concentrations in mg/L.
///
/// An entry may be absent or `None`; both mean "unknown" and count as zero in
/// every sum. Non-finite and negative entries also count as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IonVector(BTreeMap<Ion, Option<f64>>);

impl IonVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, ion: Ion, mg_l: f64) -> Self {
        self.set(ion, Some(mg_l));
        self
    }

    pub fn set(&mut self, ion: Ion, mg_l: Option<f64>) {
        self.0.insert(ion, mg_l);
    }

    /// Raw entry, `None` when absent or explicitly unknown.
    pub fn get(&self, ion: Ion) -> Option<f64> {
        self.0.get(&ion).copied().flatten()
    }

    /// Usable concentration: unknown, non-finite and negative read as zero.
    pub fn concentration(&self, ion: Ion) -> f64 {
        match self.get(ion) {
            Some(c) if c.is_finite() && c > 0.0 => c,
            _ => 0.0,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Ion, Option<f64>)> + '_ {
        self.0.iter().map(|(ion, c)| (*ion, *c))
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|c| c.is_none())
    }

    /// Sum of cation charge, meq/L.
    pub fn cation_meq(&self) -> f64 {
        self.side_meq(IonClass::Cation)
    }

    /// Sum of anion charge, meq/L.
    pub fn anion_meq(&self) -> f64 {
        self.side_meq(IonClass::Anion)
    }

    /// Signed imbalance `cations - anions`, meq/L.
    pub fn imbalance_meq(&self) -> f64 {
        self.cation_meq() - self.anion_meq()
    }

    /// Sum of every usable concentration, mg/L.
    pub fn total_mg_l(&self) -> f64 {
        self.0.keys().map(|ion| self.concentration(*ion)).sum()
    }

    /// Drop non-finite and negative entries, returning the ions removed.
    pub fn sanitize(&mut self) -> Vec<Ion> {
        let mut dropped = Vec::new();
        for (ion, value) in self.0.iter_mut() {
            if let Some(c) = *value {
                if !c.is_finite() || c < 0.0 {
                    *value = None;
                    dropped.push(*ion);
                }
            }
        }
        dropped
    }

    fn side_meq(&self, class: IonClass) -> f64 {
        self.0
            .keys()
            .filter(|ion| ion.class() == class)
            .map(|ion| ion.meq_per_l(self.concentration(*ion)))
            .sum()
    }
}

impl FromIterator<(Ion, f64)> for IonVector {
    fn from_iter<T: IntoIterator<Item = (Ion, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(ion, c)| (ion, Some(c))).collect())
    }
}
