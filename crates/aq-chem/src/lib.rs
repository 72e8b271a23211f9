//! aq-chem: feed-water chemistry for AquaNova.
//!
//! Provides:
//! - `Ion`: reference data (molar mass, valence) for every tracked ion
//! - `IonVector`: a feed composition in mg/L with unknown entries
//! - `apply_charge_balance`: restore electroneutrality under a `BalanceMode`
//! - `scaling_indices`: LSI / sulfate / fluoride / silica saturation preview

pub mod balance;
pub mod error;
pub mod ion;
pub mod scaling;
pub mod vector;

pub use balance::{BalanceMode, ChargeBalanceMeta, ChargeBalanceOutcome, apply_charge_balance};
pub use error::{ChemError, ChemResult};
pub use ion::{Ion, IonClass};
pub use scaling::{ScalingIndices, ScalingInputs, WaterConditions, scaling_indices};
pub use vector::IonVector;
