//! aq-core: stable foundation for the AquaNova model compiler.
//!
//! Contains:
//! - units (metric / US-customary conversions for flow, pressure, temperature, flux)
//! - numeric (Real + tolerances + lenient form coercion)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{AqError, AqResult};
pub use numeric::*;
pub use units::*;
