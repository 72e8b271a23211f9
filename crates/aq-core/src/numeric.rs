/// Floating point type used throughout system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

/// A form value after lenient coercion.
///
/// `defaulted` is true when the input was missing or non-finite and the
/// per-field default was substituted instead.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coerced<T> {
    pub value: T,
    pub defaulted: bool,
}

impl<T> Coerced<T> {
    pub fn given(value: T) -> Self {
        Self {
            value,
            defaulted: false,
        }
    }

    pub fn fallback(value: T) -> Self {
        Self {
            value,
            defaulted: true,
        }
    }
}

/// Resolve an optional form number, falling back to `default` when it is
/// missing, NaN or infinite.
pub fn numeric_or_default(value: Option<Real>, default: Real) -> Coerced<Real> {
    match value {
        Some(v) if v.is_finite() => Coerced::given(v),
        _ => Coerced::fallback(default),
    }
}

/// Resolve an optional form number into an integer count within `[lo, hi]`.
///
/// Fractional input is rounded to the nearest integer before clamping.
/// Clamping alone does not mark the value as defaulted.
pub fn count_or_default(value: Option<Real>, default: u32, lo: u32, hi: u32) -> Coerced<u32> {
    match value {
        Some(v) if v.is_finite() => {
            let rounded = v.round().clamp(lo as Real, hi as Real);
            Coerced::given(rounded as u32)
        }
        _ => Coerced::fallback(default.clamp(lo, hi)),
    }
}
