//! Scalar precision and the geometric tolerance.
//!
//! Exactly one of the `f64` (default) and `f32` features selects [`Real`] and the
//! matching `parry3d` build used for bounding boxes.

#[cfg(feature = "f64")]
pub use parry3d_f64 as parry3d;

#[cfg(feature = "f32")]
pub use parry3d;

#[cfg(feature = "f32")]
pub type Real = f32;
#[cfg(feature = "f64")]
pub type Real = f64;

#[cfg(feature = "f32")]
pub use core::f32::consts::{FRAC_PI_2, PI, TAU};
#[cfg(feature = "f64")]
pub use core::f64::consts::{FRAC_PI_2, PI, TAU};

use std::sync::OnceLock;

/// Tolerance used when nothing overrides it.
#[cfg(feature = "f32")]
pub const DEFAULT_TOLERANCE: Real = 1e-4;
#[cfg(feature = "f64")]
pub const DEFAULT_TOLERANCE: Real = 1e-6;

static TOLERANCE_CELL: OnceLock<Real> = OnceLock::new();

/// The crate-wide tolerance, fixed on first use.
///
/// It bounds three things:
/// - the squared edge length below which a polygon counts as flat;
/// - how close two face directions around a shared edge must be to tie;
/// - the minimum angle gain that justifies a triangulation flip.
///
/// The value comes from, in order: a call to [`set_tolerance`] made before first
/// use, the `CSGRS_TOLERANCE` variable seen at build time, [`DEFAULT_TOLERANCE`].
pub fn tolerance() -> Real {
    *TOLERANCE_CELL.get_or_init(|| {
        option_env!("CSGRS_TOLERANCE")
            .and_then(parse_tolerance)
            .unwrap_or(DEFAULT_TOLERANCE)
    })
}

/// Fix the tolerance before anything reads it. Returns `false` (and changes nothing)
/// once the tolerance is already in use.
pub fn set_tolerance(value: Real) -> bool {
    let accepted = TOLERANCE_CELL.set(clamp_tolerance(value)).is_ok();
    if !accepted {
        log::warn!("tolerance already fixed at {}; ignoring {}", tolerance(), value);
    }
    accepted
}

fn parse_tolerance(raw: &str) -> Option<Real> {
    raw.trim().parse::<Real>().ok().filter(|v| v.is_finite()).map(clamp_tolerance)
}

fn clamp_tolerance(value: Real) -> Real {
    value.abs().max(Real::EPSILON)
}
