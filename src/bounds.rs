//! Negotiation bound derivation.
//!
//! Turns the two salary figures a user types into the five limits the
//! negotiation engine works with. Both the seeker and the recruiter halves
//! are always computed, whichever role is active.

use serde::Serialize;

/// Headroom the seeker asks for above their desired salary.
pub const SEEKER_MAX_MULTIPLIER: f64 = 1.1;

/// How far below the current salary the recruiter may open.
pub const RECRUITER_MIN_MULTIPLIER: f64 = 0.9;

/// The five derived limits sent when a session is created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NegotiationBounds {
    pub seeker_min: f64,
    pub seeker_target: f64,
    pub seeker_max: f64,
    pub recruiter_min: f64,
    pub recruiter_max: f64,
}

impl NegotiationBounds {
    /// `seeker_min <= seeker_target <= seeker_max` and
    /// `recruiter_min <= recruiter_max`.
    pub fn is_consistent(&self) -> bool {
        self.seeker_min <= self.seeker_target
            && self.seeker_target <= self.seeker_max
            && self.recruiter_min <= self.recruiter_max
    }

    /// Every limit is a finite number, so the wire body never carries `null`.
    pub fn is_finite(&self) -> bool {
        [
            self.seeker_min,
            self.seeker_target,
            self.seeker_max,
            self.recruiter_min,
            self.recruiter_max,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Derive the bounds from the current and desired salary.
///
/// Pure and total: no validation happens here, the form layer only calls
/// this with finite, non-negative figures. Scaled values are rounded to
/// whole cents so that e.g. `120000 * 1.1` is sent as `132000` rather than
/// `132000.00000000001`. Rounding never pulls `seeker_max` below the desired
/// salary nor pushes `recruiter_min` above the current one, which matters for
/// sub-cent figures like `0.004`.
pub fn derive_bounds(current_salary: f64, desired_salary: f64) -> NegotiationBounds {
    NegotiationBounds {
        seeker_min: current_salary,
        seeker_target: desired_salary,
        seeker_max: round_cents(desired_salary * SEEKER_MAX_MULTIPLIER).max(desired_salary),
        recruiter_min: round_cents(current_salary * RECRUITER_MIN_MULTIPLIER).min(current_salary),
        recruiter_max: desired_salary,
    }
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
