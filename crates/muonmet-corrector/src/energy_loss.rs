//! Average calorimeter deposit of a muon that is not isolated enough for its
//! measured deposit to be trusted.
//!
//! The deposit is an empirical, eta-dependent value at 50 GeV, rescaled by
//! the iron stopping-power parametrisation
//!
//! ```text
//! dE/dx(p) = −(11.4 + 0.96 |ln(2.8 p)| + 0.033 p (1 − p^−0.33)) · 10⁻³
//! ```
//!
//! as `factor · dE/dx(50) / dE/dx(p)`. Results under
//! [`DEPOSIT_FLOOR`] are dropped to exactly zero.

/// Momentum (GeV) at which the eta factors were measured.
pub const NORMALIZATION_MOMENTUM: f64 = 50.0;

/// Expected deposits below this (GeV) are not applied.
pub const DEPOSIT_FLOOR: f64 = 0.5;

/// Iron stopping power for a muon of momentum `p` (GeV), in GeV per unit
/// length of the parametrisation.
pub fn iron_dedx(p: f64) -> f64 {
    -(11.4 + 0.96 * (p * 2.8).ln().abs() + 0.033 * p * (1.0 - p.powf(-0.33))) * 1e-3
}

/// Empirical deposit at the normalisation momentum for a muon at `abs_eta`.
///
/// The regions are `[0, 0.2)`, `[0.2, 1.0)`, `[1.0, 1.3)` and `[1.3, ∞)`
/// with HO, and `[0, 1.0)`, `[1.0, 1.3)`, `[1.3, ∞)` without.
pub fn eta_factor(abs_eta: f64, p: f64, use_ho: bool) -> f64 {
    if use_ho {
        if abs_eta < 0.2 {
            2.75 * (1.0 - 0.00003 * p)
        } else if abs_eta < 1.0 {
            (2.38 + 0.0144 * abs_eta) * (1.0 - 0.0003 * p)
        } else if abs_eta < 1.3 {
            7.413 - 5.12 * abs_eta
        } else {
            2.084 - 0.743 * abs_eta
        }
    } else if abs_eta < 1.0 {
        2.33 * (1.0 - 0.0004 * p)
    } else if abs_eta < 1.3 {
        (7.413 - 5.12 * abs_eta) * (1.0 - 0.0003 * p)
    } else {
        2.084 - 0.743 * abs_eta
    }
}

/// Expected calorimeter deposit (GeV) of a muon with momentum `p` at
/// pseudorapidity `eta`. Zero for non-physical momenta.
pub fn expected_deposit(p: f64, eta: f64, use_ho: bool) -> f64 {
    if p.is_nan() || p <= 0.0 || p.is_infinite() {
        return 0.0;
    }
    let dep = eta_factor(eta.abs(), p, use_ho) * iron_dedx(NORMALIZATION_MOMENTUM) / iron_dedx(p);
    if dep.is_nan() || dep < DEPOSIT_FLOOR {
        0.0
    } else {
        dep
    }
}
