//! Switches that select how muon deposits are measured and which legacy
//! behaviours are reproduced.

use serde::{Deserialize, Serialize};

/// Corrector configuration. Every field has a default, so a partial TOML
/// table is enough.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectorConfig {
    /// Take surface positions from the track associator instead of the
    /// analytic helix projection.
    pub use_track_associator_positions: bool,

    /// Use the 3×3 cluster energies instead of the crossed towers.
    pub use_rec_hits: bool,

    /// Include the outer hadron calorimeter.
    pub use_ho: bool,

    /// Crossed towers below this Et (GeV) are ignored. Matches the tower
    /// floor used when the MET itself was built.
    pub tower_et_threshold: f64,

    /// Reproduce the historical tower loop that assigned each tower's energy
    /// instead of summing it, so only the last tower above threshold counts.
    pub legacy_accumulation_bug: bool,

    /// Reproduce the historical forward (|eta| ≥ 1.3) average correction that
    /// projected the y component with `cos` instead of `sin`.
    pub legacy_endcap_phi_bug: bool,

    /// Reproduce the historical average correction that took the plain
    /// arithmetic mean of the surface azimuths. Wrong when they straddle ±π;
    /// the default is the circular mean.
    pub legacy_arithmetic_phi_mean: bool,
}

impl Default for CorrectorConfig {
    fn default() -> Self {
        Self {
            use_track_associator_positions: false,
            use_rec_hits: false,
            use_ho: false,
            tower_et_threshold: 0.5,
            legacy_accumulation_bug: false,
            legacy_endcap_phi_bug: false,
            legacy_arithmetic_phi_mean: false,
        }
    }
}

impl CorrectorConfig {
    /// Configuration that reproduces the historical algorithm bit for bit.
    pub fn legacy() -> Self {
        Self {
            legacy_accumulation_bug: true,
            legacy_endcap_phi_bug: true,
            legacy_arithmetic_phi_mean: true,
            ..Self::default()
        }
    }
}
