//! Vector types in detector coordinates.
//!
//! The z axis is the beam line; phi is the azimuth measured from +x and theta
//! the polar angle from +z. Momenta are in GeV, positions in whatever unit
//! the producer documents (muon vertices are centimetres, calorimeter
//! surfaces metres).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Point3
// ────────────────────────────────────────────────────────────────────────────

/// A position in 3-D space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Distance from the beam line.
    pub fn perp(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Distance from the origin.
    pub fn mag(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Polar angle `acos(z / r)`; `0` for the origin itself.
    pub fn theta(&self) -> f64 {
        let r = self.mag();
        if r == 0.0 {
            return 0.0;
        }
        (self.z / r).clamp(-1.0, 1.0).acos()
    }

    /// Azimuth `atan2(y, x)` in `[-π, π]`.
    pub fn phi(&self) -> f64 {
        self.y.atan2(self.x)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Momentum3
// ────────────────────────────────────────────────────────────────────────────

/// A track three-momentum (GeV).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Momentum3 {
    pub px: f64,
    pub py: f64,
    pub pz: f64,
}

impl Momentum3 {
    pub fn new(px: f64, py: f64, pz: f64) -> Self {
        Self { px, py, pz }
    }

    /// Build from transverse momentum, pseudorapidity and azimuth.
    pub fn from_pt_eta_phi(pt: f64, eta: f64, phi: f64) -> Self {
        Self::new(pt * phi.cos(), pt * phi.sin(), pt * eta.sinh())
    }

    pub fn pt(&self) -> f64 {
        self.px.hypot(self.py)
    }

    pub fn p(&self) -> f64 {
        (self.px * self.px + self.py * self.py + self.pz * self.pz).sqrt()
    }

    pub fn phi(&self) -> f64 {
        self.py.atan2(self.px)
    }

    pub fn eta(&self) -> f64 {
        pseudorapidity(self.pt(), self.pz)
    }

    pub fn is_finite(&self) -> bool {
        self.px.is_finite() && self.py.is_finite() && self.pz.is_finite()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// FourMomentum
// ────────────────────────────────────────────────────────────────────────────

/// A Lorentz four-vector `(px, py, pz, E)` in GeV.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FourMomentum {
    pub px: f64,
    pub py: f64,
    pub pz: f64,
    pub e: f64,
}

impl FourMomentum {
    pub fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        Self { px, py, pz, e }
    }

    /// A massless four-vector along `momentum`.
    pub fn massless(momentum: Momentum3) -> Self {
        Self::new(momentum.px, momentum.py, momentum.pz, momentum.p())
    }

    pub fn momentum(&self) -> Momentum3 {
        Momentum3::new(self.px, self.py, self.pz)
    }

    pub fn pt(&self) -> f64 {
        self.momentum().pt()
    }

    pub fn p(&self) -> f64 {
        self.momentum().p()
    }

    pub fn phi(&self) -> f64 {
        self.momentum().phi()
    }

    pub fn eta(&self) -> f64 {
        self.momentum().eta()
    }

    /// Transverse energy `E · sin θ`, i.e. `E · pt / p`.
    pub fn et(&self) -> f64 {
        let p = self.p();
        if p == 0.0 {
            return 0.0;
        }
        self.e * self.pt() / p
    }
}

/// `asinh(pz / pt)`, signed infinity along the beam line and `0` for a null
/// vector.
fn pseudorapidity(pt: f64, pz: f64) -> f64 {
    if pt == 0.0 {
        return if pz == 0.0 {
            0.0
        } else {
            f64::INFINITY.copysign(pz)
        };
    }
    (pz / pt).asinh()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
