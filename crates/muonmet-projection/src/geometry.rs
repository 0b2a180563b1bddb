//! Calorimeter surface layout.
//!
//! Every surface is a cylinder around the beam line. ECAL and HCAL are
//! closed by endcap discs at `±z_face`; HO only exists in the barrel and its
//! radius steps out beyond `|eta| = 0.3`. All lengths are in metres.

use std::fmt;

/// One of the three calorimeter surfaces a muon crosses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Ecal,
    Hcal,
    Ho,
}

impl Surface {
    pub const ALL: [Surface; 3] = [Surface::Ecal, Surface::Hcal, Surface::Ho];
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Surface::Ecal => write!(f, "ecal"),
            Surface::Hcal => write!(f, "hcal"),
            Surface::Ho => write!(f, "ho"),
        }
    }
}

/// Radii and endcap faces of the calorimeter surfaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaloGeometry {
    pub r_ecal: f64,
    pub r_hcal: f64,
    /// HO radius for `|eta| <= ho_eta_step`.
    pub r_ho_central: f64,
    /// HO radius for `|eta| > ho_eta_step`.
    pub r_ho_outer: f64,
    pub ho_eta_step: f64,
    /// Distance from the detector centre to the ECAL endcap face.
    pub z_face_ecal: f64,
    /// Distance from the detector centre to the HCAL endcap face.
    pub z_face_hcal: f64,
}

impl Default for CaloGeometry {
    fn default() -> Self {
        Self {
            r_ecal: 1.290,
            r_hcal: 1.9,
            r_ho_central: 3.82,
            r_ho_outer: 4.07,
            ho_eta_step: 0.3,
            z_face_ecal: 3.209,
            z_face_hcal: 3.88,
        }
    }
}

impl CaloGeometry {
    /// Barrel radius of `surface` for a muon at pseudorapidity `eta`.
    pub fn radius(&self, surface: Surface, eta: f64) -> f64 {
        match surface {
            Surface::Ecal => self.r_ecal,
            Surface::Hcal => self.r_hcal,
            Surface::Ho if eta.abs() > self.ho_eta_step => self.r_ho_outer,
            Surface::Ho => self.r_ho_central,
        }
    }

    /// Unsigned endcap face distance, `None` for barrel-only surfaces.
    pub fn z_face(&self, surface: Surface) -> Option<f64> {
        match surface {
            Surface::Ecal => Some(self.z_face_ecal),
            Surface::Hcal => Some(self.z_face_hcal),
            Surface::Ho => None,
        }
    }
}
