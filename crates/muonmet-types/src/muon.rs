//! Reconstructed muon records as handed over by the event reader.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::kinematics::{FourMomentum, Momentum3, Point3};

/// Isolation sums in a cone of ΔR = 0.3 around the muon (GeV).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IsolationR03 {
    /// Scalar sum of track pt in the cone.
    pub sum_pt: f64,
    /// ECAL transverse energy in the cone.
    pub em_et: f64,
    /// HCAL transverse energy in the cone.
    pub had_et: f64,
}

/// Energy in the 3×3 cluster around the extrapolated muon position (GeV).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CaloEnergy {
    pub em_s9: f64,
    pub had_s9: f64,
    pub ho_s9: f64,
}

/// A calorimeter tower crossed by the muon track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CaloTower {
    /// Tower centre (metres).
    pub position: Point3,
    /// Total transverse energy, compared against the tower threshold.
    pub et: f64,
    pub em_et: f64,
    pub had_et: f64,
    /// Outer (HO) transverse energy.
    pub outer_et: f64,
}

/// Track positions at the three calorimeter surfaces, as computed by an
/// external track associator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CaloPositions {
    pub ecal: Point3,
    pub hcal: Point3,
    pub ho: Point3,
}

/// One reconstructed muon.
///
/// Everything except `charge` and `p4` is optional in the serialized form so
/// that event dumps from partial reconstructions still load; the corrector
/// decides which omissions are fatal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MuonRecord {
    /// Electric charge in units of e (±1).
    pub charge: i32,
    /// The muon's own four-momentum.
    pub p4: FourMomentum,
    /// Reference point of the track (centimetres).
    #[serde(default)]
    pub vertex: Point3,
    /// Tracker-only momentum.
    #[serde(default)]
    pub inner_track: Option<Momentum3>,
    /// Tracker + muon-system momentum.
    #[serde(default)]
    pub combined_track: Option<Momentum3>,
    /// `None` when isolation was not computed for this muon.
    #[serde(default)]
    pub isolation: Option<IsolationR03>,
    #[serde(default)]
    pub calo_energy: CaloEnergy,
    #[serde(default)]
    pub crossed_towers: Vec<CaloTower>,
    #[serde(default)]
    pub associator_positions: Option<CaloPositions>,
}

impl MuonRecord {
    pub fn is_isolation_valid(&self) -> bool {
        self.isolation.is_some()
    }

    /// Isolation sums, zeroed when the isolation is invalid.
    pub fn isolation_or_zero(&self) -> IsolationR03 {
        self.isolation.unwrap_or_default()
    }

    pub fn px(&self) -> f64 {
        self.p4.px
    }

    pub fn py(&self) -> f64 {
        self.p4.py
    }

    pub fn et(&self) -> f64 {
        self.p4.et()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_isolation_reads_as_zero() {
        let muon = MuonRecord::default();
        assert!(!muon.is_isolation_valid());
        assert_eq!(muon.isolation_or_zero(), IsolationR03::default());
    }

    #[test]
    fn minimal_json_fills_defaults() {
        let json = r#"{"charge": -1, "p4": {"px": 10.0, "py": 0.0, "pz": 0.0, "e": 10.0}}"#;
        let muon: MuonRecord = serde_json::from_str(json).unwrap();
        assert_eq!(muon.charge, -1);
        assert!(muon.inner_track.is_none());
        assert!(muon.crossed_towers.is_empty());
        assert!((muon.et() - 10.0).abs() < 1e-12);
    }
}
