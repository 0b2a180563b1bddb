//! External services the corrector depends on but does not own.
//!
//! Both are injected into [`MuonMetCorrector`][crate::MuonMetCorrector] as
//! trait objects so tests (and batch jobs replaying dumped events) can supply
//! fixed answers.

use muonmet_types::{CaloPositions, CaloTower, MetError, MuonRecord};

// ────────────────────────────────────────────────────────────────────────────
// Magnetic field
// ────────────────────────────────────────────────────────────────────────────

/// Source of the solenoid field strength.
pub trait MagneticField: Send + Sync {
    /// Longitudinal field at the detector centre, in tesla.
    fn bz_at_origin(&self) -> Result<f64, MetError>;
}

/// A field of fixed strength.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformField(pub f64);

impl MagneticField for UniformField {
    fn bz_at_origin(&self) -> Result<f64, MetError> {
        Ok(self.0)
    }
}

/// A field record that was never loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoField;

impl MagneticField for NoField {
    fn bz_at_origin(&self) -> Result<f64, MetError> {
        Err(MetError::MissingFieldRecord)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Track association
// ────────────────────────────────────────────────────────────────────────────

/// What a track associator knows about a muon's path through the
/// calorimeters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaloMatch {
    /// Towers the track crosses, in crossing order.
    pub crossed_towers: Vec<CaloTower>,
    /// Track positions at the calorimeter surfaces, when computed.
    pub positions: Option<CaloPositions>,
}

/// Matches a muon track to calorimeter towers and surface positions.
pub trait TrackAssociator: Send + Sync {
    /// Associate muon number `index` of the event. Failures are fatal for
    /// the event and should be reported as [`MetError::Association`].
    fn associate(&self, index: usize, muon: &MuonRecord) -> Result<CaloMatch, MetError>;
}

/// Replays the association stored with the muon record itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordedAssociation;

impl TrackAssociator for RecordedAssociation {
    fn associate(&self, _index: usize, muon: &MuonRecord) -> Result<CaloMatch, MetError> {
        Ok(CaloMatch {
            crossed_towers: muon.crossed_towers.clone(),
            positions: muon.associator_positions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muonmet_types::Point3;

    #[test]
    fn uniform_field_reports_its_value() {
        assert_eq!(UniformField(3.8).bz_at_origin(), Ok(3.8));
    }

    #[test]
    fn missing_field_is_an_error() {
        assert_eq!(NoField.bz_at_origin(), Err(MetError::MissingFieldRecord));
    }

    #[test]
    fn recorded_association_copies_the_record() {
        let muon = MuonRecord {
            crossed_towers: vec![CaloTower {
                et: 2.0,
                em_et: 1.5,
                ..Default::default()
            }],
            associator_positions: Some(CaloPositions {
                ecal: Point3::new(1.29, 0.0, 0.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let matched = RecordedAssociation.associate(0, &muon).unwrap();
        assert_eq!(matched.crossed_towers, muon.crossed_towers);
        assert_eq!(matched.positions, muon.associator_positions);
    }
}
