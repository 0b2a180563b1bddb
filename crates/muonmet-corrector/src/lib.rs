//! `muonmet-corrector` – muon correction of missing transverse energy.
//!
//! # Modules
//!
//! - [`corrector`] – [`MuonMetCorrector`][corrector::MuonMetCorrector]:
//!   walks the muons of an event, removes their momentum from the MET and
//!   adds back their calorimeter deposit, then appends one
//!   [`CorrectionRecord`][muonmet_types::CorrectionRecord] to the MET history.
//! - [`energy_loss`] – [`expected_deposit`][energy_loss::expected_deposit]:
//!   the average deposit model used for non-isolated muons.
//! - [`services`] – [`MagneticField`][services::MagneticField] and
//!   [`TrackAssociator`][services::TrackAssociator]: the injected external
//!   collaborators, with fixed-answer implementations.
//! - [`config`] – [`CorrectorConfig`][config::CorrectorConfig]: deposit
//!   source selection and legacy compatibility switches.
//!
//! The helix projection itself lives in `muonmet-projection`.

pub mod config;
pub mod corrector;
pub mod energy_loss;
pub mod services;

pub use config::CorrectorConfig;
pub use corrector::{MuonCorrectionContext, MuonMetCorrector, RunningMetState};
pub use services::{
    CaloMatch, MagneticField, NoField, RecordedAssociation, TrackAssociator, UniformField,
};
