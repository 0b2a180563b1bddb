//! `muonmet-types` – shared data model for the muon MET correction.
//!
//! # Modules
//!
//! - [`kinematics`] – [`Point3`][kinematics::Point3],
//!   [`Momentum3`][kinematics::Momentum3] and
//!   [`FourMomentum`][kinematics::FourMomentum]: the vector types every other
//!   crate speaks, with collider-style accessors (pt, eta, phi, Et).
//! - [`muon`] – [`MuonRecord`][muon::MuonRecord] and its parts (isolation,
//!   cluster energies, crossed calorimeter towers).
//! - [`met`] – [`Met`][met::Met], [`CaloMet`][met::CaloMet] and the
//!   [`MetLike`][met::MetLike] trait that lets both kinds share the
//!   correction-append logic.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod kinematics;
pub mod met;
pub mod muon;

pub use kinematics::{FourMomentum, Momentum3, Point3};
pub use met::{AnyMet, CaloMet, CorrectionRecord, Met, MetLike, SpecificCaloMetData};
pub use muon::{CaloEnergy, CaloPositions, CaloTower, IsolationR03, MuonRecord};

/// Errors that abort the correction of a single event.
///
/// Unreachable calorimeter surfaces are deliberately absent: a low-momentum
/// muon that curls up before a surface is physics, not a failure, and the
/// corrector treats it as a zero contribution.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetError {
    #[error("Magnetic field record unavailable")]
    MissingFieldRecord,

    #[error("Invalid track on muon #{index}: {reason}")]
    InvalidMuonTrack { index: usize, reason: String },

    #[error("Track association failed for muon #{index}: {reason}")]
    Association { index: usize, reason: String },

    #[error("Uncorrected MET collection is empty")]
    EmptyInputCollection,
}
