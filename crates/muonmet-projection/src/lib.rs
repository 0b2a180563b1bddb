//! `muonmet-projection` – where a muon meets the calorimeters.
//!
//! Propagates a muon analytically along its helix in a uniform solenoidal
//! field and returns the points where it crosses the ECAL, HCAL and HO
//! surfaces.
//!
//! # Modules
//!
//! - [`angles`] – azimuth helpers: wrapping into `[-π, π]`, signed
//!   differences, and the reflection used for positively charged muons.
//! - [`geometry`] – [`CaloGeometry`][geometry::CaloGeometry]: surface radii
//!   and endcap face positions.
//! - [`projector`] – [`TrajectoryProjector`][projector::TrajectoryProjector]:
//!   the helix/cylinder intersection itself, producing a
//!   [`CaloProjection`][projector::CaloProjection].

pub mod angles;
pub mod geometry;
pub mod projector;

pub use geometry::{CaloGeometry, Surface};
pub use projector::{bending_radius, CaloProjection, TrajectoryProjector};
