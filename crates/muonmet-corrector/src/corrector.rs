//! [`MuonMetCorrector`] – per-event muon correction of calorimeter MET.
//!
//! Calorimeter MET sees a muon only through the little energy it leaves in
//! the calorimeters. The corrector removes the muon's full transverse
//! momentum from the MET and adds back the energy the calorimeters did see,
//! either as measured around the track (isolated muons) or from an average
//! energy-loss model (muons in busy surroundings, where the measurement is
//! polluted by neighbours).
//!
//! Muons are processed strictly in input order; the scalar sums are
//! order-sensitive in floating point.
//!
//! # Example
//!
//! ```rust
//! use muonmet_corrector::{CorrectorConfig, MuonMetCorrector, RecordedAssociation, UniformField};
//! use muonmet_types::{FourMomentum, Met, MetLike, Momentum3, MuonRecord};
//!
//! let track = Momentum3::from_pt_eta_phi(50.0, 0.0, 0.0);
//! let muon = MuonRecord {
//!     charge: -1,
//!     p4: FourMomentum::massless(track),
//!     inner_track: Some(track),
//!     combined_track: Some(track),
//!     ..Default::default()
//! };
//!
//! let corrector = MuonMetCorrector::new(
//!     CorrectorConfig::default(),
//!     Box::new(UniformField(3.8)),
//!     Box::new(RecordedAssociation),
//! );
//! let corrected = corrector.correct(&[Met::new(100.0, 10.0, 0.0)], &[muon]).unwrap();
//! assert_eq!(corrected.px(), -40.0);
//! assert_eq!(corrected.corrections().len(), 1);
//! ```

use muonmet_projection::{CaloProjection, Surface, TrajectoryProjector};
use muonmet_types::{
    CaloPositions, CorrectionRecord, FourMomentum, IsolationR03, MetError, MetLike, Momentum3,
    MuonRecord,
};
use tracing::{debug, info, instrument, warn};

use crate::config::CorrectorConfig;
use crate::energy_loss::expected_deposit;
use crate::services::{MagneticField, TrackAssociator};

/// Above this combined-track pt (GeV) the combined fit is used for the
/// projection; below it the tracker alone has the better resolution.
pub const TRACKER_PT_LIMIT: f64 = 200.0;

/// Isolation track-pt sum (GeV) above which a muon is corrected on average.
pub const ISOLATION_SUM_PT_CUT: f64 = 3.0;

/// Isolation calorimeter Et sum (GeV) above which a muon is corrected on
/// average.
pub const ISOLATION_CALO_ET_CUT: f64 = 5.0;

/// Below this |eta| the average deposit is spread over ECAL, HCAL and HO;
/// above it over ECAL and HCAL only.
pub const BARREL_ETA_LIMIT: f64 = 1.3;

// ────────────────────────────────────────────────────────────────────────────
// Per-event and per-muon state
// ────────────────────────────────────────────────────────────────────────────

/// Running MET of one event while its muons are being corrected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningMetState {
    pub met_x: f64,
    pub met_y: f64,
    /// Σ Et of the corrected muons.
    pub sum_mu_et: f64,
    /// Σ of the transverse energy each muon had left in the calorimeters.
    pub sum_mu_dep_et: f64,
    uncorrected_x: f64,
    uncorrected_y: f64,
}

impl RunningMetState {
    pub fn new(met_x: f64, met_y: f64) -> Self {
        Self {
            met_x,
            met_y,
            sum_mu_et: 0.0,
            sum_mu_dep_et: 0.0,
            uncorrected_x: met_x,
            uncorrected_y: met_y,
        }
    }

    /// Net change relative to the uncorrected MET.
    pub fn delta(&self) -> CorrectionRecord {
        CorrectionRecord {
            mex: self.met_x - self.uncorrected_x,
            mey: self.met_y - self.uncorrected_y,
            sumet: self.sum_mu_et - self.sum_mu_dep_et,
        }
    }

    /// Corrected MET four-vector `(mex, mey, 0, |met|)`.
    pub fn corrected_p4(&self) -> FourMomentum {
        let met = (self.met_x * self.met_x + self.met_y * self.met_y).sqrt();
        FourMomentum::new(self.met_x, self.met_y, 0.0, met)
    }
}

/// How one muon is to be corrected.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MuonCorrectionContext {
    /// Correct with the average energy-loss model rather than the measured
    /// deposit. Set for muons that are *not* isolated.
    pub use_average: bool,
    pub use_track_associator_positions: bool,
    pub use_ho: bool,
    /// Surface positions supplied by the track associator.
    pub positions: Option<CaloPositions>,
    pub ecal_e: f64,
    pub hcal_e: f64,
    pub ho_e: f64,
}

/// `true` when the isolation sums say the muon's neighbourhood is too busy
/// to trust its measured deposit.
///
/// An invalid isolation reads as all zeros, so such muons always come out
/// isolated.
pub fn is_non_isolated(isolation: &IsolationR03) -> bool {
    isolation.sum_pt > ISOLATION_SUM_PT_CUT
        || isolation.em_et + isolation.had_et > ISOLATION_CALO_ET_CUT
}

// ────────────────────────────────────────────────────────────────────────────
// MuonMetCorrector
// ────────────────────────────────────────────────────────────────────────────

/// Applies the muon correction to MET objects of any [`MetLike`] kind.
pub struct MuonMetCorrector {
    config: CorrectorConfig,
    projector: TrajectoryProjector,
    field: Box<dyn MagneticField>,
    associator: Box<dyn TrackAssociator>,
}

impl MuonMetCorrector {
    pub fn new(
        config: CorrectorConfig,
        field: Box<dyn MagneticField>,
        associator: Box<dyn TrackAssociator>,
    ) -> Self {
        Self {
            config,
            projector: TrajectoryProjector::default(),
            field,
            associator,
        }
    }

    /// Replace the default calorimeter geometry.
    pub fn with_projector(mut self, projector: TrajectoryProjector) -> Self {
        self.projector = projector;
        self
    }

    pub fn config(&self) -> &CorrectorConfig {
        &self.config
    }

    /// Correct the first MET object of `uncorrected` for `muons`.
    ///
    /// Returns a new object of the same kind with one more entry in its
    /// correction history. Any error aborts the whole event; nothing
    /// partially corrected is returned.
    #[instrument(skip_all, fields(muons = muons.len()))]
    pub fn correct<T: MetLike>(&self, uncorrected: &[T], muons: &[MuonRecord]) -> Result<T, MetError> {
        let bz = self.field.bz_at_origin()?;
        let uncorrected = uncorrected.first().ok_or(MetError::EmptyInputCollection)?;

        let mut state = RunningMetState::new(uncorrected.px(), uncorrected.py());
        for (index, muon) in muons.iter().enumerate() {
            self.correct_muon(&mut state, index, muon, bz)?;
        }

        let delta = state.delta();
        info!(
            mex = delta.mex,
            mey = delta.mey,
            sumet = delta.sumet,
            "muon MET correction applied"
        );
        Ok(uncorrected.with_correction(delta, state.corrected_p4()))
    }

    /// Correct `state` for muon number `index` and update the scalar sums.
    pub fn correct_muon(
        &self,
        state: &mut RunningMetState,
        index: usize,
        muon: &MuonRecord,
        bz: f64,
    ) -> Result<(), MetError> {
        let context = self.build_context(index, muon)?;
        let momentum = projection_momentum(index, muon)?;

        state.sum_mu_et += muon.et();
        let (x_before, y_before) = (state.met_x, state.met_y);

        self.correct_for_muon(state, muon, momentum, bz, &context);

        let dep_x = state.met_x - x_before + muon.px();
        let dep_y = state.met_y - y_before + muon.py();
        state.sum_mu_dep_et += (dep_x * dep_x + dep_y * dep_y).sqrt();
        Ok(())
    }

    /// Decide the correction mode for a muon and gather its deposits.
    pub fn build_context(&self, index: usize, muon: &MuonRecord) -> Result<MuonCorrectionContext, MetError> {
        if !muon.is_isolation_valid() {
            debug!(index, "isolation not computed; treating muon as isolated");
        }
        let use_average = muon.is_isolation_valid() && is_non_isolated(&muon.isolation_or_zero());
        let matched = self.associator.associate(index, muon)?;

        let mut context = MuonCorrectionContext {
            use_average,
            use_track_associator_positions: self.config.use_track_associator_positions,
            use_ho: self.config.use_ho,
            ..Default::default()
        };

        if self.config.use_track_associator_positions {
            context.positions = Some(matched.positions.ok_or_else(|| MetError::Association {
                index,
                reason: "associator returned no calorimeter positions".to_string(),
            })?);
        }

        if use_average {
            return Ok(context);
        }

        if self.config.use_rec_hits {
            context.ecal_e = muon.calo_energy.em_s9;
            context.hcal_e = muon.calo_energy.had_s9;
            if self.config.use_ho {
                context.ho_e = muon.calo_energy.ho_s9;
            }
        } else {
            for tower in matched
                .crossed_towers
                .iter()
                .filter(|t| t.et >= self.config.tower_et_threshold)
            {
                if self.config.legacy_accumulation_bug {
                    context.ecal_e = tower.em_et;
                    context.hcal_e = tower.had_et;
                    if self.config.use_ho {
                        context.ho_e = tower.outer_et;
                    }
                } else {
                    context.ecal_e += tower.em_et;
                    context.hcal_e += tower.had_et;
                    if self.config.use_ho {
                        context.ho_e += tower.outer_et;
                    }
                }
            }
        }
        Ok(context)
    }

    /// Subtract the muon's transverse momentum from the running MET and add
    /// back its calorimeter deposit.
    ///
    /// `momentum` is the track momentum chosen for the projection.
    pub fn correct_for_muon(
        &self,
        state: &mut RunningMetState,
        muon: &MuonRecord,
        momentum: Momentum3,
        bz: f64,
        context: &MuonCorrectionContext,
    ) {
        let pt = momentum.pt();
        let phi = momentum.phi();
        state.met_x -= pt * phi.cos();
        state.met_y -= pt * phi.sin();

        let surfaces = match context.positions {
            Some(p) if context.use_track_associator_positions => CaloProjection {
                ecal: Some(p.ecal),
                hcal: Some(p.hcal),
                ho: Some(p.ho),
            },
            _ => self
                .projector
                .project(momentum, muon.charge, muon.vertex.z / 100.0, bz),
        };

        if context.use_average {
            self.add_average_deposit(state, momentum, &surfaces, context);
        } else {
            add_measured_deposit(state, &surfaces, context);
        }
    }

    fn add_average_deposit(
        &self,
        state: &mut RunningMetState,
        momentum: Momentum3,
        surfaces: &CaloProjection,
        context: &MuonCorrectionContext,
    ) {
        let eta = momentum.eta();
        let dep = expected_deposit(momentum.p(), eta, context.use_ho);
        let barrel = eta.abs() < BARREL_ETA_LIMIT;

        let crossed: &[Surface] = if barrel {
            &Surface::ALL
        } else {
            &[Surface::Ecal, Surface::Hcal]
        };
        let phis: Vec<f64> = crossed
            .iter()
            .filter_map(|&s| surfaces.get(s))
            .map(|p| p.phi())
            .collect();
        let mean_phi = if phis.is_empty() {
            warn!(eta, "no calorimeter surface reached; spreading average deposit along the track");
            momentum.phi()
        } else if self.config.legacy_arithmetic_phi_mean {
            phis.iter().sum::<f64>() / phis.len() as f64
        } else {
            circular_mean(&phis)
        };

        debug!(dep, mean_phi, barrel, "average deposit");
        state.met_x += dep * mean_phi.cos();
        if !barrel && self.config.legacy_endcap_phi_bug {
            state.met_y += dep * mean_phi.cos();
        } else {
            state.met_y += dep * mean_phi.sin();
        }
    }
}

/// Mean direction of a set of azimuths, continuous across ±π.
fn circular_mean(phis: &[f64]) -> f64 {
    let (sin_sum, cos_sum) = phis
        .iter()
        .fold((0.0, 0.0), |(s, c), phi| (s + phi.sin(), c + phi.cos()));
    sin_sum.atan2(cos_sum)
}

/// Add each measured deposit along the direction of its surface crossing.
/// Deposits on a surface the track never reaches are dropped.
fn add_measured_deposit(
    state: &mut RunningMetState,
    surfaces: &CaloProjection,
    context: &MuonCorrectionContext,
) {
    let deposits = [
        (Surface::Ecal, context.ecal_e),
        (Surface::Hcal, context.hcal_e),
        (Surface::Ho, context.ho_e),
    ];

    let (mut ex, mut ey) = (0.0, 0.0);
    for (surface, energy) in deposits {
        match surfaces.get(surface) {
            Some(point) => {
                let et = energy * point.theta().sin();
                ex += et * point.phi().cos();
                ey += et * point.phi().sin();
            }
            None if energy != 0.0 => {
                warn!(%surface, energy, "deposit on unreachable surface ignored");
            }
            None => {}
        }
    }

    debug!(ex, ey, "measured deposit");
    state.met_x += ex;
    state.met_y += ey;
}

/// The momentum used to project the muon: tracker-only below
/// [`TRACKER_PT_LIMIT`], the combined fit above.
pub fn projection_momentum(index: usize, muon: &MuonRecord) -> Result<Momentum3, MetError> {
    let invalid = |reason: &str| MetError::InvalidMuonTrack {
        index,
        reason: reason.to_string(),
    };

    let combined = muon.combined_track.ok_or_else(|| invalid("no combined track"))?;
    if !combined.is_finite() {
        return Err(invalid("combined track momentum is not finite"));
    }
    if combined.pt() >= TRACKER_PT_LIMIT {
        return Ok(combined);
    }

    let inner = muon.inner_track.ok_or_else(|| invalid("no inner track"))?;
    if !inner.is_finite() {
        return Err(invalid("inner track momentum is not finite"));
    }
    Ok(inner)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
