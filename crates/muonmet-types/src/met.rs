//! Missing transverse energy objects and their correction history.
//!
//! A MET object never changes once built. Applying a correction produces a
//! new object of the same kind whose history is the old history plus one
//! [`CorrectionRecord`]; earlier records are copied untouched.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::kinematics::{FourMomentum, Point3};

/// The net change applied by one correction step (GeV).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CorrectionRecord {
    pub mex: f64,
    pub mey: f64,
    pub sumet: f64,
}

// ────────────────────────────────────────────────────────────────────────────
// Met
// ────────────────────────────────────────────────────────────────────────────

/// A plain MET object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Met {
    /// Scalar transverse energy sum.
    pub sum_et: f64,
    /// Corrections applied so far, oldest first.
    #[serde(default)]
    pub corrections: Vec<CorrectionRecord>,
    /// MET four-vector `(mex, mey, 0, |met|)`.
    pub p4: FourMomentum,
    #[serde(default)]
    pub vertex: Point3,
}

impl Met {
    pub fn new(sum_et: f64, mex: f64, mey: f64) -> Self {
        Self {
            sum_et,
            corrections: Vec::new(),
            p4: FourMomentum::new(mex, mey, 0.0, mex.hypot(mey)),
            vertex: Point3::default(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// CaloMet
// ────────────────────────────────────────────────────────────────────────────

/// Calorimeter-level breakdown carried by [`CaloMet`]. The muon correction
/// does not touch it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SpecificCaloMetData {
    pub max_et_in_em_towers: f64,
    pub max_et_in_had_towers: f64,
    pub et_fraction_hadronic: f64,
    pub em_et_fraction: f64,
    pub had_et_in_hb: f64,
    pub had_et_in_ho: f64,
    pub had_et_in_he: f64,
    pub had_et_in_hf: f64,
    pub em_et_in_eb: f64,
    pub em_et_in_ee: f64,
    pub em_et_in_hf: f64,
    pub met_significance: f64,
}

/// A MET object built from calorimeter towers, with its detailed breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CaloMet {
    #[serde(flatten)]
    pub met: Met,
    #[serde(default)]
    pub specific: SpecificCaloMetData,
}

// ────────────────────────────────────────────────────────────────────────────
// MetLike
// ────────────────────────────────────────────────────────────────────────────

/// Behaviour shared by every MET kind the corrector can produce.
///
/// Implementors only say where their [`Met`] core lives and how to rebuild
/// themselves around a new one; the append logic lives in
/// [`MetLike::with_correction`].
pub trait MetLike: Clone {
    fn core(&self) -> &Met;

    /// A copy of `self` with the core replaced and everything else kept.
    fn rebuild(&self, core: Met) -> Self;

    fn px(&self) -> f64 {
        self.core().p4.px
    }

    fn py(&self) -> f64 {
        self.core().p4.py
    }

    fn pt(&self) -> f64 {
        self.core().p4.pt()
    }

    fn sum_et(&self) -> f64 {
        self.core().sum_et
    }

    fn corrections(&self) -> &[CorrectionRecord] {
        &self.core().corrections
    }

    /// Build the corrected object: `sum_et` shifted by `delta.sumet`, the
    /// four-vector replaced by `p4`, `delta` appended to the history and the
    /// vertex carried over.
    fn with_correction(&self, delta: CorrectionRecord, p4: FourMomentum) -> Self {
        let old = self.core();
        let mut corrections = Vec::with_capacity(old.corrections.len() + 1);
        corrections.extend_from_slice(&old.corrections);
        corrections.push(delta);
        self.rebuild(Met {
            sum_et: old.sum_et + delta.sumet,
            corrections,
            p4,
            vertex: old.vertex,
        })
    }
}

impl MetLike for Met {
    fn core(&self) -> &Met {
        self
    }

    fn rebuild(&self, core: Met) -> Self {
        core
    }
}

impl MetLike for CaloMet {
    fn core(&self) -> &Met {
        &self.met
    }

    fn rebuild(&self, core: Met) -> Self {
        Self {
            met: core,
            specific: self.specific,
        }
    }
}

/// Either MET kind, tagged by `"kind"` in the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnyMet {
    Met(Met),
    Calo(CaloMet),
}

impl MetLike for AnyMet {
    fn core(&self) -> &Met {
        match self {
            AnyMet::Met(m) => m.core(),
            AnyMet::Calo(m) => m.core(),
        }
    }

    fn rebuild(&self, core: Met) -> Self {
        match self {
            AnyMet::Met(m) => AnyMet::Met(m.rebuild(core)),
            AnyMet::Calo(m) => AnyMet::Calo(m.rebuild(core)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(mex: f64) -> CorrectionRecord {
        CorrectionRecord {
            mex,
            mey: -mex,
            sumet: 2.0,
        }
    }

    #[test]
    fn history_is_append_only() {
        let mut met = Met::new(100.0, 10.0, 0.0);
        let mut previous: Vec<CorrectionRecord> = Vec::new();

        for i in 0..4 {
            let next = met.with_correction(delta(i as f64), FourMomentum::default());
            assert_eq!(next.corrections().len(), previous.len() + 1);
            assert_eq!(&next.corrections()[..previous.len()], previous.as_slice());
            assert_eq!(next.corrections().last(), Some(&delta(i as f64)));
            previous = next.corrections().to_vec();
            met = next;
        }
        assert_eq!(met.corrections().len(), 4);
    }

    #[test]
    fn with_correction_shifts_sum_et_and_keeps_vertex() {
        let mut met = Met::new(100.0, 10.0, 0.0);
        met.vertex = Point3::new(0.1, 0.2, 0.3);
        let p4 = FourMomentum::new(-40.0, 0.0, 0.0, 40.0);

        let corrected = met.with_correction(delta(-50.0), p4);
        assert!((corrected.sum_et() - 102.0).abs() < 1e-12);
        assert_eq!(corrected.core().p4, p4);
        assert_eq!(corrected.core().vertex, met.vertex);
        // The input object is untouched.
        assert!(met.corrections().is_empty());
    }

    #[test]
    fn calo_met_keeps_specific_data() {
        let calo = CaloMet {
            met: Met::new(50.0, 1.0, 2.0),
            specific: SpecificCaloMetData {
                max_et_in_em_towers: 7.5,
                had_et_in_hb: 12.0,
                ..Default::default()
            },
        };
        let corrected = calo.with_correction(delta(1.0), FourMomentum::default());
        assert_eq!(corrected.specific, calo.specific);
        assert_eq!(corrected.corrections().len(), 1);
    }

    #[test]
    fn any_met_preserves_kind() {
        let any = AnyMet::Calo(CaloMet::default());
        let corrected = any.with_correction(delta(0.0), FourMomentum::default());
        assert!(matches!(corrected, AnyMet::Calo(_)));

        let any = AnyMet::Met(Met::default());
        let corrected = any.with_correction(delta(0.0), FourMomentum::default());
        assert!(matches!(corrected, AnyMet::Met(_)));
    }

    #[test]
    fn any_met_json_is_tagged() {
        let any = AnyMet::Calo(CaloMet {
            met: Met::new(80.0, 3.0, 4.0),
            specific: SpecificCaloMetData::default(),
        });
        let json = serde_json::to_value(&any).unwrap();
        assert_eq!(json["kind"], "calo");
        assert_eq!(json["sum_et"], 80.0);

        let back: AnyMet = serde_json::from_value(json).unwrap();
        assert_eq!(back, any);
    }
}
