//! Analytic helix/cylinder intersection.
//!
//! In a uniform field `Bz` a particle of unit charge and transverse momentum
//! `pt` moves on a helix of transverse radius
//!
//! ```text
//! bendr = pt[GeV] * 1000 / (300 * Bz[T])      (metres)
//! ```
//!
//! Starting at the beam line with azimuth `φ`, after turning by `t` radians
//! it sits at
//!
//! ```text
//! x = bendr (sin(t + φ) − sin φ)
//! y = bendr (−cos(t + φ) + cos φ)
//! z = bendr t pz / pt + vz
//! ```
//!
//! which is at distance `R` from the beam line when
//! `t = acos(1 − R² / (2 bendr²))`, provided `R < 2 bendr`. If the barrel
//! crossing lies beyond the endcap face, the turn needed to reach the face is
//! used instead.
//!
//! The formulas describe a right-handed helix (a negative muon). Positive
//! muons get their surface azimuths reflected through the muon direction,
//! see [`reflect_about`].
//!
//! # Example
//!
//! ```rust
//! use muonmet_projection::TrajectoryProjector;
//! use muonmet_types::Momentum3;
//!
//! let projector = TrajectoryProjector::default();
//! let mu = Momentum3::from_pt_eta_phi(50.0, 0.0, 0.0);
//! let hits = projector.project(mu, -1, 0.0, 3.8);
//!
//! let ecal = hits.ecal.unwrap();
//! assert!((ecal.perp() - 1.290).abs() < 1e-9);
//! assert!(ecal.phi() > 0.0); // a negative muon bends counter-clockwise
//! ```

use muonmet_types::{Momentum3, Point3};
use tracing::debug;

use crate::angles::reflect_about;
use crate::geometry::{CaloGeometry, Surface};

// ────────────────────────────────────────────────────────────────────────────
// CaloProjection
// ────────────────────────────────────────────────────────────────────────────

/// Crossing points with the three calorimeter surfaces (metres).
///
/// `None` marks a surface the helix never reaches.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CaloProjection {
    pub ecal: Option<Point3>,
    pub hcal: Option<Point3>,
    pub ho: Option<Point3>,
}

impl CaloProjection {
    /// A projection in which no surface is reached.
    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn get(&self, surface: Surface) -> Option<Point3> {
        match surface {
            Surface::Ecal => self.ecal,
            Surface::Hcal => self.hcal,
            Surface::Ho => self.ho,
        }
    }

    fn slot(&mut self, surface: Surface) -> &mut Option<Point3> {
        match surface {
            Surface::Ecal => &mut self.ecal,
            Surface::Hcal => &mut self.hcal,
            Surface::Ho => &mut self.ho,
        }
    }
}

/// Transverse bending radius in metres, or `None` when the helix is
/// degenerate (no transverse momentum, no usable field).
pub fn bending_radius(pt: f64, bz: f64) -> Option<f64> {
    if pt.is_nan() || bz.is_nan() || pt <= 0.0 || bz <= 0.0 {
        return None;
    }
    let bendr = pt * 1000.0 / (300.0 * bz);
    bendr.is_finite().then_some(bendr)
}

// ────────────────────────────────────────────────────────────────────────────
// Helix
// ────────────────────────────────────────────────────────────────────────────

struct Helix {
    bendr: f64,
    phi0: f64,
    pt: f64,
    pz: f64,
    vz: f64,
}

impl Helix {
    fn point_at(&self, turn: f64) -> Point3 {
        Point3::new(
            self.bendr * ((turn + self.phi0).sin() - self.phi0.sin()),
            self.bendr * (-(turn + self.phi0).cos() + self.phi0.cos()),
            self.bendr * turn * self.pz / self.pt + self.vz,
        )
    }

    /// Turn angle at which the helix is `radius` away from the beam line.
    fn barrel_turn(&self, radius: f64) -> Option<f64> {
        if radius >= 2.0 * self.bendr {
            return None;
        }
        Some((1.0 - radius * radius / (2.0 * self.bendr * self.bendr)).acos())
    }

    /// Turn angle at which the helix reaches the endcap face on the side it
    /// is heading to, with `z` pinned to the face.
    fn endcap_point(&self, z_face: f64) -> Option<Point3> {
        let (turn, z) = if self.pz > 0.0 {
            ((z_face - self.vz) * self.pt / (self.bendr * self.pz), z_face)
        } else if self.pz < 0.0 {
            (-(z_face + self.vz) * self.pt / (self.bendr * self.pz), -z_face)
        } else {
            return None;
        };
        if !turn.is_finite() || turn < 0.0 {
            return None;
        }
        let mut point = self.point_at(turn);
        point.z = z;
        Some(point)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// TrajectoryProjector
// ────────────────────────────────────────────────────────────────────────────

/// Projects muon helices onto a [`CaloGeometry`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TrajectoryProjector {
    geometry: CaloGeometry,
}

impl TrajectoryProjector {
    pub fn new(geometry: CaloGeometry) -> Self {
        Self { geometry }
    }

    pub fn geometry(&self) -> &CaloGeometry {
        &self.geometry
    }

    /// Crossing points of a muon with `momentum` and `charge`, produced at
    /// `vertex_z` metres along the beam line, in a field of `bz` tesla.
    pub fn project(&self, momentum: Momentum3, charge: i32, vertex_z: f64, bz: f64) -> CaloProjection {
        let pt = momentum.pt();
        let Some(bendr) = bending_radius(pt, bz) else {
            debug!(pt, bz, "degenerate helix; no calorimeter surface reachable");
            return CaloProjection::unreachable();
        };

        let helix = Helix {
            bendr,
            phi0: momentum.phi(),
            pt,
            pz: momentum.pz,
            vz: vertex_z,
        };
        let eta = momentum.eta();

        let mut projection = CaloProjection::default();
        for surface in Surface::ALL {
            let point = self.intersect(&helix, surface, eta);
            if point.is_none() {
                debug!(%surface, bendr, eta, "helix does not reach surface");
            }
            *projection.slot(surface) = point;
        }

        if charge > 0 {
            for surface in Surface::ALL {
                let slot = projection.slot(surface);
                *slot = slot.map(|p| reflect_point(p, helix.phi0));
            }
        }
        projection
    }

    fn intersect(&self, helix: &Helix, surface: Surface, eta: f64) -> Option<Point3> {
        let radius = self.geometry.radius(surface, eta);
        let barrel = helix.barrel_turn(radius).map(|t| helix.point_at(t));

        match self.geometry.z_face(surface) {
            None => barrel,
            Some(z_face) => match barrel {
                Some(p) if p.z.abs() < z_face => Some(p),
                _ => helix.endcap_point(z_face),
            },
        }
    }
}

/// Move `point` to the reflected azimuth at the same transverse radius.
fn reflect_point(point: Point3, muon_phi: f64) -> Point3 {
    let phi = reflect_about(muon_phi, point.phi());
    let r2d = point.perp();
    Point3::new(r2d * phi.cos(), r2d * phi.sin(), point.z)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angles::delta_phi;
    use std::f64::consts::{FRAC_PI_2, PI};

    const BZ: f64 = 3.8;

    fn project(pt: f64, eta: f64, phi: f64, charge: i32) -> CaloProjection {
        TrajectoryProjector::default().project(
            Momentum3::from_pt_eta_phi(pt, eta, phi),
            charge,
            0.0,
            BZ,
        )
    }

    #[test]
    fn bending_radius_for_fifty_gev() {
        let r = bending_radius(50.0, BZ).unwrap();
        assert!((r - 50_000.0 / 1140.0).abs() < 1e-9);
    }

    #[test]
    fn bending_radius_rejects_degenerate_inputs() {
        assert!(bending_radius(0.0, BZ).is_none());
        assert!(bending_radius(-1.0, BZ).is_none());
        assert!(bending_radius(10.0, 0.0).is_none());
        assert!(bending_radius(f64::NAN, BZ).is_none());
    }

    #[test]
    fn zero_pt_reaches_nothing() {
        let p = TrajectoryProjector::default().project(Momentum3::new(0.0, 0.0, 5.0), -1, 0.0, BZ);
        assert_eq!(p, CaloProjection::unreachable());
    }

    #[test]
    fn central_muon_hits_barrel_radii() {
        let p = project(50.0, 0.0, 0.0, -1);
        let ecal = p.ecal.unwrap();
        let hcal = p.hcal.unwrap();
        let ho = p.ho.unwrap();
        assert!((ecal.perp() - 1.290).abs() < 1e-9);
        assert!((hcal.perp() - 1.9).abs() < 1e-9);
        assert!((ho.perp() - 3.82).abs() < 1e-9);
        for point in [ecal, hcal, ho] {
            assert!((point.theta() - FRAC_PI_2).abs() < 1e-12);
        }
    }

    #[test]
    fn negative_muon_azimuth_is_half_the_turn() {
        let p = project(50.0, 0.0, 0.0, -1);
        let bendr = bending_radius(50.0, BZ).unwrap();
        let turn = (1.0 - 1.290f64.powi(2) / (2.0 * bendr * bendr)).acos();
        assert!((p.ecal.unwrap().phi() - turn / 2.0).abs() < 1e-9);
    }

    #[test]
    fn outer_surfaces_bend_further() {
        let p = project(10.0, 0.0, 0.5, -1);
        let ecal = p.ecal.unwrap().phi();
        let hcal = p.hcal.unwrap().phi();
        let ho = p.ho.unwrap().phi();
        assert!(0.5 < ecal && ecal < hcal && hcal < ho);
    }

    #[test]
    fn charge_conjugates_mirror_through_muon_phi() {
        for &phi in &[0.0, 1.0, -2.0, PI - 0.01, -PI + 0.01] {
            let minus = project(8.0, 0.4, phi, -1);
            let plus = project(8.0, 0.4, phi, 1);
            for surface in Surface::ALL {
                let m = minus.get(surface).unwrap();
                let p = plus.get(surface).unwrap();
                let dm = delta_phi(m.phi(), phi);
                let dp = delta_phi(p.phi(), phi);
                assert!((dm + dp).abs() < 1e-9, "{surface} at phi={phi}: {dm} vs {dp}");
                assert!((m.theta() - p.theta()).abs() < 1e-12);
                assert!((m.perp() - p.perp()).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn forward_muon_lands_on_endcap_face() {
        let p = project(20.0, 2.5, 0.3, -1);
        let ecal = p.ecal.unwrap();
        let hcal = p.hcal.unwrap();
        assert_eq!(ecal.z, 3.209);
        assert_eq!(hcal.z, 3.88);
        assert!(ecal.perp() < 1.290);
        assert!(hcal.perp() < 1.9);
    }

    #[test]
    fn backward_muon_lands_on_negative_face() {
        let p = project(20.0, -2.5, 0.3, 1);
        assert_eq!(p.ecal.unwrap().z, -3.209);
        assert_eq!(p.hcal.unwrap().z, -3.88);
        assert!(p.ecal.unwrap().theta() > FRAC_PI_2);
    }

    #[test]
    fn ho_stays_on_barrel_even_for_forward_muons() {
        let p = project(20.0, 2.5, 0.3, -1);
        let ho = p.ho.unwrap();
        assert!((ho.perp() - 4.07).abs() < 1e-9);
        assert!(ho.z > 3.88);
    }

    #[test]
    fn vertex_shifts_barrel_z() {
        let projector = TrajectoryProjector::default();
        let mu = Momentum3::from_pt_eta_phi(50.0, 0.0, 0.0);
        let p = projector.project(mu, -1, 0.2, BZ);
        assert!((p.ecal.unwrap().z - 0.2).abs() < 1e-12);
    }

    #[test]
    fn central_looper_reaches_nothing() {
        // bendr ≈ 0.44 m: the helix never gets 1.29 m from the beam line
        // and, with no longitudinal momentum, never reaches an endcap.
        let p = project(0.5, 0.0, 0.0, -1);
        assert_eq!(p, CaloProjection::unreachable());
    }

    #[test]
    fn forward_looper_still_reaches_endcaps() {
        let p = project(0.5, 2.0, 0.0, 1);
        assert_eq!(p.ecal.unwrap().z, 3.209);
        assert_eq!(p.hcal.unwrap().z, 3.88);
        assert!(p.ho.is_none());
    }

    #[test]
    fn vertex_beyond_face_is_unreachable() {
        // Produced past the ECAL face and moving away from it.
        let projector = TrajectoryProjector::default();
        let mu = Momentum3::from_pt_eta_phi(0.5, 1.0, 0.0);
        let p = projector.project(mu, -1, 3.5, BZ);
        assert!(p.ecal.is_none());
        assert!(p.hcal.is_some());
    }
}
