//! Azimuthal angle helpers.

use std::f64::consts::{PI, TAU};

/// Map `phi` into `[-π, π]`.
pub fn wrap_phi(phi: f64) -> f64 {
    if (-PI..=PI).contains(&phi) {
        return phi;
    }
    (phi + PI).rem_euclid(TAU) - PI
}

/// Signed difference `a - b`, wrapped into `[-π, π]`.
pub fn delta_phi(a: f64, b: f64) -> f64 {
    wrap_phi(a - b)
}

/// Mirror `phi` through the axis `axis`, always landing on the clockwise
/// side of it.
///
/// The helix formulas describe a right-handed helix; a positive muon bends
/// the other way, so its surface azimuth is placed at the same angular
/// distance from the muon direction but on the opposite side. Both inputs
/// must lie in `[-π, π]`; the result does too.
pub fn reflect_about(axis: f64, phi: f64) -> f64 {
    let mut dphi = axis - phi;
    if dphi.abs() > PI {
        dphi = TAU - dphi.abs();
    }
    let reflected = axis - dphi.abs();
    if reflected.abs() > PI {
        let complement = TAU - reflected.abs();
        -complement * reflected.signum()
    } else {
        reflected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_phi_leaves_in_range_values_alone() {
        assert_eq!(wrap_phi(0.5), 0.5);
        assert_eq!(wrap_phi(-PI), -PI);
        assert_eq!(wrap_phi(PI), PI);
    }

    #[test]
    fn wrap_phi_folds_out_of_range_values() {
        assert!((wrap_phi(PI + 0.1) - (-PI + 0.1)).abs() < 1e-12);
        assert!((wrap_phi(-PI - 0.1) - (PI - 0.1)).abs() < 1e-12);
        assert!((wrap_phi(5.0 * TAU + 0.3) - 0.3).abs() < 1e-9);
        assert!((wrap_phi(-3.0 * PI + 0.2) - (-PI + 0.2)).abs() < 1e-9);
    }

    #[test]
    fn delta_phi_across_the_seam() {
        let d = delta_phi(-PI + 0.05, PI - 0.05);
        assert!((d - 0.1).abs() < 1e-12, "got {d}");
    }

    #[test]
    fn reflect_about_mirrors_counter_clockwise_offset() {
        let r = reflect_about(1.0, 1.2);
        assert!((r - 0.8).abs() < 1e-12);
    }

    #[test]
    fn reflect_about_keeps_clockwise_offset() {
        // Already on the clockwise side: the magnitude is kept, the side too.
        let r = reflect_about(1.0, 0.7);
        assert!((r - 0.7).abs() < 1e-12);
    }

    #[test]
    fn reflect_about_wraps_near_plus_pi() {
        // phi has wrapped past +π onto the negative side.
        let axis = PI - 0.01;
        let phi = wrap_phi(axis + 0.03);
        let r = reflect_about(axis, phi);
        assert!((r - (axis - 0.03)).abs() < 1e-12, "got {r}");
    }

    #[test]
    fn reflect_about_wraps_near_minus_pi() {
        let axis = -PI + 0.01;
        let r = reflect_about(axis, axis + 0.03);
        // axis - 0.03 is below -π and must come back as a positive angle.
        assert!((r - (PI - 0.02)).abs() < 1e-12, "got {r}");
        assert!(r.abs() <= PI);
    }
}
