#![warn(missing_docs)]
//! Snell's-law refraction at a single boundary between two media
use uom::si::{angle::radian, f64::Angle};

use crate::{
    degree,
    error::{TtResult, TubeTraceError},
    radian,
};

/// Outcome of a single Snell's-law evaluation at one boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnellOutcome {
    /// the ray continues into the far medium with the given refraction angle
    Refracted(Angle),
    /// the incidence angle exceeds the critical angle of the index pair; the payload is that
    /// critical angle
    TotalReflection(Angle),
}

fn check_index(refractive_index: f64) -> TtResult<()> {
    if refractive_index <= 0.0 || !refractive_index.is_finite() {
        return Err(TubeTraceError::InvalidInput(
            "refractive index must be >0.0 and finite".into(),
        ));
    }
    Ok(())
}

/// Critical angle of the given index pair.
///
/// Returns `Some(asin(n_to / n_from))` when passing from the denser into the thinner medium
/// (`n_from > n_to`) and `None` otherwise, since total internal reflection can only occur in the
/// former case.
///
/// # Errors
///
/// This function will return an error if either refractive index is not positive and finite.
pub fn critical_angle(n_from: f64, n_to: f64) -> TtResult<Option<Angle>> {
    check_index(n_from)?;
    check_index(n_to)?;
    if n_from > n_to {
        Ok(Some(radian!((n_to / n_from).asin())))
    } else {
        Ok(None)
    }
}

/// Refracts a ray hitting a boundary at the given incidence angle (measured from the surface
/// normal) while passing from a medium with index `n_from` into a medium with index `n_to`.
///
/// Incidence at exactly the critical angle still refracts (to a grazing 90° exit); only
/// incidence strictly above it yields [`SnellOutcome::TotalReflection`].
///
/// # Errors
///
/// This function will return an error if
///  - the incidence angle is outside `0°..=90°`
///  - either refractive index is not positive and finite
///
/// Such inputs are a programming error of the caller, not a recoverable trace condition.
pub fn refract(incidence: Angle, n_from: f64, n_to: f64) -> TtResult<SnellOutcome> {
    if !incidence.is_finite() || incidence < degree!(0.0) || incidence > degree!(90.0) {
        return Err(TubeTraceError::InvalidInput(
            "incidence angle must be within 0°..=90°".into(),
        ));
    }
    if let Some(critical) = critical_angle(n_from, n_to)? {
        if incidence > critical {
            return Ok(SnellOutcome::TotalReflection(critical));
        }
    }
    let sine = incidence.get::<radian>().sin() * n_from / n_to;
    // right at the critical angle the sine may overshoot 1.0 by rounding
    Ok(SnellOutcome::Refracted(radian!(sine.min(1.0).asin())))
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;
    use uom::si::angle::degree;

    #[test]
    fn invalid_inputs() {
        assert!(refract(degree!(-0.1), 1.0, 1.5).is_err());
        assert!(refract(degree!(90.1), 1.0, 1.5).is_err());
        assert!(refract(degree!(30.0), 0.0, 1.5).is_err());
        assert!(refract(degree!(30.0), 1.0, -1.5).is_err());
        assert!(refract(degree!(30.0), f64::NAN, 1.5).is_err());
        assert!(critical_angle(1.0, f64::INFINITY).is_err());
    }
    #[test]
    fn critical_angle_only_into_thinner_medium() {
        assert!(critical_angle(1.0, 1.459).unwrap().is_none());
        assert!(critical_angle(1.459, 1.459).unwrap().is_none());
        let critical = critical_angle(1.459, 1.0).unwrap().unwrap();
        assert_abs_diff_eq!(
            critical.get::<degree>(),
            (1.0_f64 / 1.459).asin().to_degrees(),
            epsilon = 1e-12
        );
    }
    #[test]
    fn snells_law() {
        let refracted = refract(degree!(30.0), 1.0, 1.459).unwrap();
        let SnellOutcome::Refracted(angle) = refracted else {
            panic!("expected refraction")
        };
        assert_abs_diff_eq!(
            angle.get::<degree>(),
            (0.5_f64 / 1.459).asin().to_degrees(),
            epsilon = 1e-9
        );
    }
    #[test]
    fn reversibility() {
        let SnellOutcome::Refracted(forward) = refract(degree!(30.0), 1.0, 1.459).unwrap() else {
            panic!("expected refraction")
        };
        let SnellOutcome::Refracted(back) = refract(forward, 1.459, 1.0).unwrap() else {
            panic!("expected refraction")
        };
        assert_abs_diff_eq!(back.get::<degree>(), 30.0, epsilon = 1e-6);
    }
    #[test]
    fn grazing_exit_at_critical_angle() {
        let critical = critical_angle(1.459, 1.0).unwrap().unwrap();
        let SnellOutcome::Refracted(angle) = refract(critical, 1.459, 1.0).unwrap() else {
            panic!("the critical angle itself must still refract")
        };
        assert_abs_diff_eq!(angle.get::<degree>(), 90.0, epsilon = 1e-5);
    }
    #[test]
    fn total_reflection_above_critical_angle() {
        let critical = critical_angle(1.459, 1.0).unwrap().unwrap();
        let outcome = refract(critical + degree!(1e-3), 1.459, 1.0).unwrap();
        assert_matches!(outcome, SnellOutcome::TotalReflection(_));
        let SnellOutcome::TotalReflection(reported) = outcome else {
            unreachable!()
        };
        assert_abs_diff_eq!(
            reported.get::<degree>(),
            critical.get::<degree>(),
            epsilon = 1e-12
        );
    }
    #[test]
    fn tube_to_air_below_critical_angle() {
        // 40.1° is below the ≈43.3° critical angle of the tube medium, so a finite (if steep)
        // refraction angle results
        let SnellOutcome::Refracted(angle) = refract(degree!(40.1), 1.459, 1.0).unwrap() else {
            panic!("expected refraction")
        };
        assert_abs_diff_eq!(angle.get::<degree>(), 70.0, epsilon = 0.05);
    }
}
