#![warn(missing_docs)]
//! The liquid-tube holder assembly and its chain of refracting interfaces
//!
//! The assembly consists of an acrylic holder with a cylindrical bore (centered at the origin),
//! an air gap and a glass / liquid tube resting on the bottom of the bore. A traced ray passes
//! three circular boundaries in sequence: the holder bore (acrylic → air), the tube's outer wall
//! (air → tube medium) and the tube's inner wall (tube medium → air).
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use uom::si::f64::Length;

use crate::{
    error::{TtResult, TubeTraceError},
    millimeter,
    tracer::Boundary,
};

/// refractive index of air
pub const N_AIR: f64 = 1.000;
/// refractive index of the glass / liquid tube medium
pub const N_TUBE: f64 = 1.459;
/// refractive index of the acrylic holder
pub const N_ACRYLIC: f64 = 1.49;

/// radius of the holder bore in millimeters, fixed by the physical assembly
pub const HOLDER_RADIUS_MM: f64 = 12.7;
/// thickness of the tube wall in millimeters, fixed by the physical assembly
pub const WALL_THICKNESS_MM: f64 = 1.0;
/// largest supported tube diameter in millimeters
pub const MAX_TUBE_DIAMETER_MM: f64 = 25.0;

/// One refracting circular boundary of the assembly.
///
/// Interfaces are constructed once per scenario by [`TubeAssembly::interfaces`] and stay
/// read-only for the duration of a sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interface {
    center: Point2<Length>,
    radius: Length,
    n_before: f64,
    n_after: f64,
    miss_boundary: Boundary,
    tir_boundary: Boundary,
}
impl Interface {
    /// Returns the center of this [`Interface`]'s circle.
    #[must_use]
    pub const fn center(&self) -> Point2<Length> {
        self.center
    }
    /// Returns the radius of this [`Interface`]'s circle.
    #[must_use]
    pub const fn radius(&self) -> Length {
        self.radius
    }
    /// Returns the refractive index on the entering side of this [`Interface`].
    #[must_use]
    pub const fn n_before(&self) -> f64 {
        self.n_before
    }
    /// Returns the refractive index on the exiting side of this [`Interface`].
    #[must_use]
    pub const fn n_after(&self) -> f64 {
        self.n_after
    }
    /// The [`Boundary`] reported when a ray has no forward crossing with this [`Interface`].
    #[must_use]
    pub const fn miss_boundary(&self) -> Boundary {
        self.miss_boundary
    }
    /// The [`Boundary`] reported when refraction at this [`Interface`] fails by total internal
    /// reflection.
    #[must_use]
    pub const fn tir_boundary(&self) -> Boundary {
        self.tir_boundary
    }
}

fn check_dimension(value: Length, what: &str) -> TtResult<()> {
    if !value.is_normal() || value.is_sign_negative() {
        return Err(TubeTraceError::InvalidInput(format!(
            "{what} must be positive and finite"
        )));
    }
    Ok(())
}

/// Geometry of one holder / tube scenario.
///
/// All lengths are read-only after construction; the nesting invariants (tube inside the
/// holder bore, wall thinner than the tube radius) are enforced by [`TubeAssembly::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TubeAssembly {
    holder_radius: Length,
    tube_radius: Length,
    wall_thickness: Length,
}
impl TubeAssembly {
    /// Creates a new [`TubeAssembly`].
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///  - any dimension is not positive and finite
    ///  - the tube does not fit inside the holder bore (`tube_radius >= holder_radius`)
    ///  - the wall leaves no inner bore (`wall_thickness >= tube_radius`)
    pub fn new(
        holder_radius: Length,
        tube_radius: Length,
        wall_thickness: Length,
    ) -> TtResult<Self> {
        check_dimension(holder_radius, "holder radius")?;
        check_dimension(tube_radius, "tube radius")?;
        check_dimension(wall_thickness, "wall thickness")?;
        if tube_radius >= holder_radius {
            return Err(TubeTraceError::InvalidInput(
                "tube radius must be smaller than the holder radius".into(),
            ));
        }
        if wall_thickness >= tube_radius {
            return Err(TubeTraceError::InvalidInput(
                "wall thickness must be smaller than the tube radius".into(),
            ));
        }
        Ok(Self {
            holder_radius,
            tube_radius,
            wall_thickness,
        })
    }
    /// Creates a [`TubeAssembly`] for a given tube diameter, using the fixed holder radius and
    /// wall thickness of the physical assembly.
    ///
    /// # Errors
    ///
    /// This function will return an error if the diameter is outside `0 mm .. 25 mm` or violates
    /// a nesting invariant of [`TubeAssembly::new`].
    pub fn from_tube_diameter(diameter: Length) -> TtResult<Self> {
        check_dimension(diameter, "tube diameter")?;
        if diameter > millimeter!(MAX_TUBE_DIAMETER_MM) {
            return Err(TubeTraceError::InvalidInput(format!(
                "tube diameter must not exceed {MAX_TUBE_DIAMETER_MM} mm"
            )));
        }
        Self::new(
            millimeter!(HOLDER_RADIUS_MM),
            diameter / 2.0,
            millimeter!(WALL_THICKNESS_MM),
        )
    }
    /// Returns the holder bore radius.
    #[must_use]
    pub const fn holder_radius(&self) -> Length {
        self.holder_radius
    }
    /// Returns the outer radius of the tube.
    #[must_use]
    pub const fn tube_radius(&self) -> Length {
        self.tube_radius
    }
    /// Returns the wall thickness of the tube.
    #[must_use]
    pub const fn wall_thickness(&self) -> Length {
        self.wall_thickness
    }
    /// Returns the inner radius of the tube.
    #[must_use]
    pub fn inner_radius(&self) -> Length {
        self.tube_radius - self.wall_thickness
    }
    /// Center of the tube, which rests on the bottom of the holder bore and is therefore offset
    /// from the bore center along the vertical axis by `tube_radius - holder_radius`.
    #[must_use]
    pub fn tube_center(&self) -> Point2<Length> {
        Point2::new(millimeter!(0.0), self.tube_radius - self.holder_radius)
    }
    /// The fixed chain of refracting interfaces a traced ray passes in order.
    #[must_use]
    pub fn interfaces(&self) -> [Interface; 3] {
        let tube_center = self.tube_center();
        [
            Interface {
                center: Point2::new(millimeter!(0.0), millimeter!(0.0)),
                radius: self.holder_radius,
                n_before: N_ACRYLIC,
                n_after: N_AIR,
                miss_boundary: Boundary::HolderEntry,
                tir_boundary: Boundary::AcrylicExit,
            },
            Interface {
                center: tube_center,
                radius: self.tube_radius,
                n_before: N_AIR,
                n_after: N_TUBE,
                miss_boundary: Boundary::TubeOuter,
                tir_boundary: Boundary::TubeOuter,
            },
            Interface {
                center: tube_center,
                radius: self.inner_radius(),
                n_before: N_TUBE,
                n_after: N_AIR,
                miss_boundary: Boundary::TubeInner,
                tir_boundary: Boundary::TubeInner,
            },
        ]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::millimeter;
    use approx::assert_relative_eq;
    use uom::si::length::millimeter;

    #[test]
    fn new() {
        let assembly =
            TubeAssembly::new(millimeter!(12.7), millimeter!(12.25), millimeter!(1.0)).unwrap();
        assert_relative_eq!(assembly.holder_radius().get::<millimeter>(), 12.7, max_relative = 1e-12);
        assert_relative_eq!(assembly.tube_radius().get::<millimeter>(), 12.25, max_relative = 1e-12);
        assert_relative_eq!(assembly.wall_thickness().get::<millimeter>(), 1.0, max_relative = 1e-12);
        assert_relative_eq!(assembly.inner_radius().get::<millimeter>(), 11.25, max_relative = 1e-12);
    }
    #[test]
    fn new_invalid() {
        assert!(TubeAssembly::new(millimeter!(0.0), millimeter!(12.25), millimeter!(1.0)).is_err());
        assert!(
            TubeAssembly::new(millimeter!(12.7), millimeter!(-12.25), millimeter!(1.0)).is_err()
        );
        assert!(
            TubeAssembly::new(millimeter!(12.7), millimeter!(12.25), millimeter!(f64::NAN))
                .is_err()
        );
        // tube must fit inside the holder bore
        assert!(TubeAssembly::new(millimeter!(12.7), millimeter!(12.7), millimeter!(1.0)).is_err());
        // wall must leave an inner bore
        assert!(TubeAssembly::new(millimeter!(12.7), millimeter!(1.0), millimeter!(1.0)).is_err());
    }
    #[test]
    fn from_tube_diameter() {
        let assembly = TubeAssembly::from_tube_diameter(millimeter!(24.5)).unwrap();
        assert_relative_eq!(assembly.holder_radius().get::<millimeter>(), 12.7, max_relative = 1e-12);
        assert_relative_eq!(assembly.tube_radius().get::<millimeter>(), 12.25, max_relative = 1e-12);
        assert_relative_eq!(assembly.inner_radius().get::<millimeter>(), 11.25, max_relative = 1e-12);
        assert!(TubeAssembly::from_tube_diameter(millimeter!(0.0)).is_err());
        assert!(TubeAssembly::from_tube_diameter(millimeter!(25.1)).is_err());
    }
    #[test]
    fn tube_center() {
        let assembly = TubeAssembly::from_tube_diameter(millimeter!(24.5)).unwrap();
        let center = assembly.tube_center();
        assert_relative_eq!(center.x.get::<millimeter>(), 0.0);
        assert_relative_eq!(center.y.get::<millimeter>(), -0.45, max_relative = 1e-9);
    }
    #[test]
    fn interface_chain() {
        let assembly = TubeAssembly::from_tube_diameter(millimeter!(24.5)).unwrap();
        let [holder, outer, inner] = assembly.interfaces();
        assert_relative_eq!(holder.radius().get::<millimeter>(), 12.7, max_relative = 1e-12);
        assert_relative_eq!(holder.n_before(), N_ACRYLIC);
        assert_relative_eq!(holder.n_after(), N_AIR);
        assert_eq!(holder.miss_boundary(), Boundary::HolderEntry);
        assert_eq!(holder.tir_boundary(), Boundary::AcrylicExit);
        assert_relative_eq!(outer.radius().get::<millimeter>(), 12.25, max_relative = 1e-12);
        assert_relative_eq!(outer.n_before(), N_AIR);
        assert_relative_eq!(outer.n_after(), N_TUBE);
        assert_eq!(outer.miss_boundary(), Boundary::TubeOuter);
        assert_relative_eq!(inner.radius().get::<millimeter>(), 11.25, max_relative = 1e-12);
        assert_relative_eq!(inner.n_before(), N_TUBE);
        assert_relative_eq!(inner.n_after(), N_AIR);
        assert_eq!(inner.tir_boundary(), Boundary::TubeInner);
        assert_eq!(outer.center(), inner.center());
    }
}
