#![warn(missing_docs)]
//! 2D line / circle geometry underlying the ray trace
//!
//! All coordinates are handled on a millimeter scale. Lines are kept in slope / intercept form
//! (`y = a·x + b`), which is sufficient for this assembly since no ray leg ever runs vertically.
use approx::relative_eq;
use nalgebra::Point2;
use roots::{find_roots_quadratic, Roots};
use uom::si::{
    angle::radian,
    f64::{Angle, Length},
    length::millimeter,
};

use crate::{
    degree,
    error::{TtResult, TubeTraceError},
    millimeter,
};

/// A non-vertical 2D line in slope / intercept form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line2 {
    slope: f64,
    intercept: f64,
}

impl Line2 {
    /// Creates a new [`Line2`] from its slope and its intercept (in millimeters).
    ///
    /// # Errors
    ///
    /// This function will return an error if slope or intercept are not finite.
    pub fn new(slope: f64, intercept: f64) -> TtResult<Self> {
        if !slope.is_finite() || !intercept.is_finite() {
            return Err(TubeTraceError::InvalidInput(
                "line slope and intercept must be finite".into(),
            ));
        }
        Ok(Self { slope, intercept })
    }
    /// Creates the [`Line2`] through `point` with the given heading (0° = +x axis, CCW positive).
    ///
    /// # Errors
    ///
    /// This function will return an error if the heading is vertical (90° / 270°). A vertical
    /// line has no slope / intercept form; the assembly's operating range never produces one, so
    /// this degeneracy is rejected instead of being special-cased.
    pub fn from_point_and_angle(point: Point2<Length>, heading: Angle) -> TtResult<Self> {
        let heading_rad = heading.get::<radian>();
        if relative_eq!(heading_rad.cos(), 0.0, epsilon = 1e-12) {
            return Err(TubeTraceError::InvalidInput(
                "vertical heading: line has no slope / intercept form".into(),
            ));
        }
        let slope = heading_rad.tan();
        let intercept = point.y.get::<millimeter>() - slope * point.x.get::<millimeter>();
        Self::new(slope, intercept)
    }
    /// Returns the slope of this [`Line2`].
    #[must_use]
    pub const fn slope(&self) -> f64 {
        self.slope
    }
    /// Returns the intercept of this [`Line2`] in millimeters.
    #[must_use]
    pub const fn intercept(&self) -> f64 {
        self.intercept
    }
    /// Intersects this [`Line2`] with the circle given by `center` and `radius`.
    ///
    /// Substituting the line equation into the circle equation yields the quadratic
    /// `(1+a²)·x² + B·x + C = 0` in `x`, whose discriminant classifies the result: no real
    /// solution ([`CircleIntersections::None`]), a single touching point
    /// ([`CircleIntersections::Tangent`]) or two crossings ([`CircleIntersections::Two`], ordered
    /// with the `+√D` branch first).
    ///
    /// # Errors
    ///
    /// This function will return an error if the radius is not positive and finite.
    pub fn intersect_circle(
        &self,
        center: Point2<Length>,
        radius: Length,
    ) -> TtResult<CircleIntersections> {
        if !radius.is_normal() || radius.is_sign_negative() {
            return Err(TubeTraceError::InvalidInput(
                "circle radius must be positive and finite".into(),
            ));
        }
        let cx = center.x.get::<millimeter>();
        let cy = center.y.get::<millimeter>();
        let r = radius.get::<millimeter>();
        let e = self.intercept - cy;
        let a2 = self.slope.mul_add(self.slope, 1.0);
        let a1 = 2.0 * self.slope.mul_add(e, -cx);
        let a0 = cx.mul_add(cx, e.mul_add(e, -(r * r)));
        let intersections = match find_roots_quadratic(a2, a1, a0) {
            Roots::No(_) => CircleIntersections::None,
            Roots::One(x) => CircleIntersections::Tangent(self.point_at(x[0])),
            // roots are returned in ascending order, so the second one is the +√D branch
            Roots::Two(x) => CircleIntersections::Two(self.point_at(x[1]), self.point_at(x[0])),
            _ => unreachable!(),
        };
        Ok(intersections)
    }
    fn point_at(&self, x: f64) -> Point2<Length> {
        millimeter!(x, self.slope.mul_add(x, self.intercept))
    }
}

/// Solutions of a [`Line2`] / circle intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CircleIntersections {
    /// the line misses the circle
    None,
    /// the line touches the circle in a single point
    Tangent(Point2<Length>),
    /// the line crosses the circle twice. The first point is the `+√D` branch of the quadratic;
    /// the second point is the near-side crossing a forward-travelling ray reaches first.
    Two(Point2<Length>, Point2<Length>),
}

/// Bearing angle of a surface point, expressed in the trace's angle convention.
///
/// The raw bearing is `atan2(y − cy, x − cx)`; the returned "alpha" angle is
/// `270° − ((bearing + 360°) mod 360°)`, which aligns the circle's local tangent-normal frame
/// with the trace convention (alpha is zero at the bottom of the circle, where the surface
/// normal points straight back to the center). All downstream incidence-angle bookkeeping
/// depends on this exact transform.
#[must_use]
pub fn surface_alpha(point: Point2<Length>, center: Point2<Length>) -> Angle {
    let dx = (point.x - center.x).get::<millimeter>();
    let dy = (point.y - center.y).get::<millimeter>();
    let bearing_deg = dy.atan2(dx).to_degrees();
    degree!(270.0 - (bearing_deg + 360.0) % 360.0)
}
