#![warn(missing_docs)]
//! Sequential ray trace through the assembly's chain of circular interfaces
//!
//! A trace starts from an entry point inside the acrylic holder and follows the ray through the
//! holder bore, the tube's outer wall and the tube's inner wall. Each stage consumes the previous
//! stage's [`RayLeg`] and produces the next one, so no intermediate angle is ever re-derived from
//! scratch. Expected failures (a missed boundary, total internal reflection) are returned by
//! value as a [`TraceError`] tagged with the failing [`Boundary`]; they never abort the process.
use std::fmt::Display;

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use uom::si::{
    angle::radian,
    f64::{Angle, Length},
    length::millimeter,
};

use crate::{
    assembly::{Interface, TubeAssembly},
    degree,
    error::TtResult,
    geometry::{surface_alpha, CircleIntersections, Line2},
    refraction::{refract, SnellOutcome},
};

/// The refracting boundaries of the assembly, in the order a ray passes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Boundary {
    /// the ray enters the holder bore (acrylic circle around the origin)
    HolderEntry,
    /// acrylic → air refraction when leaving the holder material at the bore
    AcrylicExit,
    /// air → tube refraction at the tube's outer wall
    TubeOuter,
    /// tube → air refraction at the tube's inner wall
    TubeInner,
}
impl Display for Boundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            Self::HolderEntry => "holder entry",
            Self::AcrylicExit => "acrylic exit",
            Self::TubeOuter => "tube outer wall",
            Self::TubeInner => "tube inner wall",
        };
        write!(f, "{msg}")
    }
}

/// Expected failure of a single trace.
///
/// Both variants are recoverable outcomes of scanning an unusable offset, not errors of the
/// program: the sweep reacts to them with its skip / stop rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TraceError {
    /// the ray has no forward crossing with the given boundary's circle
    Miss(Boundary),
    /// the incidence angle at the given boundary exceeds the critical angle of its index pair
    TotalInternalReflection {
        /// boundary at which the refraction failed
        boundary: Boundary,
        /// critical angle of the boundary's index pair
        critical_angle: Angle,
    },
}
impl TraceError {
    /// Returns the [`Boundary`] at which the trace aborted.
    #[must_use]
    pub const fn boundary(&self) -> Boundary {
        match self {
            Self::Miss(boundary) | Self::TotalInternalReflection { boundary, .. } => *boundary,
        }
    }
}
impl Display for TraceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Miss(boundary) => write!(f, "ray misses {boundary}"),
            Self::TotalInternalReflection { boundary, .. } => {
                write!(f, "total internal reflection at {boundary}")
            }
        }
    }
}

/// One straight segment of the traced ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayLeg {
    position: Point2<Length>,
    heading: Angle,
}
impl RayLeg {
    /// Creates a new [`RayLeg`] from a position and a propagation heading (0° = +x axis, CCW
    /// positive).
    #[must_use]
    pub const fn new(position: Point2<Length>, heading: Angle) -> Self {
        Self { position, heading }
    }
    /// Returns the start position of this [`RayLeg`].
    #[must_use]
    pub const fn position(&self) -> Point2<Length> {
        self.position
    }
    /// Returns the propagation heading of this [`RayLeg`].
    #[must_use]
    pub const fn heading(&self) -> Angle {
        self.heading
    }
}

/// Final result of one full trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceResult {
    exit_angle: Angle,
    ideal_angle: Angle,
}
impl TraceResult {
    /// The refraction angle at the tube's inner wall, i.e. the actual exit angle of the ray.
    #[must_use]
    pub const fn exit_angle(&self) -> Angle {
        self.exit_angle
    }
    /// The exit angle that would leave the ray parallel to the assembly's reference axis.
    #[must_use]
    pub const fn ideal_angle(&self) -> Angle {
        self.ideal_angle
    }
    /// Deviation of the actual exit angle from the ideal one.
    #[must_use]
    pub fn deviation(&self) -> Angle {
        self.ideal_angle - self.exit_angle
    }
}

/// Success or tagged failure of a single trace.
pub type TraceAttempt = Result<TraceResult, TraceError>;

/// Bookkeeping of one interface crossing, consumed by the following stage.
struct Crossing {
    leg: RayLeg,
    alpha: Angle,
    refracted: Angle,
}

fn is_forward(leg: &RayLeg, crossing: Point2<Length>) -> bool {
    let heading_rad = leg.heading.get::<radian>();
    let direction = Vector2::new(heading_rad.cos(), heading_rad.sin());
    let to_crossing = Vector2::new(
        (crossing.x - leg.position.x).get::<millimeter>(),
        (crossing.y - leg.position.y).get::<millimeter>(),
    );
    to_crossing.dot(&direction) > 0.0
}

/// Advances a [`RayLeg`] across one [`Interface`]: intersection, incidence bookkeeping and
/// refraction. The next leg starts at the crossing point with the refracted heading.
fn cross_interface(leg: &RayLeg, interface: &Interface) -> TtResult<Result<Crossing, TraceError>> {
    let line = Line2::from_point_and_angle(leg.position(), leg.heading())?;
    let crossing = match line.intersect_circle(interface.center(), interface.radius())? {
        CircleIntersections::None => return Ok(Err(TraceError::Miss(interface.miss_boundary()))),
        CircleIntersections::Tangent(point) => point,
        // the -√D branch is the near-side crossing the ray reaches first
        CircleIntersections::Two(_, near) => near,
    };
    if !is_forward(leg, crossing) {
        return Ok(Err(TraceError::Miss(interface.miss_boundary())));
    }
    let alpha = surface_alpha(crossing, interface.center());
    let incidence = degree!(90.0) - alpha - leg.heading();
    let refracted = match refract(incidence, interface.n_before(), interface.n_after())? {
        SnellOutcome::Refracted(angle) => angle,
        SnellOutcome::TotalReflection(critical_angle) => {
            return Ok(Err(TraceError::TotalInternalReflection {
                boundary: interface.tir_boundary(),
                critical_angle,
            }))
        }
    };
    let heading = degree!(90.0) - (alpha + refracted);
    Ok(Ok(Crossing {
        leg: RayLeg::new(crossing, heading),
        alpha,
        refracted,
    }))
}

/// Traces a single ray entering the assembly at `entry` under the incidence angle `incidence`
/// (relative to the assembly, 0° = +x axis, CCW positive).
///
/// The ray passes the holder bore, the tube's outer wall and the tube's inner wall in sequence.
/// On success, the returned [`TraceResult`] carries the exit angle at the inner wall together
/// with the ideal angle that would leave the exit ray parallel to the reference axis. The first
/// boundary without a real forward crossing, or the first total internal reflection, aborts the
/// trace with the corresponding [`TraceError`]; no partial result is produced. Tracing is a pure
/// function of its inputs — identical inputs yield identical results.
///
/// # Errors
///
/// This function will return an error if the entry heading is vertical or the accumulated angle
/// chain produces an incidence outside `0°..=90°` at some boundary. Both indicate an entry
/// condition far outside the assembly's operating range, which is a configuration error rather
/// than a recoverable trace outcome.
pub fn trace(
    assembly: &TubeAssembly,
    entry: Point2<Length>,
    incidence: Angle,
) -> TtResult<TraceAttempt> {
    let [holder, tube_outer, tube_inner] = assembly.interfaces();
    let entry_leg = RayLeg::new(entry, incidence);
    let first = match cross_interface(&entry_leg, &holder)? {
        Ok(crossing) => crossing,
        Err(failure) => return Ok(Err(failure)),
    };
    let second = match cross_interface(&first.leg, &tube_outer)? {
        Ok(crossing) => crossing,
        Err(failure) => return Ok(Err(failure)),
    };
    let third = match cross_interface(&second.leg, &tube_inner)? {
        Ok(crossing) => crossing,
        Err(failure) => return Ok(Err(failure)),
    };
    Ok(Ok(TraceResult {
        exit_angle: third.refracted,
        ideal_angle: degree!(90.0) - third.alpha,
    }))
}
