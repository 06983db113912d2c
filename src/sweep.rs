#![warn(missing_docs)]
//! Bidirectional sweep of the lateral entry offset
//!
//! The sweep drives [`trace`] across a 1D parameter: the lateral displacement `L1` of the ray's
//! entry point, scanned outward from the nominal center in both signed directions. It records
//! the curve of exit angle vs. offset and the sub-range of offsets whose exit angle stays within
//! tolerance of the ideal angle — the usable positioning tolerance of the physical assembly.
use std::fmt::Display;

use log::{debug, info};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use uom::si::{
    angle::{degree, radian},
    f64::{Angle, Length},
    length::millimeter,
};

use crate::{
    assembly::TubeAssembly,
    degree,
    error::{TtResult, TubeTraceError},
    millimeter,
    tracer::{trace, TraceResult},
    utils::{f64_to_usize, usize_to_f64},
};

/// Selector for the lateral entry position relative to the nominal center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryOffset {
    /// the nominal entry point itself
    Center,
    /// displacement perpendicular to the incidence direction; offsets on this side count
    /// positive
    Upper,
    /// the mirrored displacement; offsets on this side count negative
    Lower,
}
impl EntryOffset {
    /// The entry point displaced by `margin` perpendicular to the incidence direction.
    #[must_use]
    pub fn offset_point(
        &self,
        origin: Point2<Length>,
        incidence: Angle,
        margin: Length,
    ) -> Point2<Length> {
        let beta1 = incidence.get::<radian>();
        match self {
            Self::Center => origin,
            Self::Upper => Point2::new(
                origin.x - margin * beta1.sin(),
                origin.y + margin * beta1.cos(),
            ),
            Self::Lower => Point2::new(
                origin.x + margin * beta1.sin(),
                origin.y - margin * beta1.cos(),
            ),
        }
    }
}
impl Display for EntryOffset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            Self::Center => "center",
            Self::Upper => "upper",
            Self::Lower => "lower",
        };
        write!(f, "{msg}")
    }
}

/// Configuration data for an offset sweep.
///
/// The config contains the following info
///   - the nominal entry point of the ray and its incidence angle `β1`
///   - the maximum lateral excursion and the step size of the scan
///   - the allowed deviation of the exit angle from the ideal angle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    entry_point: Point2<Length>,
    incidence_angle: Angle,
    max_excursion: Length,
    step: Length,
    tolerance: Angle,
}
impl Default for SweepConfig {
    /// Create a default config for an offset sweep with the following parameters:
    ///   - entry point: `(-7.72, -13.29)` mm (the nominal entry of the physical assembly)
    ///   - incidence angle: `30.5°`
    ///   - maximum excursion: `±1.5 mm`
    ///   - step size: `1 µm`
    ///   - tolerance: `1°`
    fn default() -> Self {
        Self {
            entry_point: millimeter!(-7.72, -13.29),
            incidence_angle: degree!(30.5),
            max_excursion: millimeter!(1.5),
            step: millimeter!(0.001),
            tolerance: degree!(1.0),
        }
    }
}
impl SweepConfig {
    /// Returns the nominal entry point of this config.
    #[must_use]
    pub const fn entry_point(&self) -> Point2<Length> {
        self.entry_point
    }
    /// Returns the incidence angle `β1` of this config.
    #[must_use]
    pub const fn incidence_angle(&self) -> Angle {
        self.incidence_angle
    }
    /// Returns the maximum lateral excursion of this config.
    #[must_use]
    pub const fn max_excursion(&self) -> Length {
        self.max_excursion
    }
    /// Returns the scan step size of this config.
    #[must_use]
    pub const fn step(&self) -> Length {
        self.step
    }
    /// Returns the exit-angle tolerance of this config.
    #[must_use]
    pub const fn tolerance(&self) -> Angle {
        self.tolerance
    }
    /// Sets the nominal entry point.
    ///
    /// # Errors
    ///
    /// This function will return an error if a coordinate is not finite.
    pub fn set_entry_point(&mut self, entry_point: Point2<Length>) -> TtResult<()> {
        if !entry_point.x.is_finite() || !entry_point.y.is_finite() {
            return Err(TubeTraceError::InvalidInput(
                "entry point coordinates must be finite".into(),
            ));
        }
        self.entry_point = entry_point;
        Ok(())
    }
    /// Sets the incidence angle `β1`.
    ///
    /// # Errors
    ///
    /// This function will return an error if the angle is outside `0°..90°`.
    pub fn set_incidence_angle(&mut self, incidence_angle: Angle) -> TtResult<()> {
        if !incidence_angle.is_finite()
            || incidence_angle <= degree!(0.0)
            || incidence_angle >= degree!(90.0)
        {
            return Err(TubeTraceError::InvalidInput(
                "incidence angle must be within 0°..90°".into(),
            ));
        }
        self.incidence_angle = incidence_angle;
        Ok(())
    }
    /// Sets the maximum lateral excursion of the scan.
    ///
    /// # Errors
    ///
    /// This function will return an error if the excursion is outside `0 mm..=5 mm`.
    pub fn set_max_excursion(&mut self, max_excursion: Length) -> TtResult<()> {
        if !max_excursion.is_finite()
            || max_excursion < millimeter!(0.0)
            || max_excursion > millimeter!(5.0)
        {
            return Err(TubeTraceError::InvalidInput(
                "maximum excursion must be within 0 mm..=5 mm".into(),
            ));
        }
        self.max_excursion = max_excursion;
        Ok(())
    }
    /// Sets the scan step size.
    ///
    /// # Errors
    ///
    /// This function will return an error if the step size is not positive and finite.
    pub fn set_step(&mut self, step: Length) -> TtResult<()> {
        if !step.is_normal() || step.is_sign_negative() {
            return Err(TubeTraceError::InvalidInput(
                "step size must be positive and finite".into(),
            ));
        }
        self.step = step;
        Ok(())
    }
    /// Sets the allowed deviation of the exit angle from the ideal angle.
    ///
    /// # Errors
    ///
    /// This function will return an error if the tolerance is outside `0°..=15°`.
    pub fn set_tolerance(&mut self, tolerance: Angle) -> TtResult<()> {
        if !tolerance.is_finite() || tolerance < degree!(0.0) || tolerance > degree!(15.0) {
            return Err(TubeTraceError::InvalidInput(
                "tolerance must be within 0°..=15°".into(),
            ));
        }
        self.tolerance = tolerance;
        Ok(())
    }
}

/// One evaluated offset of the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepSample {
    offset: Length,
    exit_angle: Angle,
    ideal_angle: Angle,
}
impl SweepSample {
    /// Creates a new [`SweepSample`].
    #[must_use]
    pub const fn new(offset: Length, exit_angle: Angle, ideal_angle: Angle) -> Self {
        Self {
            offset,
            exit_angle,
            ideal_angle,
        }
    }
    /// Returns the signed lateral offset of this [`SweepSample`].
    #[must_use]
    pub const fn offset(&self) -> Length {
        self.offset
    }
    /// Returns the exit angle traced at this offset.
    #[must_use]
    pub const fn exit_angle(&self) -> Angle {
        self.exit_angle
    }
    /// Returns the ideal (parallel-beam) angle at this offset.
    #[must_use]
    pub const fn ideal_angle(&self) -> Angle {
        self.ideal_angle
    }
    /// Deviation of the exit angle from the ideal angle.
    #[must_use]
    pub fn deviation(&self) -> Angle {
        self.ideal_angle - self.exit_angle
    }
}

/// Result of a finished offset sweep.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SweepResult {
    samples: Vec<SweepSample>,
    valid_offsets: Vec<Length>,
}
impl SweepResult {
    /// All recorded samples, ordered by ascending offset.
    #[must_use]
    pub fn samples(&self) -> &[SweepSample] {
        &self.samples
    }
    /// The offsets whose exit angle stays within tolerance, ordered ascending.
    #[must_use]
    pub fn valid_offsets(&self) -> &[Length] {
        &self.valid_offsets
    }
    /// The usable positioning band: smallest and largest in-tolerance offset.
    ///
    /// Returns `None` if no scanned offset stays within tolerance.
    #[must_use]
    pub fn valid_band(&self) -> Option<(Length, Length)> {
        match (self.valid_offsets.first(), self.valid_offsets.last()) {
            (Some(first), Some(last)) => Some((*first, *last)),
            _ => None,
        }
    }
    /// Returns `true` if the sweep recorded no successful sample at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Analyzer driving the tracer across the lateral entry offset in both directions.
#[derive(Default, Debug)]
pub struct OffsetSweep {
    config: SweepConfig,
}
impl OffsetSweep {
    /// Creates a new [`OffsetSweep`].
    #[must_use]
    pub const fn new(config: SweepConfig) -> Self {
        Self { config }
    }
    /// Returns the config of this [`OffsetSweep`].
    #[must_use]
    pub const fn config(&self) -> &SweepConfig {
        &self.config
    }
    /// Performs the sweep on the given assembly.
    ///
    /// The center offset is evaluated once (a failure there is tolerated silently), then the
    /// upper (positive) and lower (negative) directions are scanned independently outward in
    /// steps of the configured size. A direction stops at the first failed trace after it has
    /// produced at least one sample; failures before the first sample only skip that offset.
    ///
    /// # Errors
    ///
    /// This function will return an error if the tracer reports an invalid input, e.g. for a
    /// config whose entry geometry is outside the assembly's operating range. Per-offset misses
    /// and total internal reflection are expected outcomes and handled by the scan rule instead.
    pub fn analyze(&self, assembly: &TubeAssembly) -> TtResult<SweepResult> {
        let config = &self.config;
        let step_mm = config.step.get::<millimeter>();
        // tolerate rounding of the mm conversion when the excursion is a multiple of the step
        let steps =
            f64_to_usize((config.max_excursion.get::<millimeter>() / step_mm + 1e-9).floor());
        info!(
            "sweeping lateral entry offset up to ±{:.3} mm in steps of {step_mm} mm",
            config.max_excursion.get::<millimeter>()
        );
        let upper = self.scan_direction(assembly, EntryOffset::Upper, steps)?;
        let lower = self.scan_direction(assembly, EntryOffset::Lower, steps)?;
        let center = match trace(assembly, config.entry_point, config.incidence_angle)? {
            Ok(result) => Some(Self::sample(millimeter!(0.0), &result)),
            Err(_) => None,
        };
        let mut samples = Vec::with_capacity(lower.len() + upper.len() + 1);
        samples.extend(lower.into_iter().rev());
        samples.extend(center);
        samples.extend(upper);
        let valid_offsets = samples
            .iter()
            .filter(|sample| sample.deviation().abs() < config.tolerance)
            .map(|sample| sample.offset())
            .collect();
        Ok(SweepResult {
            samples,
            valid_offsets,
        })
    }
    fn scan_direction(
        &self,
        assembly: &TubeAssembly,
        direction: EntryOffset,
        steps: usize,
    ) -> TtResult<Vec<SweepSample>> {
        let config = &self.config;
        let mut samples: Vec<SweepSample> = Vec::new();
        for step_index in 1..=steps {
            let margin = config.step * usize_to_f64(step_index);
            let offset = match direction {
                EntryOffset::Lower => -margin,
                _ => margin,
            };
            let entry =
                direction.offset_point(config.entry_point, config.incidence_angle, margin);
            match trace(assembly, entry, config.incidence_angle)? {
                Ok(result) => samples.push(Self::sample(offset, &result)),
                Err(failure) if samples.is_empty() => {
                    debug!(
                        "offset {:.3} mm not yet usable ({failure}), skipping",
                        offset.get::<millimeter>()
                    );
                }
                Err(failure) => {
                    info!(
                        "{direction} scan stopped at offset {:.3} mm: {failure}",
                        offset.get::<millimeter>()
                    );
                    break;
                }
            }
        }
        Ok(samples)
    }
    fn sample(offset: Length, result: &TraceResult) -> SweepSample {
        SweepSample::new(offset, result.exit_angle(), result.ideal_angle())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{degree, millimeter};
    use approx::assert_relative_eq;

    fn nominal_assembly() -> TubeAssembly {
        TubeAssembly::from_tube_diameter(millimeter!(24.5)).unwrap()
    }
    #[test]
    fn entry_offset_display() {
        assert_eq!(format!("{}", EntryOffset::Center), "center");
        assert_eq!(format!("{}", EntryOffset::Upper), "upper");
        assert_eq!(format!("{}", EntryOffset::Lower), "lower");
    }
    #[test]
    fn offset_point() {
        let origin = millimeter!(0.0, 0.0);
        let beta1 = degree!(30.0);
        let margin = millimeter!(2.0);
        let center = EntryOffset::Center.offset_point(origin, beta1, margin);
        assert_eq!(center, origin);
        let upper = EntryOffset::Upper.offset_point(origin, beta1, margin);
        assert_relative_eq!(upper.x.get::<millimeter>(), -1.0, max_relative = 1e-9);
        assert_relative_eq!(
            upper.y.get::<millimeter>(),
            3.0_f64.sqrt(),
            max_relative = 1e-9
        );
        let lower = EntryOffset::Lower.offset_point(origin, beta1, margin);
        assert_relative_eq!(lower.x.get::<millimeter>(), 1.0, max_relative = 1e-9);
        assert_relative_eq!(
            lower.y.get::<millimeter>(),
            -(3.0_f64.sqrt()),
            max_relative = 1e-9
        );
    }
    #[test]
    fn config_default() {
        let config = SweepConfig::default();
        assert_relative_eq!(
            config.entry_point().x.get::<millimeter>(),
            -7.72,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            config.entry_point().y.get::<millimeter>(),
            -13.29,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            config.incidence_angle().get::<degree>(),
            30.5,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            config.max_excursion().get::<millimeter>(),
            1.5,
            max_relative = 1e-12
        );
        assert_relative_eq!(config.step().get::<millimeter>(), 0.001, max_relative = 1e-12);
        assert_relative_eq!(config.tolerance().get::<degree>(), 1.0, max_relative = 1e-12);
    }
    #[test]
    fn config_setters_reject_out_of_range_values() {
        let mut config = SweepConfig::default();
        assert!(config.set_max_excursion(millimeter!(-0.1)).is_err());
        assert!(config.set_max_excursion(millimeter!(5.1)).is_err());
        assert!(config.set_max_excursion(millimeter!(5.0)).is_ok());
        assert!(config.set_tolerance(degree!(-0.1)).is_err());
        assert!(config.set_tolerance(degree!(15.1)).is_err());
        assert!(config.set_tolerance(degree!(15.0)).is_ok());
        assert!(config.set_step(millimeter!(0.0)).is_err());
        assert!(config.set_step(millimeter!(f64::NAN)).is_err());
        assert!(config.set_step(millimeter!(0.01)).is_ok());
        assert!(config.set_incidence_angle(degree!(0.0)).is_err());
        assert!(config.set_incidence_angle(degree!(90.0)).is_err());
        assert!(config.set_incidence_angle(degree!(45.0)).is_ok());
        assert!(config
            .set_entry_point(millimeter!(f64::NAN, 0.0))
            .is_err());
        assert!(config.set_entry_point(millimeter!(-7.0, -13.0)).is_ok());
    }
    #[test]
    fn phi24_5_sweep_has_usable_band() {
        let result = OffsetSweep::default().analyze(&nominal_assembly()).unwrap();
        assert!(!result.is_empty());
        let (low, high) = result.valid_band().expect("a usable band must exist");
        assert!(low <= high);
        assert!(low.get::<millimeter>() >= -1.5);
        assert!(high.get::<millimeter>() <= 1.5);
        // the in-tolerance offsets form one contiguous band
        for pair in result.valid_offsets().windows(2) {
            assert!((pair[1] - pair[0]).get::<millimeter>() < 0.0015);
        }
    }
    #[test]
    fn samples_are_ordered_by_offset() {
        let result = OffsetSweep::default().analyze(&nominal_assembly()).unwrap();
        assert!(result
            .samples()
            .windows(2)
            .all(|pair| pair[0].offset() < pair[1].offset()));
    }
    #[test]
    fn lower_scan_stops_at_total_internal_reflection() {
        let result = OffsetSweep::default().analyze(&nominal_assembly()).unwrap();
        let first = result.samples().first().expect("samples must exist");
        // the lower direction runs into total internal reflection well before the excursion limit
        assert!(first.offset().get::<millimeter>() > -0.6);
        let last = result.samples().last().expect("samples must exist");
        assert!(last.offset().get::<millimeter>() > 1.45);
    }
    #[test]
    fn sweep_is_idempotent() {
        let sweep = OffsetSweep::default();
        let first = sweep.analyze(&nominal_assembly()).unwrap();
        let second = sweep.analyze(&nominal_assembly()).unwrap();
        assert_eq!(first, second);
    }
    #[test]
    fn sweep_without_usable_offsets_is_empty() {
        let mut config = SweepConfig::default();
        config.set_entry_point(millimeter!(-7.72, -25.0)).unwrap();
        config.set_step(millimeter!(0.1)).unwrap();
        config.set_max_excursion(millimeter!(0.5)).unwrap();
        let result = OffsetSweep::new(config).analyze(&nominal_assembly()).unwrap();
        assert!(result.is_empty());
        assert!(result.valid_band().is_none());
    }
}
