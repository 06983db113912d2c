#![warn(missing_docs)]
//! Rendering of a finished offset sweep as an SVG chart
//!
//! The chart shows the calculated exit angle and the ideal angle over the scanned lateral
//! offset, with the usable tolerance band shaded.
use std::path::{Path, PathBuf};

use itertools::izip;
use plotters::prelude::{
    ChartBuilder, Color, IntoDrawingArea, LineSeries, PathElement, Rectangle, SVGBackend, BLACK,
    BLUE, RED, WHITE,
};
use uom::si::{angle::degree, length::millimeter};

use crate::{
    error::{TtResult, TubeTraceError},
    sweep::SweepResult,
};

/// Chart generator for a finished offset sweep.
#[derive(Debug, Clone)]
pub struct SweepPlot {
    path: PathBuf,
    fig_size: (u32, u32),
}
impl SweepPlot {
    /// Creates a new [`SweepPlot`] writing to the given SVG file path.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            fig_size: (1000, 700),
        }
    }
    /// Sets the figure size in pixels.
    pub fn set_fig_size(&mut self, fig_size: (u32, u32)) {
        self.fig_size = fig_size;
    }
    /// Renders the sweep chart.
    ///
    /// # Errors
    ///
    /// This function will return an error if the result contains no samples or the chart could
    /// not be drawn / written.
    pub fn plot(&self, result: &SweepResult) -> TtResult<()> {
        if result.samples().is_empty() {
            return Err(TubeTraceError::Plot("no samples to plot".into()));
        }
        let offsets: Vec<f64> = result
            .samples()
            .iter()
            .map(|sample| sample.offset().get::<millimeter>())
            .collect();
        let exit_angles: Vec<f64> = result
            .samples()
            .iter()
            .map(|sample| sample.exit_angle().get::<degree>())
            .collect();
        let ideal_angles: Vec<f64> = result
            .samples()
            .iter()
            .map(|sample| sample.ideal_angle().get::<degree>())
            .collect();
        let (x_range, y_range) = Self::axis_ranges(&offsets, &exit_angles, &ideal_angles);

        let root = SVGBackend::new(&self.path, self.fig_size).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| TubeTraceError::Plot(format!("filling the drawing area failed: {e}")))?;
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption("exit angle vs. lateral entry offset", ("sans-serif", 24))
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_range, y_range.clone())
            .map_err(|e| TubeTraceError::Plot(format!("building the chart failed: {e}")))?;
        chart
            .configure_mesh()
            .x_desc("L1 offset [mm]")
            .y_desc("angle [deg]")
            .draw()
            .map_err(|e| TubeTraceError::Plot(format!("drawing the chart mesh failed: {e}")))?;
        if let Some((low, high)) = result.valid_band() {
            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [
                        (low.get::<millimeter>(), y_range.start),
                        (high.get::<millimeter>(), y_range.end),
                    ],
                    BLUE.mix(0.15).filled(),
                )))
                .map_err(|e| {
                    TubeTraceError::Plot(format!("shading the tolerance band failed: {e}"))
                })?;
        }
        chart
            .draw_series(LineSeries::new(
                izip!(&offsets, &exit_angles).map(|(x, y)| (*x, *y)),
                &BLUE,
            ))
            .map_err(|e| TubeTraceError::Plot(format!("drawing the exit curve failed: {e}")))?
            .label("calculated")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));
        chart
            .draw_series(LineSeries::new(
                izip!(&offsets, &ideal_angles).map(|(x, y)| (*x, *y)),
                &RED,
            ))
            .map_err(|e| TubeTraceError::Plot(format!("drawing the ideal curve failed: {e}")))?
            .label("ideal")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(|e| TubeTraceError::Plot(format!("drawing the legend failed: {e}")))?;
        root.present()
            .map_err(|e| TubeTraceError::Plot(format!("writing the chart file failed: {e}")))
    }
    fn axis_ranges(
        offsets: &[f64],
        exit_angles: &[f64],
        ideal_angles: &[f64],
    ) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
        let x_min = offsets.iter().copied().fold(f64::INFINITY, f64::min);
        let x_max = offsets.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let y_min = exit_angles
            .iter()
            .chain(ideal_angles)
            .copied()
            .fold(f64::INFINITY, f64::min);
        let y_max = exit_angles
            .iter()
            .chain(ideal_angles)
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let y_pad = ((y_max - y_min) * 0.05).max(0.5);
        (
            (x_min - 0.05)..(x_max + 0.05),
            (y_min - y_pad)..(y_max + y_pad),
        )
    }
}
