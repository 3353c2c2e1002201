//! # Reflection Field
//!
//! Anisotropic peaked surface sampled on a square grid centred on the origin
//! of the tuning/matching plane.
//!
//! For a grid point `(gx, gy)` and probe `(xp, yp)`:
//!
//! ```text
//! w1  = primary_width
//! w2  = secondary_base + secondary_slope * |gy - yp|
//! u   =  cos(r) * dx + sin(r) * dy
//! v   = -sin(r) * dx + cos(r) * dy
//! raw = -1 / (w1 * w2 + u^2 / w1^2 + v^2 / w2^2)
//! ```
//!
//! `raw` is most negative at the probe itself. Dividing by the frozen peak
//! magnitude and adding one maps it to a reflection value in `[0, 1]`:
//! 0 exactly at the probe, approaching 1 far from it.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::config::FieldConfig;
use super::geometry::PlanePos;
use crate::error::{Result, TuningError};

/// Normalization constant of one reset epoch
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Normalization {
    /// No evaluation yet since construction/reset
    #[default]
    Unset,
    /// Peak magnitude captured on the first evaluation of the epoch
    Frozen(f64),
}

impl Normalization {
    pub fn is_frozen(&self) -> bool {
        matches!(self, Normalization::Frozen(_))
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Normalization::Unset => None,
            Normalization::Frozen(v) => Some(*v),
        }
    }

    /// Return the frozen value, computing and freezing it on first use.
    pub fn freeze_with(&mut self, compute: impl FnOnce() -> f64) -> f64 {
        match *self {
            Normalization::Frozen(v) => v,
            Normalization::Unset => {
                let v = compute();
                *self = Normalization::Frozen(v);
                v
            }
        }
    }
}

/// Secondary half-width at vertical offset `dy` from the probe
#[inline]
pub fn secondary_width(config: &FieldConfig, dy: f64) -> Result<f64> {
    let w2 = config.secondary_base + config.secondary_slope * dy.abs();
    if w2 > 0.0 {
        Ok(w2)
    } else {
        Err(TuningError::NonPositiveWidth(w2))
    }
}

/// Precomputed rotation of the peak axes
#[derive(Debug, Clone, Copy)]
struct Rotation {
    cos: f64,
    sin: f64,
}

impl Rotation {
    fn new(deg: f64) -> Self {
        let rad = deg.to_radians();
        Self { cos: rad.cos(), sin: rad.sin() }
    }
}

#[inline]
fn raw_with(config: &FieldConfig, rot: Rotation, w2: f64, dx: f64, dy: f64) -> f64 {
    let w1 = config.primary_width;
    let u = rot.cos * dx + rot.sin * dy;
    let v = -rot.sin * dx + rot.cos * dy;
    -1.0 / (w1 * w2 + u * u / (w1 * w1) + v * v / (w2 * w2))
}

/// Un-normalized field value at `(gx, gy)` for a probe at `probe`
pub fn raw_value(config: &FieldConfig, probe: PlanePos, gx: f64, gy: f64) -> Result<f64> {
    let dy = gy - probe.1;
    let w2 = secondary_width(config, dy)?;
    Ok(raw_with(config, Rotation::new(config.rotation_deg), w2, gx - probe.0, dy))
}

/// Map a raw value to a reflection value
#[inline]
pub fn normalize(raw: f64, normalization: f64) -> f64 {
    raw / normalization + 1.0
}

/// Evenly spaced contour levels on [0, 1]
pub fn contour_levels(count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![0.0],
        n => (0..n).map(|i| i as f64 / (n - 1) as f64).collect(),
    }
}

// ============================================
// Grid
// ============================================

/// Sampled reflection surface
///
/// Square grid; x and y share the same axis. Values are row-major with
/// row = y index and column = x index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectionGrid {
    axis: Vec<f64>,
    center: usize,
    step: f64,
    values: Vec<f64>,
}

impl ReflectionGrid {
    fn axis_for(config: &FieldConfig) -> (Vec<f64>, usize) {
        let c = config.center_index();
        let axis = (0..config.grid_size())
            .map(|i| (i as f64 - c as f64) * config.grid_step)
            .collect();
        (axis, c)
    }

    /// Samples per axis
    pub fn size(&self) -> usize {
        self.axis.len()
    }

    pub fn axis(&self) -> &[f64] {
        &self.axis
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Index of the (0, 0) sample on both axes
    pub fn center_index(&self) -> usize {
        self.center
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        let n = self.size();
        if row < n && col < n {
            Some(self.values[row * n + col])
        } else {
            None
        }
    }

    pub fn row(&self, row: usize) -> Option<&[f64]> {
        let n = self.size();
        (row < n).then(|| &self.values[row * n..(row + 1) * n])
    }

    /// Row through y = 0: the frequency sweep an operator sees
    pub fn center_row(&self) -> &[f64] {
        let n = self.size();
        &self.values[self.center * n..(self.center + 1) * n]
    }

    /// Value at (0, 0)
    pub fn center_value(&self) -> f64 {
        self.values[self.center * self.size() + self.center]
    }

    /// Nearest sample to `(gx, gy)`, `None` outside the plane
    pub fn value_at(&self, gx: f64, gy: f64) -> Option<f64> {
        let index = |g: f64| -> Option<usize> {
            let i = (g / self.step).round() + self.center as f64;
            (i >= 0.0 && i < self.size() as f64).then_some(i as usize)
        };
        let col = index(gx)?;
        let row = index(gy)?;
        self.value(row, col)
    }

    pub fn min_value(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max_value(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

// ============================================
// Evaluation
// ============================================

/// Evaluates the field for a probe position
///
/// Construction checks the widths once; with `primary_width > 0`,
/// `secondary_base > 0` and `secondary_slope >= 0` every sample has
/// `w2 > 0`, so evaluation itself cannot fail.
#[derive(Debug, Clone)]
pub struct ReflectionField {
    config: FieldConfig,
    rot: Rotation,
}

impl ReflectionField {
    pub fn new(config: FieldConfig) -> Result<Self> {
        if !(config.primary_width > 0.0) {
            return Err(TuningError::NonPositiveWidth(config.primary_width));
        }
        if !(config.secondary_base > 0.0) {
            return Err(TuningError::NonPositiveWidth(config.secondary_base));
        }
        if !(config.secondary_slope >= 0.0) {
            return Err(TuningError::InvalidConfig(format!(
                "secondary_slope must be >= 0, got {}",
                config.secondary_slope
            )));
        }
        let rot = Rotation::new(config.rotation_deg);
        Ok(Self { config, rot })
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    #[inline]
    fn width_at(&self, dy: f64) -> f64 {
        self.config.secondary_base + self.config.secondary_slope * dy.abs()
    }

    /// Raw (un-normalized) grid for a probe
    pub fn evaluate_raw(&self, probe: PlanePos) -> ReflectionGrid {
        let (axis, center) = ReflectionGrid::axis_for(&self.config);
        let n = axis.len();

        let mut values = vec![0.0; n * n];
        let fill_row = |(row, chunk): (usize, &mut [f64])| {
            let dy = axis[row] - probe.1;
            // w2 only depends on the row
            let w2 = self.width_at(dy);
            for (col, out) in chunk.iter_mut().enumerate() {
                *out = raw_with(&self.config, self.rot, w2, axis[col] - probe.0, dy);
            }
        };

        if n * n > self.config.parallel_threshold {
            tracing::trace!(cells = n * n, "evaluating field in parallel");
            values.par_chunks_mut(n).enumerate().for_each(fill_row);
        } else {
            values.chunks_mut(n).enumerate().for_each(fill_row);
        }

        ReflectionGrid { axis, center, step: self.config.grid_step, values }
    }

    /// Peak magnitude for normalization: the largest |raw| over the grid and
    /// the probe's own sample, which the grid misses when the probe sits
    /// between grid points.
    ///
    /// Note: a grid-only maximum is smaller for an off-grid probe, so outputs
    /// differ from grid-only normalization whenever the first origin of an
    /// epoch is not on a grid point. With the probe sample included the
    /// field stays in `[0, 1]` for the whole epoch.
    pub fn peak_magnitude(&self, raw: &ReflectionGrid) -> f64 {
        let at_probe = raw_with(&self.config, self.rot, self.width_at(0.0), 0.0, 0.0).abs();
        raw.values.iter().fold(at_probe, |acc, v| acc.max(v.abs()))
    }

    /// Normalize a raw grid in place
    pub fn normalize_grid(&self, grid: &mut ReflectionGrid, normalization: f64) {
        for v in grid.values.iter_mut() {
            *v = normalize(*v, normalization);
        }
    }

    /// Evaluate and normalize, freezing the normalization if unset.
    pub fn evaluate(&self, probe: PlanePos, normalization: &mut Normalization) -> ReflectionGrid {
        let mut grid = self.evaluate_raw(probe);
        let norm = normalization.freeze_with(|| {
            let peak = self.peak_magnitude(&grid);
            tracing::trace!(normalization = peak, "normalization frozen");
            peak
        });
        self.normalize_grid(&mut grid, norm);
        grid
    }
}
