//! Terminal renderer
//!
//! Draws any subset of four panels from a frame: the 2-D reflection map with
//! the probe trace, the centre-row sweep, and two reflection gauges (full
//! scale and zoomed). Panel visibility never touches the engine.

use std::fmt::Write;

use tune_core::engine::contour_levels;
use tune_core::Frame;

const MAP_WIDTH: usize = 61;
const MAP_HEIGHT: usize = 31;
const SWEEP_HEIGHT: usize = 12;
const GAUGE_WIDTH: usize = 50;

/// Dense = well matched, blank = fully reflected; one glyph per contour band.
const RAMP: [char; 11] = ['@', '%', '#', '*', '+', '=', '-', ':', '.', ' ', ' '];

/// Y range of the sweep and full-scale gauge
const FULL_SCALE: (f64, f64) = (-0.1, 1.1);
/// Y range of the zoomed gauge
const ZOOM_SCALE: (f64, f64) = (-0.1, 0.3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Panel {
    /// 2-D reflection map with probe trace
    Map,
    /// Centre-row sweep
    Sweep,
    /// Reflection gauge, full scale
    Large,
    /// Reflection gauge, zoomed near zero
    Small,
}

impl std::str::FromStr for Panel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Panel as clap::ValueEnum>::from_str(s.trim(), true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelSet {
    pub map: bool,
    pub sweep: bool,
    pub large: bool,
    pub small: bool,
}

impl Default for PanelSet {
    fn default() -> Self {
        Self { map: true, sweep: true, large: true, small: true }
    }
}

impl PanelSet {
    pub fn only(panels: &[Panel]) -> Self {
        let mut set = Self { map: false, sweep: false, large: false, small: false };
        for panel in panels {
            set.set(*panel, true);
        }
        set
    }

    pub fn set(&mut self, panel: Panel, visible: bool) {
        match panel {
            Panel::Map => self.map = visible,
            Panel::Sweep => self.sweep = visible,
            Panel::Large => self.large = visible,
            Panel::Small => self.small = visible,
        }
    }

    pub fn toggle(&mut self, panel: Panel) {
        let visible = !self.is_visible(panel);
        self.set(panel, visible);
    }

    pub fn is_visible(&self, panel: Panel) -> bool {
        match panel {
            Panel::Map => self.map,
            Panel::Sweep => self.sweep,
            Panel::Large => self.large,
            Panel::Small => self.small,
        }
    }
}

pub fn render(frame: &Frame, panels: &PanelSet) -> String {
    let mut out = String::new();
    if panels.map {
        render_map(frame, &mut out);
    }
    if panels.sweep {
        render_sweep(frame, &mut out);
    }
    if panels.large {
        render_gauge(frame, "Reflection (L)", FULL_SCALE, &mut out);
    }
    if panels.small {
        render_gauge(frame, "Reflection (S)", ZOOM_SCALE, &mut out);
    }
    let _ = writeln!(
        out,
        "reflection {:.4}  best {:.4}  probe ({:.2}, {:.2})  T {:+} M {:+}",
        frame.center_reflection,
        frame.best_reflection,
        frame.probe.0,
        frame.probe.1,
        frame.tuning_offset,
        frame.matching_offset,
    );
    out
}

fn shade(value: f64) -> char {
    let levels = contour_levels(RAMP.len());
    let band = levels.iter().take_while(|level| value >= **level).count().max(1) - 1;
    RAMP[band.min(RAMP.len() - 1)]
}

/// Column/row index of plane coordinate `v` on an axis of `cells` cells
fn to_cell(v: f64, half_extent: f64, cells: usize) -> Option<usize> {
    let t = (v + half_extent) / (2.0 * half_extent);
    let i = (t * (cells - 1) as f64).round();
    (i >= 0.0 && i < cells as f64).then_some(i as usize)
}

fn from_cell(i: usize, half_extent: f64, cells: usize) -> f64 {
    -half_extent + 2.0 * half_extent * i as f64 / (cells - 1) as f64
}

fn render_map(frame: &Frame, out: &mut String) {
    let s = frame.axis().last().copied().unwrap_or(0.0);
    if s <= 0.0 {
        return;
    }

    let mut canvas = vec![vec![' '; MAP_WIDTH]; MAP_HEIGHT];
    for (r, line) in canvas.iter_mut().enumerate() {
        // top row is +S
        let y = from_cell(MAP_HEIGHT - 1 - r, s, MAP_HEIGHT);
        for (c, cell) in line.iter_mut().enumerate() {
            let x = from_cell(c, s, MAP_WIDTH);
            *cell = frame.grid.value_at(x, y).map(shade).unwrap_or(' ');
            if *cell == ' ' {
                if r == MAP_HEIGHT / 2 {
                    *cell = '-';
                } else if c == MAP_WIDTH / 2 {
                    *cell = ':';
                }
            }
        }
    }

    let mut plot = |pos: (f64, f64), glyph: char| {
        if let (Some(c), Some(r)) = (to_cell(pos.0, s, MAP_WIDTH), to_cell(pos.1, s, MAP_HEIGHT)) {
            canvas[MAP_HEIGHT - 1 - r][c] = glyph;
        }
    };
    for pos in &frame.trace {
        plot(*pos, 'o');
    }
    plot(frame.probe, 'X');

    let _ = writeln!(out, "2D Map");
    for line in canvas {
        let _ = writeln!(out, "|{}|", line.into_iter().collect::<String>());
    }
}

fn render_sweep(frame: &Frame, out: &mut String) {
    let sweep = frame.sweep();
    if sweep.is_empty() {
        return;
    }

    let (lo, hi) = FULL_SCALE;
    let to_row = |v: f64| -> usize {
        let t = ((v - lo) / (hi - lo)).clamp(0.0, 1.0);
        SWEEP_HEIGHT - 1 - (t * (SWEEP_HEIGHT - 1) as f64).round() as usize
    };

    let mut canvas = vec![vec![' '; MAP_WIDTH]; SWEEP_HEIGHT];
    for (c, column) in (0..MAP_WIDTH).map(|c| (c, c * (sweep.len() - 1) / (MAP_WIDTH - 1))) {
        canvas[to_row(sweep[column])][c] = '*';
    }
    let mid = MAP_WIDTH / 2;
    canvas[to_row(frame.best_reflection)][mid] = 'B';
    canvas[to_row(frame.center_reflection)][mid] = 'R';

    let _ = writeln!(out, "Sweep");
    for line in canvas {
        let _ = writeln!(out, "|{}|", line.into_iter().collect::<String>());
    }
}

fn render_gauge(frame: &Frame, title: &str, (lo, hi): (f64, f64), out: &mut String) {
    let to_col = |v: f64| -> usize {
        let t = ((v - lo) / (hi - lo)).clamp(0.0, 1.0);
        (t * (GAUGE_WIDTH - 1) as f64).round() as usize
    };

    let mut bar = vec!['-'; GAUGE_WIDTH];
    bar[to_col(frame.best_reflection)] = 'B';
    bar[to_col(frame.center_reflection)] = 'R';

    let _ = writeln!(
        out,
        "{title:<15} {lo:>5.2} [{}] {hi:.2}",
        bar.into_iter().collect::<String>()
    );
}
