//! Region statistics over rectangular sub-regions of the sample grid.
//!
//! Rectangles are given in real data-space coordinates and may have negative
//! extents (a box dragged up or to the left). They are normalized, expanded
//! outward to whole samples (low edges floored, high edges ceiled) and
//! clipped to the grid. A rectangle that ends up covering no sample yields
//! `None` rather than an error.

use ndarray::{Array2, s};

/// Integer position of a sample in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SamplePos {
    pub col: usize,
    pub row: usize,
}

impl SamplePos {
    pub fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    /// Centre of the sample cell in data space.
    pub fn center(&self) -> (f32, f32) {
        (self.col as f32 + 0.5, self.row as f32 + 0.5)
    }
}

/// Half-open range of sample columns and rows covered by a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleRect {
    pub col_start: usize,
    pub col_end: usize,
    pub row_start: usize,
    pub row_end: usize,
}

impl SampleRect {
    /// Convert a real-valued rectangle into the samples it touches.
    ///
    /// Returns `None` when the clipped rectangle is empty or any coordinate
    /// is not finite.
    pub fn covering(
        data: &Array2<f32>,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Option<SampleRect> {
        if ![x, y, width, height].iter().all(|v| v.is_finite()) {
            return None;
        }

        let (rows, cols) = data.dim();
        let span = |start: f32, extent: f32, limit: usize| {
            let (lo, hi) = (start.min(start + extent), start.max(start + extent));
            let limit = limit as f32;
            let lo = lo.floor().clamp(0.0, limit) as usize;
            let hi = hi.ceil().clamp(0.0, limit) as usize;
            (lo, hi)
        };

        let (col_start, col_end) = span(x, width, cols);
        let (row_start, row_end) = span(y, height, rows);

        (col_start < col_end && row_start < row_end).then_some(SampleRect {
            col_start,
            col_end,
            row_start,
            row_end,
        })
    }

    pub fn len(&self) -> usize {
        (self.col_end - self.col_start) * (self.row_end - self.row_start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Minimum and maximum of a region and where they occur.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extrema {
    pub min: f32,
    pub min_pos: SamplePos,
    pub max: f32,
    pub max_pos: SamplePos,
}

/// Full statistics of a region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionStats {
    pub min: f32,
    pub min_pos: SamplePos,
    pub max: f32,
    pub max_pos: SamplePos,
    pub mean: f32,
}

fn extrema_in(data: &Array2<f32>, rect: SampleRect) -> Option<Extrema> {
    let view = data.slice(s![rect.row_start..rect.row_end, rect.col_start..rect.col_end]);
    let to_pos = |(r, c): (usize, usize)| SamplePos::new(rect.col_start + c, rect.row_start + r);

    let mut cells = view.indexed_iter();
    let (first_idx, &first) = cells.next()?;
    let mut found = Extrema {
        min: first,
        min_pos: to_pos(first_idx),
        max: first,
        max_pos: to_pos(first_idx),
    };

    // Strict comparisons keep the first cell in row-major order on ties
    for (idx, &value) in cells {
        if value < found.min {
            found.min = value;
            found.min_pos = to_pos(idx);
        }
        if value > found.max {
            found.max = value;
            found.max_pos = to_pos(idx);
        }
    }

    Some(found)
}

fn mean_in(data: &Array2<f32>, rect: SampleRect) -> Option<f32> {
    let view = data.slice(s![rect.row_start..rect.row_end, rect.col_start..rect.col_end]);
    let count = view.len();
    if count == 0 {
        return None;
    }
    let sum: f64 = view.iter().map(|&v| f64::from(v)).sum();
    Some((sum / count as f64) as f32)
}

/// Minimum and maximum values of a rectangle with their sample positions.
pub fn extrema_and_positions(
    data: &Array2<f32>,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
) -> Option<Extrema> {
    let rect = SampleRect::covering(data, x, y, width, height)?;
    extrema_in(data, rect)
}

/// Arithmetic mean of a rectangle.
pub fn mean(data: &Array2<f32>, x: f32, y: f32, width: f32, height: f32) -> Option<f32> {
    let rect = SampleRect::covering(data, x, y, width, height)?;
    mean_in(data, rect)
}

/// Extrema and mean in one pass over the bounds computation.
pub fn region_stats(
    data: &Array2<f32>,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
) -> Option<RegionStats> {
    let rect = SampleRect::covering(data, x, y, width, height)?;
    let Extrema {
        min,
        min_pos,
        max,
        max_pos,
    } = extrema_in(data, rect)?;
    let mean = mean_in(data, rect)?;
    Some(RegionStats {
        min,
        min_pos,
        max,
        max_pos,
        mean,
    })
}
