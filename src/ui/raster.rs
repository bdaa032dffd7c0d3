//! Fixed-depth scrolling history of power rows, newest first.

use super::axis::AxisRanges;
use crate::dsp::PowerRow;
use std::collections::VecDeque;

#[derive(Debug, Clone, Default)]
pub struct RasterGrid {
    rows: VecDeque<PowerRow>,
}

impl RasterGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut grid = Self::new();
        grid.set_capacity(capacity);
        grid
    }

    /// Resizes to exactly `capacity` rows: shrinking drops the oldest rows,
    /// growing repeats the newest row at the head.
    pub fn set_capacity(&mut self, capacity: usize) {
        if self.rows.is_empty() {
            self.rows.push_front(PowerRow::placeholder());
        }
        while self.rows.len() > capacity {
            self.rows.pop_back();
        }
        while self.rows.len() < capacity {
            let Some(newest) = self.rows.front().cloned() else {
                break;
            };
            self.rows.push_front(newest);
        }
    }

    /// Pushes `row` as the newest entry and evicts the oldest.
    pub fn append(&mut self, row: PowerRow) {
        self.rows.push_front(row);
        self.rows.pop_back();
    }

    /// Visible depth; always the last capacity set.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Row `age` steps back from the newest.
    pub fn row(&self, age: usize) -> Option<&PowerRow> {
        self.rows.get(age)
    }

    /// Value at normalised coordinates, each clamped to [0, 1].
    pub fn sample_normalized(&self, norm_x: f64, norm_y: f64) -> Option<f64> {
        let row = self.rows.get(scale_index(norm_y, self.rows.len()))?;
        row.values()
            .get(scale_index(norm_x, row.len()))
            .copied()
    }

    /// Value at axis coordinates (frequency in display units, age in display time units).
    pub fn sample(&self, x: f64, y: f64, ranges: &AxisRanges) -> Option<f64> {
        self.sample_normalized(
            ranges.x_interval().normalize(x),
            ranges.y_interval().normalize(y),
        )
    }
}

/// Nearest index below `norm * (len - 1)`, clamping `norm` to [0, 1].
pub(crate) fn scale_index(norm: f64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let norm = if norm.is_nan() { 0.0 } else { norm.clamp(0.0, 1.0) };
    ((norm * (len - 1) as f64).floor() as usize).min(len - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn row(values: &[f64]) -> PowerRow {
        PowerRow::new(Instant::now(), values.to_vec())
    }

    fn first_column(grid: &RasterGrid) -> Vec<f64> {
        (0..grid.len())
            .filter_map(|age| grid.row(age))
            .map(|r| r.values()[0])
            .collect()
    }

    #[test]
    fn capacity_invariant_holds_across_operations() {
        let mut grid = RasterGrid::new();
        let ops: &[(bool, usize)] = &[
            (true, 4),
            (false, 0),
            (false, 0),
            (true, 2),
            (false, 0),
            (true, 7),
            (true, 0),
            (false, 0),
            (true, 3),
            (false, 0),
        ];
        let mut expected = 0;
        for &(resize, capacity) in ops {
            if resize {
                grid.set_capacity(capacity);
                expected = capacity;
            } else {
                grid.append(row(&[1.0, 2.0]));
            }
            assert_eq!(grid.len(), expected);
        }
        assert_eq!(grid.len(), 3);
    }

    #[test]
    fn empty_grid_is_seeded_with_placeholder() {
        let grid = RasterGrid::with_capacity(3);
        assert_eq!(grid.len(), 3);
        assert_eq!(first_column(&grid), vec![0.0; 3]);
        assert_eq!(grid.row(0).map(PowerRow::len), Some(1));
    }

    #[test]
    fn newest_row_is_sampled_at_age_zero() {
        let mut grid = RasterGrid::with_capacity(4);
        grid.append(row(&[1.0, 1.0]));
        grid.append(row(&[2.0, 2.0]));

        let newest = 0.0;
        let one_back = 1.0 / 3.0 + 1e-9;
        assert_eq!(grid.sample_normalized(0.0, newest), Some(2.0));
        assert_eq!(grid.sample_normalized(0.0, one_back), Some(1.0));
        assert_eq!(grid.row(1).map(|r| r.values()[0]), Some(1.0));
    }

    #[test]
    fn shrinking_drops_oldest_and_growing_repeats_newest() {
        let mut grid = RasterGrid::with_capacity(3);
        grid.append(row(&[1.0]));
        grid.append(row(&[2.0]));
        grid.append(row(&[3.0]));

        grid.set_capacity(2);
        assert_eq!(first_column(&grid), vec![3.0, 2.0]);

        grid.set_capacity(4);
        assert_eq!(first_column(&grid), vec![3.0, 3.0, 3.0, 2.0]);
    }

    #[test]
    fn sampling_maps_axis_coordinates_and_clamps() {
        let ranges = AxisRanges::new(8.0, 10.0);
        let mut grid = RasterGrid::with_capacity(2);
        grid.append(row(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]));

        assert_eq!(grid.sample(-4.0, 0.0, &ranges), Some(0.0));
        assert_eq!(grid.sample(0.0, 0.0, &ranges), Some(3.0));
        assert_eq!(grid.sample(4.0, 0.0, &ranges), Some(7.0));
        assert_eq!(grid.sample(400.0, -3.0, &ranges), Some(7.0));
        assert_eq!(grid.sample(-400.0, 0.0, &ranges), Some(0.0));
        // oldest row is still the placeholder
        assert_eq!(grid.sample(4.0, 10.0, &ranges), Some(0.0));
    }

    #[test]
    fn zero_capacity_samples_nothing() {
        let mut grid = RasterGrid::with_capacity(0);
        grid.append(row(&[1.0]));
        assert_eq!(grid.len(), 0);
        assert!(grid.row(0).is_none());
        assert_eq!(grid.sample_normalized(0.5, 0.5), None);
    }

    #[test]
    fn negative_infinity_passes_through() {
        let mut grid = RasterGrid::with_capacity(1);
        grid.append(row(&[f64::NEG_INFINITY]));
        assert_eq!(grid.sample_normalized(0.0, 0.0), Some(f64::NEG_INFINITY));
    }
}
