use glam::Vec3;
use serde::Serialize;

/// Height of the street surface above the ground plane, so streets draw on top of cells.
pub const STREET_ELEVATION: f32 = 0.1;

/// One square of the city footprint.
///
/// The origin is the cell's near-left corner; the cell spans
/// `origin.x..origin.x + size` on X and `origin.z - size..origin.z` on Z
/// (the city grows toward negative Z).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
    pub origin: Vec3,
}

/// Horizontal axis a street runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Axis {
    X,
    Z,
}

/// A flat street rectangle, spanning `origin.x..origin.x + width` and
/// `origin.z - depth..origin.z`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Street {
    pub axis: Axis,
    pub origin: Vec3,
    pub width: f32,
    pub depth: f32,
}

/// The partitioned city: cells in row-major order plus the overall extent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityMap {
    pub repeat_count: u32,
    pub cell_size: f32,
    pub street_width: f32,
    pub cells: Vec<Cell>,
    /// Side length of the whole city on both X and Z.
    pub total_size: f32,
}

/// Partition the city into `repeat_count²` cells separated by streets.
///
/// Cell (row, col) sits at `(col * pitch, 0, -(row * pitch))` where
/// `pitch = cell_size + street_width`.
pub fn generate_map(repeat_count: u32, cell_size: f32, street_width: f32) -> CityMap {
    let _span = tracing::info_span!("generate_map", repeat_count).entered();

    let pitch = cell_size + street_width;
    let cells: Vec<Cell> = (0..repeat_count)
        .flat_map(|row| {
            (0..repeat_count).map(move |col| Cell {
                row,
                col,
                origin: Vec3::new(col as f32 * pitch, 0.0, -(row as f32 * pitch)),
            })
        })
        .collect();

    let n = repeat_count as f32;
    let total_size = n * cell_size + (n - 1.0).max(0.0) * street_width;

    tracing::debug!(cells = cells.len(), total_size, "map generated");

    CityMap {
        repeat_count,
        cell_size,
        street_width,
        cells,
        total_size,
    }
}

impl CityMap {
    /// Cell at the given grid position, if it exists.
    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        if row >= self.repeat_count || col >= self.repeat_count {
            return None;
        }
        self.cells
            .get(row as usize * self.repeat_count as usize + col as usize)
    }

    /// Number of street rectangles: one per axis between each pair of adjacent rows/cols.
    pub fn street_count(&self) -> usize {
        2 * self.repeat_count.saturating_sub(1) as usize
    }

    /// Street rectangles, a Z-running and an X-running street per gap.
    pub fn streets(&self) -> Vec<Street> {
        let mut streets = Vec::with_capacity(self.street_count());
        for i in 0..self.repeat_count.saturating_sub(1) {
            let offset = (i + 1) as f32 * self.cell_size + i as f32 * self.street_width;
            streets.push(Street {
                axis: Axis::Z,
                origin: Vec3::new(offset, STREET_ELEVATION, 0.0),
                width: self.street_width,
                depth: self.total_size,
            });
            streets.push(Street {
                axis: Axis::X,
                origin: Vec3::new(0.0, STREET_ELEVATION, -offset),
                width: self.total_size,
                depth: self.street_width,
            });
        }
        streets
    }

    /// Translation that centres the city on the world origin.
    pub fn center_offset(&self) -> Vec3 {
        Vec3::new(-self.total_size / 2.0, 0.0, self.total_size / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Axis-aligned XZ rectangle as (min_x, max_x, min_z, max_z).
    fn cell_rect(cell: &Cell, size: f32) -> (f32, f32, f32, f32) {
        (
            cell.origin.x,
            cell.origin.x + size,
            cell.origin.z - size,
            cell.origin.z,
        )
    }

    fn overlaps(a: (f32, f32, f32, f32), b: (f32, f32, f32, f32)) -> bool {
        a.0 < b.1 && b.0 < a.1 && a.2 < b.3 && b.2 < a.3
    }

    #[test]
    fn single_cell_city() {
        let map = generate_map(1, 200.0, 20.0);
        assert_eq!(map.cells.len(), 1);
        assert_eq!(map.total_size, 200.0);
        assert_eq!(map.street_count(), 0);
        assert!(map.streets().is_empty());
    }

    #[test]
    fn three_by_three_city() {
        let map = generate_map(3, 200.0, 20.0);
        assert_eq!(map.cells.len(), 9);
        assert_eq!(map.total_size, 640.0);

        let streets = map.streets();
        assert_eq!(streets.len(), 4);
        assert_eq!(streets.iter().filter(|s| s.axis == Axis::X).count(), 2);
        assert_eq!(streets.iter().filter(|s| s.axis == Axis::Z).count(), 2);
    }

    #[test]
    fn cell_origins_follow_pitch() {
        let map = generate_map(4, 100.0, 10.0);
        let cell = map.cell(2, 3).unwrap();
        assert_eq!(cell.origin, Vec3::new(330.0, 0.0, -220.0));
        assert!(map.cell(4, 0).is_none());
    }

    #[test]
    fn lookup_past_u16_grid_does_not_overflow() {
        let map = generate_map(2, 10.0, 1.0);
        assert!(map.cell(70_000, 70_000).is_none());
        assert!(map.cell(u32::MAX, 1).is_none());
        assert_eq!(map.cell(1, 1).map(|c| (c.row, c.col)), Some((1, 1)));
    }

    #[test]
    fn row_major_order() {
        let map = generate_map(3, 50.0, 5.0);
        for (i, cell) in map.cells.iter().enumerate() {
            assert_eq!(cell.row, i as u32 / 3);
            assert_eq!(cell.col, i as u32 % 3);
        }
    }

    #[test]
    fn cells_do_not_overlap() {
        for &(n, size, street) in &[(2, 200.0, 20.0), (5, 37.5, 3.0), (7, 10.0, 1.0)] {
            let map = generate_map(n, size, street);
            for (i, a) in map.cells.iter().enumerate() {
                for b in &map.cells[i + 1..] {
                    assert!(
                        !overlaps(cell_rect(a, size), cell_rect(b, size)),
                        "cells {a:?} and {b:?} overlap"
                    );
                }
            }
        }
    }

    #[test]
    fn cells_and_streets_cover_city() {
        for &(n, c, s) in &[(1u32, 200.0f32, 20.0f32), (3, 200.0, 20.0), (6, 40.0, 7.0)] {
            let map = generate_map(n, c, s);
            let cell_area = map.cells.len() as f32 * c * c;
            let street_area: f32 = map.streets().iter().map(|st| st.width * st.depth).sum();
            // Crossing streets overlap in (n-1)² squares.
            let gaps = (n - 1) as f32;
            let street_union = street_area - gaps * gaps * s * s;
            let expected = map.total_size * map.total_size;
            assert!(
                ((cell_area + street_union) - expected).abs() < expected * 1e-5,
                "n={n}: {} != {expected}",
                cell_area + street_union
            );
        }
    }

    #[test]
    fn streets_sit_between_cells() {
        let map = generate_map(3, 200.0, 20.0);
        let z_streets: Vec<f32> = map
            .streets()
            .iter()
            .filter(|s| s.axis == Axis::Z)
            .map(|s| s.origin.x)
            .collect();
        assert_eq!(z_streets, vec![200.0, 420.0]);
        assert!(map.streets().iter().all(|s| s.origin.y == STREET_ELEVATION));
    }

    #[test]
    fn center_offset_centres_city() {
        let map = generate_map(3, 200.0, 20.0);
        assert_eq!(map.center_offset(), Vec3::new(-320.0, 0.0, 320.0));
    }
}
