use cityscape_kernel::{CityWorld, LaneDirection};
use cityscape_layout::{CellBlocks, CityMap};
use serde::Serialize;

/// Read-only queries over a generated city and its world state, for the
/// CLI and the desktop HUD.
pub struct CityInspector;

impl CityInspector {
    pub fn summary(map: &CityMap, blocks: &[CellBlocks], world: &CityWorld) -> CitySummary {
        let lights = world.lights();
        CitySummary {
            repeat_count: map.repeat_count,
            total_size: map.total_size,
            cells: map.cells.len(),
            streets: map.street_count(),
            buildings: blocks.iter().map(|c| c.blocks.len()).sum(),
            tallest_building: Self::tallest_building(blocks),
            lights: lights.len(),
            lanes: lights
                .counts()
                .map(|(direction, count)| LaneCount { direction, count })
                .to_vec(),
            tick: world.tick(),
            light_direction: world.light_direction(),
            state_hash: world.state_hash(),
        }
    }

    /// Height of the tallest block in the city, 0 when there are none.
    pub fn tallest_building(blocks: &[CellBlocks]) -> f32 {
        blocks
            .iter()
            .flat_map(|c| c.blocks.iter())
            .map(|b| b.height)
            .fold(0.0, f32::max)
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct LaneCount {
    pub direction: LaneDirection,
    pub count: usize,
}

/// Snapshot of a city for display.
#[derive(Debug, Clone, Serialize)]
pub struct CitySummary {
    pub repeat_count: u32,
    pub total_size: f32,
    pub cells: usize,
    pub streets: usize,
    pub buildings: usize,
    pub tallest_building: f32,
    pub lights: usize,
    pub lanes: Vec<LaneCount>,
    pub tick: u64,
    pub light_direction: f32,
    pub state_hash: u64,
}

impl std::fmt::Display for CitySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "City: {n}x{n} cells={} streets={} size={:.1}",
            self.cells,
            self.streets,
            self.total_size,
            n = self.repeat_count
        )?;
        writeln!(
            f,
            "Buildings: {} tallest={:.1}",
            self.buildings, self.tallest_building
        )?;
        write!(f, "Lights: {}", self.lights)?;
        for lane in &self.lanes {
            write!(f, " {:?}={}", lane.direction, lane.count)?;
        }
        writeln!(f)?;
        write!(
            f,
            "World: tick={} light_dir={:.3} hash={:016x}",
            self.tick, self.light_direction, self.state_hash
        )
    }
}

impl CitySummary {
    pub fn lane(&self, direction: LaneDirection) -> usize {
        self.lanes
            .iter()
            .find(|l| l.direction == direction)
            .map_or(0, |l| l.count)
    }
}
