//! Moving point lights ("cars") travelling along street lanes.

use cityscape_layout::Axis;
use glam::Vec3;
use rand::Rng;
use serde::Serialize;

/// The four lane orientations. Each street carries two lanes per axis,
/// placed at 1/4 and 3/4 of the street width so opposing traffic never overlaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum LaneDirection {
    /// Along an X-running street toward +X.
    PosX,
    /// Along an X-running street toward -X.
    NegX,
    /// Along a Z-running street, deeper into the city (toward -Z).
    PosZ,
    /// Along a Z-running street, back toward the city edge (toward +Z).
    NegZ,
}

impl LaneDirection {
    pub const ALL: [Self; 4] = [Self::PosX, Self::NegX, Self::PosZ, Self::NegZ];

    pub fn axis(self) -> Axis {
        match self {
            Self::PosX | Self::NegX => Axis::X,
            Self::PosZ | Self::NegZ => Axis::Z,
        }
    }

    /// Sign of the world-space coordinate change per tick.
    pub fn sign(self) -> f32 {
        match self {
            Self::PosX | Self::NegZ => 1.0,
            Self::NegX | Self::PosZ => -1.0,
        }
    }

    /// Lane offset across the street, as a fraction of the street width.
    pub fn lane_fraction(self) -> f32 {
        match self {
            Self::PosX | Self::PosZ => 0.25,
            Self::NegX | Self::NegZ => 0.75,
        }
    }

    /// World-space `(lo, hi)` range of the lane axis coordinate.
    pub fn lane_range(self, lane_length: f32) -> (f32, f32) {
        match self.axis() {
            Axis::X => (0.0, lane_length),
            Axis::Z => (-lane_length, 0.0),
        }
    }

    fn index(self) -> usize {
        match self {
            Self::PosX => 0,
            Self::NegX => 1,
            Self::PosZ => 2,
            Self::NegZ => 3,
        }
    }
}

/// A single moving light. Only `position` changes after creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LightActor {
    pub direction: LaneDirection,
    /// Street number, `1..repeat_count`; street `k` lies after the `k`-th row/column of cells.
    pub street: u32,
    /// Fixed world coordinate across the lane (Z for X lanes, X for Z lanes).
    pub lane_coord: f32,
    /// World coordinate along the lane axis.
    pub position: f32,
}

impl LightActor {
    /// Place an actor on `street` at `travelled` units from the lane start.
    pub fn new(
        direction: LaneDirection,
        street: u32,
        travelled: f32,
        cell_size: f32,
        street_width: f32,
    ) -> Self {
        let k = street as f32;
        let cross = k * cell_size + (k - 1.0) * street_width + direction.lane_fraction() * street_width;
        let (lane_coord, position) = match direction.axis() {
            Axis::X => (-cross, travelled),
            Axis::Z => (cross, -travelled),
        };
        Self {
            direction,
            street,
            lane_coord,
            position,
        }
    }

    /// Position in world space, floating `height` above the street.
    pub fn world_position(&self, height: f32) -> Vec3 {
        match self.direction.axis() {
            Axis::X => Vec3::new(self.position, height, self.lane_coord),
            Axis::Z => Vec3::new(self.lane_coord, height, self.position),
        }
    }

    pub fn advance(&mut self, speed: f32, lane_length: f32) {
        advance(self, speed, lane_length);
    }
}

/// Move an actor one tick along its lane.
///
/// An actor that would step past the end of its lane jumps straight back to
/// the start; the overshoot is dropped.
pub fn advance(actor: &mut LightActor, speed: f32, lane_length: f32) {
    let sign = actor.direction.sign();
    let (lo, hi) = actor.direction.lane_range(lane_length);
    let next = actor.position + sign * speed;
    actor.position = if sign > 0.0 && next > hi {
        lo
    } else if sign < 0.0 && next < lo {
        hi
    } else {
        next
    };
}

/// All light actors, in four collections keyed by lane direction.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LightSet {
    lanes: [Vec<LightActor>; 4],
    lane_length: f32,
}

impl LightSet {
    pub fn new(lane_length: f32) -> Self {
        Self {
            lanes: Default::default(),
            lane_length,
        }
    }

    pub fn lane_length(&self) -> f32 {
        self.lane_length
    }

    pub fn push(&mut self, actor: LightActor) {
        self.lanes[actor.direction.index()].push(actor);
    }

    /// Actors travelling in one direction.
    pub fn lane(&self, direction: LaneDirection) -> &[LightActor] {
        &self.lanes[direction.index()]
    }

    /// Every actor, grouped by direction in [`LaneDirection::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = &LightActor> {
        self.lanes.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.lanes.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of actors per direction.
    pub fn counts(&self) -> [(LaneDirection, usize); 4] {
        LaneDirection::ALL.map(|d| (d, self.lane(d).len()))
    }

    /// Advance every actor by one tick.
    pub fn advance_all(&mut self, speed: f32) {
        let lane_length = self.lane_length;
        for actor in self.lanes.iter_mut().flatten() {
            advance(actor, speed, lane_length);
        }
    }
}

/// Create `count` actors on random streets, lanes and starting positions.
///
/// Each actor draws its street, then its direction, then its starting
/// distance along the lane. A city with a single cell has no streets, so
/// the result is empty.
pub fn create_lights<R: Rng + ?Sized>(
    count: u32,
    repeat_count: u32,
    cell_size: f32,
    street_width: f32,
    rng: &mut R,
) -> LightSet {
    let n = repeat_count as f32;
    let lane_length = n * cell_size + (n - 1.0).max(0.0) * street_width;
    let mut set = LightSet::new(lane_length);

    if repeat_count < 2 {
        if count > 0 {
            tracing::warn!(count, repeat_count, "city has no streets, no lights created");
        }
        return set;
    }

    let max_travel = lane_length.floor() as u32;
    for _ in 0..count {
        let street = rng.gen_range(1..repeat_count);
        let direction = LaneDirection::ALL[rng.gen_range(0..LaneDirection::ALL.len())];
        let travelled = rng.gen_range(0..=max_travel) as f32;
        set.push(LightActor::new(direction, street, travelled, cell_size, street_width));
    }

    tracing::debug!(
        lights = set.len(),
        pos_x = set.lane(LaneDirection::PosX).len(),
        neg_x = set.lane(LaneDirection::NegX).len(),
        pos_z = set.lane(LaneDirection::PosZ).len(),
        neg_z = set.lane(LaneDirection::NegZ).len(),
        "lights created"
    );
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const CELL: f32 = 200.0;
    const STREET: f32 = 20.0;

    fn lane_length(n: u32) -> f32 {
        n as f32 * CELL + (n - 1) as f32 * STREET
    }

    #[test]
    fn pos_x_wraps_to_start() {
        let l = lane_length(3);
        let mut actor = LightActor::new(LaneDirection::PosX, 1, l - 1.0, CELL, STREET);
        actor.advance(3.0, l);
        assert_eq!(actor.position, 0.0);
    }

    #[test]
    fn pos_x_may_land_on_end() {
        let l = lane_length(3);
        let mut actor = LightActor::new(LaneDirection::PosX, 1, l - 3.0, CELL, STREET);
        actor.advance(3.0, l);
        assert_eq!(actor.position, l);
        actor.advance(3.0, l);
        assert_eq!(actor.position, 0.0);
    }

    #[test]
    fn neg_x_wraps_to_end() {
        let l = lane_length(3);
        let mut actor = LightActor::new(LaneDirection::NegX, 2, 1.0, CELL, STREET);
        actor.advance(3.0, l);
        assert_eq!(actor.position, l);
    }

    #[test]
    fn pos_z_moves_into_city_and_wraps() {
        let l = lane_length(3);
        let mut actor = LightActor::new(LaneDirection::PosZ, 1, 10.0, CELL, STREET);
        assert_eq!(actor.position, -10.0);
        actor.advance(3.0, l);
        assert_eq!(actor.position, -13.0);

        let mut actor = LightActor::new(LaneDirection::PosZ, 1, l - 1.0, CELL, STREET);
        actor.advance(3.0, l);
        assert_eq!(actor.position, 0.0);
    }

    #[test]
    fn neg_z_wraps_to_far_end() {
        let l = lane_length(3);
        let mut actor = LightActor::new(LaneDirection::NegZ, 1, 1.0, CELL, STREET);
        actor.advance(3.0, l);
        assert_eq!(actor.position, -l);
    }

    #[test]
    fn lanes_sit_inside_their_street() {
        // Street 1 spans 200..220 on the cross axis.
        let x = LightActor::new(LaneDirection::PosX, 1, 0.0, CELL, STREET);
        let xn = LightActor::new(LaneDirection::NegX, 1, 0.0, CELL, STREET);
        let z = LightActor::new(LaneDirection::PosZ, 1, 0.0, CELL, STREET);
        let zn = LightActor::new(LaneDirection::NegZ, 1, 0.0, CELL, STREET);
        assert_eq!(x.lane_coord, -205.0);
        assert_eq!(xn.lane_coord, -215.0);
        assert_eq!(z.lane_coord, 205.0);
        assert_eq!(zn.lane_coord, 215.0);

        // Street 2 spans 420..440.
        let z2 = LightActor::new(LaneDirection::NegZ, 2, 0.0, CELL, STREET);
        assert_eq!(z2.lane_coord, 435.0);
    }

    #[test]
    fn world_position_maps_axes() {
        let x = LightActor::new(LaneDirection::PosX, 1, 50.0, CELL, STREET);
        assert_eq!(x.world_position(8.0), Vec3::new(50.0, 8.0, -205.0));
        let z = LightActor::new(LaneDirection::NegZ, 1, 50.0, CELL, STREET);
        assert_eq!(z.world_position(8.0), Vec3::new(215.0, 8.0, -50.0));
    }

    #[test]
    fn create_lights_counts_and_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let set = create_lights(500, 20, CELL, STREET, &mut rng);
        assert_eq!(set.len(), 500);
        assert_eq!(set.lane_length(), lane_length(20));

        for actor in set.iter() {
            assert!((1..20).contains(&actor.street));
            let (lo, hi) = actor.direction.lane_range(set.lane_length());
            assert!((lo..=hi).contains(&actor.position));
            assert_eq!(actor.position.fract(), 0.0);
        }
        for (direction, count) in set.counts() {
            assert!(count > 0, "no actors in {direction:?}");
            assert!(set.lane(direction).iter().all(|a| a.direction == direction));
        }
    }

    #[test]
    fn single_cell_city_has_no_lights() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let set = create_lights(50, 1, CELL, STREET, &mut rng);
        assert!(set.is_empty());
        assert_eq!(set.lane_length(), CELL);
    }

    #[test]
    fn positions_stay_in_range_over_many_ticks() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut set = create_lights(200, 4, CELL, STREET, &mut rng);
        for _ in 0..5_000 {
            set.advance_all(7.5);
            for actor in set.iter() {
                let (lo, hi) = actor.direction.lane_range(set.lane_length());
                assert!(
                    (lo..=hi).contains(&actor.position),
                    "{actor:?} left [{lo}, {hi}]"
                );
            }
        }
    }

    #[test]
    fn advance_all_keeps_cross_axis_fixed() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut set = create_lights(64, 3, CELL, STREET, &mut rng);
        let before: Vec<f32> = set.iter().map(|a| a.lane_coord).collect();
        set.advance_all(3.0);
        let after: Vec<f32> = set.iter().map(|a| a.lane_coord).collect();
        assert_eq!(before, after);
    }
}
