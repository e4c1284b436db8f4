//! Metro movement logic
//!
//! A metro walks the segments of its path leg by leg. Each call to `update`
//! consumes simulation time until something needs the world's attention
//! (an arrival or the end of a dwell step) and hands back the leftover time.

use anyhow::{Context, Result};
use ordered_float::OrderedFloat;

use super::config::SimConfig;
use super::holder::PassengerHolder;
use super::path::{SegmentTraversal, SimPath};
use super::types::{MetroId, PassengerId, PathId, Point, StationId};

/// Longest slice of time integrated in one kinematic sub-step
pub const MAX_SUBSTEP_MS: f64 = 20.0;

/// What a metro is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetroState {
    /// Standing at a station, waiting for the world to decide whether to dwell
    Arrived,
    /// Stopped at a station with a boarding step in progress
    Dwelling,
    /// Moving along the current leg
    Running,
}

/// Result of a metro update indicating what the world should do next
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetroUpdateResult {
    /// All time was spent moving or dwelling
    Continue,
    /// Reached a station; the world decides between dwelling and passing through
    ArrivedAtStation {
        station: StationId,
        remaining_ms: f64,
    },
    /// A boarding step finished; the world moves one passenger
    DwellStepDue {
        station: StationId,
        remaining_ms: f64,
    },
}

/// A metro in the simulation
#[derive(Debug, Clone)]
pub struct SimMetro {
    pub id: MetroId,
    pub path_id: PathId,
    pub position: Point,
    pub speed: f32,
    pub passengers: Vec<PassengerId>,
    pub capacity: usize,
    pub stop_time_remaining_ms: f64,
    /// Station the metro stands at; `None` while moving
    pub current_station: Option<StationId>,
    pub state: MetroState,
    /// Index into the path's station list of the stop the metro stands at,
    /// or is heading to while running
    pub stop_index: usize,
    /// +1 towards the end of the station list, -1 towards its start
    pub direction: i8,
    /// Segments of the leg in progress
    pub leg: Vec<SegmentTraversal>,
    pub leg_position: usize,
    /// Distance covered on the current segment
    pub distance_along_segment: OrderedFloat<f32>,
    /// Whether the metro has completed at least one leg
    pub has_travelled: bool,
}

impl SimMetro {
    /// A metro standing at the first station of `path`
    pub fn new(id: MetroId, path: &SimPath, capacity: usize) -> Result<Self> {
        let first = path.first_station().context("Path has no stations")?;
        let segment = path.segments.first().context("Path has no segments")?;

        Ok(Self {
            id,
            path_id: path.id,
            position: segment.start,
            speed: 0.0,
            passengers: Vec::new(),
            capacity,
            stop_time_remaining_ms: 0.0,
            current_station: Some(first),
            state: MetroState::Arrived,
            stop_index: 0,
            direction: 1,
            leg: Vec::new(),
            leg_position: 0,
            distance_along_segment: OrderedFloat(0.0),
            has_travelled: false,
        })
    }

    /// The segment under the metro, if it is on a leg
    pub fn current_traversal(&self) -> Option<SegmentTraversal> {
        self.leg.get(self.leg_position).copied()
    }

    pub fn is_dwelling(&self) -> bool {
        self.state == MetroState::Dwelling
    }

    /// Station this metro will stop at after leaving its current one
    pub fn upcoming_station(&self, path: &SimPath) -> Option<StationId> {
        path.upcoming_station(self.stop_index, self.direction)
    }

    /// Stop here for `duration_ms` from standstill
    pub fn begin_dwell(&mut self, duration_ms: f64) {
        self.state = MetroState::Dwelling;
        self.stop_time_remaining_ms = duration_ms;
        self.speed = 0.0;
    }

    /// Leave the current station. `from_rest` is set after a dwell.
    pub fn depart(&mut self, path: &SimPath, from_rest: bool) -> Result<()> {
        let through = self.has_travelled;
        let (leg, next_index, next_direction) = path.leg(self.stop_index, self.direction, through)?;

        self.leg = leg;
        self.leg_position = 0;
        self.distance_along_segment = OrderedFloat(0.0);
        self.stop_index = next_index;
        self.direction = next_direction;
        self.current_station = None;
        self.stop_time_remaining_ms = 0.0;
        self.state = MetroState::Running;
        if from_rest {
            self.speed = 0.0;
        }
        Ok(())
    }

    /// Advance the metro by at most `delta_ms`
    pub fn update(
        &mut self,
        delta_ms: f64,
        path: &SimPath,
        config: &SimConfig,
    ) -> Result<MetroUpdateResult> {
        match self.state {
            MetroState::Arrived => {
                let station = self
                    .current_station
                    .context("Arrived metro has no current station")?;
                Ok(MetroUpdateResult::ArrivedAtStation {
                    station,
                    remaining_ms: delta_ms,
                })
            }
            MetroState::Dwelling => {
                let station = self
                    .current_station
                    .context("Dwelling metro has no current station")?;
                let used = delta_ms.min(self.stop_time_remaining_ms);
                self.stop_time_remaining_ms -= used;
                if self.stop_time_remaining_ms <= 0.0 {
                    self.stop_time_remaining_ms = 0.0;
                    return Ok(MetroUpdateResult::DwellStepDue {
                        station,
                        remaining_ms: delta_ms - used,
                    });
                }
                Ok(MetroUpdateResult::Continue)
            }
            MetroState::Running => self.run(delta_ms, path, config),
        }
    }

    fn run(&mut self, delta_ms: f64, path: &SimPath, config: &SimConfig) -> Result<MetroUpdateResult> {
        let acceleration = config.metro_acceleration();
        let mut remaining = delta_ms;

        while remaining > 0.0 {
            let traversal = self
                .current_traversal()
                .context("Running metro has no segment to follow")?;
            let segment = path
                .segments
                .get(traversal.segment_idx)
                .with_context(|| format!("Segment {} not found", traversal.segment_idx))?;

            let length = segment.length();
            let to_go = (length - self.distance_along_segment.into_inner()).max(0.0);

            if to_go <= f32::EPSILON {
                if let Some(result) = self.finish_segment(path, traversal, remaining)? {
                    return Ok(result);
                }
                continue;
            }

            let step = remaining.min(MAX_SUBSTEP_MS);
            self.speed = (self.speed + acceleration * step as f32).min(config.metro_max_speed);
            let travel = self.speed * step as f32;

            if travel >= to_go {
                let used = if self.speed > 0.0 {
                    (to_go / self.speed) as f64
                } else {
                    step
                };
                remaining -= used.min(step);
                self.distance_along_segment = OrderedFloat(length);
                if let Some(result) = self.finish_segment(path, traversal, remaining)? {
                    return Ok(result);
                }
            } else {
                remaining -= step;
                self.distance_along_segment += travel;
                self.position = segment.point_at(self.distance_along_segment.into_inner(), traversal.reversed);
            }
        }

        Ok(MetroUpdateResult::Continue)
    }

    /// Snap to the end of the current segment and move on to the next one.
    /// Returns an arrival when the leg is complete.
    fn finish_segment(
        &mut self,
        path: &SimPath,
        traversal: SegmentTraversal,
        remaining_ms: f64,
    ) -> Result<Option<MetroUpdateResult>> {
        let segment = path
            .segments
            .get(traversal.segment_idx)
            .with_context(|| format!("Segment {} not found", traversal.segment_idx))?;
        let (_, end) = segment.endpoints(traversal.reversed);
        self.position = end;
        self.distance_along_segment = OrderedFloat(0.0);
        self.leg_position += 1;

        if self.leg_position < self.leg.len() {
            return Ok(None);
        }

        let station = segment
            .arrival_station(traversal.reversed)
            .context("Leg ended on a padding segment")?;
        self.current_station = Some(station);
        self.state = MetroState::Arrived;
        self.has_travelled = true;

        Ok(Some(MetroUpdateResult::ArrivedAtStation {
            station,
            remaining_ms: remaining_ms.max(0.0),
        }))
    }
}

impl PassengerHolder for SimMetro {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn passengers(&self) -> &[PassengerId] {
        &self.passengers
    }

    fn passengers_mut(&mut self) -> &mut Vec<PassengerId> {
        &mut self.passengers
    }
}
