//! Player-authored metro lines
//!
//! A path is an ordered list of stations. Its segments are derived from the
//! stations: one station segment per consecutive pair, joined by short
//! padding segments where parallel lines are offset from the station center.
//! A looped path lists its first station again at the end (A, B, C, A).

use anyhow::{bail, Context, Result};

use super::types::{Color, MetroId, PathId, Point, StationId};

/// What a segment connects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Runs from one station to the next
    Station { from: StationId, to: StationId },
    /// Short connector around a through-station
    Padding { station: StationId },
}

/// A single oriented edge of a path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSegment {
    pub kind: SegmentKind,
    pub start: Point,
    pub end: Point,
}

impl PathSegment {
    pub fn length(&self) -> f32 {
        self.start.distance(&self.end)
    }

    pub fn is_padding(&self) -> bool {
        matches!(self.kind, SegmentKind::Padding { .. })
    }

    /// Point `distance` pixels along the segment in the travel direction
    pub fn point_at(&self, distance: f32, reversed: bool) -> Point {
        let (from, to) = self.endpoints(reversed);
        let length = self.length();
        if length <= f32::EPSILON {
            return to;
        }
        from.lerp(&to, (distance / length).clamp(0.0, 1.0))
    }

    pub fn endpoints(&self, reversed: bool) -> (Point, Point) {
        if reversed {
            (self.end, self.start)
        } else {
            (self.start, self.end)
        }
    }

    /// Station reached at the end of the traversal, if this is a station segment
    pub fn arrival_station(&self, reversed: bool) -> Option<StationId> {
        match self.kind {
            SegmentKind::Station { from, to } => Some(if reversed { from } else { to }),
            SegmentKind::Padding { .. } => None,
        }
    }
}

/// One segment walked in a given direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentTraversal {
    pub segment_idx: usize,
    pub reversed: bool,
}

/// A metro line in the simulation
#[derive(Debug, Clone)]
pub struct SimPath {
    pub id: PathId,
    pub color: Color,
    /// Index of the path button this line occupies; also its offset lane
    pub button_index: usize,
    pub stations: Vec<StationId>,
    pub is_looped: bool,
    pub is_being_created: bool,
    /// Where the player's pointer is while the path is still being dragged
    pub temporary_endpoint: Option<Point>,
    pub segments: Vec<PathSegment>,
    pub metros: Vec<MetroId>,
}

impl SimPath {
    pub fn new(id: PathId, color: Color, button_index: usize, first_station: StationId) -> Self {
        Self {
            id,
            color,
            button_index,
            stations: vec![first_station],
            is_looped: false,
            is_being_created: true,
            temporary_endpoint: None,
            segments: Vec::new(),
            metros: Vec::new(),
        }
    }

    pub fn first_station(&self) -> Option<StationId> {
        self.stations.first().copied()
    }

    pub fn last_station(&self) -> Option<StationId> {
        self.stations.last().copied()
    }

    pub fn contains_station(&self, station_id: StationId) -> bool {
        self.stations.contains(&station_id)
    }

    /// Stations a metro visits per cycle
    pub fn distinct_stop_count(&self) -> usize {
        if self.is_looped {
            self.stations.len().saturating_sub(1)
        } else {
            self.stations.len()
        }
    }

    /// Consecutive station pairs, including the closing pair of a loop
    pub fn edges(&self) -> impl Iterator<Item = (StationId, StationId)> + '_ {
        self.stations.windows(2).map(|pair| (pair[0], pair[1]))
    }

    pub fn connects(&self, a: StationId, b: StationId) -> bool {
        self.edges()
            .any(|(from, to)| (from == a && to == b) || (from == b && to == a))
    }

    /// Station index following `index` when moving in `direction`.
    /// Non-looped paths turn around at their ends.
    pub fn next_stop(&self, index: usize, direction: i8) -> (usize, i8) {
        if self.is_looped {
            let n = self.distinct_stop_count().max(1) as isize;
            let next = (index as isize + direction as isize).rem_euclid(n);
            return (next as usize, direction);
        }

        let next = index as isize + direction as isize;
        if next < 0 || next >= self.stations.len() as isize {
            let turned = -direction;
            let back = (index as isize + turned as isize)
                .clamp(0, self.stations.len().saturating_sub(1) as isize);
            (back as usize, turned)
        } else {
            (next as usize, direction)
        }
    }

    /// Station a metro standing at `index` heading `direction` will stop at next
    pub fn upcoming_station(&self, index: usize, direction: i8) -> Option<StationId> {
        let (next, _) = self.next_stop(index, direction);
        self.stations.get(next).copied()
    }

    fn padding_index(&self, index: usize) -> Option<usize> {
        if self.is_looped {
            let n = self.distinct_stop_count();
            if n == 0 {
                return None;
            }
            Some(if index % n == 0 { 2 * n - 1 } else { 2 * index - 1 })
        } else if index > 0 && index + 1 < self.stations.len() {
            Some(2 * index - 1)
        } else {
            None
        }
    }

    /// Segments walked when leaving the stop at `index` towards the next one.
    /// `through` is set when the metro arrived here moving in the same
    /// direction, so it has to round the station on a padding segment first.
    pub fn leg(&self, index: usize, direction: i8, through: bool) -> Result<(Vec<SegmentTraversal>, usize, i8)> {
        if self.stations.len() < 2 {
            bail!("Path {:?} has fewer than two stations", self.id);
        }
        let (next, next_direction) = self.next_stop(index, direction);

        let mut leg = Vec::with_capacity(2);
        if through && next_direction == direction {
            if let Some(padding_idx) = self.padding_index(index) {
                leg.push(SegmentTraversal {
                    segment_idx: padding_idx,
                    reversed: direction < 0,
                });
            }
        }

        let station_leg = if next_direction > 0 {
            SegmentTraversal {
                segment_idx: 2 * index,
                reversed: false,
            }
        } else {
            SegmentTraversal {
                segment_idx: 2 * next,
                reversed: true,
            }
        };
        if station_leg.segment_idx >= self.segments.len() {
            bail!(
                "Segment {} out of range for path {:?} with {} segments",
                station_leg.segment_idx,
                self.id,
                self.segments.len()
            );
        }
        leg.push(station_leg);

        Ok((leg, next, next_direction))
    }

    /// Recompute segments from station positions
    pub fn rebuild_segments(
        &mut self,
        position_of: impl Fn(StationId) -> Option<Point>,
        offset_px: f32,
    ) -> Result<()> {
        let positions = self
            .stations
            .iter()
            .map(|id| position_of(*id).with_context(|| format!("Station {:?} not found", id)))
            .collect::<Result<Vec<Point>>>()?;

        let lane = self.button_index as f32 * offset_px;
        let station_segments: Vec<PathSegment> = self
            .stations
            .windows(2)
            .zip(positions.windows(2))
            .map(|(ids, points)| {
                let shift = points[0].left_normal(&points[1]) * lane;
                PathSegment {
                    kind: SegmentKind::Station {
                        from: ids[0],
                        to: ids[1],
                    },
                    start: points[0] + shift,
                    end: points[1] + shift,
                }
            })
            .collect();

        self.segments.clear();
        let count = station_segments.len();
        for (i, segment) in station_segments.iter().enumerate() {
            self.segments.push(*segment);

            let has_padding = if self.is_looped { true } else { i + 1 < count };
            if has_padding && count > 0 {
                let following = &station_segments[(i + 1) % count];
                let station = match segment.kind {
                    SegmentKind::Station { to, .. } => to,
                    SegmentKind::Padding { station } => station,
                };
                self.segments.push(PathSegment {
                    kind: SegmentKind::Padding { station },
                    start: segment.end,
                    end: following.start,
                });
            }
        }

        Ok(())
    }
}
