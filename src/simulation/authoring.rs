//! Path authoring, removal and the path-slot economy
//!
//! A path is drawn one station at a time: `start_path_at`, any number of
//! `extend_path_to`, then `finish_path` or `abort_path`. Only finished paths
//! enter the travel network and get a metro.

use anyhow::Result;
use log::{debug, info, warn};
use ordered_float::OrderedFloat;

use super::action::{Action, ActionResult};
use super::holder::PassengerHolder;
use super::metro::SimMetro;
use super::passenger::PassengerLocation;
use super::path::SimPath;
use super::path_button::{path_button_position, path_color, PathButton};
use super::types::{MetroId, PassengerId, PathId, Point, SimId, StationId};
use super::world::SimWorld;

impl SimWorld {
    /// Begin drawing a path at `station_id`. Fails while another path is
    /// being drawn or when every unlocked slot already holds a path.
    pub fn start_path_at(&mut self, station_id: StationId) -> bool {
        if self.game_state.is_game_over || self.creating_path.is_some() {
            return false;
        }
        let Some(station_idx) = self.station_index(station_id) else {
            return false;
        };
        let Some(button_index) = self.free_path_slot() else {
            debug!("No free path slot for a new path");
            return false;
        };

        let id = PathId(self.next_sim_id());
        self.paths
            .push(SimPath::new(id, path_color(button_index), button_index, station_id));
        self.creating_path = Some(id);
        self.stations[station_idx].snap_blip_start_ms = Some(self.time_ms);
        true
    }

    /// Append a station to the path being drawn. Returning to the first
    /// station of a path with three or more stations closes a loop.
    pub fn extend_path_to(&mut self, station_id: StationId) -> bool {
        let Some(path_idx) = self.creating_path.and_then(|id| self.path_index(id)) else {
            return false;
        };
        let Some(station_idx) = self.station_index(station_id) else {
            return false;
        };

        let path = &mut self.paths[path_idx];
        if path.last_station() == Some(station_id) {
            return false;
        }
        let closes_loop =
            !path.is_looped && path.first_station() == Some(station_id) && path.stations.len() >= 3;
        path.stations.push(station_id);
        path.is_looped = closes_loop;

        self.stations[station_idx].snap_blip_start_ms = Some(self.time_ms);
        true
    }

    /// Point the dangling end of the path being drawn follows
    pub fn set_temporary_endpoint(&mut self, point: Option<Point>) -> bool {
        let Some(path_idx) = self.creating_path.and_then(|id| self.path_index(id)) else {
            return false;
        };
        self.paths[path_idx].temporary_endpoint = point;
        true
    }

    /// Drop the path being drawn
    pub fn abort_path(&mut self) -> bool {
        let Some(path_id) = self.creating_path.take() else {
            return false;
        };
        if let Some(path_idx) = self.path_index(path_id) {
            self.paths.remove(path_idx);
        }
        debug!("Aborted path {:?}", path_id);
        true
    }

    /// Finish the path being drawn. Paths with fewer than two stations are
    /// discarded. Returns the id of the finished path.
    pub fn finish_path(&mut self) -> Option<PathId> {
        let path_id = self.creating_path.take()?;
        let path_idx = self.path_index(path_id)?;

        if self.paths[path_idx].stations.len() < 2 {
            self.paths.remove(path_idx);
            debug!("Discarded path {:?} with a single station", path_id);
            return None;
        }

        match self.commit_path(path_idx) {
            Ok(()) => {
                let path = &self.paths[path_idx];
                info!(
                    "Path {:?} opened with {} stops{}",
                    path_id,
                    path.distinct_stop_count(),
                    if path.is_looped { " (loop)" } else { "" }
                );
                Some(path_id)
            }
            Err(e) => {
                warn!("Failed to finish path {:?}: {:#}", path_id, e);
                self.paths.remove(path_idx);
                None
            }
        }
    }

    fn commit_path(&mut self, path_idx: usize) -> Result<()> {
        let offset = self.config.path_offset_px;
        let positions: Vec<(StationId, Point)> =
            self.stations.iter().map(|s| (s.id, s.position)).collect();

        let path = &mut self.paths[path_idx];
        path.is_being_created = false;
        path.temporary_endpoint = None;
        path.rebuild_segments(
            |id| positions.iter().find(|(sid, _)| *sid == id).map(|(_, p)| *p),
            offset,
        )?;

        let metro_budget = self.game_state.unlocked_num_paths * self.config.metros_per_line;
        if self.metros.len() < metro_budget {
            let metro_id = MetroId(self.next_sim_id());
            let metro = SimMetro::new(metro_id, &self.paths[path_idx], self.config.metro_capacity)?;
            self.paths[path_idx].metros.push(metro_id);
            self.metros.push(metro);
        }

        self.network_dirty = true;
        Ok(())
    }

    /// Build a finished path in one go from station list indices
    pub fn create_path(&mut self, station_indices: &[usize], looped: bool) -> Option<PathId> {
        if self.game_state.is_game_over || self.creating_path.is_some() {
            return None;
        }

        let mut indices = station_indices.to_vec();
        if looped && indices.len() > 1 && indices.first() == indices.last() {
            indices.pop();
        }
        if indices.len() < 2 || (looped && indices.len() < 3) {
            return None;
        }
        if indices.iter().any(|idx| *idx >= self.stations.len()) {
            return None;
        }
        if indices.windows(2).any(|pair| pair[0] == pair[1]) {
            return None;
        }
        let station_ids: Vec<StationId> = indices.iter().map(|idx| self.stations[*idx].id).collect();
        if !self.start_path_at(station_ids[0]) {
            return None;
        }
        let mut extended = station_ids[1..]
            .iter()
            .all(|station_id| self.extend_path_to(*station_id));
        if extended && looped {
            extended = self.extend_path_to(station_ids[0]);
        }
        if !extended {
            self.abort_path();
            return None;
        }

        // An open line may come back to its first station without looping
        if let Some(path_idx) = self.creating_path.and_then(|id| self.path_index(id)) {
            self.paths[path_idx].is_looped = looped;
        }
        self.finish_path()
    }

    /// Remove a finished path and its metros. Riders are put down at the
    /// station the metro stands at, or the nearest station of the path.
    /// Riders put down at their destination shape are delivered; those that
    /// do not fit are lost.
    pub fn remove_path(&mut self, path_id: PathId) -> bool {
        if self.creating_path == Some(path_id) {
            return self.abort_path();
        }
        let Some(path_idx) = self.path_index(path_id) else {
            return false;
        };

        let path = self.paths.remove(path_idx);
        for metro_id in &path.metros {
            let Some(metro_idx) = self.metro_index(*metro_id) else {
                continue;
            };
            let metro = self.metros.remove(metro_idx);
            let drop_station = metro
                .current_station
                .or_else(|| self.nearest_path_station(&path, metro.position));

            for passenger_id in metro.passengers {
                let drop_idx = drop_station.and_then(|id| self.station_index(id));
                let arrived = drop_idx.is_some_and(|station_idx| {
                    self.passenger(passenger_id).is_some_and(|p| {
                        p.destination == self.stations[station_idx].shape_type()
                    })
                });
                if arrived {
                    self.deliver_dropped_passenger(passenger_id);
                    continue;
                }

                let placed = match drop_idx {
                    Some(station_idx) => self.stations[station_idx].add_passenger(passenger_id).is_ok(),
                    None => false,
                };
                self.travel_plans.remove(&passenger_id);

                if placed {
                    if let Some(station_id) = drop_station {
                        if let Err(e) = self
                            .set_passenger_location(passenger_id, PassengerLocation::Station(station_id))
                        {
                            warn!("{:#}", e);
                        }
                    }
                } else if let Some(passenger_idx) = self.passenger_index(passenger_id) {
                    self.passengers.remove(passenger_idx);
                    self.stats.total_passengers_lost += 1;
                    debug!("Passenger {:?} lost with path {:?}", passenger_id, path_id);
                }
            }
        }

        self.network_dirty = true;
        info!("Path {:?} removed", path_id);
        true
    }

    /// A rider put down at a station of its destination shape has arrived
    fn deliver_dropped_passenger(&mut self, passenger_id: PassengerId) {
        if let Some(passenger_idx) = self.passenger_index(passenger_id) {
            let mut passenger = self.passengers.remove(passenger_idx);
            passenger.is_at_destination = true;
            passenger.location = None;
        }
        self.travel_plans.remove(&passenger_id);
        self.game_state.complete_travel();
        self.stats.total_passengers_delivered += 1;
        debug!("Passenger {:?} delivered by path removal", passenger_id);
    }

    fn nearest_path_station(&self, path: &SimPath, point: Point) -> Option<StationId> {
        path.stations
            .iter()
            .filter_map(|id| self.station(*id))
            .min_by_key(|station| OrderedFloat(station.position.distance(&point)))
            .map(|station| station.id)
    }

    /// Lowest unlocked slot without a path
    fn free_path_slot(&self) -> Option<usize> {
        (0..self.game_state.unlocked_num_paths)
            .find(|slot| !self.paths.iter().any(|p| p.button_index == *slot))
    }

    /// Spend score on the next path slot
    pub fn purchase_path_slot(&mut self, slot: usize) -> bool {
        if !self.game_state.try_purchase_path_slot(slot) {
            return false;
        }
        if let Some(blink) = self.button_unlock_blinks.get_mut(slot) {
            *blink = Some(self.time_ms);
        }
        info!(
            "Bought path slot {} ({} points left)",
            slot, self.game_state.score
        );
        true
    }

    /// Current state of every path slot button
    pub fn path_buttons(&self) -> Vec<PathButton> {
        (0..self.config.num_paths)
            .map(|index| {
                let is_locked = self.game_state.is_path_slot_locked(index);
                PathButton {
                    index,
                    position: path_button_position(index, &self.config),
                    color: path_color(index),
                    path_id: self
                        .paths
                        .iter()
                        .find(|p| p.button_index == index)
                        .map(|p| p.id),
                    is_locked,
                    price: if is_locked {
                        self.game_state.path_slot_price(index)
                    } else {
                        None
                    },
                    unlock_blink_start_ms: self.button_unlock_blinks.get(index).copied().flatten(),
                }
            })
            .collect()
    }

    // -- Hit testing --------------------------------------------------------

    pub fn station_at(&self, point: Point) -> Option<StationId> {
        self.stations
            .iter()
            .find(|station| station.contains(point))
            .map(|station| station.id)
    }

    pub fn path_button_at(&self, point: Point) -> Option<usize> {
        self.path_buttons()
            .into_iter()
            .find(|button| button.contains(point, &self.config))
            .map(|button| button.index)
    }

    // -- Actions ------------------------------------------------------------

    pub fn apply_action(&mut self, action: &Action) -> ActionResult {
        match action {
            Action::Noop => ActionResult::OK,
            Action::CreatePath {
                station_indices,
                looped,
            } => ActionResult::from_bool(self.create_path(station_indices, *looped).is_some()),
            Action::RemovePath { index, path_id } => {
                let target = match (index, path_id) {
                    (Some(index), None) => self.finished_paths().nth(*index).map(|p| p.id),
                    (None, Some(raw)) => Some(PathId(SimId(*raw))),
                    _ => None,
                };
                ActionResult::from_bool(target.is_some_and(|id| self.remove_path(id)))
            }
            Action::Pause => {
                self.pause();
                ActionResult::OK
            }
            Action::Resume => {
                self.resume();
                ActionResult::OK
            }
            Action::SetSpeed { multiplier } => ActionResult::from_bool(self.set_speed(*multiplier)),
            Action::PurchasePathSlot { index } => {
                ActionResult::from_bool(self.purchase_path_slot(*index))
            }
        }
    }

    /// Parse and apply a JSON action envelope; malformed input is rejected
    pub fn apply_action_json(&mut self, text: &str) -> ActionResult {
        match Action::from_json(text) {
            Some(action) => self.apply_action(&action),
            None => {
                debug!("Rejected malformed action: {}", text);
                ActionResult::REJECTED
            }
        }
    }
}
