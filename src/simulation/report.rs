//! Terminal output for headless runs

use super::world::SimWorld;

/// Map size in characters
const MAP_COLUMNS: usize = 96;
const MAP_ROWS: usize = 27;

impl SimWorld {
    /// Print a summary of the world state
    pub fn print_summary(&self) {
        println!("=== Metro Simulation Summary ===");
        println!(
            "Time: {:.2}s (x{}{})",
            self.time_ms / 1000.0,
            self.game_speed_multiplier,
            if self.is_paused { ", paused" } else { "" }
        );
        println!("{}", self.game_state.summary());
        println!(
            "Stations: {}, Paths: {}, Metros: {}, Passengers: {} ({} riding)",
            self.stations.len(),
            self.finished_paths().count(),
            self.metros.len(),
            self.passengers.len(),
            self.passengers.iter().filter(|p| p.is_riding()).count()
        );
        println!();

        println!("--- Stations ---");
        for station in &self.stations {
            let waiting: String = station
                .passengers
                .iter()
                .filter_map(|id| self.passenger(*id))
                .map(|p| p.destination.symbol())
                .collect();
            println!(
                "  Station {:?} {}: {}/{} [{}]{}",
                station.id.0 .0,
                station.shape_type().symbol(),
                station.passengers.len(),
                station.capacity,
                waiting,
                if station.overflowed { " OVERFLOW" } else { "" }
            );
        }

        if !self.metros.is_empty() {
            println!("--- Metros ---");
            for metro in &self.metros {
                println!(
                    "  Metro {:?} on path {:?}: {:?}, speed={:.3}, riders={}/{}, position=({:.0}, {:.0})",
                    metro.id.0 .0,
                    metro.path_id.0 .0,
                    metro.state,
                    metro.speed,
                    metro.passengers.len(),
                    metro.capacity,
                    metro.position.x,
                    metro.position.y
                );
            }
        }
    }

    /// Draw a visual map of the world in the terminal
    pub fn draw_map(&self) {
        for line in self.render_map() {
            println!("{}", line);
        }
    }

    /// Map rows: `#O^X` and friends for stations, digits for path slots,
    /// `M` for metros
    pub fn render_map(&self) -> Vec<String> {
        let mut grid = vec![vec![' '; MAP_COLUMNS]; MAP_ROWS];

        let width = self.config.screen_width.max(1.0);
        let height = self.config.screen_height.max(1.0);
        let to_grid = |x: f32, y: f32| -> (i32, i32) {
            let col = (x / width * (MAP_COLUMNS - 1) as f32).round() as i32;
            let row = (y / height * (MAP_ROWS - 1) as f32).round() as i32;
            (
                row.clamp(0, MAP_ROWS as i32 - 1),
                col.clamp(0, MAP_COLUMNS as i32 - 1),
            )
        };

        // Draw paths
        for path in self.finished_paths() {
            let mark = char::from_digit((path.button_index % 10) as u32, 10).unwrap_or('.');
            for (from, to) in path.edges() {
                let (Some(a), Some(b)) = (self.station(from), self.station(to)) else {
                    continue;
                };
                let (start_row, start_col) = to_grid(a.position.x, a.position.y);
                let (end_row, end_col) = to_grid(b.position.x, b.position.y);

                // Simple line drawing (Bresenham-like)
                let dx = (end_col - start_col).abs();
                let dy = (end_row - start_row).abs();
                let sx = if start_col < end_col { 1 } else { -1 };
                let sy = if start_row < end_row { 1 } else { -1 };

                let mut err = dx - dy;
                let mut x = start_col;
                let mut y = start_row;

                loop {
                    let cell = &mut grid[y as usize][x as usize];
                    if *cell == ' ' {
                        *cell = mark;
                    }

                    if x == end_col && y == end_row {
                        break;
                    }

                    let e2 = 2 * err;
                    if e2 > -dy {
                        err -= dy;
                        x += sx;
                    }
                    if e2 < dx {
                        err += dx;
                        y += sy;
                    }
                }
            }
        }

        // Draw metros
        for metro in &self.metros {
            let (row, col) = to_grid(metro.position.x, metro.position.y);
            grid[row as usize][col as usize] = 'M';
        }

        // Draw stations last so they stay visible
        for station in &self.stations {
            let (row, col) = to_grid(station.position.x, station.position.y);
            grid[row as usize][col as usize] = station.shape_type().symbol();
        }

        let border = format!("+{}+", "-".repeat(MAP_COLUMNS));
        let mut lines = Vec::with_capacity(MAP_ROWS + 2);
        lines.push(border.clone());
        for row in grid {
            lines.push(format!("|{}|", row.into_iter().collect::<String>()));
        }
        lines.push(border);
        lines
    }
}
