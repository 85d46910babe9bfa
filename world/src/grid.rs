//! Static board geometry and the route enemies follow.

use std::collections::VecDeque;

use glam::Vec2;
use yatd_core::{CellCoord, GameError, TowerId};

/// Role a square plays on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SquareRole {
    /// Entry point of the route.
    Start,
    /// Walkable route square; the base is the last one.
    Route,
    /// Empty square that accepts a tower.
    Buildable,
    /// Square hosting a tower.
    Occupied,
    /// Scenery that is neither walkable nor buildable.
    Blocked,
}

impl SquareRole {
    fn is_walkable(self) -> bool {
        matches!(self, SquareRole::Start | SquareRole::Route)
    }
}

/// Single cell of the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Square {
    coord: CellCoord,
    role: SquareRole,
    tower: Option<TowerId>,
}

impl Square {
    /// Coordinate of the square.
    #[must_use]
    pub const fn coord(&self) -> CellCoord {
        self.coord
    }

    /// Role of the square.
    #[must_use]
    pub const fn role(&self) -> SquareRole {
        self.role
    }

    /// Tower occupying the square, if any.
    #[must_use]
    pub const fn tower(&self) -> Option<TowerId> {
        self.tower
    }
}

/// Raw map description handed to [`Grid::from_layout`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapLayout {
    /// Number of columns.
    pub columns: u32,
    /// Number of rows.
    pub rows: u32,
    /// Square roles in row-major order.
    pub squares: Vec<SquareRole>,
    /// Route square enemies try to reach.
    pub base: CellCoord,
}

/// Errors raised while validating a map layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    /// The layout has no squares.
    #[error("map must have at least one column and one row")]
    EmptyGrid,
    /// The square list does not match the dimensions.
    #[error("map declares {expected} squares but provides {actual}")]
    SizeMismatch {
        /// Squares implied by the dimensions.
        expected: usize,
        /// Squares provided.
        actual: usize,
    },
    /// No start square exists.
    #[error("map has no start square")]
    MissingStart,
    /// More than one start square exists.
    #[error("map has start squares at {first} and {second}")]
    MultipleStarts {
        /// First start square found.
        first: CellCoord,
        /// Second start square found.
        second: CellCoord,
    },
    /// Towers may only enter through placement.
    #[error("map pre-occupies square {coord}")]
    PreOccupied {
        /// Offending square.
        coord: CellCoord,
    },
    /// The base is not a route square.
    #[error("base {coord} must be a route square inside the map")]
    InvalidBase {
        /// Declared base.
        coord: CellCoord,
    },
    /// No walkable path joins start and base.
    #[error("no route connects start {start} to base {base}")]
    DisconnectedRoute {
        /// Start square.
        start: CellCoord,
        /// Base square.
        base: CellCoord,
    },
}

/// Ordered waypoints from the start square to the base.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    waypoints: Vec<CellCoord>,
}

impl Route {
    /// Waypoints in travel order, beginning at the start square.
    #[must_use]
    pub fn waypoints(&self) -> &[CellCoord] {
        &self.waypoints
    }

    /// Number of cell-to-cell segments an enemy crosses before the base.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.waypoints.len().saturating_sub(1) as f32
    }

    /// Continuous position after travelling `progress` cells along the route.
    #[must_use]
    pub fn position_at(&self, progress: f32) -> Vec2 {
        let Some(first) = self.waypoints.first() else {
            return Vec2::ZERO;
        };

        let clamped = progress.clamp(0.0, self.length());
        let segment = clamped.floor() as usize;
        let from = self.waypoints.get(segment).unwrap_or(first).center();
        match self.waypoints.get(segment + 1) {
            Some(next) => from.lerp(next.center(), clamped - segment as f32),
            None => from,
        }
    }
}

/// Board of squares with a precomputed route.
#[derive(Clone, Debug)]
pub struct Grid {
    columns: u32,
    rows: u32,
    squares: Vec<Square>,
    route: Route,
}

impl Grid {
    /// Validates the layout and computes the route.
    pub fn from_layout(layout: MapLayout) -> Result<Self, MapError> {
        let MapLayout {
            columns,
            rows,
            squares: roles,
            base,
        } = layout;

        if columns == 0 || rows == 0 {
            return Err(MapError::EmptyGrid);
        }

        let expected = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(usize::MAX);
        if roles.len() != expected {
            return Err(MapError::SizeMismatch {
                expected,
                actual: roles.len(),
            });
        }

        let width = columns as usize;
        let squares: Vec<Square> = roles
            .into_iter()
            .enumerate()
            .map(|(index, role)| Square {
                coord: CellCoord::new((index % width) as u32, (index / width) as u32),
                role,
                tower: None,
            })
            .collect();

        let mut start: Option<CellCoord> = None;
        for square in &squares {
            match square.role {
                SquareRole::Start => {
                    if let Some(first) = start {
                        return Err(MapError::MultipleStarts {
                            first,
                            second: square.coord,
                        });
                    }
                    start = Some(square.coord);
                }
                SquareRole::Occupied => {
                    return Err(MapError::PreOccupied {
                        coord: square.coord,
                    })
                }
                _ => {}
            }
        }
        let start = start.ok_or(MapError::MissingStart)?;

        let mut grid = Self {
            columns,
            rows,
            squares,
            route: Route {
                waypoints: Vec::new(),
            },
        };

        match grid.index(base).map(|index| grid.squares[index].role) {
            Some(SquareRole::Route) => {}
            _ => return Err(MapError::InvalidBase { coord: base }),
        }

        let waypoints = grid
            .shortest_walk(start, base)
            .ok_or(MapError::DisconnectedRoute { start, base })?;
        grid.route = Route { waypoints };
        Ok(grid)
    }

    /// Number of columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// All squares in row-major order.
    #[must_use]
    pub fn squares(&self) -> &[Square] {
        &self.squares
    }

    /// Resolves the square at the provided coordinate.
    pub fn square_at(&self, coord: CellCoord) -> Result<&Square, GameError> {
        self.index(coord)
            .map(|index| &self.squares[index])
            .ok_or(GameError::OutOfBounds { coord })
    }

    /// Reports whether a tower may be placed on the square.
    #[must_use]
    pub fn is_buildable(&self, coord: CellCoord) -> bool {
        self.square_at(coord)
            .map_or(false, |square| square.role == SquareRole::Buildable)
    }

    /// Marks a buildable square as occupied by the provided tower.
    pub fn place_tower(&mut self, coord: CellCoord, tower: TowerId) -> Result<(), GameError> {
        let index = self.index(coord).ok_or(GameError::OutOfBounds { coord })?;
        let square = &mut self.squares[index];
        if square.role != SquareRole::Buildable {
            return Err(GameError::NotBuildable { coord });
        }

        square.role = SquareRole::Occupied;
        square.tower = Some(tower);
        Ok(())
    }

    /// Route shared by every enemy.
    #[must_use]
    pub fn route_path(&self) -> &Route {
        &self.route
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    fn shortest_walk(&self, start: CellCoord, goal: CellCoord) -> Option<Vec<CellCoord>> {
        let mut parents: Vec<Option<usize>> = vec![None; self.squares.len()];
        let mut visited = vec![false; self.squares.len()];
        let start_index = self.index(start)?;
        let goal_index = self.index(goal)?;

        let mut queue = VecDeque::new();
        visited[start_index] = true;
        queue.push_back(start);

        while let Some(cell) = queue.pop_front() {
            let Some(current) = self.index(cell) else {
                continue;
            };
            if current == goal_index {
                break;
            }

            for neighbor in self.neighbors(cell) {
                let Some(next) = self.index(neighbor) else {
                    continue;
                };
                if visited[next] || !self.squares[next].role.is_walkable() {
                    continue;
                }
                visited[next] = true;
                parents[next] = Some(current);
                queue.push_back(neighbor);
            }
        }

        if !visited[goal_index] {
            return None;
        }

        let mut path = vec![self.squares[goal_index].coord];
        let mut cursor = goal_index;
        while let Some(parent) = parents[cursor] {
            path.push(self.squares[parent].coord);
            cursor = parent;
        }
        path.reverse();
        Some(path)
    }

    fn neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> {
        let column = cell.column();
        let row = cell.row();
        let columns = self.columns;
        let rows = self.rows;
        [
            row.checked_sub(1).map(|up| CellCoord::new(column, up)),
            (column + 1 < columns).then(|| CellCoord::new(column + 1, row)),
            (row + 1 < rows).then(|| CellCoord::new(column, row + 1)),
            column.checked_sub(1).map(|left| CellCoord::new(left, row)),
        ]
        .into_iter()
        .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(rows: &[&str], base: CellCoord) -> MapLayout {
        let columns = rows.first().map_or(0, |row| row.len()) as u32;
        let squares = rows
            .iter()
            .flat_map(|row| row.chars())
            .map(|symbol| match symbol {
                'S' => SquareRole::Start,
                '#' => SquareRole::Route,
                '.' => SquareRole::Buildable,
                'o' => SquareRole::Occupied,
                _ => SquareRole::Blocked,
            })
            .collect();
        MapLayout {
            columns,
            rows: rows.len() as u32,
            squares,
            base,
        }
    }

    #[test]
    fn route_follows_the_walkable_squares() {
        let grid = Grid::from_layout(layout(&["S#x", ".#.", "x##"], CellCoord::new(2, 2)))
            .expect("valid map");
        assert_eq!(
            grid.route_path().waypoints(),
            &[
                CellCoord::new(0, 0),
                CellCoord::new(1, 0),
                CellCoord::new(1, 1),
                CellCoord::new(1, 2),
                CellCoord::new(2, 2),
            ]
        );
        assert!((grid.route_path().length() - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn position_interpolates_between_cell_centres() {
        let grid =
            Grid::from_layout(layout(&["S##"], CellCoord::new(2, 0))).expect("valid map");
        let route = grid.route_path();
        assert_eq!(route.position_at(0.0), Vec2::new(0.5, 0.5));
        assert_eq!(route.position_at(1.5), Vec2::new(2.0, 0.5));
        assert_eq!(route.position_at(99.0), Vec2::new(2.5, 0.5));
    }

    #[test]
    fn rejects_maps_without_a_single_start() {
        assert_eq!(
            Grid::from_layout(layout(&["###"], CellCoord::new(2, 0))).err(),
            Some(MapError::MissingStart)
        );
        assert_eq!(
            Grid::from_layout(layout(&["S#S"], CellCoord::new(1, 0))).err(),
            Some(MapError::MultipleStarts {
                first: CellCoord::new(0, 0),
                second: CellCoord::new(2, 0),
            })
        );
    }

    #[test]
    fn rejects_disconnected_routes_and_bad_bases() {
        assert_eq!(
            Grid::from_layout(layout(&["S.#"], CellCoord::new(2, 0))).err(),
            Some(MapError::DisconnectedRoute {
                start: CellCoord::new(0, 0),
                base: CellCoord::new(2, 0),
            })
        );
        assert_eq!(
            Grid::from_layout(layout(&["S#."], CellCoord::new(2, 0))).err(),
            Some(MapError::InvalidBase {
                coord: CellCoord::new(2, 0)
            })
        );
        assert_eq!(
            Grid::from_layout(layout(&["S#o#"], CellCoord::new(3, 0))).err(),
            Some(MapError::PreOccupied {
                coord: CellCoord::new(2, 0)
            })
        );
    }

    #[test]
    fn placing_a_tower_occupies_the_square_for_good() {
        let mut grid =
            Grid::from_layout(layout(&["S##", "..."], CellCoord::new(2, 0))).expect("valid map");
        let cell = CellCoord::new(1, 1);

        assert!(grid.is_buildable(cell));
        grid.place_tower(cell, TowerId::new(0)).expect("buildable");
        assert!(!grid.is_buildable(cell));
        assert_eq!(grid.square_at(cell).map(Square::tower), Ok(Some(TowerId::new(0))));
        assert_eq!(
            grid.place_tower(cell, TowerId::new(1)),
            Err(GameError::NotBuildable { coord: cell })
        );
        assert_eq!(
            grid.place_tower(CellCoord::new(1, 0), TowerId::new(1)),
            Err(GameError::NotBuildable {
                coord: CellCoord::new(1, 0)
            })
        );
        assert_eq!(
            grid.square_at(CellCoord::new(5, 5)).err(),
            Some(GameError::OutOfBounds {
                coord: CellCoord::new(5, 5)
            })
        );
    }
}
