use super::entity::EntityId;
use super::registry::Registry;
use crate::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }
}

/// The enemy swarm's grid.
#[derive(Debug, Clone)]
pub struct Formation {
    /// Top-left corner of slot (0, 0)
    pub corner: Point,
    pub columns: usize,
    pub rows: usize,
    /// Distance between neighbouring slots (enemy size + spacing)
    pub pitch: i32,
    /// Gap between neighbouring enemies
    pub spacing: i32,
    /// Horizontal heading of the swarm
    pub direction: Direction,
    /// Enemy handles, column-major
    pub enemies: Vec<EntityId>,
}

impl Formation {
    pub fn new(corner: Point, columns: usize, rows: usize, enemy_size: i32, spacing: i32) -> Self {
        Self {
            corner,
            columns,
            rows,
            pitch: enemy_size + spacing,
            spacing,
            direction: Direction::East,
            enemies: Vec::with_capacity(columns * rows),
        }
    }

    /// Corner that centres `columns` slots horizontally in a field of `width`.
    pub fn centred_corner(width: i32, top: i32, columns: usize, enemy_size: i32, spacing: i32) -> Point {
        let span = columns as i32 * (enemy_size + spacing) - spacing;
        Point::new((width - span) / 2, top)
    }

    /// How many columns fit between the margins of a field of `width`.
    pub fn columns_for(width: i32, margin: i32, enemy_size: i32, spacing: i32) -> usize {
        let pitch = enemy_size + spacing;
        if pitch <= 0 {
            return 0;
        }
        ((width - 2 * margin + spacing) / pitch).max(0) as usize
    }

    pub fn slot_position(&self, column: usize, row: usize) -> Point {
        self.corner
            .offset(column as i32 * self.pitch, row as i32 * self.pitch)
    }

    pub fn enemy_at(&self, column: usize, row: usize) -> Option<EntityId> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.enemies.get(column * self.rows + row).copied()
    }

    /// Every occupied slot as `(column, row, enemy)`.
    pub fn slots(&self) -> impl Iterator<Item = (usize, usize, EntityId)> + '_ {
        let rows = self.rows.max(1);
        self.enemies
            .iter()
            .enumerate()
            .map(move |(index, &id)| (index / rows, index % rows, id))
    }

    fn column_alive(&self, registry: &Registry, column: usize) -> bool {
        (0..self.rows)
            .filter_map(|row| self.enemy_at(column, row))
            .any(|id| registry.is_alive(id))
    }

    fn row_alive(&self, registry: &Registry, row: usize) -> bool {
        (0..self.columns)
            .filter_map(|column| self.enemy_at(column, row))
            .any(|id| registry.is_alive(id))
    }

    /// Outermost live edge of the swarm in `direction`, in slot units.
    ///
    /// West and North give the index of the first live column/row; East and
    /// South give one past the last. `None` when nobody is alive.
    pub fn extreme(&self, registry: &Registry, direction: Direction) -> Option<usize> {
        match direction {
            Direction::West => (0..self.columns).find(|&c| self.column_alive(registry, c)),
            Direction::East => (0..self.columns)
                .rev()
                .find(|&c| self.column_alive(registry, c))
                .map(|c| c + 1),
            Direction::North => (0..self.rows).find(|&r| self.row_alive(registry, r)),
            Direction::South => (0..self.rows)
                .rev()
                .find(|&r| self.row_alive(registry, r))
                .map(|r| r + 1),
        }
    }

    pub fn live_columns(&self, registry: &Registry) -> Vec<usize> {
        (0..self.columns)
            .filter(|&c| self.column_alive(registry, c))
            .collect()
    }

    /// Lowest live enemy in a column.
    pub fn bottom_most_alive(&self, registry: &Registry, column: usize) -> Option<EntityId> {
        (0..self.rows)
            .rev()
            .filter_map(|row| self.enemy_at(column, row))
            .find(|&id| registry.is_alive(id))
    }

    pub fn any_alive(&self, registry: &Registry) -> bool {
        self.enemies.iter().any(|&id| registry.is_alive(id))
    }

    /// Moves the corner one nudge along the current heading. When that would
    /// push the live swarm past a margin the heading flips and the swarm
    /// drops instead. Returns whether it bounced.
    pub fn step(&mut self, registry: &Registry, width: i32, margin: i32, nudge: i32) -> bool {
        let bounced = match self.direction {
            Direction::East => self.extreme(registry, Direction::East).is_some_and(|east| {
                self.corner.x + nudge + east as i32 * self.pitch - self.spacing > width - margin
            }),
            Direction::West => self
                .extreme(registry, Direction::West)
                .is_some_and(|west| self.corner.x - nudge + (west as i32) * self.pitch < margin),
            Direction::North | Direction::South => false,
        };

        if bounced {
            self.direction = self.direction.reversed();
            self.corner = self.corner.offset(0, 2 * nudge);
        } else {
            let dx = match self.direction {
                Direction::East => nudge,
                Direction::West => -nudge,
                _ => 0,
            };
            self.corner = self.corner.offset(dx, 0);
        }
        bounced
    }

    /// Snaps every enemy not flying a path back onto its slot.
    pub fn park(&self, registry: &mut Registry) {
        for (column, row, id) in self.slots() {
            let idle = registry.get(id).is_some_and(|enemy| enemy.path().is_none());
            if idle {
                registry.set_location(id, self.slot_position(column, row));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::enemy::Enemy;
    use crate::entities::entity::{Size, Variant};

    fn build(registry: &mut Registry, columns: usize, rows: usize) -> Formation {
        let corner = Formation::centred_corner(400, 20, columns, 24, 12);
        let mut formation = Formation::new(corner, columns, rows, 24, 12);
        for column in 0..columns {
            for row in 0..rows {
                let id = registry.place(
                    Size::square(24),
                    Variant::Enemy(Enemy::new(column, row)),
                    formation.slot_position(column, row),
                );
                formation.enemies.push(id);
            }
        }
        formation
    }

    #[test]
    fn test_formation_new() {
        let formation = Formation::new(Point::new(10, 20), 5, 6, 24, 12);
        assert_eq!(formation.pitch, 36);
        assert_eq!(formation.direction, Direction::East);
        assert!(formation.enemies.is_empty());
    }

    #[test]
    fn test_columns_for_default_field() {
        // 360 usable units, 36 per column, last gap not needed
        assert_eq!(Formation::columns_for(400, 20, 24, 12), 10);
        assert_eq!(Formation::columns_for(60, 20, 24, 12), 0);
    }

    #[test]
    fn test_centred_corner() {
        // ten columns span 348 units
        let corner = Formation::centred_corner(400, 20, 10, 24, 12);
        assert_eq!(corner, Point::new(26, 20));
    }

    #[test]
    fn test_slot_positions() {
        let mut registry = Registry::new();
        let formation = build(&mut registry, 3, 2);
        assert_eq!(formation.enemies.len(), 6);
        assert_eq!(
            formation.slot_position(2, 1),
            formation.corner.offset(72, 36)
        );
        let id = formation.enemy_at(2, 1).unwrap();
        assert_eq!(registry.position(id), Some(formation.slot_position(2, 1)));
        assert_eq!(formation.enemy_at(3, 0), None);
    }

    #[test]
    fn test_extremes() {
        let mut registry = Registry::new();
        let formation = build(&mut registry, 4, 3);
        assert_eq!(formation.extreme(&registry, Direction::West), Some(0));
        assert_eq!(formation.extreme(&registry, Direction::East), Some(4));
        assert_eq!(formation.extreme(&registry, Direction::North), Some(0));
        assert_eq!(formation.extreme(&registry, Direction::South), Some(3));

        for row in 0..3 {
            registry.kill(formation.enemy_at(0, row).unwrap());
            registry.kill(formation.enemy_at(3, row).unwrap());
        }
        for column in 0..4 {
            registry.kill(formation.enemy_at(column, 2).unwrap());
        }
        assert_eq!(formation.extreme(&registry, Direction::West), Some(1));
        assert_eq!(formation.extreme(&registry, Direction::East), Some(3));
        assert_eq!(formation.extreme(&registry, Direction::South), Some(2));
    }

    #[test]
    fn test_extreme_none_when_all_dead() {
        let mut registry = Registry::new();
        let formation = build(&mut registry, 2, 2);
        for &id in &formation.enemies {
            registry.kill(id);
        }
        for direction in [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
        ] {
            assert_eq!(formation.extreme(&registry, direction), None);
        }
        assert!(formation.live_columns(&registry).is_empty());
        assert!(!formation.any_alive(&registry));
    }

    #[test]
    fn test_bottom_most_alive() {
        let mut registry = Registry::new();
        let formation = build(&mut registry, 2, 3);
        assert_eq!(
            formation.bottom_most_alive(&registry, 1),
            formation.enemy_at(1, 2)
        );
        registry.kill(formation.enemy_at(1, 2).unwrap());
        assert_eq!(
            formation.bottom_most_alive(&registry, 1),
            formation.enemy_at(1, 1)
        );
    }

    #[test]
    fn test_step_moves_east() {
        let mut registry = Registry::new();
        let mut formation = build(&mut registry, 3, 2);
        let start = formation.corner;
        assert!(!formation.step(&registry, 400, 20, 1));
        assert_eq!(formation.corner, start.offset(1, 0));
    }

    #[test]
    fn test_step_bounces_at_margin() {
        let mut registry = Registry::new();
        let mut formation = build(&mut registry, 10, 2);
        // a full-width swarm has six units of slack on either side
        let start = formation.corner;
        for _ in 0..6 {
            assert!(!formation.step(&registry, 400, 20, 1));
        }
        assert!(formation.step(&registry, 400, 20, 1));
        assert_eq!(formation.direction, Direction::West);
        assert_eq!(formation.corner, start.offset(6, 2));
        for _ in 0..12 {
            assert!(!formation.step(&registry, 400, 20, 1));
        }
        assert!(formation.step(&registry, 400, 20, 1));
        assert_eq!(formation.direction, Direction::East);
        assert_eq!(formation.corner, start.offset(-6, 4));
    }

    #[test]
    fn test_dead_columns_widen_travel() {
        let mut registry = Registry::new();
        let mut formation = build(&mut registry, 10, 1);
        let id = formation.enemy_at(9, 0).unwrap();
        registry.kill(id);
        let start = formation.corner;
        for _ in 0..42 {
            assert!(!formation.step(&registry, 400, 20, 1));
        }
        assert_eq!(formation.corner, start.offset(42, 0));
        assert!(formation.step(&registry, 400, 20, 1));
    }

    #[test]
    fn test_park_skips_enemies_on_paths() {
        use crate::path::{Maneuver, Path};

        let mut registry = Registry::new();
        let mut formation = build(&mut registry, 2, 1);
        let flying = formation.enemy_at(0, 0).unwrap();
        registry.set_location(flying, Point::new(300, 300));
        registry.get_mut(flying).unwrap().set_path(Some(Path::with_control(
            Point::new(300, 300),
            Point::new(0, 0),
            Point::new(0, 0),
            Maneuver::Dive,
        )));

        formation.step(&registry, 400, 20, 1);
        formation.park(&mut registry);
        assert_eq!(registry.position(flying), Some(Point::new(300, 300)));
        let parked = formation.enemy_at(1, 0).unwrap();
        assert_eq!(registry.position(parked), Some(formation.slot_position(1, 0)));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_parked_enemies_stay_on_slots(
                columns in 1usize..10,
                rows in 1usize..6,
                steps in 0usize..400,
                kills in prop::collection::vec(0usize..60, 0..20),
            ) {
                let mut registry = Registry::new();
                let mut formation = build(&mut registry, columns, rows);
                for index in kills {
                    if let Some(&id) = formation.enemies.get(index) {
                        registry.kill(id);
                    }
                }
                for _ in 0..steps {
                    formation.step(&registry, 400, 20, 1);
                    formation.park(&mut registry);
                }
                for (column, row, id) in formation.slots() {
                    prop_assert_eq!(
                        registry.position(id),
                        Some(formation.slot_position(column, row))
                    );
                }
            }

            #[test]
            fn test_live_swarm_stays_inside_margins(
                columns in 1usize..10,
                steps in 0usize..600,
            ) {
                let mut registry = Registry::new();
                let mut formation = build(&mut registry, columns, 2);
                for _ in 0..steps {
                    formation.step(&registry, 400, 20, 1);
                    let west = formation.extreme(&registry, Direction::West).unwrap();
                    let east = formation.extreme(&registry, Direction::East).unwrap();
                    prop_assert!(formation.corner.x + west as i32 * formation.pitch >= 20);
                    prop_assert!(
                        formation.corner.x + east as i32 * formation.pitch - formation.spacing <= 380
                    );
                }
            }
        }
    }
}
