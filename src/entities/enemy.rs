use std::f64::consts::TAU;

use super::entity::{Actor, ActorKind, Entity, Response, Size, Variant};
use crate::geometry::Point;

/// Number of sides of the polygon standing in for the enemy's circle.
pub const ENEMY_SIDES: usize = 16;

/// A formation member. Remembers its grid slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enemy {
    pub column: usize,
    pub row: usize,
}

impl Enemy {
    pub fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }

    /// Where enemy shots leave the ship.
    pub fn muzzle(position: Point, size: Size) -> Point {
        Point::new(position.x + size.width / 2, position.y + size.height + 4)
    }
}

impl Actor for Enemy {
    fn kind(&self) -> ActorKind {
        ActorKind::Enemy
    }

    /// Regular polygon inscribed in the enemy's bounding box.
    fn outline(&self, position: Point, size: Size) -> Vec<Point> {
        let radius = (size.width / 2) as f64;
        (0..ENEMY_SIDES)
            .map(|i| {
                let angle = TAU * i as f64 / ENEMY_SIDES as f64;
                position.offset(
                    (radius * (angle.sin() + 1.0)).floor() as i32,
                    (radius * (angle.cos() + 1.0)).floor() as i32,
                )
            })
            .collect()
    }

    fn on_collision(&self, me: &Entity, other: &Entity) -> Response {
        if !me.is_alive() {
            return Response::default();
        }
        match other.variant() {
            // a shot that is already resolving doesn't get a second kill
            Variant::Projectile(_) => Response {
                kill_self: other.is_collidable(),
                ..Response::default()
            },
            _ => Response {
                kill_self: true,
                kill_other: true,
                ..Response::default()
            },
        }
    }
}
