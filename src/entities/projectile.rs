use super::entity::{Actor, ActorKind, Entity, Response, Size};
use crate::geometry::{Point, rectangle};

pub const PROJECTILE_WIDTH: i32 = 2;
pub const PROJECTILE_HEIGHT: i32 = 8;

/// Points for a fighter shot hitting an enemy.
pub const ENEMY_BOUNTY: u32 = 20;
/// Points for a fighter shot hitting another shot.
pub const SHOT_BOUNTY: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shooter {
    Fighter,
    Enemy,
}

impl Shooter {
    /// Score earned when a shot from this shooter hits something of `kind`.
    pub fn bounty(self, kind: ActorKind) -> u32 {
        match (self, kind) {
            (Shooter::Fighter, ActorKind::Enemy) => ENEMY_BOUNTY,
            (Shooter::Fighter, ActorKind::FighterShot | ActorKind::EnemyShot) => SHOT_BOUNTY,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projectile {
    pub shooter: Shooter,
    /// Distance travelled per tick.
    pub velocity: (i32, i32),
}

impl Projectile {
    pub fn new(shooter: Shooter, velocity: (i32, i32)) -> Self {
        Self { shooter, velocity }
    }

    pub fn size() -> Size {
        Size::new(PROJECTILE_WIDTH, PROJECTILE_HEIGHT)
    }
}

impl Actor for Projectile {
    fn kind(&self) -> ActorKind {
        match self.shooter {
            Shooter::Fighter => ActorKind::FighterShot,
            Shooter::Enemy => ActorKind::EnemyShot,
        }
    }

    fn outline(&self, position: Point, size: Size) -> Vec<Point> {
        rectangle(position, size.width, size.height)
    }

    /// Takes whatever it hit down with it.
    fn on_collision(&self, _me: &Entity, _other: &Entity) -> Response {
        Response {
            kill_self: true,
            kill_other: true,
            ..Response::default()
        }
    }
}
