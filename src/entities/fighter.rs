use super::entity::{Actor, ActorKind, Entity, Response, Size};
use crate::geometry::Point;

/// Which part a fighter-shaped entity plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FighterRole {
    /// The ship under player control. Any contact starts the death timeout.
    Player,
    /// Life marker along the bottom edge.
    Reserve,
    /// Duplicate ship held by a capture beam's enemy.
    Captured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fighter {
    pub role: FighterRole,
}

impl Fighter {
    pub fn new(role: FighterRole) -> Self {
        Self { role }
    }

    /// Where the player's shots leave the ship.
    pub fn muzzle(position: Point, size: Size, shot_height: i32) -> Point {
        Point::new(position.x + size.width / 2, position.y - shot_height - 4)
    }
}

impl Actor for Fighter {
    fn kind(&self) -> ActorKind {
        match self.role {
            FighterRole::Player => ActorKind::Fighter,
            FighterRole::Reserve => ActorKind::ReserveFighter,
            FighterRole::Captured => ActorKind::CapturedFighter,
        }
    }

    fn outline(&self, position: Point, size: Size) -> Vec<Point> {
        // nose up, base along the bottom edge
        vec![
            position.offset(size.width / 2, 0),
            position.offset(size.width, size.height),
            position.offset(0, size.height),
        ]
    }

    fn on_collision(&self, _me: &Entity, _other: &Entity) -> Response {
        Response::default()
    }

    fn collides_by_default(&self) -> bool {
        self.role == FighterRole::Player
    }
}
