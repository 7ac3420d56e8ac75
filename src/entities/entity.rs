use super::capture_beam::CaptureBeam;
use super::enemy::Enemy;
use super::fighter::{Fighter, FighterRole};
use super::projectile::Projectile;
use crate::geometry::{Point, bounding_box};
use crate::path::Path;

/// Stable handle into the collision registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u32);

impl EntityId {
    pub(crate) const fn new(raw: u32) -> Self {
        Self(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub const fn square(side: i32) -> Self {
        Self::new(side, side)
    }
}

/// Type tag handed to renderers and used for collision rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorKind {
    Fighter,
    ReserveFighter,
    CapturedFighter,
    Enemy,
    FighterShot,
    EnemyShot,
    CaptureBeam,
}

impl ActorKind {
    pub fn is_projectile(self) -> bool {
        matches!(self, ActorKind::FighterShot | ActorKind::EnemyShot)
    }
}

/// What one party of a collision does about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Response {
    pub kill_self: bool,
    pub kill_other: bool,
    /// The other party was caught by a capture beam.
    pub capture: bool,
}

/// Behaviour every concrete entity supplies.
pub trait Actor {
    fn kind(&self) -> ActorKind;

    /// Collision shape for an entity at `position` with `size`. Must be convex.
    fn outline(&self, position: Point, size: Size) -> Vec<Point>;

    /// Response to touching `other`. `me` is the entity carrying this actor.
    fn on_collision(&self, me: &Entity, other: &Entity) -> Response;

    /// Whether a freshly spawned entity takes part in collisions.
    fn collides_by_default(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
    Fighter(Fighter),
    Enemy(Enemy),
    Projectile(Projectile),
    CaptureBeam(CaptureBeam),
}

impl Variant {
    fn actor(&self) -> &dyn Actor {
        match self {
            Variant::Fighter(fighter) => fighter,
            Variant::Enemy(enemy) => enemy,
            Variant::Projectile(projectile) => projectile,
            Variant::CaptureBeam(beam) => beam,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    position: Point,
    size: Size,
    polygon: Vec<Point>,
    bounds: Option<(Point, Point)>,
    alive: bool,
    collidable: bool,
    path: Option<Path>,
    variant: Variant,
    pub(super) disposed: bool,
}

impl Entity {
    pub(crate) fn new(id: EntityId, size: Size, variant: Variant) -> Self {
        let collidable = variant.actor().collides_by_default();
        Self {
            id,
            position: Point::default(),
            size,
            polygon: Vec::new(),
            bounds: None,
            alive: true,
            collidable,
            path: None,
            variant,
            disposed: false,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn polygon(&self) -> &[Point] {
        &self.polygon
    }

    /// Bounding box of the polygon, `None` while it's empty.
    pub fn bounds(&self) -> Option<(Point, Point)> {
        self.bounds
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_collidable(&self) -> bool {
        self.collidable
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    pub fn kind(&self) -> ActorKind {
        self.variant.actor().kind()
    }

    pub fn as_enemy(&self) -> Option<&Enemy> {
        match &self.variant {
            Variant::Enemy(enemy) => Some(enemy),
            _ => None,
        }
    }

    pub fn as_beam(&self) -> Option<&CaptureBeam> {
        match &self.variant {
            Variant::CaptureBeam(beam) => Some(beam),
            _ => None,
        }
    }

    pub fn as_projectile(&self) -> Option<&Projectile> {
        match &self.variant {
            Variant::Projectile(projectile) => Some(projectile),
            _ => None,
        }
    }

    pub fn fighter_role(&self) -> Option<FighterRole> {
        match &self.variant {
            Variant::Fighter(fighter) => Some(fighter.role),
            _ => None,
        }
    }

    pub(crate) fn variant_mut(&mut self) -> &mut Variant {
        &mut self.variant
    }

    pub(crate) fn path_mut(&mut self) -> Option<&mut Path> {
        self.path.as_mut()
    }

    pub(crate) fn set_path(&mut self, path: Option<Path>) {
        self.path = path;
    }

    pub(crate) fn set_alive(&mut self, alive: bool) {
        self.alive = alive;
    }

    pub(super) fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    /// Recomputes the polygon from the current position and size.
    pub(super) fn regenerate(&mut self) {
        self.polygon = self.variant.actor().outline(self.position, self.size);
        self.bounds = bounding_box(&self.polygon);
    }

    pub(super) fn translate(&mut self, dx: i32, dy: i32) {
        self.position = self.position.offset(dx, dy);
        for vertex in &mut self.polygon {
            *vertex = vertex.offset(dx, dy);
        }
        self.bounds = self
            .bounds
            .map(|(lo, hi)| (lo.offset(dx, dy), hi.offset(dx, dy)));
    }

    pub(super) fn respond_to(&self, other: &Entity) -> Response {
        self.variant.actor().on_collision(self, other)
    }

    pub(super) fn kill(&mut self) {
        self.alive = false;
        // a spent shot stops counting as a live hit
        if self.kind().is_projectile() {
            self.collidable = false;
        }
    }

    /// Takes part in collision scans right now.
    pub fn is_collision_candidate(&self) -> bool {
        self.alive && self.collidable && !self.is_disposed()
    }

    /// Pairs that never collide: enemies fly through each other, and a
    /// capture beam only ever touches fighters.
    pub fn passes_through(&self, other: &Entity) -> bool {
        match (self.kind(), other.kind()) {
            (ActorKind::Enemy, ActorKind::Enemy) => true,
            (ActorKind::CaptureBeam, kind) | (kind, ActorKind::CaptureBeam) => {
                kind != ActorKind::Fighter
            }
            _ => false,
        }
    }
}
