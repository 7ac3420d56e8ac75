use super::entity::{ActorKind, Entity, EntityId, Response, Size, Variant};
use crate::geometry::{Point, boxes_overlap, convex_overlap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactSide {
    pub id: EntityId,
    pub kind: ActorKind,
}

/// One overlap resolved during a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub mover: ContactSide,
    pub other: ContactSide,
    pub capture: bool,
}

impl Contact {
    /// The side of the given kind, and the side opposite it.
    pub fn side_of(&self, kind: ActorKind) -> Option<(ContactSide, ContactSide)> {
        if self.mover.kind == kind {
            Some((self.mover, self.other))
        } else if self.other.kind == kind {
            Some((self.other, self.mover))
        } else {
            None
        }
    }
}

/// The shared collision set: an arena of entities ordered by id.
///
/// Every reposition scans the moved entity against all other live,
/// collidable entities. Overlaps apply both parties' responses on the spot
/// and are logged as contacts for the controller to settle afterwards.
#[derive(Debug, Default)]
pub struct Registry {
    entities: Vec<Entity>,
    next_id: u32,
    contacts: Vec<Contact>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity without placing it. It has no polygon until its first
    /// `set_location`, so nothing can collide with it yet.
    pub fn spawn(&mut self, size: Size, variant: Variant) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        self.entities.push(Entity::new(id, size, variant));
        id
    }

    /// Spawns and places in one go.
    pub fn place(&mut self, size: Size, variant: Variant, position: Point) -> EntityId {
        let id = self.spawn(size, variant);
        self.set_location(id, position);
        id
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities
            .binary_search_by_key(&id, Entity::id)
            .ok()
            .filter(|&index| !self.entities[index].is_disposed())
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index_of(id).map(|index| &self.entities[index])
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.index_of(id).map(move |index| &mut self.entities[index])
    }

    /// Entities that haven't been disposed, in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|entity| !entity.is_disposed())
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.get(id).is_some_and(Entity::is_alive)
    }

    pub fn position(&self, id: EntityId) -> Option<Point> {
        self.get(id).map(Entity::position)
    }

    /// Moves an entity, rebuilds its polygon and resolves any overlaps.
    pub fn set_location(&mut self, id: EntityId, position: Point) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        let entity = &mut self.entities[index];
        entity.set_position(position);
        entity.regenerate();
        self.scan(index);
    }

    /// Translates an entity together with its cached polygon.
    pub fn shift(&mut self, id: EntityId, dx: i32, dy: i32) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        self.entities[index].translate(dx, dy);
        self.scan(index);
    }

    fn scan(&mut self, mover: usize) {
        for other in 0..self.entities.len() {
            if !self.entities[mover].is_collision_candidate() {
                break;
            }
            if other == mover {
                continue;
            }
            let (a, b) = (&self.entities[mover], &self.entities[other]);
            if !b.is_collision_candidate() || a.passes_through(b) {
                continue;
            }
            let near = match (a.bounds(), b.bounds()) {
                (Some(box_a), Some(box_b)) => boxes_overlap(box_a, box_b),
                _ => false,
            };
            if !near || !convex_overlap(a.polygon(), b.polygon()) {
                continue;
            }
            let contact = Contact {
                mover: ContactSide {
                    id: a.id(),
                    kind: a.kind(),
                },
                other: ContactSide {
                    id: b.id(),
                    kind: b.kind(),
                },
                capture: false,
            };

            let first = a.respond_to(b);
            self.apply(mover, other, first);
            let second = self.entities[other].respond_to(&self.entities[mover]);
            self.apply(other, mover, second);

            log::trace!(
                "contact {:?} {:?} <-> {:?} {:?}",
                contact.mover.kind,
                contact.mover.id,
                contact.other.kind,
                contact.other.id
            );
            self.contacts.push(Contact {
                capture: first.capture || second.capture,
                ..contact
            });
        }
    }

    fn apply(&mut self, actor: usize, target: usize, response: Response) {
        if response.kill_self {
            self.entities[actor].kill();
        }
        if response.kill_other {
            self.entities[target].kill();
        }
    }

    /// Marks an entity dead without any collision response.
    pub fn kill(&mut self, id: EntityId) {
        if let Some(entity) = self.get_mut(id) {
            entity.kill();
        }
    }

    pub fn set_alive(&mut self, id: EntityId, alive: bool) {
        if let Some(entity) = self.get_mut(id) {
            entity.set_alive(alive);
        }
    }

    /// Tombstones an entity. It disappears from lookups immediately and is
    /// dropped from storage on the next [`Registry::compact`].
    pub fn dispose(&mut self, id: EntityId) {
        if let Some(entity) = self.get_mut(id) {
            entity.disposed = true;
        }
    }

    pub fn compact(&mut self) {
        self.entities.retain(|entity| !entity.is_disposed());
    }

    /// Contacts logged since the last drain, oldest first.
    pub fn drain_contacts(&mut self) -> Vec<Contact> {
        std::mem::take(&mut self.contacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::enemy::Enemy;
    use crate::entities::fighter::{Fighter, FighterRole};
    use crate::entities::projectile::{Projectile, Shooter};

    fn shot(registry: &mut Registry, shooter: Shooter, at: Point) -> EntityId {
        registry.place(
            Projectile::size(),
            Variant::Projectile(Projectile::new(shooter, (0, -8))),
            at,
        )
    }

    fn enemy(registry: &mut Registry, at: Point) -> EntityId {
        registry.place(Size::square(24), Variant::Enemy(Enemy::new(0, 0)), at)
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut registry = Registry::new();
        let a = enemy(&mut registry, Point::new(0, 0));
        let b = enemy(&mut registry, Point::new(100, 0));
        assert!(a < b);
        registry.dispose(a);
        registry.compact();
        let c = enemy(&mut registry, Point::new(200, 0));
        assert!(b < c);
        assert!(registry.get(b).is_some());
        assert!(registry.get(a).is_none());
    }

    #[test]
    fn test_shot_kills_enemy() {
        let mut registry = Registry::new();
        let target = enemy(&mut registry, Point::new(100, 100));
        let bullet = shot(&mut registry, Shooter::Fighter, Point::new(150, 110));
        assert!(registry.drain_contacts().is_empty());

        registry.set_location(bullet, Point::new(111, 110));
        assert!(!registry.is_alive(target));
        assert!(!registry.is_alive(bullet));
        let bullet_entity = registry.get(bullet).unwrap();
        assert!(!bullet_entity.is_collidable());

        let contacts = registry.drain_contacts();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].mover.kind, ActorKind::FighterShot);
        assert_eq!(contacts[0].other.kind, ActorKind::Enemy);
        assert!(registry.drain_contacts().is_empty());
    }

    #[test]
    fn test_enemy_moving_into_shot() {
        let mut registry = Registry::new();
        let bullet = shot(&mut registry, Shooter::Fighter, Point::new(111, 110));
        let target = enemy(&mut registry, Point::new(300, 100));
        registry.set_location(target, Point::new(100, 100));
        assert!(!registry.is_alive(target));
        assert!(!registry.is_alive(bullet));
        assert_eq!(registry.drain_contacts().len(), 1);
    }

    #[test]
    fn test_dead_entities_never_collide_again() {
        let mut registry = Registry::new();
        let target = enemy(&mut registry, Point::new(100, 100));
        let bullet = shot(&mut registry, Shooter::Fighter, Point::new(111, 110));
        assert_eq!(registry.drain_contacts().len(), 1);

        for dy in 0..5 {
            registry.set_location(bullet, Point::new(111, 105 + dy));
            registry.set_location(target, Point::new(100, 100 + dy));
        }
        assert!(registry.drain_contacts().is_empty());
    }

    #[test]
    fn test_enemies_pass_through_each_other() {
        let mut registry = Registry::new();
        let a = enemy(&mut registry, Point::new(100, 100));
        let b = enemy(&mut registry, Point::new(105, 100));
        assert!(registry.is_alive(a));
        assert!(registry.is_alive(b));
        assert!(registry.drain_contacts().is_empty());
    }

    #[test]
    fn test_enemy_rams_fighter() {
        let mut registry = Registry::new();
        let fighter = registry.place(
            Size::square(24),
            Variant::Fighter(Fighter::new(FighterRole::Player)),
            Point::new(100, 100),
        );
        let target = enemy(&mut registry, Point::new(100, 95));
        assert!(!registry.is_alive(fighter));
        assert!(!registry.is_alive(target));
        let contacts = registry.drain_contacts();
        assert_eq!(contacts.len(), 1);
        assert!(contacts[0].side_of(ActorKind::Fighter).is_some());
    }

    #[test]
    fn test_reserve_fighters_ignore_everything() {
        let mut registry = Registry::new();
        let marker = registry.place(
            Size::square(18),
            Variant::Fighter(Fighter::new(FighterRole::Reserve)),
            Point::new(100, 100),
        );
        let bullet = shot(&mut registry, Shooter::Enemy, Point::new(105, 105));
        assert!(registry.is_alive(marker));
        assert!(registry.is_alive(bullet));
    }

    #[test]
    fn test_shots_cancel_out() {
        let mut registry = Registry::new();
        let down = shot(&mut registry, Shooter::Enemy, Point::new(100, 100));
        let up = shot(&mut registry, Shooter::Fighter, Point::new(101, 104));
        assert!(!registry.is_alive(down));
        assert!(!registry.is_alive(up));
        let contacts = registry.drain_contacts();
        assert_eq!(contacts.len(), 1);
        let (fighter_side, other) = contacts[0].side_of(ActorKind::FighterShot).unwrap();
        assert_eq!(fighter_side.id, up);
        assert_eq!(other.kind, ActorKind::EnemyShot);
    }

    #[test]
    fn test_shift_moves_polygon() {
        let mut registry = Registry::new();
        let bullet = shot(&mut registry, Shooter::Fighter, Point::new(10, 20));
        registry.shift(bullet, 5, -8);
        let entity = registry.get(bullet).unwrap();
        assert_eq!(entity.position(), Point::new(15, 12));
        assert_eq!(entity.polygon()[0], Point::new(15, 12));
        assert_eq!(entity.polygon()[2], Point::new(17, 20));
    }

    #[test]
    fn test_kill_spends_only_shots() {
        let mut registry = Registry::new();
        let target = enemy(&mut registry, Point::new(100, 100));
        let bullet = shot(&mut registry, Shooter::Enemy, Point::new(300, 300));
        registry.kill(target);
        registry.kill(bullet);

        let target = registry.get(target).unwrap();
        assert!(!target.is_alive());
        assert!(target.is_collidable());
        let bullet = registry.get(bullet).unwrap();
        assert!(!bullet.is_alive());
        assert!(!bullet.is_collidable());
    }

    #[test]
    fn test_disposed_entities_are_inert() {
        let mut registry = Registry::new();
        let target = enemy(&mut registry, Point::new(100, 100));
        registry.dispose(target);
        let bullet = shot(&mut registry, Shooter::Fighter, Point::new(111, 110));
        assert!(registry.is_alive(bullet));
        assert!(registry.drain_contacts().is_empty());
        registry.set_location(target, Point::new(0, 0));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unplaced_entity_has_no_overlap() {
        let mut registry = Registry::new();
        let target = registry.spawn(Size::square(24), Variant::Enemy(Enemy::new(0, 0)));
        let bullet = shot(&mut registry, Shooter::Fighter, Point::new(0, 0));
        assert!(registry.is_alive(target));
        assert!(registry.is_alive(bullet));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_at_most_one_contact_per_shot(
                positions in prop::collection::vec((0i32..200, 0i32..200), 1..12),
                x in 0i32..200,
                y in 0i32..200,
            ) {
                let mut registry = Registry::new();
                for (ex, ey) in positions {
                    enemy(&mut registry, Point::new(ex, ey));
                }
                registry.drain_contacts();
                shot(&mut registry, Shooter::Fighter, Point::new(x, y));
                let contacts = registry.drain_contacts();
                prop_assert!(contacts.len() <= 1);
                let dead = registry.iter().filter(|e| !e.is_alive()).count();
                prop_assert_eq!(dead, contacts.len() * 2);
            }
        }
    }
}
