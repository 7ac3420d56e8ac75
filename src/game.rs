use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::config::GameConfig;
use crate::entities::{
    ActorKind, CaptureBeam, CaptureStatus, Enemy, Entity, EntityId, Fighter, FighterRole,
    Formation, Projectile, Registry, Shooter, Size, Variant,
};
use crate::error::SimError;
use crate::geometry::Point;
use crate::level::{Tunables, completion_bonus, grants_life};
use crate::path::{CONTROL_MARGIN, Maneuver, Path, PathStatus, PathStep};

/// Points for a diver making it back into formation.
pub const REGROUP_BONUS: u32 = 5;

/// Life markers are this much smaller than the fighter.
const MARKER_SHRINK: i32 = 6;

/// Raw input flags for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickInput {
    pub fire: bool,
    pub move_right: bool,
    pub move_left: bool,
}

/// Everything a renderer needs about one live entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorView<'a> {
    pub id: EntityId,
    pub kind: ActorKind,
    pub position: Point,
    pub size: Size,
    pub polygon: &'a [Point],
}

/// A fighter duplicate towed by the enemy that captured it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Captive {
    fighter: EntityId,
    enemy: EntityId,
}

enum Dispatch {
    Launched,
    Busy,
    Cleared,
}

/// The per-tick simulation. Owns the collision registry, the formation and
/// the RNG.
///
/// A front end calls [`Game::tick`] once per frame with the current input
/// flags and reads [`Game::actors`] plus the scalar accessors to draw the
/// result.
#[derive(Debug)]
pub struct Game {
    config: GameConfig,
    registry: Registry,
    formation: Formation,
    fighter: EntityId,
    life_markers: Vec<EntityId>,
    shots: Vec<EntityId>,
    beam: Option<EntityId>,
    captives: Vec<Captive>,
    tunables: Tunables,
    level: u32,
    score: u32,
    lives: u32,
    dead_player_timeout: Option<u32>,
    last_fighter_shot: u64,
    rng: Pcg32,
}

impl Game {
    /// Builds a session at level 1. Fails if the playfield can't hold the
    /// formation or the flight paths.
    pub fn new(config: GameConfig) -> Result<Self, SimError> {
        config.validate()?;

        let mut registry = Registry::new();
        let fighter_size = Size::square(config.enemy_size);
        let fighter = registry.place(
            fighter_size,
            Variant::Fighter(Fighter::new(FighterRole::Player)),
            fighter_home(&config),
        );

        let mut game = Self {
            formation: Formation::new(
                Point::default(),
                0,
                0,
                config.enemy_size,
                config.enemy_spacing,
            ),
            registry,
            fighter,
            life_markers: Vec::new(),
            shots: Vec::new(),
            beam: None,
            captives: Vec::new(),
            tunables: Tunables::for_level(1),
            level: 0,
            score: 0,
            lives: config.starting_lives,
            dead_player_timeout: None,
            last_fighter_shot: 0,
            rng: Pcg32::seed_from_u64(config.seed),
            config,
        };
        log::info!(
            "new session: {}x{} field, seed {}, {} lives",
            game.config.width,
            game.config.height,
            game.config.seed,
            game.lives
        );
        game.set_level(1);
        Ok(game)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Spare lives, not counting the fighter on the field.
    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// True while the fighter is alive or a spare life remains.
    pub fn is_running(&self) -> bool {
        self.registry.is_alive(self.fighter) || self.lives > 0
    }

    pub fn fighter(&self) -> Option<&Entity> {
        self.registry.get(self.fighter)
    }

    pub fn formation(&self) -> &Formation {
        &self.formation
    }

    pub fn tunables(&self) -> Tunables {
        self.tunables
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.registry.get(id)
    }

    /// Ticks left before the next life is used, while the fighter is down.
    pub fn death_timeout(&self) -> Option<u32> {
        self.dead_player_timeout
    }

    pub fn capture_status(&self) -> Option<CaptureStatus> {
        self.beam().map(CaptureBeam::status)
    }

    /// Live entities in registry order.
    pub fn actors(&self) -> impl Iterator<Item = ActorView<'_>> {
        self.registry
            .iter()
            .filter(|entity| entity.is_alive())
            .map(|entity| ActorView {
                id: entity.id(),
                kind: entity.kind(),
                position: entity.position(),
                size: entity.size(),
                polygon: entity.polygon(),
            })
    }

    /// Advances the simulation by one frame.
    pub fn tick(&mut self, tick: u64, input: TickInput) {
        if tick % 2 == 0 {
            self.move_formation();
            self.settle();
        }
        self.update_capture();
        self.settle();
        self.move_shots();
        self.settle();
        if input.fire {
            self.fire_fighter(tick);
            self.settle();
        }
        self.move_fighter(input);
        self.settle();
        if tick % self.tunables.fire_delay == 0 {
            self.fire_enemy();
            self.settle();
        }

        match self.dead_player_timeout {
            Some(0) => {
                self.dead_player_timeout = None;
                self.consume_life();
            }
            Some(remaining) => self.dead_player_timeout = Some(remaining - 1),
            None => {
                if tick % self.tunables.dispatch_delay == 0
                    && self.moving_count() <= self.tunables.max_moving
                {
                    if let Dispatch::Cleared = self.dispatch() {
                        self.set_level(self.level + 1);
                    }
                    self.settle();
                }
            }
        }
        self.registry.compact();
    }

    fn field(&self) -> (i32, i32) {
        (self.config.width, self.config.height)
    }

    /// Rows that fit between the top margin and the lowest flight-path
    /// control point.
    fn max_rows(&self) -> usize {
        let pitch = self.config.enemy_size + self.config.enemy_spacing;
        let room = fighter_home(&self.config).y - CONTROL_MARGIN - self.config.margin;
        ((room + self.config.enemy_spacing) / pitch).max(1) as usize
    }

    fn set_level(&mut self, level: u32) {
        self.level = level;
        self.tunables = Tunables::for_field(level, self.max_rows());

        for shot in self.shots.drain(..) {
            self.registry.dispose(shot);
        }
        self.dispose_beam();
        for captive in self.captives.drain(..) {
            self.registry.dispose(captive.fighter);
        }

        self.score += completion_bonus(level);
        if grants_life(level) {
            self.lives += 1;
        }

        for id in self.formation.enemies.drain(..) {
            self.registry.dispose(id);
        }
        for id in self.life_markers.drain(..) {
            self.registry.dispose(id);
        }

        let size = self.config.enemy_size;
        let spacing = self.config.enemy_spacing;
        let columns = Formation::columns_for(self.config.width, self.config.margin, size, spacing);
        let corner =
            Formation::centred_corner(self.config.width, self.config.margin, columns, size, spacing);
        self.formation = Formation::new(corner, columns, self.tunables.rows, size, spacing);
        for column in 0..columns {
            for row in 0..self.tunables.rows {
                let id = self
                    .registry
                    .spawn(Size::square(size), Variant::Enemy(Enemy::new(column, row)));
                self.formation.enemies.push(id);
            }
        }
        self.formation.park(&mut self.registry);

        let marker = size - MARKER_SHRINK;
        for i in 0..self.lives as i32 {
            let id = self.registry.place(
                Size::square(marker),
                Variant::Fighter(Fighter::new(FighterRole::Reserve)),
                Point::new(marker * i, self.config.height - marker),
            );
            self.life_markers.push(id);
        }

        self.registry.compact();
        self.settle();
        log::info!(
            "level {}: {}x{} formation, {} lives, score {}",
            level,
            columns,
            self.tunables.rows,
            self.lives,
            self.score
        );
    }

    /// Applies the scoring and state changes for contacts logged since the
    /// last call.
    fn settle(&mut self) {
        for contact in self.registry.drain_contacts() {
            if contact.side_of(ActorKind::Fighter).is_some()
                && !self.registry.is_alive(self.fighter)
                && self.dead_player_timeout.is_none()
            {
                self.dead_player_timeout = Some(self.config.death_timeout_ticks);
                log::debug!("fighter down, {} lives left", self.lives);
            }
            if let Some((_, other)) = contact.side_of(ActorKind::FighterShot) {
                self.score += Shooter::Fighter.bounty(other.kind);
            }
            if contact.capture {
                self.capture_fighter();
            }
        }
    }

    fn move_formation(&mut self) {
        // the fallen drop their flight paths and rejoin the grid as wrecks
        for id in self.formation.enemies.clone() {
            if self.registry.get(id).is_some_and(|enemy| !enemy.is_alive()) {
                self.set_path(id, None);
            }
        }
        self.formation.step(
            &self.registry,
            self.config.width,
            self.config.margin,
            self.config.nudge,
        );
        self.formation.park(&mut self.registry);

        let enemies = self.formation.enemies.clone();
        for id in enemies {
            self.fly(id);
        }

        for captive in self.captives.clone() {
            let flying = self
                .registry
                .get(captive.fighter)
                .is_some_and(|fighter| fighter.path().is_some());
            if flying {
                self.fly(captive.fighter);
            } else if let Some(dock) = self.dock_point(captive.enemy) {
                self.registry.set_location(captive.fighter, dock);
            }
        }
    }

    /// Moves an entity one step along its path, if it has one.
    fn fly(&mut self, id: EntityId) {
        let Some(entity) = self.registry.get(id) else {
            return;
        };
        let Some(path) = entity.path() else {
            return;
        };
        let maneuver = path.maneuver();
        if !entity.is_alive() {
            return;
        }

        let target = if maneuver.tracks_target() {
            self.tracking_target(id, maneuver)
        } else {
            None
        };
        let step = self.tunables.path_step;
        let Some(path) = self.registry.get_mut(id).and_then(Entity::path_mut) else {
            return;
        };
        if let Some(target) = target {
            path.retarget(target);
        }
        let Some(PathStep { position, status }) = path.advance(step) else {
            return;
        };
        self.registry.set_location(id, position);
        if status == PathStatus::Completed && self.registry.is_alive(id) {
            self.finish_maneuver(id, maneuver);
        }
    }

    fn tracking_target(&self, id: EntityId, maneuver: Maneuver) -> Option<Point> {
        match maneuver {
            Maneuver::Regroup { .. } => self.slot_of(id),
            Maneuver::Escort { enemy } => self.dock_point(enemy),
            Maneuver::Dive | Maneuver::Hover => None,
        }
    }

    fn finish_maneuver(&mut self, id: EntityId, maneuver: Maneuver) {
        match maneuver {
            Maneuver::Dive => {
                // re-enter from above the field
                let Some(position) = self.registry.position(id) else {
                    return;
                };
                let above = Point::new(position.x, -self.config.dive_offset);
                self.registry.set_location(id, above);
                if let Some(slot) = self.slot_of(id) {
                    let path = Path::new(
                        above,
                        slot,
                        self.field(),
                        Maneuver::Regroup { bonus: true },
                        &mut self.rng,
                    );
                    self.set_path(id, Some(path));
                }
            }
            Maneuver::Regroup { bonus } => {
                self.set_path(id, None);
                if bonus {
                    self.score += REGROUP_BONUS;
                }
                let leaving = self.beam().is_some_and(|beam| {
                    beam.enemy() == id && beam.status() == CaptureStatus::Leaving
                });
                if leaving {
                    self.dispose_beam();
                }
            }
            Maneuver::Hover => {
                if let Some(beam) = self.beam_mut().filter(|beam| beam.enemy() == id) {
                    beam.engage();
                }
            }
            Maneuver::Escort { .. } => self.set_path(id, None),
        }
    }

    fn set_path(&mut self, id: EntityId, path: Option<Path>) {
        if let Some(entity) = self.registry.get_mut(id) {
            entity.set_path(path);
        }
    }

    fn slot_of(&self, id: EntityId) -> Option<Point> {
        let enemy = self.registry.get(id)?.as_enemy()?;
        Some(self.formation.slot_position(enemy.column, enemy.row))
    }

    /// Where a captured fighter rides: directly above its captor.
    fn dock_point(&self, enemy: EntityId) -> Option<Point> {
        let position = self.registry.position(enemy)?;
        Some(position.offset(0, -self.config.enemy_size))
    }

    fn moving_count(&self) -> usize {
        self.formation
            .enemies
            .iter()
            .filter_map(|&id| self.registry.get(id))
            .filter(|enemy| enemy.is_alive() && enemy.path().is_some())
            .count()
    }

    fn move_shots(&mut self) {
        let (width, height) = self.field();
        for id in std::mem::take(&mut self.shots) {
            let Some(velocity) = self
                .registry
                .get(id)
                .and_then(Entity::as_projectile)
                .map(|shot| shot.velocity)
            else {
                continue;
            };
            if self.registry.is_alive(id) {
                self.registry.shift(id, velocity.0, velocity.1);
            }
            let keep = self.registry.get(id).is_some_and(|shot| {
                let at = shot.position();
                shot.is_alive() && (0..=width).contains(&at.x) && (0..=height).contains(&at.y)
            });
            if keep {
                self.shots.push(id);
            } else {
                self.registry.dispose(id);
            }
        }
    }

    fn spawn_shot(&mut self, shooter: Shooter, position: Point, velocity: (i32, i32)) -> EntityId {
        let id = self.registry.place(
            Projectile::size(),
            Variant::Projectile(Projectile::new(shooter, velocity)),
            position,
        );
        self.shots.push(id);
        id
    }

    fn fire_fighter(&mut self, tick: u64) {
        if tick.saturating_sub(self.last_fighter_shot) <= self.config.fighter_fire_cooldown {
            return;
        }
        let Some(fighter) = self.fighter().filter(|fighter| fighter.is_alive()) else {
            return;
        };
        let muzzle = Fighter::muzzle(
            fighter.position(),
            fighter.size(),
            Projectile::size().height,
        );
        self.spawn_shot(
            Shooter::Fighter,
            muzzle,
            (0, -self.config.projectile_speed),
        );
        self.last_fighter_shot = tick;
    }

    fn move_fighter(&mut self, input: TickInput) {
        let dx = match (input.move_left, input.move_right) {
            (true, false) => -4 * self.config.nudge,
            (false, true) => 4 * self.config.nudge,
            _ => return,
        };
        let Some(fighter) = self.fighter().filter(|fighter| fighter.is_alive()) else {
            return;
        };
        let position = fighter.position();
        let right = self.config.width - self.config.margin - fighter.size().width;
        let x = (position.x + dx).clamp(self.config.margin, right.max(self.config.margin));
        self.registry
            .set_location(self.fighter, Point::new(x, position.y));
    }

    /// One shot from the bottom-most live enemy of a random live column.
    fn fire_enemy(&mut self) {
        if !self.registry.is_alive(self.fighter) {
            return;
        }
        let columns = self.formation.live_columns(&self.registry);
        if columns.is_empty() {
            return;
        }
        let column = columns[self.rng.random_range(0..columns.len())];
        let Some(muzzle) = self
            .formation
            .bottom_most_alive(&self.registry, column)
            .and_then(|id| self.registry.get(id))
            .map(|enemy| Enemy::muzzle(enemy.position(), enemy.size()))
        else {
            return;
        };
        self.spawn_shot(Shooter::Enemy, muzzle, (0, self.config.projectile_speed));
    }

    /// Sends a random idle enemy on a dive, or on a capture run.
    fn dispatch(&mut self) -> Dispatch {
        if !self.formation.any_alive(&self.registry) {
            return Dispatch::Cleared;
        }
        let idle: Vec<EntityId> = self
            .formation
            .enemies
            .iter()
            .copied()
            .filter(|&id| {
                self.registry
                    .get(id)
                    .is_some_and(|enemy| enemy.is_alive() && enemy.path().is_none())
            })
            .collect();
        if idle.is_empty() {
            return Dispatch::Busy;
        }
        let id = idle[self.rng.random_range(0..idle.len())];

        let odds = self.config.capture_beam_odds;
        if odds > 0
            && self.beam.is_none()
            && self.registry.is_alive(self.fighter)
            && self.rng.random_range(0..odds) == 0
        {
            self.launch_capture(id);
            return Dispatch::Launched;
        }

        let (Some(start), Some(fighter)) = (
            self.registry.position(id),
            self.registry.position(self.fighter),
        ) else {
            return Dispatch::Busy;
        };
        let target = fighter.offset(0, self.config.dive_offset);
        let path = Path::new(start, target, self.field(), Maneuver::Dive, &mut self.rng);
        self.set_path(id, Some(path));
        log::debug!("dispatched {:?} on a dive toward {:?}", id, target);
        Dispatch::Launched
    }

    fn beam(&self) -> Option<&CaptureBeam> {
        self.beam
            .and_then(|id| self.registry.get(id))
            .and_then(Entity::as_beam)
    }

    fn beam_mut(&mut self) -> Option<&mut CaptureBeam> {
        let id = self.beam?;
        match self.registry.get_mut(id)?.variant_mut() {
            Variant::CaptureBeam(beam) => Some(beam),
            _ => None,
        }
    }

    fn dispose_beam(&mut self) {
        if let Some(id) = self.beam.take() {
            self.registry.dispose(id);
        }
    }

    fn launch_capture(&mut self, id: EntityId) {
        let (Some(enemy), Some(fighter)) = (self.registry.get(id), self.fighter()) else {
            return;
        };
        let start = enemy.position();
        let enemy_size = enemy.size();
        let hover = CaptureBeam::hover_point(fighter.position(), fighter.size(), enemy_size);

        let path = Path::new(start, hover, self.field(), Maneuver::Hover, &mut self.rng);
        self.set_path(id, Some(path));
        let beam = self.registry.place(
            CaptureBeam::size(),
            Variant::CaptureBeam(CaptureBeam::new(id)),
            CaptureBeam::anchor(start, enemy_size),
        );
        self.beam = Some(beam);
        log::debug!("{:?} heading to {:?} with a capture beam", id, hover);
    }

    /// Runs the beam's state machine and keeps it hanging under its enemy.
    fn update_capture(&mut self) {
        let orphaned: Vec<Captive> = self
            .captives
            .iter()
            .copied()
            .filter(|captive| !self.registry.is_alive(captive.enemy))
            .collect();
        for captive in orphaned {
            self.registry.dispose(captive.fighter);
        }
        self.captives
            .retain(|captive| self.registry.is_alive(captive.enemy));

        let Some(beam_id) = self.beam else {
            return;
        };
        let Some(enemy) = self.beam().map(CaptureBeam::enemy) else {
            self.beam = None;
            return;
        };
        if !self.registry.is_alive(enemy) {
            self.dispose_beam();
            return;
        }

        let transition = self.beam_mut().and_then(CaptureBeam::advance);
        if let Some(anchor) = self
            .registry
            .get(enemy)
            .map(|enemy| CaptureBeam::anchor(enemy.position(), enemy.size()))
        {
            self.registry.set_location(beam_id, anchor);
        }

        if transition == Some(CaptureStatus::Leaving) {
            if let (Some(start), Some(slot)) = (self.registry.position(enemy), self.slot_of(enemy))
            {
                let path = Path::new(
                    start,
                    slot,
                    self.field(),
                    Maneuver::Regroup { bonus: false },
                    &mut self.rng,
                );
                self.set_path(enemy, Some(path));
            }
        }
    }

    /// The beam caught the fighter: a duplicate is towed up to the captor.
    fn capture_fighter(&mut self) {
        let Some(enemy) = self.beam().map(CaptureBeam::enemy) else {
            return;
        };
        let Some((position, size)) = self
            .fighter()
            .map(|fighter| (fighter.position(), fighter.size()))
        else {
            return;
        };
        let Some(dock) = self.dock_point(enemy) else {
            return;
        };

        let captive = self.registry.place(
            size,
            Variant::Fighter(Fighter::new(FighterRole::Captured)),
            position,
        );
        let path = Path::new(
            position,
            dock,
            self.field(),
            Maneuver::Escort { enemy },
            &mut self.rng,
        );
        self.set_path(captive, Some(path));
        if let Some(beam) = self.beam_mut() {
            beam.capture(captive);
        }
        self.captives.push(Captive {
            fighter: captive,
            enemy,
        });
        log::debug!("fighter captured by {:?}", enemy);
    }

    fn consume_life(&mut self) {
        if self.lives == 0 {
            return;
        }
        self.lives -= 1;
        self.registry.set_alive(self.fighter, true);
        let marker = self
            .life_markers
            .iter()
            .rev()
            .copied()
            .find(|&id| self.registry.is_alive(id));
        if let Some(marker) = marker {
            self.registry.set_alive(marker, false);
        }
        log::debug!("life used, {} left", self.lives);
    }
}

/// Starting spot of the fighter: bottom centre, one margin up.
fn fighter_home(config: &GameConfig) -> Point {
    Point::new(
        config.width / 2 - config.enemy_size / 2,
        config.height - config.margin - config.enemy_size,
    )
}
