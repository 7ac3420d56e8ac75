use super::entity::{Actor, ActorKind, Entity, EntityId, Response, Size};
use super::fighter::FighterRole;
use crate::geometry::Point;

/// Width of the beam at full reach.
pub const BEAM_WIDTH: i32 = 100;
/// Depth of the beam at full reach.
pub const BEAM_REACH: i32 = 100;
/// Fraction of the full width the beam keeps at its anchor.
pub const BEAM_TAPER: f64 = 0.8;
/// Reach increments between retracted and fully extended.
pub const BEAM_STEPS: u8 = 10;
/// Ticks spent fully extended before retracting.
pub const BEAM_PAUSE_TICKS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStatus {
    /// The enemy is still flying to its hover point.
    Approaching,
    Engaging,
    Pausing,
    Disengaging,
    /// Beam retracted, enemy returning to the formation.
    Leaving,
}

/// Tractor beam hanging from a hovering enemy.
///
/// The entity's position is the anchor, the top centre of the trapezoid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureBeam {
    status: CaptureStatus,
    reach: u8,
    paused_ticks: u32,
    enemy: EntityId,
    captured: Option<EntityId>,
}

impl CaptureBeam {
    pub fn new(enemy: EntityId) -> Self {
        Self {
            status: CaptureStatus::Approaching,
            reach: 0,
            paused_ticks: 0,
            enemy,
            captured: None,
        }
    }

    pub fn size() -> Size {
        Size::new(BEAM_WIDTH, BEAM_REACH)
    }

    pub fn status(&self) -> CaptureStatus {
        self.status
    }

    /// Current extension, 0.0 (retracted) to 1.0 (full reach).
    pub fn reach(&self) -> f64 {
        f64::from(self.reach) / f64::from(BEAM_STEPS)
    }

    /// The enemy the beam hangs from.
    pub fn enemy(&self) -> EntityId {
        self.enemy
    }

    pub fn captured(&self) -> Option<EntityId> {
        self.captured
    }

    /// Anchor point for a beam hanging from an enemy at `position`.
    pub fn anchor(position: Point, size: Size) -> Point {
        Point::new(position.x + size.width / 2, position.y + size.height)
    }

    /// Enemy position from which a fully extended beam reaches the middle
    /// of a fighter at `fighter`.
    pub fn hover_point(fighter: Point, fighter_size: Size, enemy_size: Size) -> Point {
        Point::new(
            fighter.x + fighter_size.width / 2 - enemy_size.width / 2,
            fighter.y + fighter_size.height / 2 - BEAM_REACH - enemy_size.height,
        )
    }

    /// Called once the enemy reaches its hover point.
    pub fn engage(&mut self) {
        if self.status == CaptureStatus::Approaching {
            self.status = CaptureStatus::Engaging;
        }
    }

    /// Records the captured duplicate and starts retracting.
    pub fn capture(&mut self, fighter: EntityId) {
        self.captured = Some(fighter);
        self.status = CaptureStatus::Disengaging;
    }

    /// One tick of the beam's state machine. Returns the new status when it
    /// changed.
    pub fn advance(&mut self) -> Option<CaptureStatus> {
        let before = self.status;
        match self.status {
            CaptureStatus::Approaching | CaptureStatus::Leaving => {}
            CaptureStatus::Engaging => {
                self.reach = (self.reach + 1).min(BEAM_STEPS);
                if self.reach == BEAM_STEPS {
                    self.paused_ticks = 0;
                    self.status = CaptureStatus::Pausing;
                }
            }
            CaptureStatus::Pausing => {
                self.paused_ticks += 1;
                if self.paused_ticks > BEAM_PAUSE_TICKS {
                    self.status = CaptureStatus::Disengaging;
                }
            }
            CaptureStatus::Disengaging => {
                self.reach = self.reach.saturating_sub(1);
                if self.reach == 0 {
                    self.status = CaptureStatus::Leaving;
                }
            }
        }
        (self.status != before).then_some(self.status)
    }
}

impl Actor for CaptureBeam {
    fn kind(&self) -> ActorKind {
        ActorKind::CaptureBeam
    }

    /// Trapezoid widening away from the anchor. Empty while retracted.
    fn outline(&self, anchor: Point, size: Size) -> Vec<Point> {
        if self.reach == 0 {
            return Vec::new();
        }
        let reach = self.reach();
        let top = (f64::from(size.width) * BEAM_TAPER / 2.0).round() as i32;
        let bottom =
            (f64::from(size.width) * (BEAM_TAPER + reach * (1.0 - BEAM_TAPER)) / 2.0).round() as i32;
        let depth = (f64::from(size.height) * reach).round() as i32;
        vec![
            anchor.offset(-top, 0),
            anchor.offset(top, 0),
            anchor.offset(bottom, depth),
            anchor.offset(-bottom, depth),
        ]
    }

    fn on_collision(&self, me: &Entity, other: &Entity) -> Response {
        let catches = me.is_alive()
            && self.reach > 0
            && self.captured.is_none()
            && other.fighter_role() == Some(FighterRole::Player);
        Response {
            kill_other: catches,
            capture: catches,
            ..Response::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beam() -> CaptureBeam {
        CaptureBeam::new(EntityId::new(1))
    }

    #[test]
    fn test_beam_starts_approaching_and_retracted() {
        let beam = beam();
        assert_eq!(beam.status(), CaptureStatus::Approaching);
        assert_eq!(beam.reach(), 0.0);
        assert!(beam.outline(Point::new(50, 50), CaptureBeam::size()).is_empty());
    }

    #[test]
    fn test_advance_waits_until_engaged() {
        let mut beam = beam();
        assert_eq!(beam.advance(), None);
        assert_eq!(beam.status(), CaptureStatus::Approaching);
    }

    #[test]
    fn test_full_cycle() {
        let mut beam = beam();
        beam.engage();
        let mut transitions = Vec::new();
        let mut ticks = 0;
        while beam.status() != CaptureStatus::Leaving {
            if let Some(status) = beam.advance() {
                transitions.push(status);
            }
            ticks += 1;
            assert!(ticks < 100);
        }
        assert_eq!(
            transitions,
            vec![
                CaptureStatus::Pausing,
                CaptureStatus::Disengaging,
                CaptureStatus::Leaving
            ]
        );
        // 10 out, 11 paused, 10 back
        assert_eq!(ticks, 31);
        assert_eq!(beam.reach(), 0.0);
    }

    #[test]
    fn test_full_reach_outline() {
        let mut beam = beam();
        beam.engage();
        for _ in 0..BEAM_STEPS {
            beam.advance();
        }
        assert_eq!(beam.reach(), 1.0);
        assert_eq!(
            beam.outline(Point::new(200, 100), CaptureBeam::size()),
            vec![
                Point::new(160, 100),
                Point::new(240, 100),
                Point::new(250, 200),
                Point::new(150, 200)
            ]
        );
    }

    #[test]
    fn test_capture_switches_to_disengaging() {
        let mut beam = beam();
        beam.engage();
        beam.advance();
        beam.capture(EntityId::new(9));
        assert_eq!(beam.status(), CaptureStatus::Disengaging);
        assert_eq!(beam.captured(), Some(EntityId::new(9)));
        assert_eq!(beam.advance(), Some(CaptureStatus::Leaving));
    }

    #[test]
    fn test_hover_point_reaches_fighter_middle() {
        let fighter = Point::new(188, 556);
        let hover = CaptureBeam::hover_point(fighter, Size::square(24), Size::square(24));
        let anchor = CaptureBeam::anchor(hover, Size::square(24));
        assert_eq!(anchor.x, 200);
        assert_eq!(anchor.y + BEAM_REACH, 568);
    }
}
