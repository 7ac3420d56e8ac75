use rand::Rng;

use crate::entities::EntityId;
use crate::geometry::Point;

/// Vertical band at the bottom of the field that control points avoid.
pub const CONTROL_MARGIN: i32 = 100;

/// Progress value at which the end point is reached.
pub const PROGRESS_COMPLETE: f64 = 100.0;

/// What the controller does with a flight once it lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Maneuver {
    /// Swoop past the fighter, then re-enter from above the field.
    Dive,
    /// Fly back into the formation slot, tracking it as it moves.
    Regroup { bonus: bool },
    /// Fly above the fighter and hold there while a capture beam runs.
    Hover,
    /// Captured fighter being towed beneath its captor.
    Escort { enemy: EntityId },
}

impl Maneuver {
    /// Whether the destination follows a moving target every step.
    pub fn tracks_target(&self) -> bool {
        matches!(self, Maneuver::Regroup { .. } | Maneuver::Escort { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStatus {
    InProgress,
    Completed,
}

/// Outcome of one [`Path::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep {
    pub position: Point,
    pub status: PathStatus,
}

/// Quadratic Bezier flight from the follower's position through a random
/// control point to a destination that may move while the path is flying.
/// Progress goes from 0 to [`PROGRESS_COMPLETE`] in steps set per level.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    start: Point,
    control: Point,
    end: Point,
    progress: f64,
    completed: bool,
    maneuver: Maneuver,
}

impl Path {
    /// Starts a path at `start` heading for `end`, with a control point drawn
    /// uniformly over the field minus its bottom [`CONTROL_MARGIN`].
    pub fn new<R: Rng + ?Sized>(
        start: Point,
        end: Point,
        field: (i32, i32),
        maneuver: Maneuver,
        rng: &mut R,
    ) -> Self {
        let (width, height) = field;
        let control = Point::new(
            rng.random_range(0..width.max(1)),
            rng.random_range(0..(height - CONTROL_MARGIN).max(1)),
        );
        Self::with_control(start, control, end, maneuver)
    }

    pub fn with_control(start: Point, control: Point, end: Point, maneuver: Maneuver) -> Self {
        Self {
            start,
            control,
            end,
            progress: 0.0,
            completed: false,
            maneuver,
        }
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn control(&self) -> Point {
        self.control
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn maneuver(&self) -> Maneuver {
        self.maneuver
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Moves the destination without touching progress or the control point.
    pub fn retarget(&mut self, end: Point) {
        self.end = end;
    }

    /// Position on the curve at the given progress (0..=100, clamped).
    pub fn point_at(&self, progress: f64) -> Point {
        let t = (progress / PROGRESS_COMPLETE).clamp(0.0, 1.0);
        let u = 1.0 - t;
        let blend = |p0: i32, p1: i32, p2: i32| {
            (u * u * p0 as f64 + 2.0 * u * t * p1 as f64 + t * t * p2 as f64).floor() as i32
        };
        Point::new(
            blend(self.start.x, self.control.x, self.end.x),
            blend(self.start.y, self.control.y, self.end.y),
        )
    }

    /// Steps progress forward and returns where the follower should be.
    ///
    /// `Completed` is reported once, on the step that passes 100. After that
    /// the path yields nothing.
    pub fn advance(&mut self, step: f64) -> Option<PathStep> {
        if self.completed {
            return None;
        }
        self.progress += step;
        let position = self.point_at(self.progress);
        let status = if self.progress > PROGRESS_COMPLETE {
            self.completed = true;
            PathStatus::Completed
        } else {
            PathStatus::InProgress
        };
        Some(PathStep { position, status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn sample_path() -> Path {
        Path::with_control(
            Point::new(0, 0),
            Point::new(50, 100),
            Point::new(100, 0),
            Maneuver::Dive,
        )
    }

    #[test]
    fn test_point_at_start() {
        let path = sample_path();
        assert_eq!(path.point_at(0.0), Point::new(0, 0));
    }

    #[test]
    fn test_point_at_end() {
        let path = sample_path();
        assert_eq!(path.point_at(100.0), Point::new(100, 0));
    }

    #[test]
    fn test_point_at_midpoint() {
        // 0.25 * p0 + 0.5 * p1 + 0.25 * p2
        let path = sample_path();
        assert_eq!(path.point_at(50.0), Point::new(50, 50));
    }

    #[test]
    fn test_advance_completes_once() {
        let mut path = sample_path();
        let mut completions = 0;
        let mut last = None;
        for _ in 0..200 {
            if let Some(step) = path.advance(1.5) {
                if step.status == PathStatus::Completed {
                    completions += 1;
                }
                last = Some(step.position);
            }
        }
        assert_eq!(completions, 1);
        assert!(path.is_completed());
        assert_eq!(last, Some(Point::new(100, 0)));
        assert_eq!(path.advance(1.5), None);
    }

    #[test]
    fn test_completion_needs_to_pass_100() {
        let mut path = sample_path();
        let step = path.advance(100.0).unwrap();
        assert_eq!(step.status, PathStatus::InProgress);
        assert_eq!(step.position, Point::new(100, 0));
        let step = path.advance(0.5).unwrap();
        assert_eq!(step.status, PathStatus::Completed);
    }

    #[test]
    fn test_retarget_keeps_progress_and_control() {
        let mut path = sample_path();
        path.advance(30.0);
        path.retarget(Point::new(200, 40));
        assert_eq!(path.progress(), 30.0);
        assert_eq!(path.control(), Point::new(50, 100));
        assert_eq!(path.end(), Point::new(200, 40));
    }

    #[test]
    fn test_retargeted_path_lands_on_latest_end() {
        let mut path = sample_path();
        let mut last = Point::new(0, 0);
        let mut target = Point::new(100, 0);
        while let Some(step) = path.advance(7.0) {
            last = step.position;
            target = target.offset(3, 1);
            if step.status == PathStatus::InProgress {
                path.retarget(target);
            }
        }
        assert_eq!(last, path.end());
    }

    #[test]
    fn test_random_control_point_in_bounds() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..100 {
            let path = Path::new(
                Point::new(10, 10),
                Point::new(300, 500),
                (400, 600),
                Maneuver::Dive,
                &mut rng,
            );
            let control = path.control();
            assert!((0..400).contains(&control.x));
            assert!((0..500).contains(&control.y));
        }
    }

    #[test]
    fn test_tracking_maneuvers() {
        assert!(Maneuver::Regroup { bonus: true }.tracks_target());
        assert!(!Maneuver::Dive.tracks_target());
        assert!(!Maneuver::Hover.tracks_target());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_endpoints_hold_for_any_curve(
                sx in -500i32..500, sy in -500i32..500,
                cx in -500i32..500, cy in -500i32..500,
                ex in -500i32..500, ey in -500i32..500,
            ) {
                let path = Path::with_control(
                    Point::new(sx, sy),
                    Point::new(cx, cy),
                    Point::new(ex, ey),
                    Maneuver::Dive,
                );
                prop_assert_eq!(path.point_at(0.0), Point::new(sx, sy));
                prop_assert_eq!(path.point_at(100.0), Point::new(ex, ey));
            }

            #[test]
            fn test_progress_is_monotonic(steps in prop::collection::vec(0.1f64..5.0, 1..60)) {
                let mut path = sample_path();
                let mut previous = path.progress();
                for step in steps {
                    if path.advance(step).is_none() {
                        break;
                    }
                    prop_assert!(path.progress() > previous);
                    previous = path.progress();
                }
            }
        }
    }
}
