/// Difficulty knobs recomputed on every level transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tunables {
    /// Progress added to every flight path per move
    pub path_step: f64,
    /// Formation rows
    pub rows: usize,
    /// Cap on enemies flying paths at once
    pub max_moving: usize,
    /// Ticks between dive dispatch attempts
    pub dispatch_delay: u64,
    /// Ticks between enemy shots
    pub fire_delay: u64,
}

/// Points awarded on reaching `level`, for the one just cleared.
pub fn completion_bonus(level: u32) -> u32 {
    30 * level.saturating_sub(1)
}

/// Every fourth level hands out a life.
pub fn grants_life(level: u32) -> bool {
    level > 0 && level % 4 == 0
}

impl Tunables {
    pub fn for_level(level: u32) -> Self {
        let past = level.saturating_sub(1);
        // a zero delay would mean "every tick", which is what 1 already does
        let delay = 40u64.saturating_sub(5 * u64::from(past)).max(1);
        Self {
            path_step: 1.2 + 0.3 * f64::from(level),
            rows: 6 + (past / 2) as usize,
            max_moving: 2 + 2 * past as usize,
            dispatch_delay: delay,
            fire_delay: delay,
        }
    }

    /// Knobs for `level` on a field that holds at most `max_rows` rows.
    pub fn for_field(level: u32, max_rows: usize) -> Self {
        let mut tunables = Self::for_level(level);
        tunables.rows = tunables.rows.min(max_rows.max(1));
        tunables
    }
}
