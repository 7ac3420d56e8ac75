mod capture_beam;
mod enemy;
mod entity;
mod fighter;
mod formation;
mod projectile;
mod registry;

// Re-export all public types
pub use capture_beam::{
    BEAM_PAUSE_TICKS, BEAM_REACH, BEAM_STEPS, BEAM_TAPER, BEAM_WIDTH, CaptureBeam, CaptureStatus,
};
pub use enemy::{ENEMY_SIDES, Enemy};
pub use entity::{Actor, ActorKind, Entity, EntityId, Response, Size, Variant};
pub use fighter::{Fighter, FighterRole};
pub use formation::{Direction, Formation};
pub use projectile::{
    ENEMY_BOUNTY, PROJECTILE_HEIGHT, PROJECTILE_WIDTH, Projectile, SHOT_BOUNTY, Shooter,
};
pub use registry::{Contact, ContactSide, Registry};
