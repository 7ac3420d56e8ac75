// Library exports for testing
pub use app::{App, GameState};
pub use config::GameConfig;
pub use entities::{ActorKind, CaptureStatus, EntityId, FighterRole, Size};
pub use error::SimError;
pub use game::{ActorView, Game, REGROUP_BONUS, TickInput};
pub use geometry::Point;
pub use level::Tunables;

pub mod app;
pub mod config;
pub mod entities;
pub mod error;
pub mod game;
pub mod geometry;
pub mod input;
pub mod level;
pub mod path;
pub mod renderer;
