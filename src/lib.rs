pub mod arena;
pub mod board;
pub mod bot;
pub mod config;
pub mod game;
pub mod geometry;
pub mod normalize;
pub mod plugin;
pub mod sampler;
pub mod snapshot;

pub use arena::*;
pub use board::*;
pub use bot::*;
pub use config::*;
pub use game::*;
pub use geometry::*;
pub use normalize::*;
pub use plugin::*;
pub use snapshot::*;
