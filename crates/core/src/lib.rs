//! Prize allocation engine. Keep this crate free of IO and platform concerns.

pub mod config;
pub mod display;
pub mod engine;
pub mod events;
pub mod outcome;
pub mod pool;
pub mod rng;

pub use config::*;
pub use display::*;
pub use engine::*;
pub use events::*;
pub use outcome::*;
pub use pool::*;
pub use rng::*;
