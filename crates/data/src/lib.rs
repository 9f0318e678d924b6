//! Configuration loading, the participant roster and the draw desk.

pub mod desk;
pub mod load;
pub mod roster;

pub use desk::*;
pub use load::*;
pub use roster::*;
