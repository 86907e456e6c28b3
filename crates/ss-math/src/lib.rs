//! sigscan math utilities.

pub mod math;

pub use math::aggregate::*;
pub use math::efficiency::*;
pub use math::expectation::*;
pub use math::grid;
pub use math::significance::*;
