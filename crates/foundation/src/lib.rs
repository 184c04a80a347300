pub mod handles;
pub mod ids;
pub mod math;
pub mod time;

// Foundation crate: small, well-tested primitives only.
pub use handles::*;
pub use ids::*;
pub use math::*;
pub use time::*;
