pub mod cluster;
pub mod entity;
pub mod selection;
pub mod surface;
pub mod viewport;
pub mod world;

pub use cluster::*;
pub use entity::*;
pub use selection::*;
pub use surface::*;
pub use viewport::*;
pub use world::*;
