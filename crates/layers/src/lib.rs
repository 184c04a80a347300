pub mod canvas;
pub mod markers;
pub mod popup;
pub mod symbology;

pub use canvas::*;
pub use markers::*;
pub use popup::*;
pub use symbology::*;
