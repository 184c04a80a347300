//! Map board client: one interactive map session over a post store.

pub mod comments;
pub mod compose;
pub mod config;
pub mod driver;
pub mod error;
pub mod geolocation;
pub mod headless;
pub mod script;
pub mod session;

pub use comments::{COMMENT_FAILED_NOTICE, CommentThread};
pub use compose::PostComposer;
pub use config::ClientConfig;
pub use driver::Driver;
pub use error::ClientError;
pub use geolocation::{FixedLocation, Geolocator};
pub use headless::HeadlessMap;
pub use session::{Command, Completion, DetailView, Input, MapSurface, Session};
