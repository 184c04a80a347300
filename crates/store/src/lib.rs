//! Persistence contract for posts, comments and post images.
//!
//! The map core never talks HTTP directly. It consumes [`PostStore`], which
//! has a REST implementation for the hosted service and an in-memory one for
//! tests and offline demos.

pub mod error;
pub mod memory;
pub mod rest;
pub mod source;
pub mod upload;

pub use error::*;
pub use memory::MemoryStore;
pub use rest::RestStore;
pub use source::*;
pub use upload::*;
