//! Infinite circular picker.
//!
//! A short cyclic list of items is laid out on a large arc. The selector keeps
//! an unbounded signed virtual index so the list can be spun forever in either
//! direction, and a rotation angle that follows the index with a spring.

pub mod config;
pub mod geometry;
pub mod selector;

pub use config::*;
pub use geometry::*;
pub use selector::*;
