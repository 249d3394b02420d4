pub mod animation;
pub mod event_bus;
pub mod frame;
pub mod frame_loop;
pub mod pointer;

pub use animation::*;
pub use event_bus::*;
pub use frame::*;
pub use frame_loop::*;
pub use pointer::*;
