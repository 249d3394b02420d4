pub mod camera;
pub mod config;
pub mod globe;
pub mod markers;
pub mod orbit;
pub mod store;
pub mod view_state;
pub mod visibility;

pub use camera::*;
pub use config::*;
pub use globe::*;
pub use markers::*;
pub use orbit::*;
pub use store::*;
pub use view_state::*;
pub use visibility::*;
