//! Packing and reorder engine
//!
//! Pure algorithms with no rendering or input concerns: the occupancy map
//! builder, the pointer-to-cell mapper, the placeholder resolver and the
//! animation diff engine, tied together by the immutable [`GridView`].

pub mod animation;
pub mod config;
pub mod mapper;
pub mod packer;
pub mod resolver;
pub mod types;
pub mod view;

pub use animation::{diff, ease_in_out, rebase, AnimationInstruction, Diff, Tween};
pub use config::{ConfigError, GridConfig};
pub use mapper::cell_of;
pub use packer::{build, OccupancyMap, PackResult};
pub use resolver::{resolve, trigger_at, Resolution, Side, Trigger};
pub use types::*;
pub use view::GridView;
