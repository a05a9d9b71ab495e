//! Arranging image batches into a single padded grid.

mod compose;
mod config;
mod layout;

pub use compose::make_grid;
pub(crate) use compose::compose_batch;
pub use config::GridConfig;
pub use layout::GridLayout;
