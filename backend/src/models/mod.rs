pub mod grid;
pub mod macros;
pub mod schedule;

pub use grid::*;
pub use schedule::*;
