pub mod cell;
pub mod png;
pub mod store;

pub use cell::{Canvas, Cell, Color};
pub use store::CanvasStore;
