pub mod bar_view;
pub mod color;
pub mod controls;
pub mod graph_view;
pub mod listeners;
mod visualization;

pub use visualization::Visualization;
