mod component;
pub mod interpret;
mod render;
pub mod state;

pub use component::BarVisualization;
pub use interpret::QuickSortInterpreter;
pub use state::BarScene;
