mod component;
pub mod editor;
pub mod interpret;
mod render;
pub mod state;
pub mod types;
pub mod visualizer;

pub use component::GraphVisualization;
pub use types::{GraphData, GraphLink, GraphNode};
pub use visualizer::GraphVisualizer;
