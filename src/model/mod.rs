mod graph;
mod input;
mod node;

pub use graph::{GraphModel, RemovedNode};
pub use input::{GraphInput, load_model, parse_elements, read_elements};
pub use node::{Edge, Node};
