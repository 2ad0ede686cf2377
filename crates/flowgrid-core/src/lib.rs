pub mod input;
mod workflow;

pub use input::{InputError, ParsedWorkflow, RawEdge, RawNode, parse_edges, parse_nodes};
pub use workflow::*;
