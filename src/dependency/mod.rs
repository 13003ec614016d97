mod builder;
mod graph;
mod order;

pub use builder::*;
pub use graph::*;
pub use order::*;
