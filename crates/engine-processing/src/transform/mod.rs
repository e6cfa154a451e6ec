pub mod pipeline;
pub mod pruner;
