// Bounded cyclic state machines for multi-step agent runs

use thiserror::Error;

mod graph;
mod node;

pub use graph::{CompiledWorkflow, Workflow};
pub use node::{Next, Node};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("workflow has no edges")]
    Empty,

    #[error("node '{0}' is not registered")]
    NodeNotFound(String),

    #[error("step limit of {limit} exceeded (runaway cycle)")]
    StepLimitExceeded { limit: usize },
}
