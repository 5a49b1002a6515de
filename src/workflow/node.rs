// Workflow node trait: one step in a compiled workflow

use anyhow::Result;
use async_trait::async_trait;

/// Routing decision returned by a node after it runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Next {
    /// Follow the linear edge order (stop after the last node)
    Continue,
    /// Jump to the named node; this is how cycles are expressed
    Goto(String),
    /// Stop and return the current state
    End,
}

/// One step in a workflow: state in, (state out, routing) out.
///
/// Nodes own their collaborators (model handles, config) and must not hold
/// mutable state of their own; everything that changes between steps lives
/// in `S`.
#[async_trait]
pub trait Node<S>: Send + Sync
where
    S: Send + Sync + 'static,
{
    /// Node id, unique within a workflow (e.g. "generate_personas")
    fn id(&self) -> &str;

    /// Run one step
    async fn run(&self, state: S) -> Result<(S, Next)>;
}
