// Workflow builder and runner
//
// Build with `add_node` / `add_edge`, then `compile()` to get an immutable
// `CompiledWorkflow`. The runner follows each node's returned `Next`:
// Continue walks the linear edge order, Goto jumps (enabling bounded
// cycles), End stops. A hard step cap guards against cycles that never
// reach their own exit condition.

use std::collections::HashMap;

use anyhow::Result;

use super::node::{Next, Node};
use super::WorkflowError;

const DEFAULT_MAX_STEPS: usize = 64;

/// Workflow under construction: nodes plus a linear edge order
pub struct Workflow<S> {
    nodes: HashMap<String, Box<dyn Node<S>>>,
    /// Linear chain: [id1, id2, ...] runs id1 -> id2 -> ... unless a node
    /// routes elsewhere
    edge_order: Vec<String>,
}

impl<S> Default for Workflow<S>
where
    S: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Workflow<S>
where
    S: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edge_order: Vec::new(),
        }
    }

    /// Register a node; replaces any node with the same id
    pub fn add_node(&mut self, node: Box<dyn Node<S>>) -> &mut Self {
        self.nodes.insert(node.id().to_string(), node);
        self
    }

    /// Append an id to the linear chain; the first added edge is the entry
    /// point
    pub fn add_edge(&mut self, to_id: impl Into<String>) -> &mut Self {
        self.edge_order.push(to_id.into());
        self
    }

    /// Validate the edge order and freeze the workflow
    pub fn compile(self) -> Result<CompiledWorkflow<S>, WorkflowError> {
        if self.edge_order.is_empty() {
            return Err(WorkflowError::Empty);
        }
        for id in &self.edge_order {
            if !self.nodes.contains_key(id) {
                return Err(WorkflowError::NodeNotFound(id.clone()));
            }
        }
        Ok(CompiledWorkflow {
            nodes: self.nodes,
            edge_order: self.edge_order,
            max_steps: DEFAULT_MAX_STEPS,
        })
    }
}

/// Compiled workflow: immutable, supports `invoke` only
pub struct CompiledWorkflow<S> {
    nodes: HashMap<String, Box<dyn Node<S>>>,
    edge_order: Vec<String>,
    max_steps: usize,
}

impl<S> CompiledWorkflow<S>
where
    S: Send + Sync + 'static,
{
    /// Override the step cap (builder)
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Run the workflow to completion and return the final state.
    ///
    /// Every workflow in this crate terminates through its own loop bound;
    /// the step cap only fires on a bug, and fires as an error rather than
    /// spinning forever.
    pub async fn invoke(&self, state: S) -> Result<S> {
        let mut state = state;
        let mut current_id = self.edge_order[0].clone();

        for _step in 0..self.max_steps {
            let node = self
                .nodes
                .get(&current_id)
                .expect("compiled workflow has all nodes");

            tracing::debug!(node = %current_id, "Running workflow node");
            let (new_state, next) = node.run(state).await?;
            state = new_state;

            match next {
                Next::End => return Ok(state),
                Next::Goto(id) => {
                    if !self.nodes.contains_key(&id) {
                        return Err(WorkflowError::NodeNotFound(id).into());
                    }
                    current_id = id;
                }
                Next::Continue => {
                    let pos = self
                        .edge_order
                        .iter()
                        .position(|x| x == &current_id)
                        .expect("current node in edge order");
                    if pos + 1 >= self.edge_order.len() {
                        return Ok(state);
                    }
                    current_id = self.edge_order[pos + 1].clone();
                }
            }
        }

        Err(WorkflowError::StepLimitExceeded {
            limit: self.max_steps,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Appends its id to the state and routes according to a fixed rule
    struct TraceNode {
        id: String,
        route: fn(&[String]) -> Next,
    }

    #[async_trait]
    impl Node<Vec<String>> for TraceNode {
        fn id(&self) -> &str {
            &self.id
        }

        async fn run(&self, mut state: Vec<String>) -> Result<(Vec<String>, Next)> {
            state.push(self.id.clone());
            let next = (self.route)(&state);
            Ok((state, next))
        }
    }

    fn node(id: &str, route: fn(&[String]) -> Next) -> Box<TraceNode> {
        Box::new(TraceNode {
            id: id.to_string(),
            route,
        })
    }

    #[tokio::test]
    async fn test_linear_chain_runs_in_order() {
        let mut wf = Workflow::new();
        wf.add_node(node("a", |_| Next::Continue))
            .add_node(node("b", |_| Next::Continue))
            .add_node(node("c", |_| Next::Continue));
        wf.add_edge("a").add_edge("b").add_edge("c");

        let trace = wf.compile().unwrap().invoke(vec![]).await.unwrap();
        assert_eq!(trace, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_goto_creates_bounded_cycle() {
        // b loops back to a until a has run three times
        let mut wf = Workflow::new();
        wf.add_node(node("a", |_| Next::Continue)).add_node(node("b", |s| {
            if s.iter().filter(|x| x.as_str() == "a").count() < 3 {
                Next::Goto("a".to_string())
            } else {
                Next::Continue
            }
        }));
        wf.add_node(node("c", |_| Next::Continue));
        wf.add_edge("a").add_edge("b").add_edge("c");

        let trace = wf.compile().unwrap().invoke(vec![]).await.unwrap();
        assert_eq!(trace, vec!["a", "b", "a", "b", "a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_end_stops_early() {
        let mut wf = Workflow::new();
        wf.add_node(node("a", |_| Next::End))
            .add_node(node("b", |_| Next::Continue));
        wf.add_edge("a").add_edge("b");

        let trace = wf.compile().unwrap().invoke(vec![]).await.unwrap();
        assert_eq!(trace, vec!["a"]);
    }

    #[tokio::test]
    async fn test_step_cap_breaks_runaway_cycle() {
        let mut wf = Workflow::new();
        wf.add_node(node("a", |_| Next::Goto("a".to_string())));
        wf.add_edge("a");

        let err = wf
            .compile()
            .unwrap()
            .with_max_steps(10)
            .invoke(vec![])
            .await
            .unwrap_err();
        let wf_err = err.downcast::<WorkflowError>().unwrap();
        assert!(matches!(wf_err, WorkflowError::StepLimitExceeded { limit: 10 }));
    }

    #[test]
    fn test_compile_rejects_unknown_edge() {
        let mut wf: Workflow<Vec<String>> = Workflow::new();
        wf.add_node(node("a", |_| Next::Continue));
        wf.add_edge("a").add_edge("missing");

        match wf.compile() {
            Err(WorkflowError::NodeNotFound(id)) => assert_eq!(id, "missing"),
            other => panic!("expected NodeNotFound, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_compile_rejects_empty_workflow() {
        let wf: Workflow<Vec<String>> = Workflow::new();
        assert!(matches!(wf.compile(), Err(WorkflowError::Empty)));
    }

    #[tokio::test]
    async fn test_goto_unknown_node_is_error() {
        let mut wf = Workflow::new();
        wf.add_node(node("a", |_| Next::Goto("ghost".to_string())));
        wf.add_edge("a");

        let err = wf.compile().unwrap().invoke(vec![]).await.unwrap_err();
        let wf_err = err.downcast::<WorkflowError>().unwrap();
        assert!(matches!(wf_err, WorkflowError::NodeNotFound(id) if id == "ghost"));
    }
}
