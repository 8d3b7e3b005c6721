use crate::connect::{ConnectionKind, ConnectionRefusal, check_connection};
use crate::output::{GenerationOutcome, generate};
use crate::watch::{EventLog, StoreEvent, StoreEventKind};
use pkg_constants::state::EVENT_LOG_CAPACITY;
use pkg_types::graph::{Edge, GraphSnapshot, Node};
use pkg_types::issue::Issue;
use pkg_validator::validate_snapshot;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info};

/// Single owner of the working graph and its current issue list.
///
/// Readers get cheap `Arc` handles to immutable snapshots. Every mutation
/// clones the snapshot, applies the change, re-validates the whole graph
/// and swaps both in under one write lock, so issues always describe the
/// snapshot they are published with.
#[derive(Clone)]
pub struct GraphStore {
    inner: Arc<RwLock<StoreInner>>,
    events: EventLog,
}

struct StoreInner {
    snapshot: Arc<GraphSnapshot>,
    issues: Arc<Vec<Issue>>,
}

/// Counts of what [`GraphStore::delete_elements`] removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Removed {
    pub nodes: usize,
    pub edges: usize,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore {
    pub fn new() -> Self {
        Self::from_snapshot(GraphSnapshot::default())
    }

    /// Start from an existing graph; issues are computed immediately.
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Self {
        let issues = validate_snapshot(&snapshot);
        Self {
            inner: Arc::new(RwLock::new(StoreInner {
                snapshot: Arc::new(snapshot),
                issues: Arc::new(issues),
            })),
            events: EventLog::new(EVENT_LOG_CAPACITY),
        }
    }

    pub async fn snapshot(&self) -> Arc<GraphSnapshot> {
        self.inner.read().await.snapshot.clone()
    }

    pub async fn issues(&self) -> Arc<Vec<Issue>> {
        self.inner.read().await.issues.clone()
    }

    /// Add a node. Ids must be unique across the graph.
    pub async fn add_node(&self, node: Node) -> anyhow::Result<()> {
        self.mutate(|graph| {
            if graph.node(&node.id).is_some() {
                anyhow::bail!("Node {} already exists", node.id);
            }
            graph.nodes.push(node);
            Ok(())
        })
        .await
    }

    /// Apply `f` to the node with `id`.
    pub async fn update_node<F>(&self, id: &str, f: F) -> anyhow::Result<()>
    where
        F: FnOnce(&mut Node),
    {
        self.mutate(|graph| {
            let node = graph
                .nodes
                .iter_mut()
                .find(|n| n.id == id)
                .ok_or_else(|| anyhow::anyhow!("Node {} not found", id))?;
            f(node);
            Ok(())
        })
        .await
    }

    /// Apply `f` to the edge with `id`.
    pub async fn update_edge<F>(&self, id: &str, f: F) -> anyhow::Result<()>
    where
        F: FnOnce(&mut Edge),
    {
        self.mutate(|graph| {
            let edge = graph
                .edges
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or_else(|| anyhow::anyhow!("Edge {} not found", id))?;
            f(edge);
            Ok(())
        })
        .await
    }

    /// Whether a rule edge from `source` to `target` would be accepted.
    pub async fn check_connection(
        &self,
        source: &str,
        target: &str,
    ) -> Result<ConnectionKind, ConnectionRefusal> {
        check_connection(&*self.snapshot().await, source, target)
    }

    /// Draw a new rule edge and return its id.
    ///
    /// A refused connection surfaces as a [`ConnectionRefusal`] inside the
    /// returned error and leaves the graph untouched.
    pub async fn connect(&self, source: &str, target: &str) -> anyhow::Result<String> {
        self.mutate(|graph| {
            let kind = check_connection(graph, source, target)?;
            let label = match (graph.node(source), graph.node(target)) {
                (Some(s), Some(t)) => kind.describe(s, t),
                _ => String::new(),
            };
            let id = uuid::Uuid::new_v4().to_string();
            let mut edge = Edge::rule(id.clone(), source, target);
            edge.label = Some(label);
            graph.edges.push(edge);
            info!("Connected {} -> {} ({:?}) as {}", source, target, kind, id);
            Ok(id)
        })
        .await
    }

    /// Remove nodes and edges. Deleting a namespace also deletes the nodes
    /// parented to it, and any edge touching a deleted node goes with it.
    pub async fn delete_elements(
        &self,
        node_ids: &[String],
        edge_ids: &[String],
    ) -> anyhow::Result<Removed> {
        self.mutate(|graph| {
            let mut doomed: HashSet<String> = node_ids
                .iter()
                .filter(|id| graph.node(id).is_some())
                .cloned()
                .collect();
            let namespaces: Vec<String> = doomed
                .iter()
                .filter(|id| graph.node(id).is_some_and(Node::is_namespace))
                .cloned()
                .collect();
            for node in &graph.nodes {
                if node
                    .parent
                    .as_ref()
                    .is_some_and(|p| namespaces.contains(p))
                {
                    doomed.insert(node.id.clone());
                }
            }

            let nodes_before = graph.nodes.len();
            let edges_before = graph.edges.len();
            graph.nodes.retain(|n| !doomed.contains(&n.id));
            graph.edges.retain(|e| {
                !edge_ids.contains(&e.id) && !doomed.contains(&e.source) && !doomed.contains(&e.target)
            });

            let removed = Removed {
                nodes: nodes_before - graph.nodes.len(),
                edges: edges_before - graph.edges.len(),
            };
            debug!(
                "Deleted {} nodes and {} edges",
                removed.nodes, removed.edges
            );
            Ok(removed)
        })
        .await
    }

    /// Replace the whole graph, e.g. after loading a file.
    pub async fn replace(&self, snapshot: GraphSnapshot) -> anyhow::Result<()> {
        self.mutate(|graph| {
            *graph = snapshot;
            Ok(())
        })
        .await
    }

    /// Run the generation gate for `target` against the current state.
    pub async fn generate(&self, target: Option<&str>) -> GenerationOutcome {
        let (snapshot, issues) = {
            let inner = self.inner.read().await;
            (inner.snapshot.clone(), inner.issues.clone())
        };
        generate(target, &snapshot, &issues)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub async fn current_seq(&self) -> u64 {
        self.events.current_seq().await
    }

    pub async fn events_since(&self, from_seq: u64) -> Vec<StoreEvent> {
        self.events.events_since(from_seq).await
    }

    /// Copy-on-write commit. Nothing is published when `f` fails.
    async fn mutate<T, F>(&self, f: F) -> anyhow::Result<T>
    where
        F: FnOnce(&mut GraphSnapshot) -> anyhow::Result<T>,
    {
        let mut inner = self.inner.write().await;
        let mut next = (*inner.snapshot).clone();
        let result = f(&mut next)?;

        let issues = validate_snapshot(&next);
        let issues_changed = issues != *inner.issues;
        let (nodes, edges) = (next.nodes.len(), next.edges.len());
        inner.snapshot = Arc::new(next);

        // Events are emitted under the write lock so their order matches commits.
        self.events
            .emit(StoreEventKind::GraphChanged { nodes, edges })
            .await;
        if issues_changed {
            let errors = issues.iter().filter(|i| i.is_error()).count();
            let warnings = issues.len() - errors;
            inner.issues = Arc::new(issues);
            self.events
                .emit(StoreEventKind::IssuesChanged { errors, warnings })
                .await;
        }
        Ok(result)
    }
}
