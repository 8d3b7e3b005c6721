//! Shared data types for netgraph: the editable workload graph, validation
//! issues, the NetworkPolicy manifest, and identifier syntax helpers.

pub mod config;
pub mod graph;
pub mod issue;
pub mod network_policy;
pub mod validate;
