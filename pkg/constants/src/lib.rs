//! Centralized constants for the netgraph project.
//!
//! All project-wide constant values live here.
//! Change a value in one place and it applies everywhere.

pub mod limits;
pub mod paths;
pub mod policy;
pub mod state;
