//! Working-graph state: the mutable store, connection rules, the
//! generation gate and the store's event log.

pub mod connect;
pub mod output;
pub mod store;
pub mod watch;

pub use connect::{ConnectionKind, ConnectionRefusal, check_connection};
pub use output::{GenerationOutcome, Generated, generate, relevant_issues, suggested_file_name};
pub use store::{GraphStore, Removed};
pub use watch::{EventLog, StoreEvent, StoreEventKind};
