//! Filesystem path constants.

/// Default config file path for netgraphctl (relative to the working directory).
pub const DEFAULT_CONFIG: &str = "netgraph.yaml";

/// Extension of generated manifest files.
pub const MANIFEST_EXTENSION: &str = "yaml";

/// File stem used when no better name can be derived for a manifest.
pub const DEFAULT_MANIFEST_STEM: &str = "network-policy";
