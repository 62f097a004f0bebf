/// Software version
pub const OPS_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const OPS_NAME: &str = "ops-gate";

// Command topics, one per command category, under a common prefix.
pub const TOPIC_ACCESS: &str = "ops-gate/command/access";
pub const TOPIC_LIGHTS_INDOOR: &str = "ops-gate/command/lights/indoor";
pub const TOPIC_LIGHTS_OUTDOOR: &str = "ops-gate/command/lights/outdoor";
pub const TOPIC_MANUAL: &str = "ops-gate/command/manual";
pub const TOPIC_BACKUP: &str = "ops-gate/command/backup";

/// Controller-side status reports land here; we subscribe but only log them.
pub const TOPIC_STATUS: &str = "ops-gate/status";
