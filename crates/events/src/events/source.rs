use serde::{Deserialize, Serialize};

/// Trusted package source registration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceEvent {
    Registering { source_id: String },
    Registered { source_id: String },
    IndexRefreshing,
    IndexRefreshed,
}
