use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A received fax as shown in the inbox and rendered to PDF.
/// The sender is a display label only, not a relation — it is recorded
/// from the sending session's own fax number at send time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fax {
    pub id: i64,
    pub sender: String,
    pub content: String,
    pub received_at: DateTime<Utc>,
}
