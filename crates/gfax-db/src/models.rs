/// Database row types — these map directly to SQLite rows.
/// Distinct from the gfax-types API models to keep the DB layer independent.

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub fax_number: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: i64,
    pub sender_info: String,
    pub content: String,
    pub recipient_id: i64,
    pub created_at: String,
}
