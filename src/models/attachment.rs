use diesel::Queryable;
use serde_json::json;
use std::time::SystemTime;

#[derive(Clone, Debug, Queryable)]
pub struct QueryAttachment {
    pub id: String,
    pub note_id: String,
    pub stored_name: String,
    pub original_name: String,
    pub content_type: String,
    pub byte_size: i64,
    pub storage_path: String,
    pub created_at: SystemTime,
}

impl QueryAttachment {
    /// Storage path stays internal, everything else is metadata the client
    /// may see.
    pub fn payload(&self) -> serde_json::Value {
        json!({
            "id": self.id,
            "note_id": self.note_id,
            "stored_name": self.stored_name,
            "original_name": self.original_name,
            "content_type": self.content_type,
            "byte_size": self.byte_size,
            "created_at": self.created_at,
        })
    }
}
