use diesel::Queryable;
use serde_json::json;
use std::time::SystemTime;

use crate::utils::display_color;

pub const DEFAULT_COLOR: &str = "ffffff";

#[derive(Clone, Debug, Queryable)]
pub struct QueryNote {
    pub id: String,
    pub title: String,
    pub body: String,
    pub color: String,
    pub owner_id: String,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl QueryNote {
    /// Base JSON shape of a note. `user_permission` is derived per request
    /// for the requesting identity and is never stored.
    pub fn payload(&self, user_permission: Option<&str>) -> serde_json::Value {
        json!({
            "id": self.id,
            "title": self.title,
            "body": self.body,
            "color": display_color(&self.color),
            "owner_id": self.owner_id,
            "user_permission": user_permission,
            "created_at": self.created_at,
            "updated_at": self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_note() -> QueryNote {
        QueryNote {
            id: "n_1".to_string(),
            title: "groceries".to_string(),
            body: "eggs".to_string(),
            color: "ab12ef".to_string(),
            owner_id: "u_1".to_string(),
            created_at: SystemTime::UNIX_EPOCH,
            updated_at: SystemTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_payload_prefixes_color() {
        let payload = sample_note().payload(Some("owner"));
        assert_eq!(payload["color"], "#ab12ef");
        assert_eq!(payload["user_permission"], "owner");
    }

    #[test]
    fn test_payload_without_grant_has_null_permission() {
        let payload = sample_note().payload(None);
        assert!(payload["user_permission"].is_null());
    }
}
