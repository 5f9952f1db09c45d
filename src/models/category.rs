use diesel::Queryable;
use serde_json::json;
use std::time::SystemTime;

use crate::utils::display_color;

#[derive(Clone, Debug, Queryable)]
pub struct QueryCategory {
    pub id: String,
    pub name: String,
    pub color: String,
    pub owner_id: String,
    pub created_at: SystemTime,
}

impl QueryCategory {
    pub fn payload(&self) -> serde_json::Value {
        json!({
            "id": self.id,
            "name": self.name,
            "color": display_color(&self.color),
            "owner_id": self.owner_id,
            "created_at": self.created_at,
        })
    }
}
