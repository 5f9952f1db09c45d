use actix_web::{web, HttpResponse};
use diesel::dsl::exists;
use diesel::prelude::*;
use serde_derive::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;

use super::{find_note, resolved_categories, shared_with, user_permission, Pool, Standing};
use crate::{
    auth::AuthedUser,
    errors::ServerError,
    models::{attachment::QueryAttachment, note::QueryNote},
    schema::{attachments, categories, note_categories, notes, share_grants, users},
    utils::display_color,
};

pub const DEFAULT_PAGE_LIMIT: i64 = 10;
pub const MAX_PAGE_LIMIT: i64 = 50;

pub async fn get(
    user: AuthedUser,
    note_id: web::Path<String>,
    pool: web::Data<Pool>,
) -> Result<HttpResponse, ServerError> {
    let mut connection = pool.get()?;

    let note = find_note(&mut connection, &note_id, &user.id, Standing::Read)?;
    let permission = user_permission(&mut connection, &note, &user.id)?;

    let owner_username = users::table
        .filter(users::id.eq(&note.owner_id))
        .select(users::username)
        .first::<String>(&mut connection)?;

    let files = attachments::table
        .filter(attachments::note_id.eq(&note.id))
        .order(attachments::created_at.asc())
        .load::<QueryAttachment>(&mut connection)?;

    let mut payload = note.payload(permission.as_deref());
    payload["owner"] = json!({
        "id": note.owner_id,
        "username": owner_username,
    });
    payload["categories"] = json!(resolved_categories(&mut connection, &note.id)?);
    payload["shared_with"] = json!(shared_with(&mut connection, &note.id)?);
    payload["attachments"] = json!(files.iter().map(|a| a.payload()).collect::<Vec<_>>());

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "note found",
        "data": {
            "note": payload,
        },
    })))
}

#[derive(Deserialize)]
pub struct PageParameterQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct PageMeta {
    pub page: i64,
    pub limit: i64,
    pub total_notes: i64,
    pub total_pages: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl PageMeta {
    pub fn new(total_notes: i64, page: i64, limit: i64) -> PageMeta {
        let total_pages = if total_notes == 0 {
            0
        } else {
            (total_notes + limit - 1) / limit
        };

        PageMeta {
            page,
            limit,
            total_notes,
            total_pages,
            has_next_page: page < total_pages,
            has_prev_page: page > 1 && total_pages > 0,
        }
    }
}

pub async fn list(
    user: AuthedUser,
    input: web::Query<PageParameterQuery>,
    pool: web::Data<Pool>,
) -> Result<HttpResponse, ServerError> {
    let mut connection = pool.get()?;

    let page = input.page.unwrap_or(1).max(1);
    let limit = input.limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);

    let total: i64 = notes::table
        .filter(
            notes::owner_id.eq(&user.id).or(exists(
                share_grants::table.filter(
                    share_grants::note_id
                        .eq(notes::id)
                        .and(share_grants::user_id.eq(&user.id)),
                ),
            )),
        )
        .count()
        .get_result(&mut connection)?;

    let rows = notes::table
        .left_join(
            share_grants::table.on(share_grants::note_id
                .eq(notes::id)
                .and(share_grants::user_id.eq(&user.id))),
        )
        .filter(
            notes::owner_id
                .eq(&user.id)
                .or(share_grants::user_id.is_not_null()),
        )
        .order(notes::updated_at.desc())
        .offset((page - 1) * limit)
        .limit(limit)
        .select((notes::all_columns, share_grants::permission.nullable()))
        .load::<(QueryNote, Option<String>)>(&mut connection)?;

    // one query for the whole page's category links instead of one per note
    let note_ids: Vec<String> = rows.iter().map(|(n, _)| n.id.clone()).collect();
    let links = note_categories::table
        .inner_join(categories::table)
        .filter(note_categories::note_id.eq_any(&note_ids))
        .order(note_categories::linked_at.asc())
        .select((
            note_categories::note_id,
            categories::id,
            categories::name,
            categories::color,
        ))
        .load::<(String, String, String, String)>(&mut connection)?;

    let mut categories_by_note: HashMap<String, Vec<serde_json::Value>> = HashMap::new();
    for (nid, cid, name, color) in links {
        categories_by_note.entry(nid).or_default().push(json!({
            "id": cid,
            "name": name,
            "color": display_color(&color),
        }));
    }

    let notes_payload: Vec<serde_json::Value> = rows
        .into_iter()
        .map(|(note, grant)| {
            let permission = if note.owner_id == user.id {
                Some("owner".to_string())
            } else {
                grant
            };
            let mut payload = note.payload(permission.as_deref());
            payload["categories"] =
                json!(categories_by_note.remove(&note.id).unwrap_or_default());
            payload
        })
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "notes found",
        "data": {
            "notes": notes_payload,
            "pagination": PageMeta::new(total, page, limit),
        },
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_middle_page() {
        let meta = PageMeta::new(25, 2, 10);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next_page);
        assert!(meta.has_prev_page);
    }

    #[test]
    fn test_first_and_last_page() {
        let first = PageMeta::new(25, 1, 10);
        assert!(first.has_next_page);
        assert!(!first.has_prev_page);

        let last = PageMeta::new(25, 3, 10);
        assert!(!last.has_next_page);
        assert!(last.has_prev_page);
    }

    #[test]
    fn test_empty_result() {
        let meta = PageMeta::new(0, 1, 10);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next_page);
        assert!(!meta.has_prev_page);
    }

    #[test]
    fn test_exact_multiple() {
        let meta = PageMeta::new(20, 2, 10);
        assert_eq!(meta.total_pages, 2);
        assert!(!meta.has_next_page);
    }

    #[test]
    fn test_page_past_the_end() {
        let meta = PageMeta::new(5, 4, 10);
        assert_eq!(meta.total_pages, 1);
        assert!(!meta.has_next_page);
        assert!(meta.has_prev_page);
    }
}
