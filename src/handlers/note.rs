use diesel::dsl::exists;
use diesel::prelude::*;
use serde_json::json;
use std::time::SystemTime;

pub use super::Pool;
use crate::{
    errors::ServerError,
    models::{note::QueryNote, share::SharePermission},
    schema::{categories, note_categories, notes, share_grants, users},
    utils::display_color,
};

pub mod attachment;
pub mod category;
pub mod mutate;
pub mod post;
pub mod query;
pub mod share;

/// Standing a requesting identity must hold on a note for an operation to
/// go through. The owner implicitly satisfies every level.
#[derive(Clone, Copy, Debug)]
pub enum Standing {
    Read,
    Edit,
    Owner,
}

/// Fetches a note through a filter that folds the standing check into the
/// lookup itself. A note that does not exist and a note the requester may
/// not touch produce the same not-found error, so callers can never tell
/// whether the id was real.
pub fn find_note(
    conn: &mut PgConnection,
    note_id: &str,
    user_id: &str,
    required: Standing,
) -> Result<QueryNote, ServerError> {
    let result = match required {
        Standing::Owner => notes::table
            .filter(notes::id.eq(note_id).and(notes::owner_id.eq(user_id)))
            .first::<QueryNote>(conn),
        Standing::Edit => notes::table
            .filter(
                notes::id.eq(note_id).and(
                    notes::owner_id.eq(user_id).or(exists(
                        share_grants::table.filter(
                            share_grants::note_id
                                .eq(note_id)
                                .and(share_grants::user_id.eq(user_id))
                                .and(share_grants::permission.eq(SharePermission::Edit.as_str())),
                        ),
                    )),
                ),
            )
            .first::<QueryNote>(conn),
        Standing::Read => notes::table
            .filter(
                notes::id.eq(note_id).and(
                    notes::owner_id.eq(user_id).or(exists(
                        share_grants::table.filter(
                            share_grants::note_id
                                .eq(note_id)
                                .and(share_grants::user_id.eq(user_id)),
                        ),
                    )),
                ),
            )
            .first::<QueryNote>(conn),
    };

    result.map_err(|err| match err {
        diesel::result::Error::NotFound => ServerError::NotFound(Some(note_id.to_string())),
        _ => ServerError::DieselError,
    })
}

pub fn touch_note(conn: &mut PgConnection, note_id: &str) -> Result<(), ServerError> {
    diesel::update(notes::table.filter(notes::id.eq(note_id)))
        .set(notes::updated_at.eq(SystemTime::now()))
        .execute(conn)?;
    Ok(())
}

/// The requester's standing on a note in display form: "owner" for the
/// owner, otherwise the permission of their grant, otherwise none.
pub fn user_permission(
    conn: &mut PgConnection,
    note: &QueryNote,
    user_id: &str,
) -> Result<Option<String>, ServerError> {
    if note.owner_id == user_id {
        return Ok(Some("owner".to_string()));
    }

    share_grants::table
        .filter(
            share_grants::note_id
                .eq(&note.id)
                .and(share_grants::user_id.eq(user_id)),
        )
        .select(share_grants::permission)
        .first::<String>(conn)
        .optional()
        .map_err(Into::into)
}

/// The note's category set resolved to display form, in link order.
pub fn resolved_categories(
    conn: &mut PgConnection,
    note_id: &str,
) -> Result<Vec<serde_json::Value>, ServerError> {
    let rows = note_categories::table
        .inner_join(categories::table)
        .filter(note_categories::note_id.eq(note_id))
        .order(note_categories::linked_at.asc())
        .select((categories::id, categories::name, categories::color))
        .load::<(String, String, String)>(conn)?;

    Ok(rows
        .into_iter()
        .map(|(id, name, color)| {
            json!({
                "id": id,
                "name": name,
                "color": display_color(&color),
            })
        })
        .collect())
}

pub fn shared_with(
    conn: &mut PgConnection,
    note_id: &str,
) -> Result<Vec<serde_json::Value>, ServerError> {
    let rows = share_grants::table
        .inner_join(users::table)
        .filter(share_grants::note_id.eq(note_id))
        .order(share_grants::created_at.asc())
        .select((users::username, share_grants::permission))
        .load::<(String, String)>(conn)?;

    Ok(rows
        .into_iter()
        .map(|(username, permission)| {
            json!({
                "username": username,
                "permission": permission,
            })
        })
        .collect())
}
