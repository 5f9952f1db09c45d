use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use serde_derive::Deserialize;
use serde_json::json;
use std::time::SystemTime;

use super::{find_note, resolved_categories, touch_note, Pool, Standing};
use crate::{
    auth::AuthedUser,
    errors::{Fields, ServerError},
    schema::{categories, note_categories},
};

#[derive(Clone, Deserialize)]
pub struct LinkCategory {
    category_id: String,
}

pub async fn add(
    user: AuthedUser,
    note_id: web::Path<String>,
    input: web::Json<LinkCategory>,
    pool: web::Data<Pool>,
) -> Result<HttpResponse, ServerError> {
    let mut connection = pool.get()?;

    let note = find_note(&mut connection, &note_id, &user.id, Standing::Edit)?;

    let category_id = categories::table
        .filter(categories::id.eq(&input.category_id))
        .select(categories::id)
        .first::<String>(&mut connection)
        .optional()?
        .ok_or(ServerError::UserError(vec![Fields::Category(
            "no category with that id was found",
        )]))?;

    let already_linked: i64 = note_categories::table
        .filter(
            note_categories::note_id
                .eq(&note.id)
                .and(note_categories::category_id.eq(&category_id)),
        )
        .count()
        .get_result(&mut connection)?;
    if already_linked > 0 {
        return Err(ServerError::UserError(vec![Fields::Category(
            "is already linked to this note",
        )]));
    }

    diesel::insert_into(note_categories::table)
        .values((
            note_categories::note_id.eq(&note.id),
            note_categories::category_id.eq(&category_id),
            note_categories::linked_at.eq(SystemTime::now()),
        ))
        .execute(&mut connection)?;
    touch_note(&mut connection, &note.id)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "category linked",
        "data": {
            "categories": resolved_categories(&mut connection, &note.id)?,
        },
    })))
}

pub async fn remove(
    user: AuthedUser,
    path: web::Path<(String, String)>,
    pool: web::Data<Pool>,
) -> Result<HttpResponse, ServerError> {
    let (note_id, category_id) = path.into_inner();
    let mut connection = pool.get()?;

    let note = find_note(&mut connection, &note_id, &user.id, Standing::Edit)?;

    // unlinking an absent category is a no-op, not an error
    let deleted = diesel::delete(
        note_categories::table.filter(
            note_categories::note_id
                .eq(&note.id)
                .and(note_categories::category_id.eq(&category_id)),
        ),
    )
    .execute(&mut connection)?;

    if deleted > 0 {
        touch_note(&mut connection, &note.id)?;
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "category unlinked",
        "data": {
            "categories": resolved_categories(&mut connection, &note.id)?,
        },
    })))
}
