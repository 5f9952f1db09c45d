use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use serde_derive::Deserialize;
use serde_json::json;
use std::time::SystemTime;

use super::{find_note, post::MAX_TITLE_LEN, user_permission, Pool, Standing};
use crate::{
    auth::AuthedUser,
    errors::{CommonError, Fields, ServerError},
    models::note::QueryNote,
    schema::{attachments, notes},
    storage::FileStore,
    utils::normalize_color,
};

#[derive(Clone, Deserialize)]
pub struct UpdateNote {
    title: Option<String>,
    body: Option<String>,
    color: Option<String>,
}

pub async fn update(
    user: AuthedUser,
    note_id: web::Path<String>,
    input: web::Json<UpdateNote>,
    pool: web::Data<Pool>,
) -> Result<HttpResponse, ServerError> {
    let mut connection = pool.get()?;

    // color is an owner-only field, title and body are open to edit grants
    let required = if input.color.is_some() {
        Standing::Owner
    } else {
        Standing::Edit
    };
    let note = find_note(&mut connection, &note_id, &user.id, required)?;

    let mut field_errors = vec![];

    let new_title = match &input.title {
        Some(t) => {
            let t = t.trim();
            if t.is_empty() {
                field_errors.push(Fields::Title(CommonError::TooShort));
            } else if t.len() > MAX_TITLE_LEN {
                field_errors.push(Fields::Title(CommonError::TooLong));
            }
            t.to_string()
        }
        None => note.title.clone(),
    };

    let new_color = match &input.color {
        Some(c) => match normalize_color(c) {
            Ok(c) => c,
            Err(e) => {
                field_errors.push(e);
                String::new()
            }
        },
        None => note.color.clone(),
    };

    if !field_errors.is_empty() {
        return Err(ServerError::UserError(field_errors));
    }

    let result = diesel::update(notes::table.filter(notes::id.eq(&note.id)))
        .set((
            notes::title.eq(new_title),
            notes::body.eq(input.body.clone().unwrap_or_else(|| note.body.clone())),
            notes::color.eq(new_color),
            notes::updated_at.eq(SystemTime::now()),
        ))
        .get_result::<QueryNote>(&mut connection)?;

    let permission = user_permission(&mut connection, &result, &user.id)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "note updated",
        "data": {
            "note": result.payload(permission.as_deref()),
        },
    })))
}

pub async fn del(
    user: AuthedUser,
    note_id: web::Path<String>,
    pool: web::Data<Pool>,
    store: web::Data<FileStore>,
) -> Result<HttpResponse, ServerError> {
    let mut connection = pool.get()?;

    let note = find_note(&mut connection, &note_id, &user.id, Standing::Owner)?;

    // blobs go before the rows so nothing ends up referenced by a deleted
    // document; per-blob failures are logged and the cascade carries on
    let blob_refs = attachments::table
        .filter(attachments::note_id.eq(&note.id))
        .select(attachments::storage_path)
        .load::<String>(&mut connection)?;

    for storage_path in blob_refs {
        if let Err(err) = store.delete(&storage_path) {
            log::error!(
                "failed to delete blob {} while deleting note {}: {}",
                storage_path,
                note.id,
                err
            );
        }
    }

    diesel::delete(notes::table.filter(notes::id.eq(&note.id))).execute(&mut connection)?;
    log::info!("user {} deleted note {}", user.username, note.id);

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "note deleted",
        "data": {
            "id": note.id,
        },
    })))
}
