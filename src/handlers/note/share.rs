use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use serde_derive::Deserialize;
use serde_json::json;
use std::time::SystemTime;

use super::{find_note, shared_with, touch_note, Pool, Standing};
use crate::{
    auth::AuthedUser,
    errors::{CommonError, Fields, ServerError},
    models::{share::SharePermission, user::QueryUser},
    schema::share_grants,
};

#[derive(Clone, Deserialize)]
pub struct GrantShare {
    username: String,
    permission: String,
}

pub async fn grant(
    user: AuthedUser,
    note_id: web::Path<String>,
    input: web::Json<GrantShare>,
    pool: web::Data<Pool>,
) -> Result<HttpResponse, ServerError> {
    let mut connection = pool.get()?;

    let permission = SharePermission::parse(&input.permission).ok_or(ServerError::UserError(
        vec![Fields::Permission(CommonError::Invalid)],
    ))?;

    let target = QueryUser::find_by_username(&mut connection, &input.username)?.ok_or(
        ServerError::UserError(vec![Fields::Username(
            "no account with that username was found",
        )]),
    )?;

    if target.id == user.id {
        return Err(ServerError::UserError(vec![Fields::Username(
            "a note cannot be shared with its owner",
        )]));
    }

    let note = find_note(&mut connection, &note_id, &user.id, Standing::Owner)?;

    // one grant per user per note: a second grant overwrites the level
    let time_now = SystemTime::now();
    diesel::insert_into(share_grants::table)
        .values((
            share_grants::note_id.eq(&note.id),
            share_grants::user_id.eq(&target.id),
            share_grants::permission.eq(permission.as_str()),
            share_grants::created_at.eq(time_now),
            share_grants::updated_at.eq(time_now),
        ))
        .on_conflict((share_grants::note_id, share_grants::user_id))
        .do_update()
        .set((
            share_grants::permission.eq(permission.as_str()),
            share_grants::updated_at.eq(time_now),
        ))
        .execute(&mut connection)?;
    touch_note(&mut connection, &note.id)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "note shared",
        "data": {
            "share": {
                "username": target.username,
                "permission": permission.as_str(),
            },
        },
    })))
}

#[derive(Clone, Deserialize)]
pub struct RevokeShare {
    username: String,
}

pub async fn revoke(
    user: AuthedUser,
    note_id: web::Path<String>,
    input: web::Json<RevokeShare>,
    pool: web::Data<Pool>,
) -> Result<HttpResponse, ServerError> {
    let mut connection = pool.get()?;

    let target = QueryUser::find_by_username(&mut connection, &input.username)?.ok_or(
        ServerError::UserError(vec![Fields::Username(
            "no account with that username was found",
        )]),
    )?;

    let note = find_note(&mut connection, &note_id, &user.id, Standing::Owner)?;

    let deleted = diesel::delete(
        share_grants::table.filter(
            share_grants::note_id
                .eq(&note.id)
                .and(share_grants::user_id.eq(&target.id)),
        ),
    )
    .execute(&mut connection)?;

    // the note and the user both exist, only the relationship doesn't,
    // so this is reported instead of hidden behind not-found
    if deleted == 0 {
        return Err(ServerError::UserError(vec![Fields::Username(
            "that user has no access to this note",
        )]));
    }

    touch_note(&mut connection, &note.id)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "share revoked",
        "data": {
            "shared_with": shared_with(&mut connection, &note.id)?,
        },
    })))
}
