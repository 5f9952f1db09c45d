use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use nanoid::nanoid;
use serde_derive::Deserialize;
use serde_json::json;
use std::time::SystemTime;

use super::Pool;
use crate::{
    auth::AuthedUser,
    errors::{CommonError, Fields, ServerError},
    models::note::{QueryNote, DEFAULT_COLOR},
    schema::notes::{body, color, created_at, dsl::notes, id, owner_id, title, updated_at},
    utils::normalize_color,
};

pub const MAX_TITLE_LEN: usize = 120;

#[derive(Clone, Deserialize)]
pub struct NewNote {
    title: String,
    body: Option<String>,
    color: Option<String>,
}

pub async fn new(
    user: AuthedUser,
    input: web::Json<NewNote>,
    pool: web::Data<Pool>,
) -> Result<HttpResponse, ServerError> {
    let mut connection = pool.get()?;

    let mut field_errors = vec![];

    let new_title = input.title.trim();
    if new_title.is_empty() {
        field_errors.push(Fields::Title(CommonError::TooShort));
    } else if new_title.len() > MAX_TITLE_LEN {
        field_errors.push(Fields::Title(CommonError::TooLong));
    }

    let new_color = match &input.color {
        Some(c) => match normalize_color(c) {
            Ok(c) => c,
            Err(e) => {
                field_errors.push(e);
                String::new()
            }
        },
        None => DEFAULT_COLOR.to_string(),
    };

    if !field_errors.is_empty() {
        return Err(ServerError::UserError(field_errors));
    }

    let time_now = SystemTime::now();
    let result = diesel::insert_into(notes)
        .values((
            &id.eq(nanoid!(10)),
            &title.eq(new_title),
            &body.eq(input.body.clone().unwrap_or_default()),
            &color.eq(new_color),
            &owner_id.eq(&user.id),
            &created_at.eq(time_now),
            &updated_at.eq(time_now),
        ))
        .get_result::<QueryNote>(&mut connection)?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "note created",
        "data": {
            "note": result.payload(Some("owner")),
        },
    })))
}
