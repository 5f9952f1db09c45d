use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use nanoid::nanoid;
use serde_derive::Deserialize;
use serde_json::json;
use std::time::SystemTime;

use super::Pool;
use crate::{
    auth::AuthedUser,
    errors::{Fields, ServerError},
    models::{category::QueryCategory, note::DEFAULT_COLOR},
    schema::categories,
    utils::normalize_color,
};

pub const MAX_NAME_LEN: usize = 60;

#[derive(Clone, Deserialize)]
pub struct NewCategory {
    name: String,
    color: Option<String>,
}

pub async fn new(
    user: AuthedUser,
    input: web::Json<NewCategory>,
    pool: web::Data<Pool>,
) -> Result<HttpResponse, ServerError> {
    let mut connection = pool.get()?;

    let mut field_errors = vec![];

    let name = input.name.trim();
    if name.is_empty() {
        field_errors.push(Fields::Category("name is too short"));
    } else if name.len() > MAX_NAME_LEN {
        field_errors.push(Fields::Category("name is too long"));
    }

    let color = match &input.color {
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

    let result = diesel::insert_into(categories::table)
        .values((
            categories::id.eq(nanoid!(10)),
            categories::name.eq(name),
            categories::color.eq(color),
            categories::owner_id.eq(&user.id),
            categories::created_at.eq(SystemTime::now()),
        ))
        .get_result::<QueryCategory>(&mut connection);

    match result {
        Ok(category) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "message": "category created",
            "data": {
                "category": category.payload(),
            },
        }))),
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => Err(ServerError::UserError(vec![Fields::Category(
            "a category with that name already exists",
        )])),
        Err(_) => Err(ServerError::DieselError),
    }
}

pub async fn list(
    user: AuthedUser,
    pool: web::Data<Pool>,
) -> Result<HttpResponse, ServerError> {
    let mut connection = pool.get()?;

    let result = categories::table
        .filter(categories::owner_id.eq(&user.id))
        .order(categories::name.asc())
        .load::<QueryCategory>(&mut connection)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "categories found",
        "data": {
            "categories": result.iter().map(|c| c.payload()).collect::<Vec<_>>(),
        },
    })))
}

pub async fn del(
    user: AuthedUser,
    category_id: web::Path<String>,
    pool: web::Data<Pool>,
) -> Result<HttpResponse, ServerError> {
    let mut connection = pool.get()?;

    // ownership folded into the delete filter, absent and not-yours look alike
    let deleted = diesel::delete(
        categories::table.filter(
            categories::id
                .eq(category_id.as_str())
                .and(categories::owner_id.eq(&user.id)),
        ),
    )
    .execute(&mut connection)?;

    if deleted == 0 {
        return Err(ServerError::NotFound(Some(category_id.to_string())));
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "category deleted",
        "data": {
            "id": category_id.to_string(),
        },
    })))
}
