use actix_web::HttpResponse;
use derive_more::Display;
use serde_json::json;

#[derive(Debug, Display, PartialEq)]
pub enum CommonError {
    #[display(fmt = "is too short")]
    TooShort,
    #[display(fmt = "is too long")]
    TooLong,
    #[display(fmt = "is invalid")]
    Invalid,
}

/// A validation failure scoped to a single request field. Rendered as an
/// `"errors": { field: message }` object in the response body.
#[derive(Debug, PartialEq)]
pub enum Fields {
    Title(CommonError),
    Color(CommonError),
    Permission(CommonError),
    Username(&'static str),
    Category(&'static str),
    Attachment(&'static str),
    File(&'static str),
}

impl Fields {
    pub fn field(&self) -> &'static str {
        match self {
            Fields::Title(_) => "title",
            Fields::Color(_) => "color",
            Fields::Permission(_) => "permission",
            Fields::Username(_) => "username",
            Fields::Category(_) => "category",
            Fields::Attachment(_) => "attachment",
            Fields::File(_) => "file",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Fields::Title(e) => format!("title {}", e),
            Fields::Color(e) => format!("color {}", e),
            Fields::Permission(e) => format!("permission {}", e),
            Fields::Username(msg)
            | Fields::Category(msg)
            | Fields::Attachment(msg)
            | Fields::File(msg) => msg.to_string(),
        }
    }
}

pub fn field_map(fields: &[Fields]) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for f in fields {
        map.insert(f.field().to_string(), json!(f.message()));
    }
    serde_json::Value::Object(map)
}

#[derive(Debug, Display)]
pub enum ServerError {
    DieselError,
    EnvironmentError,
    R2D2Error,
    InvalidCredentials,
    #[display(fmt = "storage failure")]
    StorageError,
    // absent note and insufficient standing share this variant on purpose,
    // callers must not be able to tell the two apart
    #[display(fmt = "not found")]
    NotFound(Option<String>),
    #[display(fmt = "invalid request")]
    UserError(Vec<Fields>),
}

impl From<r2d2::Error> for ServerError {
    fn from(_: r2d2::Error) -> ServerError {
        ServerError::R2D2Error
    }
}

impl From<std::env::VarError> for ServerError {
    fn from(_: std::env::VarError) -> ServerError {
        ServerError::EnvironmentError
    }
}

impl From<diesel::result::Error> for ServerError {
    fn from(_: diesel::result::Error) -> ServerError {
        ServerError::DieselError
    }
}

impl From<jsonwebtoken::errors::Error> for ServerError {
    fn from(_: jsonwebtoken::errors::Error) -> Self {
        ServerError::InvalidCredentials
    }
}

impl From<std::io::Error> for ServerError {
    fn from(_: std::io::Error) -> Self {
        ServerError::StorageError
    }
}

impl actix_web::error::ResponseError for ServerError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ServerError::DieselError => HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": "Library Error: Diesel Error.",
            })),
            ServerError::EnvironmentError => HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": "Server Error: Use of an uninitialized environment variable.",
            })),
            ServerError::R2D2Error => HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": "Server Error: Pooling Error.",
            })),
            ServerError::InvalidCredentials => HttpResponse::Unauthorized().json(json!({
                "success": false,
                "message": "Invalid Request: wrong credentials",
            })),
            ServerError::StorageError => HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": "Server Error: File Storage Error.",
            })),
            ServerError::NotFound(id) => {
                let message = match id {
                    Some(id) => format!("Content with the id of: '{}' was not found", id),
                    None => "Content was not found".to_string(),
                };
                HttpResponse::NotFound().json(json!({
                    "success": false,
                    "message": message,
                }))
            }
            ServerError::UserError(fields) => HttpResponse::BadRequest().json(json!({
                "success": false,
                "message": self.to_string(),
                "errors": field_map(fields),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_map_shape() {
        let errs = vec![
            Fields::Title(CommonError::TooShort),
            Fields::Username("no account with that username was found"),
        ];
        let map = field_map(&errs);
        assert_eq!(map["title"], "title is too short");
        assert_eq!(map["username"], "no account with that username was found");
    }

    #[test]
    fn test_later_entry_wins_for_same_field() {
        let errs = vec![
            Fields::Color(CommonError::TooShort),
            Fields::Color(CommonError::Invalid),
        ];
        let map = field_map(&errs);
        assert_eq!(map["color"], "color is invalid");
        assert_eq!(map.as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_message_rendering() {
        assert_eq!(Fields::Permission(CommonError::Invalid).message(), "permission is invalid");
        assert_eq!(Fields::File("no file was uploaded").message(), "no file was uploaded");
    }
}
