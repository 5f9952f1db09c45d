use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use futures_util::StreamExt;
use nanoid::nanoid;
use serde_json::json;
use std::time::SystemTime;

use super::{find_note, touch_note, Pool, Standing};
use crate::{
    auth::AuthedUser,
    errors::{Fields, ServerError},
    models::attachment::QueryAttachment,
    schema::attachments,
    storage::{FileStore, StoredBlob},
};

pub const MAX_ATTACHMENT_SIZE: usize = 10 * 1024 * 1024;

struct Upload {
    original_name: String,
    content_type: String,
    data: Vec<u8>,
}

async fn read_upload(payload: &mut Multipart) -> Result<Option<Upload>, ServerError> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|_| {
            ServerError::UserError(vec![Fields::File("upload could not be read")])
        })?;
        if field.name() != "file" {
            continue;
        }

        let original_name = field
            .content_disposition()
            .get_filename()
            .map(|f| f.to_string())
            .unwrap_or_else(|| "unnamed".to_string());
        let content_type = field
            .content_type()
            .map(|ct| ct.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let mut data: Vec<u8> = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|_| {
                ServerError::UserError(vec![Fields::File("upload could not be read")])
            })?;
            if data.len() + chunk.len() > MAX_ATTACHMENT_SIZE {
                return Err(ServerError::UserError(vec![Fields::File(
                    "upload exceeds the maximum allowed size",
                )]));
            }
            data.extend_from_slice(&chunk);
        }

        return Ok(Some(Upload {
            original_name,
            content_type,
            data,
        }));
    }

    Ok(None)
}

/// Standing check plus record append, run only after the blob is already
/// in the content store. Any failure here means the caller has an orphaned
/// blob to clean up.
fn attach_record(
    conn: &mut PgConnection,
    note_id: &str,
    user_id: &str,
    upload: &Upload,
    blob: &StoredBlob,
) -> Result<QueryAttachment, ServerError> {
    let note = find_note(conn, note_id, user_id, Standing::Owner)?;

    let record = diesel::insert_into(attachments::table)
        .values((
            attachments::id.eq(nanoid!(10)),
            attachments::note_id.eq(&note.id),
            attachments::stored_name.eq(&blob.stored_name),
            attachments::original_name.eq(&upload.original_name),
            attachments::content_type.eq(&upload.content_type),
            attachments::byte_size.eq(blob.byte_size),
            attachments::storage_path.eq(&blob.storage_path),
            attachments::created_at.eq(SystemTime::now()),
        ))
        .get_result::<QueryAttachment>(conn)?;
    touch_note(conn, &note.id)?;

    Ok(record)
}

pub async fn add(
    user: AuthedUser,
    note_id: web::Path<String>,
    mut payload: Multipart,
    pool: web::Data<Pool>,
    store: web::Data<FileStore>,
) -> Result<HttpResponse, ServerError> {
    let upload = read_upload(&mut payload)
        .await?
        .ok_or(ServerError::UserError(vec![Fields::File(
            "no file was uploaded",
        )]))?;

    let mut connection = pool.get()?;
    let blob = store.save(&upload.original_name, &upload.data).map_err(|err| {
        log::error!("failed to store uploaded blob: {}", err);
        ServerError::StorageError
    })?;

    match attach_record(&mut connection, &note_id, &user.id, &upload, &blob) {
        Ok(record) => {
            log::info!(
                "user {} attached {} to note {}",
                user.username,
                record.id,
                note_id
            );
            Ok(HttpResponse::Created().json(json!({
                "success": true,
                "message": "attachment added",
                "data": {
                    "attachment": record.payload(),
                },
            })))
        }
        Err(err) => {
            // the note can't accept the blob, don't leave it orphaned
            if let Err(cleanup_err) = store.delete(&blob.storage_path) {
                log::error!(
                    "failed to clean up blob {} after rejected attachment: {}",
                    blob.storage_path,
                    cleanup_err
                );
            }
            Err(err)
        }
    }
}

pub async fn remove(
    user: AuthedUser,
    path: web::Path<(String, String)>,
    pool: web::Data<Pool>,
    store: web::Data<FileStore>,
) -> Result<HttpResponse, ServerError> {
    let (note_id, attachment_id) = path.into_inner();
    let mut connection = pool.get()?;

    let note = find_note(&mut connection, &note_id, &user.id, Standing::Owner)?;

    let record = attachments::table
        .filter(
            attachments::id
                .eq(&attachment_id)
                .and(attachments::note_id.eq(&note.id)),
        )
        .first::<QueryAttachment>(&mut connection)
        .optional()?
        .ok_or(ServerError::UserError(vec![Fields::Attachment(
            "no attachment with that id exists on this note",
        )]))?;

    // blob first: if this fails the record stays, so no reference dangles
    store.delete(&record.storage_path).map_err(|err| {
        log::error!("failed to delete blob {}: {}", record.storage_path, err);
        ServerError::StorageError
    })?;

    diesel::delete(attachments::table.filter(attachments::id.eq(&record.id)))
        .execute(&mut connection)?;
    touch_note(&mut connection, &note.id)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "attachment removed",
        "data": {
            "id": record.id,
        },
    })))
}
