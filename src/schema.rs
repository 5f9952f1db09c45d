table! {
    users (id) {
        id -> Varchar,
        username -> Varchar,
        created_at -> Timestamp,
    }
}

table! {
    notes (id) {
        id -> Varchar,
        title -> Varchar,
        body -> Text,
        color -> Varchar,
        owner_id -> Varchar,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    categories (id) {
        id -> Varchar,
        name -> Varchar,
        color -> Varchar,
        owner_id -> Varchar,
        created_at -> Timestamp,
    }
}

table! {
    note_categories (note_id, category_id) {
        note_id -> Varchar,
        category_id -> Varchar,
        linked_at -> Timestamp,
    }
}

table! {
    share_grants (note_id, user_id) {
        note_id -> Varchar,
        user_id -> Varchar,
        permission -> Varchar,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    attachments (id) {
        id -> Varchar,
        note_id -> Varchar,
        stored_name -> Varchar,
        original_name -> Varchar,
        content_type -> Varchar,
        byte_size -> Int8,
        storage_path -> Varchar,
        created_at -> Timestamp,
    }
}

joinable!(notes -> users (owner_id));
joinable!(note_categories -> notes (note_id));
joinable!(note_categories -> categories (category_id));
joinable!(share_grants -> notes (note_id));
joinable!(share_grants -> users (user_id));
joinable!(attachments -> notes (note_id));

allow_tables_to_appear_in_same_query!(
    users,
    notes,
    categories,
    note_categories,
    share_grants,
    attachments,
);
