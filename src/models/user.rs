use diesel::prelude::*;

use crate::errors::ServerError;

/// User rows are provisioned by the identity gateway; this service only
/// reads them to resolve usernames.
#[derive(Clone, Debug, Queryable)]
pub struct QueryUser {
    pub id: String,
    pub username: String,
}

impl QueryUser {
    /// Case-insensitive username lookup.
    pub fn find_by_username(
        conn: &mut PgConnection,
        name: &str,
    ) -> Result<Option<QueryUser>, ServerError> {
        use crate::schema::users;

        users::table
            .filter(users::username.ilike(name))
            .select((users::id, users::username))
            .first::<QueryUser>(conn)
            .optional()
            .map_err(Into::into)
    }
}
