//! Operations on authors.

use super::{
    exists, find_each, find_one, parse_id, provided, set_field, AuthorExistsSnafu, Error, AUTHORS,
    RECIPES,
};
use crate::{
    graphql::{
        backend::{AuthorUpdate, NewAuthor},
        types::Author,
    },
    store::db::{Connection, Delete, Filter, Insert},
};
use bson::doc;
use snafu::ensure;

/// Load the author identified by `id`.
pub async fn get<C: Connection>(conn: &C, id: &str) -> Result<Option<Author>, Error> {
    let id = parse_id(id)?;
    find_one(conn, AUTHORS, Filter::id(id)).await
}

/// Load every author.
pub async fn list<C: Connection>(conn: &C) -> Result<Vec<Result<Author, Error>>, Error> {
    find_each(conn, AUTHORS, Filter::all()).await
}

/// Load the author with the given email.
pub async fn by_email<C: Connection>(conn: &C, email: &str) -> Result<Option<Author>, Error> {
    find_one(conn, AUTHORS, Filter::eq("email", email)).await
}

/// Create an author with a unique email.
pub async fn add<C: Connection>(conn: &C, input: NewAuthor) -> Result<Author, Error> {
    ensure!(
        !exists(conn, AUTHORS, Filter::eq("email", input.email.as_str())).await?,
        AuthorExistsSnafu { email: input.email }
    );

    let id = conn
        .insert(AUTHORS, doc! { "name": &input.name, "email": &input.email })
        .execute()
        .await
        .map_err(Error::store)?;
    Ok(Author {
        id,
        name: input.name,
        email: input.email,
    })
}

/// Delete the recipes written by `email`, then the author.
pub async fn delete<C: Connection>(conn: &C, email: &str) -> Result<String, Error> {
    conn.delete(RECIPES)
        .filter(Filter::eq("author", email))
        .many()
        .await
        .map_err(Error::store)?;
    conn.delete(AUTHORS)
        .filter(Filter::eq("email", email))
        .one()
        .await
        .map_err(Error::store)?;
    Ok(format!(
        "Removed author with email {email} and all recipes with that author"
    ))
}

/// Apply a partial update to an author.
///
/// Recipes keep referring to the author's old email if it changes.
pub async fn update<C: Connection>(conn: &C, update: AuthorUpdate) -> Result<Author, Error> {
    let id = parse_id(&update.id)?;
    if let Some(name) = provided(update.name) {
        set_field(conn, AUTHORS, id, "name", name).await?;
    }
    if let Some(email) = provided(update.email) {
        set_field(conn, AUTHORS, id, "email", email).await?;
    }
    find_one(conn, AUTHORS, Filter::id(id))
        .await?
        .ok_or(Error::NotFound { entity: "author", id })
}
