//! Compilation of catalog operations into low-level document store operations.
//!
//! Every operation here is a fixed, ordered sequence of single-document (or single-filter) store
//! operations. Nothing is wrapped in a transaction: a failure partway through leaves the steps
//! already taken in place, and concurrent operations may interleave between steps.

use super::db::{Connection, Filter, Find, FindExt, Update};
use crate::graphql::{async_graphql, backend, ErrorExtensions};
use bson::{oid::ObjectId, Bson, Document};
use serde::de::DeserializeOwned;
use snafu::{ResultExt, Snafu};
use std::fmt::Display;

pub mod author;
pub mod ingredient;
pub mod recipe;

/// The collection of authors.
pub const AUTHORS: &str = "authors";
/// The collection of ingredients.
pub const INGREDIENTS: &str = "ingredients";
/// The collection of recipes.
pub const RECIPES: &str = "recipe";

/// Errors encountered when executing catalog operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Author with email {email} already exists"))]
    AuthorExists { email: String },

    #[snafu(display("Ingredient with name {name} already exists"))]
    IngredientExists { name: String },

    #[snafu(display("Recipe with title {title} already exists"))]
    RecipeExists { title: String },

    #[snafu(display("Author with email {email} doesn't exist"))]
    MissingAuthor { email: String },

    #[snafu(display("{source}"))]
    InvalidId { source: bson::oid::Error },

    #[snafu(display("no {entity} with id {id}"))]
    NotFound { entity: &'static str, id: ObjectId },

    #[snafu(display("ingredient {name} is not in the catalog"))]
    NotInCatalog { name: String },

    #[snafu(display("{error}"))]
    Store { error: String },

    #[snafu(display("error parsing {collection} document: {error}"))]
    ParseDocument {
        collection: &'static str,
        error: String,
    },
}

impl Error {
    /// An error in the store layer.
    pub fn store(error: impl Display) -> Self {
        Self::Store {
            error: error.to_string(),
        }
    }

    /// A machine-readable classification of this error, reported to clients as `extensions.code`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AuthorExists { .. } | Self::IngredientExists { .. } | Self::RecipeExists { .. } => {
                "ALREADY_EXISTS"
            }
            Self::MissingAuthor { .. } => "MISSING_REFERENCE",
            Self::InvalidId { .. } => "INVALID_ID",
            Self::NotFound { .. } | Self::NotInCatalog { .. } => "NOT_FOUND",
            Self::Store { .. } | Self::ParseDocument { .. } => "STORE",
        }
    }
}

impl ErrorExtensions for Error {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, ext| ext.set("code", self.code()))
    }
}

impl backend::Error for Error {
    fn missing_author(email: &str) -> Self {
        Self::MissingAuthor {
            email: email.to_string(),
        }
    }

    fn not_in_catalog(name: &str) -> Self {
        Self::NotInCatalog {
            name: name.to_string(),
        }
    }
}

/// Convert a client-supplied identifier to an [`ObjectId`].
pub fn parse_id(id: &str) -> Result<ObjectId, Error> {
    ObjectId::parse_str(id).context(InvalidIdSnafu)
}

/// Decode a document from `collection`.
fn parse_document<T: DeserializeOwned>(collection: &'static str, doc: Document) -> Result<T, Error> {
    bson::from_document(doc).map_err(|err| Error::ParseDocument {
        collection,
        error: err.to_string(),
    })
}

/// Load the first document in `collection` matching `filter`.
async fn find_one<C: Connection, T: DeserializeOwned>(
    conn: &C,
    collection: &'static str,
    filter: Filter,
) -> Result<Option<T>, Error> {
    conn.find(collection)
        .filter(filter)
        .first()
        .await
        .map_err(Error::store)?
        .map(|doc| parse_document(collection, doc))
        .transpose()
}

/// Load every document in `collection` matching `filter`.
async fn find_all<C: Connection, T: DeserializeOwned>(
    conn: &C,
    collection: &'static str,
    filter: Filter,
) -> Result<Vec<T>, Error> {
    conn.find(collection)
        .filter(filter)
        .many()
        .await
        .map_err(Error::store)?
        .into_iter()
        .map(|doc| parse_document(collection, doc))
        .collect()
}

/// Load every document in `collection`, decoding each one separately.
///
/// A document which cannot be decoded yields an error in its own position without failing the
/// others.
async fn find_each<C: Connection, T: DeserializeOwned>(
    conn: &C,
    collection: &'static str,
    filter: Filter,
) -> Result<Vec<Result<T, Error>>, Error> {
    Ok(conn
        .find(collection)
        .filter(filter)
        .many()
        .await
        .map_err(Error::store)?
        .into_iter()
        .map(|doc| parse_document(collection, doc))
        .collect())
}

/// Check whether any document in `collection` matches `filter`.
async fn exists<C: Connection>(
    conn: &C,
    collection: &'static str,
    filter: Filter,
) -> Result<bool, Error> {
    Ok(conn
        .find(collection)
        .filter(filter)
        .first()
        .await
        .map_err(Error::store)?
        .is_some())
}

/// Set a single field of the document identified by `id`.
async fn set_field<C: Connection>(
    conn: &C,
    collection: &'static str,
    id: ObjectId,
    field: &'static str,
    value: impl Into<Bson>,
) -> Result<(), Error> {
    conn.update(collection)
        .filter(Filter::id(id))
        .set(field, value)
        .execute()
        .await
        .map_err(Error::store)?;
    Ok(())
}

/// The new value of an optional string field in a partial update.
///
/// Fields which are missing or empty are left unchanged.
fn provided(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}
