//! The GraphQL API over the recipe catalog.
//!
//! The schema consists of a [`Query`](query::Query) root for reads, a
//! [`Mutation`](mutation::Mutation) root for writes, and the entity [`types`]. All resolvers reach
//! the catalog through a single shared [`Catalog`] handle stored in the schema data.

pub mod backend;
pub mod mutation;
pub mod query;
pub mod types;

use std::sync::Arc;

// Re-export commonly used `async_graphql` types.
pub use async_graphql::{
    value, Context, EmptySubscription, Error, ErrorExtensions, Object, Result, Schema, ID,
};

// Re-export `async_graphql` directly as an escape hatch.
pub extern crate async_graphql;

use backend::DataSource;
use mutation::Mutation;
use query::Query;

/// Errors reported by the [`Catalog`].
pub type CatalogError = crate::store::Error;

/// The shared handle through which every resolver reaches the catalog.
pub type Catalog = Arc<dyn DataSource<Error = CatalogError>>;

/// The schema of the recipe catalog API.
pub type CatalogSchema = Schema<Query, Mutation, EmptySubscription>;

/// Create the schema, serving data from `catalog`.
pub fn schema(catalog: Catalog) -> CatalogSchema {
    Schema::build(Query, Mutation, EmptySubscription)
        .data(catalog)
        .finish()
}

/// Get the [`Catalog`] from the schema data.
fn catalog<'a>(ctx: &Context<'a>) -> Result<&'a Catalog> {
    ctx.data::<Catalog>()
}

/// Convert a backend error into a GraphQL error, including its extensions.
fn api_error<E: ErrorExtensions>(err: E) -> Error {
    err.extend()
}
