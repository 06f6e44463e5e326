//! Common items that you will always want in scope when serving the catalog.

pub use crate::graphql::{
    async_graphql::{self, value},
    backend::DataSource,
    schema, Catalog, CatalogError, CatalogSchema,
};
pub use crate::store::StoreDataSource;

#[cfg(feature = "mongo")]
pub use crate::store::{db::mongo, MongoDataSource};
