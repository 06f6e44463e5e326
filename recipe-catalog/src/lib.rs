//! A GraphQL API over a small catalog of recipes, the authors who write them, and the ingredients
//! they use, stored in MongoDB. It consists of three layers:
//!
//! * The [graphql] API, which defines the schema clients see: queries, mutations, and the entity
//!   [types](graphql::types). Resolvers reach storage only through the
//!   [`DataSource`](graphql::backend::DataSource) trait.
//! * The [store], which implements [`DataSource`](graphql::backend::DataSource) on top of an
//!   abstract [document database](store::db). It comes with a MongoDB target as well as a mock
//!   database, which is useful for lightweight testing.
//! * The [server], which serves the schema over HTTP, configured through [config].
//!
//! Authors, ingredients and recipes are related only by denormalized natural keys: a recipe stores
//! its author's email and the names of its ingredients. Deleting an author or ingredient cascades
//! to the recipes which refer to it. Other changes to those keys are not propagated.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod graphql;
pub mod prelude;
pub mod server;
pub mod store;

/// Initialize tracing.
pub fn init_logging() {
    static ONCE: Once = Once::new();

    ONCE.call_once(|| {
        if let Err(err) = color_eyre::install() {
            eprintln!("failed to install error hooks: {err}");
        }
        tracing_subscriber::fmt()
            .with_ansi(true)
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    });
}
