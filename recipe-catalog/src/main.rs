use clap::Parser;
use color_eyre::eyre::WrapErr;
use recipe_catalog::{
    config::{redacted, Options},
    init_logging,
    prelude::*,
    server,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    init_logging();
    let opt = Options::parse();

    let uri = opt.mongo_uri()?;
    tracing::info!("connecting to {} database {}", redacted(&uri), opt.database);
    let conn = mongo::Connection::connect(uri.as_str(), &opt.database)
        .await
        .wrap_err_with(|| format!("connecting to {}", redacted(&uri)))?;

    let catalog: Catalog = Arc::new(MongoDataSource::from(conn.clone()));
    server::serve(schema(catalog), opt.port)
        .await
        .wrap_err("serving the API")?;

    conn.shutdown().await;
    Ok(())
}
