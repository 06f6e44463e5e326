//! Instantiation of the abstract [`db`](super) interface for MongoDB.
//!
//! This instantiation is built on the official [`mongodb`] driver.
#![cfg(feature = "mongo")]

use super::{Error as _, Filter};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, Document};
use derive_more::From;
use futures::{stream::BoxStream, StreamExt, TryFutureExt, TryStreamExt};
use mongodb::{Client, Database};
use snafu::Snafu;
use std::borrow::Cow;
use std::fmt::Display;

/// Errors returned by a MongoDB deployment.
#[derive(Debug, Snafu, From)]
pub enum Error {
    #[from]
    #[snafu(display("{source}"))]
    Driver { source: mongodb::error::Error },
    #[snafu(display("{message}"))]
    Custom { message: String },
}

impl super::Error for Error {
    fn custom(msg: impl Display) -> Self {
        Self::Custom {
            message: msg.to_string(),
        }
    }
}

/// A connection to one database in a MongoDB deployment.
///
/// The underlying [`Client`] maintains its own connection pool, so this handle is cheap to clone
/// and can be shared by any number of concurrent operations.
#[derive(Clone, Debug)]
pub struct Connection {
    client: Client,
    db: Database,
}

impl Connection {
    /// Connect to the deployment at `uri` and select `database`.
    ///
    /// The deployment is pinged before returning, so an unreachable server or bad credentials are
    /// reported here rather than on the first query.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, Error> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(database);
        db.run_command(doc! { "ping": 1 }).await?;
        tracing::info!("connected to MongoDB database {database}");
        Ok(Self { client, db })
    }

    /// The name of the selected database.
    pub fn name(&self) -> &str {
        self.db.name()
    }

    /// Close all connections to the deployment.
    ///
    /// Waits for in-progress operations using this client to finish.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
        tracing::info!("disconnected from MongoDB");
    }

    fn collection(&self, name: &str) -> mongodb::Collection<Document> {
        self.db.collection(name)
    }
}

#[async_trait]
impl super::Connection for Connection {
    type Error = Error;
    type Find<'a> = Find<'a>;
    type Insert<'a> = Insert<'a>;
    type Update<'a> = Update<'a>;
    type Delete<'a> = Delete<'a>;

    async fn drop_db(&self) -> Result<(), Self::Error> {
        tracing::info!("dropping database {}", self.name());
        self.db.drop().await?;
        Ok(())
    }

    fn find<'a>(&'a self, collection: impl Into<Cow<'a, str>> + Send) -> Self::Find<'a> {
        Find {
            conn: self,
            collection: collection.into(),
            filter: Filter::all(),
            limit: None,
        }
    }

    fn insert<'a>(
        &'a self,
        collection: impl Into<Cow<'a, str>> + Send,
        document: Document,
    ) -> Self::Insert<'a> {
        Insert {
            conn: self,
            collection: collection.into(),
            document,
        }
    }

    fn update<'a>(&'a self, collection: impl Into<Cow<'a, str>> + Send) -> Self::Update<'a> {
        Update {
            conn: self,
            collection: collection.into(),
            filter: Filter::all(),
            set: Document::new(),
        }
    }

    fn delete<'a>(&'a self, collection: impl Into<Cow<'a, str>> + Send) -> Self::Delete<'a> {
        Delete {
            conn: self,
            collection: collection.into(),
            filter: Filter::all(),
        }
    }
}

/// A `find` query against a MongoDB collection.
pub struct Find<'a> {
    conn: &'a Connection,
    collection: Cow<'a, str>,
    filter: Filter,
    limit: Option<i64>,
}

impl<'a> super::Find<'a> for Find<'a> {
    type Error = Error;
    type Stream = BoxStream<'a, Result<Document, Error>>;

    fn filter(mut self, filter: Filter) -> Self {
        self.filter = self.filter.intersect(filter);
        self
    }

    fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    fn stream(self) -> Self::Stream {
        async move {
            tracing::info!(filter = %self.filter, limit = ?self.limit, "find {}", self.collection);
            let collection = self.conn.collection(&self.collection);
            let mut find = collection.find(self.filter.into_document());
            if let Some(limit) = self.limit {
                find = find.limit(limit);
            }
            let cursor = find.await?;
            Ok::<_, Error>(cursor.map_err(Error::from))
        }
        .try_flatten_stream()
        .boxed()
    }
}

/// An `insertOne` statement against a MongoDB collection.
pub struct Insert<'a> {
    conn: &'a Connection,
    collection: Cow<'a, str>,
    document: Document,
}

#[async_trait]
impl<'a> super::Insert for Insert<'a> {
    type Error = Error;

    async fn execute(self) -> Result<ObjectId, Error> {
        tracing::info!(document = %self.document, "insertOne {}", self.collection);
        let res = self
            .conn
            .collection(&self.collection)
            .insert_one(self.document)
            .await?;
        match res.inserted_id {
            Bson::ObjectId(id) => Ok(id),
            _ => Err(Error::missing_id(&self.collection)),
        }
    }
}

/// An `updateOne` statement against a MongoDB collection.
pub struct Update<'a> {
    conn: &'a Connection,
    collection: Cow<'a, str>,
    filter: Filter,
    set: Document,
}

#[async_trait]
impl<'a> super::Update for Update<'a> {
    type Error = Error;

    fn filter(mut self, filter: Filter) -> Self {
        self.filter = self.filter.intersect(filter);
        self
    }

    fn set(mut self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.set.insert(field.into(), value.into());
        self
    }

    async fn execute(self) -> Result<u64, Error> {
        tracing::info!(filter = %self.filter, set = %self.set, "updateOne {}", self.collection);
        let res = self
            .conn
            .collection(&self.collection)
            .update_one(self.filter.into_document(), doc! { "$set": self.set })
            .await?;
        Ok(res.matched_count)
    }
}

/// A `deleteOne` or `deleteMany` statement against a MongoDB collection.
pub struct Delete<'a> {
    conn: &'a Connection,
    collection: Cow<'a, str>,
    filter: Filter,
}

#[async_trait]
impl<'a> super::Delete for Delete<'a> {
    type Error = Error;

    fn filter(mut self, filter: Filter) -> Self {
        self.filter = self.filter.intersect(filter);
        self
    }

    async fn one(self) -> Result<u64, Error> {
        tracing::info!(filter = %self.filter, "deleteOne {}", self.collection);
        let res = self
            .conn
            .collection(&self.collection)
            .delete_one(self.filter.into_document())
            .await?;
        Ok(res.deleted_count)
    }

    async fn many(self) -> Result<u64, Error> {
        tracing::info!(filter = %self.filter, "deleteMany {}", self.collection);
        let res = self
            .conn
            .collection(&self.collection)
            .delete_many(self.filter.into_document())
            .await?;
        Ok(res.deleted_count)
    }
}
