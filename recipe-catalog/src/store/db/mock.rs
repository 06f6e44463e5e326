//! Mock instantiation of the abstract [`db`](super) interface.
//!
//! This instantiation is built on a simple in-memory database. It is useful for testing in
//! isolation from an actual database.
#![cfg(any(test, feature = "mocks"))]

use super::{Error as _, Filter, ID_FIELD};
use async_trait::async_trait;
use bson::{oid::ObjectId, Bson, Document};
use derive_more::From;
use futures::{
    stream::{self, BoxStream},
    StreamExt, TryFutureExt,
};
use snafu::Snafu;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Errors returned by the in-memory database.
#[derive(Debug, Snafu, From)]
#[snafu(display("mock DB error: {}", message))]
pub struct Error {
    message: String,
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        s.to_string().into()
    }
}

impl super::Error for Error {
    fn custom(msg: impl Display) -> Self {
        Self {
            message: msg.to_string(),
        }
    }
}

/// The in-memory database.
#[derive(Debug, Default)]
struct Db {
    collections: HashMap<String, Collection>,
}

impl Db {
    /// Get a collection, creating it if it does not exist, the way MongoDB does on first write.
    fn collection_mut(&mut self, name: &str) -> &mut Collection {
        self.collections
            .entry(name.to_string())
            .or_insert_with(|| Collection::new(name.to_string()))
    }
}

/// An in-memory collection.
///
/// Documents are kept in insertion order, which is also the order in which queries return them.
#[derive(Debug)]
struct Collection {
    name: String,
    documents: Vec<Document>,
}

impl Collection {
    fn new(name: String) -> Self {
        Self {
            name,
            documents: vec![],
        }
    }

    fn append(&mut self, mut doc: Document) -> Result<ObjectId, Error> {
        let id = match doc.get(ID_FIELD) {
            Some(Bson::ObjectId(id)) => *id,
            Some(id) => {
                return Err(Error::from(format!(
                    "collection {} only supports object IDs (got {id})",
                    self.name
                )))
            }
            None => {
                let id = ObjectId::new();
                doc.insert(ID_FIELD, id);
                id
            }
        };
        if self
            .documents
            .iter()
            .any(|existing| existing.get_object_id(ID_FIELD).ok() == Some(id))
        {
            return Err(Error::from(format!(
                "duplicate key {id} in collection {}",
                self.name
            )));
        }

        self.documents.push(doc);
        Ok(id)
    }
}

/// A connection to the in-memory database.
#[derive(Clone, Debug, Default)]
pub struct Connection(Arc<RwLock<Db>>);

impl Connection {
    /// Create a new database and connect to it.
    ///
    /// This will create a connection to a fresh, empty database. It will not be connected or
    /// related to any previous connection or database. Once the database is created, this
    /// connection can be [cloned](Clone) in order to create multiple simultaneous connections to
    /// the same database.
    pub fn create() -> Self {
        Self(Default::default())
    }

    /// The raw contents of `collection`, in insertion order.
    pub async fn documents(&self, collection: &str) -> Vec<Document> {
        self.0
            .read()
            .await
            .collections
            .get(collection)
            .map(|collection| collection.documents.clone())
            .unwrap_or_default()
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
        self.0.write().await.collections.clear();
        Ok(())
    }

    fn find<'a>(&'a self, collection: impl Into<Cow<'a, str>> + Send) -> Self::Find<'a> {
        Find {
            db: &self.0,
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
            db: &self.0,
            collection: collection.into(),
            document,
        }
    }

    fn update<'a>(&'a self, collection: impl Into<Cow<'a, str>> + Send) -> Self::Update<'a> {
        Update {
            db: &self.0,
            collection: collection.into(),
            filter: Filter::all(),
            set: Document::new(),
        }
    }

    fn delete<'a>(&'a self, collection: impl Into<Cow<'a, str>> + Send) -> Self::Delete<'a> {
        Delete {
            db: &self.0,
            collection: collection.into(),
            filter: Filter::all(),
        }
    }
}

/// A query against an in-memory database.
pub struct Find<'a> {
    db: &'a RwLock<Db>,
    collection: Cow<'a, str>,
    filter: Filter,
    limit: Option<i64>,
}

impl<'a> super::Find<'a> for Find<'a> {
    type Error = Error;
    type Stream = BoxStream<'a, Result<Document, Self::Error>>;

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
            let db = self.db.read().await;
            tracing::info!("FIND {} {}", self.collection, self.filter);

            // A missing collection behaves like an empty one.
            let docs = db
                .collections
                .get(&*self.collection)
                .map(|collection| collection.documents.as_slice())
                .unwrap_or_default()
                .iter()
                .filter(|doc| self.filter.matches(doc))
                .take(match self.limit {
                    Some(limit) if limit > 0 => limit as usize,
                    _ => usize::MAX,
                })
                .cloned()
                .collect::<Vec<_>>();

            Ok::<_, Error>(stream::iter(docs).map(Ok::<_, Error>))
        }
        .try_flatten_stream()
        .boxed()
    }
}

/// An insert statement for an in-memory database.
pub struct Insert<'a> {
    db: &'a RwLock<Db>,
    collection: Cow<'a, str>,
    document: Document,
}

#[async_trait]
impl<'a> super::Insert for Insert<'a> {
    type Error = Error;

    async fn execute(self) -> Result<ObjectId, Error> {
        let mut db = self.db.write().await;
        tracing::info!("INSERT {} {}", self.collection, self.document);
        db.collection_mut(&self.collection).append(self.document)
    }
}

/// An update statement for an in-memory database.
pub struct Update<'a> {
    db: &'a RwLock<Db>,
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
        if self.set.contains_key(ID_FIELD) {
            return Err(Error::custom("the _id field is immutable"));
        }

        let mut db = self.db.write().await;
        tracing::info!("UPDATE {} {} SET {}", self.collection, self.filter, self.set);
        let Some(doc) = db
            .collections
            .get_mut(&*self.collection)
            .and_then(|collection| {
                collection
                    .documents
                    .iter_mut()
                    .find(|doc| self.filter.matches(doc))
            })
        else {
            return Ok(0);
        };
        for (field, value) in self.set {
            doc.insert(field, value);
        }
        Ok(1)
    }
}

/// A delete statement for an in-memory database.
pub struct Delete<'a> {
    db: &'a RwLock<Db>,
    collection: Cow<'a, str>,
    filter: Filter,
}

impl<'a> Delete<'a> {
    async fn execute(self, limit: Option<usize>) -> Result<u64, Error> {
        let mut db = self.db.write().await;
        tracing::info!("DELETE {} {} LIMIT {:?}", self.collection, self.filter, limit);
        let Some(collection) = db.collections.get_mut(&*self.collection) else {
            return Ok(0);
        };

        let mut remaining = limit.unwrap_or(usize::MAX);
        let before = collection.documents.len();
        collection.documents.retain(|doc| {
            if remaining > 0 && self.filter.matches(doc) {
                remaining -= 1;
                false
            } else {
                true
            }
        });
        Ok((before - collection.documents.len()) as u64)
    }
}

#[async_trait]
impl<'a> super::Delete for Delete<'a> {
    type Error = Error;

    fn filter(mut self, filter: Filter) -> Self {
        self.filter = self.filter.intersect(filter);
        self
    }

    async fn one(self) -> Result<u64, Error> {
        self.execute(Some(1)).await
    }

    async fn many(self) -> Result<u64, Error> {
        self.execute(None).await
    }
}
