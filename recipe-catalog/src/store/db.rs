//! Abstract interface to a document database.

use async_trait::async_trait;
use bson::{oid::ObjectId, Bson, Document};
use futures::{Stream, StreamExt, TryStreamExt};
use itertools::Itertools;
use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};

pub mod mock;
pub mod mongo;

/// Errors returned by the database.
pub trait Error: Sized + Send + Sync + std::error::Error + 'static {
    /// Wrap a custom message into this error type.
    fn custom(msg: impl Display) -> Self;

    /// An error indicating that the database did not generate an [`ObjectId`] for a new document.
    fn missing_id(collection: &str) -> Self {
        Self::custom(format!(
            "insert into {collection} did not produce an object ID"
        ))
    }
}

/// The name of the field holding a document's identifier.
pub const ID_FIELD: &str = "_id";

/// A condition on documents in a collection.
///
/// Conditions follow the equality semantics of MongoDB: a condition `field = value` holds on a
/// document whose `field` is equal to `value`, or whose `field` is an array containing `value`.
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    conditions: Vec<(Cow<'static, str>, Bson)>,
}

impl Filter {
    /// A filter which holds on every document.
    pub fn all() -> Self {
        Self { conditions: vec![] }
    }

    /// A filter which holds on documents where `field` matches `value`.
    pub fn eq(field: impl Into<Cow<'static, str>>, value: impl Into<Bson>) -> Self {
        Self::all().and(field, value)
    }

    /// A filter which holds only on the document identified by `id`.
    pub fn id(id: ObjectId) -> Self {
        Self::eq(ID_FIELD, id)
    }

    /// Add a condition to this filter.
    ///
    /// The resulting filter holds on documents where both `self` and `field = value` hold.
    pub fn and(mut self, field: impl Into<Cow<'static, str>>, value: impl Into<Bson>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    /// Combine two filters.
    ///
    /// The resulting filter holds on documents where both `self` and `other` hold.
    pub fn intersect(mut self, other: Filter) -> Self {
        self.conditions.extend(other.conditions);
        self
    }

    /// The individual conditions of this filter, all of which must hold.
    pub fn conditions(&self) -> impl '_ + Iterator<Item = (&str, &Bson)> {
        self.conditions
            .iter()
            .map(|(field, value)| (field.as_ref(), value))
    }

    /// Check whether `doc` satisfies this filter.
    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions().all(|(field, value)| match doc.get(field) {
            Some(Bson::Array(items)) if !matches!(value, Bson::Array(_)) => items.contains(value),
            Some(actual) => actual == value,
            None => *value == Bson::Null,
        })
    }

    /// Convert this filter to a MongoDB query document.
    pub fn into_document(self) -> Document {
        if self.conditions.iter().map(|(field, _)| field).all_unique() {
            return self
                .conditions
                .into_iter()
                .map(|(field, value)| (field.into_owned(), value))
                .collect();
        }

        // Two conditions on the same field can't share a document, so fall back to `$and`.
        let clauses = self
            .conditions
            .into_iter()
            .map(|(field, value)| {
                let mut clause = Document::new();
                clause.insert(field.into_owned(), value);
                clause
            })
            .collect::<Vec<_>>();
        let mut doc = Document::new();
        doc.insert("$and", clauses);
        doc
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self::all()
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        if self.conditions.is_empty() {
            return write!(f, "{{}}");
        }
        write!(f, "{{ ")?;
        for (i, (field, value)) in self.conditions.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{field}: {value}")?;
        }
        write!(f, " }}")
    }
}

/// A connection to the database.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Errors returned from queries.
    type Error: Error;

    /// A `find` query which can be executed against the database.
    type Find<'a>: Find<'a, Error = Self::Error>
    where
        Self: 'a;

    /// An `insertOne` statement which can be executed against the database.
    type Insert<'a>: Insert<Error = Self::Error>
    where
        Self: 'a;

    /// An `updateOne` statement which can be executed against the database.
    type Update<'a>: Update<Error = Self::Error>
    where
        Self: 'a;

    /// A `deleteOne` or `deleteMany` statement which can be executed against the database.
    type Delete<'a>: Delete<Error = Self::Error>
    where
        Self: 'a;

    /// Drop the database this connection is using, along with all of its collections.
    async fn drop_db(&self) -> Result<(), Self::Error>;

    /// Start a `find` query.
    ///
    /// The resulting [`Find`] matches every document in `collection`. The query can be refined,
    /// for example by adding a [`Filter`], using the appropriate methods on the [`Find`] object
    /// before running it.
    fn find<'a>(&'a self, collection: impl Into<Cow<'a, str>> + Send) -> Self::Find<'a>;

    /// Start an `insertOne` statement, adding `document` to `collection`.
    ///
    /// The database assigns the new document's identifier, unless `document` already has one.
    fn insert<'a>(
        &'a self,
        collection: impl Into<Cow<'a, str>> + Send,
        document: Document,
    ) -> Self::Insert<'a>;

    /// Start an `updateOne` statement against `collection`.
    fn update<'a>(&'a self, collection: impl Into<Cow<'a, str>> + Send) -> Self::Update<'a>;

    /// Start a delete statement against `collection`.
    fn delete<'a>(&'a self, collection: impl Into<Cow<'a, str>> + Send) -> Self::Delete<'a>;
}

/// A `find` query which can be executed against the database.
pub trait Find<'a>: Send {
    /// Errors returned by this query.
    type Error: Error;
    /// An asynchronous stream of documents.
    type Stream: Stream<Item = Result<Document, Self::Error>> + Unpin + Send;

    /// Restrict the query to documents matching `filter`.
    ///
    /// Multiple filters are combined conjunctively.
    fn filter(self, filter: Filter) -> Self;

    /// Return at most `limit` documents.
    fn limit(self, limit: i64) -> Self;

    /// Run the query and get a stream of results.
    fn stream(self) -> Self::Stream;
}

/// An extension trait for [`Find`] that provides some higher-level functions.
#[async_trait]
pub trait FindExt<'a>: Find<'a> {
    /// Add a condition that `field` matches `value`.
    fn eq(self, field: &'static str, value: impl Into<Bson>) -> Self;

    /// Restrict the query to the document identified by `id`.
    fn id(self, id: ObjectId) -> Self;

    /// Run a query and get the first matching document, if there is one.
    ///
    /// This is the equivalent of MongoDB's `findOne`: it does not fail if more than one document
    /// matches.
    async fn first(self) -> Result<Option<Document>, Self::Error>;

    /// Run a query and collect the results.
    async fn many(self) -> Result<Vec<Document>, Self::Error>;
}

#[async_trait]
impl<'a, T: Find<'a>> FindExt<'a> for T {
    fn eq(self, field: &'static str, value: impl Into<Bson>) -> Self {
        self.filter(Filter::eq(field, value))
    }

    fn id(self, id: ObjectId) -> Self {
        self.filter(Filter::id(id))
    }

    async fn first(self) -> Result<Option<Document>, Self::Error> {
        let mut docs = self.limit(1).stream();
        docs.next().await.transpose()
    }

    async fn many(self) -> Result<Vec<Document>, Self::Error> {
        self.stream().try_collect().await
    }
}

/// An `insertOne` statement which can be executed against the database.
#[async_trait]
pub trait Insert: Send {
    /// Errors returned by this statement.
    type Error: Error;

    /// Do the insertion.
    ///
    /// Returns the identifier of the new document.
    async fn execute(self) -> Result<ObjectId, Self::Error>;
}

/// An `updateOne` statement which can be executed against the database.
#[async_trait]
pub trait Update: Send {
    /// Errors returned by this statement.
    type Error: Error;

    /// Restrict the statement to documents matching `filter`.
    fn filter(self, filter: Filter) -> Self;

    /// Set `field` to `value` in the updated document.
    fn set(self, field: impl Into<String>, value: impl Into<Bson>) -> Self;

    /// Do the update.
    ///
    /// This updates the first document matching the filter, if there is one. Returns the number
    /// of documents matched (0 or 1).
    async fn execute(self) -> Result<u64, Self::Error>;
}

/// A delete statement which can be executed against the database.
#[async_trait]
pub trait Delete: Send {
    /// Errors returned by this statement.
    type Error: Error;

    /// Restrict the statement to documents matching `filter`.
    fn filter(self, filter: Filter) -> Self;

    /// Delete the first document matching the filter, if there is one.
    ///
    /// Returns the number of documents deleted.
    async fn one(self) -> Result<u64, Self::Error>;

    /// Delete every document matching the filter.
    ///
    /// Returns the number of documents deleted.
    async fn many(self) -> Result<u64, Self::Error>;
}
