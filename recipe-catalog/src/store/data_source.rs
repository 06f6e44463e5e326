//! Instantiation of a GraphQL [`DataSource`](gql::DataSource) for a document store.

use super::{db, ops};
use crate::graphql::{
    backend::{
        self as gql, AuthorUpdate, IngredientUpdate, NewAuthor, NewIngredient, NewRecipe,
        RecipeUpdate,
    },
    types::{Author, Ingredient, Recipe},
};
use async_trait::async_trait;
use derive_more::From;

#[cfg(feature = "mongo")]
/// A data source implemented using a MongoDB database.
pub type MongoDataSource = StoreDataSource<db::mongo::Connection>;

/// A data source implemented using a document store.
#[derive(Clone, Debug, From)]
pub struct StoreDataSource<Db>(Db);

impl<Db: db::Connection> StoreDataSource<Db> {
    /// The underlying connection to the database.
    pub fn inner(&self) -> &Db {
        &self.0
    }

    /// Unwrap this data source to get at the underlying connection.
    pub fn into_inner(self) -> Db {
        self.0
    }
}

#[async_trait]
impl<Db: 'static + db::Connection> gql::DataSource for StoreDataSource<Db> {
    type Error = ops::Error;

    async fn author(&self, id: &str) -> Result<Option<Author>, Self::Error> {
        ops::author::get(&self.0, id).await
    }

    async fn authors(&self) -> Result<Vec<Result<Author, Self::Error>>, Self::Error> {
        ops::author::list(&self.0).await
    }

    async fn author_by_email(&self, email: &str) -> Result<Option<Author>, Self::Error> {
        ops::author::by_email(&self.0, email).await
    }

    async fn ingredient(&self, id: &str) -> Result<Option<Ingredient>, Self::Error> {
        ops::ingredient::get(&self.0, id).await
    }

    async fn ingredients(&self) -> Result<Vec<Result<Ingredient, Self::Error>>, Self::Error> {
        ops::ingredient::list(&self.0).await
    }

    async fn ingredient_by_name(&self, name: &str) -> Result<Option<Ingredient>, Self::Error> {
        ops::ingredient::by_name(&self.0, name).await
    }

    async fn recipes(&self) -> Result<Vec<Result<Recipe, Self::Error>>, Self::Error> {
        ops::recipe::list(&self.0).await
    }

    async fn recipes_by_author(&self, email: &str) -> Result<Vec<Recipe>, Self::Error> {
        ops::recipe::by_author(&self.0, email).await
    }

    async fn recipes_with_ingredient(&self, name: &str) -> Result<Vec<Recipe>, Self::Error> {
        ops::recipe::with_ingredient(&self.0, name).await
    }

    async fn add_author(&self, input: NewAuthor) -> Result<Author, Self::Error> {
        ops::author::add(&self.0, input).await
    }

    async fn add_ingredient(&self, input: NewIngredient) -> Result<Ingredient, Self::Error> {
        ops::ingredient::add(&self.0, input).await
    }

    async fn add_recipe(&self, input: NewRecipe) -> Result<Recipe, Self::Error> {
        ops::recipe::add(&self.0, input).await
    }

    async fn delete_author(&self, email: &str) -> Result<String, Self::Error> {
        ops::author::delete(&self.0, email).await
    }

    async fn delete_ingredient(&self, name: &str) -> Result<String, Self::Error> {
        ops::ingredient::delete(&self.0, name).await
    }

    async fn delete_recipe(&self, title: &str) -> Result<String, Self::Error> {
        ops::recipe::delete(&self.0, title).await
    }

    async fn update_author(&self, update: AuthorUpdate) -> Result<Author, Self::Error> {
        ops::author::update(&self.0, update).await
    }

    async fn update_ingredient(&self, update: IngredientUpdate) -> Result<Ingredient, Self::Error> {
        ops::ingredient::update(&self.0, update).await
    }

    async fn update_recipe(&self, update: RecipeUpdate) -> Result<Recipe, Self::Error> {
        ops::recipe::update(&self.0, update).await
    }
}
