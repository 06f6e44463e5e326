//! Interfaces provided by a backend data source consumed by the GraphQL API.
//!
//! The entrypoint is [`DataSource`], which describes the interface by which the GraphQL API
//! interacts with the catalog. This is the glue between the GraphQL and storage views of the data
//! model: the [`store`](crate::store) layer implements [`DataSource`] and the GraphQL resolvers
//! interact with storage exclusively through this trait.
//!
//! Recipes refer to their author by email and to their ingredients by name. Resolving those
//! references goes through [`DataSource::author_by_email`] and [`DataSource::ingredient_by_name`]
//! only, so that a change in how references are stored stays local to those two lookups.

use super::{
    types::{Author, Ingredient, Recipe},
    ErrorExtensions,
};
use async_trait::async_trait;

/// Errors reported by a [`DataSource`].
pub trait Error: ErrorExtensions + std::error::Error + Send + Sync + 'static {
    /// An error indicating that a recipe refers to an author who does not exist.
    fn missing_author(email: &str) -> Self;

    /// An error indicating that a recipe names an ingredient which has no document of its own.
    fn not_in_catalog(name: &str) -> Self;
}

/// Input for creating an [`Author`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewAuthor {
    pub name: String,
    pub email: String,
}

/// Input for creating an [`Ingredient`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewIngredient {
    pub name: String,
}

/// Input for creating a [`Recipe`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewRecipe {
    pub title: String,
    pub description: String,
    /// Email of an existing author.
    pub author_email: String,
    /// Names of the ingredients. These need not refer to existing ingredients.
    pub ingredients: Vec<String>,
}

/// A partial update of an [`Author`].
///
/// Only fields which are present (and, for strings, non-empty) are changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthorUpdate {
    /// The author to update.
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// A partial update of an [`Ingredient`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngredientUpdate {
    /// The ingredient to update.
    pub id: String,
    pub name: Option<String>,
}

/// A partial update of a [`Recipe`].
///
/// The new author and ingredients are stored as given; they are not checked against the authors
/// and ingredients in the catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecipeUpdate {
    /// The recipe to update.
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub ingredients: Option<Vec<String>>,
}

/// A source of data which can be served by the GraphQL API.
///
/// Identifiers are passed as they were received from the client. Implementations must reject an
/// identifier which is not well-formed rather than treating it as matching nothing.
///
/// The methods which load a whole collection report each entry separately, so that one bad
/// document does not hide the rest of the collection.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Errors reported while attempting to load or store data.
    type Error: Error;

    /// Load the author with the given ID, if there is one.
    async fn author(&self, id: &str) -> Result<Option<Author>, Self::Error>;

    /// Load every author.
    async fn authors(&self) -> Result<Vec<Result<Author, Self::Error>>, Self::Error>;

    /// Resolve an author reference.
    async fn author_by_email(&self, email: &str) -> Result<Option<Author>, Self::Error>;

    /// Load the ingredient with the given ID, if there is one.
    async fn ingredient(&self, id: &str) -> Result<Option<Ingredient>, Self::Error>;

    /// Load every ingredient.
    async fn ingredients(&self) -> Result<Vec<Result<Ingredient, Self::Error>>, Self::Error>;

    /// Resolve an ingredient reference.
    async fn ingredient_by_name(&self, name: &str) -> Result<Option<Ingredient>, Self::Error>;

    /// Load every recipe.
    async fn recipes(&self) -> Result<Vec<Result<Recipe, Self::Error>>, Self::Error>;

    /// Load the recipes written by the author with the given email.
    async fn recipes_by_author(&self, email: &str) -> Result<Vec<Recipe>, Self::Error>;

    /// Load the recipes which use the ingredient with the given name.
    async fn recipes_with_ingredient(&self, name: &str) -> Result<Vec<Recipe>, Self::Error>;

    /// Create a new author.
    ///
    /// # Errors
    ///
    /// Fails if an author with the same email already exists.
    async fn add_author(&self, input: NewAuthor) -> Result<Author, Self::Error>;

    /// Create a new ingredient.
    ///
    /// # Errors
    ///
    /// Fails if an ingredient with the same name already exists.
    async fn add_ingredient(&self, input: NewIngredient) -> Result<Ingredient, Self::Error>;

    /// Create a new recipe, stamped with the current time.
    ///
    /// # Errors
    ///
    /// Fails if a recipe with the same title already exists or if the author does not exist. In
    /// either case nothing is stored.
    async fn add_recipe(&self, input: NewRecipe) -> Result<Recipe, Self::Error>;

    /// Delete an author and every recipe they wrote.
    ///
    /// Returns a confirmation message. Deleting an author who does not exist is not an error.
    async fn delete_author(&self, email: &str) -> Result<String, Self::Error>;

    /// Delete an ingredient and every recipe which uses it.
    ///
    /// Returns a confirmation message. Deleting an ingredient which does not exist is not an error.
    async fn delete_ingredient(&self, name: &str) -> Result<String, Self::Error>;

    /// Delete a recipe by title.
    ///
    /// Returns a confirmation message. Deleting a recipe which does not exist is not an error.
    async fn delete_recipe(&self, title: &str) -> Result<String, Self::Error>;

    /// Apply a partial update to an author and return the result.
    async fn update_author(&self, update: AuthorUpdate) -> Result<Author, Self::Error>;

    /// Apply a partial update to an ingredient and return the result.
    async fn update_ingredient(&self, update: IngredientUpdate) -> Result<Ingredient, Self::Error>;

    /// Apply a partial update to a recipe and return the result.
    async fn update_recipe(&self, update: RecipeUpdate) -> Result<Recipe, Self::Error>;
}
