//! Entrypoint for GraphQL mutations.
//!
//! Each mutation is a thin mapping from GraphQL arguments to the input types of the
//! [`DataSource`](super::backend::DataSource); the referential rules between authors, ingredients
//! and recipes are enforced there.

use super::{
    api_error,
    backend::{
        AuthorUpdate, IngredientUpdate, NewAuthor, NewIngredient, NewRecipe, RecipeUpdate,
    },
    catalog,
    types::{Author, Ingredient, Recipe},
    Context, Object, Result, ID,
};

/// Entrypoint for GraphQL mutations.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mutation;

#[Object]
impl Mutation {
    /// Create an author. Fails if the email is already taken.
    async fn add_author(&self, ctx: &Context<'_>, name: String, email: String) -> Result<Author> {
        catalog(ctx)?
            .add_author(NewAuthor { name, email })
            .await
            .map_err(api_error)
    }

    /// Create an ingredient. Fails if the name is already taken.
    async fn add_ingredient(&self, ctx: &Context<'_>, name: String) -> Result<Ingredient> {
        catalog(ctx)?
            .add_ingredient(NewIngredient { name })
            .await
            .map_err(api_error)
    }

    /// Create a recipe by an existing author.
    ///
    /// `ingredients` are ingredient names; they are not required to be in the catalog.
    async fn add_recipe(
        &self,
        ctx: &Context<'_>,
        title: String,
        description: String,
        author_mail: ID,
        ingredients: Option<Vec<ID>>,
    ) -> Result<Recipe> {
        let input = NewRecipe {
            title,
            description,
            author_email: author_mail.0,
            ingredients: ingredients
                .unwrap_or_default()
                .into_iter()
                .map(|name| name.0)
                .collect(),
        };
        catalog(ctx)?.add_recipe(input).await.map_err(api_error)
    }

    /// Delete an author, identified by email, along with all of their recipes.
    async fn delete_author(&self, ctx: &Context<'_>, author: String) -> Result<Option<String>> {
        let msg = catalog(ctx)?
            .delete_author(&author)
            .await
            .map_err(api_error)?;
        Ok(Some(msg))
    }

    /// Delete an ingredient, identified by name, along with all recipes that use it.
    async fn delete_ingredient(
        &self,
        ctx: &Context<'_>,
        ingredient: String,
    ) -> Result<Option<String>> {
        let msg = catalog(ctx)?
            .delete_ingredient(&ingredient)
            .await
            .map_err(api_error)?;
        Ok(Some(msg))
    }

    /// Delete a recipe, identified by title.
    async fn delete_recipe(&self, ctx: &Context<'_>, name: String) -> Result<Option<String>> {
        let msg = catalog(ctx)?
            .delete_recipe(&name)
            .await
            .map_err(api_error)?;
        Ok(Some(msg))
    }

    async fn update_author(
        &self,
        ctx: &Context<'_>,
        id: ID,
        new_name: Option<String>,
        new_mail: Option<String>,
    ) -> Result<Author> {
        let update = AuthorUpdate {
            id: id.0,
            name: new_name,
            email: new_mail,
        };
        catalog(ctx)?.update_author(update).await.map_err(api_error)
    }

    async fn update_ingredient(
        &self,
        ctx: &Context<'_>,
        id: ID,
        new_name: Option<String>,
    ) -> Result<Ingredient> {
        let update = IngredientUpdate {
            id: id.0,
            name: new_name,
        };
        catalog(ctx)?
            .update_ingredient(update)
            .await
            .map_err(api_error)
    }

    /// Update a recipe. The new author and ingredients are stored as given.
    async fn update_recipe(
        &self,
        ctx: &Context<'_>,
        id: ID,
        new_title: Option<String>,
        new_description: Option<String>,
        new_author: Option<String>,
        new_ingredients: Option<Vec<String>>,
    ) -> Result<Recipe> {
        let update = RecipeUpdate {
            id: id.0,
            title: new_title,
            description: new_description,
            author: new_author,
            ingredients: new_ingredients,
        };
        catalog(ctx)?.update_recipe(update).await.map_err(api_error)
    }
}
