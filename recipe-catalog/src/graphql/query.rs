//! Entrypoint for read-only GraphQL queries.

use super::{
    api_error, catalog,
    types::{Author, Ingredient, Recipe},
    CatalogError, Context, Object, Result, ID,
};

/// Entrypoint for read-only GraphQL queries.
///
/// The list queries return whole collections, unfiltered and unpaginated. An entry which cannot be
/// loaded is `null`, with its error reported alongside the data.
#[derive(Clone, Copy, Debug, Default)]
pub struct Query;

#[Object]
impl Query {
    /// Look up an author by ID.
    async fn get_author(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Author>> {
        catalog(ctx)?.author(&id).await.map_err(api_error)
    }

    /// All authors.
    async fn get_authors(&self, ctx: &Context<'_>) -> Result<Vec<Option<Author>>> {
        let authors = catalog(ctx)?.authors().await.map_err(api_error)?;
        Ok(entries(ctx, authors))
    }

    /// Look up an ingredient by ID.
    async fn get_ingredient(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Ingredient>> {
        catalog(ctx)?.ingredient(&id).await.map_err(api_error)
    }

    /// All ingredients.
    async fn get_ingredients(&self, ctx: &Context<'_>) -> Result<Vec<Option<Ingredient>>> {
        let ingredients = catalog(ctx)?.ingredients().await.map_err(api_error)?;
        Ok(entries(ctx, ingredients))
    }

    /// All recipes.
    async fn get_recipes(&self, ctx: &Context<'_>) -> Result<Vec<Option<Recipe>>> {
        let recipes = catalog(ctx)?.recipes().await.map_err(api_error)?;
        Ok(entries(ctx, recipes))
    }
}

/// Turn each failed entry of a list into `null`, recording its error in the response.
fn entries<T>(ctx: &Context<'_>, items: Vec<Result<T, CatalogError>>) -> Vec<Option<T>> {
    items
        .into_iter()
        .map(|item| match item {
            Ok(item) => Some(item),
            Err(err) => {
                tracing::warn!("skipping list entry: {err}");
                ctx.add_error(api_error(err).into_server_error(ctx.item.pos));
                None
            }
        })
        .collect()
}
