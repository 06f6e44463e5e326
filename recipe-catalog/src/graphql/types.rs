//! The entities served by the GraphQL API.
//!
//! Each type here is both the decoded form of a stored document and a GraphQL object. Scalar
//! fields are served straight from the document; fields which refer to other entities are resolved
//! on demand through the [`DataSource`](super::backend::DataSource) in the schema data.

use super::{api_error, backend::Error as _, catalog, CatalogError, Context, Error, Object, Result, ID};
use bson::oid::ObjectId;
use futures::future::try_join_all;
use serde::{Deserialize, Deserializer};

/// Someone who writes recipes.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Author {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    /// Unique among authors. Recipes refer to their author by email.
    pub email: String,
}

#[Object]
impl Author {
    async fn id(&self) -> ID {
        ID(self.id.to_hex())
    }

    async fn name(&self) -> &str {
        &self.name
    }

    async fn email(&self) -> &str {
        &self.email
    }

    /// Recipes written by this author.
    async fn recipes(&self, ctx: &Context<'_>) -> Result<Option<Vec<Recipe>>> {
        let recipes = catalog(ctx)?
            .recipes_by_author(&self.email)
            .await
            .map_err(api_error)?;
        Ok(Some(recipes))
    }
}

/// Something recipes are made from.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Ingredient {
    /// The identifier of the stored ingredient.
    ///
    /// This is [`None`] for an ingredient which is named by a recipe but which has no document of
    /// its own in the catalog.
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    /// Unique among ingredients. Recipes refer to their ingredients by name.
    pub name: String,
}

impl Ingredient {
    /// An ingredient known only by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }
}

#[Object]
impl Ingredient {
    async fn id(&self) -> Result<ID> {
        self.id
            .map(|id| ID(id.to_hex()))
            .ok_or_else(|| api_error(CatalogError::not_in_catalog(&self.name)))
    }

    async fn name(&self) -> &str {
        &self.name
    }

    /// Recipes which use this ingredient.
    async fn recipes(&self, ctx: &Context<'_>) -> Result<Option<Vec<Recipe>>> {
        let recipes = catalog(ctx)?
            .recipes_with_ingredient(&self.name)
            .await
            .map_err(api_error)?;
        Ok(Some(recipes))
    }
}

/// A recipe, as stored.
///
/// The author and ingredients are stored by reference: the author's email and a list of
/// ingredient names.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Recipe {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Unique among recipes.
    pub title: String,
    pub description: String,
    /// Creation time, as `YYYY-M-D H:M:S` in server-local time.
    pub date: String,
    #[serde(rename = "author")]
    pub author_email: String,
    /// Older documents may hold a single name instead of a list.
    #[serde(rename = "ingredients", default, deserialize_with = "one_or_many")]
    pub ingredient_names: Vec<String>,
    /// The author, if it has already been loaded.
    #[serde(skip)]
    pub author: Option<Author>,
}

#[Object]
impl Recipe {
    async fn id(&self) -> ID {
        ID(self.id.to_hex())
    }

    async fn title(&self) -> &str {
        &self.title
    }

    async fn description(&self) -> &str {
        &self.description
    }

    async fn date(&self) -> &str {
        &self.date
    }

    async fn author(&self, ctx: &Context<'_>) -> Result<Author> {
        if let Some(author) = &self.author {
            return Ok(author.clone());
        }

        let catalog = catalog(ctx)?;
        match catalog
            .author_by_email(&self.author_email)
            .await
            .map_err(api_error)?
        {
            Some(author) => Ok(author),
            None => Err(api_error(CatalogError::missing_author(&self.author_email))),
        }
    }

    /// The ingredients, in the order the recipe lists them.
    ///
    /// An ingredient which is not in the catalog is still listed by name.
    async fn ingredients(&self, ctx: &Context<'_>) -> Result<Vec<Ingredient>> {
        let catalog = catalog(ctx)?;
        try_join_all(self.ingredient_names.iter().map(|name| async move {
            let ingredient = catalog.ingredient_by_name(name).await.map_err(api_error)?;
            Ok::<_, Error>(ingredient.unwrap_or_else(|| Ingredient::named(name.as_str())))
        }))
        .await
    }
}

/// Decode a list of strings which may also be stored as a single string, or as null.
fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => vec![],
        Some(OneOrMany::One(name)) => vec![name],
        Some(OneOrMany::Many(names)) => names,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use bson::doc;

    fn decode(ingredients: bson::Bson) -> Vec<String> {
        let recipe: Recipe = bson::from_document(doc! {
            "_id": ObjectId::new(),
            "title": "Legacy",
            "description": "D",
            "date": "2020-1-1 0:0:0",
            "author": "pierce@greendale.edu",
            "ingredients": ingredients,
        })
        .unwrap();
        recipe.ingredient_names
    }

    #[test]
    fn test_ingredient_names_one_or_many() {
        assert_eq!(decode("salt".into()), ["salt"]);
        assert_eq!(decode(vec!["salt", "pepper"].into()), ["salt", "pepper"]);
        assert!(decode(bson::Bson::Null).is_empty());
        assert!(decode(Vec::<String>::new().into()).is_empty());
    }

    #[test]
    fn test_ingredient_names_missing() {
        let recipe: Recipe = bson::from_document(doc! {
            "_id": ObjectId::new(),
            "title": "Toast",
            "description": "D",
            "date": "2020-1-1 0:0:0",
            "author": "pierce@greendale.edu",
        })
        .unwrap();
        assert!(recipe.ingredient_names.is_empty());
    }
}
