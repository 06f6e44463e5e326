//! Operations on recipes.

use super::{
    author, exists, find_all, find_each, find_one, parse_id, provided, set_field, Error,
    MissingAuthorSnafu, RecipeExistsSnafu, RECIPES,
};
use crate::{
    graphql::{
        backend::{NewRecipe, RecipeUpdate},
        types::Recipe,
    },
    store::db::{Connection, Delete, Filter, Insert},
};
use bson::doc;
use chrono::{DateTime, Local};
use snafu::{ensure, OptionExt};

/// Format a creation time the way it is stored on a recipe.
pub fn timestamp(date: &DateTime<Local>) -> String {
    date.format("%Y-%-m-%-d %-H:%-M:%-S").to_string()
}

pub async fn list<C: Connection>(conn: &C) -> Result<Vec<Result<Recipe, Error>>, Error> {
    find_each(conn, RECIPES, Filter::all()).await
}

/// Load the recipes whose author has the given email.
pub async fn by_author<C: Connection>(conn: &C, email: &str) -> Result<Vec<Recipe>, Error> {
    find_all(conn, RECIPES, Filter::eq("author", email)).await
}

/// Load the recipes which list the given ingredient.
pub async fn with_ingredient<C: Connection>(conn: &C, name: &str) -> Result<Vec<Recipe>, Error> {
    find_all(conn, RECIPES, Filter::eq("ingredients", name)).await
}

/// Create a recipe with a unique title by an existing author.
///
/// The recipe is stamped with the current local time. Nothing is stored if either check fails.
pub async fn add<C: Connection>(conn: &C, input: NewRecipe) -> Result<Recipe, Error> {
    ensure!(
        !exists(conn, RECIPES, Filter::eq("title", input.title.as_str())).await?,
        RecipeExistsSnafu { title: input.title }
    );
    let author = author::by_email(conn, &input.author_email)
        .await?
        .context(MissingAuthorSnafu {
            email: &input.author_email,
        })?;

    let date = timestamp(&Local::now());
    let id = conn
        .insert(
            RECIPES,
            doc! {
                "title": &input.title,
                "description": &input.description,
                "date": &date,
                "author": &input.author_email,
                "ingredients": input.ingredients.clone(),
            },
        )
        .execute()
        .await
        .map_err(Error::store)?;
    Ok(Recipe {
        id,
        title: input.title,
        description: input.description,
        date,
        author_email: input.author_email,
        ingredient_names: input.ingredients,
        author: Some(author),
    })
}

pub async fn delete<C: Connection>(conn: &C, title: &str) -> Result<String, Error> {
    conn.delete(RECIPES)
        .filter(Filter::eq("title", title))
        .one()
        .await
        .map_err(Error::store)?;
    Ok(format!("Removed recipe with title: {title}"))
}

/// Apply a partial update to a recipe.
///
/// A new author or ingredient list is stored as given. Unlike the other fields, an empty
/// ingredient list is applied, clearing the recipe's ingredients.
pub async fn update<C: Connection>(conn: &C, update: RecipeUpdate) -> Result<Recipe, Error> {
    let id = parse_id(&update.id)?;
    if let Some(title) = provided(update.title) {
        set_field(conn, RECIPES, id, "title", title).await?;
    }
    if let Some(description) = provided(update.description) {
        set_field(conn, RECIPES, id, "description", description).await?;
    }
    if let Some(author) = provided(update.author) {
        set_field(conn, RECIPES, id, "author", author).await?;
    }
    if let Some(ingredients) = update.ingredients {
        set_field(conn, RECIPES, id, "ingredients", ingredients).await?;
    }
    find_one(conn, RECIPES, Filter::id(id))
        .await?
        .ok_or(Error::NotFound {
            entity: "recipe",
            id,
        })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        graphql::backend::NewAuthor,
        init_logging,
        store::db::mock,
        store::ops::AUTHORS,
    };
    use chrono::TimeZone;

    async fn with_author() -> mock::Connection {
        let db = mock::Connection::create();
        author::add(
            &db,
            NewAuthor {
                name: "Annie".into(),
                email: "annie@greendale.edu".into(),
            },
        )
        .await
        .unwrap();
        db
    }

    fn pancakes() -> NewRecipe {
        NewRecipe {
            title: "Pancakes".into(),
            description: "Fluffy".into(),
            author_email: "annie@greendale.edu".into(),
            ingredients: vec!["flour".into(), "eggs".into()],
        }
    }

    #[test]
    fn test_timestamp() {
        let date = Local.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        assert_eq!(timestamp(&date), "2024-3-5 7:8:9");
        let date = Local.with_ymd_and_hms(2023, 11, 28, 14, 30, 59).unwrap();
        assert_eq!(timestamp(&date), "2023-11-28 14:30:59");
    }

    #[tokio::test]
    async fn test_add() {
        init_logging();
        let db = with_author().await;

        let recipe = add(&db, pancakes()).await.unwrap();
        assert_eq!(recipe.author.as_ref().unwrap().name, "Annie");

        let stored = list(&db)
            .await
            .unwrap()
            .into_iter()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].title, "Pancakes");
        assert_eq!(stored[0].date, recipe.date);
        assert_eq!(stored[0].author_email, "annie@greendale.edu");
        assert_eq!(stored[0].ingredient_names, ["flour", "eggs"]);
        assert_eq!(stored[0].author, None);

        // Only the reference to the author is stored.
        let doc = &db.documents(RECIPES).await[0];
        assert_eq!(doc.get_str("author").unwrap(), "annie@greendale.edu");
    }

    #[tokio::test]
    async fn test_add_checks() {
        init_logging();
        let db = with_author().await;
        add(&db, pancakes()).await.unwrap();

        let err = add(&db, pancakes()).await.unwrap_err();
        assert_eq!(err.to_string(), "Recipe with title Pancakes already exists");

        let err = add(
            &db,
            NewRecipe {
                title: "Waffles".into(),
                author_email: "troy@greendale.edu".into(),
                ..pancakes()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::MissingAuthor { .. }), "{err:?}");
        assert_eq!(db.documents(RECIPES).await.len(), 1);
    }

    #[tokio::test]
    async fn test_lookups() {
        init_logging();
        let db = with_author().await;
        add(&db, pancakes()).await.unwrap();
        add(
            &db,
            NewRecipe {
                title: "Scrambled eggs".into(),
                ingredients: vec!["eggs".into()],
                ..pancakes()
            },
        )
        .await
        .unwrap();

        let titles = |recipes: Vec<Recipe>| {
            recipes
                .into_iter()
                .map(|recipe| recipe.title)
                .collect::<Vec<_>>()
        };
        assert_eq!(
            titles(with_ingredient(&db, "eggs").await.unwrap()),
            ["Pancakes", "Scrambled eggs"]
        );
        assert_eq!(titles(with_ingredient(&db, "flour").await.unwrap()), ["Pancakes"]);
        assert_eq!(by_author(&db, "annie@greendale.edu").await.unwrap().len(), 2);
        assert!(by_author(&db, "troy@greendale.edu").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        init_logging();
        let db = with_author().await;
        add(&db, pancakes()).await.unwrap();

        assert_eq!(
            delete(&db, "Pancakes").await.unwrap(),
            "Removed recipe with title: Pancakes"
        );
        assert!(list(&db).await.unwrap().is_empty());
        // The author is untouched.
        assert_eq!(db.documents(AUTHORS).await.len(), 1);
    }

    #[tokio::test]
    async fn test_update() {
        init_logging();
        let db = with_author().await;
        let recipe = add(&db, pancakes()).await.unwrap();

        let updated = update(
            &db,
            RecipeUpdate {
                id: recipe.id.to_hex(),
                description: Some(String::new()),
                author: Some("pierce@greendale.edu".into()),
                ingredients: Some(vec![]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.title, "Pancakes");
        assert_eq!(updated.description, "Fluffy");
        assert_eq!(updated.date, recipe.date);
        // The new author is not checked against the catalog.
        assert_eq!(updated.author_email, "pierce@greendale.edu");
        assert!(updated.ingredient_names.is_empty());

        let err = update(
            &db,
            RecipeUpdate {
                id: "nope".into(),
                title: Some("Crepes".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "INVALID_ID");
        assert_eq!(list(&db).await.unwrap()[0].as_ref().unwrap().title, "Pancakes");
    }

    #[tokio::test]
    async fn test_list_decodes_each_document() {
        init_logging();
        let db = with_author().await;
        add(&db, pancakes()).await.unwrap();
        db.insert(RECIPES, doc! { "title": 42 }).execute().await.unwrap();

        let recipes = list(&db).await.unwrap();
        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[0].as_ref().unwrap().title, "Pancakes");
        let err = recipes[1].as_ref().unwrap_err();
        assert!(matches!(err, Error::ParseDocument { .. }), "{err:?}");
        assert_eq!(err.code(), "STORE");
    }
}
