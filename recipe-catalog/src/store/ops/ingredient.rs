//! Operations on ingredients.

use super::{
    exists, find_each, find_one, parse_id, provided, set_field, Error, IngredientExistsSnafu,
    INGREDIENTS, RECIPES,
};
use crate::{
    graphql::{
        backend::{IngredientUpdate, NewIngredient},
        types::Ingredient,
    },
    store::db::{Connection, Delete, Filter, Insert},
};
use bson::doc;
use snafu::ensure;

pub async fn get<C: Connection>(conn: &C, id: &str) -> Result<Option<Ingredient>, Error> {
    let id = parse_id(id)?;
    find_one(conn, INGREDIENTS, Filter::id(id)).await
}

pub async fn list<C: Connection>(conn: &C) -> Result<Vec<Result<Ingredient, Error>>, Error> {
    find_each(conn, INGREDIENTS, Filter::all()).await
}

/// Load the ingredient with the given name.
pub async fn by_name<C: Connection>(conn: &C, name: &str) -> Result<Option<Ingredient>, Error> {
    find_one(conn, INGREDIENTS, Filter::eq("name", name)).await
}

/// Create an ingredient with a unique name.
pub async fn add<C: Connection>(conn: &C, input: NewIngredient) -> Result<Ingredient, Error> {
    ensure!(
        !exists(conn, INGREDIENTS, Filter::eq("name", input.name.as_str())).await?,
        IngredientExistsSnafu { name: input.name }
    );

    let id = conn
        .insert(INGREDIENTS, doc! { "name": &input.name })
        .execute()
        .await
        .map_err(Error::store)?;
    Ok(Ingredient {
        id: Some(id),
        name: input.name,
    })
}

/// Delete the recipes which use `name`, then the ingredient.
pub async fn delete<C: Connection>(conn: &C, name: &str) -> Result<String, Error> {
    conn.delete(RECIPES)
        .filter(Filter::eq("ingredients", name))
        .many()
        .await
        .map_err(Error::store)?;
    conn.delete(INGREDIENTS)
        .filter(Filter::eq("name", name))
        .one()
        .await
        .map_err(Error::store)?;
    Ok(format!(
        "Removed ingredient with name {name} and all recipes with that ingredient"
    ))
}

/// Rename an ingredient.
///
/// Recipes which list the old name are not changed.
pub async fn update<C: Connection>(
    conn: &C,
    update: IngredientUpdate,
) -> Result<Ingredient, Error> {
    let id = parse_id(&update.id)?;
    if let Some(name) = provided(update.name) {
        set_field(conn, INGREDIENTS, id, "name", name).await?;
    }
    find_one(conn, INGREDIENTS, Filter::id(id))
        .await?
        .ok_or(Error::NotFound {
            entity: "ingredient",
            id,
        })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{init_logging, store::db::mock};

    fn ingredient(name: &str) -> NewIngredient {
        NewIngredient { name: name.into() }
    }

    #[tokio::test]
    async fn test_add_get() {
        init_logging();
        let db = mock::Connection::create();

        let flour = add(&db, ingredient("flour")).await.unwrap();
        let id = flour.id.unwrap();
        assert_eq!(get(&db, &id.to_hex()).await.unwrap(), Some(flour.clone()));
        assert_eq!(by_name(&db, "flour").await.unwrap(), Some(flour.clone()));
        assert_eq!(by_name(&db, "sugar").await.unwrap(), None);
        let all = list(&db).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].as_ref().unwrap(), &flour);

        let err = add(&db, ingredient("flour")).await.unwrap_err();
        assert_eq!(err.to_string(), "Ingredient with name flour already exists");
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        init_logging();
        let db = mock::Connection::create();

        add(&db, ingredient("flour")).await.unwrap();
        add(&db, ingredient("eggs")).await.unwrap();
        db.insert(RECIPES, doc! { "title": "Bread", "ingredients": ["flour", "water"] })
            .execute()
            .await
            .unwrap();
        db.insert(RECIPES, doc! { "title": "Omelette", "ingredients": ["eggs"] })
            .execute()
            .await
            .unwrap();

        delete(&db, "flour").await.unwrap();
        let recipes = db.documents(RECIPES).await;
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].get_str("title").unwrap(), "Omelette");
        assert_eq!(list(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_without_changes() {
        init_logging();
        let db = mock::Connection::create();
        let eggs = add(&db, ingredient("eggs")).await.unwrap();

        let id = eggs.id.unwrap().to_hex();
        for name in [None, Some(String::new())] {
            let updated = update(
                &db,
                IngredientUpdate {
                    id: id.clone(),
                    name,
                },
            )
            .await
            .unwrap();
            assert_eq!(updated, eggs);
        }
    }
}
