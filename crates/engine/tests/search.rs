mod common;

use common::{admin, catalog, engine_with_db, member, published_recipe, recipe_input};
use engine::{PageRequest, RecipeSource, SearchQuery, SortField, SortOrder};

#[tokio::test]
async fn search_pages_published_matches() {
    let engine = engine_with_db().await;
    let admin = admin(&engine).await;
    let catalog = catalog(&engine).await;
    for n in 1..=15 {
        published_recipe(&engine, admin.id, recipe_input(&catalog, &format!("Cake {n}"))).await;
    }

    let page = engine
        .search_recipes(SearchQuery {
            text: Some("cake".to_string()),
            page: PageRequest::new(Some(1), Some(10)),
            ..SearchQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(page.items.len(), 10);
    assert_eq!(page.total_count, 15);
    assert_eq!(page.total_pages, 2);

    let last = engine
        .search_recipes(SearchQuery {
            text: Some("CAKE".to_string()),
            page: PageRequest::new(Some(2), Some(10)),
            ..SearchQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(last.items.len(), 5);
}

#[tokio::test]
async fn unpublished_recipes_never_match() {
    let engine = engine_with_db().await;
    let alice = member(&engine, "Alice").await;
    let catalog = catalog(&engine).await;
    engine
        .create_recipe(alice.id, RecipeSource::Member, recipe_input(&catalog, "Secret Cake"))
        .await
        .unwrap();

    let page = engine.search_recipes(SearchQuery::default()).await.unwrap();
    assert_eq!(page.total_count, 0);
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn text_matches_description_and_keywords() {
    let engine = engine_with_db().await;
    let admin = admin(&engine).await;
    let catalog = catalog(&engine).await;

    let mut by_keyword = recipe_input(&catalog, "Morning Bowl");
    by_keyword.keywords = vec!["Breakfast".to_string()];
    published_recipe(&engine, admin.id, by_keyword).await;

    let mut by_description = recipe_input(&catalog, "Granola");
    by_description.description = "A crunchy breakfast staple".to_string();
    published_recipe(&engine, admin.id, by_description).await;

    published_recipe(&engine, admin.id, recipe_input(&catalog, "Stew")).await;

    let page = engine
        .search_recipes(SearchQuery {
            text: Some("breakfast".to_string()),
            sort: SortField::Title,
            order: SortOrder::Asc,
            ..SearchQuery::default()
        })
        .await
        .unwrap();
    let titles: Vec<&str> = page.items.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Granola", "Morning Bowl"]);
}

#[tokio::test]
async fn numeric_filters_are_bounds() {
    let engine = engine_with_db().await;
    let admin = admin(&engine).await;
    let catalog = catalog(&engine).await;
    for (title, prep, servings) in [("Quick", 10, 2), ("Medium", 30, 4), ("Slow", 90, 8)] {
        let mut input = recipe_input(&catalog, title);
        input.prep_time = Some(prep);
        input.servings = Some(servings);
        published_recipe(&engine, admin.id, input).await;
    }

    let page = engine
        .search_recipes(SearchQuery {
            max_prep_time: Some(30),
            sort: SortField::PrepTime,
            order: SortOrder::Asc,
            ..SearchQuery::default()
        })
        .await
        .unwrap();
    let preps: Vec<i32> = page.items.iter().map(|r| r.prep_time).collect();
    assert_eq!(preps, vec![10, 30]);

    let page = engine
        .search_recipes(SearchQuery {
            min_servings: Some(4),
            sort: SortField::Servings,
            order: SortOrder::Desc,
            ..SearchQuery::default()
        })
        .await
        .unwrap();
    let servings: Vec<i32> = page.items.iter().map(|r| r.servings).collect();
    assert_eq!(servings, vec![8, 4]);

    let page = engine
        .search_recipes(SearchQuery {
            category_id: Some(catalog.category_id + 1),
            ..SearchQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total_count, 0);
}

#[tokio::test]
async fn suggestions_cover_recipes_categories_and_ingredients() {
    let engine = engine_with_db().await;
    let admin = admin(&engine).await;
    let catalog = catalog(&engine).await;
    published_recipe(&engine, admin.id, recipe_input(&catalog, "Sugar Cookies")).await;

    let found = engine.suggestions("sug", None).await.unwrap();
    assert_eq!(found.recipes.len(), 1);
    assert_eq!(found.recipes[0].name, "Sugar Cookies");
    assert_eq!(found.ingredients.len(), 1);
    assert!(found.categories.is_empty());

    let empty = engine.suggestions("  ", None).await.unwrap();
    assert!(empty.recipes.is_empty() && empty.categories.is_empty());
}
