mod common;

use common::{PIXEL, admin, catalog, engine_with_db, published_recipe, recipe_input};
use engine::{CategoryPatch, EngineError, PageRequest, SubCategoryPatch};

#[tokio::test]
async fn category_names_are_unique_ignoring_case_and_accents() {
    let engine = engine_with_db().await;
    engine
        .create_category("Crème Brûlée", "Custards", None)
        .await
        .unwrap();

    let err = engine
        .create_category("creme  brulee", "Again", None)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("Category already exists".to_string()));
}

#[tokio::test]
async fn category_validation_reports_every_field() {
    let engine = engine_with_db().await;
    let Err(EngineError::Validation(errors)) = engine.create_category(" ", "", None).await else {
        panic!("expected validation error");
    };
    let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["name", "description"]);
}

#[tokio::test]
async fn category_image_round_trips_and_updates() {
    let engine = engine_with_db().await;
    let category = engine
        .create_category("Breads", "Loaves", Some(PIXEL))
        .await
        .unwrap();
    assert_eq!(category.image.as_deref(), Some(PIXEL));

    let updated = engine
        .update_category(
            category.id,
            CategoryPatch {
                description: Some("Loaves and rolls".to_string()),
                ..CategoryPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Breads");
    assert_eq!(updated.description, "Loaves and rolls");
    assert_eq!(updated.image.as_deref(), Some(PIXEL));

    let bad = engine
        .create_category("Soups", "Hot", Some("data:text/plain;base64,aGk="))
        .await;
    assert!(matches!(bad, Err(EngineError::Image(_))));
}

#[tokio::test]
async fn category_in_use_cannot_be_deleted() {
    let engine = engine_with_db().await;
    let admin = admin(&engine).await;
    let catalog = catalog(&engine).await;
    published_recipe(&engine, admin.id, recipe_input(&catalog, "Cake")).await;

    assert_eq!(
        engine.delete_category(catalog.category_id).await.unwrap_err(),
        EngineError::ExistingKey("Category is in use by recipes".to_string())
    );
    assert_eq!(
        engine
            .delete_sub_category(catalog.sub_category_id)
            .await
            .unwrap_err(),
        EngineError::ExistingKey("Sub-category is in use by recipes".to_string())
    );
    assert_eq!(
        engine
            .delete_ingredient(catalog.ingredient_ids[0])
            .await
            .unwrap_err(),
        EngineError::ExistingKey("Ingredient is in use by recipes".to_string())
    );
}

#[tokio::test]
async fn sub_category_in_use_stays_under_its_category() {
    let engine = engine_with_db().await;
    let admin = admin(&engine).await;
    let catalog = catalog(&engine).await;
    published_recipe(&engine, admin.id, recipe_input(&catalog, "Cake")).await;
    let mains = engine.create_category("Mains", "Dinner", None).await.unwrap();

    let moved = engine
        .update_sub_category(
            catalog.sub_category_id,
            SubCategoryPatch {
                category_id: Some(mains.id),
                ..SubCategoryPatch::default()
            },
        )
        .await;
    assert_eq!(
        moved.unwrap_err(),
        EngineError::ExistingKey("Sub-category is in use by recipes".to_string())
    );
    let cakes = engine.sub_category(catalog.sub_category_id).await.unwrap();
    assert_eq!(cakes.category_id, catalog.category_id);

    // Same parent plus a rename is still fine.
    let renamed = engine
        .update_sub_category(
            catalog.sub_category_id,
            SubCategoryPatch {
                category_id: Some(catalog.category_id),
                name: Some("Layer Cakes".to_string()),
                ..SubCategoryPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Layer Cakes");

    engine.delete_category(mains.id).await.unwrap();
}

#[tokio::test]
async fn deleting_a_category_drops_its_sub_categories() {
    let engine = engine_with_db().await;
    let catalog = catalog(&engine).await;

    engine.delete_category(catalog.category_id).await.unwrap();
    assert_eq!(
        engine.sub_category(catalog.sub_category_id).await.unwrap_err(),
        EngineError::KeyNotFound("Sub-category not found".to_string())
    );
}

#[tokio::test]
async fn sub_categories_filter_by_category() {
    let engine = engine_with_db().await;
    let catalog = catalog(&engine).await;
    let mains = engine.create_category("Mains", "Dinner", None).await.unwrap();
    engine
        .create_sub_category(Some(mains.id), "Stews", "Slow")
        .await
        .unwrap();

    let all = engine.list_sub_categories(None).await.unwrap();
    assert_eq!(all.len(), 2);
    let desserts = engine
        .list_sub_categories(Some(catalog.category_id))
        .await
        .unwrap();
    assert_eq!(desserts.len(), 1);
    assert_eq!(desserts[0].category_name, "Desserts");

    let moved = engine
        .update_sub_category(
            catalog.sub_category_id,
            SubCategoryPatch {
                category_id: Some(mains.id),
                ..SubCategoryPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.category_name, "Mains");

    let missing = engine.create_sub_category(Some(999), "Orphans", "None").await;
    assert_eq!(
        missing.unwrap_err(),
        EngineError::KeyNotFound("Category not found".to_string())
    );
}

#[tokio::test]
async fn ingredients_page_and_filter() {
    let engine = engine_with_db().await;
    for name in ["Butter", "Buttermilk", "Eggs", "Milk"] {
        engine.create_ingredient(name).await.unwrap();
    }
    assert_eq!(
        engine.create_ingredient("eggs").await.unwrap_err(),
        EngineError::ExistingKey("Ingredient already exists".to_string())
    );

    let milk = engine
        .list_ingredients(Some("MILK"), PageRequest::default())
        .await
        .unwrap();
    let names: Vec<&str> = milk.items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Buttermilk", "Milk"]);

    let page = engine
        .list_ingredients(None, PageRequest::new(Some(2), Some(3)))
        .await
        .unwrap();
    assert_eq!(page.total_count, 4);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "Milk");

    let literal = engine
        .list_ingredients(Some("%"), PageRequest::default())
        .await
        .unwrap();
    assert!(literal.items.is_empty());
}
