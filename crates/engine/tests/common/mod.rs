#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use engine::{Engine, NewRecipe, NewRecipeIngredient, OtpNotifier, RecipeSource, User};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

pub const PIXEL: &str = "data:image/png;base64,iVBORw0KGgo=";

/// Remembers every code handed out, newest last.
#[derive(Debug, Default)]
pub struct CapturingNotifier {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl CapturingNotifier {
    pub fn last_code(&self) -> Option<String> {
        self.sent.lock().unwrap().last().map(|(_, code)| code.clone())
    }
}

impl OtpNotifier for CapturingNotifier {
    fn deliver(&self, email: &str, code: &str) {
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), code.to_string()));
    }
}

pub async fn engine_with_db() -> Engine {
    engine_with_notifier(Arc::new(CapturingNotifier::default())).await
}

pub async fn engine_with_notifier(notifier: Arc<dyn OtpNotifier>) -> Engine {
    let db = migrated_db().await;
    Engine::builder()
        .database(db)
        .notifier(notifier)
        .build()
        .await
        .unwrap()
}

/// Engine plus a handle on the same database, to inspect or tamper with rows.
pub async fn engine_and_db() -> (Engine, DatabaseConnection) {
    let db = migrated_db().await;
    let engine = Engine::builder().database(db.clone()).build().await.unwrap();
    (engine, db)
}

async fn migrated_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

pub async fn member(engine: &Engine, name: &str) -> User {
    engine
        .register(name, &format!("{}@example.com", name.to_lowercase()), "password1")
        .await
        .unwrap()
}

pub async fn admin(engine: &Engine) -> User {
    engine
        .ensure_admin("admin@example.com", "Admin", "password1")
        .await
        .unwrap()
}

/// A category with one sub-category and two ingredients.
pub struct Catalog {
    pub category_id: i32,
    pub sub_category_id: i32,
    pub ingredient_ids: Vec<i32>,
}

pub async fn catalog(engine: &Engine) -> Catalog {
    let category = engine
        .create_category("Desserts", "Sweet things", None)
        .await
        .unwrap();
    let sub_category = engine
        .create_sub_category(Some(category.id), "Cakes", "Baked")
        .await
        .unwrap();
    let flour = engine.create_ingredient("Flour").await.unwrap();
    let sugar = engine.create_ingredient("Sugar").await.unwrap();
    Catalog {
        category_id: category.id,
        sub_category_id: sub_category.id,
        ingredient_ids: vec![flour.id, sugar.id],
    }
}

pub fn recipe_input(catalog: &Catalog, title: &str) -> NewRecipe {
    NewRecipe {
        category_id: Some(catalog.category_id),
        sub_category_id: Some(catalog.sub_category_id),
        title: title.to_string(),
        description: format!("{title} description"),
        prep_time: Some(20),
        cook_time: Some(40),
        servings: Some(4),
        ingredients: catalog
            .ingredient_ids
            .iter()
            .map(|id| NewRecipeIngredient {
                ingredient_id: *id,
                quantity: Some("100".to_string()),
                unit: Some("g".to_string()),
            })
            .collect(),
        instructions: vec!["Mix".to_string(), "Bake".to_string(), "Cool".to_string()],
        keywords: vec!["sweet".to_string()],
        image: None,
    }
}

pub async fn published_recipe(engine: &Engine, author_id: i32, input: NewRecipe) -> i32 {
    engine
        .create_recipe(author_id, RecipeSource::Admin, input)
        .await
        .unwrap()
        .id
}
