use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use engine::{Engine, NewRecipe, NewRecipeIngredient, RecipeSource, Role};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use server::ServerConfig;
use tower::ServiceExt;

async fn engine() -> Arc<Engine> {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Arc::new(Engine::builder().database(db).build().await.unwrap())
}

fn app(engine: Arc<Engine>) -> Router {
    server::router(
        engine,
        &ServerConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl_hours: 1,
            cookie_secure: false,
            frontend_url: Some("http://localhost:5173".to_string()),
        },
    )
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or_default().to_string());
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, cookie, body)
}

fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, cookie, _) = send(
        app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": email, "password": password }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    cookie.unwrap()
}

async fn admin_cookie(engine: &Engine, app: &Router) -> String {
    engine
        .ensure_admin("admin@example.com", "Admin", "password1")
        .await
        .unwrap();
    login(app, "admin@example.com", "password1").await
}

async fn member_cookie(app: &Router, name: &str) -> String {
    let email = format!("{}@example.com", name.to_lowercase());
    let (status, cookie, body) = send(
        app,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({ "name": name, "email": email, "password": "password1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    cookie.unwrap()
}

fn cake(category_id: i32, sub_category_id: i32, ingredient_id: i32, title: &str) -> NewRecipe {
    NewRecipe {
        category_id: Some(category_id),
        sub_category_id: Some(sub_category_id),
        title: title.to_string(),
        description: "A cake".to_string(),
        prep_time: Some(15),
        cook_time: Some(30),
        servings: Some(6),
        ingredients: vec![NewRecipeIngredient {
            ingredient_id,
            quantity: Some("2".to_string()),
            unit: Some("cups".to_string()),
        }],
        instructions: vec!["Mix".to_string(), "Bake".to_string()],
        keywords: vec!["dessert".to_string()],
        image: None,
    }
}

#[tokio::test]
async fn duplicate_category_is_a_conflict() {
    let engine = engine().await;
    let app = app(engine.clone());
    let cookie = admin_cookie(&engine, &app).await;

    let body = json!({ "name": "Desserts", "description": "Sweet" });
    let (status, _, created) = send(
        &app,
        json_request("POST", "/api/categories", Some(&cookie), body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["success"], true);
    assert_eq!(created["data"]["name"], "Desserts");

    let (status, _, conflict) = send(
        &app,
        json_request("POST", "/api/categories", Some(&cookie), body),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(conflict["success"], false);
    assert_eq!(conflict["message"], "Category already exists");
}

#[tokio::test]
async fn admin_routes_check_token_and_role() {
    let engine = engine().await;
    let app = app(engine);

    let body = json!({ "name": "Soups", "description": "Warm" });
    let (status, _, anonymous) = send(
        &app,
        json_request("POST", "/api/categories", None, body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous["success"], false);

    let (status, _, _) = send(
        &app,
        json_request("POST", "/api/categories", Some("token=forged"), body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let cookie = member_cookie(&app, "Bob").await;
    let (status, _, denied) = send(
        &app,
        json_request("POST", "/api/categories", Some(&cookie), body),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(denied["message"], "Admin access required");
}

#[tokio::test]
async fn session_cookie_and_bearer_identify_the_user() {
    let engine = engine().await;
    let app = app(engine);

    let cookie = member_cookie(&app, "Carol").await;
    assert!(cookie.starts_with("token="));

    let (status, _, me) = send(&app, get("/api/auth/me", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["email"], "carol@example.com");
    assert_eq!(me["data"]["role"], "user");

    let token = cookie.trim_start_matches("token=");
    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, wrong) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "carol@example.com", "password": "nope-nope" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong["success"], false);
}

#[tokio::test]
async fn registration_reports_every_invalid_field() {
    let engine = engine().await;
    let app = app(engine);

    let (status, _, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({ "name": "", "email": "not-an-email", "password": "short" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed");
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));
}

#[tokio::test]
async fn missing_registration_fields_are_field_errors() {
    let engine = engine().await;
    let app = app(engine);

    let (status, _, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({ "email": "dana@example.com" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert_eq!(fields, vec!["name", "password"]);
}

#[tokio::test]
async fn role_is_read_from_the_account_not_the_token() {
    let engine = engine().await;
    let app = app(engine.clone());
    let admin = admin_cookie(&engine, &app).await;

    member_cookie(&app, "Dave").await;
    let dave = engine
        .assign_role("dave@example.com", Role::Admin)
        .await
        .unwrap();
    let promoted = login(&app, "dave@example.com", "password1").await;

    let body = json!({ "name": "Soups", "description": "Warm" });
    let (status, _, _) = send(
        &app,
        json_request("POST", "/api/categories", Some(&promoted), body),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, _) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/users/{}/role", dave.id),
            Some(&admin),
            json!({ "role": "user" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let body = json!({ "name": "Salads", "description": "Fresh" });
    let (status, _, denied) = send(
        &app,
        json_request("POST", "/api/categories", Some(&promoted), body),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(denied["message"], "Admin access required");

    let (status, _, me) = send(&app, get("/api/auth/me", Some(&promoted))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["role"], "user");

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/users/{}", dave.id))
        .header(header::COOKIE, &admin)
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, gone) = send(&app, get("/api/auth/me", Some(&promoted))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(gone["message"], "Invalid or expired token");
}

#[tokio::test]
async fn logout_clears_the_session_cookie() {
    let engine = engine().await;
    let app = app(engine);
    let cookie = member_cookie(&app, "Erin").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/logout")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cleared.starts_with("token=;"), "{cleared}");
    assert!(cleared.contains("Max-Age=0"), "{cleared}");
    assert!(cleared.contains("Path=/"), "{cleared}");

    let (status, _, _) = send(&app, get("/api/auth/me", Some("token="))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn search_pages_through_published_recipes() {
    let engine = engine().await;
    let app = app(engine.clone());
    let admin = engine
        .ensure_admin("admin@example.com", "Admin", "password1")
        .await
        .unwrap();
    let category = engine
        .create_category("Desserts", "Sweet", None)
        .await
        .unwrap();
    let sub_category = engine
        .create_sub_category(Some(category.id), "Cakes", "Baked")
        .await
        .unwrap();
    let flour = engine.create_ingredient("Flour").await.unwrap();
    for i in 0..12 {
        engine
            .create_recipe(
                admin.id,
                RecipeSource::Admin,
                cake(category.id, sub_category.id, flour.id, &format!("Cake {i:02}")),
            )
            .await
            .unwrap();
    }

    let (status, _, body) = send(
        &app,
        get("/api/search/recipes?q=cake&page=2&limit=5&sortBy=title&order=asc", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let recipes = body["data"]["recipes"].as_array().unwrap();
    assert_eq!(recipes.len(), 5);
    assert_eq!(recipes[0]["title"], "Cake 05");
    assert_eq!(body["data"]["pagination"]["totalCount"], 12);
    assert_eq!(body["data"]["pagination"]["totalPages"], 3);

    let (status, _, body) = send(&app, get("/api/search/suggestions?q=fl", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["ingredients"][0]["name"], "Flour");
}

#[tokio::test]
async fn malformed_query_values_are_rejected() {
    let engine = engine().await;
    let app = app(engine);

    let (status, _, body) = send(&app, get("/api/search/recipes?prepTime=soon", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _, _) = send(&app, get("/api/categories/abc", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn pending_recipe_is_only_visible_to_owner_and_admin() {
    let engine = engine().await;
    let app = app(engine.clone());
    let admin = admin_cookie(&engine, &app).await;
    let category = engine
        .create_category("Mains", "Dinner", None)
        .await
        .unwrap();
    let sub_category = engine
        .create_sub_category(Some(category.id), "Pasta", "Noodles")
        .await
        .unwrap();
    let flour = engine.create_ingredient("Flour").await.unwrap();

    let owner = member_cookie(&app, "Dana").await;
    let (status, _, created) = send(
        &app,
        json_request(
            "POST",
            "/api/recipes",
            Some(&owner),
            json!({
                "categoryId": category.id,
                "subCategoryId": sub_category.id,
                "title": "Fresh pasta",
                "description": "Egg pasta",
                "prepTime": 30,
                "cookTime": 5,
                "servings": 2,
                "ingredients": [{ "ingredientId": flour.id, "quantity": "200", "unit": "g" }],
                "instructions": ["Knead", "Roll", "Cut"],
                "keywords": ["pasta"]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["data"]["adminApprovedStatus"], "pending");
    let id = created["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/recipes/{id}");

    let (status, _, _) = send(&app, get(&uri, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, _) = send(&app, get(&uri, Some(&owner))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, body) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/manage-recipe-by-admin/recipes/{id}/public"),
            Some(&admin),
            json!({ "publicApproved": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Recipe must be approved before it can be public");

    for (path, body) in [
        ("status", json!({ "status": "approved" })),
        ("public", json!({ "publicApproved": true })),
    ] {
        let (status, _, _) = send(
            &app,
            json_request(
                "PUT",
                &format!("/api/manage-recipe-by-admin/recipes/{id}/{path}"),
                Some(&admin),
                body,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _, body) = send(&app, get(&uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["instructions"][2]["body"], "Cut");
}

#[tokio::test]
async fn hero_banner_lifecycle() {
    let engine = engine().await;
    let app = app(engine.clone());

    let (status, _, body) = send(&app, get("/api/banners/hero", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No hero banner set");

    let admin = admin_cookie(&engine, &app).await;
    let (status, _, created) = send(
        &app,
        json_request(
            "POST",
            "/api/banners",
            Some(&admin),
            json!({
                "title": "Summer",
                "image": "data:image/png;base64,iVBORw0KGgo=",
                "isHero": true
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");

    let (status, _, hero) = send(&app, get("/api/banners/hero", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hero["data"]["title"], "Summer");
    assert_eq!(hero["data"]["isHero"], true);
}
