mod common;

use std::sync::Arc;

use common::{CapturingNotifier, PIXEL, engine_with_db, engine_with_notifier, member};
use engine::{Actor, EngineError, PageRequest, Role};

#[tokio::test]
async fn register_then_authenticate() {
    let engine = engine_with_db().await;
    let user = engine
        .register("Alice", " Alice@Example.com ", "password1")
        .await
        .unwrap();
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.role, Role::User);
    assert!(!user.is_verified);

    let logged = engine
        .authenticate("ALICE@example.com", "password1")
        .await
        .unwrap();
    assert_eq!(logged.id, user.id);

    let wrong = engine.authenticate("alice@example.com", "nope-nope").await;
    let unknown = engine.authenticate("bob@example.com", "password1").await;
    assert_eq!(wrong.unwrap_err(), unknown.unwrap_err());

    assert_eq!(
        engine
            .register("Again", "alice@example.com", "password1")
            .await
            .unwrap_err(),
        EngineError::ExistingKey("User already exists".to_string())
    );
}

#[tokio::test]
async fn register_validates_input() {
    let engine = engine_with_db().await;
    let Err(EngineError::Validation(errors)) = engine.register("", "nobody", "short").await else {
        panic!("expected validation error");
    };
    let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["name", "email", "password"]);
}

#[tokio::test]
async fn password_reset_with_otp() {
    let notifier = Arc::new(CapturingNotifier::default());
    let engine = engine_with_notifier(notifier.clone()).await;
    member(&engine, "Alice").await;

    engine
        .request_password_reset("nobody@example.com")
        .await
        .unwrap();
    assert!(notifier.last_code().is_none());

    engine
        .request_password_reset("alice@example.com")
        .await
        .unwrap();
    let code = notifier.last_code().unwrap();
    assert_eq!(code.len(), 6);

    assert_eq!(
        engine
            .reset_password("alice@example.com", "000000x", "newpassword")
            .await
            .unwrap_err(),
        EngineError::InvalidInput("Invalid or expired OTP".to_string())
    );
    engine.verify_otp("alice@example.com", &code).await.unwrap();
    engine
        .reset_password("alice@example.com", &code, "newpassword")
        .await
        .unwrap();

    assert!(engine.authenticate("alice@example.com", "password1").await.is_err());
    let user = engine
        .authenticate("alice@example.com", "newpassword")
        .await
        .unwrap();
    assert!(user.is_verified);

    // Codes are single use.
    assert!(
        engine
            .reset_password("alice@example.com", &code, "another-one")
            .await
            .is_err()
    );
}

#[tokio::test]
async fn profile_and_roles() {
    let engine = engine_with_db().await;
    let alice = member(&engine, "Alice").await;
    let admin = engine
        .ensure_admin("root@example.com", "Root", "password1")
        .await
        .unwrap();
    let actor = Actor {
        user_id: admin.id,
        role: admin.role,
    };

    let updated = engine
        .update_profile(alice.id, Some("Alice B"), Some(PIXEL))
        .await
        .unwrap();
    assert_eq!(updated.name, "Alice B");
    assert_eq!(updated.avatar.as_deref(), Some(PIXEL));

    let promoted = engine.set_role(&actor, alice.id, Role::Admin).await.unwrap();
    assert_eq!(promoted.role, Role::Admin);
    assert!(matches!(
        engine.set_role(&actor, admin.id, Role::User).await,
        Err(EngineError::Forbidden(_))
    ));

    let again = engine
        .ensure_admin("root@example.com", "Root", "password1")
        .await
        .unwrap();
    assert_eq!(again.id, admin.id);

    let users = engine.list_users(PageRequest::default()).await.unwrap();
    assert_eq!(users.total_count, 2);
    assert_eq!(users.items[0].avatar.as_deref(), Some(PIXEL));
}

#[tokio::test]
async fn assign_role_by_email() {
    let engine = engine_with_db().await;
    let bob = member(&engine, "Bob").await;

    let promoted = engine
        .assign_role("  BOB@example.com ", Role::Admin)
        .await
        .unwrap();
    assert_eq!(promoted.id, bob.id);
    assert_eq!(promoted.role, Role::Admin);

    assert!(matches!(
        engine.assign_role("ghost@example.com", Role::User).await,
        Err(EngineError::KeyNotFound(_))
    ));
}
