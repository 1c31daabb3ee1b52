mod common;

use common::{PIXEL, engine_with_db};
use engine::{BannerPatch, EngineError, NewBanner};

fn banner(title: &str, is_hero: bool) -> NewBanner {
    NewBanner {
        title: title.to_string(),
        image: Some(PIXEL.to_string()),
        keywords: vec!["summer".to_string()],
        is_hero,
    }
}

#[tokio::test]
async fn at_most_one_hero_banner() {
    let engine = engine_with_db().await;
    assert_eq!(
        engine.hero_banner().await.unwrap_err(),
        EngineError::KeyNotFound("No hero banner set".to_string())
    );

    let first = engine.create_banner(banner("First", true)).await.unwrap();
    let second = engine.create_banner(banner("Second", true)).await.unwrap();
    let third = engine.create_banner(banner("Third", false)).await.unwrap();
    assert_eq!(engine.hero_banner().await.unwrap().id, second.id);

    engine.set_hero_banner(first.id).await.unwrap();
    engine
        .update_banner(
            third.id,
            BannerPatch {
                is_hero: Some(true),
                ..BannerPatch::default()
            },
        )
        .await
        .unwrap();

    let all = engine.list_banners().await.unwrap();
    let heroes: Vec<i32> = all.iter().filter(|b| b.is_hero).map(|b| b.id).collect();
    assert_eq!(heroes, vec![third.id]);
    assert_eq!(all[0].id, third.id);
}

#[tokio::test]
async fn banner_requires_title_and_image() {
    let engine = engine_with_db().await;
    let Err(EngineError::Validation(errors)) = engine
        .create_banner(NewBanner {
            title: " ".to_string(),
            ..NewBanner::default()
        })
        .await
    else {
        panic!("expected validation error");
    };
    let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["title", "image"]);
}

#[tokio::test]
async fn update_and_delete_banner() {
    let engine = engine_with_db().await;
    let created = engine.create_banner(banner("Promo", true)).await.unwrap();
    assert_eq!(created.image.as_deref(), Some(PIXEL));

    let updated = engine
        .update_banner(
            created.id,
            BannerPatch {
                title: Some("Autumn promo".to_string()),
                keywords: Some(vec!["autumn".to_string(), "Autumn".to_string()]),
                ..BannerPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Autumn promo");
    assert_eq!(updated.keywords, vec!["autumn".to_string()]);
    assert!(updated.is_hero);

    engine.delete_banner(created.id).await.unwrap();
    assert!(engine.hero_banner().await.is_err());
    assert_eq!(
        engine.delete_banner(created.id).await.unwrap_err(),
        EngineError::KeyNotFound("Banner not found".to_string())
    );
}
