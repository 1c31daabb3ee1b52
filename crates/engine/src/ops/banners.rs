use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};

use crate::{
    Banner, BannerPatch, EngineError, FileOwner, NewBanner, OwnerKind, ResultEngine, banners,
    util::{Checks, normalize_display, normalize_key},
};

use super::{Engine, files, with_tx};

/// Drop the hero flag from every banner. Callers set the new hero in the
/// same transaction.
async fn clear_hero<C: ConnectionTrait>(conn: &C) -> ResultEngine<()> {
    banners::Entity::update_many()
        .col_expr(banners::Column::IsHero, Expr::value(false))
        .filter(banners::Column::IsHero.eq(true))
        .exec(conn)
        .await?;
    Ok(())
}

fn clean_keywords(keywords: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    keywords
        .iter()
        .filter_map(|keyword| normalize_display(keyword))
        .filter(|keyword| seen.insert(normalize_key(keyword)))
        .collect()
}

impl Engine {
    /// Hero first, then newest.
    pub async fn list_banners(&self) -> ResultEngine<Vec<Banner>> {
        let models = banners::Entity::find()
            .order_by_desc(banners::Column::IsHero)
            .order_by_desc(banners::Column::CreatedAt)
            .order_by_desc(banners::Column::Id)
            .all(&self.database)
            .await?;
        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let mut images = files::images_for(&self.database, OwnerKind::Banner, &ids).await?;
        Ok(models
            .into_iter()
            .map(|model| {
                let image = images.remove(&model.id);
                Banner::from_model(model, image)
            })
            .collect())
    }

    pub async fn hero_banner(&self) -> ResultEngine<Banner> {
        let model = banners::Entity::find()
            .filter(banners::Column::IsHero.eq(true))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("No hero banner set".to_string()))?;
        self.banner_view(model).await
    }

    pub async fn banner(&self, banner_id: i32) -> ResultEngine<Banner> {
        let model = self.require_banner(banner_id).await?;
        self.banner_view(model).await
    }

    /// Create a banner. A banner created as hero takes the flag from the
    /// previous one.
    pub async fn create_banner(&self, input: NewBanner) -> ResultEngine<Banner> {
        let mut checks = Checks::new();
        let title = checks.text("title", &input.title);
        if input.image.as_deref().is_none_or(|uri| uri.trim().is_empty()) {
            checks.fail("image", "image is required");
        }
        checks.finish()?;
        let image = files::parse_image(input.image.as_deref())?;
        let keywords = clean_keywords(&input.keywords);

        let id = with_tx!(self, |db_tx| {
            if input.is_hero {
                clear_hero(&db_tx).await?;
            }
            let now = Utc::now();
            let model = banners::ActiveModel {
                id: ActiveValue::NotSet,
                title: ActiveValue::Set(title),
                keywords: ActiveValue::Set(serde_json::json!(keywords)),
                is_hero: ActiveValue::Set(input.is_hero),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            if let Some(image) = &image {
                files::put_image(&db_tx, FileOwner::banner(model.id), image).await?;
            }
            Ok::<_, EngineError>(model.id)
        })?;

        tracing::info!(banner_id = id, hero = input.is_hero, "banner created");
        self.banner(id).await
    }

    pub async fn update_banner(&self, banner_id: i32, patch: BannerPatch) -> ResultEngine<Banner> {
        let mut checks = Checks::new();
        let title = checks.optional_text("title", patch.title.as_deref());
        checks.finish()?;
        let image = files::parse_image(patch.image.as_deref())?;

        let model = self.require_banner(banner_id).await?;
        with_tx!(self, |db_tx| {
            if patch.is_hero == Some(true) {
                clear_hero(&db_tx).await?;
            }
            let mut active: banners::ActiveModel = model.into();
            if let Some(title) = title {
                active.title = ActiveValue::Set(title);
            }
            if let Some(keywords) = &patch.keywords {
                active.keywords = ActiveValue::Set(serde_json::json!(clean_keywords(keywords)));
            }
            if let Some(is_hero) = patch.is_hero {
                active.is_hero = ActiveValue::Set(is_hero);
            }
            active.updated_at = ActiveValue::Set(Utc::now());
            active.update(&db_tx).await?;

            if let Some(image) = &image {
                files::put_image(&db_tx, FileOwner::banner(banner_id), image).await?;
            }
            Ok::<_, EngineError>(())
        })?;

        self.banner(banner_id).await
    }

    /// Make `banner_id` the only hero banner.
    pub async fn set_hero_banner(&self, banner_id: i32) -> ResultEngine<Banner> {
        let model = self.require_banner(banner_id).await?;
        with_tx!(self, |db_tx| {
            clear_hero(&db_tx).await?;
            let mut active: banners::ActiveModel = model.into();
            active.is_hero = ActiveValue::Set(true);
            active.updated_at = ActiveValue::Set(Utc::now());
            active.update(&db_tx).await?;
            Ok::<_, EngineError>(())
        })?;

        tracing::info!(banner_id, "hero banner changed");
        self.banner(banner_id).await
    }

    pub async fn delete_banner(&self, banner_id: i32) -> ResultEngine<()> {
        self.require_banner(banner_id).await?;
        with_tx!(self, |db_tx| {
            files::delete_image(&db_tx, FileOwner::banner(banner_id)).await?;
            banners::Entity::delete_by_id(banner_id).exec(&db_tx).await?;
            Ok(())
        })
    }

    async fn banner_view(&self, model: banners::Model) -> ResultEngine<Banner> {
        let image = files::image_for(&self.database, FileOwner::banner(model.id)).await?;
        Ok(Banner::from_model(model, image))
    }

    async fn require_banner(&self, banner_id: i32) -> ResultEngine<banners::Model> {
        banners::Entity::find_by_id(banner_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("Banner not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_trimmed_and_deduplicated() {
        let keywords = vec![
            " Summer ".to_string(),
            "summer".to_string(),
            "".to_string(),
            "Grill".to_string(),
        ];
        assert_eq!(clean_keywords(&keywords), vec!["Summer", "Grill"]);
    }
}
