use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};

use crate::{
    Category, EngineError, FileOwner, OwnerKind, ResultEngine, categories, recipes,
    sub_categories,
    util::{Checks, normalize_key},
};

use super::{Engine, files, with_tx};

const CATEGORY_EXISTS: &str = "Category already exists";

/// Partial update of a category. `None` leaves the field untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl Engine {
    /// All categories, alphabetically.
    pub async fn list_categories(&self) -> ResultEngine<Vec<Category>> {
        let models = categories::Entity::find()
            .order_by_asc(categories::Column::NameNorm)
            .all(&self.database)
            .await?;
        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let mut images = files::images_for(&self.database, OwnerKind::Category, &ids).await?;

        Ok(models
            .into_iter()
            .map(|model| {
                let image = images.remove(&model.id);
                Category::from_model(model, image)
            })
            .collect())
    }

    pub async fn category(&self, category_id: i32) -> ResultEngine<Category> {
        let model = require_category(&self.database, category_id).await?;
        let image = files::image_for(&self.database, FileOwner::category(model.id)).await?;
        Ok(Category::from_model(model, image))
    }

    /// Create a category. Names are unique ignoring case, spacing and accents.
    pub async fn create_category(
        &self,
        name: &str,
        description: &str,
        image: Option<&str>,
    ) -> ResultEngine<Category> {
        let mut checks = Checks::new();
        let name = checks.text("name", name);
        let description = checks.text("description", description);
        checks.finish()?;
        let image = files::parse_image(image)?;

        let name_norm = normalize_key(&name);
        self.ensure_category_name_free(&name_norm, None).await?;

        let id = with_tx!(self, |db_tx| {
            let now = Utc::now();
            let model = categories::ActiveModel {
                id: ActiveValue::NotSet,
                name: ActiveValue::Set(name),
                name_norm: ActiveValue::Set(name_norm),
                description: ActiveValue::Set(description),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await
            .map_err(EngineError::on_conflict(CATEGORY_EXISTS))?;

            if let Some(image) = &image {
                files::put_image(&db_tx, FileOwner::category(model.id), image).await?;
            }
            Ok::<_, EngineError>(model.id)
        })?;

        self.category(id).await
    }

    pub async fn update_category(
        &self,
        category_id: i32,
        patch: CategoryPatch,
    ) -> ResultEngine<Category> {
        let mut checks = Checks::new();
        let name = checks.optional_text("name", patch.name.as_deref());
        let description = checks.optional_text("description", patch.description.as_deref());
        checks.finish()?;
        let image = files::parse_image(patch.image.as_deref())?;

        let model = require_category(&self.database, category_id).await?;
        if let Some(name) = &name {
            self.ensure_category_name_free(&normalize_key(name), Some(category_id))
                .await?;
        }

        with_tx!(self, |db_tx| {
            let mut active: categories::ActiveModel = model.into();
            if let Some(name) = name {
                active.name_norm = ActiveValue::Set(normalize_key(&name));
                active.name = ActiveValue::Set(name);
            }
            if let Some(description) = description {
                active.description = ActiveValue::Set(description);
            }
            active.updated_at = ActiveValue::Set(Utc::now());
            active
                .update(&db_tx)
                .await
                .map_err(EngineError::on_conflict(CATEGORY_EXISTS))?;

            if let Some(image) = &image {
                files::put_image(&db_tx, FileOwner::category(category_id), image).await?;
            }
            Ok::<_, EngineError>(())
        })?;

        self.category(category_id).await
    }

    /// Delete a category with its sub-categories. Refused while recipes use it.
    pub async fn delete_category(&self, category_id: i32) -> ResultEngine<()> {
        require_category(&self.database, category_id).await?;

        let in_use = recipes::Entity::find()
            .filter(recipes::Column::CategoryId.eq(category_id))
            .count(&self.database)
            .await?;
        if in_use > 0 {
            return Err(EngineError::ExistingKey(
                "Category is in use by recipes".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            sub_categories::Entity::delete_many()
                .filter(sub_categories::Column::CategoryId.eq(category_id))
                .exec(&db_tx)
                .await?;
            files::delete_image(&db_tx, FileOwner::category(category_id)).await?;
            categories::Entity::delete_by_id(category_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    async fn ensure_category_name_free(
        &self,
        name_norm: &str,
        except: Option<i32>,
    ) -> ResultEngine<()> {
        let mut query =
            categories::Entity::find().filter(categories::Column::NameNorm.eq(name_norm));
        if let Some(id) = except {
            query = query.filter(categories::Column::Id.ne(id));
        }
        if query.one(&self.database).await?.is_some() {
            return Err(EngineError::ExistingKey(CATEGORY_EXISTS.to_string()));
        }
        Ok(())
    }
}

pub(super) async fn require_category<C: ConnectionTrait>(
    conn: &C,
    category_id: i32,
) -> ResultEngine<categories::Model> {
    categories::Entity::find_by_id(category_id)
        .one(conn)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("Category not found".to_string()))
}
