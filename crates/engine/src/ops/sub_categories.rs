use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ActiveValue, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, prelude::*};

use crate::{
    EngineError, ResultEngine, SubCategory, categories, recipes, sub_categories,
    util::{Checks, normalize_key},
};

use super::{Engine, categories::require_category};

const SUB_CATEGORY_EXISTS: &str = "Sub-category already exists";
const SUB_CATEGORY_IN_USE: &str = "Sub-category is in use by recipes";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubCategoryPatch {
    pub category_id: Option<i32>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Engine {
    /// Sub-categories, optionally restricted to one category.
    pub async fn list_sub_categories(
        &self,
        category_id: Option<i32>,
    ) -> ResultEngine<Vec<SubCategory>> {
        let mut query = sub_categories::Entity::find().order_by_asc(sub_categories::Column::NameNorm);
        if let Some(category_id) = category_id {
            query = query.filter(sub_categories::Column::CategoryId.eq(category_id));
        }
        let models = query.all(&self.database).await?;

        let names: HashMap<i32, String> = categories::Entity::find()
            .all(&self.database)
            .await?
            .into_iter()
            .map(|category| (category.id, category.name))
            .collect();

        Ok(models
            .into_iter()
            .map(|model| {
                let category_name = names.get(&model.category_id).cloned().unwrap_or_default();
                SubCategory::from_model(model, category_name)
            })
            .collect())
    }

    pub async fn sub_category(&self, sub_category_id: i32) -> ResultEngine<SubCategory> {
        let model = require_sub_category(&self.database, sub_category_id).await?;
        let category = require_category(&self.database, model.category_id).await?;
        Ok(SubCategory::from_model(model, category.name))
    }

    pub async fn create_sub_category(
        &self,
        category_id: Option<i32>,
        name: &str,
        description: &str,
    ) -> ResultEngine<SubCategory> {
        let mut checks = Checks::new();
        let category_id = checks.id("categoryId", category_id);
        let name = checks.text("name", name);
        let description = checks.text("description", description);
        checks.finish()?;

        let category = require_category(&self.database, category_id).await?;
        let name_norm = normalize_key(&name);
        self.ensure_sub_category_name_free(&name_norm, None).await?;

        let now = Utc::now();
        let model = sub_categories::ActiveModel {
            id: ActiveValue::NotSet,
            category_id: ActiveValue::Set(category.id),
            name: ActiveValue::Set(name),
            name_norm: ActiveValue::Set(name_norm),
            description: ActiveValue::Set(description),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(&self.database)
        .await
        .map_err(EngineError::on_conflict(SUB_CATEGORY_EXISTS))?;

        Ok(SubCategory::from_model(model, category.name))
    }

    pub async fn update_sub_category(
        &self,
        sub_category_id: i32,
        patch: SubCategoryPatch,
    ) -> ResultEngine<SubCategory> {
        let mut checks = Checks::new();
        let name = checks.optional_text("name", patch.name.as_deref());
        let description = checks.optional_text("description", patch.description.as_deref());
        let category_id = patch.category_id.map(|id| checks.id("categoryId", Some(id)));
        checks.finish()?;

        let model = require_sub_category(&self.database, sub_category_id).await?;
        // Recipes keep their category; moving the sub-category under them
        // would split the pair.
        if let Some(category_id) = category_id.filter(|id| *id != model.category_id) {
            require_category(&self.database, category_id).await?;
            if self.recipes_using(sub_category_id).await? > 0 {
                return Err(EngineError::ExistingKey(SUB_CATEGORY_IN_USE.to_string()));
            }
        }
        if let Some(name) = &name {
            self.ensure_sub_category_name_free(&normalize_key(name), Some(sub_category_id))
                .await?;
        }

        let mut active: sub_categories::ActiveModel = model.into();
        if let Some(category_id) = category_id {
            active.category_id = ActiveValue::Set(category_id);
        }
        if let Some(name) = name {
            active.name_norm = ActiveValue::Set(normalize_key(&name));
            active.name = ActiveValue::Set(name);
        }
        if let Some(description) = description {
            active.description = ActiveValue::Set(description);
        }
        active.updated_at = ActiveValue::Set(Utc::now());
        active
            .update(&self.database)
            .await
            .map_err(EngineError::on_conflict(SUB_CATEGORY_EXISTS))?;

        self.sub_category(sub_category_id).await
    }

    /// Delete a sub-category. Refused while recipes use it.
    pub async fn delete_sub_category(&self, sub_category_id: i32) -> ResultEngine<()> {
        require_sub_category(&self.database, sub_category_id).await?;
        if self.recipes_using(sub_category_id).await? > 0 {
            return Err(EngineError::ExistingKey(SUB_CATEGORY_IN_USE.to_string()));
        }
        sub_categories::Entity::delete_by_id(sub_category_id)
            .exec(&self.database)
            .await?;
        Ok(())
    }

    async fn recipes_using(&self, sub_category_id: i32) -> ResultEngine<u64> {
        Ok(recipes::Entity::find()
            .filter(recipes::Column::SubCategoryId.eq(sub_category_id))
            .count(&self.database)
            .await?)
    }

    async fn ensure_sub_category_name_free(
        &self,
        name_norm: &str,
        except: Option<i32>,
    ) -> ResultEngine<()> {
        let mut query =
            sub_categories::Entity::find().filter(sub_categories::Column::NameNorm.eq(name_norm));
        if let Some(id) = except {
            query = query.filter(sub_categories::Column::Id.ne(id));
        }
        if query.one(&self.database).await?.is_some() {
            return Err(EngineError::ExistingKey(SUB_CATEGORY_EXISTS.to_string()));
        }
        Ok(())
    }
}

pub(super) async fn require_sub_category<C: ConnectionTrait>(
    conn: &C,
    sub_category_id: i32,
) -> ResultEngine<sub_categories::Model> {
    sub_categories::Entity::find_by_id(sub_category_id)
        .one(conn)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("Sub-category not found".to_string()))
}
