use chrono::Utc;
use sea_orm::{
    ActiveValue, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, prelude::*,
    sea_query::{Expr, Func, LikeExpr},
};

use crate::{
    EngineError, Ingredient, Page, PageRequest, ResultEngine, ingredients, recipe_ingredients,
    util::{Checks, like_pattern, normalize_key},
};

use super::Engine;

const INGREDIENT_EXISTS: &str = "Ingredient already exists";

impl Engine {
    /// Ingredients ordered by name, optionally filtered by a substring.
    pub async fn list_ingredients(
        &self,
        text: Option<&str>,
        request: PageRequest,
    ) -> ResultEngine<Page<Ingredient>> {
        let mut query = ingredients::Entity::find();
        if let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) {
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(ingredients::Column::Name)))
                    .like(LikeExpr::new(like_pattern(text)).escape('\\')),
            );
        }
        let query = query
            .order_by_asc(ingredients::Column::NameNorm)
            .order_by_asc(ingredients::Column::Id);

        let total = query.clone().count(&self.database).await?;
        let items = query
            .offset(request.offset())
            .limit(request.limit)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Ingredient::from)
            .collect();
        Ok(Page::new(items, request, total))
    }

    pub async fn ingredient(&self, ingredient_id: i32) -> ResultEngine<Ingredient> {
        Ok(self.require_ingredient(ingredient_id).await?.into())
    }

    pub async fn create_ingredient(&self, name: &str) -> ResultEngine<Ingredient> {
        let mut checks = Checks::new();
        let name = checks.text("name", name);
        checks.finish()?;

        let name_norm = normalize_key(&name);
        self.ensure_ingredient_name_free(&name_norm, None).await?;

        let model = ingredients::ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(name),
            name_norm: ActiveValue::Set(name_norm),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(&self.database)
        .await
        .map_err(EngineError::on_conflict(INGREDIENT_EXISTS))?;
        Ok(model.into())
    }

    pub async fn update_ingredient(&self, ingredient_id: i32, name: &str) -> ResultEngine<Ingredient> {
        let mut checks = Checks::new();
        let name = checks.text("name", name);
        checks.finish()?;

        let model = self.require_ingredient(ingredient_id).await?;
        let name_norm = normalize_key(&name);
        self.ensure_ingredient_name_free(&name_norm, Some(ingredient_id))
            .await?;

        let mut active: ingredients::ActiveModel = model.into();
        active.name = ActiveValue::Set(name);
        active.name_norm = ActiveValue::Set(name_norm);
        let model = active
            .update(&self.database)
            .await
            .map_err(EngineError::on_conflict(INGREDIENT_EXISTS))?;
        Ok(model.into())
    }

    /// Delete an ingredient. Refused while a recipe lists it.
    pub async fn delete_ingredient(&self, ingredient_id: i32) -> ResultEngine<()> {
        self.require_ingredient(ingredient_id).await?;
        let in_use = recipe_ingredients::Entity::find()
            .filter(recipe_ingredients::Column::IngredientId.eq(ingredient_id))
            .count(&self.database)
            .await?;
        if in_use > 0 {
            return Err(EngineError::ExistingKey(
                "Ingredient is in use by recipes".to_string(),
            ));
        }
        ingredients::Entity::delete_by_id(ingredient_id)
            .exec(&self.database)
            .await?;
        Ok(())
    }

    async fn require_ingredient(&self, ingredient_id: i32) -> ResultEngine<ingredients::Model> {
        ingredients::Entity::find_by_id(ingredient_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("Ingredient not found".to_string()))
    }

    async fn ensure_ingredient_name_free(
        &self,
        name_norm: &str,
        except: Option<i32>,
    ) -> ResultEngine<()> {
        let mut query =
            ingredients::Entity::find().filter(ingredients::Column::NameNorm.eq(name_norm));
        if let Some(id) = except {
            query = query.filter(ingredients::Column::Id.ne(id));
        }
        if query.one(&self.database).await?.is_some() {
            return Err(EngineError::ExistingKey(INGREDIENT_EXISTS.to_string()));
        }
        Ok(())
    }
}
