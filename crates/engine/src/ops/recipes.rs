use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
    TransactionTrait, prelude::*,
};

use crate::{
    Actor, ApprovalStatus, Author, EngineError, FileOwner, Instruction, NamedRef, NewRecipe,
    OwnerKind, Page, PageRequest, Recipe, RecipeIngredient, RecipeSource, RecipeSummary,
    ResultEngine, categories, ingredients, recipe_ingredients,
    recipe_instructions, recipe_keywords, recipes, sub_categories, users,
    util::{Checks, normalize_display, normalize_key},
};

use super::{
    Engine, categories::require_category, files, sub_categories::require_sub_category, with_tx,
};

const RECIPE_NOT_FOUND: &str = "Recipe not found";
const TITLE_TAKEN: &str = "Recipe with this title already exists";

/// Validated creation input.
struct RecipeDraft {
    category_id: i32,
    sub_category_id: i32,
    title: String,
    title_norm: String,
    description: String,
    prep_time: i32,
    cook_time: i32,
    servings: i32,
    ingredients: Vec<(i32, Option<String>, Option<String>)>,
    instructions: Vec<String>,
    keywords: Vec<String>,
}

fn validate(input: NewRecipe) -> ResultEngine<RecipeDraft> {
    let mut checks = Checks::new();
    let category_id = checks.id("categoryId", input.category_id);
    let sub_category_id = checks.id("subCategoryId", input.sub_category_id);
    let title = checks.text("title", &input.title);
    let description = checks.text("description", &input.description);
    let prep_time = checks.non_negative("prepTime", input.prep_time);
    let cook_time = checks.non_negative("cookTime", input.cook_time);
    let servings = checks.positive("servings", input.servings);

    let instructions: Vec<String> = input
        .instructions
        .iter()
        .filter_map(|step| normalize_display(step))
        .collect();
    if instructions.is_empty() {
        checks.fail("instructions", "at least one instruction is required");
    } else if instructions.len() != input.instructions.len() {
        checks.fail("instructions", "instructions must not be blank");
    }

    if input.ingredients.is_empty() {
        checks.fail("ingredients", "at least one ingredient is required");
    }
    let mut seen = HashSet::new();
    let mut ingredients = Vec::with_capacity(input.ingredients.len());
    for line in input.ingredients {
        if !seen.insert(line.ingredient_id) {
            checks.fail(
                "ingredients",
                format!("ingredient {} is listed twice", line.ingredient_id),
            );
            continue;
        }
        ingredients.push((
            line.ingredient_id,
            line.quantity.as_deref().and_then(normalize_display),
            line.unit.as_deref().and_then(normalize_display),
        ));
    }
    checks.finish()?;

    let mut keyword_keys = HashSet::new();
    let keywords = input
        .keywords
        .iter()
        .filter_map(|keyword| normalize_display(keyword))
        .filter(|keyword| keyword_keys.insert(normalize_key(keyword)))
        .collect();

    Ok(RecipeDraft {
        category_id,
        sub_category_id,
        title_norm: normalize_key(&title),
        title,
        description,
        prep_time,
        cook_time,
        servings,
        ingredients,
        instructions,
        keywords,
    })
}

impl Engine {
    /// Create a recipe with its instructions, ingredient lines, keywords and
    /// image.
    ///
    /// References are checked in a fixed order (category, sub-category,
    /// ingredients, title) so the first failing one decides the error. All
    /// rows are then written in one transaction: either the whole recipe
    /// exists afterwards or nothing does.
    pub async fn create_recipe(
        &self,
        author_id: i32,
        source: RecipeSource,
        mut input: NewRecipe,
    ) -> ResultEngine<Recipe> {
        let image_uri = input.image.take();
        let draft = validate(input)?;
        let image = files::parse_image(image_uri.as_deref())?;

        require_category(&self.database, draft.category_id).await?;
        let sub_category = require_sub_category(&self.database, draft.sub_category_id).await?;
        if sub_category.category_id != draft.category_id {
            return Err(EngineError::InvalidInput(
                "Sub-category does not belong to the selected category".to_string(),
            ));
        }

        let wanted: Vec<i32> = draft.ingredients.iter().map(|(id, _, _)| *id).collect();
        let found: HashSet<i32> = ingredients::Entity::find()
            .filter(ingredients::Column::Id.is_in(wanted.clone()))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|ingredient| ingredient.id)
            .collect();
        if let Some(missing) = wanted.iter().find(|id| !found.contains(id)) {
            return Err(EngineError::KeyNotFound(format!(
                "Ingredient not found: {missing}"
            )));
        }

        if recipes::Entity::find()
            .filter(recipes::Column::TitleNorm.eq(draft.title_norm.clone()))
            .one(&self.database)
            .await?
            .is_some()
        {
            return Err(EngineError::ExistingKey(TITLE_TAKEN.to_string()));
        }

        let (status, public_approved) = source.initial_state();
        let recipe_id = with_tx!(self, |db_tx| {
            let now = Utc::now();
            let recipe = recipes::ActiveModel {
                id: ActiveValue::NotSet,
                user_id: ActiveValue::Set(author_id),
                category_id: ActiveValue::Set(draft.category_id),
                sub_category_id: ActiveValue::Set(draft.sub_category_id),
                title: ActiveValue::Set(draft.title),
                title_norm: ActiveValue::Set(draft.title_norm),
                description: ActiveValue::Set(draft.description),
                prep_time: ActiveValue::Set(draft.prep_time),
                cook_time: ActiveValue::Set(draft.cook_time),
                servings: ActiveValue::Set(draft.servings),
                instruction_ids: ActiveValue::Set(serde_json::json!([])),
                admin_approved_status: ActiveValue::Set(status),
                public_approved: ActiveValue::Set(public_approved),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await
            .map_err(EngineError::on_conflict(TITLE_TAKEN))?;

            let mut instruction_ids = Vec::with_capacity(draft.instructions.len());
            for (position, body) in (1..).zip(draft.instructions) {
                let step = recipe_instructions::ActiveModel {
                    id: ActiveValue::NotSet,
                    recipe_id: ActiveValue::Set(recipe.id),
                    position: ActiveValue::Set(position),
                    body: ActiveValue::Set(body),
                }
                .insert(&db_tx)
                .await?;
                instruction_ids.push(step.id);
            }

            let recipe_id = recipe.id;
            let mut active: recipes::ActiveModel = recipe.into();
            active.instruction_ids = ActiveValue::Set(serde_json::json!(instruction_ids));
            active.update(&db_tx).await?;

            for (ingredient_id, quantity, unit) in draft.ingredients {
                recipe_ingredients::ActiveModel {
                    recipe_id: ActiveValue::Set(recipe_id),
                    ingredient_id: ActiveValue::Set(ingredient_id),
                    quantity: ActiveValue::Set(quantity),
                    unit: ActiveValue::Set(unit),
                }
                .insert(&db_tx)
                .await?;
            }

            for keyword in draft.keywords {
                recipe_keywords::ActiveModel {
                    id: ActiveValue::NotSet,
                    recipe_id: ActiveValue::Set(recipe_id),
                    keyword: ActiveValue::Set(keyword),
                }
                .insert(&db_tx)
                .await?;
            }

            if let Some(image) = &image {
                files::put_image(&db_tx, FileOwner::recipe(recipe_id), image).await?;
            }
            Ok::<_, EngineError>(recipe_id)
        })?;

        tracing::info!(recipe_id, ?source, "recipe created");
        self.load_recipe(self.require_recipe(recipe_id).await?).await
    }

    /// A single recipe. Unpublished recipes are only visible to their author
    /// and to admins; everyone else gets "not found".
    pub async fn recipe(&self, recipe_id: i32, viewer: Option<&Actor>) -> ResultEngine<Recipe> {
        let model = self.require_recipe(recipe_id).await?;
        let visible = model.is_published()
            || viewer.is_some_and(|actor| actor.is_admin() || actor.user_id == model.user_id);
        if !visible {
            return Err(EngineError::KeyNotFound(RECIPE_NOT_FOUND.to_string()));
        }
        self.load_recipe(model).await
    }

    /// Recipes authored by `user_id`, newest first, whatever their status.
    pub async fn list_user_recipes(
        &self,
        user_id: i32,
        request: PageRequest,
    ) -> ResultEngine<Page<RecipeSummary>> {
        let query = recipes::Entity::find()
            .filter(recipes::Column::UserId.eq(user_id))
            .order_by_desc(recipes::Column::CreatedAt)
            .order_by_desc(recipes::Column::Id);
        self.summary_page(query, request).await
    }

    /// Moderation queue: every recipe, optionally by status, newest first.
    pub async fn list_recipes_for_admin(
        &self,
        status: Option<ApprovalStatus>,
        request: PageRequest,
    ) -> ResultEngine<Page<RecipeSummary>> {
        let mut query = recipes::Entity::find();
        if let Some(status) = status {
            query = query.filter(recipes::Column::AdminApprovedStatus.eq(status));
        }
        let query = query
            .order_by_desc(recipes::Column::CreatedAt)
            .order_by_desc(recipes::Column::Id);
        self.summary_page(query, request).await
    }

    /// Set the moderation status. Leaving `approved` also withdraws the
    /// recipe from the public site.
    pub async fn set_recipe_status(
        &self,
        recipe_id: i32,
        status: ApprovalStatus,
    ) -> ResultEngine<Recipe> {
        let model = self.require_recipe(recipe_id).await?;
        let mut active: recipes::ActiveModel = model.into();
        active.admin_approved_status = ActiveValue::Set(status);
        if status != ApprovalStatus::Approved {
            active.public_approved = ActiveValue::Set(false);
        }
        active.updated_at = ActiveValue::Set(Utc::now());
        let model = active.update(&self.database).await?;
        self.load_recipe(model).await
    }

    /// Toggle public visibility. Only approved recipes can go public.
    pub async fn set_recipe_public(
        &self,
        recipe_id: i32,
        public_approved: bool,
    ) -> ResultEngine<Recipe> {
        let model = self.require_recipe(recipe_id).await?;
        if public_approved && model.admin_approved_status != ApprovalStatus::Approved {
            return Err(EngineError::InvalidInput(
                "Recipe must be approved before it can be public".to_string(),
            ));
        }
        let mut active: recipes::ActiveModel = model.into();
        active.public_approved = ActiveValue::Set(public_approved);
        active.updated_at = ActiveValue::Set(Utc::now());
        let model = active.update(&self.database).await?;
        self.load_recipe(model).await
    }

    /// Delete a recipe and everything attached to it. Authors may delete
    /// their own recipes, admins any.
    pub async fn delete_recipe(&self, actor: &Actor, recipe_id: i32) -> ResultEngine<()> {
        let model = self.require_recipe(recipe_id).await?;
        if !actor.is_admin() && actor.user_id != model.user_id {
            return Err(EngineError::Forbidden(
                "You can only delete your own recipes".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            delete_recipe_rows(&db_tx, recipe_id).await?;
            Ok(())
        })
    }

    pub(super) async fn require_recipe(&self, recipe_id: i32) -> ResultEngine<recipes::Model> {
        recipes::Entity::find_by_id(recipe_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(RECIPE_NOT_FOUND.to_string()))
    }

    /// Join a recipe row with its author, categories, steps, ingredients,
    /// keywords and image.
    async fn load_recipe(&self, model: recipes::Model) -> ResultEngine<Recipe> {
        let db = &self.database;
        let category = require_category(db, model.category_id).await?;
        let sub_category = require_sub_category(db, model.sub_category_id).await?;
        let author = users::Entity::find_by_id(model.user_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("User not found".to_string()))?;
        let avatar = files::image_for(db, FileOwner::user(author.id)).await?;
        let image = files::image_for(db, FileOwner::recipe(model.id)).await?;

        let steps = recipe_instructions::Entity::find()
            .filter(recipe_instructions::Column::RecipeId.eq(model.id))
            .order_by_asc(recipe_instructions::Column::Position)
            .all(db)
            .await?;
        let instructions = order_instructions(&model.instruction_order(), steps);

        let ingredients = recipe_ingredients::Entity::find()
            .filter(recipe_ingredients::Column::RecipeId.eq(model.id))
            .find_also_related(ingredients::Entity)
            .order_by_asc(recipe_ingredients::Column::IngredientId)
            .all(db)
            .await?
            .into_iter()
            .map(|(line, ingredient)| RecipeIngredient {
                ingredient_id: line.ingredient_id,
                name: ingredient.map(|i| i.name).unwrap_or_default(),
                quantity: line.quantity,
                unit: line.unit,
            })
            .collect();

        let mut keywords = load_keywords(db, &[model.id]).await?;

        Ok(Recipe {
            id: model.id,
            author: Author {
                id: author.id,
                name: author.name,
                avatar,
            },
            category: NamedRef {
                id: category.id,
                name: category.name,
            },
            sub_category: NamedRef {
                id: sub_category.id,
                name: sub_category.name,
            },
            title: model.title,
            description: model.description,
            prep_time: model.prep_time,
            cook_time: model.cook_time,
            servings: model.servings,
            ingredients,
            instructions,
            keywords: keywords.remove(&model.id).unwrap_or_default(),
            status: model.admin_approved_status,
            public_approved: model.public_approved,
            image,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }

    /// Count and fetch one page of `query`, then summarize the rows.
    pub(super) async fn summary_page(
        &self,
        query: Select<recipes::Entity>,
        request: PageRequest,
    ) -> ResultEngine<Page<RecipeSummary>> {
        let total = query.clone().count(&self.database).await?;
        let models = query
            .offset(request.offset())
            .limit(request.limit)
            .all(&self.database)
            .await?;
        let items = self.summarize(models).await?;
        Ok(Page::new(items, request, total))
    }

    /// Batch-load everything a listing row shows, one query per table.
    pub(super) async fn summarize(
        &self,
        models: Vec<recipes::Model>,
    ) -> ResultEngine<Vec<RecipeSummary>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let db = &self.database;
        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let category_ids = unique(models.iter().map(|m| m.category_id));
        let sub_category_ids = unique(models.iter().map(|m| m.sub_category_id));
        let user_ids = unique(models.iter().map(|m| m.user_id));

        let category_names: HashMap<i32, String> = categories::Entity::find()
            .filter(categories::Column::Id.is_in(category_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();
        let sub_category_names: HashMap<i32, String> = sub_categories::Entity::find()
            .filter(sub_categories::Column::Id.is_in(sub_category_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect();
        let author_names: HashMap<i32, String> = users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids.clone()))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect();
        let avatars = files::images_for(db, OwnerKind::User, &user_ids).await?;
        let mut images = files::images_for(db, OwnerKind::Recipe, &ids).await?;
        let mut keywords = load_keywords(db, &ids).await?;

        Ok(models
            .into_iter()
            .map(|model| RecipeSummary {
                id: model.id,
                title: model.title,
                description: model.description,
                prep_time: model.prep_time,
                cook_time: model.cook_time,
                servings: model.servings,
                category: NamedRef {
                    id: model.category_id,
                    name: category_names
                        .get(&model.category_id)
                        .cloned()
                        .unwrap_or_default(),
                },
                sub_category: NamedRef {
                    id: model.sub_category_id,
                    name: sub_category_names
                        .get(&model.sub_category_id)
                        .cloned()
                        .unwrap_or_default(),
                },
                keywords: keywords.remove(&model.id).unwrap_or_default(),
                author: Author {
                    id: model.user_id,
                    name: author_names.get(&model.user_id).cloned().unwrap_or_default(),
                    avatar: avatars.get(&model.user_id).cloned(),
                },
                status: model.admin_approved_status,
                public_approved: model.public_approved,
                image: images.remove(&model.id),
                created_at: model.created_at,
            })
            .collect())
    }
}

/// Remove a recipe and its child rows. Runs inside the caller's transaction.
pub(super) async fn delete_recipe_rows<C: ConnectionTrait>(
    conn: &C,
    recipe_id: i32,
) -> ResultEngine<()> {
    recipe_instructions::Entity::delete_many()
        .filter(recipe_instructions::Column::RecipeId.eq(recipe_id))
        .exec(conn)
        .await?;
    recipe_keywords::Entity::delete_many()
        .filter(recipe_keywords::Column::RecipeId.eq(recipe_id))
        .exec(conn)
        .await?;
    recipe_ingredients::Entity::delete_many()
        .filter(recipe_ingredients::Column::RecipeId.eq(recipe_id))
        .exec(conn)
        .await?;
    files::delete_image(conn, FileOwner::recipe(recipe_id)).await?;
    recipes::Entity::delete_by_id(recipe_id).exec(conn).await?;
    Ok(())
}

async fn load_keywords<C: ConnectionTrait>(
    conn: &C,
    recipe_ids: &[i32],
) -> ResultEngine<HashMap<i32, Vec<String>>> {
    let mut out: HashMap<i32, Vec<String>> = HashMap::new();
    if recipe_ids.is_empty() {
        return Ok(out);
    }
    let rows = recipe_keywords::Entity::find()
        .filter(recipe_keywords::Column::RecipeId.is_in(recipe_ids.to_vec()))
        .order_by_asc(recipe_keywords::Column::Id)
        .all(conn)
        .await?;
    for row in rows {
        out.entry(row.recipe_id).or_default().push(row.keyword);
    }
    Ok(out)
}

/// Steps in the order recorded on the recipe; rows missing from that list
/// follow by position.
fn order_instructions(order: &[i32], steps: Vec<recipe_instructions::Model>) -> Vec<Instruction> {
    let mut by_id: HashMap<i32, recipe_instructions::Model> =
        steps.into_iter().map(|step| (step.id, step)).collect();
    let mut ordered: Vec<recipe_instructions::Model> =
        order.iter().filter_map(|id| by_id.remove(id)).collect();
    let mut rest: Vec<_> = by_id.into_values().collect();
    rest.sort_by_key(|step| (step.position, step.id));
    ordered.extend(rest);

    ordered
        .into_iter()
        .map(|step| Instruction {
            id: step.id,
            position: step.position,
            body: step.body,
        })
        .collect()
}

fn unique(ids: impl Iterator<Item = i32>) -> Vec<i32> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NewRecipeIngredient;

    fn step(id: i32, position: i32) -> recipe_instructions::Model {
        recipe_instructions::Model {
            id,
            recipe_id: 1,
            position,
            body: format!("step {id}"),
        }
    }

    fn input() -> NewRecipe {
        NewRecipe {
            category_id: Some(1),
            sub_category_id: Some(2),
            title: "  Lemon   Cake ".to_string(),
            description: "Zesty".to_string(),
            prep_time: Some(15),
            cook_time: Some(40),
            servings: Some(8),
            ingredients: vec![NewRecipeIngredient {
                ingredient_id: 3,
                quantity: Some(" 200 ".to_string()),
                unit: Some("g".to_string()),
            }],
            instructions: vec!["Mix".to_string(), "Bake".to_string()],
            keywords: vec!["Citrus".to_string(), "citrus".to_string(), " ".to_string()],
            image: None,
        }
    }

    #[test]
    fn instructions_follow_recorded_order() {
        let ordered = order_instructions(&[12, 10], vec![step(10, 1), step(11, 3), step(12, 2)]);
        let ids: Vec<i32> = ordered.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![12, 10, 11]);
    }

    #[test]
    fn validate_normalizes_fields() {
        let draft = validate(input()).unwrap();
        assert_eq!(draft.title, "Lemon Cake");
        assert_eq!(draft.title_norm, "lemon cake");
        assert_eq!(draft.keywords, vec!["Citrus".to_string()]);
        assert_eq!(draft.ingredients[0].1.as_deref(), Some("200"));
    }

    #[test]
    fn validate_reports_missing_fields() {
        let Err(EngineError::Validation(errors)) = validate(NewRecipe::default()) else {
            panic!("expected validation error");
        };
        let fields: HashSet<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        for field in [
            "categoryId",
            "subCategoryId",
            "title",
            "description",
            "prepTime",
            "cookTime",
            "servings",
            "instructions",
            "ingredients",
        ] {
            assert!(fields.contains(field), "missing error for {field}");
        }
    }

    #[test]
    fn validate_rejects_duplicate_ingredients() {
        let mut recipe = input();
        recipe.ingredients.push(NewRecipeIngredient {
            ingredient_id: 3,
            quantity: None,
            unit: None,
        });
        assert!(matches!(validate(recipe), Err(EngineError::Validation(_))));
    }
}
