use chrono::{Duration, Utc};
use sea_orm::{
    ActiveValue, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};

use crate::{
    Actor, EngineError, FileOwner, OwnerKind, Page, PageRequest, ResultEngine, Role, User,
    passwords::{generate_otp, hash_password, verify_password},
    recipes, users,
    util::{Checks, normalize_email},
};

use super::{Engine, files, recipes::delete_recipe_rows, with_tx};

/// Lifetime of a password-reset code.
const OTP_TTL_MINUTES: i64 = 10;

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const INVALID_OTP: &str = "Invalid or expired OTP";

impl Engine {
    /// Create a member account.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> ResultEngine<User> {
        let mut checks = Checks::new();
        let name = checks.text("name", name);
        let email = checks.email(email);
        checks.password("password", password);
        checks.finish()?;

        self.insert_user(&name, &email, password, Role::User, false)
            .await
    }

    async fn insert_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
        is_verified: bool,
    ) -> ResultEngine<User> {
        if self.find_user_by_email(email).await?.is_some() {
            return Err(EngineError::ExistingKey("User already exists".to_string()));
        }

        let now = Utc::now();
        let model = users::ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(name.to_string()),
            email: ActiveValue::Set(email.to_string()),
            password_hash: ActiveValue::Set(hash_password(password)?),
            role: ActiveValue::Set(role),
            is_verified: ActiveValue::Set(is_verified),
            otp_code: ActiveValue::Set(None),
            otp_expires_at: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(&self.database)
        .await
        .map_err(EngineError::on_conflict("User already exists"))?;

        Ok(User::from_model(model, None))
    }

    /// Check credentials. Unknown e-mail and wrong password are
    /// indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> ResultEngine<User> {
        let email = normalize_email(email);
        let Some(model) = self.find_user_by_email(&email).await? else {
            return Err(EngineError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };
        if !verify_password(password, &model.password_hash) {
            return Err(EngineError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let avatar = files::image_for(&self.database, FileOwner::user(model.id)).await?;
        Ok(User::from_model(model, avatar))
    }

    pub async fn user(&self, user_id: i32) -> ResultEngine<User> {
        let model = self.require_user(user_id).await?;
        let avatar = files::image_for(&self.database, FileOwner::user(model.id)).await?;
        Ok(User::from_model(model, avatar))
    }

    pub async fn list_users(&self, request: PageRequest) -> ResultEngine<Page<User>> {
        let query = users::Entity::find().order_by_asc(users::Column::Id);
        let total = query.clone().count(&self.database).await?;
        let models = query
            .offset(request.offset())
            .limit(request.limit)
            .all(&self.database)
            .await?;

        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let mut avatars = files::images_for(&self.database, OwnerKind::User, &ids).await?;
        let items = models
            .into_iter()
            .map(|model| {
                let avatar = avatars.remove(&model.id);
                User::from_model(model, avatar)
            })
            .collect();
        Ok(Page::new(items, request, total))
    }

    /// Change name and/or avatar of an account.
    pub async fn update_profile(
        &self,
        user_id: i32,
        name: Option<&str>,
        avatar: Option<&str>,
    ) -> ResultEngine<User> {
        let mut checks = Checks::new();
        let name = checks.optional_text("name", name);
        checks.finish()?;
        let avatar = files::parse_image(avatar)?;

        let model = self.require_user(user_id).await?;
        with_tx!(self, |db_tx| {
            if let Some(name) = name {
                let mut active: users::ActiveModel = model.into();
                active.name = ActiveValue::Set(name);
                active.updated_at = ActiveValue::Set(Utc::now());
                active.update(&db_tx).await?;
            }
            if let Some(image) = &avatar {
                files::put_image(&db_tx, FileOwner::user(user_id), image).await?;
            }
            Ok::<_, EngineError>(())
        })?;

        self.user(user_id).await
    }

    pub async fn set_role(&self, actor: &Actor, user_id: i32, role: Role) -> ResultEngine<User> {
        if actor.user_id == user_id && role != actor.role {
            return Err(EngineError::Forbidden(
                "Admins cannot change their own role".to_string(),
            ));
        }
        let model = self.require_user(user_id).await?;
        let mut active: users::ActiveModel = model.into();
        active.role = ActiveValue::Set(role);
        active.updated_at = ActiveValue::Set(Utc::now());
        active.update(&self.database).await?;

        self.user(user_id).await
    }

    /// Remove an account together with its recipes and images.
    pub async fn delete_user(&self, actor: &Actor, user_id: i32) -> ResultEngine<()> {
        if actor.user_id == user_id {
            return Err(EngineError::Forbidden(
                "Admins cannot delete their own account".to_string(),
            ));
        }
        self.require_user(user_id).await?;

        with_tx!(self, |db_tx| {
            let recipe_ids: Vec<i32> = recipes::Entity::find()
                .filter(recipes::Column::UserId.eq(user_id))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|recipe| recipe.id)
                .collect();
            for recipe_id in recipe_ids {
                delete_recipe_rows(&db_tx, recipe_id).await?;
            }
            files::delete_image(&db_tx, FileOwner::user(user_id)).await?;
            users::Entity::delete_by_id(user_id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// Make sure an admin account with `email` exists. Promotes an existing
    /// member account instead of failing.
    pub async fn ensure_admin(&self, email: &str, name: &str, password: &str) -> ResultEngine<User> {
        let mut checks = Checks::new();
        let email = checks.email(email);
        let name = checks.text("name", name);
        checks.password("password", password);
        checks.finish()?;

        match self.find_user_by_email(&email).await? {
            Some(model) if model.role == Role::Admin => Ok(User::from_model(model, None)),
            Some(model) => {
                let id = model.id;
                let mut active: users::ActiveModel = model.into();
                active.role = ActiveValue::Set(Role::Admin);
                active.updated_at = ActiveValue::Set(Utc::now());
                active.update(&self.database).await?;
                self.user(id).await
            }
            None => {
                self.insert_user(&name, &email, password, Role::Admin, true)
                    .await
            }
        }
    }

    /// Issue a reset code for `email`. Unknown addresses succeed silently so
    /// the endpoint does not reveal which accounts exist.
    pub async fn request_password_reset(&self, email: &str) -> ResultEngine<()> {
        let email = normalize_email(email);
        let Some(model) = self.find_user_by_email(&email).await? else {
            tracing::debug!("password reset requested for unknown address");
            return Ok(());
        };

        let code = generate_otp();
        let mut active: users::ActiveModel = model.into();
        active.otp_code = ActiveValue::Set(Some(code.clone()));
        active.otp_expires_at = ActiveValue::Set(Some(Utc::now() + Duration::minutes(OTP_TTL_MINUTES)));
        active.updated_at = ActiveValue::Set(Utc::now());
        active.update(&self.database).await?;

        self.notifier.deliver(&email, &code);
        Ok(())
    }

    /// Confirm ownership of the address with a code; marks it verified.
    pub async fn verify_otp(&self, email: &str, code: &str) -> ResultEngine<()> {
        let model = self.require_valid_otp(email, code).await?;
        let mut active: users::ActiveModel = model.into();
        active.is_verified = ActiveValue::Set(true);
        active.updated_at = ActiveValue::Set(Utc::now());
        active.update(&self.database).await?;
        Ok(())
    }

    /// Replace the password using a valid code. The code is single use.
    pub async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> ResultEngine<()> {
        let mut checks = Checks::new();
        checks.password("newPassword", new_password);
        checks.finish()?;

        let model = self.require_valid_otp(email, code).await?;
        let mut active: users::ActiveModel = model.into();
        active.password_hash = ActiveValue::Set(hash_password(new_password)?);
        active.otp_code = ActiveValue::Set(None);
        active.otp_expires_at = ActiveValue::Set(None);
        active.is_verified = ActiveValue::Set(true);
        active.updated_at = ActiveValue::Set(Utc::now());
        active.update(&self.database).await?;
        Ok(())
    }

    /// Operator path used by the admin CLI; no acting user involved.
    pub async fn assign_role(&self, email: &str, role: Role) -> ResultEngine<User> {
        let model = self
            .find_user_by_email(&normalize_email(email))
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("User not found".to_string()))?;
        let id = model.id;
        let mut active: users::ActiveModel = model.into();
        active.role = ActiveValue::Set(role);
        active.updated_at = ActiveValue::Set(Utc::now());
        active.update(&self.database).await?;
        tracing::info!(user_id = id, role = role.as_str(), "role assigned");

        self.user(id).await
    }

    async fn require_valid_otp(&self, email: &str, code: &str) -> ResultEngine<users::Model> {
        let email = normalize_email(email);
        let invalid = || EngineError::InvalidInput(INVALID_OTP.to_string());
        let model = self.find_user_by_email(&email).await?.ok_or_else(invalid)?;

        let matches = model.otp_code.as_deref() == Some(code.trim());
        let fresh = model.otp_expires_at.is_some_and(|expires| expires > Utc::now());
        if !(matches && fresh) {
            return Err(invalid());
        }
        Ok(model)
    }

    async fn find_user_by_email(&self, email: &str) -> ResultEngine<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?)
    }

    pub(super) async fn require_user(&self, user_id: i32) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("User not found".to_string()))
    }
}
