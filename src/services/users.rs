//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    context::RequestContext,
    error::{reference_must_exist, AppError, AppResult},
    models::{
        asset::AssetView,
        user::{
            CreateUser, UpdateProfile, UpdateUser, User, UserAssetSummary, UserClaims, UserDetails,
            UserQuery, UserShort,
        },
    },
    repository::Repository,
};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate by username and password, returning a JWT and the user
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_username(username.trim())
            .await?
            .ok_or_else(|| AppError::Authentication(INVALID_CREDENTIALS.to_string()))?;

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        }
        if !user.is_active {
            return Err(AppError::Authentication("Account is disabled".to_string()));
        }

        self.repository.users.stamp_login(user.id).await?;
        let token = self.create_token_for_user(&user)?;

        tracing::info!(user_id = user.id, username = %user.username, "User logged in");
        Ok((token, user))
    }

    pub async fn logout(&self, ctx: &RequestContext) -> AppResult<()> {
        self.repository.users.stamp_logout(ctx.user_id).await?;
        tracing::info!(user_id = ctx.user_id, "User logged out");
        Ok(())
    }

    fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            is_staff: user.is_staff,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Create the configured staff account when no user exists yet.
    ///
    /// Returns true if an account was created.
    pub async fn ensure_bootstrap_admin(&self) -> AppResult<bool> {
        let Some(password) = self.config.bootstrap_admin_password.clone() else {
            return Ok(false);
        };
        if self.repository.users.count().await? > 0 {
            return Ok(false);
        }

        let admin = CreateUser {
            username: self.config.bootstrap_admin_username.clone(),
            password,
            id_number: "ADMIN-0001".to_string(),
            full_name: "Administrator".to_string(),
            email: None,
            department: String::new(),
            designation: String::new(),
            location_id: None,
            shift: String::new(),
            is_staff: true,
            certification_ids: Vec::new(),
        };
        admin.validate()?;

        let hash = self.hash_password(&admin.password)?;
        let mut conn = self.repository.pool.acquire().await?;
        let user = self.repository.users.create(&mut conn, &admin, &hash).await?;
        tracing::info!(username = %user.username, "Created bootstrap staff account");
        Ok(true)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// User with location name and certifications
    pub async fn get_details(&self, id: i32) -> AppResult<UserDetails> {
        let user = self.repository.users.get_by_id(id).await?;
        let location_name = self.repository.users.location_name(user.location_id).await?;
        let certifications = self.repository.users.certifications(user.id).await?;
        Ok(UserDetails {
            user,
            location_name,
            certifications,
        })
    }

    pub async fn search_users(&self, query: &UserQuery) -> AppResult<(Vec<UserShort>, i64)> {
        self.repository.users.search(query).await
    }

    async fn check_location_and_certifications(
        &self,
        location_id: Option<i32>,
        certification_ids: Option<&[i32]>,
    ) -> AppResult<()> {
        if let Some(id) = location_id {
            reference_must_exist(self.repository.reference.get_location(id).await, || {
                format!("Location {} does not exist", id)
            })?;
        }
        if let Some(ids) = certification_ids {
            let missing = self.repository.reference.missing_certifications(ids).await?;
            if !missing.is_empty() {
                let ids: Vec<String> = missing.iter().map(|id| id.to_string()).collect();
                return Err(AppError::Validation(format!(
                    "Unknown certification(s): {}",
                    ids.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Create a new user with its certifications
    pub async fn create_user(&self, data: CreateUser, ctx: &RequestContext) -> AppResult<UserDetails> {
        data.validate()?;

        if self.repository.users.username_exists(data.username.trim(), None).await? {
            return Err(AppError::Validation("A user with this username already exists.".to_string()));
        }
        if self.repository.users.id_number_exists(data.id_number.trim(), None).await? {
            return Err(AppError::Validation("A user with this ID number already exists.".to_string()));
        }
        self.check_location_and_certifications(data.location_id, Some(&data.certification_ids))
            .await?;

        let hash = self.hash_password(&data.password)?;

        let mut tx = self.repository.pool.begin().await?;
        let user = self
            .repository
            .users
            .create(&mut tx, &data, &hash)
            .await
            .map_err(|e| match e {
                AppError::Database(err) => {
                    AppError::on_unique_violation(err, "A user with this username or ID number already exists.")
                }
                other => other,
            })?;
        self.repository
            .users
            .set_certifications(&mut tx, user.id, &data.certification_ids)
            .await?;
        tx.commit().await?;

        tracing::info!(user_id = user.id, actor = ctx.user_id, "User created");
        self.get_details(user.id).await
    }

    /// Update an existing user
    pub async fn update_user(&self, id: i32, data: UpdateUser, ctx: &RequestContext) -> AppResult<UserDetails> {
        data.validate()?;
        self.repository.users.get_by_id(id).await?;

        if let Some(ref id_number) = data.id_number {
            if self.repository.users.id_number_exists(id_number.trim(), Some(id)).await? {
                return Err(AppError::Validation("A user with this ID number already exists.".to_string()));
            }
        }
        if id == ctx.user_id && (data.is_active == Some(false) || data.is_staff == Some(false)) {
            return Err(AppError::BusinessRule(
                "You cannot deactivate or demote your own account".to_string(),
            ));
        }
        self.check_location_and_certifications(data.location_id, data.certification_ids.as_deref())
            .await?;

        let password = match data.password {
            Some(ref password) => Some(self.hash_password(password)?),
            None => None,
        };

        let mut tx = self.repository.pool.begin().await?;
        self.repository.users.update(&mut tx, id, &data, password).await?;
        if let Some(ref ids) = data.certification_ids {
            self.repository.users.set_certifications(&mut tx, id, ids).await?;
        }
        tx.commit().await?;

        tracing::info!(user_id = id, actor = ctx.user_id, "User updated");
        self.get_details(id).await
    }

    /// Deactivate a user; accounts are never deleted
    pub async fn deactivate_user(&self, id: i32, ctx: &RequestContext) -> AppResult<User> {
        if id == ctx.user_id {
            return Err(AppError::BusinessRule(
                "You cannot deactivate your own account".to_string(),
            ));
        }
        let user = self.repository.users.deactivate(id).await?;
        tracing::info!(user_id = id, actor = ctx.user_id, "User deactivated");
        Ok(user)
    }

    /// Update the caller's own profile
    pub async fn update_profile(&self, ctx: &RequestContext, profile: UpdateProfile) -> AppResult<UserDetails> {
        profile.validate()?;
        let user = self.repository.users.get_by_id(ctx.user_id).await?;

        let password = match profile.new_password {
            Some(ref new_password) => {
                let current = profile.current_password.as_ref().ok_or_else(|| {
                    AppError::Validation("Current password required to change password".to_string())
                })?;
                if !self.verify_password(&user, current)? {
                    return Err(AppError::Authentication("Current password is incorrect".to_string()));
                }
                Some(self.hash_password(new_password)?)
            }
            None => None,
        };

        self.repository
            .users
            .update_profile(ctx.user_id, &profile, password)
            .await?;
        self.get_details(ctx.user_id).await
    }

    /// Assets assigned to the user
    pub async fn user_assets(&self, user_id: i32, ctx: &RequestContext) -> AppResult<Vec<AssetView>> {
        self.repository.users.get_by_id(user_id).await?;
        let listings = self.repository.assets.list_by_assignee(user_id).await?;
        Ok(listings
            .into_iter()
            .map(|listing| AssetView::new(listing, ctx.today))
            .collect())
    }

    pub async fn user_asset_summary(&self, user_id: i32, ctx: &RequestContext) -> AppResult<UserAssetSummary> {
        self.repository.users.get_by_id(user_id).await?;
        let listings = self.repository.assets.list_by_assignee(user_id).await?;
        Ok(UserAssetSummary::compute(
            listings.iter().map(|l| &l.asset),
            ctx.today,
        ))
    }
}
