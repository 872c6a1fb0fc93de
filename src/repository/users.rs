//! Users repository for database operations

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        reference::Certification,
        user::{CreateUser, UpdateProfile, UpdateUser, User, UserQuery, UserShort},
    },
};

use super::Page;

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    pub async fn find(&self, id: i32) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Get user by username, case-insensitive
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE LOWER(username) = LOWER($1)",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn location_name(&self, location_id: Option<i32>) -> AppResult<Option<String>> {
        let Some(id) = location_id else {
            return Ok(None);
        };
        let name = sqlx::query_scalar("SELECT name FROM locations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(name)
    }

    pub async fn certifications(&self, user_id: i32) -> AppResult<Vec<Certification>> {
        let rows = sqlx::query_as::<_, Certification>(
            r#"
            SELECT c.id, c.name
            FROM certifications c
            JOIN user_certifications uc ON uc.certification_id = c.id
            WHERE uc.user_id = $1
            ORDER BY c.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Check if username already exists
    pub async fn username_exists(&self, username: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER($1) AND id IS DISTINCT FROM $2)",
        )
        .bind(username)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn id_number_exists(&self, id_number: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id_number = $1 AND id IS DISTINCT FROM $2)",
        )
        .bind(id_number)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Search users with pagination
    pub async fn search(&self, query: &UserQuery) -> AppResult<(Vec<UserShort>, i64)> {
        let page = Page::new(query.page, query.per_page);

        let mut conditions = Vec::new();
        let mut idx = 1;

        if query.name.is_some() {
            conditions.push(format!(
                "(LOWER(u.username) LIKE ${0} OR LOWER(u.full_name) LIKE ${0})",
                idx
            ));
            idx += 1;
        }
        if query.department.is_some() {
            conditions.push(format!("LOWER(u.department) = LOWER(${})", idx));
            idx += 1;
        }
        if query.location.is_some() {
            conditions.push(format!("LOWER(l.name) = LOWER(${})", idx));
            idx += 1;
        }
        if query.on_duty.is_some() {
            conditions.push(format!("u.on_duty = ${}", idx));
            idx += 1;
        }
        if query.is_active.is_some() {
            conditions.push(format!("u.is_active = ${}", idx));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let name_pattern = query.name.as_ref().map(|n| format!("%{}%", n.to_lowercase()));

        macro_rules! bind_filters {
            ($builder:ident) => {
                if let Some(ref p) = name_pattern { $builder = $builder.bind(p); }
                if let Some(ref d) = query.department { $builder = $builder.bind(d); }
                if let Some(ref l) = query.location { $builder = $builder.bind(l); }
                if let Some(d) = query.on_duty { $builder = $builder.bind(d); }
                if let Some(a) = query.is_active { $builder = $builder.bind(a); }
            };
        }

        let count_q = format!(
            "SELECT COUNT(*) FROM users u LEFT JOIN locations l ON l.id = u.location_id {}",
            where_clause
        );
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_q);
        bind_filters!(count_builder);
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_q = format!(
            r#"
            SELECT u.id, u.username, u.full_name, u.department, u.designation,
                   l.name AS location_name, u.on_duty, u.is_active
            FROM users u
            LEFT JOIN locations l ON l.id = u.location_id
            {}
            ORDER BY u.full_name, u.username
            LIMIT {} OFFSET {}
            "#,
            where_clause,
            page.per_page,
            page.offset()
        );
        let mut builder = sqlx::query_as::<_, UserShort>(&select_q);
        bind_filters!(builder);
        let rows = builder.fetch_all(&self.pool).await?;

        Ok((rows, total))
    }

    /// Create a user; `password_hash` is already hashed
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        data: &CreateUser,
        password_hash: &str,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                username, password, id_number, full_name, email,
                department, designation, location_id, shift, is_staff
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(data.username.trim())
        .bind(password_hash)
        .bind(data.id_number.trim())
        .bind(data.full_name.trim())
        .bind(&data.email)
        .bind(&data.department)
        .bind(&data.designation)
        .bind(data.location_id)
        .bind(&data.shift)
        .bind(data.is_staff)
        .fetch_one(&mut *conn)
        .await?;
        Ok(user)
    }

    /// Update a user, only the fields present in `data`
    pub async fn update(
        &self,
        conn: &mut PgConnection,
        id: i32,
        data: &UpdateUser,
        password_hash: Option<String>,
    ) -> AppResult<User> {
        let mut sets = vec!["updated_at = NOW()".to_string()];
        let mut idx = 1;

        macro_rules! add_f {
            ($field:expr, $name:expr) => {
                if $field.is_some() { sets.push(format!("{} = ${}", $name, idx)); idx += 1; }
            };
        }

        add_f!(data.id_number, "id_number");
        add_f!(data.full_name, "full_name");
        add_f!(data.email, "email");
        add_f!(data.department, "department");
        add_f!(data.designation, "designation");
        add_f!(data.location_id, "location_id");
        add_f!(data.shift, "shift");
        add_f!(data.on_duty, "on_duty");
        add_f!(data.is_active, "is_active");
        add_f!(data.is_staff, "is_staff");
        add_f!(password_hash, "password");

        let query = format!(
            "UPDATE users SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            idx
        );
        let mut builder = sqlx::query_as::<_, User>(&query);

        macro_rules! bind_f {
            ($field:expr) => {
                if let Some(ref val) = $field { builder = builder.bind(val); }
            };
        }

        bind_f!(data.id_number);
        bind_f!(data.full_name);
        bind_f!(data.email);
        bind_f!(data.department);
        bind_f!(data.designation);
        bind_f!(data.location_id);
        bind_f!(data.shift);
        bind_f!(data.on_duty);
        bind_f!(data.is_active);
        bind_f!(data.is_staff);
        bind_f!(password_hash);

        builder
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Replace the user's certification set
    pub async fn set_certifications(
        &self,
        conn: &mut PgConnection,
        user_id: i32,
        certification_ids: &[i32],
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM user_certifications WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *conn)
            .await?;

        if !certification_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO user_certifications (user_id, certification_id)
                SELECT $1, UNNEST($2::int[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(certification_ids)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    /// Update the user's own profile
    pub async fn update_profile(
        &self,
        user_id: i32,
        profile: &UpdateProfile,
        password_hash: Option<String>,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                full_name = COALESCE($1, full_name),
                email = COALESCE($2, email),
                shift = COALESCE($3, shift),
                on_duty = COALESCE($4, on_duty),
                password = COALESCE($5, password),
                updated_at = NOW()
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&profile.full_name)
        .bind(&profile.email)
        .bind(&profile.shift)
        .bind(profile.on_duty)
        .bind(password_hash)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user_id)))?;
        Ok(user)
    }

    pub async fn stamp_login(&self, user_id: i32) -> AppResult<()> {
        sqlx::query("UPDATE users SET login_time = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Record the logout time and take the user off duty
    pub async fn stamp_logout(&self, user_id: i32) -> AppResult<()> {
        sqlx::query("UPDATE users SET logout_time = NOW(), on_duty = FALSE WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Users are never removed, only deactivated
    pub async fn deactivate(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET is_active = FALSE, on_duty = FALSE, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }
}
