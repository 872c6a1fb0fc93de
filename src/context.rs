//! Request context carrying the authenticated user and the request's calendar date.

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    error::{AppError, AppResult},
    models::user::User,
};

/// Context for the current authenticated request.
///
/// Built by the auth extractor from the stored account and passed into
/// service methods so that every write knows who is acting, and every date
/// rule compares against the same `today`.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user_id: i32,
    pub username: String,
    pub is_staff: bool,
    /// Current UTC date, the reference for due, overdue and warranty checks
    pub today: NaiveDate,
    /// When the request was received
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(user_id: i32, username: impl Into<String>, is_staff: bool) -> Self {
        let request_time = Utc::now();
        Self {
            user_id,
            username: username.into(),
            is_staff,
            today: request_time.date_naive(),
            request_time,
        }
    }

    /// Context for the stored account behind a token. Staff rights come from
    /// the row, so deactivation and demotion take effect before the token expires.
    pub fn for_user(user: &User) -> AppResult<Self> {
        if !user.is_active {
            return Err(AppError::Authentication("Account is disabled".to_string()));
        }
        Ok(Self::new(user.id, user.username.clone(), user.is_staff))
    }

    /// Pin the calendar date, used by tests and batch jobs
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn require_staff(&self) -> AppResult<()> {
        if self.is_staff {
            Ok(())
        } else {
            Err(AppError::Authorization("Staff privileges required".to_string()))
        }
    }

    /// Staff may act on anyone, other users only on themselves
    pub fn require_self_or_staff(&self, user_id: i32) -> AppResult<()> {
        if self.is_staff || self.user_id == user_id {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "You can only access your own account".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_checks() {
        let ctx = RequestContext::new(4, "tech", false);
        assert!(matches!(ctx.require_staff(), Err(AppError::Authorization(_))));
        assert!(ctx.require_self_or_staff(4).is_ok());
        assert!(ctx.require_self_or_staff(5).is_err());

        let admin = RequestContext::new(1, "admin", true);
        assert!(admin.require_staff().is_ok());
        assert!(admin.require_self_or_staff(5).is_ok());
    }

    fn account(is_active: bool, is_staff: bool) -> User {
        let now = Utc::now();
        User {
            id: 9,
            username: "jdoe".to_string(),
            password: String::new(),
            id_number: "EMP-009".to_string(),
            full_name: "Jane Doe".to_string(),
            email: None,
            department: "Facilities".to_string(),
            designation: "Technician".to_string(),
            location_id: None,
            shift: String::new(),
            on_duty: false,
            is_active,
            is_staff,
            login_time: None,
            logout_time: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_deactivated_account_rejected() {
        assert!(matches!(
            RequestContext::for_user(&account(false, true)),
            Err(AppError::Authentication(_))
        ));
    }

    #[test]
    fn test_staff_flag_taken_from_account() {
        // Token issued while staff, account demoted since
        let ctx = RequestContext::for_user(&account(true, false)).unwrap();
        assert_eq!(ctx.user_id, 9);
        assert!(!ctx.is_staff);
        assert!(ctx.require_staff().is_err());
    }

    #[test]
    fn test_today_follows_request_time() {
        let ctx = RequestContext::new(1, "admin", true);
        assert_eq!(ctx.today, ctx.request_time.date_naive());

        let pinned = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        assert_eq!(ctx.with_today(pinned).today, pinned);
    }
}
