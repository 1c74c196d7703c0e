use crate::domain::error::DomainError;
use crate::domain::referral_code::{NewReferralCode, ReferralCode};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};

#[async_trait]
pub trait ReferralCodeRepository: Send + Sync {
    async fn create(&self, code: NewReferralCode) -> Result<ReferralCode, DomainError>;
    async fn find_by_code(&self, code: i64) -> Result<Option<ReferralCode>, DomainError>;
    /// The single system-wide active code, if any.
    async fn find_active(&self) -> Result<Option<ReferralCode>, DomainError>;
    async fn find_active_by_user(&self, user_id: i64) -> Result<Option<ReferralCode>, DomainError>;
    async fn find_by_user(&self, user_id: i64) -> Result<Vec<ReferralCode>, DomainError>;
    /// Flips the code active, scoped to (code, user_id) so the update only
    /// applies when ownership matches. Returns None when no row matched or
    /// when the active slot was taken in the meantime.
    async fn activate(&self, code: i64, user_id: i64) -> Result<Option<ReferralCode>, DomainError>;
    /// Removes the code, scoped to (code, user_id). Returns rows affected.
    async fn delete(&self, code: i64, user_id: i64) -> Result<u64, DomainError>;
}

fn map_code_constraint(e: sqlx::Error, code: i64) -> DomainError {
    let constraint = e
        .as_database_error()
        .and_then(|db| db.constraint())
        .map(str::to_owned);
    match constraint.as_deref() {
        Some(c) if c.contains("referral_codes_code") => DomainError::CodeAlreadyExists(code),
        Some(c) if c.contains("single_active") => DomainError::ActiveCodeExists,
        _ => DomainError::Internal(format!("database error: {}", e)),
    }
}

#[derive(Clone)]
pub struct PostgresReferralCodeRepository {
    pool: PgPool,
}

impl PostgresReferralCodeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferralCodeRepository for PostgresReferralCodeRepository {
    async fn create(&self, code: NewReferralCode) -> Result<ReferralCode, DomainError> {
        let created = sqlx::query_as::<_, ReferralCode>(
            r#"
            INSERT INTO referral_codes (code, exp_date, is_active, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, code, exp_date, is_active, user_id
            "#,
        )
        .bind(code.code)
        .bind(code.exp_date)
        .bind(code.is_active)
        .bind(code.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to create referral code: {}", e);
            map_code_constraint(e, code.code)
        })?;

        info!(
            code = %created.code,
            user_id = %created.user_id,
            is_active = created.is_active,
            "referral code created"
        );
        Ok(created)
    }

    async fn find_by_code(&self, code: i64) -> Result<Option<ReferralCode>, DomainError> {
        sqlx::query_as::<_, ReferralCode>(
            r#"
            SELECT id, code, exp_date, is_active, user_id
            FROM referral_codes
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to find referral code {}: {}", code, e);
            DomainError::Internal(e.to_string())
        })
    }

    async fn find_active(&self) -> Result<Option<ReferralCode>, DomainError> {
        sqlx::query_as::<_, ReferralCode>(
            r#"
            SELECT id, code, exp_date, is_active, user_id
            FROM referral_codes
            WHERE is_active
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to look up active referral code: {}", e);
            DomainError::Internal(e.to_string())
        })
    }

    async fn find_active_by_user(&self, user_id: i64) -> Result<Option<ReferralCode>, DomainError> {
        sqlx::query_as::<_, ReferralCode>(
            r#"
            SELECT id, code, exp_date, is_active, user_id
            FROM referral_codes
            WHERE is_active AND user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to look up active code of user {}: {}", user_id, e);
            DomainError::Internal(e.to_string())
        })
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<ReferralCode>, DomainError> {
        sqlx::query_as::<_, ReferralCode>(
            r#"
            SELECT id, code, exp_date, is_active, user_id
            FROM referral_codes
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to list codes of user {}: {}", user_id, e);
            DomainError::Internal(e.to_string())
        })
    }

    async fn activate(&self, code: i64, user_id: i64) -> Result<Option<ReferralCode>, DomainError> {
        // Single guarded statement; the partial unique index on is_active is
        // the backstop if two activations race past the NOT EXISTS check.
        let updated = sqlx::query_as::<_, ReferralCode>(
            r#"
            UPDATE referral_codes
            SET is_active = TRUE
            WHERE code = $1
              AND user_id = $2
              AND NOT EXISTS (SELECT 1 FROM referral_codes WHERE is_active AND code <> $1)
            RETURNING id, code, exp_date, is_active, user_id
            "#,
        )
        .bind(code)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to activate referral code {}: {}", code, e);
            map_code_constraint(e, code)
        })?;

        if updated.is_some() {
            info!(code = %code, user_id = %user_id, "referral code activated");
        }

        Ok(updated)
    }

    async fn delete(&self, code: i64, user_id: i64) -> Result<u64, DomainError> {
        let deleted = sqlx::query("DELETE FROM referral_codes WHERE code = $1 AND user_id = $2")
            .bind(code)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if deleted.rows_affected() > 0 {
            info!(code = %code, user_id = %user_id, "referral code deleted");
        }
        Ok(deleted.rows_affected())
    }
}
