//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::entity::{
    account::Account, confirmation_token::{ConfirmationToken, TokenStatus},
    login_method::LoginMethod,
};
use crate::domain::repository::{
    AccountRepository, ConfirmOutcome, ConfirmationTokenRepository, IssueOutcome,
    LoginMethodRepository,
};
use crate::domain::value_object::{
    account_id::AccountId, email::Email, password::PasswordCredential, provider::Provider,
    token_secret::TokenSecret, user_name::UserName,
};
use crate::error::{IdentityError, IdentityResult};

/// Unique index names from the migrations, used to classify 23505
const EMAIL_UNIQUE_INDEX: &str = "accounts_email_lower_idx";
const USER_NAME_UNIQUE_INDEX: &str = "accounts_user_name_lower_idx";

/// PostgreSQL-backed identity repository
#[derive(Clone)]
pub struct PgIdentityRepository {
    pool: PgPool,
}

impl PgIdentityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Clean up stale confirmation tokens past their expiry
    ///
    /// Housekeeping only: superseded and consumed rows are kept until
    /// expiry so replayed tokens answer `TokenAlreadyUsed` rather than
    /// `TokenUnknown`.
    pub async fn cleanup_expired_tokens(&self) -> IdentityResult<u64> {
        let deleted =
            sqlx::query("DELETE FROM email_confirmations WHERE is_stale AND expires_at < $1")
                .bind(Utc::now())
                .execute(&self.pool)
                .await?
                .rows_affected();

        tracing::info!(tokens_deleted = deleted, "Cleaned up stale confirmation tokens");

        Ok(deleted)
    }
}

/// Classify a unique violation by the index that raised it
fn map_insert_error(err: sqlx::Error) -> IdentityError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            return match db_err.constraint() {
                Some(USER_NAME_UNIQUE_INDEX) => IdentityError::UserNameTaken,
                Some(EMAIL_UNIQUE_INDEX) => IdentityError::AccountExists,
                // (provider, identifier): someone owns this identity
                _ => IdentityError::AccountExists,
            };
        }
    }
    IdentityError::Database(err)
}

// ============================================================================
// Account Repository Implementation
// ============================================================================

impl AccountRepository for PgIdentityRepository {
    async fn create_with_login(
        &self,
        account: &Account,
        login: &LoginMethod,
    ) -> IdentityResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO accounts (
                account_id,
                email,
                user_name,
                password_hash,
                email_confirmed,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(account.account_id.as_uuid())
        .bind(account.email.as_str())
        .bind(account.user_name.as_str())
        .bind(account.password.as_ref().map(|p| p.as_phc_string()))
        .bind(account.email_confirmed)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_insert_error)?;

        sqlx::query(
            r#"
            INSERT INTO login_methods (account_id, provider, identifier, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(login.account_id.as_uuid())
        .bind(login.provider.as_str())
        .bind(&login.identifier)
        .bind(login.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_insert_error)?;

        tx.commit().await?;

        Ok(())
    }

    async fn find_by_id(&self, account_id: &AccountId) -> IdentityResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT
                account_id,
                email,
                user_name,
                password_hash,
                email_confirmed,
                created_at,
                updated_at
            FROM accounts
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_account()).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> IdentityResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT
                account_id,
                email,
                user_name,
                password_hash,
                email_confirmed,
                created_at,
                updated_at
            FROM accounts
            WHERE LOWER(email) = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_account()).transpose()
    }

    async fn exists_by_email_or_user_name(
        &self,
        email: &Email,
        user_name: &UserName,
    ) -> IdentityResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM accounts
                WHERE LOWER(email) = $1 OR LOWER(user_name) = $2
            )
            "#,
        )
        .bind(email.as_str())
        .bind(user_name.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

// ============================================================================
// Login Method Repository Implementation
// ============================================================================

impl LoginMethodRepository for PgIdentityRepository {
    async fn find_account_by_provider(
        &self,
        provider: Provider,
        identifier: &str,
    ) -> IdentityResult<Option<AccountId>> {
        let account_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT account_id FROM login_methods
            WHERE provider = $1 AND identifier = $2
            "#,
        )
        .bind(provider.as_str())
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account_id.map(AccountId::from_uuid))
    }

    async fn link(&self, login: &LoginMethod) -> IdentityResult<()> {
        // Idempotent: a concurrent request may have linked already
        sqlx::query(
            r#"
            INSERT INTO login_methods (account_id, provider, identifier, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (account_id, provider) DO NOTHING
            "#,
        )
        .bind(login.account_id.as_uuid())
        .bind(login.provider.as_str())
        .bind(&login.identifier)
        .bind(login.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Confirmation Token Repository Implementation
// ============================================================================

impl ConfirmationTokenRepository for PgIdentityRepository {
    async fn issue(
        &self,
        token: &ConfirmationToken,
        cooldown: Duration,
    ) -> IdentityResult<IssueOutcome> {
        let mut tx = self.pool.begin().await?;

        // Lock the live row so concurrent issuers serialize; the loser
        // observes the winner's fresh row and rate-limits.
        let live = sqlx::query_as::<_, TokenRow>(
            r#"
            SELECT token, account_id, created_at, last_sent_at, expires_at, is_stale
            FROM email_confirmations
            WHERE account_id = $1 AND NOT is_stale
            FOR UPDATE
            "#,
        )
        .bind(token.account_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(row) = live {
            let existing = row.into_token();
            if let Some(retry_after) = existing.cooldown_remaining(token.last_sent_at, cooldown) {
                // Nothing written; dropping the transaction rolls back
                return Ok(IssueOutcome::CoolingDown { retry_after });
            }

            // Supersede: the old row stays, stale, so a replay of its
            // token answers AlreadyUsed
            sqlx::query("UPDATE email_confirmations SET is_stale = TRUE WHERE token = $1")
                .bind(existing.secret.as_str())
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO email_confirmations (
                token, account_id, created_at, last_sent_at, expires_at, is_stale
            ) VALUES ($1, $2, $3, $4, $5, FALSE)
            "#,
        )
        .bind(token.secret.as_str())
        .bind(token.account_id.as_uuid())
        .bind(token.created_at)
        .bind(token.last_sent_at)
        .bind(token.expires_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(IssueOutcome::Installed)
    }

    async fn confirm(&self, secret: &str, now: DateTime<Utc>) -> IdentityResult<ConfirmOutcome> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            SELECT token, account_id, created_at, last_sent_at, expires_at, is_stale
            FROM email_confirmations
            WHERE token = $1
            FOR UPDATE
            "#,
        )
        .bind(secret)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(ConfirmOutcome::Unknown);
        };
        let token = row.into_token();

        match token.status(now) {
            TokenStatus::Stale => Ok(ConfirmOutcome::AlreadyUsed),
            TokenStatus::Expired => {
                // Terminal transition: replays answer AlreadyUsed
                sqlx::query("UPDATE email_confirmations SET is_stale = TRUE WHERE token = $1")
                    .bind(secret)
                    .execute(&mut *tx)
                    .await?;
                tx.commit().await?;
                Ok(ConfirmOutcome::Expired)
            }
            TokenStatus::Usable => {
                // Both writes commit together or not at all
                sqlx::query(
                    r#"
                    UPDATE accounts
                    SET email_confirmed = TRUE, updated_at = $2
                    WHERE account_id = $1
                    "#,
                )
                .bind(token.account_id.as_uuid())
                .bind(now)
                .execute(&mut *tx)
                .await?;

                sqlx::query("UPDATE email_confirmations SET is_stale = TRUE WHERE token = $1")
                    .bind(secret)
                    .execute(&mut *tx)
                    .await?;

                tx.commit().await?;
                Ok(ConfirmOutcome::Confirmed(token.account_id))
            }
        }
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    account_id: Uuid,
    email: String,
    user_name: String,
    password_hash: Option<String>,
    email_confirmed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> IdentityResult<Account> {
        let password = self
            .password_hash
            .map(PasswordCredential::from_phc_string)
            .transpose()
            .map_err(|e| IdentityError::Internal(format!("Invalid password hash: {}", e)))?;

        Ok(Account {
            account_id: AccountId::from_uuid(self.account_id),
            email: Email::from_db(self.email),
            user_name: UserName::from_db(self.user_name),
            password,
            email_confirmed: self.email_confirmed,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TokenRow {
    token: String,
    account_id: Uuid,
    created_at: DateTime<Utc>,
    last_sent_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    is_stale: bool,
}

impl TokenRow {
    fn into_token(self) -> ConfirmationToken {
        ConfirmationToken {
            account_id: AccountId::from_uuid(self.account_id),
            secret: TokenSecret::from_db(self.token),
            created_at: self.created_at,
            last_sent_at: self.last_sent_at,
            expires_at: self.expires_at,
            is_stale: self.is_stale,
        }
    }
}
