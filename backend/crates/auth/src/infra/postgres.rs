//! PostgreSQL Repository Implementations

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use kernel::id::MemberId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::member::{LoginFailures, Member, RoleAssignment};
use crate::domain::repository::{MemberRepository, UserDirectory};
use crate::domain::value_object::{
    email::Email,
    national_id::NationalId,
    user_password::{RawPassword, UserPassword},
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// Unique constraints on `members`, see the migration
const EMAIL_UNIQUE: &str = "members_email_key";
const NATIONAL_ID_UNIQUE: &str = "members_national_id_key";

/// PostgreSQL-backed member directory and repository
#[derive(Clone)]
pub struct PgMemberRepository {
    pool: PgPool,
    pepper: Option<Arc<[u8]>>,
}

impl PgMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool, pepper: None }
    }

    /// Pepper used by `check_password`; must match the one used at sign-up
    pub fn with_pepper(mut self, pepper: Option<&[u8]>) -> Self {
        self.pepper = pepper.map(Arc::from);
        self
    }
}

// ============================================================================
// User Directory Implementation
// ============================================================================

impl UserDirectory for PgMemberRepository {
    async fn find_by_username_key(&self, username_key: &Email) -> AuthResult<Option<Member>> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT
                m.member_id,
                m.national_id,
                m.email,
                m.password_hash,
                m.first_name,
                m.last_name,
                m.enabled,
                m.failed_login_count,
                m.last_failed_at,
                m.locked_until,
                m.last_login_at,
                m.created_at,
                m.updated_at,
                COALESCE(
                    array_agg(r.role ORDER BY r.role) FILTER (WHERE r.role IS NOT NULL),
                    '{}'::smallint[]
                ) AS roles,
                COALESCE(
                    array_agg(r.assigned_at ORDER BY r.role) FILTER (WHERE r.role IS NOT NULL),
                    '{}'::timestamptz[]
                ) AS roles_assigned_at
            FROM members m
            LEFT JOIN member_roles r ON r.member_id = m.member_id
            WHERE m.email = $1
            GROUP BY m.member_id
            "#,
        )
        .bind(username_key.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_member()).transpose()
    }

    async fn is_enabled(&self, username_key: &Email) -> AuthResult<Option<bool>> {
        let enabled =
            sqlx::query_scalar::<_, bool>("SELECT enabled FROM members WHERE email = $1")
                .bind(username_key.as_str())
                .fetch_optional(&self.pool)
                .await?;

        Ok(enabled)
    }

    async fn check_password(&self, username_key: &Email, password: &RawPassword) -> AuthResult<bool> {
        let hash =
            sqlx::query_scalar::<_, String>("SELECT password_hash FROM members WHERE email = $1")
                .bind(username_key.as_str())
                .fetch_optional(&self.pool)
                .await?;

        let Some(hash) = hash else {
            return Ok(false);
        };
        let hash = UserPassword::from_phc_string(hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password hash: {}", e)))?;

        Ok(hash.verify(password, self.pepper.as_deref()))
    }
}

// ============================================================================
// Member Repository Implementation
// ============================================================================

impl MemberRepository for PgMemberRepository {
    async fn create(&self, member: &Member) -> AuthResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO members (
                member_id,
                national_id,
                email,
                password_hash,
                first_name,
                last_name,
                enabled,
                failed_login_count,
                last_failed_at,
                locked_until,
                last_login_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(member.member_id.as_uuid())
        .bind(member.national_id.as_str())
        .bind(member.email.as_str())
        .bind(member.password_hash.as_phc_string())
        .bind(member.first_name.as_deref())
        .bind(member.last_name.as_deref())
        .bind(member.enabled)
        .bind(stored_count(member.login_failures.count))
        .bind(member.login_failures.last_failed_at)
        .bind(member.login_failures.locked_until)
        .bind(member.last_login_at)
        .bind(member.created_at)
        .bind(member.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        for assignment in &member.role_assignments {
            sqlx::query(
                r#"
                INSERT INTO member_roles (member_id, role, assigned_at)
                VALUES ($1, $2, $3)
                ON CONFLICT (member_id, role) DO NOTHING
                "#,
            )
            .bind(member.member_id.as_uuid())
            .bind(assignment.role.id())
            .bind(assignment.assigned_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM members WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn exists_by_national_id(&self, national_id: &NationalId) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM members WHERE national_id = $1)",
        )
        .bind(national_id.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn record_login_failure(
        &self,
        email: &Email,
        now: DateTime<Utc>,
        max_failures: u16,
        lockout: Duration,
    ) -> AuthResult<Option<LoginFailures>> {
        let mut tx = self.pool.begin().await?;

        // row lock serializes concurrent failures for the same member
        let row = sqlx::query_as::<_, LoginFailuresRow>(
            r#"
            SELECT failed_login_count, last_failed_at, locked_until
            FROM members
            WHERE email = $1
            FOR UPDATE
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut failures = row.into_failures();
        failures.record(now, max_failures, lockout);

        sqlx::query(
            r#"
            UPDATE members SET
                failed_login_count = $2,
                last_failed_at = $3,
                locked_until = $4,
                updated_at = $5
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .bind(stored_count(failures.count))
        .bind(failures.last_failed_at)
        .bind(failures.locked_until)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(failures))
    }

    async fn record_login(&self, email: &Email, now: DateTime<Utc>) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE members SET
                failed_login_count = 0,
                last_failed_at = NULL,
                locked_until = NULL,
                last_login_at = $2,
                updated_at = $2
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_enabled(&self, email: &Email, enabled: bool, now: DateTime<Utc>) -> AuthResult<bool> {
        let updated = sqlx::query(
            "UPDATE members SET enabled = $2, updated_at = $3 WHERE email = $1",
        )
        .bind(email.as_str())
        .bind(enabled)
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }
}

/// `failed_login_count` is a SMALLINT
fn stored_count(count: u16) -> i16 {
    i16::try_from(count).unwrap_or(i16::MAX)
}

/// Concurrent sign-ups can pass the existence checks; the constraint decides
fn map_unique_violation(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.constraint() {
            Some(EMAIL_UNIQUE) => return AuthError::EmailTaken,
            Some(NATIONAL_ID_UNIQUE) => return AuthError::NationalIdTaken,
            _ => {}
        }
    }
    AuthError::Database(err)
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct MemberRow {
    member_id: Uuid,
    national_id: String,
    email: String,
    password_hash: String,
    first_name: Option<String>,
    last_name: Option<String>,
    enabled: bool,
    failed_login_count: i16,
    last_failed_at: Option<DateTime<Utc>>,
    locked_until: Option<DateTime<Utc>>,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    roles: Vec<i16>,
    roles_assigned_at: Vec<DateTime<Utc>>,
}

impl MemberRow {
    fn into_member(self) -> AuthResult<Member> {
        let password_hash = UserPassword::from_phc_string(self.password_hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password hash: {}", e)))?;

        let role_assignments = self
            .roles
            .into_iter()
            .zip(self.roles_assigned_at)
            .filter_map(|(id, assigned_at)| match UserRole::from_id(id) {
                Some(role) => Some(RoleAssignment { role, assigned_at }),
                None => {
                    tracing::warn!(member_id = %self.member_id, role_id = id, "Skipping unknown role");
                    None
                }
            })
            .collect();

        Ok(Member {
            member_id: MemberId::from_uuid(self.member_id),
            national_id: NationalId::from_db(self.national_id),
            email: Email::from_db(self.email),
            password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            enabled: self.enabled,
            role_assignments,
            login_failures: LoginFailures {
                count: loaded_count(self.failed_login_count),
                last_failed_at: self.last_failed_at,
                locked_until: self.locked_until,
            },
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct LoginFailuresRow {
    failed_login_count: i16,
    last_failed_at: Option<DateTime<Utc>>,
    locked_until: Option<DateTime<Utc>>,
}

impl LoginFailuresRow {
    fn into_failures(self) -> LoginFailures {
        LoginFailures {
            count: loaded_count(self.failed_login_count),
            last_failed_at: self.last_failed_at,
            locked_until: self.locked_until,
        }
    }
}

fn loaded_count(count: i16) -> u16 {
    u16::try_from(count).unwrap_or(0)
}
