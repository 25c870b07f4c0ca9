use std::{borrow::Cow, future::Future};

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{migrate::MigrateError, sqlite::SqlitePoolOptions, SqlitePool};
use thiserror::Error;
use uuid::Uuid;

use genesis_core::naming::{community_description, community_name};
use genesis_core::types::{Community, Membership, MembershipRole};

const SQLITE_CONSTRAINT_FOREIGNKEY: &str = "787";
const SQLITE_CONSTRAINT_PRIMARYKEY: &str = "1555";
const SQLITE_CONSTRAINT_UNIQUE: &str = "2067";

/// Top-level database handle that owns the SQLite connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Establishes a new SQLite connection pool for the provided connection string.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(StorageError::Connect)?;

        apply_pragmas(&pool).await?;

        Ok(Self { pool })
    }

    /// Applies migrations located under `migrations/`.
    pub async fn run_migrations(&self) -> Result<(), StorageError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(StorageError::Migration)?;
        Ok(())
    }

    /// Returns a handle for reading and creating communities.
    pub fn communities(&self) -> CommunityRepository {
        CommunityRepository {
            pool: self.pool.clone(),
        }
    }

    /// Returns a handle for community memberships.
    pub fn memberships(&self) -> MembershipRepository {
        MembershipRepository {
            pool: self.pool.clone(),
        }
    }

    /// Exposes the inner pool when lower level access is required.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn apply_pragmas(pool: &SqlitePool) -> Result<(), StorageError> {
    sqlx::query("PRAGMA foreign_keys = ON;")
        .execute(pool)
        .await
        .map_err(StorageError::Pragma)?;

    sqlx::query("PRAGMA journal_mode = WAL;")
        .fetch_one(pool)
        .await
        .map_err(StorageError::Pragma)?;

    sqlx::query("PRAGMA synchronous = NORMAL;")
        .execute(pool)
        .await
        .map_err(StorageError::Pragma)?;

    sqlx::query("PRAGMA busy_timeout = 5000;")
        .execute(pool)
        .await
        .map_err(StorageError::Pragma)?;

    Ok(())
}

/// General storage level errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to connect to sqlite: {0}")]
    Connect(sqlx::Error),
    #[error("failed to apply pragma: {0}")]
    Pragma(sqlx::Error),
    #[error("failed to run database migrations: {0}")]
    Migration(MigrateError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// The three operations the community assignment flow needs from persistence.
///
/// Lookup-then-insert is not atomic; the unique index on `domain_slug` is the
/// only guard against two concurrent creators, and the loser sees
/// [`CommunityError::Duplicate`].
pub trait CommunityStore: Send + Sync {
    /// Point lookup by unique slug.
    fn find_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Option<Community>, CommunityError>> + Send;

    /// Inserts a community, failing when the slug already exists.
    fn insert_community(
        &self,
        record: NewCommunity<'_>,
    ) -> impl Future<Output = Result<Community, CommunityError>> + Send;

    /// Inserts or refreshes the membership keyed by `(user_id, community_id)`.
    fn upsert_membership(
        &self,
        record: NewMembership<'_>,
    ) -> impl Future<Output = Result<(), MembershipError>> + Send;
}

impl CommunityStore for Database {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Community>, CommunityError> {
        self.communities().find_by_slug(slug).await
    }

    async fn insert_community(&self, record: NewCommunity<'_>) -> Result<Community, CommunityError> {
        self.communities().insert(record).await
    }

    async fn upsert_membership(&self, record: NewMembership<'_>) -> Result<(), MembershipError> {
        self.memberships().upsert(&record).await
    }
}

/// Repository for the `communities` table.
#[derive(Clone)]
pub struct CommunityRepository {
    pool: SqlitePool,
}

impl CommunityRepository {
    /// Loads the community registered for `slug`.
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Community>, CommunityError> {
        let row = sqlx::query_as::<_, CommunityRow>(
            "SELECT id, name, domain_slug, description, created_at \
             FROM communities WHERE domain_slug = ?",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CommunityRow::into_domain))
    }

    /// Inserts a new community and returns the stored record.
    pub async fn insert(&self, record: NewCommunity<'_>) -> Result<Community, CommunityError> {
        sqlx::query(
            "INSERT INTO communities (id, name, domain_slug, description, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(record.id.as_ref())
        .bind(record.name.as_ref())
        .bind(record.domain_slug.as_ref())
        .bind(record.description.as_ref())
        .bind(to_rfc3339(record.created_at))
        .execute(&self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some(SQLITE_CONSTRAINT_UNIQUE) | Some(SQLITE_CONSTRAINT_PRIMARYKEY) => {
                    CommunityError::Duplicate
                }
                _ => CommunityError::Database(sqlx::Error::Database(db_err)),
            },
            other => CommunityError::Database(other),
        })?;

        Ok(Community {
            id: record.id.into_owned(),
            name: record.name.into_owned(),
            domain_slug: record.domain_slug.into_owned(),
            description: record.description.into_owned(),
            created_at: record.created_at,
        })
    }

    /// Counts rows registered for `slug`; the unique index keeps this at zero or one.
    pub async fn count_by_slug(&self, slug: &str) -> Result<u64, CommunityError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM communities WHERE domain_slug = ?")
                .bind(slug)
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u64)
    }

    /// Lists every community ordered by slug.
    pub async fn list(&self) -> Result<Vec<Community>, CommunityError> {
        let rows = sqlx::query_as::<_, CommunityRow>(
            "SELECT id, name, domain_slug, description, created_at \
             FROM communities ORDER BY domain_slug",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CommunityRow::into_domain).collect())
    }
}

/// Data required to create a community.
#[derive(Debug, Clone)]
pub struct NewCommunity<'a> {
    pub id: Cow<'a, str>,
    pub name: Cow<'a, str>,
    pub domain_slug: Cow<'a, str>,
    pub description: Cow<'a, str>,
    pub created_at: DateTime<Utc>,
}

impl<'a> NewCommunity<'a> {
    /// Builds the record auto-created for a domain, deriving its name and description.
    pub fn for_domain(slug: &'a str, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Cow::Owned(Uuid::new_v4().to_string()),
            name: Cow::Owned(community_name(slug)),
            domain_slug: Cow::Borrowed(slug),
            description: Cow::Owned(community_description(slug)),
            created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CommunityRow {
    id: String,
    name: String,
    domain_slug: String,
    description: String,
    created_at: DateTime<Utc>,
}

impl CommunityRow {
    fn into_domain(self) -> Community {
        Community {
            id: self.id,
            name: self.name,
            domain_slug: self.domain_slug,
            description: self.description,
            created_at: self.created_at,
        }
    }
}

/// Errors raised by community reads and writes.
#[derive(Debug, Error)]
pub enum CommunityError {
    #[error("a community already exists for this domain")]
    Duplicate,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Repository for the `community_memberships` table.
#[derive(Clone)]
pub struct MembershipRepository {
    pool: SqlitePool,
}

impl MembershipRepository {
    /// Inserts the membership or, when the pair exists, overwrites its role.
    ///
    /// `joined_at` keeps the value from the first write.
    pub async fn upsert(&self, record: &NewMembership<'_>) -> Result<(), MembershipError> {
        let now = to_rfc3339(record.updated_at);
        sqlx::query(
            "INSERT INTO community_memberships (user_id, community_id, role, joined_at, updated_at) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(user_id, community_id) DO UPDATE \
             SET role = excluded.role, updated_at = excluded.updated_at",
        )
        .bind(record.user_id)
        .bind(record.community_id)
        .bind(record.role.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(db_err) => {
                if db_err.code().as_deref() == Some(SQLITE_CONSTRAINT_FOREIGNKEY) {
                    MembershipError::MissingCommunity
                } else {
                    MembershipError::Database(sqlx::Error::Database(db_err))
                }
            }
            other => MembershipError::Database(other),
        })?;

        Ok(())
    }

    /// Lists the memberships held by `user_id`, oldest first.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Membership>, MembershipError> {
        let rows = sqlx::query_as::<_, MembershipRow>(
            "SELECT user_id, community_id, role, joined_at, updated_at \
             FROM community_memberships WHERE user_id = ? \
             ORDER BY joined_at, community_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MembershipRow::into_domain).collect())
    }
}

/// Payload for a membership upsert.
#[derive(Debug, Clone, Copy)]
pub struct NewMembership<'a> {
    pub user_id: &'a str,
    pub community_id: &'a str,
    pub role: MembershipRole,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct MembershipRow {
    user_id: String,
    community_id: String,
    role: String,
    joined_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MembershipRow {
    fn into_domain(self) -> Membership {
        Membership {
            user_id: self.user_id,
            community_id: self.community_id,
            role: MembershipRole::parse(&self.role).unwrap_or_default(),
            joined_at: self.joined_at,
            updated_at: self.updated_at,
        }
    }
}

/// Errors raised by membership writes.
#[derive(Debug, Error)]
pub enum MembershipError {
    #[error("community referenced by membership does not exist")]
    MissingCommunity,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

fn to_rfc3339(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}
