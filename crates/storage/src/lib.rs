mod clock;
mod context;

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tracing::warn;
use wayfarer_core::{ConversationTurn, Sender};

pub use clock::TurnClock;
pub use context::SessionContexts;

/// Append-only record of user and bot turns keyed by `(session_id, timestamp)`.
///
/// Expired turns are never returned. Each backend removes them on its own
/// during `append`; callers never delete.
pub trait ConversationLog: Send + Sync {
    async fn append(&self, turn: &ConversationTurn) -> Result<()>;
    async fn get(&self, session_id: &str, timestamp: i64) -> Result<Option<ConversationTurn>>;
    /// Live turns for a session, oldest first.
    async fn history(&self, session_id: &str) -> Result<Vec<ConversationTurn>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    Memory,
    Sqlite,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    turns: Arc<RwLock<HashMap<String, BTreeMap<i64, ConversationTurn>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sweep_expired(&self, now: DateTime<Utc>) {
        let mut sessions = self.turns.write();
        sessions.retain(|_, turns| {
            turns.retain(|_, turn| !turn.is_expired(now));
            !turns.is_empty()
        });
    }
}

impl ConversationLog for MemoryStore {
    async fn append(&self, turn: &ConversationTurn) -> Result<()> {
        {
            let mut sessions = self.turns.write();
            let turns = sessions.entry(turn.session_id.clone()).or_default();
            if turns.contains_key(&turn.timestamp) {
                return Err(anyhow!(
                    "turn {} already recorded for session {}",
                    turn.timestamp,
                    turn.session_id
                ));
            }
            turns.insert(turn.timestamp, turn.clone());
        }
        self.sweep_expired(Utc::now());
        Ok(())
    }

    async fn get(&self, session_id: &str, timestamp: i64) -> Result<Option<ConversationTurn>> {
        let now = Utc::now();
        Ok(self
            .turns
            .read()
            .get(session_id)
            .and_then(|turns| turns.get(&timestamp))
            .filter(|turn| !turn.is_expired(now))
            .cloned())
    }

    async fn history(&self, session_id: &str) -> Result<Vec<ConversationTurn>> {
        let now = Utc::now();
        Ok(self
            .turns
            .read()
            .get(session_id)
            .map(|turns| {
                turns
                    .values()
                    .filter(|turn| !turn.is_expired(now))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid sqlite url {}", database_url))?
            .create_if_missing(true);

        // Every connection to `:memory:` opens its own database, so keep exactly one alive.
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("failed connecting to sqlite at {}", database_url))?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS conversation_turns (
              session_id TEXT NOT NULL,
              timestamp INTEGER NOT NULL,
              message TEXT NOT NULL,
              sender TEXT NOT NULL,
              expires_at INTEGER NOT NULL,
              PRIMARY KEY (session_id, timestamp)
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS conversation_turns_expiry ON conversation_turns (expires_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM conversation_turns WHERE expires_at <= ?1")
            .bind(now.timestamp())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

fn turn_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<ConversationTurn> {
    let sender: String = row.get("sender");
    Ok(ConversationTurn {
        session_id: row.get("session_id"),
        timestamp: row.get("timestamp"),
        message: row.get("message"),
        sender: Sender::parse(&sender)
            .ok_or_else(|| anyhow!("unknown sender '{}' in conversation log", sender))?,
        expires_at: row.get("expires_at"),
    })
}

impl ConversationLog for SqliteStore {
    async fn append(&self, turn: &ConversationTurn) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO conversation_turns (session_id, timestamp, message, sender, expires_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&turn.session_id)
        .bind(turn.timestamp)
        .bind(&turn.message)
        .bind(turn.sender.as_code())
        .bind(turn.expires_at)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to append turn for session {}", turn.session_id))?;

        if let Err(error) = self.sweep_expired(Utc::now()).await {
            warn!(error = %error, "failed to sweep expired conversation turns");
        }
        Ok(())
    }

    async fn get(&self, session_id: &str, timestamp: i64) -> Result<Option<ConversationTurn>> {
        let row = sqlx::query(
            r#"
            SELECT session_id, timestamp, message, sender, expires_at
            FROM conversation_turns
            WHERE session_id = ?1 AND timestamp = ?2 AND expires_at > ?3
            "#,
        )
        .bind(session_id)
        .bind(timestamp)
        .bind(Utc::now().timestamp())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(turn_from_row).transpose()
    }

    async fn history(&self, session_id: &str) -> Result<Vec<ConversationTurn>> {
        let rows = sqlx::query(
            r#"
            SELECT session_id, timestamp, message, sender, expires_at
            FROM conversation_turns
            WHERE session_id = ?1 AND expires_at > ?2
            ORDER BY timestamp
            "#,
        )
        .bind(session_id)
        .bind(Utc::now().timestamp())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(turn_from_row).collect()
    }
}

#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
    Sqlite(SqliteStore),
}

impl Store {
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    pub async fn sqlite(database_url: &str) -> Result<Self> {
        let sqlite = SqliteStore::connect(database_url).await?;
        Ok(Self::Sqlite(sqlite))
    }

    pub fn kind(&self) -> StoreKind {
        match self {
            Store::Memory(_) => StoreKind::Memory,
            Store::Sqlite(_) => StoreKind::Sqlite,
        }
    }
}

impl ConversationLog for Store {
    async fn append(&self, turn: &ConversationTurn) -> Result<()> {
        match self {
            Store::Memory(store) => store.append(turn).await,
            Store::Sqlite(store) => store.append(turn).await,
        }
    }

    async fn get(&self, session_id: &str, timestamp: i64) -> Result<Option<ConversationTurn>> {
        match self {
            Store::Memory(store) => store.get(session_id, timestamp).await,
            Store::Sqlite(store) => store.get(session_id, timestamp).await,
        }
    }

    async fn history(&self, session_id: &str) -> Result<Vec<ConversationTurn>> {
        match self {
            Store::Memory(store) => store.history(session_id).await,
            Store::Sqlite(store) => store.history(session_id).await,
        }
    }
}
