use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::collections::HashSet;
use std::str::FromStr;

use super::{
    BotNameSource, NameTables, Store, DEFAULT_ADJECTIVES, DEFAULT_NOUNS, DEFAULT_PREDEFINED_NAMES,
};
use crate::error::{StoreError, StoreResult};
use crate::types::*;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS images (
        id TEXT PRIMARY KEY,
        kind TEXT NOT NULL CHECK (kind IN ('real', 'ai')),
        url TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS seen_images (
        username TEXT NOT NULL,
        image_id TEXT NOT NULL,
        seen_at TEXT NOT NULL,
        PRIMARY KEY (username, image_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS daily_challenges (
        username TEXT NOT NULL,
        date TEXT NOT NULL,
        completed INTEGER NOT NULL,
        is_admin INTEGER NOT NULL,
        score INTEGER NOT NULL,
        lives INTEGER NOT NULL,
        finished_at TEXT NOT NULL,
        PRIMARY KEY (username, date)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS daily_progress (
        username TEXT NOT NULL,
        date TEXT NOT NULL,
        round INTEGER NOT NULL,
        lives INTEGER NOT NULL,
        score INTEGER NOT NULL,
        streak INTEGER NOT NULL,
        game_over INTEGER NOT NULL,
        seen_image_ids TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        PRIMARY KEY (username, date)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_avatars (
        username TEXT NOT NULL,
        avatar TEXT NOT NULL,
        awarded_at TEXT NOT NULL,
        PRIMARY KEY (username, avatar)
    )
    "#,
    "CREATE TABLE IF NOT EXISTS bot_names (name TEXT PRIMARY KEY)",
    "CREATE TABLE IF NOT EXISTS bot_adjectives (word TEXT PRIMARY KEY)",
    "CREATE TABLE IF NOT EXISTS bot_nouns (word TEXT PRIMARY KEY)",
];

/// SQLite-backed store
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `url` and make sure the schema exists
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        // Seed lookup tables; existing rows are left alone
        for name in DEFAULT_PREDEFINED_NAMES {
            sqlx::query("INSERT OR IGNORE INTO bot_names (name) VALUES (?)")
                .bind(*name)
                .execute(&self.pool)
                .await?;
        }
        for word in DEFAULT_ADJECTIVES {
            sqlx::query("INSERT OR IGNORE INTO bot_adjectives (word) VALUES (?)")
                .bind(*word)
                .execute(&self.pool)
                .await?;
        }
        for word in DEFAULT_NOUNS {
            sqlx::query("INSERT OR IGNORE INTO bot_nouns (word) VALUES (?)")
                .bind(*word)
                .execute(&self.pool)
                .await?;
        }

        tracing::debug!("Database schema ready");
        Ok(())
    }

    async fn column_strings(&self, sql: &str) -> StoreResult<Vec<String>> {
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| row.try_get::<String, _>(0).map_err(StoreError::from))
            .collect()
    }
}

fn image_from_row(row: &sqlx::sqlite::SqliteRow) -> StoreResult<Image> {
    let kind: String = row.try_get("kind")?;
    let kind = ImageKind::parse(&kind)
        .ok_or_else(|| StoreError::InvalidData(format!("unknown image kind '{}'", kind)))?;
    Ok(Image {
        id: row.try_get("id")?,
        kind,
        url: row.try_get("url")?,
    })
}

/// Counters are stored as INTEGER; anything outside u32 is a corrupt row
fn get_u32(row: &sqlx::sqlite::SqliteRow, column: &str) -> StoreResult<u32> {
    let value: i64 = row.try_get(column)?;
    u32::try_from(value)
        .map_err(|_| StoreError::InvalidData(format!("{} out of range: {}", column, value)))
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[async_trait]
impl BotNameSource for SqliteStore {
    async fn load_name_tables(&self) -> StoreResult<NameTables> {
        Ok(NameTables {
            predefined: self.column_strings("SELECT name FROM bot_names").await?,
            adjectives: self.column_strings("SELECT word FROM bot_adjectives").await?,
            nouns: self.column_strings("SELECT word FROM bot_nouns").await?,
        })
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn get_image(&self, id: &str) -> StoreResult<Option<Image>> {
        let row = sqlx::query("SELECT id, kind, url FROM images WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(image_from_row).transpose()
    }

    async fn list_images(&self) -> StoreResult<Vec<Image>> {
        let rows = sqlx::query("SELECT id, kind, url FROM images ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(image_from_row).collect()
    }

    async fn upsert_images(&self, images: &[Image]) -> StoreResult<()> {
        for image in images {
            sqlx::query(
                r#"
                INSERT INTO images (id, kind, url) VALUES (?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET kind = excluded.kind, url = excluded.url
                "#,
            )
            .bind(&image.id)
            .bind(image.kind.as_str())
            .bind(&image.url)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    async fn seen_image_ids(&self, username: &str) -> StoreResult<HashSet<ImageId>> {
        let rows = sqlx::query("SELECT image_id FROM seen_images WHERE username = ?")
            .bind(username)
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| row.try_get::<String, _>("image_id").map_err(StoreError::from))
            .collect()
    }

    async fn mark_images_seen(&self, username: &str, image_ids: &[ImageId]) -> StoreResult<()> {
        let seen_at = now();
        for image_id in image_ids {
            sqlx::query(
                "INSERT OR IGNORE INTO seen_images (username, image_id, seen_at) VALUES (?, ?, ?)",
            )
            .bind(username)
            .bind(image_id)
            .bind(&seen_at)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    async fn daily_record(
        &self,
        username: &str,
        date: &str,
    ) -> StoreResult<Option<DailyChallengeRecord>> {
        let row = sqlx::query(
            r#"
            SELECT username, date, completed, is_admin, score, lives, finished_at
            FROM daily_challenges WHERE username = ? AND date = ?
            "#,
        )
        .bind(username)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(DailyChallengeRecord {
            username: row.try_get("username")?,
            date: row.try_get("date")?,
            completed: row.try_get("completed")?,
            is_admin: row.try_get("is_admin")?,
            score: get_u32(&row, "score")?,
            lives: get_u32(&row, "lives")?,
            finished_at: row.try_get("finished_at")?,
        }))
    }

    async fn save_daily_record(&self, record: &DailyChallengeRecord) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO daily_challenges
                (username, date, completed, is_admin, score, lives, finished_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(username, date) DO UPDATE SET
                completed = excluded.completed,
                is_admin = excluded.is_admin,
                score = excluded.score,
                lives = excluded.lives,
                finished_at = excluded.finished_at
            "#,
        )
        .bind(&record.username)
        .bind(&record.date)
        .bind(record.completed)
        .bind(record.is_admin)
        .bind(record.score as i64)
        .bind(record.lives as i64)
        .bind(&record.finished_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn progress(&self, username: &str, date: &str) -> StoreResult<Option<ProgressSnapshot>> {
        let row = sqlx::query(
            r#"
            SELECT username, date, round, lives, score, streak, game_over, seen_image_ids
            FROM daily_progress WHERE username = ? AND date = ?
            "#,
        )
        .bind(username)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(ProgressSnapshot {
            username: row.try_get("username")?,
            date: row.try_get("date")?,
            round: get_u32(&row, "round")?,
            lives: get_u32(&row, "lives")?,
            score: get_u32(&row, "score")?,
            streak: get_u32(&row, "streak")?,
            game_over: row.try_get("game_over")?,
            seen_image_ids: row.try_get("seen_image_ids")?,
        }))
    }

    async fn save_progress(&self, snapshot: &ProgressSnapshot) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO daily_progress
                (username, date, round, lives, score, streak, game_over, seen_image_ids, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(username, date) DO UPDATE SET
                round = excluded.round,
                lives = excluded.lives,
                score = excluded.score,
                streak = excluded.streak,
                game_over = excluded.game_over,
                seen_image_ids = excluded.seen_image_ids,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&snapshot.username)
        .bind(&snapshot.date)
        .bind(snapshot.round as i64)
        .bind(snapshot.lives as i64)
        .bind(snapshot.score as i64)
        .bind(snapshot.streak as i64)
        .bind(snapshot.game_over)
        .bind(&snapshot.seen_image_ids)
        .bind(now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn award_avatar(&self, username: &str, avatar: &str) -> StoreResult<()> {
        sqlx::query(
            "INSERT OR IGNORE INTO user_avatars (username, avatar, awarded_at) VALUES (?, ?, ?)",
        )
        .bind(username)
        .bind(avatar)
        .bind(now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn avatars(&self, username: &str) -> StoreResult<Vec<String>> {
        let rows = sqlx::query(
            "SELECT avatar FROM user_avatars WHERE username = ? ORDER BY awarded_at, avatar",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|row| row.try_get::<String, _>("avatar").map_err(StoreError::from))
            .collect()
    }
}
