use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

impl Tag {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now().to_rfc3339(),
        }
    }

    /// Return the tag with this exact name, inserting it first if absent.
    pub async fn get_or_create(conn: &mut SqliteConnection, name: &str) -> Result<Tag, sqlx::Error> {
        let candidate = Tag::new(name);
        sqlx::query("INSERT INTO tags (id, name, created_at) VALUES (?, ?, ?) ON CONFLICT(name) DO NOTHING")
            .bind(&candidate.id)
            .bind(&candidate.name)
            .bind(&candidate.created_at)
            .execute(&mut *conn)
            .await?;

        sqlx::query_as("SELECT * FROM tags WHERE name = ?")
            .bind(name)
            .fetch_one(&mut *conn)
            .await
    }

    /// Tags attached to an entry, in the order they were first linked.
    pub async fn for_entry(db: &SqlitePool, entry_id: &str) -> Result<Vec<Tag>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT t.* FROM tags t
            JOIN entry_tags et ON et.tag_id = t.id
            WHERE et.entry_id = ?
            ORDER BY et.rowid
            "#
        )
        .bind(entry_id)
        .fetch_all(db)
        .await
    }

    pub async fn count(db: &SqlitePool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tags")
            .fetch_one(db)
            .await?;
        Ok(count)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EntryTag {
    pub entry_id: String,
    pub tag_id: String,
}

impl EntryTag {
    /// Link an entry to a tag; an existing pair is left untouched.
    pub async fn get_or_create(
        conn: &mut SqliteConnection,
        entry_id: &str,
        tag_id: &str,
    ) -> Result<EntryTag, sqlx::Error> {
        sqlx::query("INSERT OR IGNORE INTO entry_tags (entry_id, tag_id) VALUES (?, ?)")
            .bind(entry_id)
            .bind(tag_id)
            .execute(&mut *conn)
            .await?;

        sqlx::query_as("SELECT * FROM entry_tags WHERE entry_id = ? AND tag_id = ?")
            .bind(entry_id)
            .bind(tag_id)
            .fetch_one(&mut *conn)
            .await
    }
}
