use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use uuid::Uuid;

/// Format used on forms and pages.
pub const DISPLAY_DATE_FORMAT: &str = "%d-%m-%Y";
/// Format used in the `entries.date` column.
pub const STORED_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Entry {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub date: String,
    pub time_spent: String,
    pub what_i_learned: String,
    pub sources_to_remember: String,
    pub created_at: String,
}

impl Entry {
    pub fn new(
        title: String,
        slug: String,
        date: NaiveDate,
        time_spent: String,
        what_i_learned: String,
        sources_to_remember: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            slug,
            date: date.format(STORED_DATE_FORMAT).to_string(),
            time_spent,
            what_i_learned,
            sources_to_remember,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    /// The entry date as `dd-mm-yyyy`, or the raw column value if it doesn't parse.
    pub fn display_date(&self) -> String {
        NaiveDate::parse_from_str(&self.date, STORED_DATE_FORMAT)
            .map(|d| d.format(DISPLAY_DATE_FORMAT).to_string())
            .unwrap_or_else(|_| self.date.clone())
    }

    pub async fn insert(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO entries (id, title, slug, date, time_spent, what_i_learned, sources_to_remember, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(&self.id)
        .bind(&self.title)
        .bind(&self.slug)
        .bind(&self.date)
        .bind(&self.time_spent)
        .bind(&self.what_i_learned)
        .bind(&self.sources_to_remember)
        .bind(&self.created_at)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn update(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE entries
            SET title = ?, slug = ?, date = ?, time_spent = ?, what_i_learned = ?, sources_to_remember = ?
            WHERE id = ?
            "#
        )
        .bind(&self.title)
        .bind(&self.slug)
        .bind(&self.date)
        .bind(&self.time_spent)
        .bind(&self.what_i_learned)
        .bind(&self.sources_to_remember)
        .bind(&self.id)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn delete(db: &SqlitePool, id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM entries WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// First entry (in insertion order) carrying this slug.
    pub async fn find_by_slug(db: &SqlitePool, slug: &str) -> Result<Option<Entry>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM entries WHERE slug = ? ORDER BY rowid LIMIT 1")
            .bind(slug)
            .fetch_optional(db)
            .await
    }

    pub async fn list(db: &SqlitePool, limit: i64) -> Result<Vec<Entry>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM entries ORDER BY rowid LIMIT ?")
            .bind(limit)
            .fetch_all(db)
            .await
    }

    pub async fn find_by_tag(db: &SqlitePool, tag_name: &str) -> Result<Vec<Entry>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT e.* FROM entries e
            JOIN entry_tags et ON et.entry_id = e.id
            JOIN tags t ON t.id = et.tag_id
            WHERE t.name = ?
            ORDER BY e.rowid
            "#
        )
        .bind(tag_name)
        .fetch_all(db)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(date: NaiveDate) -> Entry {
        Entry::new(
            "Title".to_string(),
            "title".to_string(),
            date,
            "1h".to_string(),
            String::new(),
            String::new(),
        )
    }

    #[test]
    fn date_is_stored_iso_and_displayed_day_first() {
        let entry = sample(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(entry.date, "2024-03-09");
        assert_eq!(entry.display_date(), "09-03-2024");
    }

    #[test]
    fn unparseable_stored_date_is_shown_as_is() {
        let mut entry = sample(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        entry.date = "someday".to_string();
        assert_eq!(entry.display_date(), "someday");
    }
}
