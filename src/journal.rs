//! Entries and their tags.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use sqlx::{SqliteConnection, SqlitePool};
use deunicode::deunicode;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::AppError;
use crate::models::entry::{DISPLAY_DATE_FORMAT, STORED_DATE_FORMAT};
use crate::models::{Entry, EntryTag, Tag};

/// Most entries shown on the index page.
pub const ENTRY_LIMIT: i64 = 100;

const UNTITLED_SLUG: &str = "untitled";

/// Everything except unreserved characters is escaped in a tag path segment.
const TAG_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A validated entry form.
#[derive(Debug, Clone)]
pub struct EntryInput {
    pub title: String,
    pub date: NaiveDate,
    pub time_spent: String,
    pub what_i_learned: String,
    pub sources_to_remember: String,
    /// Comma separated tag names.
    pub tags: String,
}

/// A tag rendered as a link to its filter page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagLink {
    pub name: String,
    pub href: String,
}

/// Lowercase ASCII slug: the title is transliterated to ASCII, alphanumerics are
/// kept and any other run collapses to `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::new();
    let mut last_was_dash = false;

    for ch in deunicode(title).chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_dash = false;
        } else if ch.is_ascii() && !slug.is_empty() && !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        UNTITLED_SLUG.to_string()
    } else {
        slug
    }
}

/// Split a comma separated tag field. Tokens are trimmed but empty ones are kept.
pub fn split_tags(tags: &str) -> Vec<&str> {
    tags.split(',').map(str::trim).collect()
}

/// Parse a `dd-mm-yyyy` date.
pub fn parse_entry_date(input: &str) -> Option<NaiveDate> {
    lazy_static! {
        static ref DATE_RE: Regex = Regex::new(r"^\d{2}-\d{2}-\d{4}$").unwrap();
    }
    let input = input.trim();
    if !DATE_RE.is_match(input) {
        return None;
    }
    NaiveDate::parse_from_str(input, DISPLAY_DATE_FORMAT).ok()
}

pub fn tag_href(name: &str) -> String {
    format!("/entries/tag/{}", utf8_percent_encode(name, TAG_SEGMENT))
}

pub fn tag_links(tags: &[Tag]) -> Vec<TagLink> {
    tags.iter()
        .map(|tag| TagLink {
            name: tag.name.clone(),
            href: tag_href(&tag.name),
        })
        .collect()
}

/// Tag names joined for the edit form.
pub fn tags_string(tags: &[Tag]) -> String {
    tags.iter().map(|t| t.name.as_str()).collect::<Vec<_>>().join(", ")
}

async fn attach_tags(conn: &mut SqliteConnection, entry_id: &str, tags: &str) -> Result<(), sqlx::Error> {
    for name in split_tags(tags) {
        let tag = Tag::get_or_create(&mut *conn, name).await?;
        EntryTag::get_or_create(&mut *conn, entry_id, &tag.id).await?;
    }
    Ok(())
}

pub async fn create_entry(db: &SqlitePool, input: &EntryInput) -> Result<Entry, AppError> {
    let entry = Entry::new(
        input.title.clone(),
        slugify(&input.title),
        input.date,
        input.time_spent.clone(),
        input.what_i_learned.clone(),
        input.sources_to_remember.clone(),
    );

    let mut tx = db.begin().await?;
    entry.insert(&mut *tx).await?;
    attach_tags(&mut *tx, &entry.id, &input.tags).await?;
    tx.commit().await?;

    tracing::info!(id = %entry.id, slug = %entry.slug, "entry created");
    Ok(entry)
}

/// Overwrite an entry's fields and add any new tags. Existing tag links are kept.
pub async fn edit_entry(db: &SqlitePool, slug: &str, input: &EntryInput) -> Result<Entry, AppError> {
    let mut entry = Entry::find_by_slug(db, slug).await?.ok_or(AppError::NotFound)?;

    entry.title = input.title.clone();
    entry.slug = slugify(&input.title);
    entry.date = input.date.format(STORED_DATE_FORMAT).to_string();
    entry.time_spent = input.time_spent.clone();
    entry.what_i_learned = input.what_i_learned.clone();
    entry.sources_to_remember = input.sources_to_remember.clone();

    let mut tx = db.begin().await?;
    entry.update(&mut *tx).await?;
    attach_tags(&mut *tx, &entry.id, &input.tags).await?;
    tx.commit().await?;

    tracing::info!(id = %entry.id, old_slug = slug, slug = %entry.slug, "entry updated");
    Ok(entry)
}

/// Delete the entry row. Its tag links are left in place.
pub async fn delete_entry(db: &SqlitePool, slug: &str) -> Result<(), AppError> {
    let entry = Entry::find_by_slug(db, slug).await?.ok_or(AppError::NotFound)?;
    Entry::delete(db, &entry.id).await?;
    tracing::info!(id = %entry.id, slug, "entry deleted");
    Ok(())
}

pub async fn find_entry(db: &SqlitePool, slug: &str) -> Result<Entry, AppError> {
    Entry::find_by_slug(db, slug).await?.ok_or(AppError::NotFound)
}

pub async fn list_tags_for_entry(db: &SqlitePool, entry_id: &str) -> Result<Vec<Tag>, AppError> {
    Ok(Tag::for_entry(db, entry_id).await?)
}

pub async fn list_entries(db: &SqlitePool, limit: i64) -> Result<Vec<Entry>, AppError> {
    Ok(Entry::list(db, limit).await?)
}

pub async fn find_entries_by_tag(db: &SqlitePool, tag_name: &str) -> Result<Vec<Entry>, AppError> {
    Ok(Entry::find_by_tag(db, tag_name).await?)
}
