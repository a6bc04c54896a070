use askama::Template;
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tower_sessions::Session;

use crate::auth::{AuthUser, CurrentUser};
use crate::error::AppError;
use crate::flash::{flash, take_flashes, Flash, FlashLevel};
use crate::journal::{self, EntryInput, TagLink, ENTRY_LIMIT};
use crate::models::Entry;
use crate::AppState;

#[derive(Template)]
#[template(path = "entries/list.html")]
pub(crate) struct EntryListTemplate {
    pub heading: String,
    pub entries: Vec<EntryView>,
    pub flashes: Vec<Flash>,
    pub user: Option<CurrentUser>,
}

#[derive(Template)]
#[template(path = "entries/detail.html")]
struct EntryDetailTemplate {
    entry: EntryView,
    flashes: Vec<Flash>,
    user: Option<CurrentUser>,
}

#[derive(Template)]
#[template(path = "entries/form.html")]
struct EntryFormTemplate {
    heading: &'static str,
    action: String,
    form: EntryForm,
    errors: HashMap<String, String>,
    flashes: Vec<Flash>,
    user: Option<CurrentUser>,
}

pub(crate) struct EntryView {
    pub entry: Entry,
    pub tags: Vec<TagLink>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryForm {
    #[serde(default)]
    title: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    time_spent: String,
    #[serde(default)]
    what_i_learned: String,
    #[serde(default)]
    sources_to_remember: String,
    #[serde(default)]
    tags: String,
}

impl EntryForm {
    fn from_entry(entry: &Entry, tags: String) -> Self {
        Self {
            title: entry.title.clone(),
            date: entry.display_date(),
            time_spent: entry.time_spent.clone(),
            what_i_learned: entry.what_i_learned.clone(),
            sources_to_remember: entry.sources_to_remember.clone(),
            tags,
        }
    }
}

fn validate_entry_form(form: &EntryForm) -> Result<EntryInput, HashMap<String, String>> {
    let mut errors = HashMap::new();

    if form.title.trim().is_empty() {
        errors.insert("title".to_string(), "Title is required".to_string());
    }

    let date = if form.date.trim().is_empty() {
        errors.insert("date".to_string(), "Date is required".to_string());
        None
    } else {
        let parsed = journal::parse_entry_date(&form.date);
        if parsed.is_none() {
            errors.insert("date".to_string(), "Date must be in dd-mm-yyyy format".to_string());
        }
        parsed
    };

    if form.time_spent.trim().is_empty() {
        errors.insert("time_spent".to_string(), "Time spent is required".to_string());
    }

    match date {
        Some(date) if errors.is_empty() => Ok(EntryInput {
            title: form.title.trim().to_string(),
            date,
            time_spent: form.time_spent.trim().to_string(),
            what_i_learned: form.what_i_learned.clone(),
            sources_to_remember: form.sources_to_remember.clone(),
            tags: form.tags.clone(),
        }),
        _ => Err(errors),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_entries))
        .route("/entry/add", get(new_entry_form).post(create_entry))
        .route("/entries/entries/{slug}", get(show_entry))
        .route("/entries/edit/{slug}", get(edit_entry_form).post(update_entry))
        .route("/entries/delete/{slug}", get(delete_entry))
}

/// Pair each entry with links for its tags.
pub(crate) async fn entry_views(db: &SqlitePool, entries: Vec<Entry>) -> Result<Vec<EntryView>, AppError> {
    let mut views = Vec::with_capacity(entries.len());
    for entry in entries {
        let tags = journal::list_tags_for_entry(db, &entry.id).await?;
        views.push(EntryView {
            tags: journal::tag_links(&tags),
            entry,
        });
    }
    Ok(views)
}

async fn list_entries(
    State(state): State<AppState>,
    session: Session,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let entries = journal::list_entries(&state.db, ENTRY_LIMIT).await?;

    let template = EntryListTemplate {
        heading: "Entries".to_string(),
        entries: entry_views(&state.db, entries).await?,
        flashes: take_flashes(&session).await?,
        user: Some(user),
    };
    Ok(Html(template.render()?))
}

async fn show_entry(
    State(state): State<AppState>,
    session: Session,
    AuthUser(user): AuthUser,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let entry = journal::find_entry(&state.db, &slug).await?;
    let tags = journal::list_tags_for_entry(&state.db, &entry.id).await?;

    let template = EntryDetailTemplate {
        entry: EntryView {
            tags: journal::tag_links(&tags),
            entry,
        },
        flashes: take_flashes(&session).await?,
        user: Some(user),
    };
    Ok(Html(template.render()?))
}

async fn new_entry_form(AuthUser(user): AuthUser) -> Result<impl IntoResponse, AppError> {
    let template = EntryFormTemplate {
        heading: "New entry",
        action: "/entry/add".to_string(),
        form: EntryForm::default(),
        errors: HashMap::new(),
        flashes: Vec::new(),
        user: Some(user),
    };
    Ok(Html(template.render()?))
}

async fn create_entry(
    State(state): State<AppState>,
    session: Session,
    AuthUser(user): AuthUser,
    Form(form): Form<EntryForm>,
) -> Result<impl IntoResponse, AppError> {
    let input = match validate_entry_form(&form) {
        Ok(input) => input,
        Err(errors) => {
            let template = EntryFormTemplate {
                heading: "New entry",
                action: "/entry/add".to_string(),
                form,
                errors,
                flashes: Vec::new(),
                user: Some(user),
            };
            return Ok(Html(template.render()?).into_response());
        }
    };

    journal::create_entry(&state.db, &input).await?;
    flash(&session, FlashLevel::Success, "Nice, the entry has been added").await?;

    Ok(Redirect::to("/").into_response())
}

async fn edit_entry_form(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let entry = journal::find_entry(&state.db, &slug).await?;
    let tags = journal::list_tags_for_entry(&state.db, &entry.id).await?;

    let template = EntryFormTemplate {
        heading: "Edit entry",
        action: format!("/entries/edit/{}", entry.slug),
        form: EntryForm::from_entry(&entry, journal::tags_string(&tags)),
        errors: HashMap::new(),
        flashes: Vec::new(),
        user: Some(user),
    };
    Ok(Html(template.render()?))
}

async fn update_entry(
    State(state): State<AppState>,
    session: Session,
    AuthUser(user): AuthUser,
    Path(slug): Path<String>,
    Form(form): Form<EntryForm>,
) -> Result<impl IntoResponse, AppError> {
    let entry = journal::find_entry(&state.db, &slug).await?;

    let input = match validate_entry_form(&form) {
        Ok(input) => input,
        Err(errors) => {
            let template = EntryFormTemplate {
                heading: "Edit entry",
                action: format!("/entries/edit/{}", entry.slug),
                form,
                errors,
                flashes: Vec::new(),
                user: Some(user),
            };
            return Ok(Html(template.render()?).into_response());
        }
    };

    let entry = journal::edit_entry(&state.db, &slug, &input).await?;
    flash(&session, FlashLevel::Success, "Nice, the entry has been updated").await?;

    Ok(Redirect::to(&format!("/entries/entries/{}", entry.slug)).into_response())
}

async fn delete_entry(
    State(state): State<AppState>,
    session: Session,
    AuthUser(_user): AuthUser,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    journal::delete_entry(&state.db, &slug).await?;
    flash(&session, FlashLevel::Success, "Nice, entry deleted").await?;

    Ok(Redirect::to("/"))
}
