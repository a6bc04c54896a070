use askama::Template;
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use tower_sessions::Session;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::flash::take_flashes;
use crate::journal;
use crate::routes::entries::{entry_views, EntryListTemplate};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/entries/tag/{tag}", get(show_tag))
}

/// Entries carrying a tag. The path segment arrives percent-decoded.
async fn show_tag(
    State(state): State<AppState>,
    session: Session,
    AuthUser(user): AuthUser,
    Path(tag): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let entries = journal::find_entries_by_tag(&state.db, &tag).await?;
    tracing::debug!(tag = %tag, count = entries.len(), "filtered entries by tag");

    let template = EntryListTemplate {
        heading: format!("Entries tagged \"{tag}\""),
        entries: entry_views(&state.db, entries).await?,
        flashes: take_flashes(&session).await?,
        user: Some(user),
    };
    Ok(Html(template.render()?))
}
