use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use std::collections::HashMap;
use tower_sessions::Session;

use crate::auth::{authenticate, is_valid_email, login_user, logout_user, AuthUser, CurrentUser, Identity, BAD_CREDENTIALS};
use crate::error::AppError;
use crate::flash::{flash, take_flashes, Flash, FlashLevel};
use crate::AppState;

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    email: String,
    errors: HashMap<String, String>,
    flashes: Vec<Flash>,
    user: Option<CurrentUser>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

fn validate_login_form(form: &LoginForm) -> HashMap<String, String> {
    let mut errors = HashMap::new();

    if form.email.trim().is_empty() {
        errors.insert("email".to_string(), "Email is required".to_string());
    } else if !is_valid_email(form.email.trim()) {
        errors.insert("email".to_string(), "Invalid email address".to_string());
    }

    if form.password.is_empty() {
        errors.insert("password".to_string(), "Password is required".to_string());
    }

    errors
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login_submit))
        .route("/logout", get(logout))
}

async fn login_page(session: Session, identity: Identity) -> Result<impl IntoResponse, AppError> {
    let template = LoginTemplate {
        email: String::new(),
        errors: HashMap::new(),
        flashes: take_flashes(&session).await?,
        user: identity.into_user(),
    };
    Ok(Html(template.render()?))
}

async fn login_submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    let errors = validate_login_form(&form);
    let email = form.email.trim();

    if errors.is_empty() {
        if let Some(user) = authenticate(&state.db, email, &form.password).await? {
            login_user(&session, &user).await?;
            tracing::info!(id = %user.id, "user logged in");
            flash(&session, FlashLevel::Success, "You've been logged in!").await?;
            return Ok(Redirect::to("/").into_response());
        }
        flash(&session, FlashLevel::Error, BAD_CREDENTIALS).await?;
    }

    let template = LoginTemplate {
        email: email.to_string(),
        errors,
        flashes: take_flashes(&session).await?,
        user: None,
    };
    Ok(Html(template.render()?).into_response())
}

async fn logout(session: Session, AuthUser(user): AuthUser) -> Result<impl IntoResponse, AppError> {
    logout_user(&session).await?;
    tracing::info!(id = %user.id, "user logged out");
    flash(&session, FlashLevel::Success, "You've been logged out!").await?;
    Ok(Redirect::to("/"))
}
