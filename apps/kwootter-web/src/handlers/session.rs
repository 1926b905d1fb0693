//! Built-in sign-in for development: issues a session cookie for a directory user,
//! registering the username first when the directory is served in process.

use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use kwootter_core::domain::User;
use kwootter_core::error::{ApiError, RepoError};
use kwootter_core::ports::BaseRepository;
use kwootter_shared::dto::ops;

use crate::middleware::auth::SESSION_COOKIE;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::views::{document, escape, page_layout};

use super::html;

#[derive(Debug, Deserialize)]
pub struct SignInQuery {
    pub username: Option<String>,
    pub redirect_url: Option<String>,
}

const INVALID_USERNAME: &str = "Usernames use 1 to 32 letters, digits or underscores";

/// Only same-site paths are followed after sign-in. Browsers read `/\` like `//`.
fn safe_redirect(url: Option<&str>) -> String {
    match url {
        Some(url) if url.starts_with('/') && !url[1..].starts_with(['/', '\\']) => url.to_string(),
        _ => "/".to_string(),
    }
}

/// Usernames end up in profile paths.
fn valid_username(username: &str) -> bool {
    (1..=32).contains(&username.len())
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Look the username up, adding it to the in-process directory when it is new.
async fn find_or_register(state: &AppState, username: &str) -> AppResult<Option<User>> {
    if let Some(user) = state.backend.profiles.get_user_by_username(username).await? {
        return Ok(Some(user));
    }
    let Some(directory) = &state.backend.directory else {
        return Ok(None);
    };

    let user = User::new(
        format!("user_{}", Uuid::new_v4().simple()),
        username,
        state.site.dev_avatar_url.as_str(),
    );
    let user = match directory.save(user).await {
        Ok(user) => user,
        // Registered concurrently under another id.
        Err(RepoError::Constraint(_)) => {
            return Ok(state.backend.profiles.get_user_by_username(username).await?);
        }
        Err(e) => return Err(ApiError::from(e).into()),
    };

    // Earlier lookups may have cached the username as unknown.
    state.queries.invalidate_scope(ops::PROFILE_SCOPE).await;
    tracing::info!(user_id = %user.id, %username, "Registered directory user");
    Ok(Some(user))
}

fn sign_in_form(redirect_url: &str, error: Option<&str>) -> String {
    let error = error
        .map(|e| format!(r#"<p class="toast toast-error" role="alert">{}</p>"#, escape(e)))
        .unwrap_or_default();

    document(
        "Sign in",
        &page_layout(&format!(
            concat!(
                r#"<div class="compose-bar">{error}<form method="get" action="/sign-in" class="compose-form">"#,
                r#"<input type="text" name="username" placeholder="Username" autocomplete="username">"#,
                r#"<input type="hidden" name="redirect_url" value="{redirect}">"#,
                r#"<button type="submit" class="compose-submit">Sign in</button></form></div>"#
            ),
            error = error,
            redirect = escape(redirect_url),
        )),
    )
}

/// GET /sign-in?username=&redirect_url=
pub async fn sign_in(
    state: web::Data<AppState>,
    query: web::Query<SignInQuery>,
) -> AppResult<HttpResponse> {
    if !state.site.dev_sign_in {
        return Err(AppError::NotFound("Sign-in is handled by the auth provider".to_string()));
    }

    let redirect = safe_redirect(query.redirect_url.as_deref());
    let Some(username) = query
        .username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
    else {
        return Ok(html(StatusCode::OK, sign_in_form(&redirect, None)));
    };

    if !valid_username(username) {
        return Ok(html(
            StatusCode::UNPROCESSABLE_ENTITY,
            sign_in_form(&redirect, Some(INVALID_USERNAME)),
        ));
    }

    let Some(user) = find_or_register(&state, username).await? else {
        return Ok(html(
            StatusCode::NOT_FOUND,
            sign_in_form(&redirect, Some("No user with that username")),
        ));
    };

    let token = state
        .tokens
        .generate_token(&user.id)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let cookie = Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(state.tokens.expiration_seconds()))
        .finish();

    tracing::info!(user_id = %user.id, "Session issued");

    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, redirect))
        .cookie(cookie)
        .finish())
}

/// GET /sign-out
pub async fn sign_out() -> HttpResponse {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();

    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/"))
        .cookie(cookie)
        .finish()
}
