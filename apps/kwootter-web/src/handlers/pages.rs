//! Page routes.

use actix_web::http::{StatusCode, header};
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use chrono::Utc;
use serde::Deserialize;

use kwootter_shared::ApiResponse;

use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::pages::home::{HomePage, Viewer, sign_in_href};
use crate::pages::profile::{ParamValue, ProfilePage, ProfileProps};
use crate::pages::{PageBuildError, post};
use crate::state::AppState;
use crate::views::{ComposeWidget, SOMETHING_WENT_WRONG, document, page_layout};

use super::html;

/// GET /
pub async fn home(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
) -> HttpResponse {
    let viewer = match identity.0 {
        Some(identity) => {
            Viewer::signed_in(state.queries.as_ref(), &identity.user_id, ComposeWidget::new()).await
        }
        None => Viewer::signed_out(&state.site.sign_in_url, req.path()),
    };

    let page = HomePage::load(state.queries.as_ref(), viewer).await;
    html(StatusCode::OK, page.render(Utc::now()))
}

#[derive(Debug, Deserialize)]
pub struct ComposeForm {
    #[serde(default)]
    pub content: String,
}

/// POST / - the composer's submit.
///
/// Success (and an empty submit) redirects back to the feed. A failure re-renders the home page
/// with the input kept and the error raised.
pub async fn submit_post(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    form: web::Form<ComposeForm>,
) -> HttpResponse {
    let Some(identity) = identity.0 else {
        return see_other(&sign_in_href(&state.site.sign_in_url, "/"));
    };

    let mut compose = ComposeWidget::with_input(form.into_inner().content);
    let outcome = compose
        .submit(&identity.session(), state.queries.as_ref(), state.queries.as_ref())
        .await;

    match outcome {
        None | Some(Ok(_)) => see_other("/"),
        Some(Err(e)) => {
            let status = AppError::from(e).status_code();
            let viewer = Viewer::signed_in(state.queries.as_ref(), &identity.user_id, compose).await;
            let page = HomePage::load(state.queries.as_ref(), viewer).await;
            html(status, page.render(Utc::now()))
        }
    }
}

/// GET /{slug}
pub async fn profile(
    req: HttpRequest,
    state: web::Data<AppState>,
    slug: web::Path<String>,
) -> HttpResponse {
    let slug = ParamValue::Single(slug.into_inner());
    let props = state
        .static_props
        .get_or_build(
            req.path(),
            |props: &ProfileProps| props.user.is_some(),
            || ProfileProps::build(Some(&slug), state.backend.profiles.as_ref()),
        )
        .await;

    match props {
        Ok(props) => {
            let page = ProfilePage::load(props, state.queries.as_ref()).await;
            let status = if page.is_found() {
                StatusCode::OK
            } else {
                StatusCode::NOT_FOUND
            };
            html(status, page.render(Utc::now()))
        }
        Err(PageBuildError::Prefetch(e)) => {
            tracing::warn!(path = %req.path(), error = %e, "Profile prefetch failed");
            let body = format!(r#"<div class="feed-error">{SOMETHING_WENT_WRONG}</div>"#);
            html(
                AppError::from(e).status_code(),
                document("Kwootter", &page_layout(&body)),
            )
        }
        Err(e) => {
            tracing::error!(path = %req.path(), error = %e, "Profile page build failed");
            html(
                StatusCode::INTERNAL_SERVER_ERROR,
                document("Error", "<div>500</div>"),
            )
        }
    }
}

/// GET /post/{id}
pub async fn post_page(_id: web::Path<String>) -> HttpResponse {
    html(StatusCode::OK, post::render())
}

#[derive(Debug, Deserialize)]
pub struct RevalidateQuery {
    pub path: String,
}

/// POST /api/revalidate?path= - drop a page's stored props.
pub async fn revalidate(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<RevalidateQuery>,
) -> AppResult<HttpResponse> {
    let Some(secret) = state.site.revalidate_secret.as_deref() else {
        return Err(AppError::NotFound("Revalidation is disabled".to_string()));
    };

    let provided = req
        .headers()
        .get("x-revalidate-secret")
        .and_then(|v| v.to_str().ok());
    if provided != Some(secret) {
        return Err(AppError::Unauthorized);
    }

    let revalidated = state.static_props.revalidate(&query.path).await;
    tracing::info!(path = %query.path, revalidated, "Static props revalidated");

    Ok(HttpResponse::Ok().json(ApiResponse::ok(serde_json::json!({ "revalidated": revalidated }))))
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}
