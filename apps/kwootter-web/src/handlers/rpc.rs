//! RPC endpoints under `/api/trpc/{operation}`.
//!
//! Queries take their input from the query string, mutations from a JSON body. Results are
//! wrapped in [`ApiResponse`]; failures are RFC 7807 documents.

use actix_web::{HttpResponse, web};

use kwootter_core::ports::{CreatePostInput, QueryInvalidation};
use kwootter_shared::ApiResponse;
use kwootter_shared::dto::{CreatePostRequest, UserIdInput, UsernameInput};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::observability::RequestId;
use crate::state::AppState;

/// GET /api/trpc/posts.getAll
pub async fn get_all(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.backend.posts.get_all().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts)))
}

/// GET /api/trpc/posts.getPostByUserId?userId=
pub async fn get_posts_by_user_id(
    state: web::Data<AppState>,
    input: web::Query<UserIdInput>,
) -> AppResult<HttpResponse> {
    let posts = state.backend.posts.get_posts_by_user_id(&input.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts)))
}

/// POST /api/trpc/posts.create
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    request_id: RequestId,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let input = CreatePostInput::new(body.into_inner().content);
    let post = state.backend.posts.create(&identity.session(), input).await?;

    // Pages served by this process read through the query cache.
    state.queries.invalidate_posts().await;

    tracing::info!(
        request_id = %request_id.as_str(),
        post_id = %post.id,
        author_id = %post.author_id,
        "Post created"
    );

    Ok(HttpResponse::Created().json(ApiResponse::ok(post)))
}

/// GET /api/trpc/profile.getUserByUsername?username=
pub async fn get_user_by_username(
    state: web::Data<AppState>,
    input: web::Query<UsernameInput>,
) -> AppResult<HttpResponse> {
    let user = state
        .backend
        .profiles
        .get_user_by_username(&input.username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(user)))
}

/// GET /api/trpc/profile.getUserById?userId=
pub async fn get_user_by_id(
    state: web::Data<AppState>,
    input: web::Query<UserIdInput>,
) -> AppResult<HttpResponse> {
    let user = state
        .backend
        .profiles
        .get_user_by_id(&input.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(user)))
}
