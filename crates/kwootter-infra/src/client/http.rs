//! RPC client for a Kwootter API served over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use kwootter_core::domain::{Post, PostWithAuthor, User};
use kwootter_core::error::{ApiError, FieldErrors};
use kwootter_core::ports::{AuthSession, CreatePostInput, PostsApi, ProfileApi};
use kwootter_shared::dto::{CreatePostRequest, RPC_PREFIX, ops};
use kwootter_shared::{ApiResponse, ErrorResponse};

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Origin of the API server, e.g. `http://localhost:8080`.
    pub base_url: String,
    pub timeout: Duration,
}

/// [`PostsApi`] and [`ProfileApi`] over the `/api/trpc` transport.
pub struct HttpApiClient {
    client: Client,
    base_url: String,
}

impl HttpApiClient {
    pub fn new(config: HttpClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, op: &str) -> String {
        format!("{}{}/{}", self.base_url, RPC_PREFIX, op)
    }

    async fn query<T: DeserializeOwned>(
        &self,
        op: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        tracing::debug!(op, "RPC query");
        let response = self
            .client
            .get(self.url(op))
            .query(params)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        decode(response).await
    }

    async fn mutate<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        op: &str,
        body: &B,
        token: &str,
    ) -> Result<T, ApiError> {
        tracing::debug!(op, "RPC mutation");
        let response = self
            .client
            .post(self.url(op))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        decode(response).await
    }

    /// Single-user lookup where a 404 means "no such user".
    async fn find_user(&self, op: &str, params: &[(&str, &str)]) -> Result<Option<User>, ApiError> {
        match self.query(op, params).await {
            Ok(user) => Ok(Some(user)),
            Err(ApiError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Map a response envelope or problem document onto the operation result.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();

    if status.is_success() {
        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        return envelope
            .data
            .ok_or_else(|| ApiError::Internal("Response carried no data".to_string()));
    }

    let problem = response.json::<ErrorResponse>().await.ok();
    let detail = problem
        .as_ref()
        .and_then(|p| p.detail.clone())
        .unwrap_or_else(|| status.to_string());

    if let Some(fields) = problem.and_then(|p| p.field_errors) {
        return Err(ApiError::Validation(FieldErrors::from(fields)));
    }

    Err(match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        StatusCode::NOT_FOUND => ApiError::NotFound(detail),
        StatusCode::TOO_MANY_REQUESTS => ApiError::TooManyRequests,
        _ => ApiError::Internal(detail),
    })
}

#[async_trait]
impl PostsApi for HttpApiClient {
    async fn get_all(&self) -> Result<Vec<PostWithAuthor>, ApiError> {
        self.query(ops::POSTS_GET_ALL, &[]).await
    }

    async fn get_posts_by_user_id(&self, user_id: &str) -> Result<Vec<PostWithAuthor>, ApiError> {
        self.query(ops::POSTS_GET_BY_USER_ID, &[("userId", user_id)])
            .await
    }

    async fn create(
        &self,
        session: &AuthSession,
        input: CreatePostInput,
    ) -> Result<Post, ApiError> {
        let body = CreatePostRequest {
            content: input.content,
        };
        self.mutate(ops::POSTS_CREATE, &body, &session.token).await
    }
}

#[async_trait]
impl ProfileApi for HttpApiClient {
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        self.find_user(ops::PROFILE_GET_BY_USERNAME, &[("username", username)])
            .await
    }

    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>, ApiError> {
        self.find_user(ops::PROFILE_GET_BY_ID, &[("userId", user_id)])
            .await
    }
}
