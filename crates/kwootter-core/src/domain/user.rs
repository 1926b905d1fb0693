use serde::{Deserialize, Serialize};

/// Author as published by the auth provider's user directory.
///
/// The application only ever reads users; the provider creates and updates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub profile_image_url: String,
}

impl User {
    pub fn new(
        id: impl Into<String>,
        username: impl Into<String>,
        profile_image_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            profile_image_url: profile_image_url.into(),
        }
    }
}
