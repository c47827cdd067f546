use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use url::Url;

use crate::context::{ApiMessage, UserApi};
use crate::error::{Result, UsersError};
use crate::types::{Draft, User};

pub struct ApiClient {
    http: Client,
    base: Url,
    token: Option<String>,
}

/// Accepts both a bare array and an object wrapping it.
#[derive(Deserialize)]
#[serde(untagged)]
enum UsersResponse {
    List(Vec<User>),
    Wrapped { users: Vec<User> },
}

impl From<UsersResponse> for Vec<User> {
    fn from(response: UsersResponse) -> Self {
        match response {
            UsersResponse::List(users) | UsersResponse::Wrapped { users } => users,
        }
    }
}

impl ApiClient {
    pub fn new(base: Url, token: Option<String>) -> Self {
        Self {
            http: Client::new(),
            base,
            token,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|_| UsersError::InvalidUrl(format!("{}{path}", self.base)))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send_draft(&self, request: RequestBuilder, draft: &Draft) -> Result<ApiMessage> {
        let response = self
            .authorized(request)
            .header("Content-Type", "application/json")
            .json(draft)
            .send()
            .await?;

        read_message(response).await
    }
}

/// Turn a create/update response into an [`ApiMessage`]. Non-2xx responses
/// become a failed message carrying the server's explanation.
async fn read_message(response: Response) -> Result<ApiMessage> {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read response body>".to_string());
    tracing::debug!(status = status.as_u16(), "API response");

    Ok(message_from_body(status.is_success(), &body))
}

/// Create/update reply as the server may send it; either key can be absent.
#[derive(Deserialize)]
struct Envelope {
    ok: Option<bool>,
    message: Option<String>,
}

/// The HTTP status decides when the body does not say `ok`. A body without
/// a `message` key is shown as is.
fn message_from_body(success: bool, body: &str) -> ApiMessage {
    let (ok, message) = match serde_json::from_str::<Envelope>(body) {
        Ok(Envelope {
            ok,
            message: Some(message),
        }) => (ok.unwrap_or(success), message),
        Ok(Envelope { ok, message: None }) => (ok.unwrap_or(success), body.trim().to_string()),
        Err(_) => (success, body.trim().to_string()),
    };

    ApiMessage {
        ok: ok && success,
        message,
    }
}

#[async_trait]
impl UserApi for ApiClient {
    async fn list_users(&self) -> Result<Vec<User>> {
        let url = self.endpoint("users")?;
        tracing::debug!(%url, "GET users");

        let response = self.authorized(self.http.get(url)).send().await?;

        if !response.status().is_success() {
            return Err(UsersError::ApiError {
                status: response.status().as_u16(),
                message: response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<failed to read response body>".to_string()),
            });
        }

        let users: UsersResponse = response.json().await?;
        Ok(users.into())
    }

    async fn create_user(&self, draft: &Draft) -> Result<ApiMessage> {
        let url = self.endpoint("users")?;
        tracing::debug!(%url, "POST user");
        self.send_draft(self.http.post(url), draft).await
    }

    async fn update_user(&self, draft: &Draft) -> Result<ApiMessage> {
        let id = draft
            .id
            .as_ref()
            .ok_or_else(|| UsersError::UserNotFound("<missing id>".to_string()))?;
        let url = self.endpoint(&format!("users/{id}"))?;
        tracing::debug!(%url, "PUT user");
        self.send_draft(self.http.put(url), draft).await
    }
}
