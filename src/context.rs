//! Shared user list and the remote operations behind it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::Result;
use crate::types::{Draft, User};

/// Result envelope returned by create and update calls.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ApiMessage {
    pub ok: bool,
    #[serde(default)]
    pub message: String,
}

impl ApiMessage {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Remote user store.
#[async_trait]
pub trait UserApi: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>>;
    async fn create_user(&self, draft: &Draft) -> Result<ApiMessage>;
    async fn update_user(&self, draft: &Draft) -> Result<ApiMessage>;
}

/// Owns the authoritative user list and publishes every refresh to
/// subscribers.
pub struct UserContext<A> {
    api: A,
    users: watch::Sender<Vec<User>>,
}

impl<A: UserApi> UserContext<A> {
    pub fn new(api: A) -> Self {
        let (users, _) = watch::channel(Vec::new());
        Self { api, users }
    }

    #[cfg(test)]
    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn add_user(&self, draft: &Draft) -> Result<ApiMessage> {
        self.api.create_user(draft).await
    }

    pub async fn update_user(&self, draft: &Draft) -> Result<ApiMessage> {
        self.api.update_user(draft).await
    }

    /// Re-fetch the list and publish it.
    pub async fn get_users(&self) -> Result<()> {
        let users = self.api.list_users().await?;
        tracing::debug!(count = users.len(), "refreshed user list");
        self.users.send_replace(users);
        Ok(())
    }

    pub fn users(&self) -> Vec<User> {
        self.users.borrow().clone()
    }

    pub fn find(&self, id: &str) -> Option<User> {
        self.users.borrow().iter().find(|u| u.id.0 == id).cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<User>> {
        self.users.subscribe()
    }
}
