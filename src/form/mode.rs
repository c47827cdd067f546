use async_trait::async_trait;

use crate::context::{ApiMessage, UserApi, UserContext};
use crate::error::Result;
use crate::types::{Draft, User};

/// What distinguishes one form from another: where its draft starts and
/// which remote call saves it.
#[async_trait]
pub trait FormMode: Send + Sync {
    fn initial_draft(&self) -> Draft;

    async fn persist<A: UserApi>(&self, ctx: &UserContext<A>, draft: &Draft)
        -> Result<ApiMessage>;

    /// Whether the form follows a stored record while open.
    fn tracks_record(&self) -> bool {
        false
    }

    /// Pick up a new version of the tracked record. Returns true when the
    /// record changed and the draft should be reset.
    fn resync(&mut self, _users: &[User]) -> bool {
        false
    }
}

#[derive(Debug, Default, Clone)]
pub struct CreateMode;

#[async_trait]
impl FormMode for CreateMode {
    fn initial_draft(&self) -> Draft {
        Draft::default()
    }

    async fn persist<A: UserApi>(
        &self,
        ctx: &UserContext<A>,
        draft: &Draft,
    ) -> Result<ApiMessage> {
        ctx.add_user(draft).await
    }
}

#[derive(Debug, Clone)]
pub struct UpdateMode {
    user: User,
}

impl UpdateMode {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    #[cfg(test)]
    pub fn user(&self) -> &User {
        &self.user
    }
}

#[async_trait]
impl FormMode for UpdateMode {
    fn initial_draft(&self) -> Draft {
        Draft::from(&self.user)
    }

    async fn persist<A: UserApi>(
        &self,
        ctx: &UserContext<A>,
        draft: &Draft,
    ) -> Result<ApiMessage> {
        ctx.update_user(draft).await
    }

    fn tracks_record(&self) -> bool {
        true
    }

    fn resync(&mut self, users: &[User]) -> bool {
        match users.iter().find(|u| u.id == self.user.id) {
            Some(current) if *current != self.user => {
                self.user = current.clone();
                true
            }
            _ => false,
        }
    }
}
