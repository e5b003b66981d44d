use std::sync::Arc;

use crate::error::{ReviewError, ReviewResult};
use crate::models::{PullRequestShort, SetIsActiveRequest, User, UserReviews};
use crate::repository::{PullRequestRepository, UnitOfWork, UserRepository, transact};

pub struct UserService<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserService<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Toggles the activity flag. Existing review assignments are kept.
    #[tracing::instrument(skip(self))]
    pub async fn set_is_active(&self, request: SetIsActiveRequest) -> ReviewResult<User> {
        let SetIsActiveRequest { user_id, is_active } = request;

        transact(self.uow.as_ref(), |tx| {
            Box::pin(async move {
                let mut user = tx
                    .get_user(&user_id)
                    .await?
                    .ok_or_else(|| ReviewError::user_not_found(&user_id))?;
                user.is_active = is_active;
                tx.update_user(&user).await?;
                Ok(user)
            })
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_reviews(&self, user_id: &str) -> ReviewResult<UserReviews> {
        let user_id = user_id.to_string();

        transact(self.uow.as_ref(), |tx| {
            Box::pin(async move {
                if tx.get_user(&user_id).await?.is_none() {
                    return Err(ReviewError::user_not_found(&user_id));
                }
                let pull_requests = tx
                    .get_assigned_to_user(&user_id)
                    .await?
                    .into_iter()
                    .map(PullRequestShort::from)
                    .collect();
                Ok(UserReviews {
                    user_id,
                    pull_requests,
                })
            })
        })
        .await
    }
}
