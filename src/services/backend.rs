//! Study backend REST client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    error::BackendError,
    state::{FocusSession, NewFocusSession, UserStudyAggregate, UserUpdate},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Remote collaborator that owns focus sessions and user totals
#[async_trait]
pub trait StudyBackend: Send + Sync {
    /// Record a focus session, returning the stored record
    async fn create_session(&self, session: NewFocusSession) -> Result<FocusSession, BackendError>;

    /// Apply a partial update to the signed-in user, returning the updated user
    async fn update_user(&self, update: UserUpdate) -> Result<UserStudyAggregate, BackendError>;

    /// Fetch the signed-in user
    async fn current_user(&self) -> Result<UserStudyAggregate, BackendError>;
}

/// `StudyBackend` over HTTP with bearer-token auth
pub struct HttpBackend {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, BackendError> {
        match &self.token {
            Some(token) => Ok(request.bearer_auth(token)),
            None => Err(BackendError::NotAuthenticated),
        }
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl StudyBackend for HttpBackend {
    async fn create_session(&self, session: NewFocusSession) -> Result<FocusSession, BackendError> {
        debug!("Creating focus session of {} minutes", session.duration_minutes);

        let request = self.authorized(self.client.post(self.url("/sessions")))?;
        let response = request.json(&session).send().await?;
        Self::parse(response).await
    }

    async fn update_user(&self, update: UserUpdate) -> Result<UserStudyAggregate, BackendError> {
        debug!("Updating user: xp={}, totalHours={:.2}", update.xp, update.study_stats.total_hours);

        let request = self.authorized(self.client.put(self.url("/auth/profile")))?;
        let response = request.json(&update).send().await?;
        Self::parse(response).await
    }

    async fn current_user(&self) -> Result<UserStudyAggregate, BackendError> {
        let request = self.authorized(self.client.get(self.url("/auth/me")))?;
        let response = request.send().await?;
        Self::parse(response).await
    }
}
