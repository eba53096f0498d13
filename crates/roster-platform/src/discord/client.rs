//! Platform REST client implementing the MemberPlatform port

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, instrument, warn};

use roster_common::DiscordConfig;
use roster_core::entities::{ConversationContainer, PlatformMember};
use roster_core::traits::{MemberPlatform, RepoResult};
use roster_core::value_objects::Snowflake;

use crate::error::{error_from_response, PlatformError};

use super::models::{ApiMember, ApiRateLimit, ApiThreadList, ModifyMemberRoles};

/// Page size for member listing (API maximum)
const MEMBER_PAGE_SIZE: usize = 1000;
/// Page size for archived thread listing (API maximum)
const THREAD_PAGE_SIZE: usize = 100;
/// How many 429 responses to sit out before giving up on a request
const MAX_RATE_LIMIT_RETRIES: u32 = 3;
/// Upper bound on a single rate-limit wait
const MAX_RETRY_AFTER: f64 = 60.0;

/// Platform REST client bound to one community
#[derive(Clone)]
pub struct DiscordClient {
    http: Client,
    api_base: String,
    token: String,
    community_id: Snowflake,
}

impl DiscordClient {
    /// Create a client for the given community
    pub fn new(config: &DiscordConfig, community_id: Snowflake) -> Result<Self, PlatformError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("roster-sync (https://github.com, 0.1)")
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            community_id,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("Authorization", format!("Bot {}", self.token))
    }

    /// Send a request, sitting out rate limits
    async fn send<F>(&self, build: F) -> Result<Response, PlatformError>
    where
        F: Fn() -> RequestBuilder + Send + Sync,
    {
        for attempt in 1..=MAX_RATE_LIMIT_RETRIES {
            let response = self.authorized(build()).send().await?;
            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                return Ok(response);
            }

            let retry_after = response
                .json::<ApiRateLimit>()
                .await
                .map(|r| r.retry_after)
                .unwrap_or(1.0)
                .clamp(0.0, MAX_RETRY_AFTER);
            warn!(attempt, retry_after, "Rate limited by platform, waiting");
            tokio::time::sleep(Duration::from_secs_f64(retry_after)).await;
        }

        Err(PlatformError::RateLimited {
            attempts: MAX_RATE_LIMIT_RETRIES,
        })
    }

    async fn get_member(&self, member_id: Snowflake) -> Result<Option<ApiMember>, PlatformError> {
        let url = self.url(&format!(
            "/guilds/{}/members/{}",
            self.community_id, member_id
        ));
        let response = self.send(|| self.http.get(&url)).await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            _ => Err(error_from_response(response).await),
        }
    }

    async fn replace_roles(
        &self,
        member_id: Snowflake,
        roles: &[Snowflake],
    ) -> Result<(), PlatformError> {
        let url = self.url(&format!(
            "/guilds/{}/members/{}",
            self.community_id, member_id
        ));
        let body = ModifyMemberRoles { roles };
        let response = self.send(|| self.http.patch(&url).json(&body)).await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn list_members_paged(&self) -> Result<Vec<PlatformMember>, PlatformError> {
        let mut members = Vec::new();
        let mut after = Snowflake::default();

        loop {
            let url = self.url(&format!(
                "/guilds/{}/members?limit={}&after={}",
                self.community_id, MEMBER_PAGE_SIZE, after
            ));
            let response = self.send(|| self.http.get(&url)).await?;
            if !response.status().is_success() {
                return Err(error_from_response(response).await);
            }

            let page: Vec<ApiMember> = response.json().await?;
            let page_len = page.len();
            if let Some(last) = page.last() {
                after = last.user.id;
            }
            members.extend(page.into_iter().map(PlatformMember::from));

            if page_len < MEMBER_PAGE_SIZE {
                break;
            }
        }

        debug!(count = members.len(), "Listed community members");
        Ok(members)
    }

    async fn active_threads(&self) -> Result<ApiThreadList, PlatformError> {
        let url = self.url(&format!("/guilds/{}/threads/active", self.community_id));
        let response = self.send(|| self.http.get(&url)).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(response.json().await?)
    }

    async fn archived_private_threads(
        &self,
        channel_id: Snowflake,
    ) -> Result<Vec<ConversationContainer>, PlatformError> {
        let mut containers = Vec::new();
        let mut before: Option<String> = None;

        loop {
            let mut url = self.url(&format!(
                "/channels/{channel_id}/threads/archived/private?limit={THREAD_PAGE_SIZE}"
            ));
            if let Some(ts) = &before {
                url.push_str("&before=");
                url.push_str(ts);
            }

            let response = self.send(|| self.http.get(&url)).await?;
            if !response.status().is_success() {
                return Err(error_from_response(response).await);
            }

            let page: ApiThreadList = response.json().await?;
            let has_more = page.has_more;
            before = page
                .threads
                .last()
                .and_then(|t| t.thread_metadata.archive_timestamp.clone());
            containers.extend(page.threads.into_iter().map(ConversationContainer::from));

            if !has_more || before.is_none() {
                break;
            }
        }

        Ok(containers)
    }
}

/// Current roles plus `add`, or `None` if nothing would change
pub fn merge_roles(current: &[Snowflake], add: &[Snowflake]) -> Option<Vec<Snowflake>> {
    let missing: Vec<Snowflake> = add
        .iter()
        .copied()
        .filter(|id| !current.contains(id))
        .collect();
    if missing.is_empty() {
        return None;
    }
    let mut roles = current.to_vec();
    for id in missing {
        if !roles.contains(&id) {
            roles.push(id);
        }
    }
    Some(roles)
}

/// Current roles minus `remove`, or `None` if nothing would change
pub fn subtract_roles(current: &[Snowflake], remove: &[Snowflake]) -> Option<Vec<Snowflake>> {
    if !current.iter().any(|id| remove.contains(id)) {
        return None;
    }
    Some(
        current
            .iter()
            .copied()
            .filter(|id| !remove.contains(id))
            .collect(),
    )
}

#[async_trait]
impl MemberPlatform for DiscordClient {
    #[instrument(skip(self))]
    async fn fetch_member(&self, member_id: Snowflake) -> RepoResult<Option<PlatformMember>> {
        self.get_member(member_id)
            .await
            .map(|m| m.map(PlatformMember::from))
            .map_err(PlatformError::into_platform)
    }

    #[instrument(skip(self))]
    async fn list_members(&self) -> RepoResult<Vec<PlatformMember>> {
        self.list_members_paged()
            .await
            .map_err(PlatformError::into_platform)
    }

    #[instrument(skip(self))]
    async fn add_roles(&self, member_id: Snowflake, role_ids: &[Snowflake]) -> RepoResult<()> {
        let member = self
            .get_member(member_id)
            .await
            .map_err(PlatformError::into_platform)?
            .ok_or(roster_core::DomainError::MemberNotFound(member_id))?;

        match merge_roles(&member.roles, role_ids) {
            Some(roles) => self
                .replace_roles(member_id, &roles)
                .await
                .map_err(PlatformError::into_platform),
            None => Ok(()),
        }
    }

    #[instrument(skip(self))]
    async fn remove_roles(&self, member_id: Snowflake, role_ids: &[Snowflake]) -> RepoResult<()> {
        let member = self
            .get_member(member_id)
            .await
            .map_err(PlatformError::into_platform)?
            .ok_or(roster_core::DomainError::MemberNotFound(member_id))?;

        match subtract_roles(&member.roles, role_ids) {
            Some(roles) => self
                .replace_roles(member_id, &roles)
                .await
                .map_err(PlatformError::into_platform),
            None => Ok(()),
        }
    }

    #[instrument(skip(self, channel_ids), fields(channels = channel_ids.len()))]
    async fn list_review_conversations(
        &self,
        channel_ids: &[Snowflake],
    ) -> RepoResult<Vec<ConversationContainer>> {
        let active = self
            .active_threads()
            .await
            .map_err(PlatformError::into_platform)?;

        let mut containers: Vec<ConversationContainer> = active
            .threads
            .into_iter()
            .filter(|t| t.parent_id.is_some_and(|p| channel_ids.contains(&p)))
            .map(ConversationContainer::from)
            .collect();

        for channel_id in channel_ids {
            match self.archived_private_threads(*channel_id).await {
                Ok(archived) => containers.extend(archived),
                Err(e) => {
                    warn!(channel_id = %channel_id, error = %e, "Failed to list archived threads");
                }
            }
        }

        debug!(count = containers.len(), "Listed review conversations");
        Ok(containers)
    }
}
