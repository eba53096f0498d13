//! Command service
//!
//! Member- and officer-invoked commands relayed from the platform: name
//! registration, info lookups, and review bookkeeping.

use roster_core::{validate_registered_name, DomainError, ReviewUpdate, Snowflake};
use tracing::{info, instrument};

use crate::dto::{MemberInfoResponse, MemberWithReview, ReviewSummary, SetNameResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Command service
pub struct CommandService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CommandService<'a> {
    /// Create a new CommandService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Register the invoking member's own name
    #[instrument(skip(self))]
    pub async fn set_name(
        &self,
        member_id: Snowflake,
        raw_name: &str,
    ) -> ServiceResult<SetNameResponse> {
        self.store_name(member_id, raw_name).await
    }

    /// Set another member's name; officers only
    #[instrument(skip(self, actor_roles))]
    pub async fn override_name(
        &self,
        actor_roles: &[Snowflake],
        target_id: Snowflake,
        raw_name: &str,
    ) -> ServiceResult<SetNameResponse> {
        self.ensure_authorized(actor_roles)?;
        let response = self.store_name(target_id, raw_name).await?;
        info!(target_id = %target_id, "Name overridden by officer");
        Ok(response)
    }

    /// Look up a tracked member; the requester must be tracked too
    #[instrument(skip(self))]
    pub async fn lookup_info(
        &self,
        requester_id: Snowflake,
        target_id: Snowflake,
    ) -> ServiceResult<MemberInfoResponse> {
        if !self.ctx.projection().contains(requester_id) {
            return Err(DomainError::NotAffiliated(requester_id).into());
        }

        let view = self
            .ctx
            .projection()
            .get(target_id)
            .ok_or_else(|| ServiceError::not_found("Member", target_id.to_string()))?;
        let review = self.ctx.records().review(target_id).await?;

        Ok(MemberInfoResponse::from(MemberWithReview { view, review }))
    }

    /// Update a tracked member's review data; officers only
    #[instrument(skip(self, actor_roles, update))]
    pub async fn update_review(
        &self,
        actor_roles: &[Snowflake],
        target_id: Snowflake,
        update: &ReviewUpdate,
    ) -> ServiceResult<ReviewSummary> {
        self.ensure_authorized(actor_roles)?;
        if update.is_empty() {
            return Err(ServiceError::validation("No review changes given"));
        }
        if !self.ctx.projection().contains(target_id) {
            return Err(DomainError::MemberNotTracked(target_id).into());
        }

        let review = self.ctx.records().update_review(target_id, update).await?;
        info!(
            target_id = %target_id,
            has_vod = review.has_vod,
            gear_checked = review.gear_checked,
            "Review updated"
        );
        Ok(ReviewSummary::from(&review))
    }

    fn ensure_authorized(&self, actor_roles: &[Snowflake]) -> ServiceResult<()> {
        if self.ctx.layout().is_authorized(actor_roles) {
            Ok(())
        } else {
            Err(DomainError::NotAuthorized.into())
        }
    }

    async fn store_name(
        &self,
        member_id: Snowflake,
        raw_name: &str,
    ) -> ServiceResult<SetNameResponse> {
        // Reject bad names before touching the store
        let name = validate_registered_name(raw_name).map_err(DomainError::from)?;

        let record = self
            .ctx
            .records()
            .fetch_one(member_id)
            .await
            .map_err(DomainError::from)?;
        if !record.as_ref().is_some_and(|r| r.has_affiliation()) {
            return Err(DomainError::NotAffiliated(member_id).into());
        }

        let name = self
            .ctx
            .records()
            .save_registered_name(member_id, &name)
            .await?;

        let outcome = self.ctx.projection().upsert(member_id).await;
        if outcome.changed() {
            self.ctx.exporter().request_export();
        }
        info!(member_id = %member_id, name = %name, "Registered name saved");

        Ok(SetNameResponse {
            member_id: member_id.to_string(),
            registered_name: name,
        })
    }
}
