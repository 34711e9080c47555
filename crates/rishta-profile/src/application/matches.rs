//! Match browsing and interest use cases

use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::info;

use crate::application::session::Session;
use crate::domain::aggregates::{Interest, InterestError, InterestRecord, InterestStatus};
use crate::domain::events::DomainEvent;
use crate::domain::services::{browse, CandidateSummary, MatchFilter, MatchSort};
use crate::domain::value_objects::UserId;
use crate::ports::outbound::{ApiError, MatchApi};

/// Match application service
pub struct MatchService {
    api: Arc<dyn MatchApi>,
}

impl MatchService {
    pub fn new(api: Arc<dyn MatchApi>) -> Self {
        Self { api }
    }

    /// Candidates passing `filter`, ordered by `sort`; the signed-in user is never listed
    pub async fn browse(
        &self,
        session: &Session,
        filter: &MatchFilter,
        sort: MatchSort,
        today: NaiveDate,
    ) -> Result<Vec<CandidateSummary>, MatchServiceError> {
        let candidates = self.api.list_candidates().await?;
        let others: Vec<CandidateSummary> = candidates
            .into_iter()
            .filter(|c| &c.id != session.user_id())
            .collect();
        Ok(browse(&others, filter, sort, today).into_iter().cloned().collect())
    }

    /// Send an interest; returns the stored record and the raised events
    pub async fn send_interest(
        &self,
        session: &Session,
        to: UserId,
        message: Option<String>,
    ) -> Result<(InterestRecord, Vec<DomainEvent>), MatchServiceError> {
        let mut interest = Interest::create(session.user_id().clone(), to, message)?;
        let record = self
            .api
            .send_interest(interest.from_user(), interest.to_user(), interest.message())
            .await?;

        info!(interest_id = %record.id, to = %record.to_user_id, "interest sent");
        Ok((record, interest.take_events()))
    }

    /// Interests sent or received by the signed-in user
    pub async fn interests(&self, session: &Session) -> Result<Vec<InterestRecord>, MatchServiceError> {
        Ok(self.api.list_interests(session.user_id()).await?)
    }

    /// Received interests still waiting for an answer
    pub async fn pending_incoming(&self, session: &Session) -> Result<Vec<InterestRecord>, MatchServiceError> {
        Ok(self
            .interests(session)
            .await?
            .into_iter()
            .filter(|record| {
                let interest = Interest::restore(record.clone());
                interest.is_incoming_for(session.user_id()) && interest.status() == InterestStatus::Pending
            })
            .collect())
    }

    /// Accept or decline a received interest
    pub async fn respond(
        &self,
        session: &Session,
        interest_id: &str,
        accept: bool,
    ) -> Result<(InterestRecord, Vec<DomainEvent>), MatchServiceError> {
        // Checked locally first so a bad transition never reaches the backend
        let mut interest = self.find(session, interest_id).await?;
        if accept {
            interest.accept(session.user_id())?;
        } else {
            interest.decline(session.user_id())?;
        }

        let stored = self.api.respond_interest(interest_id, accept).await?;
        info!(interest_id, status = %stored.status, "interest answered");
        Ok((stored, interest.take_events()))
    }

    /// Take back an interest the signed-in user sent
    pub async fn withdraw(
        &self,
        session: &Session,
        interest_id: &str,
    ) -> Result<(InterestRecord, Vec<DomainEvent>), MatchServiceError> {
        let mut interest = self.find(session, interest_id).await?;
        interest.withdraw(session.user_id())?;

        let stored = self.api.withdraw_interest(interest_id).await?;
        info!(interest_id, "interest withdrawn");
        Ok((stored, interest.take_events()))
    }

    async fn find(&self, session: &Session, interest_id: &str) -> Result<Interest, MatchServiceError> {
        self.interests(session)
            .await?
            .into_iter()
            .find(|i| i.id == interest_id)
            .map(Interest::restore)
            .ok_or_else(|| MatchServiceError::NotFound(interest_id.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchServiceError {
    #[error(transparent)]
    Domain(#[from] InterestError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("interest not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::InMemoryMatchApi;
    use serde_json::json;

    fn candidate(id: &str, dob: &str, city: &str) -> CandidateSummary {
        serde_json::from_value(json!({ "_id": id, "name": id, "dob": dob, "city": city })).unwrap()
    }

    fn setup() -> (MatchService, Session, Session) {
        let api = InMemoryMatchApi::new(vec![
            candidate("asha", "1995-02-01", "Pune"),
            candidate("rohan", "1992-07-15", "Mumbai"),
            candidate("meera", "1998-11-30", "pune"),
        ]);
        let service = MatchService::new(Arc::new(api));
        let asha = Session::resume(UserId::from_string("asha"), "t1");
        let rohan = Session::resume(UserId::from_string("rohan"), "t2");
        (service, asha, rohan)
    }

    #[tokio::test]
    async fn test_browse_excludes_self() {
        let (service, asha, _) = setup();
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let filter = MatchFilter { city: Some("PUNE".into()), ..MatchFilter::default() };

        let found = service.browse(&asha, &filter, MatchSort::AgeAsc, today).await.unwrap();
        let ids: Vec<&str> = found.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["meera"]);
    }

    #[tokio::test]
    async fn test_send_and_accept_interest() {
        let (service, asha, rohan) = setup();

        let (sent, events) = service
            .send_interest(&asha, UserId::from_string("rohan"), Some("Namaste".into()))
            .await
            .unwrap();
        assert_eq!(sent.status, InterestStatus::Pending);
        assert_eq!(sent.message.as_deref(), Some("Namaste"));
        assert_eq!(events.len(), 1);

        let (answered, events) = service.respond(&rohan, &sent.id, true).await.unwrap();
        assert_eq!(answered.status, InterestStatus::Accepted);
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn test_sender_cannot_answer_own_interest() {
        let (service, asha, _) = setup();
        let (sent, _) = service
            .send_interest(&asha, UserId::from_string("rohan"), None)
            .await
            .unwrap();

        let err = service.respond(&asha, &sent.id, true).await.unwrap_err();
        assert_eq!(err, MatchServiceError::Domain(InterestError::NotReceiver));
    }

    #[tokio::test]
    async fn test_respond_to_unknown_interest() {
        let (service, _, rohan) = setup();
        let err = service.respond(&rohan, "missing", false).await.unwrap_err();
        assert_eq!(err, MatchServiceError::NotFound("missing".into()));
    }

    #[tokio::test]
    async fn test_cannot_send_interest_to_self() {
        let (service, asha, _) = setup();
        let err = service
            .send_interest(&asha, UserId::from_string("asha"), None)
            .await
            .unwrap_err();
        assert_eq!(err, MatchServiceError::Domain(InterestError::SelfInterest));
    }

    #[tokio::test]
    async fn test_sender_withdraws_interest() {
        let (service, asha, rohan) = setup();
        let (sent, _) = service
            .send_interest(&asha, UserId::from_string("rohan"), None)
            .await
            .unwrap();
        assert_eq!(service.pending_incoming(&rohan).await.unwrap().len(), 1);
        assert!(service.pending_incoming(&asha).await.unwrap().is_empty());

        let err = service.withdraw(&rohan, &sent.id).await.unwrap_err();
        assert_eq!(err, MatchServiceError::Domain(InterestError::NotSender));

        let (withdrawn, events) = service.withdraw(&asha, &sent.id).await.unwrap();
        assert_eq!(withdrawn.status, InterestStatus::Withdrawn);
        assert_eq!(events.len(), 1);
        assert!(service.pending_incoming(&rohan).await.unwrap().is_empty());

        let err = service.respond(&rohan, &sent.id, true).await.unwrap_err();
        assert_eq!(err, MatchServiceError::Domain(InterestError::AlreadyResolved(InterestStatus::Withdrawn)));
    }
}
