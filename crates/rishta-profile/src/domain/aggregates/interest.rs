//! Interest Aggregate
//!
//! A request from one member to another expressing interest in a match.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::events::{DomainEvent, InterestEvent};
use crate::domain::value_objects::UserId;

/// Interest aggregate root
#[derive(Clone, Debug)]
pub struct Interest {
    id: String,
    from_user: UserId,
    to_user: UserId,
    message: Option<String>,
    status: InterestStatus,
    created_at: DateTime<Utc>,
    responded_at: Option<DateTime<Utc>>,
    events: Vec<DomainEvent>,
}

impl Interest {
    /// Send a new interest (factory method)
    pub fn create(from_user: UserId, to_user: UserId, message: Option<String>) -> Result<Self, InterestError> {
        if from_user == to_user {
            return Err(InterestError::SelfInterest);
        }

        let now = Utc::now();
        let id = uuid::Uuid::new_v4().to_string();
        let message = message.map(|m| m.trim().to_string()).filter(|m| !m.is_empty());

        let mut interest = Self {
            id: id.clone(),
            from_user: from_user.clone(),
            to_user: to_user.clone(),
            message,
            status: InterestStatus::Pending,
            created_at: now,
            responded_at: None,
            events: vec![],
        };

        interest.raise_event(DomainEvent::Interest(InterestEvent::Sent {
            interest_id: id,
            from_user,
            to_user,
            sent_at: now,
        }));

        Ok(interest)
    }

    /// Rebuild from a backend snapshot without raising events
    pub fn restore(record: InterestRecord) -> Self {
        Self {
            id: record.id,
            from_user: record.from_user_id,
            to_user: record.to_user_id,
            message: record.message,
            status: record.status,
            created_at: record.created_at.unwrap_or_else(Utc::now),
            responded_at: record.responded_at,
            events: vec![],
        }
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn from_user(&self) -> &UserId { &self.from_user }
    pub fn to_user(&self) -> &UserId { &self.to_user }
    pub fn message(&self) -> Option<&str> { self.message.as_deref() }
    pub fn status(&self) -> InterestStatus { self.status }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn responded_at(&self) -> Option<DateTime<Utc>> { self.responded_at }

    /// Whether the given user received this interest
    pub fn is_incoming_for(&self, user: &UserId) -> bool {
        &self.to_user == user
    }

    /// Receiver accepts the interest
    pub fn accept(&mut self, by: &UserId) -> Result<(), InterestError> {
        self.respond(by, InterestStatus::Accepted)
    }

    /// Receiver declines the interest
    pub fn decline(&mut self, by: &UserId) -> Result<(), InterestError> {
        self.respond(by, InterestStatus::Declined)
    }

    /// Sender takes the interest back before it is answered
    pub fn withdraw(&mut self, by: &UserId) -> Result<(), InterestError> {
        if by != &self.from_user {
            return Err(InterestError::NotSender);
        }
        self.transition(InterestStatus::Withdrawn)
    }

    /// Serializable snapshot of the current state
    pub fn snapshot(&self) -> InterestRecord {
        InterestRecord {
            id: self.id.clone(),
            from_user_id: self.from_user.clone(),
            to_user_id: self.to_user.clone(),
            message: self.message.clone(),
            status: self.status,
            created_at: Some(self.created_at),
            responded_at: self.responded_at,
        }
    }

    /// Get and clear accumulated domain events
    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    fn respond(&mut self, by: &UserId, outcome: InterestStatus) -> Result<(), InterestError> {
        if by != &self.to_user {
            return Err(InterestError::NotReceiver);
        }
        self.transition(outcome)
    }

    fn transition(&mut self, to: InterestStatus) -> Result<(), InterestError> {
        if self.status != InterestStatus::Pending {
            return Err(InterestError::AlreadyResolved(self.status));
        }

        let now = Utc::now();
        self.status = to;
        self.responded_at = Some(now);

        self.raise_event(DomainEvent::Interest(InterestEvent::Resolved {
            interest_id: self.id.clone(),
            status: to,
            resolved_at: now,
        }));

        Ok(())
    }

    fn raise_event(&mut self, event: DomainEvent) {
        self.events.push(event);
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterestStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
    Withdrawn,
}

impl std::fmt::Display for InterestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Withdrawn => "withdrawn",
        };
        f.write_str(label)
    }
}

/// Wire representation of an interest
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestRecord {
    #[serde(alias = "_id")]
    pub id: String,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: InterestStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub responded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterestError {
    #[error("cannot send an interest to yourself")]
    SelfInterest,

    #[error("only the receiver can respond to an interest")]
    NotReceiver,

    #[error("only the sender can withdraw an interest")]
    NotSender,

    #[error("interest is already {0}")]
    AlreadyResolved(InterestStatus),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> (UserId, UserId) {
        (UserId::from_string("u-asha"), UserId::from_string("u-rohan"))
    }

    #[test]
    fn test_create_raises_sent_event() {
        let (asha, rohan) = users();
        let mut interest = Interest::create(asha, rohan, Some("  Hello!  ".into())).unwrap();
        assert_eq!(interest.status(), InterestStatus::Pending);
        assert_eq!(interest.message(), Some("Hello!"));

        let events = interest.take_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], DomainEvent::Interest(InterestEvent::Sent { .. })));
        assert!(interest.take_events().is_empty());
    }

    #[test]
    fn test_cannot_send_to_self() {
        let (asha, _) = users();
        assert_eq!(
            Interest::create(asha.clone(), asha, None).unwrap_err(),
            InterestError::SelfInterest
        );
    }

    #[test]
    fn test_receiver_accepts() {
        let (asha, rohan) = users();
        let mut interest = Interest::create(asha.clone(), rohan.clone(), None).unwrap();
        interest.take_events();

        assert_eq!(interest.accept(&asha), Err(InterestError::NotReceiver));
        interest.accept(&rohan).unwrap();
        assert_eq!(interest.status(), InterestStatus::Accepted);
        assert!(interest.responded_at().is_some());
        assert_eq!(interest.take_events().len(), 1);
    }

    #[test]
    fn test_resolved_interest_is_final() {
        let (asha, rohan) = users();
        let mut interest = Interest::create(asha.clone(), rohan.clone(), None).unwrap();
        interest.decline(&rohan).unwrap();

        assert_eq!(
            interest.accept(&rohan),
            Err(InterestError::AlreadyResolved(InterestStatus::Declined))
        );
        assert_eq!(
            interest.withdraw(&asha),
            Err(InterestError::AlreadyResolved(InterestStatus::Declined))
        );
    }

    #[test]
    fn test_only_sender_withdraws() {
        let (asha, rohan) = users();
        let mut interest = Interest::create(asha.clone(), rohan.clone(), None).unwrap();
        assert_eq!(interest.withdraw(&rohan), Err(InterestError::NotSender));
        interest.withdraw(&asha).unwrap();
        assert_eq!(interest.status(), InterestStatus::Withdrawn);
    }

    #[test]
    fn test_restore_from_record() {
        let record: InterestRecord = serde_json::from_value(serde_json::json!({
            "_id": "i-1",
            "fromUserId": "u-asha",
            "toUserId": "u-rohan",
            "status": "accepted"
        }))
        .unwrap();

        let mut interest = Interest::restore(record);
        assert_eq!(interest.id(), "i-1");
        assert_eq!(interest.status(), InterestStatus::Accepted);
        assert!(interest.take_events().is_empty());
        assert_eq!(interest.snapshot().to_user_id, UserId::from_string("u-rohan"));
    }
}
