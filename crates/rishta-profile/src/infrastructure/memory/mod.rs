//! In-memory API implementations for testing and offline development

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::{Mutex, RwLock};

use crate::domain::aggregates::{Interest, InterestError, InterestRecord, InterestStatus};
use crate::domain::schema::SectionDefinition;
use crate::domain::services::CandidateSummary;
use crate::domain::value_objects::{Phone, Record, UserId};
use crate::ports::outbound::{ApiError, Credentials, MatchApi, OtpVerifier, ProfileApi, VerificationReceipt};

fn not_found(what: &str) -> ApiError {
    ApiError::Rejected { status: 404, message: format!("{what} not found") }
}

/// In-memory profile backend
#[derive(Default)]
pub struct InMemoryProfileApi {
    schema: Vec<SectionDefinition>,
    users: RwLock<HashMap<UserId, Record>>,
    fail_next: Mutex<Option<ApiError>>,
    fail_verification: Mutex<Option<ApiError>>,
    delay: Mutex<Duration>,
    verifications: AtomicUsize,
}

impl InMemoryProfileApi {
    pub fn new(schema: Vec<SectionDefinition>) -> Self {
        Self { schema, ..Self::default() }
    }

    pub fn insert_user(&self, user_id: &UserId, record: Record) {
        self.users.write().insert(user_id.clone(), record);
    }

    pub fn user(&self, user_id: &UserId) -> Option<Record> {
        self.users.read().get(user_id).cloned()
    }

    /// Make the next call fail with `error`
    pub fn fail_next(&self, error: ApiError) {
        *self.fail_next.lock() = Some(error);
    }

    /// Make the next verification submission fail with `error`; other calls are unaffected
    pub fn fail_next_verification(&self, error: ApiError) {
        *self.fail_verification.lock() = Some(error);
    }

    /// Delay applied to every call made from now on
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    pub fn verification_count(&self) -> usize {
        self.verifications.load(Ordering::SeqCst)
    }

    async fn call(&self) -> Result<(), ApiError> {
        let failure = self.fail_next.lock().take();
        if let Some(error) = failure {
            return Err(error);
        }
        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileApi for InMemoryProfileApi {
    async fn fetch_schema(&self) -> Result<Vec<SectionDefinition>, ApiError> {
        self.call().await?;
        Ok(self.schema.clone())
    }

    async fn fetch_user(&self, user_id: &UserId) -> Result<Record, ApiError> {
        self.call().await?;
        self.user(user_id).ok_or_else(|| not_found("user"))
    }

    async fn update_user(&self, user_id: &UserId, payload: Record) -> Result<(), ApiError> {
        self.call().await?;
        let mut users = self.users.write();
        let record = users.get_mut(user_id).ok_or_else(|| not_found("user"))?;
        record.extend(payload);
        Ok(())
    }

    async fn submit_verification(&self, user_id: &UserId) -> Result<VerificationReceipt, ApiError> {
        self.call().await?;
        let failure = self.fail_verification.lock().take();
        if let Some(error) = failure {
            return Err(error);
        }
        let mut users = self.users.write();
        let record = users.get_mut(user_id).ok_or_else(|| not_found("user"))?;
        record.insert("verificationStatus".to_string(), "pending".into());
        self.verifications.fetch_add(1, Ordering::SeqCst);
        Ok(VerificationReceipt { status: "pending".to_string(), submitted_at: Some(Utc::now()) })
    }
}

/// In-memory match and interest backend
#[derive(Default)]
pub struct InMemoryMatchApi {
    candidates: RwLock<Vec<CandidateSummary>>,
    interests: RwLock<Vec<InterestRecord>>,
}

impl InMemoryMatchApi {
    pub fn new(candidates: Vec<CandidateSummary>) -> Self {
        Self { candidates: RwLock::new(candidates), ..Self::default() }
    }
}

#[async_trait]
impl MatchApi for InMemoryMatchApi {
    async fn list_candidates(&self) -> Result<Vec<CandidateSummary>, ApiError> {
        Ok(self.candidates.read().clone())
    }

    async fn send_interest(
        &self,
        from: &UserId,
        to: &UserId,
        message: Option<&str>,
    ) -> Result<InterestRecord, ApiError> {
        let mut interests = self.interests.write();
        let duplicate = interests.iter().any(|i| {
            &i.from_user_id == from && &i.to_user_id == to && i.status == InterestStatus::Pending
        });
        if duplicate {
            return Err(ApiError::Rejected { status: 409, message: "interest already sent".into() });
        }

        let interest = Interest::create(from.clone(), to.clone(), message.map(str::to_string))
            .map_err(conflict)?;
        let record = interest.snapshot();
        interests.push(record.clone());
        Ok(record)
    }

    async fn list_interests(&self, user_id: &UserId) -> Result<Vec<InterestRecord>, ApiError> {
        Ok(self
            .interests
            .read()
            .iter()
            .filter(|i| &i.from_user_id == user_id || &i.to_user_id == user_id)
            .cloned()
            .collect())
    }

    async fn respond_interest(&self, interest_id: &str, accept: bool) -> Result<InterestRecord, ApiError> {
        self.update_interest(interest_id, |interest| {
            let receiver = interest.to_user().clone();
            if accept {
                interest.accept(&receiver)
            } else {
                interest.decline(&receiver)
            }
        })
    }

    async fn withdraw_interest(&self, interest_id: &str) -> Result<InterestRecord, ApiError> {
        self.update_interest(interest_id, |interest| {
            let sender = interest.from_user().clone();
            interest.withdraw(&sender)
        })
    }
}

impl InMemoryMatchApi {
    /// Apply a transition as the party the backend would authenticate
    fn update_interest(
        &self,
        interest_id: &str,
        change: impl FnOnce(&mut Interest) -> Result<(), InterestError>,
    ) -> Result<InterestRecord, ApiError> {
        let mut interests = self.interests.write();
        let record = interests
            .iter_mut()
            .find(|i| i.id == interest_id)
            .ok_or_else(|| not_found("interest"))?;

        let mut interest = Interest::restore(record.clone());
        change(&mut interest).map_err(conflict)?;
        *record = interest.snapshot();
        Ok(record.clone())
    }
}

fn conflict(err: InterestError) -> ApiError {
    ApiError::Rejected { status: 409, message: err.to_string() }
}

/// Development stand-in that accepts a single fixed code
pub struct StaticOtpVerifier {
    code: String,
}

impl StaticOtpVerifier {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

#[async_trait]
impl OtpVerifier for StaticOtpVerifier {
    async fn request_code(&self, _phone: &Phone) -> Result<(), ApiError> {
        Ok(())
    }

    async fn verify_code(&self, phone: &Phone, code: &str) -> Result<Credentials, ApiError> {
        if code != self.code {
            return Err(ApiError::Rejected { status: 401, message: "invalid code".into() });
        }
        let digits = phone.to_e164().trim_start_matches('+').to_string();
        Ok(Credentials {
            user_id: UserId::from_string(format!("dev-{digits}")),
            token: uuid::Uuid::new_v4().to_string(),
        })
    }
}
