//! HTTP adapter for the remote Rishta API

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::domain::aggregates::InterestRecord;
use crate::domain::schema::SectionDefinition;
use crate::domain::services::CandidateSummary;
use crate::domain::value_objects::{Phone, Record, UserId};
use crate::ports::outbound::{ApiError, Credentials, MatchApi, OtpVerifier, ProfileApi, VerificationReceipt};

/// Standard response envelope: `{ success, message, data }`
#[derive(Debug, Default, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl Envelope {
    /// Decode the `data` member
    pub fn data<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let data = self.data.ok_or_else(|| ApiError::Malformed("no data in response".into()))?;
        serde_json::from_value(data).map_err(|e| ApiError::Malformed(e.to_string()))
    }
}

/// Turn a status line and body into an envelope or the matching error
pub fn decode_envelope(status: StatusCode, body: &str) -> Result<Envelope, ApiError> {
    let parsed = if body.trim().is_empty() {
        Ok(Envelope::default())
    } else {
        serde_json::from_str::<Envelope>(body)
    };

    if !status.is_success() {
        let message = match &parsed {
            Ok(Envelope { message: Some(message), .. }) => message.clone(),
            _ if !body.trim().is_empty() => body.trim().to_string(),
            _ => status.to_string(),
        };
        return Err(ApiError::Rejected { status: status.as_u16(), message });
    }

    let envelope = parsed.map_err(|e| ApiError::Malformed(e.to_string()))?;
    if envelope.success == Some(false) {
        return Err(ApiError::Rejected {
            status: status.as_u16(),
            message: envelope.message.unwrap_or_else(|| "request failed".to_string()),
        });
    }
    Ok(envelope)
}

/// API client
#[derive(Clone)]
pub struct HttpApiClient {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpApiClient {
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL plus percent-encoded path segments
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let invalid = |reason: String| ApiError::Transport(format!("invalid API URL {}: {}", self.base_url, reason));
        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot take a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        let req = self.client.request(method, self.endpoint(segments)?);
        Ok(match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        })
    }

    async fn execute(&self, req: RequestBuilder) -> Result<Envelope, ApiError> {
        let resp = req.send().await.map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = resp.status();
        let url = resp.url().path().to_string();
        let body = resp.text().await.map_err(|e| ApiError::Transport(e.to_string()))?;

        debug!(%status, path = %url, "api response");
        decode_envelope(status, &body).inspect_err(|err| warn!(path = %url, error = %err, "api call failed"))
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        self.execute(self.request(Method::GET, segments)?).await?.data()
    }

    async fn send_json<T: DeserializeOwned>(&self, method: Method, segments: &[&str], body: &Value) -> Result<T, ApiError> {
        self.execute(self.request(method, segments)?.json(body)).await?.data()
    }

    async fn send_unit(&self, method: Method, segments: &[&str], body: &Value) -> Result<(), ApiError> {
        self.execute(self.request(method, segments)?.json(body)).await.map(|_| ())
    }
}

/// Decode candidate rows one by one; a row that cannot be read is skipped
pub fn decode_candidates(rows: Vec<Value>) -> Vec<CandidateSummary> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value(row) {
            Ok(candidate) => Some(candidate),
            Err(err) => {
                warn!(error = %err, "skipping unreadable candidate");
                None
            }
        })
        .collect()
}

#[async_trait]
impl ProfileApi for HttpApiClient {
    async fn fetch_schema(&self) -> Result<Vec<SectionDefinition>, ApiError> {
        self.get(&["profile", "schema"]).await
    }

    async fn fetch_user(&self, user_id: &UserId) -> Result<Record, ApiError> {
        self.get(&["users", user_id.as_str()]).await
    }

    async fn update_user(&self, user_id: &UserId, mut payload: Record) -> Result<(), ApiError> {
        payload.insert("userId".to_string(), Value::String(user_id.to_string()));
        self.send_unit(Method::PUT, &["users", user_id.as_str()], &Value::Object(payload)).await
    }

    async fn submit_verification(&self, user_id: &UserId) -> Result<VerificationReceipt, ApiError> {
        let body = json!({ "userId": user_id, "status": "pending" });
        self.send_json(Method::POST, &["users", user_id.as_str(), "verification"], &body).await
    }
}

#[async_trait]
impl MatchApi for HttpApiClient {
    async fn list_candidates(&self) -> Result<Vec<CandidateSummary>, ApiError> {
        let rows: Vec<Value> = self.get(&["matches"]).await?;
        Ok(decode_candidates(rows))
    }

    async fn send_interest(
        &self,
        from: &UserId,
        to: &UserId,
        message: Option<&str>,
    ) -> Result<InterestRecord, ApiError> {
        let body = json!({ "fromUserId": from, "toUserId": to, "message": message });
        self.send_json(Method::POST, &["interests"], &body).await
    }

    async fn list_interests(&self, user_id: &UserId) -> Result<Vec<InterestRecord>, ApiError> {
        let req = self.request(Method::GET, &["interests"])?.query(&[("userId", user_id.as_str())]);
        self.execute(req).await?.data()
    }

    async fn respond_interest(&self, interest_id: &str, accept: bool) -> Result<InterestRecord, ApiError> {
        let body = json!({ "accept": accept });
        self.send_json(Method::POST, &["interests", interest_id, "respond"], &body).await
    }

    async fn withdraw_interest(&self, interest_id: &str) -> Result<InterestRecord, ApiError> {
        self.send_json(Method::POST, &["interests", interest_id, "withdraw"], &json!({})).await
    }
}

#[async_trait]
impl OtpVerifier for HttpApiClient {
    async fn request_code(&self, phone: &Phone) -> Result<(), ApiError> {
        self.send_unit(Method::POST, &["auth", "otp", "request"], &json!({ "phone": phone })).await
    }

    async fn verify_code(&self, phone: &Phone, code: &str) -> Result<Credentials, ApiError> {
        let body = json!({ "phone": phone, "code": code });
        self.send_json(Method::POST, &["auth", "otp", "verify"], &body).await
    }
}
