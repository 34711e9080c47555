//! CLI Commands

pub mod auth;
pub mod config;
pub mod interests;
pub mod matches;
pub mod profile;

use std::sync::Arc;

use anyhow::anyhow;
use rishta_profile::infrastructure::{HttpApiClient, StaticOtpVerifier};
use rishta_profile::{OtpVerifier, Session, UserId};

use crate::config::{Config, DEFAULT_API_URL};
use crate::output::OutputFormat;
use crate::Cli;

/// Settings resolved from flags, environment and the config file
pub struct Context {
    pub api_url: String,
    pub token: Option<String>,
    pub user_id: Option<String>,
    pub format: OutputFormat,
    pub profile: Option<String>,
    pub dev_otp_code: Option<String>,
}

impl Context {
    pub fn new(cli: &Cli, config: Config) -> Self {
        let format = cli
            .format
            .or_else(|| config.default_format.as_deref().and_then(OutputFormat::from_name))
            .unwrap_or_default();

        Self {
            api_url: cli.api_url.clone().or(config.api_url).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            token: cli.token.clone().or(config.token),
            user_id: config.user_id,
            format,
            profile: cli.profile.clone(),
            dev_otp_code: config.dev_otp_code,
        }
    }

    pub fn client(&self) -> Arc<HttpApiClient> {
        Arc::new(HttpApiClient::new(&self.api_url, self.token.as_deref()))
    }

    /// OTP backend; a configured development code skips the network
    pub fn otp_verifier(&self) -> Arc<dyn OtpVerifier> {
        match &self.dev_otp_code {
            Some(code) => Arc::new(StaticOtpVerifier::new(code.clone())),
            None => self.client(),
        }
    }

    pub fn session(&self) -> anyhow::Result<Session> {
        match (&self.user_id, &self.token) {
            (Some(user_id), Some(token)) => Ok(Session::resume(UserId::from_string(user_id.clone()), token.clone())),
            _ => Err(anyhow!("Not logged in; run `rishta login --phone <number>` first")),
        }
    }
}
