//! AI profile generator client
//!
//! POSTs wine metadata as JSON to a configured endpoint and reads back the
//! structural axes. Responses are clamped into axis bounds, power is
//! recomputed locally, and a reported `low` confidence is raised to `medium`
//! since the answer still came from the model rather than the rules.

use crate::error::ProfileError;
use crate::services::profile_chain::ProfileGenerator;
use crate::services::profile_estimator::compute_power;
use crate::types::ProfileMetadata;
use async_trait::async_trait;
use cellar_common::config::AiSettings;
use cellar_common::models::{ProfileConfidence, ProfileSource, StructuralProfile};
use cellar_common::time;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "cellar-advisor/0.1.0";

/// Request body
#[derive(Debug, Serialize)]
struct ProfileRequest<'a> {
    #[serde(rename = "type")]
    wine_type: Option<&'a str>,
    region: Option<&'a str>,
    grapes: &'a [String],
    style: Option<&'a str>,
}

/// Response body; missing axes default to the middle of the scale
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AiProfileResponse {
    pub body: Option<i64>,
    pub tannin: Option<i64>,
    pub acidity: Option<i64>,
    pub oak: Option<i64>,
    pub sweetness: Option<i64>,
    pub alcohol: Option<i64>,
    #[serde(default)]
    pub style_tags: Vec<String>,
    #[serde(default)]
    pub confidence: Option<ProfileConfidence>,
}

impl AiProfileResponse {
    /// Convert into a bounded profile
    pub fn into_profile(self) -> Result<StructuralProfile, ProfileError> {
        if self.body.is_none() && self.tannin.is_none() && self.acidity.is_none() {
            return Err(ProfileError::InvalidResponse(
                "response carries no structural axes".to_string(),
            ));
        }

        let axis = |v: Option<i64>| {
            v.unwrap_or(3).clamp(
                StructuralProfile::AXIS_MIN as i64,
                StructuralProfile::AXIS_MAX as i64,
            ) as u8
        };
        let body = axis(self.body);
        let tannin = axis(self.tannin);
        let acidity = axis(self.acidity);
        let oak = axis(self.oak);
        let alcohol = axis(self.alcohol);
        let sweetness = self.sweetness.unwrap_or(0).clamp(
            StructuralProfile::SWEETNESS_MIN as i64,
            StructuralProfile::AXIS_MAX as i64,
        ) as u8;

        let confidence = match self.confidence {
            Some(ProfileConfidence::High) => ProfileConfidence::High,
            _ => ProfileConfidence::Medium,
        };

        let style_tags = self
            .style_tags
            .into_iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        Ok(StructuralProfile {
            body,
            tannin,
            acidity,
            oak,
            sweetness,
            alcohol,
            power: compute_power(body, tannin, acidity, oak, sweetness),
            style_tags,
            confidence,
            source: ProfileSource::Ai,
            generated_at: time::now(),
        })
    }
}

/// HTTP profile generator
pub struct HttpProfileGenerator {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpProfileGenerator {
    pub fn new(endpoint: &str, api_key: Option<String>, timeout_ms: u64) -> Result<Self, ProfileError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;

        Ok(Self {
            http_client,
            endpoint: endpoint.to_string(),
            api_key,
        })
    }

    /// Build from `[ai]` settings; `None` when no endpoint is configured
    pub fn from_settings(settings: &AiSettings) -> Result<Option<Self>, ProfileError> {
        match settings.endpoint.as_deref().map(str::trim) {
            Some(endpoint) if !endpoint.is_empty() => Ok(Some(Self::new(
                endpoint,
                settings.api_key.clone(),
                settings.timeout_ms,
            )?)),
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl ProfileGenerator for HttpProfileGenerator {
    fn name(&self) -> &'static str {
        "ai"
    }

    async fn generate(&self, metadata: &ProfileMetadata) -> Result<StructuralProfile, ProfileError> {
        let request = ProfileRequest {
            wine_type: metadata.wine_type.as_ref().map(|t| t.as_str()),
            region: metadata.region.as_deref(),
            grapes: &metadata.grapes,
            style: metadata.style.as_deref(),
        };

        debug!(endpoint = %self.endpoint, "Requesting AI profile");

        let mut builder = self.http_client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProfileError::Unavailable(format!("HTTP {}: {}", status.as_u16(), text)));
        }

        let body: AiProfileResponse = response
            .json()
            .await
            .map_err(|e| ProfileError::InvalidResponse(e.to_string()))?;

        body.into_profile()
    }
}
