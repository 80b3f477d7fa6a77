// registry-core/src/infrastructure/composer_http.rs
//
// Orchestrator delegate for external composition services (spec.md §6
// "Wire protocol to external composer"). Every request body is signed
// with HMAC-SHA256 over the raw JSON bytes using the project's
// configured secret, carried in the `x-hive-signature` header — the
// name is a deliberate nod to the wire format this was modeled after.

use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::ports::orchestrator::{CompositionOptions, CompositionResult, Orchestrator, SubgraphInput};
use crate::ports::PortError;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_HEADER: &str = "x-hive-signature";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct ComposeRequest<'a> {
    schemas: &'a [SubgraphInput],
}

#[derive(Debug, Deserialize)]
struct ComposeResponse {
    #[serde(flatten)]
    result: CompositionResult,
}

pub struct HttpOrchestrator {
    client: reqwest::Client,
}

impl Default for HttpOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpOrchestrator {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("reqwest client with default TLS backend must build");
        Self { client }
    }

    fn sign(secret: &str, body: &[u8]) -> Result<String, PortError> {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|err| PortError::Unavailable(format!("invalid composer secret: {err}")))?;
        mac.update(body);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

#[async_trait]
impl Orchestrator for HttpOrchestrator {
    async fn compose_and_validate(
        &self,
        schemas: &[SubgraphInput],
        options: &CompositionOptions,
    ) -> Result<CompositionResult, PortError> {
        let Some(external) = &options.external else {
            return Err(PortError::Unavailable("no external composer configured".to_string()));
        };

        let body = serde_json::to_vec(&ComposeRequest { schemas })
            .map_err(|err| PortError::Unavailable(format!("failed to encode compose request: {err}")))?;
        let signature = Self::sign(&external.secret, &body)?;

        let response = self
            .client
            .post(&external.endpoint)
            .header(SIGNATURE_HEADER, signature)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|err| PortError::Unavailable(format!("composer request failed: {err}")))?;

        if !response.status().is_success() {
            return Err(PortError::Unavailable(format!("composer returned status {}", response.status())));
        }

        let decoded: ComposeResponse = response
            .json()
            .await
            .map_err(|err| PortError::Unavailable(format!("composer returned invalid json: {err}")))?;

        Ok(decoded.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_deterministic() {
        let body = b"{\"schemas\":[]}";
        let a = HttpOrchestrator::sign("secret", body).unwrap();
        let b = HttpOrchestrator::sign("secret", body).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn signature_changes_with_secret() {
        let body = b"{\"schemas\":[]}";
        let a = HttpOrchestrator::sign("secret-a", body).unwrap();
        let b = HttpOrchestrator::sign("secret-b", body).unwrap();
        assert_ne!(a, b);
    }
}
