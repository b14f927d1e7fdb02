// eSignatures.com client for rental agreement contracts
//
// Contracts are created from a pre-built agreement template; the signer
// receives an email with a hosted signing page. Status transitions come
// back through the esignatures webhook authenticated by the shared API
// token in a `Secret-Token` header.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::app_config::EsignConfig;

#[derive(Error, Debug)]
pub enum EsignError {
    #[error("eSignatures API error: {0}")]
    Api(String),

    #[error("eSignatures request failed: {0}")]
    Network(String),

    #[error("Failed to parse eSignatures response: {0}")]
    Parse(String),
}

// ============================================================================
// WIRE TYPES
// ============================================================================

#[derive(Debug, Serialize)]
struct CreateContractRequest<'a> {
    template_id: &'a str,
    signers: Vec<ContractSigner<'a>>,
    placeholder_fields: Vec<PlaceholderField>,
    metadata: String,
}

#[derive(Debug, Serialize)]
struct ContractSigner<'a> {
    name: &'a str,
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    mobile: Option<&'a str>,
}

/// Template placeholder substituted into the contract text.
#[derive(Debug, Clone, Serialize)]
pub struct PlaceholderField {
    pub api_key: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
struct CreateContractResponse {
    data: ContractData,
}

#[derive(Debug, Deserialize)]
struct ContractData {
    contract: ContractEnvelope,
}

#[derive(Debug, Deserialize)]
struct ContractEnvelope {
    id: String,
    #[serde(default)]
    signers: Vec<SignerEnvelope>,
}

#[derive(Debug, Deserialize)]
struct SignerEnvelope {
    #[serde(default)]
    sign_page_url: Option<String>,
}

/// A contract created for a job, as stored on the rental agreement row.
#[derive(Debug, Clone)]
pub struct CreatedContract {
    pub contract_id: String,
    pub sign_page_url: Option<String>,
}

// ============================================================================
// CLIENT
// ============================================================================

#[derive(Debug, Clone)]
pub struct EsignClient {
    api_token: String,
    base_url: String,
    template_id: String,
    client: reqwest::Client,
}

impl EsignClient {
    pub fn new(config: &EsignConfig) -> Self {
        Self {
            api_token: config.api_token.clone(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            template_id: config.agreement_template_id.clone(),
            client: reqwest::Client::new(),
        }
    }

    /// Creates a contract from the rental agreement template and queues
    /// the signing email to the customer.
    pub async fn create_agreement_contract(
        &self,
        job_id: Uuid,
        signer_name: &str,
        signer_email: &str,
        signer_phone: Option<&str>,
        placeholder_fields: Vec<PlaceholderField>,
    ) -> Result<CreatedContract, EsignError> {
        let request = CreateContractRequest {
            template_id: &self.template_id,
            signers: vec![ContractSigner {
                name: signer_name,
                email: signer_email,
                mobile: signer_phone,
            }],
            placeholder_fields,
            metadata: job_id.to_string(),
        };

        let response = self
            .client
            .post(format!("{}/contracts", self.base_url))
            .query(&[("token", self.api_token.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| EsignError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| EsignError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(EsignError::Api(format!("HTTP {}: {}", status, body)));
        }

        let parsed: CreateContractResponse =
            serde_json::from_str(&body).map_err(|e| EsignError::Parse(e.to_string()))?;

        let sign_page_url = parsed
            .data
            .contract
            .signers
            .into_iter()
            .find_map(|s| s.sign_page_url);

        Ok(CreatedContract {
            contract_id: parsed.data.contract.id,
            sign_page_url,
        })
    }

    /// Shared token expected in the webhook's `Secret-Token` header.
    pub fn webhook_token(&self) -> &str {
        &self.api_token
    }
}

// ============================================================================
// WEBHOOK PAYLOAD
// ============================================================================

/// Body posted by esignatures.com to the webhook endpoint.
#[derive(Debug, Deserialize)]
pub struct EsignWebhookPayload {
    pub status: String,
    pub data: EsignWebhookData,
}

#[derive(Debug, Deserialize)]
pub struct EsignWebhookData {
    #[serde(default)]
    pub contract: Option<EsignWebhookContract>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EsignWebhookContract {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webhook_payload_deserializes() {
        let body = serde_json::json!({
            "status": "signer-signed",
            "data": {
                "contract": { "id": "contract-abc-123" }
            }
        });

        let payload: EsignWebhookPayload = serde_json::from_value(body).unwrap();
        assert_eq!(payload.status, "signer-signed");
        assert_eq!(payload.data.contract.unwrap().id, "contract-abc-123");
    }

    #[test]
    fn error_payload_without_contract_deserializes() {
        let body = serde_json::json!({
            "status": "error",
            "data": { "error_message": "template not found" }
        });

        let payload: EsignWebhookPayload = serde_json::from_value(body).unwrap();
        assert_eq!(payload.status, "error");
        assert!(payload.data.contract.is_none());
        assert_eq!(
            payload.data.error_message.as_deref(),
            Some("template not found")
        );
    }
}
