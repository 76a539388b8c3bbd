use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shared::{
    domain::{OwnerHandle, Property, PropertyId},
    error::ClientError,
    protocol::{
        CreatePropertyRequest, InquiryRequest, TransactionRecord, TransferOutcome, TransferReply,
    },
};
use tracing::debug;
use url::Url;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Typed interface to the remote ledger's operations. Implementations
/// perform the remote exchange and nothing else; none of them touch the
/// directory cache.
#[async_trait]
pub trait LedgerService: Send + Sync {
    async fn list_properties(&self) -> Result<Vec<Property>, ClientError>;
    async fn create_property(&self, request: CreatePropertyRequest) -> Result<(), ClientError>;
    async fn transfer_ownership(&self, id: PropertyId) -> Result<TransferOutcome, ClientError>;
    async fn list_transactions(&self) -> Result<Vec<TransactionRecord>, ClientError>;
    async fn send_inquiry(&self, request: InquiryRequest) -> Result<(), ClientError>;
}

/// Supplies the opaque identity handle the current session acts as.
/// Resolved once at startup; the core only compares handles for equality.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self) -> Result<OwnerHandle, ClientError>;
}

fn transport(err: reqwest::Error) -> ClientError {
    ClientError::Transport(err.to_string())
}

/// Reads a non-success mutation response and surfaces its body verbatim as
/// the ledger's rejection reason.
async fn rejection(response: reqwest::Response) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let reason = body.trim();
    if reason.is_empty() {
        ClientError::Application(format!("request failed with status {status}"))
    } else {
        ClientError::Application(reason.to_string())
    }
}

fn validated_base_url(raw: &str) -> Result<String, ClientError> {
    let parsed = Url::parse(raw)
        .map_err(|err| ClientError::Input(format!("invalid ledger url '{raw}': {err}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(raw.trim_end_matches('/').to_string()),
        other => Err(ClientError::Input(format!(
            "ledger url must be http or https, got '{other}'"
        ))),
    }
}

fn build_http_client(timeout: Duration) -> Result<Client, ClientError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| ClientError::Transport(format!("failed to build http client: {err}")))
}

/// HTTP implementation of [`LedgerService`].
#[derive(Debug)]
pub struct HttpLedger {
    http: Client,
    base_url: String,
}

impl HttpLedger {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            http: build_http_client(timeout)?,
            base_url: validated_base_url(base_url)?,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

#[async_trait]
impl LedgerService for HttpLedger {
    async fn list_properties(&self) -> Result<Vec<Property>, ClientError> {
        let response = self
            .http
            .get(self.endpoint("properties"))
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(ClientError::Transport(format!(
                "property listing failed with status {}",
                response.status()
            )));
        }
        let properties: Vec<Property> = response.json().await.map_err(transport)?;
        debug!(count = properties.len(), "fetched property listing");
        Ok(properties)
    }

    async fn create_property(&self, request: CreatePropertyRequest) -> Result<(), ClientError> {
        let response = self
            .http
            .post(self.endpoint("properties"))
            .json(&request)
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        debug!(name = %request.name, price = request.price, "property created");
        Ok(())
    }

    async fn transfer_ownership(&self, id: PropertyId) -> Result<TransferOutcome, ClientError> {
        let response = self
            .http
            .post(self.endpoint(&format!("properties/{}/transfer", id.0)))
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(ClientError::Transport(format!(
                "transfer request failed with status {}",
                response.status()
            )));
        }
        let body = response.text().await.map_err(transport)?;
        // A body that is not a {ok}/{err} object decodes to the malformed
        // case rather than failing the call.
        let reply: TransferReply = serde_json::from_str(&body).unwrap_or_default();
        Ok(TransferOutcome::from(reply))
    }

    async fn list_transactions(&self) -> Result<Vec<TransactionRecord>, ClientError> {
        let response = self
            .http
            .get(self.endpoint("transactions"))
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(ClientError::Transport(format!(
                "transaction listing failed with status {}",
                response.status()
            )));
        }
        response.json().await.map_err(transport)
    }

    async fn send_inquiry(&self, request: InquiryRequest) -> Result<(), ClientError> {
        let response = self
            .http
            .post(self.endpoint("inquiries"))
            .json(&request)
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct IdentityReply {
    handle: OwnerHandle,
}

/// HTTP implementation of [`IdentityResolver`]: asks the ledger which
/// identity this session's requests are attributed to.
pub struct HttpIdentity {
    http: Client,
    base_url: String,
}

impl HttpIdentity {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http: build_http_client(DEFAULT_REQUEST_TIMEOUT)?,
            base_url: validated_base_url(base_url)?,
        })
    }
}

#[async_trait]
impl IdentityResolver for HttpIdentity {
    async fn resolve(&self) -> Result<OwnerHandle, ClientError> {
        let response = self
            .http
            .get(format!("{}/identity", self.base_url))
            .send()
            .await
            .map_err(|err| ClientError::Identity(err.to_string()))?;
        if !response.status().is_success() {
            return Err(ClientError::Identity(format!(
                "identity request failed with status {}",
                response.status()
            )));
        }
        let reply: IdentityReply = response
            .json()
            .await
            .map_err(|err| ClientError::Identity(err.to_string()))?;
        Ok(reply.handle)
    }
}

/// Null implementation used where no ledger backend is wired.
pub struct MissingLedger;

#[async_trait]
impl LedgerService for MissingLedger {
    async fn list_properties(&self) -> Result<Vec<Property>, ClientError> {
        Err(ClientError::Transport(
            "ledger service is not configured".into(),
        ))
    }

    async fn create_property(&self, _request: CreatePropertyRequest) -> Result<(), ClientError> {
        Err(ClientError::Transport(
            "ledger service is not configured".into(),
        ))
    }

    async fn transfer_ownership(&self, _id: PropertyId) -> Result<TransferOutcome, ClientError> {
        Err(ClientError::Transport(
            "ledger service is not configured".into(),
        ))
    }

    async fn list_transactions(&self) -> Result<Vec<TransactionRecord>, ClientError> {
        Err(ClientError::Transport(
            "ledger service is not configured".into(),
        ))
    }

    async fn send_inquiry(&self, _request: InquiryRequest) -> Result<(), ClientError> {
        Err(ClientError::Transport(
            "ledger service is not configured".into(),
        ))
    }
}

/// Null implementation used where no identity provider is wired. Resolution
/// always fails, which degrades the owned-by-me filter to match nothing.
pub struct MissingIdentity;

#[async_trait]
impl IdentityResolver for MissingIdentity {
    async fn resolve(&self) -> Result<OwnerHandle, ClientError> {
        Err(ClientError::Identity(
            "no identity provider is configured".into(),
        ))
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
