//! Stripe charges query client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use charge_cohort_core::ConfigError;

use crate::config::CohortOptions;
use crate::error::TransportError;
use crate::query::{PaginationMode, QueryClient};
use crate::types::{
    ChargeList, CreatedRange, CursorPage, CursorPageRequest, OffsetPage, OffsetPageRequest,
    StripeErrorResponse,
};

/// Lists charges from the Stripe API, one page per call.
#[derive(Debug, Clone)]
pub struct StripeQueryClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl StripeQueryClient {
    /// Create a new Stripe query client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Stripe secret API key (`sk_test_...` or `sk_live_...`)
    /// * `options` - Base URL and request timeout
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingCredential` if the key is empty, or
    /// `ConfigError::InvalidOption` if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, options: &CohortOptions) -> Result<Self, ConfigError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(options.request_timeout_seconds))
            .build()
            .map_err(|e| ConfigError::InvalidOption(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// List one page of charges with the given query parameters.
    async fn list_charges(&self, params: &[(&str, String)]) -> Result<ChargeList, TransportError> {
        let response = self
            .client
            .get(format!("{}/charges", self.base_url))
            .basic_auth(&self.api_key, Option::<&str>::None)
            .query(params)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, TransportError> {
        let status = response.status();

        if status.is_success() {
            let body = response.bytes().await?;
            return Ok(serde_json::from_slice(&body)?);
        }

        // Try to parse error response
        let error_body: Result<StripeErrorResponse, _> = response.json().await;

        match error_body {
            Ok(stripe_error) => Err(TransportError::Api {
                status: status.as_u16(),
                error_type: stripe_error.error.error_type,
                message: stripe_error.error.message,
                code: stripe_error.error.code,
            }),
            Err(_) => Err(TransportError::Api {
                status: status.as_u16(),
                error_type: "unknown".to_string(),
                message: format!("HTTP {status}"),
                code: None,
            }),
        }
    }
}

/// Query parameters shared by both pagination modes.
fn base_params(created: CreatedRange, page_size: u32) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("created[gte]", created.gte.to_string()),
        ("limit", page_size.to_string()),
        ("expand[]", "data.customer".to_string()),
    ];
    if let Some(lte) = created.lte {
        params.push(("created[lte]", lte.to_string()));
    }
    params
}

#[async_trait]
impl QueryClient for StripeQueryClient {
    fn preferred_mode(&self) -> PaginationMode {
        PaginationMode::Cursor
    }

    async fn list_by_offset(
        &self,
        request: &OffsetPageRequest,
    ) -> Result<OffsetPage, TransportError> {
        let mut params = base_params(request.created, request.page_size);
        params.push(("offset", request.offset.to_string()));
        params.push(("include[]", "total_count".to_string()));

        tracing::debug!(offset = request.offset, "Listing charges by offset");
        self.list_charges(&params).await.map(OffsetPage::from)
    }

    async fn list_by_cursor(
        &self,
        request: &CursorPageRequest,
    ) -> Result<CursorPage, TransportError> {
        let mut params = base_params(request.created, request.page_size);
        if let Some(ref last) = request.starting_after {
            params.push(("starting_after", last.to_string()));
        }

        tracing::debug!(starting_after = ?request.starting_after, "Listing charges by cursor");
        self.list_charges(&params).await.map(CursorPage::from)
    }
}
