//! Protocol dispatch: one seam over the service's two wire protocols.
//!
//! Both the GraphQL endpoint and the REST search endpoints get the same
//! header discipline and the same error classification, so the
//! reauthentication policy can wrap either uniformly; it only needs a
//! callable that may fail with a classified [`ApiError`].

use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::types::{
    GraphQlEnvelope, Product, ProductLookupEnvelope, RawSearchEnvelope, SearchResults,
};
use crate::config::{ClientConfig, Endpoints};

/// Customer-id path segment for unauthenticated search.
pub const ANONYMOUS_CUSTOMER_ID: &str = "-1";

/// Which of the two REST search surfaces to hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Search,
    Browse,
}

impl SearchKind {
    fn base<'a>(&self, endpoints: &'a Endpoints) -> &'a str {
        match self {
            SearchKind::Search => &endpoints.search,
            SearchKind::Browse => &endpoints.browse,
        }
    }
}

/// Issues RPC and REST calls with auth headers attached, and decodes the two
/// distinct response envelopes.
///
/// The token is an explicit `Option<&str>` parameter on every call: the
/// anonymous and authenticated request paths are independently testable, and
/// this layer never reads session state of its own.
#[derive(Clone)]
pub struct ProtocolDispatcher {
    client: Client,
    endpoints: Endpoints,
    user_agent: String,
}

impl ProtocolDispatcher {
    pub fn new(endpoints: Endpoints, client_config: &ClientConfig) -> Self {
        let client = Client::builder()
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            endpoints,
            user_agent: client_config.user_agent.clone(),
        }
    }

    /// POST a `{query, variables}` envelope to the single GraphQL endpoint.
    ///
    /// Non-2xx is a `Transport` error with status and raw body. A 2xx body
    /// with a non-empty top-level `errors` list is a `Protocol` error with
    /// the messages joined. Domain-specific `failures` lists nested inside
    /// `data` are NOT interpreted here; callers inspect those themselves.
    pub async fn execute_graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        let body = serde_json::json!({ "query": query, "variables": variables });
        let request = self.prepare(self.client.post(&self.endpoints.graphql), token);
        let response = request.json(&body).send().await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "graphql call failed");
            return Err(ApiError::Transport {
                status: status.as_u16(),
                body: text,
            });
        }

        let envelope: GraphQlEnvelope<T> = serde_json::from_str(&text)?;
        if !envelope.errors.is_empty() {
            let unauthenticated = envelope.errors.iter().any(|e| e.is_unauthenticated());
            let message = envelope
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ApiError::Protocol {
                message,
                unauthenticated,
            });
        }

        envelope.data.ok_or_else(|| ApiError::Protocol {
            message: "response envelope had no data".to_string(),
            unauthenticated: false,
        })
    }

    /// POST a search/browse request to
    /// `{search|browse}/{customerId|-1}?clientType=WEB_APP` and normalize
    /// the heterogeneous result list down to products plus the match count.
    pub async fn execute_rest(
        &self,
        kind: SearchKind,
        customer_id: Option<&str>,
        body: Value,
        token: Option<&str>,
    ) -> Result<SearchResults, ApiError> {
        let url = format!(
            "{}/{}?clientType=WEB_APP",
            kind.base(&self.endpoints),
            customer_id.unwrap_or(ANONYMOUS_CUSTOMER_ID),
        );
        let request = self.prepare(self.client.post(&url), token);
        let response = request.json(&body).send().await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Transport {
                status: status.as_u16(),
                body: text,
            });
        }

        let raw: RawSearchEnvelope = serde_json::from_str(&text)?;
        Ok(raw.normalize())
    }

    /// GET product details by line number from the REST lookup endpoint.
    pub async fn fetch_products(
        &self,
        line_numbers: &[String],
        token: Option<&str>,
    ) -> Result<Vec<Product>, ApiError> {
        let url = format!("{}/{}", self.endpoints.products, line_numbers.join(","));
        let request = self.prepare(self.client.get(&url), token);
        let response = request.send().await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Transport {
                status: status.as_u16(),
                body: text,
            });
        }

        let envelope: ProductLookupEnvelope = serde_json::from_str(&text)?;
        Ok(envelope.products)
    }

    /// Fixed headers identifying the client as the reference mobile app,
    /// plus the bearer token when one is supplied.
    fn prepare(
        &self,
        builder: reqwest::RequestBuilder,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let builder = builder
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, &self.user_agent);
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}
