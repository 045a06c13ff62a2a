//! Session value type and wire-level response shapes.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::api::error::{message_looks_unauthenticated, ApiError};

/// The authenticated identity and in-progress shopping-order context.
///
/// A `Session` is either fully populated from one login response or absent;
/// it is replaced wholesale by each login and never patched field-by-field,
/// so no partially-initialized session is ever observable. Only the order
/// fields (`customer_order_id`, `customer_order_state`) change server-side
/// during the session's life; everything else is fixed at issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    /// Carried for persistence fidelity only; the service has no
    /// refresh-token flow, so re-authentication is always a fresh login.
    pub refresh_token: String,
    pub customer_id: String,
    pub customer_order_id: String,
    pub customer_order_state: String,
    pub default_branch_id: String,
    /// Absolute expiry in epoch milliseconds, derived from the relative
    /// `expiresIn` at login. Expiry is detected reactively by a failed call,
    /// never by polling this value.
    pub expires_at: u64,
}

impl Session {
    /// Customer id for REST path parameters, or `None` for the anonymous
    /// path. A session restored from a bare bearer token carries no
    /// customer id and searches anonymously.
    pub fn customer_id_param(&self) -> Option<&str> {
        if self.customer_id.is_empty() {
            None
        } else {
            Some(&self.customer_id)
        }
    }

    /// Session backed only by an externally supplied bearer token.
    /// No shopping context is available until a real login replaces it.
    pub fn from_bearer_token(token: String) -> Self {
        Session {
            access_token: token,
            refresh_token: String::new(),
            customer_id: String::new(),
            customer_order_id: String::new(),
            customer_order_state: String::new(),
            default_branch_id: String::new(),
            expires_at: 0,
        }
    }
}

/// A reported-but-not-fatal backend failure inside a 2xx envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiFailure {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

/// Top-level GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub struct GraphQlEnvelope<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub extensions: Option<GraphQlErrorExtensions>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlErrorExtensions {
    #[serde(default)]
    pub code: Option<String>,
}

impl GraphQlError {
    /// Structured classification first; the message heuristic only applies
    /// when the envelope carries no `extensions.code` at all.
    pub fn is_unauthenticated(&self) -> bool {
        match self.extensions.as_ref().and_then(|e| e.code.as_deref()) {
            Some(code) => code == "UNAUTHENTICATED",
            None => message_looks_unauthenticated(&self.message),
        }
    }
}

/// Payload of the "new session" mutation. All fields optional on the wire:
/// a rejected login answers with `failures` and nothing else.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub customer_order_id: Option<String>,
    #[serde(default)]
    pub customer_order_state: Option<String>,
    #[serde(default)]
    pub default_branch_id: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub failures: Option<Vec<ApiFailure>>,
}

impl LoginPayload {
    /// Build the full session value, anchoring `expiresIn` to an absolute
    /// timestamp. Fails if the service omitted any session field from an
    /// otherwise failure-free response.
    pub fn into_session(self) -> Result<Session, ApiError> {
        let missing = || ApiError::Protocol {
            message: "login response was missing session fields".to_string(),
            unauthenticated: false,
        };
        Ok(Session {
            access_token: self.access_token.ok_or_else(missing)?,
            refresh_token: self.refresh_token.ok_or_else(missing)?,
            customer_id: self.customer_id.ok_or_else(missing)?,
            customer_order_id: self.customer_order_id.ok_or_else(missing)?,
            customer_order_state: self.customer_order_state.ok_or_else(missing)?,
            default_branch_id: self.default_branch_id.ok_or_else(missing)?,
            expires_at: now_millis() + self.expires_in.ok_or_else(missing)? * 1000,
        })
    }
}

/// Raw REST search/browse envelope as the service returns it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSearchEnvelope {
    pub total_matches: u64,
    pub components_and_products: Vec<SearchComponent>,
}

/// One element of the heterogeneous search result list. Non-product
/// elements (editorial components, banners) deserialize with
/// `search_product: None` and are dropped during normalization.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchComponent {
    pub search_product: Option<Product>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    pub id: String,
    pub line_number: Option<String>,
    pub name: Option<String>,
    pub size: Option<String>,
    pub display_price: Option<String>,
}

/// Envelope of the REST product-lookup endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProductLookupEnvelope {
    pub products: Vec<Product>,
}

/// Normalized search outcome: product elements only, original order.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults {
    pub total_matches: u64,
    pub products: Vec<Product>,
}

impl RawSearchEnvelope {
    /// Keep only elements exposing a product payload, in original order.
    /// No dedup, sort or filtering beyond what the backend already did.
    pub fn normalize(self) -> SearchResults {
        SearchResults {
            total_matches: self.total_matches,
            products: self
                .components_and_products
                .into_iter()
                .filter_map(|c| c.search_product)
                .collect(),
        }
    }
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
