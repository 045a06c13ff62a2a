use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoints: Endpoints,
    pub client: ClientConfig,
}

/// Service endpoint URLs, injected rather than hard-coded so tests can
/// point every call at a local mock server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// The single GraphQL endpoint (sessions, trolley, orders, slots).
    pub graphql: String,
    /// REST product search, path-parameterized by customer id.
    pub search: String,
    /// REST category browse, same shape as search.
    pub browse: String,
    /// REST product lookup by line number.
    pub products: String,
}

/// Fixed identifiers presented to the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Sent on every request; identifies us as the reference mobile app.
    pub user_agent: String,
    /// `clientId` variable of the login operation.
    pub client_id: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            graphql: "https://www.waitrose.com/api/graphql-prod/graph/live".to_string(),
            search: "https://www.waitrose.com/api/content-prod/v2/cms/publish/productcontent/search"
                .to_string(),
            browse: "https://www.waitrose.com/api/content-prod/v2/cms/publish/productcontent/browse"
                .to_string(),
            products: "https://www.waitrose.com/api/custsearch-prod/v3/products".to_string(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: "WaitroseMobile/11.3.0 (Android)".to_string(),
            client_id: "ANDROID_APP".to_string(),
        }
    }
}
