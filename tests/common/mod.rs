#![allow(dead_code)]

pub mod mock_api;

use trolley::config::{ClientConfig, Config, Endpoints};

/// Config with every endpoint pointed at the mock server.
pub fn test_config(base_url: &str) -> Config {
    Config {
        endpoints: Endpoints {
            graphql: format!("{base_url}/graphql"),
            search: format!("{base_url}/search"),
            browse: format!("{base_url}/browse"),
            products: format!("{base_url}/products"),
        },
        client: ClientConfig::default(),
    }
}

/// A successful login response body for the mock server.
pub fn login_response(token: &str) -> String {
    format!(
        r#"{{
            "data": {{
                "generateSession": {{
                    "accessToken": "{token}",
                    "refreshToken": "refresh-1",
                    "customerId": "C1",
                    "customerOrderId": "O1",
                    "customerOrderState": "PENDING",
                    "defaultBranchId": "B1",
                    "expiresIn": 900
                }}
            }}
        }}"#
    )
}

/// A trolley response with a single named item.
pub fn trolley_response(product_name: &str) -> String {
    format!(
        r#"{{
            "data": {{
                "getTrolley": {{
                    "trolleyItems": [
                        {{
                            "lineNumber": "123456",
                            "productName": "{product_name}",
                            "quantity": {{"amount": 2, "uom": "C62"}}
                        }}
                    ]
                }}
            }}
        }}"#
    )
}

/// An orders response with one order of the given id.
pub fn orders_response(order_id: &str) -> String {
    format!(
        r#"{{
            "data": {{
                "customerOrders": {{
                    "orders": [
                        {{"customerOrderId": "{order_id}", "status": "PENDING"}}
                    ]
                }}
            }}
        }}"#
    )
}
