//! GraphQL operation documents and the typed domain calls built on them.
//!
//! The dispatcher leaves nested `failures` lists alone; this layer is where
//! a non-empty list becomes an [`ApiError::Domain`] business rejection.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::dispatch::{ProtocolDispatcher, SearchKind};
use crate::api::error::ApiError;
use crate::api::reauth::ApiClient;
use crate::api::types::{ApiFailure, LoginPayload, Product, SearchResults, Session};

pub const GENERATE_SESSION: &str = "\
mutation GenerateSession($username: String!, $password: String!, $clientId: String!) {
  generateSession(username: $username, password: $password, clientId: $clientId) {
    accessToken refreshToken customerId customerOrderId customerOrderState
    defaultBranchId expiresIn
    failures { type message }
  }
}";

pub const END_SESSION: &str = "\
mutation EndSession {
  endSession {
    failures { type message }
  }
}";

pub const GET_TROLLEY: &str = "\
query GetTrolley($orderId: ID!) {
  getTrolley(orderId: $orderId) {
    trolleyItems {
      lineNumber productName
      quantity { amount uom }
    }
    failures { type message }
  }
}";

pub const CUSTOMER_ORDERS: &str = "\
query CustomerOrders($status: OrderStatus!) {
  customerOrders(status: $status) {
    orders {
      customerOrderId status totalEstimatedCost
      slot { startDateTime endDateTime }
    }
    failures { type message }
  }
}";

pub const SLOT_DAYS: &str = "\
query SlotDays($branchId: ID!, $orderId: ID!) {
  slotDays(branchId: $branchId, orderId: $orderId) {
    days {
      date
      slots { startDateTime endDateTime available }
    }
    failures { type message }
  }
}";

#[derive(Debug, Deserialize)]
pub struct LoginData {
    #[serde(rename = "generateSession")]
    pub generate_session: LoginPayload,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EndSessionData {
    #[serde(rename = "endSession")]
    pub end_session: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrolleyData {
    pub get_trolley: Trolley,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Trolley {
    pub trolley_items: Vec<TrolleyItem>,
    pub failures: Option<Vec<ApiFailure>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrolleyItem {
    pub line_number: Option<String>,
    pub product_name: Option<String>,
    pub quantity: Option<Quantity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Quantity {
    pub amount: f64,
    pub uom: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersData {
    pub customer_orders: OrdersPayload,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrdersPayload {
    pub orders: Vec<Order>,
    pub failures: Option<Vec<ApiFailure>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Order {
    pub customer_order_id: String,
    pub status: Option<String>,
    pub total_estimated_cost: Option<f64>,
    pub slot: Option<OrderSlot>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderSlot {
    pub start_date_time: Option<String>,
    pub end_date_time: Option<String>,
}

/// Pending and previous orders, fetched concurrently and joined.
#[derive(Debug, Default)]
pub struct OrdersOverview {
    pub pending: Vec<Order>,
    pub previous: Vec<Order>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotDaysData {
    pub slot_days: SlotDaysPayload,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SlotDaysPayload {
    pub days: Vec<SlotDay>,
    pub failures: Option<Vec<ApiFailure>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SlotDay {
    pub date: String,
    pub slots: Vec<Slot>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Slot {
    pub start_date_time: Option<String>,
    pub end_date_time: Option<String>,
    pub available: bool,
}

#[derive(Debug, Clone, Copy)]
enum OrderScope {
    Pending,
    Previous,
}

impl OrderScope {
    fn status(self) -> &'static str {
        match self {
            OrderScope::Pending => "PENDING",
            OrderScope::Previous => "COMPLETED",
        }
    }
}

impl ApiClient {
    /// Current trolley contents for the session's shopping order.
    pub async fn trolley(&mut self) -> Result<Trolley, ApiError> {
        self.run_with_auth(|ctx| async move { fetch_trolley(&ctx.dispatcher, &ctx.session).await })
            .await
    }

    /// Pending and previous orders. The two reads are independent, so they
    /// are issued concurrently and joined; no ordering between them beyond
    /// both completing before the overview is returned.
    pub async fn orders(&mut self) -> Result<OrdersOverview, ApiError> {
        self.run_with_auth(|ctx| async move {
            let (pending, previous) = tokio::join!(
                fetch_orders(&ctx.dispatcher, &ctx.session, OrderScope::Pending),
                fetch_orders(&ctx.dispatcher, &ctx.session, OrderScope::Previous),
            );
            Ok(OrdersOverview {
                pending: pending?,
                previous: previous?,
            })
        })
        .await
    }

    /// Available delivery slots for the session's default branch.
    pub async fn slots(&mut self) -> Result<Vec<SlotDay>, ApiError> {
        self.run_with_auth(|ctx| async move { fetch_slot_days(&ctx.dispatcher, &ctx.session).await })
            .await
    }

    /// Product search. Runs anonymously (customer id `-1`, no bearer
    /// header) when no session is held; search does not force a login.
    pub async fn search(&mut self, term: &str) -> Result<SearchResults, ApiError> {
        self.rest_search(SearchKind::Search, search_body(term)).await
    }

    /// Category browse over the second REST search surface.
    pub async fn browse(&mut self, category: &str) -> Result<SearchResults, ApiError> {
        self.rest_search(SearchKind::Browse, browse_body(category))
            .await
    }

    /// Product lookup by line number. Unlike search, this always requires
    /// a session: the token is mandatory for every operation except login
    /// and anonymous search, so an unauthenticated call logs in first (or
    /// fails with `NotAuthenticated` when no credentials exist).
    pub async fn products(&mut self, line_numbers: &[String]) -> Result<Vec<Product>, ApiError> {
        self.run_with_auth(|ctx| async move {
            ctx.dispatcher
                .fetch_products(line_numbers, Some(&ctx.session.access_token))
                .await
        })
        .await
    }

    async fn rest_search(
        &mut self,
        kind: SearchKind,
        body: Value,
    ) -> Result<SearchResults, ApiError> {
        if self.is_authenticated() {
            self.run_with_auth(|ctx| {
                let body = body.clone();
                async move {
                    ctx.dispatcher
                        .execute_rest(
                            kind,
                            ctx.session.customer_id_param(),
                            body,
                            Some(&ctx.session.access_token),
                        )
                        .await
                }
            })
            .await
        } else {
            self.dispatcher().execute_rest(kind, None, body, None).await
        }
    }
}

async fn fetch_trolley(
    dispatcher: &ProtocolDispatcher,
    session: &Session,
) -> Result<Trolley, ApiError> {
    let variables = json!({ "orderId": session.customer_order_id });
    let data: TrolleyData = dispatcher
        .execute_graphql(GET_TROLLEY, variables, Some(&session.access_token))
        .await?;
    let mut trolley = data.get_trolley;
    check_failures(trolley.failures.take())?;
    Ok(trolley)
}

async fn fetch_orders(
    dispatcher: &ProtocolDispatcher,
    session: &Session,
    scope: OrderScope,
) -> Result<Vec<Order>, ApiError> {
    let variables = json!({ "status": scope.status() });
    let data: OrdersData = dispatcher
        .execute_graphql(CUSTOMER_ORDERS, variables, Some(&session.access_token))
        .await?;
    let mut payload = data.customer_orders;
    check_failures(payload.failures.take())?;
    Ok(payload.orders)
}

async fn fetch_slot_days(
    dispatcher: &ProtocolDispatcher,
    session: &Session,
) -> Result<Vec<SlotDay>, ApiError> {
    let variables = json!({
        "branchId": session.default_branch_id,
        "orderId": session.customer_order_id,
    });
    let data: SlotDaysData = dispatcher
        .execute_graphql(SLOT_DAYS, variables, Some(&session.access_token))
        .await?;
    let mut payload = data.slot_days;
    check_failures(payload.failures.take())?;
    Ok(payload.days)
}

fn search_body(term: &str) -> Value {
    json!({
        "customerSearchRequest": {
            "queryParams": {
                "searchTerm": term,
                "sortBy": "RELEVANCE",
                "size": 24
            }
        }
    })
}

fn browse_body(category: &str) -> Value {
    json!({
        "customerSearchRequest": {
            "queryParams": {
                "category": category,
                "size": 24
            }
        }
    })
}

/// A non-empty nested failure list is a business rejection, raised as-is
/// and never auto-retried.
fn check_failures(failures: Option<Vec<ApiFailure>>) -> Result<(), ApiError> {
    match failures {
        Some(failures) if !failures.is_empty() => Err(ApiError::Domain { failures }),
        _ => Ok(()),
    }
}
