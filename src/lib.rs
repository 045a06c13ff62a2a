//! Unofficial client for an online grocery service.
//!
//! The service exposes a GraphQL endpoint (sessions, trolley, orders,
//! slots) and two REST endpoints (search/browse, product lookup). The
//! interesting part lives in [`api`]: the session lifecycle and the
//! protocol-dispatch layer that attaches the session to every outgoing
//! call, detects expiry reactively, and re-authenticates exactly once
//! before giving up.

pub mod api;
pub mod cli;
pub mod config;
pub mod logging;
