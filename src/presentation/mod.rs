//! Presentation Layer
//!
//! A thin HTTP surface for driving the wanted pipeline manually and
//! checking status. Endpoint shapes here are intentionally minimal;
//! the outer UI/automation layer is expected to wrap this, not mirror it.

pub mod http;
