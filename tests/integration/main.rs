//! Integration tests for Page-Lens
//!
//! These tests use wiremock to stand in for the analysed sites and drive the
//! HTTP API through the axum router without binding a socket.

mod analyze_tests;
mod api_tests;
