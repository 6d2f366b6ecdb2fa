//! Integration tests for Universe-Crawler
//!
//! These tests run the HTTP client and the full crawl against wiremock
//! servers standing in for the game catalogue.

mod client_tests;
mod crawl_tests;
