//! Test Module
//!
//! Comprehensive test suite for the GuestWise backend.
//!
//! ## Test Categories
//! - `brain_tests`: language detection, prompt synthesis, fallback answers,
//!   arrival/departure classification
//! - `database_tests`: profile and question-record CRUD, FAQ upserts
//! - `analytics_tests`: feedback idempotency, FAQ synthesis thresholds
//! - `orchestrator_tests`: full conversation cycle against a mock provider

pub mod analytics_tests;
pub mod orchestrator_tests;
