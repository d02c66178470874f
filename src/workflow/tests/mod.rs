//! Unit tests for the workflow module.
//!
//! Tests are organised by concern: the state ordering arithmetic, domain
//! validation, service orchestration over the in-memory adapters, and the
//! notification dispatcher.

mod domain_tests;
