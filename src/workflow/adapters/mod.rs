//! Adapter implementations for workflow ports.

pub mod http;
pub mod memory;
pub mod postgres;
