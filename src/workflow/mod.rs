//! Kanban workflow engine: projects, boards, ordered task states, tasks,
//! assignments and the audit log that drives notifications.
//!
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`] (in-memory, PostgreSQL and
//!   HTTP collaborator clients)
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
