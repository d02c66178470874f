//! Taskboard: kanban workflow engine for organization projects.
//!
//! Projects group boards, boards own an ordered list of task states, and
//! tasks move through those states while every mutation is written to an
//! audit log that feeds outgoing notifications.
//!
//! # Architecture
//!
//! Taskboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence and collaborators
//! - **Adapters**: In-memory, `PostgreSQL` and HTTP implementations of ports
//!
//! # Modules
//!
//! - [`workflow`]: Domain, ports, adapters and services
//! - [`api`]: axum router and JSON mapping
//! - [`config`]: TOML and environment configuration
//! - [`telemetry`]: `tracing` subscriber setup

pub mod api;
pub mod config;
pub mod telemetry;
pub mod workflow;
