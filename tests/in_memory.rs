//! HTTP integration tests over the in-memory backend.
//!
//! Tests are organized into modules by resource:
//! - `board_tests`: Projects, boards and task state ordering
//! - `task_tests`: Task lifecycle, assignments and history
//! - `file_tests`: Task file attachments
//! - `error_tests`: Status codes and error envelopes

mod in_memory {
    pub mod helpers;

    mod board_tests;
    mod error_tests;
    mod file_tests;
    mod task_tests;
}
