//! `PostgreSQL` integration tests for the workflow repository.
//!
//! Each test creates its own database on the server named by
//! `TASKBOARD_TEST_DATABASE_URL`, applies the schema and drops the database
//! afterwards. Tests pass trivially when the variable is unset.
//!
//! - `board_tests`: state ordering under row locks, cascades
//! - `task_tests`: task lifecycle, audit log and notification outbox
//! - `file_tests`: task file bookkeeping

mod postgres {
    pub mod helpers;

    mod board_tests;
    mod file_tests;
    mod task_tests;
}
