//! Testing infrastructure for widget-stats.
//!
//! - **Fixtures**: run and test-item builders
//! - **Mocks**: an in-memory [`RecordSource`](crate::record::RecordSource)
//! - **Assertions**: checks for widget content shape
//!
//! # Example
//!
//! ```
//! use widget_stats::testing::{at, history_item, run_with_executions};
//!
//! let runs = vec![
//!     run_with_executions("1", "Smoke", at(2024, 1, 1), 8, 1, 1),
//!     run_with_executions("2", "Smoke", at(2024, 1, 2), 10, 0, 0),
//! ];
//! let item = history_item("login", &["PASSED", "FAILED"]);
//! assert_eq!(runs.len(), 2);
//! assert_eq!(item.status_history.len(), 2);
//! ```

pub mod assertions;
pub mod fixtures;
pub mod mocks;

pub use assertions::*;
pub use fixtures::*;
pub use mocks::*;
