//! State controllers behind the back-office admin screens.
//!
//! - [`ResourceListController`]: filter/sort/page state, list fetching with
//!   stale-response discard, create/edit modal lifecycle.
//! - [`StatusToggleCoordinator`]: one in-flight status flip at a time with
//!   bounded, backed-off retry.
//! - [`SalesReportController`]: report table range plus the companion
//!   chart window chosen by the period planner.
//!
//! One controller instance lives for one screen; nothing is shared across
//! screens.

pub mod list;
pub mod modal;
pub mod report;
pub mod retry;
pub mod toggle;

pub use list::{ListSnapshot, Reload, ResourceListController};
pub use modal::ModalState;
pub use report::{ReportSnapshot, SalesReportController};
pub use retry::ToggleRetryConfig;
pub use toggle::{
    ProtectedResourcePolicy, StatusToggleCoordinator, ToggleOutcome, TogglePhase,
    TogglePolicy, ToggleRejection, ToggleState,
};
