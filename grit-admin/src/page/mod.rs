//! Resource pages
//!
//! Ties one resource definition to the API: screen state, list queries,
//! mutations with notifications and form routes.

pub mod filters;
pub mod notify;
pub mod route;
pub mod service;
pub mod state;

pub use filters::{FilterChoice, FilterState, filter_choices, normalize_filter_value, parse_filter_arg};
pub use notify::{Level, Notifier, TerminalNotifier};
pub use route::FormRoute;
pub use service::{BulkDeleteReport, ResourceService};
pub use state::{Confirmation, FormTarget, Modal, ResourcePage};
