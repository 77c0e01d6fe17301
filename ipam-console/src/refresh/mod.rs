//! Periodic refresh of the on-screen view and its reference caches

pub mod cycle;
pub mod scheduler;
pub mod view;

pub use cycle::{RefreshOutcome, ViewRows, refresh_kinds, run_cycle};
pub use scheduler::{RefreshScheduler, RefreshTicket};
pub use view::{View, device_rows};
