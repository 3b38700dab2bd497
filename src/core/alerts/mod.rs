// Alert pipeline: typed events in, operator-facing alerts and toasts out.
//
// Architecture:
// - triggers.rs: Maps bus events to new alerts
// - store.rs: Capped, newest-first alert list with read state and filtering
// - toast.rs: Transient notifications for freshly raised alerts

pub mod store;
pub mod toast;
pub mod triggers;
