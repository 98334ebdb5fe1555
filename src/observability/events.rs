//! Observable events
//!
//! Events are explicit and typed. Each carries its own severity.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Startup begins
    BootStart,
    /// Configuration loaded
    ConfigLoaded,
    /// Store opened (in-memory or durable)
    StoreOpened,
    /// HTTP server accepting requests
    Serving,
    /// Startup failed, process exits
    BootFailed,

    // Transactions
    /// Write transaction discarded
    TxnRolledBack,
    /// Commit could not be persisted
    TxnCommitFailed,

    // Balance engine
    /// Checker produced a verdict
    BalanceChecked,
    /// Repair started
    RepairBegin,
    /// Repair committed
    RepairComplete,
    /// Repair aborted, nothing persisted
    RepairFailed,

    // Resources
    /// Row created through the API
    ResourceCreated,
    /// Row deleted through the API
    ResourceDeleted,
    /// Request rejected with a client or server error
    RequestRejected,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "MULTIVERSE_STARTUP_BEGIN",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StoreOpened => "STORE_OPENED",
            Event::Serving => "MULTIVERSE_SERVING",
            Event::BootFailed => "MULTIVERSE_STARTUP_FAILED",

            Event::TxnRolledBack => "TXN_ROLLED_BACK",
            Event::TxnCommitFailed => "TXN_COMMIT_FAILED",

            Event::BalanceChecked => "BALANCE_CHECK_COMPLETE",
            Event::RepairBegin => "BALANCE_REPAIR_BEGIN",
            Event::RepairComplete => "BALANCE_REPAIR_COMPLETE",
            Event::RepairFailed => "BALANCE_REPAIR_FAILED",

            Event::ResourceCreated => "RESOURCE_CREATED",
            Event::ResourceDeleted => "RESOURCE_DELETED",
            Event::RequestRejected => "REQUEST_REJECTED",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Event::BootFailed => Severity::Fatal,
            Event::TxnCommitFailed | Event::RepairFailed => Severity::Error,
            Event::TxnRolledBack | Event::RequestRejected => Severity::Warn,
            Event::ResourceCreated | Event::ResourceDeleted | Event::BalanceChecked => {
                Severity::Trace
            }
            _ => Severity::Info,
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
