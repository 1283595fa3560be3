//! Bankcode - bank branch lookup engine
//!
//! This library provides the selection state machine, address
//! synchronization and catalog access behind the bank/branch lookup tools.

pub mod catalog;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod events;
pub mod location;
pub mod logging;
pub mod selection;
pub mod sequencer;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use catalog::{CatalogClient, CatalogResult};
pub use clipboard::{ClipboardSink, ExportKind, MemoryClipboard, SystemClipboard};
pub use config::Config;
pub use error::{BankcodeError, CatalogError, ClipboardError, ConfigError, Result};
pub use events::{EventBus, Notice, SessionEvent};
pub use location::{History, Location, LocationSynchronizer, MemoryHistory};
pub use selection::{Phase, Selection, SelectionStateMachine, Snapshot};
pub use session::LookupSession;
pub use types::{Bank, Branch};
