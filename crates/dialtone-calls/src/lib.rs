//! Call simulation core for Dialtone.
//!
//! Three pieces, leaves first:
//!
//! | Piece | Role |
//! |-------|------|
//! | [`CallLogStore`] | append-only SQLite log of status transitions |
//! | [`CallEventBus`] | in-process fan-out of live status events |
//! | [`CallSimulator`] | one detached task per call, stepping through the fixed status sequence |
//!
//! Both the store and the bus are shared by every running simulation and
//! are safe to use concurrently; they are created once at startup and handed
//! to the simulator explicitly.
//!
//! # Usage
//!
//! ```rust,ignore
//! use dialtone_calls::{CallEventBus, CallLogStore, CallSimulator};
//!
//! let bus = CallEventBus::default();
//! let simulator = CallSimulator::new(CallLogStore::new(pool), bus.clone());
//!
//! let mut events = bus.subscribe();
//! simulator.spawn("abc123");
//! while let Ok(event) = events.recv().await {
//!     println!("{} -> {}", event.call_id, event.status);
//! }
//! ```

mod bus;
mod error;
mod simulator;
mod store;

pub use bus::CallEventBus;
pub use error::CallLogError;
pub use simulator::{CallSimulator, SimulationReport, StoreFailurePolicy, DEFAULT_STEP_INTERVAL};
pub use store::{append_entry, list_entries, list_entries_for_call, CallLogEntry, CallLogStore};
