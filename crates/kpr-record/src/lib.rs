//! # kpr-record
//!
//! Fixed-schema event-record container and reader for the K/π analysis.
//!
//! Records live in a JSON container as named, ordered record sets. Each
//! record carries event scalars plus struct-of-arrays particle blocks with
//! declared counts. The reader clamps declared counts to the compiled
//! per-category capacities before any column is indexed and surfaces short
//! columns as per-entry read failures (skip signals, never stream aborts).
//!
//! ## Example
//!
//! ```no_run
//! use kpr_record::RecordFile;
//!
//! let file = RecordFile::open("events.json").unwrap();
//! let mut reader = file.record_set("events").unwrap();
//! for i in 0..reader.entry_count() {
//!     let event = reader.read(i).unwrap();
//!     println!("nch = {}", event.nch);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod event;
pub mod reader;
pub mod schema;
pub mod store;

pub use event::{CandidateBlock, EventRecord, GenBlock, RecoBlock, SimBlock};
pub use reader::EventReader;
pub use store::RecordFile;
