//! Chess engine adapter (workspace facade crate).
//!
//! Re-exports the member crates under short names so embedders depend on a
//! single package:
//!
//! - [`types`]: grids, snapshots and wire constants
//! - [`protocol`]: line classification, block parsing, command encoding
//! - [`session`]: the subprocess session itself
//!
//! [`mock`] holds a scripted stand-in engine, used by the `mock-engine`
//! binary for end-to-end tests.

pub mod mock;

pub use engine_adapter_protocol as protocol;
pub use engine_adapter_session as session;
pub use engine_adapter_types as types;

pub use engine_adapter_session::{
    Diagnostic, DiagnosticSink, EngineSession, ExchangeError, RecordingSink, SessionConfig,
    SessionState, TracingSink,
};
pub use engine_adapter_types::{CoordinateOrder, Grid, SelectResponse, Snapshot};
