//! Session configuration.

use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::protocol::WireFormat;
use crate::types::{
    CoordinateOrder, SelectResponse, DEFAULT_LINE_TIMEOUT_MS, TWO_PLAYER_HANDSHAKE,
};

/// What to do with the engine's stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StderrMode {
    /// Connect to the null device so the engine never blocks on a full pipe.
    #[default]
    Discard,
    /// Share the embedding process's stderr.
    Inherit,
}

impl StderrMode {
    pub(crate) fn stdio(self) -> Stdio {
        match self {
            StderrMode::Discard => Stdio::null(),
            StderrMode::Inherit => Stdio::inherit(),
        }
    }
}

/// Per-engine settings.
///
/// Missing fields fall back to [`SessionConfig::default`] when deserialized,
/// so a config file only needs to name what differs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Extra command-line arguments for the engine executable.
    pub args: Vec<String>,
    pub coordinate_order: CoordinateOrder,
    pub select_response: SelectResponse,
    /// Line written once right after spawn, before any operation.
    pub handshake: Option<String>,
    /// Wait for each output line, in milliseconds.
    pub line_timeout_ms: u64,
    pub stderr: StderrMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            coordinate_order: CoordinateOrder::RowColumn,
            select_response: SelectResponse::Single,
            handshake: None,
            line_timeout_ms: DEFAULT_LINE_TIMEOUT_MS,
            stderr: StderrMode::Discard,
        }
    }
}

impl SessionConfig {
    /// Settings for the two-player console engine: `3` selects the mode,
    /// squares are sent column first, and a selection prints a highlighted
    /// board followed by a cleared one.
    pub fn two_player() -> Self {
        Self {
            coordinate_order: CoordinateOrder::ColumnRow,
            select_response: SelectResponse::HighlightThenClear,
            handshake: Some(TWO_PLAYER_HANDSHAKE.to_string()),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid session config")
    }

    pub fn line_timeout(&self) -> Duration {
        Duration::from_millis(self.line_timeout_ms)
    }

    pub fn wire_format(&self) -> WireFormat {
        WireFormat {
            coordinate_order: self.coordinate_order,
            handshake: self.handshake.clone(),
        }
    }
}
