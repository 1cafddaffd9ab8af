//! Outbound command encoding.

use crate::types::CoordinateOrder;

/// Per-engine encoding settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WireFormat {
    pub coordinate_order: CoordinateOrder,
    /// Literal sent once at startup; `None` for engines that start ready.
    pub handshake: Option<String>,
}

/// A request to the engine.
///
/// Coordinates are passed through untouched; the engine is trusted to
/// reject or ignore squares it does not understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Initialize,
    SelectPiece { row: i32, col: i32 },
    MovePiece { row: i32, col: i32 },
}

impl Command {
    /// The line to write for this command, without the trailing newline.
    ///
    /// `Initialize` encodes to the handshake literal, or to nothing when the
    /// engine needs no handshake.
    ///
    /// # Examples
    ///
    /// ```
    /// use engine_adapter_protocol::types::CoordinateOrder;
    /// use engine_adapter_protocol::{Command, WireFormat};
    ///
    /// let wire = WireFormat {
    ///     coordinate_order: CoordinateOrder::ColumnRow,
    ///     handshake: Some("3".to_string()),
    /// };
    /// assert_eq!(Command::Initialize.encode(&wire).as_deref(), Some("3"));
    /// assert_eq!(Command::SelectPiece { row: 2, col: 3 }.encode(&wire).as_deref(), Some("3 2"));
    /// ```
    pub fn encode(&self, wire: &WireFormat) -> Option<String> {
        match *self {
            Command::Initialize => wire.handshake.clone(),
            Command::SelectPiece { row, col } | Command::MovePiece { row, col } => {
                let (a, b) = wire.coordinate_order.arrange(row, col);
                Some(format!("{} {}", a, b))
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Initialize => "initialize",
            Command::SelectPiece { .. } => "select_piece",
            Command::MovePiece { .. } => "move_piece",
        }
    }
}
