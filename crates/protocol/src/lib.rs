//! Wire protocol for line-oriented board engines - pure and I/O free
//!
//! The engine speaks plain text over its standard streams:
//!
//! - **Outbound**: one line per command, either the handshake literal or two
//!   whitespace-separated integers (`"<a> <b>"`, order set by
//!   [`CoordinateOrder`](types::CoordinateOrder)).
//! - **Inbound**: any number of lines. A line with exactly eight
//!   whitespace-separated tokens is a grid row; everything else is noise
//!   (prompts, debug prints) and is thrown away.
//!
//! Twenty-four consecutive grid rows form one block: board, sides and
//! highlights, eight rows each.
//!
//! # Module Structure
//!
//! - [`classify`]: the eight-token board-row predicate
//! - [`block`]: splitting a complete block into a [`Snapshot`](types::Snapshot)
//! - [`command`]: encoding requests into outbound lines
//!
//! # Example
//!
//! ```
//! use engine_adapter_protocol::{is_board_line, parse_block, Command, WireFormat};
//!
//! assert!(is_board_line("r n b q k b n r"));
//! assert!(!is_board_line("Enter a move:"));
//!
//! let line = Command::MovePiece { row: 5, col: 1 }.encode(&WireFormat::default());
//! assert_eq!(line.as_deref(), Some("5 1"));
//!
//! let rows: Vec<String> = (0..24).map(|_| "a b c d e f g h".to_string()).collect();
//! let snapshot = parse_block(&rows).unwrap();
//! assert_eq!(snapshot.highlights.cell(7, 7), Some("h"));
//! ```

pub mod block;
pub mod classify;
pub mod command;

pub use engine_adapter_types as types;

pub use block::{parse_block, parse_grid, BlockError};
pub use classify::{is_board_line, token_count};
pub use command::{Command, WireFormat};
