//! Client side of the DICT protocol (RFC 2229).
//!
//! This module holds everything needed to talk to a dictionary server over a single
//! persistent connection: line framing, status-line parsing, tokenizing of response
//! lines and the state machine that ties one command to its full response.
//!
//! # Overview
//!
//! The protocol is line oriented text. Every command gets exactly one status line
//! back, `<code> <text>`. Some codes announce one or more data blocks, each a run of
//! lines ended by a line holding a single `.`, followed by a closing `250` status.
//!
//! # Key Components
//!
//! - [`split_atoms`]: splits a response line into bare and double-quoted atoms.
//! - [`Status`]: a parsed status line.
//! - [`DictConnection`]: owns the channel, runs the 220 greeting handshake and
//!   exposes the lookup operations.
//! - [`DictError`]: the single failure type returned by every operation.
//!
//! # Framing
//!
//! - Command lines are written with a trailing `\n` and flushed immediately.
//! - Incoming lines may end in `\r\n` or `\n`; both are stripped.
//! - A data line consisting only of `.` ends the block; no dot-unstuffing is done.
//!
//! # See Also
//!
//! - [`model`](crate::model): values built from server responses.
mod atoms;
mod config;
mod connection;
mod error;
mod status;
mod transport;

use transport::LineTransport;

pub use atoms::split_atoms;
pub use config::{ConnectionConfig, DEFAULT_PORT};
pub use connection::{ConnectionState, DictConnection};
pub use error::{DictError, ErrorKind};
pub use status::Status;
