//! # stacklog
//!
//! Reconstructs undo/redo edit events from an editor's edit-stack log.
//!
//! ## Overview
//!
//! The editor writes one line per edit-stack operation. Two kinds of line
//! matter; everything else in the log is ignored:
//!
//! ```text
//! STACK_APPEND(<id>:<ACTION> <discard>:(<r1>,<c1>):(<r2>,<c2>) - <junk>:"<word>"
//! STACK_EDIT(<id>:<ACTION> <discard>:(<r1>,<c1>):(<r2>,<c2>) - <junk>:"<word>"
//! ```
//!
//! where `<ACTION>` is `UNDO` or `REDO`. A `STACK_APPEND` opens a new stack
//! entry; a `STACK_EDIT` amends the most recently appended one.
//!
//! ## Architecture
//!
//! ```text
//!  log lines ──► classify ──► correlate ──► grammar ──► StackEvent
//!                (prefix)     (last APPEND)  (lexer)       │
//!                                  │                       ▼
//!                                  └──────────────►  Annotations
//! ```
//!
//! - [`lexer`] tokenizes a record payload.
//! - [`grammar`] describes the payload as a static list of rules.
//! - [`parser`] holds the [`Reconstructor`] fold and the lazy [`Events`] iterator.
//! - [`ir`] defines the typed, serializable event model.
//!
//! Any malformed record is fatal: the run stops at the first
//! [`ReconstructError`], which names the offending line and column.
//!
//! ## Examples
//!
//! ### One-shot
//!
//! ```
//! use stacklog::Reconstructor;
//!
//! let log = "STACK_APPEND(1:UNDO x:(1,1):(1,5) - junk:abc:\"bar\"\n\
//!            STACK_EDIT(2:REDO x:(2,2):(2,9) - junk:abc:\"baz\"\n";
//! let run = Reconstructor::new().parse(log)?;
//!
//! assert_eq!(run.events[0].edit.to_string(), "true, (1, 1), (1, 5), bar");
//! assert_eq!(run.events[1].edit.to_string(), "false, (2, 2), (2, 9), baz");
//! // The EDIT correlates to the APPEND on line 0.
//! assert_eq!(run.events[1].target, 0);
//! # Ok::<(), stacklog::ReconstructError>(())
//! ```
//!
//! ### Lazy
//!
//! ```no_run
//! use stacklog::{Events, LineBuffer};
//! use std::fs;
//!
//! let buffer = LineBuffer::from_text(&fs::read_to_string("edits.log")?);
//! for event in Events::new(buffer.texts()) {
//!     println!("{}", event?.edit);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Error types.
pub mod error;
/// Declarative record grammar.
pub mod grammar;
/// Typed event Intermediate Representation (IR).
pub mod ir;
/// Record tokenizer.
pub mod lexer;
/// Event reconstruction.
pub mod parser;


pub use error::ReconstructError;
pub use ir::{
    ActionKind, Annotations, EditEvent, LineBuffer, RawLogLine, RecordKind, StackEvent,
    TextPosition, TextSpan,
};
pub use parser::{Events, Reconstruction, Reconstructor};

/// Schema version for the serialized event IR.
///
/// - MAJOR: Breaking changes to event structure
/// - MINOR: New optional fields or event types
/// - PATCH: Bug fixes to parsing behavior
pub const SCHEMA_VERSION: &str = "1.0.0";
