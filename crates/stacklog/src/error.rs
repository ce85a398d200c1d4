use thiserror::Error;

/// Errors raised while reconstructing edit events. All of them end the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconstructError {
    /// The record body does not start with `UNDO` or `REDO`.
    #[error("line {line}, column {column}: expected UNDO or REDO, found {found:?}")]
    MalformedAction {
        line: usize,
        column: usize,
        found: String,
    },

    /// A delimiter is missing or a captured field is not well formed.
    #[error("line {line}, column {column}: expected {expected}, found {found:?}")]
    MalformedField {
        line: usize,
        column: usize,
        expected: &'static str,
        found: String,
    },

    /// The source has no lines at all.
    #[error("log contains no lines")]
    EmptyInput,
}

impl ReconstructError {
    /// Zero-based index of the offending line, if the error is tied to one.
    pub fn line(&self) -> Option<usize> {
        match self {
            ReconstructError::MalformedAction { line, .. }
            | ReconstructError::MalformedField { line, .. } => Some(*line),
            ReconstructError::EmptyInput => None,
        }
    }
}

/// A grammar failure positioned within a record payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarError {
    pub offset: usize,
    pub kind: GrammarErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarErrorKind {
    Action { found: String },
    Field { expected: &'static str, found: String },
}

impl GrammarError {
    pub fn action(offset: usize, found: impl Into<String>) -> Self {
        Self {
            offset,
            kind: GrammarErrorKind::Action {
                found: found.into(),
            },
        }
    }

    pub fn field(offset: usize, expected: &'static str, found: impl Into<String>) -> Self {
        Self {
            offset,
            kind: GrammarErrorKind::Field {
                expected,
                found: found.into(),
            },
        }
    }

    /// Anchors the error to a source line whose payload starts at `base`.
    pub fn at_line(self, line: usize, base: usize) -> ReconstructError {
        let column = base + self.offset;
        match self.kind {
            GrammarErrorKind::Action { found } => ReconstructError::MalformedAction {
                line,
                column,
                found,
            },
            GrammarErrorKind::Field { expected, found } => ReconstructError::MalformedField {
                line,
                column,
                expected,
                found,
            },
        }
    }
}
