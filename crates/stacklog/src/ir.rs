use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ReconstructError;
use crate::grammar;

/// Opening token of an APPEND record.
pub const APPEND_PREFIX: &str = "STACK_APPEND";
/// Opening token of an EDIT record.
pub const EDIT_PREFIX: &str = "STACK_EDIT";

/// A `(row, column)` coordinate in the edited text.
///
/// Positions order row-major: rows compare first, columns break ties.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TextPosition {
    pub row: i32,
    pub col: i32,
}

impl TextPosition {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

impl From<(i32, i32)> for TextPosition {
    fn from((row, col): (i32, i32)) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The range of text touched by an edit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextSpan {
    pub start: TextPosition,
    pub end: TextPosition,
}

impl TextSpan {
    pub fn new(start: impl Into<TextPosition>, end: impl Into<TextPosition>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionKind {
    Undo,
    Redo,
}

impl ActionKind {
    /// The literal keyword used in the log encoding.
    pub fn keyword(self) -> &'static str {
        match self {
            ActionKind::Undo => "UNDO",
            ActionKind::Redo => "REDO",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "UNDO" => Some(ActionKind::Undo),
            "REDO" => Some(ActionKind::Redo),
            _ => None,
        }
    }

    pub fn is_undo(self) -> bool {
        matches!(self, ActionKind::Undo)
    }
}

/// Classification of a raw log line by its leading token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordKind {
    Append,
    Edit,
    Other,
}

impl RecordKind {
    pub fn classify(line: &str) -> Self {
        if line.starts_with(APPEND_PREFIX) {
            RecordKind::Append
        } else if line.starts_with(EDIT_PREFIX) {
            RecordKind::Edit
        } else {
            RecordKind::Other
        }
    }

    /// The leading token matched by [`RecordKind::classify`], without the `(`.
    pub fn prefix(self) -> Option<&'static str> {
        match self {
            RecordKind::Append => Some(APPEND_PREFIX),
            RecordKind::Edit => Some(EDIT_PREFIX),
            RecordKind::Other => None,
        }
    }
}

/// A reconstructed undo or redo of a text region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditEvent {
    pub action: ActionKind,
    pub span: TextSpan,
    pub word: String,
}

impl EditEvent {
    pub fn new(action: ActionKind, span: TextSpan, word: impl Into<String>) -> Self {
        Self {
            action,
            span,
            word: word.into(),
        }
    }

    /// `true` for UNDO, `false` for REDO.
    pub fn undo(&self) -> bool {
        self.action.is_undo()
    }
}

impl fmt::Display for EditEvent {
    /// Renders `{undo}, {start}, {end}, {word}`, e.g. `true, (1, 2), (3, 4), cat`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}",
            self.undo(),
            self.span.start,
            self.span.end,
            self.word
        )
    }
}

impl FromStr for EditEvent {
    type Err = ReconstructError;

    /// Parses the [`Display`](fmt::Display) rendering back into an event.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        grammar::parse_rendered(s).map_err(|e| e.at_line(0, 0))
    }
}

/// An [`EditEvent`] together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackEvent {
    /// Zero-based index of the source line.
    pub line: usize,
    /// Line slot the record's raw text is written back to.
    pub target: usize,
    pub kind: RecordKind,
    #[serde(flatten)]
    pub edit: EditEvent,
}

/// Latest correlated raw text per target line, terminator stripped.
///
/// This replaces rewriting the line buffer in place: the sink decides whether
/// to [`apply`](Annotations::apply) it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Annotations(BTreeMap<usize, String>);

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `text` for `target`, replacing anything recorded earlier.
    pub fn record(&mut self, target: usize, text: impl Into<String>) {
        self.0.insert(target, text.into());
    }

    pub fn get(&self, target: usize) -> Option<&str> {
        self.0.get(&target).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Overwrites each annotated slot of `buffer`. Slots past the end are ignored.
    pub fn apply(&self, buffer: &mut LineBuffer) {
        for (index, text) in self.iter() {
            if let Some(line) = buffer.lines.get_mut(index) {
                line.text = text.to_string();
            }
        }
    }
}

/// One line of the source log, terminator included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLogLine {
    pub index: usize,
    pub text: String,
}

/// The ordered lines of a log held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    lines: Vec<RawLogLine>,
}

impl LineBuffer {
    /// Splits `text` into lines, keeping terminators.
    ///
    /// The final line is terminated with `\n` if the source omitted it.
    pub fn from_text(text: &str) -> Self {
        let mut lines: Vec<RawLogLine> = text
            .split_inclusive('\n')
            .enumerate()
            .map(|(index, line)| RawLogLine {
                index,
                text: line.to_string(),
            })
            .collect();
        if let Some(last) = lines.last_mut() {
            if !last.text.ends_with('\n') {
                last.text.push('\n');
            }
        }
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RawLogLine> {
        self.lines.get(index)
    }

    pub fn lines(&self) -> &[RawLogLine] {
        &self.lines
    }

    /// Line texts in order, suitable for [`Events`](crate::Events).
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| l.text.as_str())
    }
}

/// Strips a trailing `\n` or `\r\n`.
pub(crate) fn strip_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
