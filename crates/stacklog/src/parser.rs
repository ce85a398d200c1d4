use crate::error::ReconstructError;
use crate::grammar;
use crate::ir::{Annotations, RecordKind, StackEvent, strip_terminator};

/// Everything a completed run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconstruction {
    pub events: Vec<StackEvent>,
    pub annotations: Annotations,
}

/// Rebuilds edit events from stack log lines.
///
/// The reconstructor is a single-pass fold over the log. The only state
/// carried between lines is the index of the most recent APPEND record, which
/// EDIT records correlate to, plus the [`Annotations`] recording the latest
/// raw text correlated to each target line.
///
/// Lines can be fed one at a time with [`process_line`](Self::process_line),
/// as arbitrary chunks with [`update`](Self::update) and
/// [`finish`](Self::finish), or all at once with [`parse`](Self::parse).
/// Any malformed record ends the run: the error is returned and the
/// reconstructor should be discarded.
#[derive(Debug, Default)]
pub struct Reconstructor {
    last_append: Option<usize>,
    annotations: Annotations,
    lines_seen: usize,
    buffer: String,
}

impl Reconstructor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the most recent APPEND record, if any has been seen.
    pub fn last_append(&self) -> Option<usize> {
        self.last_append
    }

    pub fn lines_seen(&self) -> usize {
        self.lines_seen
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    pub fn into_annotations(self) -> Annotations {
        self.annotations
    }

    /// Folds one line into the state and returns its event, if it is a record.
    ///
    /// `index` is the line's zero-based position in the log and `text` may
    /// still carry its terminator. Lines must be fed in ascending order.
    ///
    /// An EDIT record seen before any APPEND correlates to line 0.
    pub fn process_line(
        &mut self,
        index: usize,
        text: &str,
    ) -> Result<Option<StackEvent>, ReconstructError> {
        self.lines_seen += 1;
        let body = strip_terminator(text);

        let kind = RecordKind::classify(body);
        let Some(prefix) = kind.prefix() else {
            log::trace!("line {}: not a stack record", index);
            return Ok(None);
        };

        let target = match kind {
            RecordKind::Append => {
                self.last_append = Some(index);
                index
            }
            _ => self.last_append.unwrap_or_else(|| {
                log::warn!(
                    "line {}: STACK_EDIT before any STACK_APPEND, correlating to line 0",
                    index
                );
                0
            }),
        };

        let payload = body[prefix.len()..].strip_prefix('(').ok_or_else(|| {
            ReconstructError::MalformedField {
                line: index,
                column: prefix.len(),
                expected: "'('",
                found: body[prefix.len()..]
                    .chars()
                    .next()
                    .map_or_else(|| "end of line".to_string(), String::from),
            }
        })?;
        let base = prefix.len() + 1;
        let edit = grammar::parse_record(payload).map_err(|e| e.at_line(index, base))?;

        log::debug!(
            "line {}: {:?} {} -> target {}",
            index,
            kind,
            edit.action.keyword(),
            target
        );
        self.annotations.record(target, body);

        Ok(Some(StackEvent {
            line: index,
            target,
            kind,
            edit,
        }))
    }

    /// Appends a chunk of log text and processes every complete line in it.
    ///
    /// A trailing partial line stays buffered until more input arrives or
    /// [`finish`](Self::finish) is called.
    pub fn update(&mut self, chunk: &str) -> Result<Vec<StackEvent>, ReconstructError> {
        self.buffer.push_str(chunk);
        let Some(last_nl) = self.buffer.rfind('\n') else {
            return Ok(Vec::new());
        };

        let complete: String = self.buffer.drain(..=last_nl).collect();
        let mut events = Vec::new();
        for line in complete.split_inclusive('\n') {
            let index = self.lines_seen;
            if let Some(event) = self.process_line(index, line)? {
                events.push(event);
            }
        }
        Ok(events)
    }

    /// Flushes any buffered partial line as the final, terminated line.
    ///
    /// Fails with [`ReconstructError::EmptyInput`] if no line was ever seen.
    pub fn finish(mut self) -> Result<Reconstruction, ReconstructError> {
        let mut events = Vec::new();
        if !self.buffer.is_empty() {
            let mut last = std::mem::take(&mut self.buffer);
            last.push('\n');
            let index = self.lines_seen;
            if let Some(event) = self.process_line(index, &last)? {
                events.push(event);
            }
        }
        if self.lines_seen == 0 {
            return Err(ReconstructError::EmptyInput);
        }
        Ok(Reconstruction {
            events,
            annotations: self.annotations,
        })
    }

    /// Reconstructs every event of a complete log held in memory.
    pub fn parse(mut self, input: &str) -> Result<Reconstruction, ReconstructError> {
        let mut events = self.update(input)?;
        let mut rest = self.finish()?;
        events.append(&mut rest.events);
        Ok(Reconstruction {
            events,
            annotations: rest.annotations,
        })
    }
}

/// A lazy, ordered sequence of events over a sequence of log lines.
///
/// Nothing is parsed until the iterator is pulled. The first error is yielded
/// once and the iterator then ends; a source with no lines yields
/// [`ReconstructError::EmptyInput`]. Dropping the iterator early simply stops
/// the run.
///
/// ```
/// use stacklog::Events;
///
/// let lines = ["NOTICE: started\n", "STACK_APPEND(UNDO 0:(0,0):(0,3) - x:\"foo\"\n"];
/// let events: Vec<_> = Events::new(lines).collect::<Result<_, _>>()?;
/// assert_eq!(events.len(), 1);
/// assert_eq!(events[0].edit.to_string(), "true, (0, 0), (0, 3), foo");
/// # Ok::<(), stacklog::ReconstructError>(())
/// ```
pub struct Events<I> {
    lines: I,
    reconstructor: Reconstructor,
    done: bool,
}

impl<I> Events<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    pub fn new<L>(lines: L) -> Self
    where
        L: IntoIterator<IntoIter = I>,
    {
        Self {
            lines: lines.into_iter(),
            reconstructor: Reconstructor::new(),
            done: false,
        }
    }

    /// Annotations gathered from the lines consumed so far.
    pub fn annotations(&self) -> &Annotations {
        self.reconstructor.annotations()
    }

    pub fn into_annotations(self) -> Annotations {
        self.reconstructor.into_annotations()
    }
}

impl<I> Iterator for Events<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = Result<StackEvent, ReconstructError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let Some(line) = self.lines.next() else {
                self.done = true;
                if self.reconstructor.lines_seen() == 0 {
                    return Some(Err(ReconstructError::EmptyInput));
                }
                break;
            };
            let index = self.reconstructor.lines_seen();
            match self.reconstructor.process_line(index, line.as_ref()) {
                Ok(Some(event)) => return Some(Ok(event)),
                Ok(None) => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}

impl<I> std::iter::FusedIterator for Events<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
}
