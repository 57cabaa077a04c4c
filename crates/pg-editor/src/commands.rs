//! Undo/redo history.
//!
//! Every discrete edit is a named `Command` holding a forward and a
//! backward document transform. The standard command just hands back
//! snapshots taken when it was pushed, so undo followed by redo restores
//! the exact document. Snapshots are cheap because `Document` shares its
//! node storage.
//!
//! Continuous edits (drag frames) never reach the history: the editor
//! pushes one snapshot command for the whole gesture on release.

use pg_core::Document;
use std::fmt;

type Transform = Box<dyn Fn(&Document) -> Document>;

/// A reversible, named edit.
pub struct Command {
    name: String,
    redo: Transform,
    undo: Transform,
}

impl Command {
    pub fn new(
        name: impl Into<String>,
        redo: impl Fn(&Document) -> Document + 'static,
        undo: impl Fn(&Document) -> Document + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            redo: Box::new(redo),
            undo: Box::new(undo),
        }
    }

    /// Command that ignores its input and restores `before` / `after`.
    pub fn snapshot(name: impl Into<String>, before: Document, after: Document) -> Self {
        Self::new(name, move |_| after.clone(), move |_| before.clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Result of an undo or redo.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryStep {
    pub doc: Document,
    /// Name of the applied command, `None` if the stack was empty.
    pub name: Option<String>,
}

/// Linear undo/redo stacks.
#[derive(Debug, Default)]
pub struct History {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    /// Maximum undo depth, `None` for unbounded.
    max_depth: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// History that drops its oldest entry beyond `max_depth`.
    pub fn with_limit(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
            ..Self::default()
        }
    }

    /// Record a new edit. Discards the redo branch.
    pub fn push(&mut self, cmd: Command) {
        log::debug!("history: push {:?}", cmd.name);
        self.undo_stack.push(cmd);
        if let Some(max) = self.max_depth
            && self.undo_stack.len() > max
        {
            let excess = self.undo_stack.len() - max;
            self.undo_stack.drain(..excess);
        }
        self.redo_stack.clear();
    }

    /// Apply the top command's backward transform to `doc`.
    /// With nothing to undo, returns `doc` unchanged and no name.
    pub fn undo(&mut self, doc: &Document) -> HistoryStep {
        let Some(cmd) = self.undo_stack.pop() else {
            return HistoryStep {
                doc: doc.clone(),
                name: None,
            };
        };
        let next = (cmd.undo)(doc);
        let name = cmd.name.clone();
        log::debug!("history: undo {name:?}");
        self.redo_stack.push(cmd);
        HistoryStep {
            doc: next,
            name: Some(name),
        }
    }

    /// Mirror of `undo` for the redo stack.
    pub fn redo(&mut self, doc: &Document) -> HistoryStep {
        let Some(cmd) = self.redo_stack.pop() else {
            return HistoryStep {
                doc: doc.clone(),
                name: None,
            };
        };
        let next = (cmd.redo)(doc);
        let name = cmd.name.clone();
        log::debug!("history: redo {name:?}");
        self.undo_stack.push(cmd);
        HistoryStep {
            doc: next,
            name: Some(name),
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Empty both stacks.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
