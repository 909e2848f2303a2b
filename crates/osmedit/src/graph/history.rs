use super::{Difference, Graph};
use log::debug;

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub graph: Graph,
    pub annotation: Option<String>,
}

/// Undo stack of graphs.
///
/// Entry 0 is the base graph and carries no annotation. `index` points at
/// the current entry; performing an edit drops everything after it.
#[derive(Debug, Clone)]
pub struct History {
    stack: Vec<HistoryEntry>,
    index: usize,
}

impl History {
    pub fn new(base: Graph) -> Self {
        Self {
            stack: vec![HistoryEntry {
                graph: base,
                annotation: None,
            }],
            index: 0,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.stack[self.index].graph
    }

    pub fn base(&self) -> &Graph {
        &self.stack[0].graph
    }

    /// Runs `action` on the current graph and pushes the result.
    pub fn perform<F>(&mut self, action: F, annotation: impl Into<String>) -> &Graph
    where
        F: FnOnce(&Graph) -> Graph,
    {
        let graph = action(self.graph());
        let annotation = annotation.into();
        debug!(annotation = annotation.as_str(), index = self.index + 1; "History perform");
        self.stack.truncate(self.index + 1);
        self.stack.push(HistoryEntry {
            graph,
            annotation: Some(annotation),
        });
        self.index += 1;
        self.graph()
    }

    /// Runs `action` on the current graph and amends the current entry.
    ///
    /// On the base entry this behaves like [`History::perform`], so the base
    /// itself is never rewritten.
    pub fn replace<F>(&mut self, action: F, annotation: impl Into<String>) -> &Graph
    where
        F: FnOnce(&Graph) -> Graph,
    {
        if self.index == 0 {
            return self.perform(action, annotation);
        }
        let graph = action(self.graph());
        let annotation = annotation.into();
        debug!(annotation = annotation.as_str(), index = self.index; "History replace");
        self.stack.truncate(self.index + 1);
        self.stack[self.index] = HistoryEntry {
            graph,
            annotation: Some(annotation),
        };
        self.graph()
    }

    /// Steps back one edit. Returns the annotation of the undone edit.
    pub fn undo(&mut self) -> Option<&str> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        let undone = self.stack[self.index + 1].annotation.as_deref();
        debug!(index = self.index; "History undo");
        undone
    }

    /// Re-applies the next edit. Returns its annotation.
    pub fn redo(&mut self) -> Option<&str> {
        if self.index + 1 >= self.stack.len() {
            return None;
        }
        self.index += 1;
        debug!(index = self.index; "History redo");
        self.stack[self.index].annotation.as_deref()
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.stack.len()
    }

    pub fn difference(&self) -> Difference {
        Difference::new(self.base(), self.graph())
    }

    pub fn has_changes(&self) -> bool {
        !self.difference().is_empty()
    }
}
