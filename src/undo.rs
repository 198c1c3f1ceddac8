//! Undo history for annotation creation.
//!
//! Every successful creation pushes an [`UndoEntry`] naming the annotation
//! by id. Undoing pops the newest entry and the store removes exactly that
//! annotation, never matching on displayed text.

use crate::annotation::{AnnotationId, AnnotationKind, Scope};

/// Back-reference from the history to a created annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoEntry {
    pub kind: AnnotationKind,
    pub id: AnnotationId,
}

impl UndoEntry {
    pub fn description(&self) -> String {
        format!("Add {} #{}", self.kind.name().to_lowercase(), self.id)
    }
}

/// LIFO stack of creation entries (most recent at the end).
#[derive(Debug, Clone, Default)]
pub struct UndoStack {
    entries: Vec<UndoEntry>,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: UndoEntry) {
        log::debug!("📝 Undo: pushed '{}'", entry.description());
        self.entries.push(entry);
    }

    /// Pop the most recent entry, or `None` when there is nothing to undo.
    pub fn pop(&mut self) -> Option<UndoEntry> {
        let entry = self.entries.pop()?;
        log::debug!("⏪ Undo: '{}'", entry.description());
        Some(entry)
    }

    /// Drop every entry within `scope`. Returns how many were dropped.
    pub fn remove_scope(&mut self, scope: Scope) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !scope.includes(e.kind));
        let removed = before - self.entries.len();
        if removed > 0 {
            log::debug!("🗑️ Undo: dropped {} {:?} entries", removed, scope);
        }
        removed
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entry that would be undone next.
    pub fn peek(&self) -> Option<&UndoEntry> {
        self.entries.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: AnnotationKind, id: AnnotationId) -> UndoEntry {
        UndoEntry { kind, id }
    }

    #[test]
    fn test_lifo_order() {
        let mut stack = UndoStack::new();
        stack.push(entry(AnnotationKind::Point, 1));
        stack.push(entry(AnnotationKind::Box, 2));

        assert_eq!(stack.pop(), Some(entry(AnnotationKind::Box, 2)));
        assert_eq!(stack.pop(), Some(entry(AnnotationKind::Point, 1)));
        assert_eq!(stack.pop(), None);
        assert!(!stack.can_undo());
    }

    #[test]
    fn test_remove_scope_keeps_other_kind_in_order() {
        let mut stack = UndoStack::new();
        stack.push(entry(AnnotationKind::Point, 1));
        stack.push(entry(AnnotationKind::Box, 2));
        stack.push(entry(AnnotationKind::Point, 3));
        stack.push(entry(AnnotationKind::Box, 4));

        assert_eq!(stack.remove_scope(Scope::Points), 2);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.peek(), Some(&entry(AnnotationKind::Box, 4)));

        assert_eq!(stack.remove_scope(Scope::All), 2);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_description() {
        assert_eq!(entry(AnnotationKind::Box, 7).description(), "Add box #7");
    }
}
