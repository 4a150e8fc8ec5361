//! User-facing binding configuration.
//!
//! [`Bindings`] is the forward map from an [`Operation`] to the text of its
//! alternatives, for example `Rename = "Shift+F6;F2"`. Entries keep their
//! insertion order, which is also the order conflicts are resolved in: when
//! two operations claim one combination, the one inserted later wins.

use crate::operation::Operation;

/// Separator between alternative combinations of one operation.
pub const ALTERNATIVE_SEPARATOR: char = ';';

/// Splits alternatives text into trimmed, non-empty pieces.
pub fn split_alternatives(text: &str) -> impl Iterator<Item = &str> {
    text.split(ALTERNATIVE_SEPARATOR)
        .map(str::trim)
        .filter(|part| !part.is_empty())
}

/// Ordered `Operation -> alternatives` configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    entries: Vec<(Operation, String)>,
}

impl Bindings {
    /// An empty configuration. Built-in bindings still apply on load.
    pub fn new() -> Self {
        Self::default()
    }

    /// The bindings shipped with the application.
    pub fn defaults() -> Self {
        [
            (Operation::Copy, "Ctrl+C"),
            (Operation::Move, "F5"),
            (Operation::Rename, "Shift+F6;F2"),
            (Operation::Delete, "F8;Delete"),
            (Operation::ExpandCurrentFolder, "Ctrl+B"),
            (Operation::ExpandSelectedFolders, "Ctrl+Shift+B"),
            (Operation::GoIntoCurrentFolder, "Enter;Right"),
            (Operation::GoBackToParentFolder, "Left"),
            (Operation::GotoFirstItem, "Home"),
            (Operation::GotoLastItem, "End"),
        ]
        .into_iter()
        .collect()
    }

    /// Set the alternatives for `operation`. An existing entry is replaced in
    /// place and keeps its position; a new one is appended.
    pub fn insert(&mut self, operation: Operation, alternatives: impl Into<String>) {
        let alternatives = alternatives.into();
        match self.entries.iter_mut().find(|(op, _)| *op == operation) {
            Some(entry) => entry.1 = alternatives,
            None => self.entries.push((operation, alternatives)),
        }
    }

    /// Remove the entry for `operation`, returning its text.
    pub fn remove(&mut self, operation: Operation) -> Option<String> {
        let index = self.entries.iter().position(|(op, _)| *op == operation)?;
        Some(self.entries.remove(index).1)
    }

    /// The alternatives text for `operation`.
    pub fn get(&self, operation: Operation) -> Option<&str> {
        self.entries
            .iter()
            .find(|(op, _)| *op == operation)
            .map(|(_, text)| text.as_str())
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Operation, &str)> {
        self.entries.iter().map(|(op, text)| (*op, text.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(Operation, S)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (Operation, S)>>(iter: I) -> Self {
        let mut bindings = Self::new();
        for (operation, text) in iter {
            bindings.insert(operation, text);
        }
        bindings
    }
}
