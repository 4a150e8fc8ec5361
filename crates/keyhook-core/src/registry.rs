//! Shortcut registry.
//!
//! The registry owns the forward configuration ([`Bindings`]) and the reverse
//! map from [`KeyCombination`] to [`Operation`] derived from it. The reverse
//! map is never edited in place: every load or edit builds a complete new
//! [`KeyMap`] and publishes it by swapping an `Arc`, so a reader on another
//! thread sees either the old map or the new one, never a mix.
//!
//! # Conflicts
//!
//! Bindings are applied in insertion order, then the [built-in
//! bindings](BUILT_IN_BINDINGS) are applied on top. When a combination is
//! claimed by a different operation than the one already holding it, the
//! later claim wins and a [`Diagnostic::Conflict`] is recorded and logged.
//!
//! ```
//! use keyhook_core::{Bindings, KeyCombination, Operation, ShortcutRegistry};
//!
//! let bindings: Bindings = [(Operation::Copy, "ctrl+c"), (Operation::Move, "ctrl+c")]
//!     .into_iter()
//!     .collect();
//! let (registry, report) = ShortcutRegistry::with_bindings(&bindings);
//!
//! let ctrl_c = KeyCombination::parse("ctrl+c").unwrap().unwrap();
//! assert_eq!(registry.resolve(&ctrl_c), Operation::Move);
//! assert_eq!(report.conflicts().count(), 1);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::bindings::{ALTERNATIVE_SEPARATOR, Bindings, split_alternatives};
use crate::combination::KeyCombination;
use crate::error::ParseError;
use crate::key::RawKeyCode;
use crate::logging::targets;
use crate::modifiers::ModifierSet;
use crate::operation::Operation;

/// Bindings that are always present, applied after user configuration.
pub const BUILT_IN_BINDINGS: [(KeyCombination, Operation); 6] = [
    (
        KeyCombination::from_parts(ModifierSet::NONE, RawKeyCode::Right),
        Operation::GoIntoCurrentFolder,
    ),
    (
        KeyCombination::from_parts(ModifierSet::NONE, RawKeyCode::Left),
        Operation::GoBackToParentFolder,
    ),
    (
        KeyCombination::from_parts(ModifierSet::NONE, RawKeyCode::Home),
        Operation::GotoFirstItem,
    ),
    (
        KeyCombination::from_parts(ModifierSet::NONE, RawKeyCode::End),
        Operation::GotoLastItem,
    ),
    (
        KeyCombination::from_parts(ModifierSet::CTRL, RawKeyCode::Tab),
        Operation::SwitchTabInSamePanel,
    ),
    (
        KeyCombination::from_parts(ModifierSet::NONE, RawKeyCode::Tab),
        Operation::SwitchPanel,
    ),
];

/// Where a binding that took part in a conflict came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingSource {
    /// User-supplied configuration.
    User,
    /// One of [`BUILT_IN_BINDINGS`].
    BuiltIn,
}

/// A non-fatal problem found while building a key map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// One alternative could not be parsed and was skipped.
    Malformed {
        /// Operation whose entry contained the alternative.
        operation: Operation,
        /// The offending alternative, as written.
        text: String,
        /// Why it was rejected.
        error: ParseError,
    },
    /// A combination was claimed by a second operation; the later one won.
    Conflict {
        /// The contested combination.
        combination: KeyCombination,
        /// Operation that held it before.
        previous: Operation,
        /// Operation that holds it now.
        replacement: Operation,
        /// Origin of the replacing binding.
        source: BindingSource,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed {
                operation,
                text,
                error,
            } => write!(f, "skipping '{text}' for {operation}: {error}"),
            Self::Conflict {
                combination,
                previous,
                replacement,
                source: BindingSource::User,
            } => write!(f, "overwrite {combination}, {previous} --> {replacement}"),
            Self::Conflict {
                combination,
                previous,
                replacement,
                source: BindingSource::BuiltIn,
            } => write!(
                f,
                "built-in shortcut overwrites {combination}, {previous} --> {replacement}"
            ),
        }
    }
}

/// Diagnostics collected while building a key map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    diagnostics: Vec<Diagnostic>,
}

impl LoadReport {
    /// All diagnostics in the order they were found.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Conflict diagnostics only.
    pub fn conflicts(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::Conflict { .. }))
    }

    /// Malformed-alternative diagnostics only.
    pub fn malformed(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::Malformed { .. }))
    }

    /// Returns true if nothing was reported.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    fn push(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(target: targets::REGISTRY, "{diagnostic}");
        self.diagnostics.push(diagnostic);
    }
}

/// An immutable, fully built key map.
#[derive(Debug, Clone, Default)]
pub struct KeyMap {
    bindings: Bindings,
    reverse: HashMap<KeyCombination, Operation>,
}

impl KeyMap {
    /// Build a key map from user bindings plus the built-ins.
    ///
    /// `Nop` entries are ignored; there is nothing to dispatch for them.
    pub fn build(bindings: Bindings) -> (Self, LoadReport) {
        let mut report = LoadReport::default();
        let mut reverse = HashMap::new();

        for (operation, text) in bindings.iter() {
            if !operation.is_bound() {
                tracing::debug!(target: targets::REGISTRY, "ignoring binding for Nop");
                continue;
            }
            for alternative in split_alternatives(text) {
                match KeyCombination::parse(alternative) {
                    Ok(Some(combination)) => {
                        claim(&mut reverse, &mut report, combination, operation, BindingSource::User)
                    }
                    Ok(None) => {}
                    Err(error) => report.push(Diagnostic::Malformed {
                        operation,
                        text: alternative.to_string(),
                        error,
                    }),
                }
            }
        }

        for (combination, operation) in BUILT_IN_BINDINGS {
            claim(&mut reverse, &mut report, combination, operation, BindingSource::BuiltIn);
        }

        tracing::debug!(
            target: targets::REGISTRY,
            entries = reverse.len(),
            diagnostics = report.diagnostics.len(),
            "key map built"
        );
        (Self { bindings, reverse }, report)
    }

    /// The operation bound to `combination`, or `Nop`.
    pub fn resolve(&self, combination: &KeyCombination) -> Operation {
        self.reverse.get(combination).copied().unwrap_or_default()
    }

    /// The user configuration this map was built from.
    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Every combination resolving to `operation`, in canonical order.
    pub fn combinations_for(&self, operation: Operation) -> Vec<KeyCombination> {
        let mut combinations: Vec<_> = self
            .reverse
            .iter()
            .filter(|(_, op)| **op == operation)
            .map(|(combination, _)| *combination)
            .collect();
        combinations.sort();
        combinations
    }

    /// The effective bindings, built-ins included, grouped per operation.
    ///
    /// Operations appear in declaration order; each operation's alternatives
    /// are sorted, so the output is deterministic.
    pub fn export(&self) -> Bindings {
        Operation::ALL
            .into_iter()
            .filter_map(|operation| {
                let combinations = self.combinations_for(operation);
                if combinations.is_empty() {
                    return None;
                }
                let text = combinations
                    .iter()
                    .map(KeyCombination::to_string)
                    .collect::<Vec<_>>()
                    .join(ALTERNATIVE_SEPARATOR.to_string().as_str());
                Some((operation, text))
            })
            .collect()
    }

    /// Iterate every `(combination, operation)` pair in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&KeyCombination, &Operation)> {
        self.reverse.iter()
    }

    /// Number of bound combinations.
    pub fn len(&self) -> usize {
        self.reverse.len()
    }

    /// Returns true if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.reverse.is_empty()
    }
}

fn claim(
    reverse: &mut HashMap<KeyCombination, Operation>,
    report: &mut LoadReport,
    combination: KeyCombination,
    operation: Operation,
    source: BindingSource,
) {
    if let Some(previous) = reverse.insert(combination, operation) {
        if previous != operation {
            report.push(Diagnostic::Conflict {
                combination,
                previous,
                replacement: operation,
                source,
            });
        }
    }
}

/// Thread-safe owner of the current [`KeyMap`].
///
/// Lookups clone an `Arc` under a read lock and never block on a rebuild;
/// the write lock is held only for the pointer swap.
pub struct ShortcutRegistry {
    current: RwLock<Arc<KeyMap>>,
    /// Serializes read-modify-write edits so concurrent edits are not lost.
    edit: Mutex<()>,
}

impl Default for ShortcutRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortcutRegistry {
    /// A registry with no user bindings; only the built-ins resolve.
    pub fn new() -> Self {
        Self::with_bindings(&Bindings::new()).0
    }

    /// A registry loaded from `bindings`.
    pub fn with_bindings(bindings: &Bindings) -> (Self, LoadReport) {
        let (map, report) = KeyMap::build(bindings.clone());
        let registry = Self {
            current: RwLock::new(Arc::new(map)),
            edit: Mutex::new(()),
        };
        (registry, report)
    }

    /// Replace the whole configuration.
    pub fn load(&self, bindings: &Bindings) -> LoadReport {
        let _edit = self.edit.lock();
        let (map, report) = KeyMap::build(bindings.clone());
        self.publish(map);
        report
    }

    /// Rebind one operation to `alternatives` and rebuild.
    pub fn set_binding(&self, operation: Operation, alternatives: &str) -> LoadReport {
        self.edit_with(|bindings| bindings.insert(operation, alternatives))
    }

    /// Remove the user binding for one operation and rebuild. Built-ins for
    /// that operation stay in effect.
    pub fn clear_binding(&self, operation: Operation) -> LoadReport {
        self.edit_with(|bindings| {
            bindings.remove(operation);
        })
    }

    /// The operation bound to `combination`, or `Nop`. Never fails.
    pub fn resolve(&self, combination: &KeyCombination) -> Operation {
        self.current.read().resolve(combination)
    }

    /// The map currently in effect. It stays valid even if the registry is
    /// rebuilt afterwards.
    pub fn snapshot(&self) -> Arc<KeyMap> {
        Arc::clone(&self.current.read())
    }

    /// The user configuration currently in effect.
    pub fn bindings(&self) -> Bindings {
        self.snapshot().bindings().clone()
    }

    /// See [`KeyMap::export`].
    pub fn export(&self) -> Bindings {
        self.snapshot().export()
    }

    /// See [`KeyMap::combinations_for`].
    pub fn combinations_for(&self, operation: Operation) -> Vec<KeyCombination> {
        self.snapshot().combinations_for(operation)
    }

    /// Number of bound combinations.
    pub fn len(&self) -> usize {
        self.current.read().len()
    }

    /// Returns true if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.current.read().is_empty()
    }

    fn edit_with(&self, edit: impl FnOnce(&mut Bindings)) -> LoadReport {
        let _edit = self.edit.lock();
        let mut bindings = self.snapshot().bindings().clone();
        edit(&mut bindings);
        let (map, report) = KeyMap::build(bindings);
        self.publish(map);
        report
    }

    fn publish(&self, map: KeyMap) {
        let map = Arc::new(map);
        *self.current.write() = map;
    }
}

impl fmt::Debug for ShortcutRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortcutRegistry")
            .field("entries", &self.len())
            .finish()
    }
}
