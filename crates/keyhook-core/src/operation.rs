//! The closed set of operations a shortcut can trigger.

use std::fmt;
use std::str::FromStr;

use crate::error::UnknownOperation;

/// An abstract, user-invokable action.
///
/// `Nop` means "nothing is bound". Consumers are expected to `match`
/// exhaustively, so adding a variant is a breaking change on purpose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    /// No operation bound.
    #[default]
    Nop,
    /// Open the selected item.
    Open,
    /// Copy the selection to the other panel.
    Copy,
    /// Move the selection to the other panel.
    Move,
    /// Rename the selected item.
    Rename,
    /// Delete the selection.
    Delete,
    /// Expand the folder under the cursor.
    ExpandCurrentFolder,
    /// Expand every selected folder.
    ExpandSelectedFolders,
    /// Enter the folder under the cursor.
    GoIntoCurrentFolder,
    /// Leave the current folder for its parent.
    GoBackToParentFolder,
    /// Move the cursor to the first item.
    GotoFirstItem,
    /// Move the cursor to the last item.
    GotoLastItem,
    /// Cycle tabs within the active panel.
    SwitchTabInSamePanel,
    /// Move focus to the other panel.
    SwitchPanel,
    /// Reload the active listing.
    Refresh,
    /// Navigate to the parent of the active location.
    NavigateUp,
}

impl Operation {
    /// Every operation in declaration order, `Nop` first.
    pub const ALL: [Operation; 16] = [
        Self::Nop,
        Self::Open,
        Self::Copy,
        Self::Move,
        Self::Rename,
        Self::Delete,
        Self::ExpandCurrentFolder,
        Self::ExpandSelectedFolders,
        Self::GoIntoCurrentFolder,
        Self::GoBackToParentFolder,
        Self::GotoFirstItem,
        Self::GotoLastItem,
        Self::SwitchTabInSamePanel,
        Self::SwitchPanel,
        Self::Refresh,
        Self::NavigateUp,
    ];

    /// The configuration name, identical to the variant name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Nop => "Nop",
            Self::Open => "Open",
            Self::Copy => "Copy",
            Self::Move => "Move",
            Self::Rename => "Rename",
            Self::Delete => "Delete",
            Self::ExpandCurrentFolder => "ExpandCurrentFolder",
            Self::ExpandSelectedFolders => "ExpandSelectedFolders",
            Self::GoIntoCurrentFolder => "GoIntoCurrentFolder",
            Self::GoBackToParentFolder => "GoBackToParentFolder",
            Self::GotoFirstItem => "GotoFirstItem",
            Self::GotoLastItem => "GotoLastItem",
            Self::SwitchTabInSamePanel => "SwitchTabInSamePanel",
            Self::SwitchPanel => "SwitchPanel",
            Self::Refresh => "Refresh",
            Self::NavigateUp => "NavigateUp",
        }
    }

    /// Case-insensitive lookup by configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|op| op.name().eq_ignore_ascii_case(name))
    }

    /// Returns true for every operation except `Nop`.
    pub fn is_bound(self) -> bool {
        self != Self::Nop
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownOperation(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for op in Operation::ALL {
            assert_eq!(op.name().parse::<Operation>(), Ok(op));
            assert_eq!(format!("{op:?}"), op.name());
        }
    }

    #[test]
    fn test_from_name_ignores_case() {
        assert_eq!(Operation::from_name("copy"), Some(Operation::Copy));
        assert_eq!(Operation::from_name(" GOTOLASTITEM "), Some(Operation::GotoLastItem));
        assert_eq!(
            "Teleport".parse::<Operation>(),
            Err(UnknownOperation("Teleport".into()))
        );
    }

    #[test]
    fn test_nop_is_default_and_unbound() {
        assert_eq!(Operation::default(), Operation::Nop);
        assert!(!Operation::Nop.is_bound());
        assert!(Operation::Rename.is_bound());
    }
}
