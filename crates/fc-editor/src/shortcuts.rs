//! Keyboard shortcut mapping.
//!
//! The canvas has exactly two bindings: `Delete`/`Backspace` removes the
//! selected edge and `Escape` closes an open edit session. Anything held
//! with ⌘/Ctrl/Alt is left to the host (browser shortcuts, text editing).

use crate::input::Modifiers;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Remove the selected edge, if any.
    DeleteSelection,
    /// Close the open edit session without applying it.
    CancelEdit,
}

/// Resolves key events into shortcut actions.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value. Returns `None` if the combo
    /// has no binding.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        if modifiers.ctrl || modifiers.meta || modifiers.alt {
            return None;
        }
        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::DeleteSelection),
            "Escape" => Some(ShortcutAction::CancelEdit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_and_backspace() {
        assert_eq!(
            ShortcutMap::resolve("Delete", Modifiers::NONE),
            Some(ShortcutAction::DeleteSelection)
        );
        assert_eq!(
            ShortcutMap::resolve("Backspace", Modifiers::NONE),
            Some(ShortcutAction::DeleteSelection)
        );
    }

    #[test]
    fn escape_cancels() {
        assert_eq!(
            ShortcutMap::resolve("Escape", Modifiers::NONE),
            Some(ShortcutAction::CancelEdit)
        );
    }

    #[test]
    fn shift_is_tolerated() {
        let shift = Modifiers {
            shift: true,
            ..Modifiers::NONE
        };
        assert_eq!(
            ShortcutMap::resolve("Delete", shift),
            Some(ShortcutAction::DeleteSelection)
        );
    }

    #[test]
    fn command_combos_pass_through() {
        let cmd = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert_eq!(ShortcutMap::resolve("Backspace", cmd), None);
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::NONE
        };
        assert_eq!(ShortcutMap::resolve("Delete", ctrl), None);
    }

    #[test]
    fn unbound_keys() {
        for key in ["a", "z", "Enter", "Tab", " ", "ArrowLeft"] {
            assert_eq!(ShortcutMap::resolve(key, Modifiers::NONE), None, "{key}");
        }
    }
}
