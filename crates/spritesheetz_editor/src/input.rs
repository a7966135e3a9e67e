//! Pointer events and keyboard shortcut handling

/// Mouse button that triggered a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Left,
    Middle,
    Right,
}

/// Modifier keys held while an event fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub control: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        control: false,
        shift: false,
    };

    pub const CONTROL: Modifiers = Modifiers {
        control: true,
        shift: false,
    };
}

/// A pointer event in scene coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
    /// Button pressed or released; `None` for plain moves
    pub button: Option<PointerButton>,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn new(x: f32, y: f32, button: Option<PointerButton>, modifiers: Modifiers) -> Self {
        Self {
            x,
            y,
            button,
            modifiers,
        }
    }

    pub fn button(x: f32, y: f32, button: PointerButton) -> Self {
        Self::new(x, y, Some(button), Modifiers::NONE)
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self::new(x, y, None, Modifiers::NONE)
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Keys the editor reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Delete,
    Backspace,
    Escape,
    Char(char),
}

/// Editor-level actions, from shortcuts or menus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorCommand {
    NewMap,
    NewSpriteSheet,
    Open,
    Save,
    SaveAs,
    Exit,
    DeleteSelection,
    ClearSelection,
    ToggleGrid,
}

/// Map a key press to an editor command
pub fn command_for_key(key: Key, modifiers: Modifiers) -> Option<EditorCommand> {
    if modifiers.control {
        let Key::Char(c) = key else {
            return None;
        };
        return match c.to_ascii_lowercase() {
            // Ctrl+Shift+S - Save As
            's' if modifiers.shift => Some(EditorCommand::SaveAs),
            // Ctrl+S - Save
            's' => Some(EditorCommand::Save),
            // Ctrl+E - Exit
            'e' => Some(EditorCommand::Exit),
            // Ctrl+O - Open
            'o' => Some(EditorCommand::Open),
            // Ctrl+N - New map
            'n' => Some(EditorCommand::NewMap),
            _ => None,
        };
    }

    match key {
        Key::Delete | Key::Backspace => Some(EditorCommand::DeleteSelection),
        Key::Escape => Some(EditorCommand::ClearSelection),
        Key::Char(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_shortcuts() {
        assert_eq!(command_for_key(Key::Char('s'), Modifiers::CONTROL), Some(EditorCommand::Save));
        assert_eq!(command_for_key(Key::Char('E'), Modifiers::CONTROL), Some(EditorCommand::Exit));
        let shift = Modifiers {
            control: true,
            shift: true,
        };
        assert_eq!(command_for_key(Key::Char('s'), shift), Some(EditorCommand::SaveAs));
    }

    #[test]
    fn test_plain_keys() {
        assert_eq!(command_for_key(Key::Delete, Modifiers::NONE), Some(EditorCommand::DeleteSelection));
        assert_eq!(command_for_key(Key::Escape, Modifiers::NONE), Some(EditorCommand::ClearSelection));
        assert_eq!(command_for_key(Key::Char('s'), Modifiers::NONE), None);
        assert_eq!(command_for_key(Key::Delete, Modifiers::CONTROL), None);
    }

    #[test]
    fn test_pointer_event_builders() {
        let event = PointerEvent::button(10.0, 20.0, PointerButton::Left).with_modifiers(Modifiers::CONTROL);
        assert_eq!(event.button, Some(PointerButton::Left));
        assert!(event.modifiers.control);
        assert_eq!(PointerEvent::moved(1.0, 2.0).button, None);
    }
}
