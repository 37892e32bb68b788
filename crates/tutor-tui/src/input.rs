//! Key bindings

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a key press means on the tutor screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Regular character input
    Char(char),
    /// Enter: solve the current expression
    Submit,
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    /// Scroll the solution
    PageUp,
    PageDown,
    Up,
    Down,
    /// Tab: select the next quick symbol
    NextSymbol,
    /// Shift+Tab: select the previous quick symbol
    PrevSymbol,
    /// Ctrl+S: insert the selected quick symbol at the cursor
    InsertSymbol,
    /// Ctrl+T: switch between streaming and single-shot
    ToggleMode,
    /// Escape
    Escape,
    /// Ctrl+C
    Interrupt,
    /// Ctrl+L: clear input and solution
    Clear,
    /// Ctrl+U: clear the input line only
    ClearLine,
    /// Bracketed paste
    Paste(String),
    /// Ctrl+Q / Ctrl+D
    Quit,
    Unknown,
}

/// Convert a crossterm key event to an action
pub fn key_to_action(event: KeyEvent) -> Action {
    let KeyEvent {
        code, modifiers, ..
    } = event;

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Action::Interrupt,
            KeyCode::Char('d') | KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('l') => Action::Clear,
            KeyCode::Char('u') => Action::ClearLine,
            KeyCode::Char('s') => Action::InsertSymbol,
            KeyCode::Char('t') => Action::ToggleMode,
            _ => Action::Unknown,
        };
    }

    if modifiers.contains(KeyModifiers::ALT) {
        return Action::Unknown;
    }

    match code {
        KeyCode::Char(c) => Action::Char(c),
        KeyCode::Enter => Action::Submit,
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Delete => Action::Delete,
        KeyCode::Left => Action::Left,
        KeyCode::Right => Action::Right,
        KeyCode::Up => Action::Up,
        KeyCode::Down => Action::Down,
        KeyCode::Home => Action::Home,
        KeyCode::End => Action::End,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::Tab if modifiers.contains(KeyModifiers::SHIFT) => Action::PrevSymbol,
        KeyCode::Tab => Action::NextSymbol,
        KeyCode::BackTab => Action::PrevSymbol,
        KeyCode::Esc => Action::Escape,
        _ => Action::Unknown,
    }
}

/// Convert a crossterm event to an action. Key releases are ignored.
pub fn event_to_action(event: Event) -> Option<Action> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => Some(key_to_action(key)),
        Event::Paste(text) => Some(Action::Paste(text)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_symbol_bindings() {
        assert_eq!(
            key_to_action(key(KeyCode::Tab, KeyModifiers::NONE)),
            Action::NextSymbol
        );
        assert_eq!(
            key_to_action(key(KeyCode::BackTab, KeyModifiers::SHIFT)),
            Action::PrevSymbol
        );
        assert_eq!(
            key_to_action(key(KeyCode::Char('s'), KeyModifiers::CONTROL)),
            Action::InsertSymbol
        );
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(
            key_to_action(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Interrupt
        );
        assert_eq!(
            key_to_action(key(KeyCode::Char('l'), KeyModifiers::CONTROL)),
            Action::Clear
        );
        assert_eq!(
            key_to_action(key(KeyCode::Char('x'), KeyModifiers::NONE)),
            Action::Char('x')
        );
    }

    #[test]
    fn test_paste_and_release() {
        assert_eq!(
            event_to_action(Event::Paste("x²".into())),
            Some(Action::Paste("x²".into()))
        );

        let mut release = key(KeyCode::Enter, KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(event_to_action(Event::Key(release)), None);
    }
}
