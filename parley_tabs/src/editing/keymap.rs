// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Key bindings and prioritized dispatch.

use crate::LayoutSurface;

use super::{EditContext, VerticalDirection};

/// A key relevant to text editing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// The tab key.
    Tab,
    /// The enter or return key.
    Enter,
    /// Up arrow.
    ArrowUp,
    /// Down arrow.
    ArrowDown,
    /// Backspace.
    Backspace,
    /// Forward delete.
    Delete,
}

/// Modifier keys held during a key press.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    /// Shift.
    pub shift: bool,
    /// Control.
    pub ctrl: bool,
    /// Alt or option.
    pub alt: bool,
    /// Meta, command or super.
    pub meta: bool,
}

impl Modifiers {
    /// No modifiers.
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Shift only.
    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    /// Returns `true` if no modifier is held.
    pub const fn is_empty(self) -> bool {
        !(self.shift || self.ctrl || self.alt || self.meta)
    }
}

/// A key press.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// The key pressed.
    pub key: Key,
    /// Modifiers held.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A key press with no modifiers.
    pub const fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    /// A key press with shift held.
    pub const fn shift(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::SHIFT,
        }
    }
}

/// Whether a handler consumed an event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Handled {
    /// The event was consumed; dispatch stops.
    Yes,
    /// The handler declined; dispatch continues with the next binding.
    No,
}

/// Dispatch order of a binding.
///
/// Every [`Custom`](Self::Custom) binding for a key runs before any
/// [`Default`](Self::Default) binding for it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// Bindings that override the host's behavior.
    Custom,
    /// The host's own bindings.
    Default,
}

/// An editing action a key can be bound to.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Insert a tab unit, replacing the selection.
    InsertTab,
    /// Insert a soft break followed by copies of the tabs before the caret.
    InsertSoftBreak,
    /// Start a new block at the caret.
    HardBreak,
    /// Move the caret across lines holding tabs.
    MoveVertical(VerticalDirection),
    /// Delete the selection or the unit before the caret.
    Backdelete,
    /// Delete the selection or the unit after the caret.
    Delete,
    /// Replace the selection with plain text.
    InsertText(String),
}

impl Command {
    /// Run the command against `cx`.
    pub fn run<S: LayoutSurface + ?Sized>(&self, cx: &mut EditContext<'_, S>) -> Handled {
        match self {
            Self::InsertTab => cx.insert_tab(),
            Self::InsertSoftBreak => cx.insert_soft_break(),
            Self::HardBreak => cx.hard_break(),
            Self::MoveVertical(direction) => cx.move_vertical(*direction),
            Self::Backdelete => cx.backdelete(),
            Self::Delete => cx.delete(),
            Self::InsertText(text) => cx.insert_text(text),
        }
    }
}

/// A key bound to a command.
#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
    /// The key press that triggers the command. Modifiers must match exactly.
    pub event: KeyEvent,
    /// When the binding runs relative to others for the same key.
    pub priority: Priority,
    /// The action.
    pub command: Command,
}

/// An ordered set of key bindings.
#[derive(Clone, Debug, Default)]
pub struct Keymap {
    // Sorted by priority; registration order within a priority.
    bindings: Vec<Binding>,
}

impl Keymap {
    /// An empty keymap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tab, soft break and vertical navigation at custom priority, over
    /// default bindings for hard breaks and deletion.
    pub fn with_tab_bindings() -> Self {
        let mut keymap = Self::new();
        keymap.bind(KeyEvent::plain(Key::Tab), Priority::Custom, Command::InsertTab);
        keymap.bind(
            KeyEvent::shift(Key::Enter),
            Priority::Custom,
            Command::InsertSoftBreak,
        );
        keymap.bind(
            KeyEvent::plain(Key::ArrowUp),
            Priority::Custom,
            Command::MoveVertical(VerticalDirection::Up),
        );
        keymap.bind(
            KeyEvent::plain(Key::ArrowDown),
            Priority::Custom,
            Command::MoveVertical(VerticalDirection::Down),
        );
        keymap.bind(KeyEvent::plain(Key::Enter), Priority::Default, Command::HardBreak);
        keymap.bind(
            KeyEvent::plain(Key::Backspace),
            Priority::Default,
            Command::Backdelete,
        );
        keymap.bind(KeyEvent::plain(Key::Delete), Priority::Default, Command::Delete);
        keymap
    }

    /// Add a binding after all existing bindings of the same priority.
    pub fn bind(&mut self, event: KeyEvent, priority: Priority, command: Command) {
        let index = self.bindings.partition_point(|b| b.priority <= priority);
        self.bindings.insert(
            index,
            Binding {
                event,
                priority,
                command,
            },
        );
    }

    /// Remove every binding of `command`. Returns the number removed.
    pub fn unbind(&mut self, command: &Command) -> usize {
        let before = self.bindings.len();
        self.bindings.retain(|b| b.command != *command);
        before - self.bindings.len()
    }

    /// The bindings in dispatch order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Run the bindings for `event` in order until one handles it.
    pub fn dispatch<S: LayoutSurface + ?Sized>(
        &self,
        event: KeyEvent,
        cx: &mut EditContext<'_, S>,
    ) -> Handled {
        for binding in self.bindings.iter().filter(|b| b.event == event) {
            if binding.command.run(cx) == Handled::Yes {
                tracing::trace!(?event, command = ?binding.command, "key handled");
                return Handled::Yes;
            }
        }
        Handled::No
    }
}
