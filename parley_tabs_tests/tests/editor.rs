// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Key handling through `TabEditor`.

use crate::test_name;
use crate::util::TestEnv;
use parley_tabs::editing::{Command, Handled, Key, KeyEvent, Modifiers, Priority};
use parley_tabs::embed_text::{ChangeSource, Embed, Selection};
use parley_tabs::{LayoutSurface, TabStop};

#[test]
fn editor_tab_inserts_at_caret() {
    let mut env = TestEnv::new(test_name!(), None);
    let mut editor = env.editor("ab", &[TabStop::left(100.0)]);
    let requested = env.host.requested.len();

    assert_eq!(env.press(&mut editor, KeyEvent::plain(Key::Tab)), Handled::Yes);
    assert_eq!(editor.doc().to_plain_text(), "ab\t");
    assert_eq!(env.caret(&editor), 3);
    assert_eq!(env.host.requested.len(), requested + 1);

    assert_eq!(env.flush(&mut editor), 1);
    assert_eq!(env.widths(&editor), [84.0]);
}

#[test]
fn editor_tab_replaces_selection() {
    let mut env = TestEnv::new(test_name!(), None);
    let mut editor = env.editor("abcd", &[]);
    editor
        .doc_mut()
        .set_selection(Selection::new(1, 3))
        .unwrap();
    env.press(&mut editor, KeyEvent::plain(Key::Tab));
    assert_eq!(editor.doc().to_plain_text(), "a\td");
    assert_eq!(env.caret(&editor), 2);
}

#[test]
fn editor_tab_with_modifiers_is_not_handled() {
    let mut env = TestEnv::new(test_name!(), None);
    let mut editor = env.editor("ab", &[TabStop::left(100.0)]);
    let requested = env.host.requested.len();
    let ctrl = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };
    for event in [
        KeyEvent::shift(Key::Tab),
        KeyEvent {
            key: Key::Tab,
            modifiers: ctrl,
        },
    ] {
        assert_eq!(env.press(&mut editor, event), Handled::No);
    }
    assert_eq!(editor.doc().to_plain_text(), "ab");
    assert_eq!(env.host.requested.len(), requested);
}

#[test]
fn editor_tab_runs_before_default_bindings() {
    let mut env = TestEnv::new(test_name!(), None);
    let mut editor = env.editor("", &[]);
    editor.keymap_mut().bind(
        KeyEvent::plain(Key::Tab),
        Priority::Default,
        Command::InsertText("    ".into()),
    );
    env.press(&mut editor, KeyEvent::plain(Key::Tab));
    assert_eq!(editor.doc().to_plain_text(), "\t");

    editor.keymap_mut().unbind(&Command::InsertTab);
    env.press(&mut editor, KeyEvent::plain(Key::Tab));
    assert_eq!(editor.doc().to_plain_text(), "\t    ");
}

#[test]
fn editor_delete_removes_tab_as_a_unit() {
    let mut env = TestEnv::new(test_name!(), None);
    let mut editor = env.editor("a\tb\tc", &[]);
    env.set_caret(&mut editor, 2);
    env.press(&mut editor, KeyEvent::plain(Key::Backspace));
    assert_eq!(editor.doc().to_plain_text(), "ab\tc");
    assert_eq!(env.caret(&editor), 1);

    env.set_caret(&mut editor, 2);
    env.press(&mut editor, KeyEvent::plain(Key::Delete));
    assert_eq!(editor.doc().to_plain_text(), "abc");
    assert_eq!(editor.doc().count_embeds(Embed::Tab), 0);
    assert_eq!(env.flush(&mut editor), 1);
    assert!(env.placements(&editor).is_empty());
}

#[test]
fn editor_vertical_motion_onto_tab_line() {
    // First line carets sit at 0, 8, 16, then 80 after the 64px tab.
    let mut env = TestEnv::new(test_name!(), None);
    let mut editor = env.editor("ab\tcd\u{2028}xyz", &[]);
    assert_eq!(env.caret(&editor), 9);
    assert_eq!(env.press(&mut editor, KeyEvent::plain(Key::ArrowUp)), Handled::Yes);
    assert_eq!(env.caret(&editor), 2);

    // The second line holds no tab.
    assert_eq!(env.press(&mut editor, KeyEvent::plain(Key::ArrowDown)), Handled::No);
    assert_eq!(env.caret(&editor), 2);
}

#[test]
fn editor_vertical_motion_across_blocks() {
    let mut env = TestEnv::new(test_name!(), None);
    let mut editor = env.editor("abcdefghij\n\tx", &[]);
    env.set_caret(&mut editor, 3);
    assert_eq!(env.press(&mut editor, KeyEvent::plain(Key::ArrowDown)), Handled::Yes);
    assert_eq!(env.caret(&editor), 11);
    assert_eq!(env.press(&mut editor, KeyEvent::plain(Key::ArrowUp)), Handled::No);
}

#[test]
fn editor_vertical_motion_onto_wrapped_line() {
    // "aaaa bbbb" and the tab fit in 80px; "cc" wraps.
    let mut env = TestEnv::new(test_name!(), Some(80.0));
    let mut editor = env.editor("aaaa bbbb\tcc", &[]);
    assert_eq!(env.caret(&editor), 12);
    assert_eq!(env.press(&mut editor, KeyEvent::plain(Key::ArrowUp)), Handled::Yes);
    assert_eq!(env.caret(&editor), 2);
}

#[test]
fn editor_vertical_motion_ties_pick_earliest() {
    // The caret after "z" sits at 8px, halfway between the carets after the
    // 4px tab and after "a".
    let mut env = TestEnv::new(test_name!(), None);
    let mut editor = env.editor("\ta\u{2028}z", &[TabStop::left(4.0)]);
    assert_eq!(env.widths(&editor), [4.0]);
    assert_eq!(env.caret(&editor), 4);
    env.press(&mut editor, KeyEvent::plain(Key::ArrowUp));
    assert_eq!(env.caret(&editor), 1);
}

#[test]
fn editor_api_edit_schedules_layout() {
    let mut env = TestEnv::new(test_name!(), None);
    let mut editor = env.editor("ab", &[TabStop::left(100.0)]);
    editor
        .doc_mut()
        .insert_embed(0, Embed::Tab, ChangeSource::Api)
        .unwrap();
    editor.notify_changes(&mut env.host);
    assert_eq!(env.flush(&mut editor), 1);
    assert_eq!(env.widths(&editor), [100.0]);

    // Nothing changed since the last drain.
    editor.notify_changes(&mut env.host);
    assert_eq!(env.flush(&mut editor), 0);
}

#[test]
fn editor_deleted_tabs_lose_their_placement() {
    let mut env = TestEnv::new(test_name!(), None);
    let mut editor = env.editor("a", &[TabStop::left(100.0)]);
    for _ in 0..10 {
        env.press(&mut editor, KeyEvent::plain(Key::Tab));
        env.flush(&mut editor);
        let tab = editor.doc().embeds().next().unwrap().id;
        assert!(editor.surface().tab_placement(tab).is_some());

        env.press(&mut editor, KeyEvent::plain(Key::Backspace));
        env.flush(&mut editor);
        assert_eq!(editor.doc().to_plain_text(), "a");
        assert!(editor.surface().tab_placement(tab).is_none());
    }
    assert_eq!(editor.engine().last_pass().tabs, 0);
}
