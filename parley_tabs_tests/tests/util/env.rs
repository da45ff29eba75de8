// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use parley_tabs::editing::{Handled, KeyEvent};
use parley_tabs::embed_text::{Document, Embed, Selection};
use parley_tabs::{
    FixedAdvance, FlowConfig, LayoutSurface, SimpleFlow, TabEditor, TabPlacement, TabStop,
};
use tracing_subscriber::EnvFilter;

use super::RecordingHost;

/// The editor every test drives: 8px per character at the default 16px size,
/// 20px lines, and a 64px fallback tab.
pub(crate) type Editor = TabEditor<SimpleFlow<FixedAdvance>>;

pub(crate) struct TestEnv {
    test_name: String,
    width: Option<f32>,
    pub(crate) host: RecordingHost,
}

impl TestEnv {
    pub(crate) fn new(test_name: &str, width: Option<f32>) -> Self {
        // Set RUST_LOG=parley_tabs=trace to see layout passes.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
        Self {
            test_name: test_name.to_owned(),
            width,
            host: RecordingHost::default(),
        }
    }

    /// An attached editor over `text` with the caret at the end, after its
    /// first layout pass.
    pub(crate) fn editor(&mut self, text: &str, stops: &[TabStop]) -> Editor {
        self.editor_for(Document::from_plain_text(text), stops)
    }

    pub(crate) fn editor_for(&mut self, doc: Document, stops: &[TabStop]) -> Editor {
        let surface = SimpleFlow::new(
            FixedAdvance::default(),
            FlowConfig {
                width: self.width,
                ..FlowConfig::default()
            },
        );
        let mut editor = TabEditor::new(doc, surface);
        let end = editor.doc().len();
        self.set_caret(&mut editor, end);
        editor.attach(&mut self.host);
        editor.load_stops(stops.iter().copied().collect(), &mut self.host);
        assert_eq!(self.flush(&mut editor), 1, "{}: first pass", self.test_name);
        editor
    }

    /// Fire every queued frame. Returns the number of layout passes that ran.
    pub(crate) fn flush(&mut self, editor: &mut Editor) -> usize {
        self.host
            .take_queued()
            .into_iter()
            .filter(|frame| editor.on_frame(*frame))
            .count()
    }

    pub(crate) fn press(&mut self, editor: &mut Editor, event: KeyEvent) -> Handled {
        editor.handle_key(event, &mut self.host)
    }

    pub(crate) fn set_caret(&self, editor: &mut Editor, offset: usize) {
        if let Err(err) = editor.doc_mut().set_selection(Selection::caret(offset)) {
            panic!("{}: {err}", self.test_name);
        }
    }

    pub(crate) fn caret(&self, editor: &Editor) -> usize {
        let selection = editor.doc().selection();
        assert!(
            selection.is_collapsed(),
            "{}: expected a caret, got {selection:?}",
            self.test_name
        );
        selection.focus()
    }

    /// The placement of every tab, in document order.
    pub(crate) fn placements(&self, editor: &Editor) -> Vec<TabPlacement> {
        editor
            .doc()
            .embeds()
            .filter(|e| e.embed == Embed::Tab)
            .map(|e| {
                editor
                    .surface()
                    .tab_placement(e.id)
                    .unwrap_or_else(|| panic!("{}: tab {:?} was never placed", self.test_name, e.id))
            })
            .collect()
    }

    pub(crate) fn widths(&self, editor: &Editor) -> Vec<f32> {
        self.placements(editor).iter().map(|p| p.width).collect()
    }

    /// Horizontal start and end of every tab, in document order.
    pub(crate) fn tab_spans(&self, editor: &mut Editor) -> Vec<(f32, f32)> {
        let doc = editor.doc().clone();
        let widths = self.widths(editor);
        doc.embeds()
            .filter(|e| e.embed == Embed::Tab)
            .zip(widths)
            .map(|(e, width)| {
                let origin = editor
                    .surface_mut()
                    .run_origin(&doc, e.block, e.run)
                    .unwrap_or_else(|| panic!("{}: no origin for {:?}", self.test_name, e.id));
                (origin.x, origin.x + width)
            })
            .collect()
    }
}
