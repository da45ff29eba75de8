// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use parley_tabs::{FrameHost, FrameId, ListenerId};

/// A [`FrameHost`] that queues frames until the test fires them.
#[derive(Debug, Default)]
pub(crate) struct RecordingHost {
    next_id: u64,
    /// Every frame ever requested.
    pub(crate) requested: Vec<FrameId>,
    /// Every frame cancelled.
    pub(crate) cancelled: Vec<FrameId>,
    /// Frames requested but neither fired nor cancelled.
    pub(crate) queued: Vec<FrameId>,
    /// Registered resize listeners.
    pub(crate) listeners: Vec<ListenerId>,
}

impl RecordingHost {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Remove and return the queued frames.
    pub(crate) fn take_queued(&mut self) -> Vec<FrameId> {
        std::mem::take(&mut self.queued)
    }
}

impl FrameHost for RecordingHost {
    fn request_frame(&mut self) -> FrameId {
        let id = FrameId(self.next_id());
        self.requested.push(id);
        self.queued.push(id);
        id
    }

    fn cancel_frame(&mut self, id: FrameId) {
        self.cancelled.push(id);
        self.queued.retain(|queued| *queued != id);
    }

    fn add_resize_listener(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id());
        self.listeners.push(id);
        id
    }

    fn remove_resize_listener(&mut self, id: ListenerId) {
        self.listeners.retain(|listener| *listener != id);
    }
}
