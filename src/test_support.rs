// mancala/src/test_support.rs
// In-memory Outbox used by the unit tests.

use std::collections::HashSet;

use crate::broadcast::Outbox;
use crate::defs::ConnId;

#[derive(Debug, Default)]
pub struct RecordingOutbox {
    pub sent: Vec<(ConnId, String)>,
    pub closed: HashSet<ConnId>,
}

impl Outbox for RecordingOutbox {
    fn send(&mut self, conn: ConnId, text: &str) {
        self.sent.push((conn, text.to_string()));
    }

    fn close(&mut self, conn: ConnId) {
        self.closed.insert(conn);
    }
}

impl RecordingOutbox {
    /// Everything sent to `conn`, concatenated.
    pub fn text_for(&self, conn: ConnId) -> String {
        self.sent
            .iter()
            .filter(|(c, _)| *c == conn)
            .map(|(_, text)| text.as_str())
            .collect()
    }

    /// Connections that received exactly `text`, in delivery order.
    pub fn recipients(&self, text: &str) -> Vec<ConnId> {
        self.sent
            .iter()
            .filter(|(_, t)| t == text)
            .map(|(c, _)| *c)
            .collect()
    }

    pub fn is_closed(&self, conn: ConnId) -> bool {
        self.closed.contains(&conn)
    }

    pub fn clear(&mut self) {
        self.sent.clear();
    }
}
