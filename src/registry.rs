// mancala/src/registry.rs
// Player registry: the ordered, newest-first collection of sessions.

use std::collections::VecDeque;

use crate::decoder::LineBuffer;
use crate::defs::{ConnId, NPITS, Pits};

/// State of one connected participant.
#[derive(Debug)]
pub struct Session {
    pub conn: ConnId,
    pub name: String,
    pub pits: Pits,
    pub is_naming: bool,
    pub has_turn: bool,
    pub is_removed: bool,
    pub input: LineBuffer,
}

impl Session {
    /// A fresh, still naming session with `pebbles` in every playable pit.
    pub fn new(conn: ConnId, pebbles: u32) -> Self {
        let mut pits = [0; NPITS + 1];
        pits[..NPITS].fill(pebbles);
        Self {
            conn,
            name: String::new(),
            pits,
            is_naming: true,
            has_turn: false,
            is_removed: false,
            input: LineBuffer::new(),
        }
    }

    /// Seated players take part in turns, sowing and broadcasts.
    pub fn is_eligible(&self) -> bool {
        !self.is_naming && !self.is_removed
    }

    pub fn playable_pebbles(&self) -> u32 {
        self.pits[..NPITS].iter().sum()
    }

    /// Total pebbles including the end pit, i.e. the final score.
    pub fn points(&self) -> u32 {
        self.pits.iter().sum()
    }

    pub fn has_empty_side(&self) -> bool {
        self.pits[..NPITS].iter().all(|&n| n == 0)
    }
}

/// All sessions, head first. New sessions are linked in at the head.
#[derive(Debug, Default)]
pub struct Registry {
    sessions: VecDeque<Session>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, session: Session) {
        self.sessions.push_front(session);
    }

    /// Unlinks the session with this identity, wherever it sits.
    pub fn remove(&mut self, conn: ConnId) -> Option<Session> {
        let idx = self.position(conn)?;
        self.sessions.remove(idx)
    }

    /// First seated session with exactly this name.
    pub fn find_by_name(&self, name: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| !s.is_naming && s.name == name)
    }

    pub fn get(&self, conn: ConnId) -> Option<&Session> {
        self.sessions.iter().find(|s| s.conn == conn)
    }

    pub fn get_mut(&mut self, conn: ConnId) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| s.conn == conn)
    }

    pub fn position(&self, conn: ConnId) -> Option<usize> {
        self.sessions.iter().position(|s| s.conn == conn)
    }

    /// Registry-order traversal.
    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Session> {
        self.sessions.iter_mut()
    }

    /// Seated sessions only, in registry order.
    pub fn eligible(&self) -> impl Iterator<Item = &Session> {
        self.sessions.iter().filter(|s| s.is_eligible())
    }

    pub fn at(&self, idx: usize) -> Option<&Session> {
        self.sessions.get(idx)
    }

    pub fn at_mut(&mut self, idx: usize) -> Option<&mut Session> {
        self.sessions.get_mut(idx)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// The session currently allowed to move, if any.
    pub fn turn_holder(&self) -> Option<ConnId> {
        self.sessions.iter().find(|s| s.has_turn).map(|s| s.conn)
    }

    /// Sum of every pit of every session.
    pub fn total_pebbles(&self) -> u32 {
        self.sessions.iter().map(Session::points).sum()
    }
}
