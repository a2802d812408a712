// mancala/src/sowing.rs
// Distribution of a move's pebbles over the pits of the seated players.

use crate::defs::{ConnId, END_PIT};
use crate::registry::{Registry, Session};

/// Where the last pebble of a move was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Landing {
    pub conn: ConnId,
    pub pit: usize,
}

impl Landing {
    /// True when the last pebble went into `conn`'s own end pit.
    pub fn is_end_pit_of(&self, conn: ConnId) -> bool {
        self.conn == conn && self.pit == END_PIT
    }
}

/// Sows `pebbles` one by one into the pits following `from_pit` of `origin`.
///
/// Past the origin's end pit the pebbles continue on the next seated session in
/// registry order, wrapping to the head, starting at that session's pit 0.
/// End pits of sessions other than `origin` are skipped without using up a
/// pebble. Returns `None` if nothing was sown or `origin` is not seated.
pub fn sow(registry: &mut Registry, origin: ConnId, from_pit: usize, pebbles: u32) -> Option<Landing> {
    let ring: Vec<usize> = (0..registry.len())
        .filter(|&idx| registry.at(idx).is_some_and(Session::is_eligible))
        .collect();
    let mut pos = ring
        .iter()
        .position(|&idx| registry.at(idx).is_some_and(|s| s.conn == origin))?;

    let mut pit = from_pit + 1;
    let mut remaining = pebbles;
    let mut landing = None;

    while remaining > 0 {
        let session = registry.at_mut(ring[pos])?;
        let last_pit = if session.conn == origin { END_PIT } else { END_PIT - 1 };
        while pit <= last_pit && remaining > 0 {
            session.pits[pit] += 1;
            remaining -= 1;
            landing = Some(Landing { conn: session.conn, pit });
            pit += 1;
        }
        pos = (pos + 1) % ring.len();
        pit = 0;
    }

    landing
}
