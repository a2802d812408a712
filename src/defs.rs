// mancala/src/defs.rs
// Board dimensions, protocol limits and the connection identity shared by all modules.

use std::fmt;

pub const NPITS: usize = 6; // playable pits on a side, not including the end pit
pub const END_PIT: usize = NPITS; // index of the end pit inside a session's pits
pub const NPEBBLES: u32 = 4; // initial pebbles per pit when nobody is seated yet
pub const MAX_NAME: usize = 80; // maximum permitted name size
pub const MAX_MESSAGE: usize = MAX_NAME + 50; // maximum permitted message size
pub const DEFAULT_PORT: u16 = 30000;

/// A player's pits: `[0..NPITS]` playable, `[END_PIT]` the end pit.
pub type Pits = [u32; NPITS + 1];

/// Opaque identity of one client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnId(pub u64);

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}
