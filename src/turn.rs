// mancala/src/turn.rs
// Turn order: who may move, how the turn is handed on, and move validation.

use crate::broadcast::{YOUR_MOVE_MSG, Outbox, broadcast, turn_msg};
use crate::defs::{ConnId, NPITS, Pits};
use crate::error::GameError;
use crate::registry::{Registry, Session};

/// Protocol state of a live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Naming,
    WaitingForTurn,
    ActiveTurn,
}

impl TurnState {
    pub fn of(session: &Session) -> Self {
        if session.is_naming {
            TurnState::Naming
        } else if session.has_turn {
            TurnState::ActiveTurn
        } else {
            TurnState::WaitingForTurn
        }
    }
}

/// First seated session strictly after `after` in registry order, wrapping
/// from the tail to the head.
///
/// The search covers at most one lap, so `after` itself is the last
/// candidate. `None` when nobody is seated.
pub fn next_eligible(registry: &Registry, after: ConnId) -> Option<ConnId> {
    let len = registry.len();
    let start = registry.position(after)?;
    (1..=len)
        .filter_map(|step| registry.at((start + step) % len))
        .find(|s| s.is_eligible())
        .map(|s| s.conn)
}

/// Gives the turn to `conn` alone, prompts it and tells everyone else.
pub fn grant_turn(registry: &mut Registry, out: &mut impl Outbox, conn: ConnId) {
    for session in registry.iter_mut() {
        session.has_turn = session.conn == conn;
    }
    let Some(name) = registry.get(conn).map(|s| s.name.clone()) else {
        return;
    };
    out.send(conn, YOUR_MOVE_MSG);
    broadcast(registry, out, &turn_msg(&name), Some(conn));
}

/// Takes the turn away from `from` and hands it to the next seated session.
/// Returns the new holder, or `None` if nobody can move.
pub fn advance_turn(registry: &mut Registry, out: &mut impl Outbox, from: ConnId) -> Option<ConnId> {
    if let Some(session) = registry.get_mut(from) {
        session.has_turn = false;
    }
    let next = next_eligible(registry, from)?;
    grant_turn(registry, out, next);
    Some(next)
}

/// Validates a pit choice against the mover's pits and returns the pit with
/// its pebble count.
pub fn parse_pit(line: &str, pits: &Pits) -> Result<(usize, u32), GameError> {
    let pit = line
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|&pit| pit < NPITS)
        .ok_or_else(|| GameError::PitOutOfRange(line.to_string()))?;
    match pits[pit] {
        0 => Err(GameError::EmptyPit(pit)),
        pebbles => Ok((pit, pebbles)),
    }
}
