// mancala/src/broadcast.rs
// Outbound text: the transport seam, fan-out to seated players and board rendering.

use std::fmt::Write;

use crate::defs::{ConnId, END_PIT, NPITS};
use crate::registry::{Registry, Session};

pub const WELCOME_MSG: &str = "Welcome to Mancala. What is your name?\n";
pub const YOUR_MOVE_MSG: &str = "Your move?\n";
pub const NOT_YOUR_MOVE_MSG: &str = "It is not your move\n";
pub const EMPTY_PIT_MSG: &str = "Please choose a non-empty pit\n";
pub const INVALID_PIT_MSG: &str = "Please choose a valid pit number\n";
pub const GAME_OVER_MSG: &str = "Game over!\r\n";

/// Write side of the transport as seen by the game.
///
/// Neither call may fail from the caller's point of view: an unreachable peer
/// is noticed later as a closed connection.
pub trait Outbox {
    fn send(&mut self, conn: ConnId, text: &str);
    fn close(&mut self, conn: ConnId);
}

/// Sends `text` to every seated session except `exclude`, in registry order.
pub fn broadcast(registry: &Registry, out: &mut impl Outbox, text: &str, exclude: Option<ConnId>) {
    for session in registry.eligible() {
        if Some(session.conn) != exclude {
            out.send(session.conn, text);
        }
    }
}

/// One board line, e.g. `ann: [0]4 [1]4 [2]4 [3]4 [4]4 [5]4 [end pit]0`.
pub fn board_line(session: &Session) -> String {
    let mut line = format!("{}:", session.name);
    for (i, pebbles) in session.pits[..NPITS].iter().enumerate() {
        let _ = write!(line, " [{i}]{pebbles}");
    }
    let _ = writeln!(line, " [end pit]{}", session.pits[END_PIT]);
    line
}

/// Sends every seated session's board line to everyone.
pub fn broadcast_board(registry: &Registry, out: &mut impl Outbox) {
    for session in registry.eligible() {
        broadcast(registry, out, &board_line(session), None);
    }
}

pub fn joined_msg(name: &str) -> String {
    format!("{name} has joined the game\n")
}

pub fn left_msg(name: &str) -> String {
    format!("{name} has left the game\n")
}

pub fn turn_msg(name: &str) -> String {
    format!("It is {name}'s turn\n")
}

pub fn move_msg(name: &str, pit: usize) -> String {
    format!("{name} chose pit {pit}\n")
}

pub fn score_msg(name: &str, points: u32) -> String {
    format!("{name} has {points} points\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingOutbox;

    fn seated(conn: u64, name: &str) -> Session {
        let mut s = Session::new(ConnId(conn), 4);
        s.name = name.to_string();
        s.is_naming = false;
        s
    }

    #[test]
    fn test_board_line_format() {
        let mut s = seated(1, "ann");
        s.pits = [0, 1, 2, 3, 4, 5, 6];
        assert_eq!(
            board_line(&s),
            "ann: [0]0 [1]1 [2]2 [3]3 [4]4 [5]5 [end pit]6\n"
        );
    }

    #[test]
    fn test_broadcast_skips_excluded_and_naming() {
        let mut registry = Registry::new();
        registry.insert(seated(1, "a"));
        registry.insert(Session::new(ConnId(2), 4));
        registry.insert(seated(3, "c"));
        let mut out = RecordingOutbox::default();

        broadcast(&registry, &mut out, "hello\n", Some(ConnId(3)));
        assert_eq!(out.text_for(ConnId(1)), "hello\n");
        assert_eq!(out.text_for(ConnId(2)), "");
        assert_eq!(out.text_for(ConnId(3)), "");

        broadcast(&registry, &mut out, "all\n", None);
        assert_eq!(out.text_for(ConnId(3)), "all\n");
        // registry order: newest first
        assert_eq!(out.recipients("all\n"), vec![ConnId(3), ConnId(1)]);
    }

    #[test]
    fn test_broadcast_board_sends_every_line_to_everyone() {
        let mut registry = Registry::new();
        registry.insert(seated(1, "a"));
        registry.insert(seated(2, "b"));
        let mut out = RecordingOutbox::default();

        broadcast_board(&registry, &mut out);
        let expected = "b: [0]4 [1]4 [2]4 [3]4 [4]4 [5]4 [end pit]0\n\
                        a: [0]4 [1]4 [2]4 [3]4 [4]4 [5]4 [end pit]0\n";
        assert_eq!(out.text_for(ConnId(1)), expected);
        assert_eq!(out.text_for(ConnId(2)), expected);
    }

    #[test]
    fn test_message_texts() {
        assert_eq!(joined_msg("ann"), "ann has joined the game\n");
        assert_eq!(left_msg("ann"), "ann has left the game\n");
        assert_eq!(turn_msg("ann"), "It is ann's turn\n");
        assert_eq!(move_msg("ann", 3), "ann chose pit 3\n");
        assert_eq!(score_msg("ann", 24), "ann has 24 points\r\n");
    }
}
