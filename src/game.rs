// src/game.rs
// The game context: owns the player registry and turns decoded input into
// naming, moves, departures and the end of the game.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::broadcast::{
    EMPTY_PIT_MSG, GAME_OVER_MSG, INVALID_PIT_MSG, NOT_YOUR_MOVE_MSG, Outbox, WELCOME_MSG, broadcast,
    broadcast_board, joined_msg, left_msg, move_msg, score_msg,
};
use crate::defs::{ConnId, MAX_NAME, NPITS};
use crate::error::{DecodeError, GameError};
use crate::logging::{log_debug, log_info, log_warning};
use crate::record::{GameRecord, Score};
use crate::registry::{Registry, Session};
use crate::sowing::sow;
use crate::turn::{TurnState, advance_turn, grant_turn, parse_pit};

/// All state of the single running game.
///
/// Every operation runs to completion and leaves the registry consistent, so
/// the caller may dispatch one transport event at a time without locking.
pub struct Game {
    id: String,
    started_at: DateTime<Utc>,
    registry: Registry,
    initial_pebbles: u32,
    over: bool,
}

impl Game {
    pub fn new(initial_pebbles: u32) -> Self {
        let mut rng = rand::rng();
        Self {
            id: format!("game_{:08x}", rng.random::<u32>()),
            started_at: Utc::now(),
            registry: Registry::new(),
            initial_pebbles,
            over: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    /// Pebbles per pit for a newcomer: the current average over every
    /// session's playable pits, rounded up. Must be taken before the
    /// newcomer is linked in.
    pub fn average_pebbles(&self) -> u32 {
        if self.registry.is_empty() {
            return self.initial_pebbles;
        }
        let pits = (self.registry.len() * NPITS) as u32;
        let pebbles: u32 = self.registry.iter().map(Session::playable_pebbles).sum();
        pebbles.div_ceil(pits).max(1)
    }

    /// A new connection was accepted.
    pub fn connect(&mut self, conn: ConnId, out: &mut impl Outbox) {
        let pebbles = self.average_pebbles();
        self.registry.insert(Session::new(conn, pebbles));
        log_info(&format!("A new player just connected ({conn}), {pebbles} pebbles per pit"));
        out.send(conn, WELCOME_MSG);
    }

    /// Bytes arrived on `conn`. Every complete line is handled in order.
    pub fn receive(&mut self, conn: ConnId, bytes: &[u8], out: &mut impl Outbox) {
        match self.registry.get_mut(conn) {
            Some(session) => session.input.push(bytes),
            None => return,
        }

        while !self.over {
            let Some(session) = self.registry.get_mut(conn) else {
                break;
            };
            let naming = session.is_naming;
            match session.input.next_line() {
                Ok(Some(line)) => self.handle_line(conn, &line, out),
                Ok(None) => {
                    if naming && session.input.pending_len() >= MAX_NAME {
                        self.reject_name(conn, GameError::NameTooLong, out);
                    }
                    break;
                }
                Err(e) if naming => {
                    log_debug(&format!("{conn}: {e}"));
                    let err = match e {
                        DecodeError::LineTooLong => GameError::NameTooLong,
                        DecodeError::InvalidUtf8 => GameError::NameNotUtf8,
                    };
                    self.reject_name(conn, err, out);
                }
                Err(e) => {
                    log_warning(&format!("{conn}: {e}"));
                    self.refuse_input(conn, GameError::PitOutOfRange(format!("<{e}>")), out);
                }
            }
        }
    }

    /// The connection closed or must be dropped. If it held the turn, the
    /// turn moves on before the session is unlinked.
    pub fn disconnect(&mut self, conn: ConnId, out: &mut impl Outbox) {
        let Some(session) = self.registry.get_mut(conn) else {
            return;
        };
        session.is_removed = true;
        if session.has_turn {
            advance_turn(&mut self.registry, out, conn);
        }

        if let Some(session) = self.registry.remove(conn) {
            if session.is_naming {
                log_info(&format!("A player was removed from the game ({conn})"));
            } else {
                log_info(&format!("{} left the game", session.name));
                broadcast(&self.registry, out, &left_msg(&session.name), Some(conn));
            }
        }
        out.close(conn);
    }

    fn handle_line(&mut self, conn: ConnId, line: &str, out: &mut impl Outbox) {
        let Some(session) = self.registry.get(conn) else {
            return;
        };
        match TurnState::of(session) {
            TurnState::Naming => match self.validate_name(line) {
                Ok(()) => self.seat(conn, line, out),
                Err(e) => self.reject_name(conn, e, out),
            },
            TurnState::ActiveTurn => match parse_pit(line, &session.pits) {
                Ok((pit, pebbles)) => self.play(conn, pit, pebbles, out),
                Err(e) => self.refuse_input(conn, e, out),
            },
            TurnState::WaitingForTurn => {
                log_info(&format!("{} entered {line:?} out of turn", session.name));
                out.send(conn, NOT_YOUR_MOVE_MSG);
            }
        }
    }

    fn validate_name(&self, name: &str) -> Result<(), GameError> {
        if name.len() >= MAX_NAME {
            Err(GameError::NameTooLong)
        } else if name.is_empty() {
            Err(GameError::EmptyName)
        } else if self.registry.find_by_name(name).is_some() {
            Err(GameError::DuplicateName(name.to_string()))
        } else {
            Ok(())
        }
    }

    fn reject_name(&mut self, conn: ConnId, err: GameError, out: &mut impl Outbox) {
        log_warning(&format!("Rejected name from {conn}: {err}"));
        self.disconnect(conn, out);
    }

    /// Seats a session under its accepted name. It gets the turn only if
    /// nobody holds it.
    fn seat(&mut self, conn: ConnId, name: &str, out: &mut impl Outbox) {
        let Some(session) = self.registry.get_mut(conn) else {
            return;
        };
        session.name = name.to_string();
        session.is_naming = false;
        log_info(&format!("A player just entered their name: {name}"));

        broadcast(&self.registry, out, &joined_msg(name), Some(conn));
        broadcast_board(&self.registry, out);
        if self.registry.turn_holder().is_none() {
            grant_turn(&mut self.registry, out, conn);
        }
    }

    /// An invalid pit choice: the mover is told why and keeps the turn.
    fn refuse_input(&mut self, conn: ConnId, err: GameError, out: &mut impl Outbox) {
        if !self.registry.get(conn).is_some_and(|s| s.has_turn) {
            out.send(conn, NOT_YOUR_MOVE_MSG);
            return;
        }
        log_debug(&format!("{conn}: {err}"));
        let reply = match err {
            GameError::EmptyPit(_) => EMPTY_PIT_MSG,
            _ => INVALID_PIT_MSG,
        };
        out.send(conn, reply);
        grant_turn(&mut self.registry, out, conn);
    }

    /// Empties `pit` of the mover, sows its pebbles and decides who moves next.
    fn play(&mut self, conn: ConnId, pit: usize, pebbles: u32, out: &mut impl Outbox) {
        let Some(session) = self.registry.get_mut(conn) else {
            return;
        };
        session.pits[pit] = 0;
        let name = session.name.clone();

        let landing = sow(&mut self.registry, conn, pit, pebbles);
        log_info(&format!("{name}'s turn, they entered {pit}"));
        broadcast(&self.registry, out, &move_msg(&name, pit), Some(conn));
        broadcast_board(&self.registry, out);

        if self.registry.eligible().any(Session::has_empty_side) {
            self.finish(out);
        } else if landing.is_some_and(|l| l.is_end_pit_of(conn)) {
            log_debug(&format!("{name} landed in their end pit and goes again"));
            grant_turn(&mut self.registry, out, conn);
        } else {
            advance_turn(&mut self.registry, out, conn);
        }
    }

    /// Stops the game and announces every seated session's points.
    fn finish(&mut self, out: &mut impl Outbox) {
        self.over = true;
        for session in self.registry.iter_mut() {
            session.has_turn = false;
        }

        log_info("Game over!");
        broadcast(&self.registry, out, GAME_OVER_MSG, None);
        for score in self.scores() {
            log_info(&format!("{} has {} points", score.name, score.points));
            broadcast(&self.registry, out, &score_msg(&score.name, score.points), None);
        }
    }

    /// Total pebbles of each seated session, in registry order.
    pub fn scores(&self) -> Vec<Score> {
        self.registry
            .eligible()
            .map(|s| Score { name: s.name.clone(), points: s.points() })
            .collect()
    }

    pub fn record(&self) -> GameRecord {
        GameRecord {
            id: self.id.clone(),
            started_at: self.started_at,
            ended_at: Utc::now(),
            scores: self.scores(),
        }
    }
}
