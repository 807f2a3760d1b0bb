//! The room entity: one board, one turn, two symbol slots.

use crate::code::RoomCode;
use crate::error::SessionError;
use crate::hub::ConnectionId;
use crate::protocol::StateView;
use crate::scheduler::TimerId;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use strictly_tictactoe::{Board, Mark, Win, apply_move, check_winner, is_draw};
use tracing::{debug, info, instrument};

/// A value per symbol slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PerMark<T> {
    /// Slot X.
    pub x: T,
    /// Slot O.
    pub o: T,
}

impl<T> PerMark<T> {
    /// Value for `mark`.
    pub fn get(&self, mark: Mark) -> &T {
        match mark {
            Mark::X => &self.x,
            Mark::O => &self.o,
        }
    }

    /// Mutable value for `mark`.
    pub fn get_mut(&mut self, mark: Mark) -> &mut T {
        match mark {
            Mark::X => &mut self.x,
            Mark::O => &mut self.o,
        }
    }

    /// Exchanges the two values.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.x, &mut self.o);
    }
}

/// Wins per symbol and drawn rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scores {
    /// Rounds won by X.
    #[serde(rename = "X")]
    pub x: u32,
    /// Rounds won by O.
    #[serde(rename = "O")]
    pub o: u32,
    /// Drawn rounds.
    pub draws: u32,
}

impl Scores {
    fn record_win(&mut self, mark: Mark) {
        match mark {
            Mark::X => self.x += 1,
            Mark::O => self.o += 1,
        }
    }
}

/// Result of an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Turn passed to the other symbol.
    Continue,
    /// The mover completed a line.
    Won(Win),
    /// Ninth symbol placed with no line.
    Draw,
}

/// An isolated game instance identified by a short code.
#[derive(Debug, Clone, Getters)]
pub struct Room {
    code: RoomCode,
    board: Board,
    current_player: Mark,
    winner: Option<Mark>,
    winning_line: Option<[usize; 3]>,
    is_draw: bool,
    move_count: usize,
    scores: Scores,
    players: PerMark<Option<ConnectionId>>,
    disconnect_timers: PerMark<Option<TimerId>>,
    last_activity: Instant,
}

impl Room {
    /// Creates an empty room. X moves first.
    #[instrument(skip(now))]
    pub fn new(code: RoomCode, now: Instant) -> Self {
        info!(room = %code, "Creating room");
        Self {
            code,
            board: Board::new(),
            current_player: Mark::X,
            winner: None,
            winning_line: None,
            is_draw: false,
            move_count: 0,
            scores: Scores::default(),
            players: PerMark::default(),
            disconnect_timers: PerMark::default(),
            last_activity: now,
        }
    }

    /// Whether the round has ended in a win or a draw.
    pub fn is_decided(&self) -> bool {
        self.winner.is_some() || self.is_draw
    }

    /// Records activity for the inactivity sweep.
    pub fn touch(&mut self, now: Instant) {
        self.last_activity = now;
    }

    /// Connection holding `mark`, if any.
    pub fn player(&self, mark: Mark) -> Option<ConnectionId> {
        *self.players.get(mark)
    }

    /// Puts `conn` in slot `mark` (or empties it with `None`).
    pub fn set_player(&mut self, mark: Mark, conn: Option<ConnectionId>) {
        *self.players.get_mut(mark) = conn;
    }

    /// First empty slot, X before O.
    pub fn open_slot(&self) -> Option<Mark> {
        [Mark::X, Mark::O]
            .into_iter()
            .find(|mark| self.players.get(*mark).is_none())
    }

    /// Number of occupied slots (0-2).
    pub fn occupied_count(&self) -> usize {
        [self.players.x, self.players.o]
            .iter()
            .filter(|p| p.is_some())
            .count()
    }

    /// Pending disconnect timer for `mark`.
    pub fn disconnect_timer(&self, mark: Mark) -> Option<TimerId> {
        *self.disconnect_timers.get(mark)
    }

    /// Replaces the pending timer for `mark`, returning the previous one.
    pub fn set_disconnect_timer(&mut self, mark: Mark, timer: Option<TimerId>) -> Option<TimerId> {
        std::mem::replace(self.disconnect_timers.get_mut(mark), timer)
    }

    /// Slot whose pending timer is `timer`.
    pub fn timer_slot(&self, timer: TimerId) -> Option<Mark> {
        [Mark::X, Mark::O]
            .into_iter()
            .find(|mark| *self.disconnect_timers.get(*mark) == Some(timer))
    }

    /// Applies a move by `mark` at `index`.
    ///
    /// `index` is `None` when the client sent something that is not a
    /// non-negative integer. A rejected move leaves the room untouched.
    #[instrument(skip(self, now), fields(room = %self.code))]
    pub fn play(
        &mut self,
        mark: Mark,
        index: Option<usize>,
        now: Instant,
    ) -> Result<MoveOutcome, SessionError> {
        if mark != self.current_player {
            debug!(expected = ?self.current_player, "Move out of turn");
            return Err(SessionError::NotYourTurn);
        }
        if self.is_decided() {
            debug!("Move after round ended");
            return Err(SessionError::InvalidMove);
        }
        let index = index.ok_or(SessionError::InvalidMove)?;
        self.board = apply_move(&self.board, index, mark).map_err(|e| {
            debug!(error = %e, "Move rejected by board");
            SessionError::InvalidMove
        })?;
        self.move_count += 1;
        self.last_activity = now;

        let outcome = if let Some(win) = check_winner(&self.board) {
            self.winner = Some(win.mark);
            self.winning_line = Some(win.line);
            self.scores.record_win(win.mark);
            MoveOutcome::Won(win)
        } else if is_draw(&self.board, self.move_count) {
            self.is_draw = true;
            self.scores.draws += 1;
            MoveOutcome::Draw
        } else {
            self.current_player = mark.opponent();
            MoveOutcome::Continue
        };
        info!(index, ?mark, ?outcome, "Move applied");
        Ok(outcome)
    }

    /// Clears the round. Scores are kept.
    #[instrument(skip(self), fields(room = %self.code))]
    pub fn reset_board(&mut self) {
        self.board = Board::new();
        self.current_player = Mark::X;
        self.winner = None;
        self.winning_line = None;
        self.is_draw = false;
        self.move_count = 0;
    }

    /// Zeroes all scores.
    pub fn clear_scores(&mut self) {
        self.scores = Scores::default();
    }

    /// Exchanges which connection holds X and which holds O.
    ///
    /// Pending disconnect timers move with their (empty) slots.
    #[instrument(skip(self), fields(room = %self.code))]
    pub fn swap_slots(&mut self) {
        self.players.swap();
        self.disconnect_timers.swap();
    }

    /// The room as seen from slot `mark`.
    pub fn view_for(&self, mark: Mark) -> StateView {
        StateView {
            board: self.board,
            current_player: self.current_player,
            winner: self.winner,
            winning_line: self.winning_line,
            is_draw: self.is_draw,
            scores: self.scores,
            your_symbol: mark,
            opponent_connected: self.players.get(mark.opponent()).is_some(),
            player_count: self.occupied_count(),
        }
    }
}
