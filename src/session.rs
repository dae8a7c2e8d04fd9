//! The board as seen by an interactive front end.
//!
//! Scrambles and solves produce a queue of moves that the front end plays back
//! one [`Session::step`] at a time. Until the queue drains, every other request
//! is rejected with [`Error::Busy`].

use std::collections::VecDeque;

use arrayvec::ArrayVec;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::{Board, Error, Policy, Pos, Strategy};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    #[default]
    Idle,
    Scrambling,
    Solving,
}

#[derive(Debug, Clone)]
pub struct Session {
    initial: Board,
    board: Board,
    phase: Phase,
    pending: VecDeque<Pos>,
    history: Vec<Board>,
}

impl Session {
    pub fn new(board: Board) -> Self {
        Self {
            initial: board,
            board,
            phase: Phase::Idle,
            pending: VecDeque::new(),
            history: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Moves queued but not yet played.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn ensure_idle(&self) -> Result<(), Error> {
        match self.phase {
            Phase::Idle => Ok(()),
            phase => Err(Error::Busy(phase)),
        }
    }

    /// A human move.
    pub fn click(&mut self, action: Pos) -> Result<(), Error> {
        self.ensure_idle()?;
        let next = self.board.apply(action)?;
        self.history.push(self.board);
        self.board = next;
        Ok(())
    }

    /// Returns whether there was anything to undo.
    /// A whole scramble or solve is undone at once.
    pub fn undo(&mut self) -> Result<bool, Error> {
        self.ensure_idle()?;
        Ok(match self.history.pop() {
            Some(board) => {
                self.board = board;
                true
            }
            None => false,
        })
    }

    pub fn reset(&mut self) -> Result<(), Error> {
        self.ensure_idle()?;
        self.history.push(self.board);
        self.board = self.initial;
        Ok(())
    }

    /// Queue a random walk of `moves` slides. Returns the number of queued moves.
    pub fn start_scramble(&mut self, moves: usize, rng: &mut impl Rng) -> Result<usize, Error> {
        self.ensure_idle()?;
        let actions = scramble(&self.board, moves, rng);
        Ok(self.enqueue(Phase::Scrambling, actions))
    }

    /// Solve the current board and queue the solution.
    pub fn start_solve<S: Strategy + ?Sized>(
        &mut self,
        strategy: &S,
        policy: &Policy,
        on_step: impl FnMut(),
    ) -> Result<usize, Error> {
        self.ensure_idle()?;
        let solution = crate::solve_staged(strategy, &self.board, policy, on_step)?;
        Ok(self.enqueue(Phase::Solving, solution.actions))
    }

    fn enqueue(&mut self, phase: Phase, actions: Vec<Pos>) -> usize {
        if actions.is_empty() {
            return 0;
        }
        self.history.push(self.board);
        self.pending.extend(actions);
        self.phase = phase;
        self.pending.len()
    }

    /// Play the next queued move. The session becomes idle after the last one.
    pub fn step(&mut self) -> Option<Pos> {
        let action = self.pending.pop_front()?;
        // Queued moves were generated from this exact sequence of boards.
        self.board = self.board.slide(action);
        if self.pending.is_empty() {
            self.phase = Phase::Idle;
        }
        Some(action)
    }
}

/// A random walk from `start`. Each slide picks among the blank's neighbours,
/// never moving the blank straight back to where it just was.
pub fn scramble(start: &Board, moves: usize, rng: &mut impl Rng) -> Vec<Pos> {
    let mut board = *start;
    let mut came_from = None;
    let mut actions = Vec::with_capacity(moves);
    for _ in 0..moves {
        let choices = board
            .legal_actions()
            .into_iter()
            .filter(|&action| Some(action) != came_from)
            .collect::<ArrayVec<Pos, 4>>();
        let Some(&action) = choices.choose(rng) else {
            break;
        };
        came_from = Some(board.blank());
        board = board.slide(action);
        actions.push(action);
    }
    actions
}
