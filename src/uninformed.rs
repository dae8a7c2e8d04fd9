//! Searches without a heuristic, for comparison with [`AStar`](crate::AStar).
//! Both return shortest paths but only scale to a handful of moves.

use log::debug;

use crate::solve::{trace_back, IndexMap, Stage, Strategy, ROOT};
use crate::{Board, Error, Pos, TargetSet};

/// Every solvable 15-puzzle board is at most this many moves from solved.
pub const DIAMETER: usize = 80;

#[derive(Debug, Default, Clone, Copy)]
pub struct Bfs;

impl Strategy for Bfs {
    fn name(&self) -> &'static str {
        "bfs"
    }

    fn search(
        &self,
        start: &Board,
        targets: TargetSet,
        on_step: &mut dyn FnMut(),
    ) -> Result<Stage, Error> {
        // Insertion order is the FIFO queue, `cursor` its head.
        let mut parents: IndexMap<Board, (usize, Pos)> = IndexMap::default();
        parents.insert(*start, (ROOT, start.blank()));

        let mut cursor = 0;
        loop {
            let Some((&board, _)) = parents.get_index(cursor) else {
                return Err(Error::SearchExhausted);
            };
            if board.is_partial_goal(targets) {
                return Ok(Stage {
                    targets,
                    actions: trace_back(&parents, cursor),
                    board,
                    expanded: cursor,
                });
            }
            on_step();
            for action in board.legal_actions() {
                parents
                    .entry(board.slide(action))
                    .or_insert((cursor, action));
            }
            cursor += 1;
        }
    }
}

/// Iterative deepening DFS. The depth limit grows from 0 to `max_depth`.
#[derive(Debug, Clone, Copy)]
pub struct Iddfs {
    pub max_depth: usize,
}

impl Default for Iddfs {
    fn default() -> Self {
        Self {
            max_depth: DIAMETER,
        }
    }
}

impl Strategy for Iddfs {
    fn name(&self) -> &'static str {
        "iddfs"
    }

    fn search(
        &self,
        start: &Board,
        targets: TargetSet,
        on_step: &mut dyn FnMut(),
    ) -> Result<Stage, Error> {
        let mut walk = Walk {
            targets,
            path: Vec::new(),
            expanded: 0,
            on_step,
        };
        for limit in 0..=self.max_depth {
            debug!(
                "iddfs: depth limit {limit}, {} expanded so far",
                walk.expanded
            );
            if let Some(board) = walk.descend(*start, limit, None) {
                return Ok(Stage {
                    targets,
                    actions: walk.path,
                    board,
                    expanded: walk.expanded,
                });
            }
        }
        Err(Error::SearchExhausted)
    }
}

struct Walk<'a> {
    targets: TargetSet,
    path: Vec<Pos>,
    expanded: usize,
    on_step: &'a mut dyn FnMut(),
}

impl Walk<'_> {
    /// `came_from` is the previous blank position; sliding it back would undo the last move.
    fn descend(&mut self, board: Board, remaining: usize, came_from: Option<Pos>) -> Option<Board> {
        if board.is_partial_goal(self.targets) {
            return Some(board);
        }
        if remaining == 0 {
            return None;
        }

        self.expanded += 1;
        (self.on_step)();

        for action in board.legal_actions() {
            if Some(action) == came_from {
                continue;
            }
            self.path.push(action);
            let next = board.slide(action);
            if let Some(end) = self.descend(next, remaining - 1, Some(board.blank())) {
                return Some(end);
            }
            self.path.pop();
        }
        None
    }
}
