use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::solve::{trace_back, IndexMap, Stage, Strategy, ROOT};
use crate::{Board, Error, Pos, TargetSet};

/// Min-priority queue. Equal priorities pop in insertion order.
///
/// There is no decrease-key: an item may be pushed several times and callers
/// discard stale pops themselves.
#[derive(Debug)]
pub struct Frontier<T> {
    heap: BinaryHeap<Entry<T>>,
    next_seq: u64,
}

impl<T> Default for Frontier<T> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }
}

impl<T> Frontier<T> {
    pub fn push(&mut self, priority: u32, item: T) {
        self.heap.push(Entry {
            priority,
            seq: self.next_seq,
            item,
        });
        self.next_seq += 1;
    }

    pub fn pop(&mut self) -> Option<T> {
        self.heap.pop().map(|entry| entry.item)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[derive(Debug)]
struct Entry<T> {
    priority: u32,
    seq: u64,
    item: T,
}

// Reversed, `BinaryHeap` is a max-heap.
impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.priority, other.seq).cmp(&(self.priority, self.seq))
    }
}
impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl<T> Eq for Entry<T> {}

#[derive(Debug)]
struct Node {
    board: Board,
    cost: u32,
    parent: usize,
    action: Pos,
}

/// Lower bound on the slides left to place a target set.
///
/// Every variant ignores the blank and tiles outside the targets, so each one is
/// admissible and consistent.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Heuristic {
    /// Always zero: uniform-cost search.
    Null,
    /// Number of target tiles off their destination.
    Misplaced,
    /// [`Board::heuristic`].
    #[default]
    Manhattan,
}

impl Heuristic {
    pub const ALL: [Self; 3] = [Self::Null, Self::Misplaced, Self::Manhattan];

    pub fn estimate(self, board: &Board, targets: TargetSet) -> u32 {
        match self {
            Heuristic::Null => 0,
            Heuristic::Misplaced => board.misplaced(targets),
            Heuristic::Manhattan => board.heuristic(targets),
        }
    }
}

/// A* over `g + h`, `h` being evaluated on the successor.
#[derive(Debug, Default, Clone, Copy)]
pub struct AStar {
    pub heuristic: Heuristic,
}

impl AStar {
    pub fn new(heuristic: Heuristic) -> Self {
        Self { heuristic }
    }
}

impl Strategy for AStar {
    fn name(&self) -> &'static str {
        match self.heuristic {
            Heuristic::Null => "astar/null",
            Heuristic::Misplaced => "astar/misplaced",
            Heuristic::Manhattan => "astar",
        }
    }

    fn search(
        &self,
        start: &Board,
        targets: TargetSet,
        on_step: &mut dyn FnMut(),
    ) -> Result<Stage, Error> {
        // Expanded boards, with their parent index and the action reaching them.
        let mut visited: IndexMap<Board, (usize, Pos)> = IndexMap::default();
        let mut frontier = Frontier::default();
        frontier.push(
            self.heuristic.estimate(start, targets),
            Node {
                board: *start,
                cost: 0,
                parent: ROOT,
                action: start.blank(),
            },
        );

        loop {
            #[cfg(feature = "coz")]
            coz::scope!("Expand");

            // Lazy deletion of boards reached again through a longer path.
            let node = loop {
                let node = frontier.pop().ok_or(Error::SearchExhausted)?;
                if !visited.contains_key(&node.board) {
                    break node;
                }
            };
            let (idx, _) = visited.insert_full(node.board, (node.parent, node.action));

            if node.board.is_partial_goal(targets) {
                log::trace!(
                    "{}: goal after {} expansions, {} queued",
                    self.name(),
                    visited.len() - 1,
                    frontier.len(),
                );
                return Ok(Stage {
                    targets,
                    actions: trace_back(&visited, idx),
                    board: node.board,
                    expanded: visited.len() - 1,
                });
            }

            on_step();

            #[cfg(feature = "coz")]
            coz::progress!("Step");

            for action in node.board.legal_actions() {
                let next = node.board.slide(action);
                if visited.contains_key(&next) {
                    continue;
                }
                let cost = node.cost + 1;
                frontier.push(
                    cost + self.heuristic.estimate(&next, targets),
                    Node {
                        board: next,
                        cost,
                        parent: idx,
                        action,
                    },
                );
            }
        }
    }
}
