use log::{debug, info};

use crate::{AStar, Board, Error, PolicyDefect, Pos, TargetSet};

pub(crate) type IndexMap<K, V> = indexmap::IndexMap<K, V, fxhash::FxBuildHasher>;

/// Parent index of the start board in a parent map.
pub(crate) const ROOT: usize = !0;

/// A search strategy solving a single stage: reach any board where every tile of
/// `targets` sits at its destination.
pub trait Strategy {
    fn name(&self) -> &'static str;

    /// `on_step` is called once per expanded board.
    fn search(
        &self,
        start: &Board,
        targets: TargetSet,
        on_step: &mut dyn FnMut(),
    ) -> Result<Stage, Error>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub targets: TargetSet,
    pub actions: Vec<Pos>,
    pub board: Board,
    /// Number of boards expanded by the search.
    pub expanded: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub actions: Vec<Pos>,
    pub board: Board,
    pub stages: Vec<Stage>,
}

impl Solution {
    pub fn expanded(&self) -> usize {
        self.stages.iter().map(|stage| stage.expanded).sum()
    }
}

/// An ordered chain of target sets, each a superset of the one before,
/// ending with every tile.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Policy {
    stages: Vec<TargetSet>,
}

impl Policy {
    pub fn new(stages: Vec<TargetSet>) -> Result<Self, Error> {
        let Some(&last) = stages.last() else {
            return Err(Error::InvalidPolicy(PolicyDefect::Empty));
        };
        if let Some(i) = stages.windows(2).position(|w| !w[1].is_superset(w[0])) {
            return Err(Error::InvalidPolicy(PolicyDefect::Shrinks(i + 1)));
        }
        if last != TargetSet::FULL {
            return Err(Error::InvalidPolicy(PolicyDefect::Incomplete));
        }
        Ok(Self { stages })
    }

    /// Search for the whole board at once.
    pub fn single() -> Self {
        Self {
            stages: vec![TargetSet::FULL],
        }
    }

    /// Built-in chains with `n` stages. More stages solve faster with longer solutions.
    ///
    /// The 7-stage chain places {1,2}, then the top row, {5,6}, the second row,
    /// the left column, the second column and finally the remaining 2×2 corner.
    pub fn breaks(n: usize) -> Result<Self, Error> {
        let groups: &[&[u8]] = match n {
            7 => &[&[1, 2], &[3, 4], &[5, 6], &[7, 8], &[9, 13], &[10, 14], &[11, 12, 15, 16]],
            6 => &[&[1, 2], &[3, 4], &[5, 6, 7, 8], &[9, 13], &[10, 14], &[11, 12, 15, 16]],
            5 => &[&[1, 2, 3, 4], &[5, 6, 7, 8], &[9, 13], &[10, 14], &[11, 12, 15, 16]],
            4 => &[&[1, 2, 3, 4], &[5, 6, 7, 8], &[9, 13, 10, 14], &[11, 12, 15, 16]],
            2 => &[&[1, 2, 3, 4, 5, 6, 7, 8], &[9, 10, 11, 12, 13, 14, 15, 16]],
            1 => return Ok(Self::single()),
            _ => return Err(Error::InvalidPolicy(PolicyDefect::UnknownPreset(n))),
        };
        let mut placed = TargetSet::EMPTY;
        let stages = groups
            .iter()
            .map(|group| {
                placed = placed.union(TargetSet::from_values(group.iter().copied())?);
                Ok(placed)
            })
            .collect::<Result<Vec<_>, Error>>()?;
        Self::new(stages)
    }

    pub fn stages(&self) -> &[TargetSet] {
        &self.stages
    }
}

/// Run `strategy` once per stage of `policy`, each stage starting where the previous
/// one ended, and concatenate the moves.
pub fn solve_staged<S: Strategy + ?Sized>(
    strategy: &S,
    start: &Board,
    policy: &Policy,
    mut on_step: impl FnMut(),
) -> Result<Solution, Error> {
    if !start.is_solvable() {
        return Err(Error::UnsolvableConfiguration);
    }

    let mut board = *start;
    let mut actions = Vec::new();
    let mut stages = Vec::with_capacity(policy.stages().len());
    let mut placed = TargetSet::EMPTY;
    for (&targets, i) in policy.stages().iter().zip(1..) {
        let stage = strategy.search(&board, targets, &mut on_step)?;
        debug!(
            "{} stage {i}/{}: {} targets, {} moves, {} expanded",
            strategy.name(),
            policy.stages().len(),
            targets.len(),
            stage.actions.len(),
            stage.expanded,
        );
        debug_assert!(stage.board.is_partial_goal(targets));
        debug_assert!(
            stage.board.is_partial_goal(placed),
            "stage {i} disturbed placed tiles"
        );
        placed = targets;
        board = stage.board;
        actions.extend_from_slice(&stage.actions);
        stages.push(stage);
    }

    info!(
        "{} solved in {} moves over {} stages",
        strategy.name(),
        actions.len(),
        stages.len(),
    );
    Ok(Solution {
        actions,
        board,
        stages,
    })
}

/// Staged A* solve, returning only the moves.
pub fn solve(board: &Board, policy: &Policy) -> Result<Vec<Pos>, Error> {
    let solution = solve_staged(&AStar::default(), board, policy, || {})?;
    Ok(solution.actions)
}

/// Walk parent links back from `last` to the start board.
pub(crate) fn trace_back(parents: &IndexMap<Board, (usize, Pos)>, last: usize) -> Vec<Pos> {
    let mut actions = std::iter::successors(Some(last), |&i| {
        let (parent, _) = parents[i];
        (parent != ROOT).then_some(parent)
    })
    .filter_map(|i| {
        let (parent, action) = parents[i];
        (parent != ROOT).then_some(action)
    })
    .collect::<Vec<_>>();
    actions.reverse();
    actions
}
