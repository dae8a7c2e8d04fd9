use std::str::FromStr;

use anyhow::{bail, ensure, Context, Result};

use crate::{Board, BoardDefect, Error, Policy, Pos, TargetSet, BLANK, CELLS, SIDE};

impl FromStr for Board {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cells = [0; CELLS];
        let mut len = 0;
        let mut rows = 0;
        let lines = s.lines().map(str::trim).filter(|line| !line.is_empty());
        for line in lines {
            let width = line.split_whitespace().count();
            ensure!(
                width == SIDE as usize,
                "Row {} has {width} cells, expecting {SIDE}",
                rows + 1,
            );
            for token in line.split_whitespace() {
                let value = match token {
                    "." | "_" => BLANK,
                    _ => token
                        .parse::<u8>()
                        .with_context(|| format!("Invalid cell: {token:?}"))?,
                };
                if let Some(cell) = cells.get_mut(len) {
                    *cell = value;
                }
                len += 1;
            }
            rows += 1;
        }
        if len != CELLS {
            return Err(Error::InvalidBoard(BoardDefect::CellCount(len)).into());
        }
        Ok(Board::from_cells(cells)?)
    }
}

impl FromStr for Pos {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .trim()
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .with_context(|| format!("Invalid action: {s:?}"))?;
        let (row, col) = inner
            .split_once(',')
            .with_context(|| format!("Invalid action: {s:?}"))?;
        let pos = Pos(row.trim().parse()?, col.trim().parse()?);
        ensure!(pos.is_in_bounds(), "Action {pos} out of the board");
        Ok(pos)
    }
}

impl FromStr for TargetSet {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == "all" {
            return Ok(TargetSet::FULL);
        }
        let values = s
            .split(|ch: char| ch == ',' || ch.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(|token| {
                token
                    .parse::<u8>()
                    .with_context(|| format!("Invalid tile: {token:?}"))
            })
            .collect::<Result<Vec<_>>>()?;
        ensure!(!values.is_empty(), "Empty target set");
        Ok(TargetSet::from_values(values)?)
    }
}

/// One stage per line, each listing its complete target set.
/// Blank lines and `#` comments are skipped.
impl FromStr for Policy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut stages = Vec::new();
        for (line, i) in s.lines().zip(1..) {
            let line = match line.split_once('#') {
                Some((content, _)) => content.trim(),
                None => line.trim(),
            };
            if line.is_empty() {
                continue;
            }
            let targets = line
                .parse::<TargetSet>()
                .with_context(|| format!("Invalid stage on line {i}"))?;
            stages.push(targets);
        }
        if stages.is_empty() {
            bail!("Policy has no stages");
        }
        Ok(Policy::new(stages)?)
    }
}
