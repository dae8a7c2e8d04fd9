use std::fmt;

use crate::{Board, BoardDefect, Phase, Policy, PolicyDefect, Pos, TargetSet, BLANK};

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for (i, &value) in row.iter().enumerate() {
                if i != 0 {
                    " ".fmt(f)?;
                }
                if value == BLANK {
                    " .".fmt(f)?;
                } else {
                    write!(f, "{value:2}")?;
                }
            }
            "\n".fmt(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.0, self.1)
    }
}

impl fmt::Display for TargetSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == TargetSet::FULL {
            return "all".fmt(f);
        }
        for (i, value) in self.iter().enumerate() {
            if i != 0 {
                ",".fmt(f)?;
            }
            value.fmt(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for targets in self.stages() {
            writeln!(f, "{targets}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => "idle".fmt(f),
            Phase::Scrambling => "scrambling".fmt(f),
            Phase::Solving => "solving".fmt(f),
        }
    }
}

impl fmt::Display for BoardDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardDefect::CellCount(n) => write!(f, "expecting 16 cells, got {n}"),
            BoardDefect::OutOfRange(value) => write!(f, "tile {value} out of range 1..=16"),
            BoardDefect::Duplicate(value) => write!(f, "tile {value} appears more than once"),
        }
    }
}

impl fmt::Display for PolicyDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyDefect::Empty => "no stages".fmt(f),
            PolicyDefect::Shrinks(stage) => {
                write!(f, "stage {stage} is not a superset of the stage before it")
            }
            PolicyDefect::Incomplete => "last stage does not cover every tile".fmt(f),
            PolicyDefect::UnknownPreset(n) => {
                write!(
                    f,
                    "no built-in policy with {n} stages, try 1, 2, 4, 5, 6 or 7"
                )
            }
        }
    }
}
