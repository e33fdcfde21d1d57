//! Error and warning types for world compilation

use crate::expression::ExpressionParseError;
use std::fmt;

/// Fatal problems in the world description. The graph is unusable when any of
/// these occur; no partial result is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// A requirement expression failed to parse.
    Parse(ExpressionParseError),
    /// A requirement or connection referenced a fact that was never declared.
    UnknownFact { name: String },
    /// An area exit matched neither another area nor a declared map exit.
    UnresolvedExit { area: String, exit: String },
    /// A logical exit led into an abstract area.
    ExitToAbstractArea { area: String, exit: String },
    /// An abstract area declared a map exit other than the start exit.
    AbstractAreaExit { area: String, exit: String },
    /// An area listed an entrance that was never declared.
    UnknownEntrance { area: String, entrance: String },
    /// An exit's vanilla connection named an entrance that does not exist.
    UnknownVanillaEntrance { exit: String, entrance: String },
    /// The root area of the world description must be abstract.
    RootNotAbstract { name: String },
    /// Only areas allowing both times of day can permit sleeping.
    CannotSleep { area: String },
    /// A check was declared in an area without a hint region.
    CheckWithoutRegion { check: String },
    /// A linked entrance pool referenced an exit with no vanilla connection.
    PoolExitWithoutVanilla { pool: String, exit: String },
    /// The dump was missing one of the day/night marker facts.
    MissingMarkerFact { name: &'static str },
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Parse(e) => write!(f, "{}", e),
            CompileError::UnknownFact { name } => {
                write!(f, "requirement references unknown fact {:?}", name)
            }
            CompileError::UnresolvedExit { area, exit } => {
                write!(f, "area {:?}: exit {:?} not resolved", area, exit)
            }
            CompileError::ExitToAbstractArea { area, exit } => {
                write!(f, "area {:?}: exit {:?} leads to abstract area", area, exit)
            }
            CompileError::AbstractAreaExit { area, exit } => write!(
                f,
                "abstract area {:?} can only exit to the start exit, found {:?}",
                area, exit
            ),
            CompileError::UnknownEntrance { area, entrance } => {
                write!(f, "area {:?}: entrance {:?} does not exist", area, entrance)
            }
            CompileError::UnknownVanillaEntrance { exit, entrance } => write!(
                f,
                "exit {:?}: vanilla entrance {:?} does not exist",
                exit, entrance
            ),
            CompileError::RootNotAbstract { name } => {
                write!(f, "root area {:?} must be abstract", name)
            }
            CompileError::CannotSleep { area } => {
                write!(f, "cannot sleep in {:?}, area does not allow both times of day", area)
            }
            CompileError::CheckWithoutRegion { check } => {
                write!(f, "check {:?} has no hint region", check)
            }
            CompileError::PoolExitWithoutVanilla { pool, exit } => write!(
                f,
                "entrance pool {:?}: exit {:?} has no vanilla connection",
                pool, exit
            ),
            CompileError::MissingMarkerFact { name } => {
                write!(f, "marker fact {:?} missing from the fact universe", name)
            }
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ExpressionParseError> for CompileError {
    fn from(err: ExpressionParseError) -> Self {
        CompileError::Parse(err)
    }
}

/// Non-fatal findings from compilation, reported alongside the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileWarning {
    /// A fact's requirement was replaced rather than extended.
    RequirementOverwritten { name: String },
    /// A check is declared but nothing in the world can ever satisfy it.
    UnsatisfiableCheck { name: String },
    /// A dungeon's completion requirement named a check that does not exist.
    UnknownCompletionCheck { dungeon: String, check: String },
}

impl fmt::Display for CompileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileWarning::RequirementOverwritten { name } => {
                write!(f, "overwriting requirement for {:?}", name)
            }
            CompileWarning::UnsatisfiableCheck { name } => {
                write!(f, "check {:?} has no satisfiable requirement", name)
            }
            CompileWarning::UnknownCompletionCheck { dungeon, check } => write!(
                f,
                "dungeon {:?}: completion check {:?} does not exist",
                dungeon, check
            ),
        }
    }
}
