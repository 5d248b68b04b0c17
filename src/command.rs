//! Textual edit commands.
//!
//! One command per line, words separated by whitespace. Rows and columns
//! are 1-based and may be negative to count from the end.
//!
//! ```text
//! gap <column> [count]                      insert gap columns before <column>
//! strip                                     remove all-gap columns
//! start <row> <position>                    move a row's start in its source
//! stop <row> <position>                     move a row's stop in its source
//! extend-left <top> <bottom> <column>       (also extend-right, trim-left,
//!                                            trim-right, level-left, level-right)
//! collapse-left <left> <top> <right> <bottom>   (also collapse-right)
//! slide <left> <top> <right> <bottom> <delta>
//! swap <row> <row>
//! move <row> <to> | move <first> <last> <to>
//! remove <row> [count]
//! ```
//!
//! Scripts may contain blank lines and `#` comments.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::alignment::{Alignment, EditError};
use crate::controller::EditSession;
use crate::coords::Rect;
use crate::event::{changed_columns, SubseqChange};

/// Errors raised while parsing or running a command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}'")]
    Unknown(String),

    #[error("{command}: expected {expected} arguments, got {found}")]
    WrongArity {
        command: String,
        expected: &'static str,
        found: usize,
    },

    #[error("{command}: '{value}' is not a valid number")]
    InvalidNumber { command: String, value: String },

    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: Box<CommandError>,
    },

    #[error(transparent)]
    Edit(#[from] EditError),
}

/// Which side a boundary batch works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Kind of boundary batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryEdit {
    Extend,
    Trim,
    Level,
}

impl fmt::Display for BoundaryEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryEdit::Extend => write!(f, "extend"),
            BoundaryEdit::Trim => write!(f, "trim"),
            BoundaryEdit::Level => write!(f, "level"),
        }
    }
}

/// A parsed edit command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    InsertGaps { column: isize, count: usize },
    StripGaps,
    SetStart { row: isize, position: usize },
    SetStop { row: isize, position: usize },
    Boundary {
        edit: BoundaryEdit,
        side: Side,
        top: isize,
        bottom: isize,
        column: isize,
    },
    Collapse {
        side: Side,
        left: isize,
        top: isize,
        right: isize,
        bottom: isize,
    },
    Slide {
        left: isize,
        top: isize,
        right: isize,
        bottom: isize,
        delta: isize,
    },
    Swap { first: isize, second: isize },
    Move { first: isize, last: isize, to: isize },
    Remove { row: isize, count: usize },
}

impl fmt::Display for EditCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditCommand::InsertGaps { column, count } => write!(f, "gap {} {}", column, count),
            EditCommand::StripGaps => write!(f, "strip"),
            EditCommand::SetStart { row, position } => write!(f, "start {} {}", row, position),
            EditCommand::SetStop { row, position } => write!(f, "stop {} {}", row, position),
            EditCommand::Boundary {
                edit,
                side,
                top,
                bottom,
                column,
            } => write!(f, "{}-{} {} {} {}", edit, side, top, bottom, column),
            EditCommand::Collapse {
                side,
                left,
                top,
                right,
                bottom,
            } => write!(f, "collapse-{} {} {} {} {}", side, left, top, right, bottom),
            EditCommand::Slide {
                left,
                top,
                right,
                bottom,
                delta,
            } => write!(f, "slide {} {} {} {} {}", left, top, right, bottom, delta),
            EditCommand::Swap { first, second } => write!(f, "swap {} {}", first, second),
            EditCommand::Move { first, last, to } => write!(f, "move {} {} {}", first, last, to),
            EditCommand::Remove { row, count } => write!(f, "remove {} {}", row, count),
        }
    }
}

/// Argument cursor over one command line.
struct Args<'a> {
    command: &'a str,
    words: Vec<&'a str>,
}

impl<'a> Args<'a> {
    fn arity(&self, allowed: &[usize], expected: &'static str) -> Result<(), CommandError> {
        if allowed.contains(&self.words.len()) {
            Ok(())
        } else {
            Err(CommandError::WrongArity {
                command: self.command.to_string(),
                expected,
                found: self.words.len(),
            })
        }
    }

    fn number<T: FromStr>(&self, i: usize) -> Result<T, CommandError> {
        let value = self.words[i];
        value.parse().map_err(|_| CommandError::InvalidNumber {
            command: self.command.to_string(),
            value: value.to_string(),
        })
    }

    fn number_or<T: FromStr>(&self, i: usize, default: T) -> Result<T, CommandError> {
        if i < self.words.len() {
            self.number(i)
        } else {
            Ok(default)
        }
    }
}

impl FromStr for EditCommand {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = words.next().ok_or(CommandError::Empty)?;
        let args = Args {
            command,
            words: words.collect(),
        };

        let boundary = |edit, side| -> Result<EditCommand, CommandError> {
            args.arity(&[3], "3")?;
            Ok(EditCommand::Boundary {
                edit,
                side,
                top: args.number(0)?,
                bottom: args.number(1)?,
                column: args.number(2)?,
            })
        };
        let collapse = |side| -> Result<EditCommand, CommandError> {
            args.arity(&[4], "4")?;
            Ok(EditCommand::Collapse {
                side,
                left: args.number(0)?,
                top: args.number(1)?,
                right: args.number(2)?,
                bottom: args.number(3)?,
            })
        };

        match command {
            "gap" => {
                args.arity(&[1, 2], "1 or 2")?;
                Ok(EditCommand::InsertGaps {
                    column: args.number(0)?,
                    count: args.number_or(1, 1)?,
                })
            }
            "strip" => {
                args.arity(&[0], "0")?;
                Ok(EditCommand::StripGaps)
            }
            "start" | "stop" => {
                args.arity(&[2], "2")?;
                let row = args.number(0)?;
                let position = args.number(1)?;
                Ok(if command == "start" {
                    EditCommand::SetStart { row, position }
                } else {
                    EditCommand::SetStop { row, position }
                })
            }
            "extend-left" => boundary(BoundaryEdit::Extend, Side::Left),
            "extend-right" => boundary(BoundaryEdit::Extend, Side::Right),
            "trim-left" => boundary(BoundaryEdit::Trim, Side::Left),
            "trim-right" => boundary(BoundaryEdit::Trim, Side::Right),
            "level-left" => boundary(BoundaryEdit::Level, Side::Left),
            "level-right" => boundary(BoundaryEdit::Level, Side::Right),
            "collapse-left" => collapse(Side::Left),
            "collapse-right" => collapse(Side::Right),
            "slide" => {
                args.arity(&[5], "5")?;
                Ok(EditCommand::Slide {
                    left: args.number(0)?,
                    top: args.number(1)?,
                    right: args.number(2)?,
                    bottom: args.number(3)?,
                    delta: args.number(4)?,
                })
            }
            "swap" => {
                args.arity(&[2], "2")?;
                Ok(EditCommand::Swap {
                    first: args.number(0)?,
                    second: args.number(1)?,
                })
            }
            "move" => {
                args.arity(&[2, 3], "2 or 3")?;
                let first = args.number(0)?;
                let (last, to) = if args.words.len() == 3 {
                    (args.number(1)?, args.number(2)?)
                } else {
                    (first, args.number(1)?)
                };
                Ok(EditCommand::Move { first, last, to })
            }
            "remove" => {
                args.arity(&[1, 2], "1 or 2")?;
                Ok(EditCommand::Remove {
                    row: args.number(0)?,
                    count: args.number_or(1, 1)?,
                })
            }
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Parses a script, skipping blank lines and `#` comments.
pub fn parse_script(text: &str) -> Result<Vec<EditCommand>, CommandError> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.split('#').next().unwrap_or("").trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(line, text)| {
            text.parse().map_err(|e| CommandError::Line {
                line,
                source: Box::new(e),
            })
        })
        .collect()
}

/// Builds a 1-based rectangle from signed bounds.
fn rect(
    aln: &Alignment,
    left: isize,
    top: isize,
    right: isize,
    bottom: isize,
) -> Result<Rect, EditError> {
    if aln.is_empty() {
        return Err(EditError::NoRows);
    }
    let column = |index: isize| match aln.normalize_column(index) {
        0 => Err(EditError::ColumnOutOfRange {
            index,
            length: aln.length(),
        }),
        c => Ok(c),
    };
    let row = |index: isize| match aln.normalize_row(index) {
        0 => Err(EditError::RowOutOfRange {
            index,
            rows: aln.row_count(),
        }),
        r => Ok(r),
    };
    Ok(Rect::new(column(left)?, row(top)?, column(right)?, row(bottom)?))
}

fn describe(changes: &[SubseqChange]) -> String {
    match changed_columns(changes) {
        Some(columns) => format!("{} row changes over columns {}", changes.len(), columns),
        None => "nothing to change".to_string(),
    }
}

impl EditCommand {
    /// Runs the command in a session and returns a one-line report.
    pub fn apply(&self, session: &mut EditSession) -> Result<String, CommandError> {
        log::debug!("running '{}'", self);
        let report = session.edit(|aln| -> Result<String, EditError> {
            Ok(match *self {
                EditCommand::InsertGaps { column, count } => {
                    let gap = aln.gap_char();
                    let columns = aln.insert_gap_columns(column, count, gap)?;
                    format!("inserted gap columns {}", columns)
                }
                EditCommand::StripGaps => {
                    format!("removed {} gap columns", aln.remove_gap_columns())
                }
                EditCommand::SetStart { row, position } => {
                    describe(&aln.set_subseq_start(row, position)?)
                }
                EditCommand::SetStop { row, position } => {
                    describe(&aln.set_subseq_stop(row, position)?)
                }
                EditCommand::Boundary {
                    edit,
                    side,
                    top,
                    bottom,
                    column,
                } => {
                    let changes = match (edit, side) {
                        (BoundaryEdit::Extend, Side::Left) => {
                            aln.extend_subseqs_left(top, bottom, column)
                        }
                        (BoundaryEdit::Extend, Side::Right) => {
                            aln.extend_subseqs_right(top, bottom, column)
                        }
                        (BoundaryEdit::Trim, Side::Left) => {
                            aln.trim_subseqs_left(top, bottom, column)
                        }
                        (BoundaryEdit::Trim, Side::Right) => {
                            aln.trim_subseqs_right(top, bottom, column)
                        }
                        (BoundaryEdit::Level, Side::Left) => {
                            aln.level_subseqs_left(top, bottom, column)
                        }
                        (BoundaryEdit::Level, Side::Right) => {
                            aln.level_subseqs_right(top, bottom, column)
                        }
                    }?;
                    describe(&changes)
                }
                EditCommand::Collapse {
                    side,
                    left,
                    top,
                    right,
                    bottom,
                } => {
                    let area = rect(aln, left, top, right, bottom)?;
                    let changes = match side {
                        Side::Left => aln.collapse_left(area)?,
                        Side::Right => aln.collapse_right(area)?,
                    };
                    describe(&changes)
                }
                EditCommand::Slide {
                    left,
                    top,
                    right,
                    bottom,
                    delta,
                } => {
                    let applied = aln.slide_region(left, top, right, bottom, delta)?;
                    format!("slid by {} (requested {})", applied, delta)
                }
                EditCommand::Swap { first, second } => {
                    aln.swap(first, second)?;
                    format!("swapped rows {} and {}", first, second)
                }
                EditCommand::Move { first, last, to } => {
                    aln.move_row_range(first, last, to)?;
                    format!("moved rows {}..{} to {}", first, last, to)
                }
                EditCommand::Remove { row, count } => {
                    let removed = aln.remove_rows(row, count)?;
                    let ids: Vec<&str> = removed.iter().map(|r| r.id()).collect();
                    format!("removed {}", ids.join(", "))
                }
            })
        })?;
        Ok(report)
    }
}
