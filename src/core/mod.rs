//! Core table engine
//!
//! This module contains the grid engine and the command surface built on it:
//! - `grid`: logical grid over a physical table, with span resolution
//! - `target`: host selections resolved into structural targets
//! - `transform`: insert, delete, merge/split, copy/paste and type changes
//! - `clipboard`: the last copied rows or columns
//! - `commands`: named commands run by a `TableEditor`
//! - `options`: engine configuration

pub mod clipboard;
pub mod commands;
pub mod grid;
pub mod options;
pub mod target;
pub mod transform;

pub use clipboard::{Clipboard, Fragment};
pub use commands::{
    command_kind, insert_table, CommandKind, CommandOutcome, InsertTableOptions, TableCommand,
    TableEditor,
};
pub use grid::{Axis, Bounds, CellId, Grid};
pub use options::{DegradedPolicy, EngineOptions, HeaderType};
pub use target::{Placement, Selection, Target, TargetKind};
pub use transform::{Outcome, RowType};
