//! Selection targeting
//!
//! Resolves what the host reports as selected (a caret, a dragged range or a
//! set of cells, all in physical addresses) into a [`Target`]: the single
//! cell, row range, column range or block a transform operates on.

mod resolver;
mod selection;

#[cfg(test)]
mod tests;

pub use resolver::{
    resolve_cell, resolve_menu, resolve_paste, PasteTarget, Placement, Target, TargetKind,
};
pub use selection::{Selection, SelectionRange};
