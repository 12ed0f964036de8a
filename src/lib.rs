//! Fill a crossword grid from a word list by treating it as a constraint satisfaction problem:
//! every slot needs a word of its length, and crossing slots need to agree on their shared
//! letter. Domains are pruned with node and arc consistency, then a backtracking search finds a
//! complete assignment.

pub mod arc_consistency;
pub mod backtracking_search;
pub mod consistency;
pub mod domains;
pub mod error;
pub mod grid_config;
pub mod order;
pub mod render;
pub mod word_list;

/// The expected maximum number of distinct characters appearing in a word list.
pub const MAX_GLYPH_COUNT: usize = 256;

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;

pub use backtracking_search::{solve, FillFailure, FillOptions, FillSuccess, Statistics};
pub use consistency::{Assignment, DuplicatePolicy};
pub use error::{Error, Result};
pub use grid_config::{Direction, GridConfig, SlotConfig, SlotId};
pub use render::{render_grid, render_image, save_image};
pub use word_list::{WordId, WordList};
