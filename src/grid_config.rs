use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::Path;

use log::debug;
use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::MAX_SLOT_LENGTH;

/// An identifier for a given slot, based on its index in the GridConfig's `slot_configs` field.
pub type SlotId = usize;

/// Zero-indexed x and y coords for a cell in the grid, where y = 0 in the top row.
pub type GridCoord = (usize, usize);

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Across,
    Down,
}

/// A struct representing a crossing between one slot and another, referencing the other slot's id
/// and the location of the intersection within the other slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crossing {
    pub other_slot_id: SlotId,
    pub other_slot_cell: usize,
}

/// A run of open cells that has to hold a single word.
#[derive(Clone)]
pub struct SlotConfig {
    pub id: SlotId,
    pub start_cell: GridCoord,
    pub direction: Direction,
    pub length: usize,
    pub crossings: SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]>,
}

impl Debug for SlotConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotConfig")
            .field("id", &self.id)
            .field("start_cell", &self.start_cell)
            .field("direction", &self.direction)
            .field("length", &self.length)
            .finish()
    }
}

// Two slots can only share a start cell if they face different ways, so the length never takes
// part in identity.
impl PartialEq for SlotConfig {
    fn eq(&self, other: &Self) -> bool {
        self.start_cell == other.start_cell && self.direction == other.direction
    }
}

impl Eq for SlotConfig {}

impl Hash for SlotConfig {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.start_cell.hash(state);
        self.direction.hash(state);
    }
}

impl SlotConfig {
    /// Generate the coords for each cell of this slot.
    pub fn cell_coords(&self) -> Vec<GridCoord> {
        cell_coords(self.start_cell, self.direction, self.length)
    }
}

fn cell_coords(start_cell: GridCoord, direction: Direction, length: usize) -> Vec<GridCoord> {
    (0..length)
        .map(|cell_idx| match direction {
            Direction::Across => (start_cell.0 + cell_idx, start_cell.1),
            Direction::Down => (start_cell.0, start_cell.1 + cell_idx),
        })
        .collect()
}

/// The static shape of the puzzle: which cells are open, which slots they form, and how those
/// slots cross. Nothing here changes once the grid is built.
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
    structure: Vec<Vec<bool>>,
    pub slot_configs: Vec<SlotConfig>,
}

impl Debug for GridConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridConfig")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("slot_configs", &self.slot_configs)
            .finish()
    }
}

/// Collect the runs of two or more open cells from a sequence of cells along one line.
fn find_runs<I>(cells: I) -> Vec<(GridCoord, usize)>
where
    I: IntoIterator<Item = (GridCoord, bool)>,
{
    let mut result: Vec<(GridCoord, usize)> = vec![];
    let mut current: Option<(GridCoord, usize)> = None;

    for (loc, open) in cells {
        current = match (open, current) {
            (true, Some((start, len))) => Some((start, len + 1)),
            (true, None) => Some((loc, 1)),
            (false, Some((start, len))) => {
                if len > 1 {
                    result.push((start, len));
                }
                None
            }
            (false, None) => None,
        };
    }

    if let Some((start, len)) = current {
        if len > 1 {
            result.push((start, len));
        }
    }

    result
}

impl GridConfig {
    /// Build a grid from an open/blocked matrix, indexed as `structure[y][x]`. Rows shorter than
    /// the longest one are treated as blocked past their end.
    pub fn from_structure(structure: Vec<Vec<bool>>) -> GridConfig {
        let height = structure.len();
        let width = structure.iter().map(|row| row.len()).max().unwrap_or(0);
        let structure: Vec<Vec<bool>> = structure
            .into_iter()
            .map(|mut row| {
                row.resize(width, false);
                row
            })
            .collect();

        let mut entries: Vec<(GridCoord, usize, Direction)> = vec![];
        for y in 0..height {
            for (loc, len) in find_runs((0..width).map(|x| ((x, y), structure[y][x]))) {
                entries.push((loc, len, Direction::Across));
            }
        }
        for x in 0..width {
            for (loc, len) in find_runs((0..height).map(|y| ((x, y), structure[y][x]))) {
                entries.push((loc, len, Direction::Down));
            }
        }

        // Build a map from cell location to entries involved, which we can then use to calculate
        // crossings.
        let mut entries_by_loc: HashMap<GridCoord, Vec<(SlotId, usize)>> = HashMap::new();
        for (entry_idx, &(loc, len, dir)) in entries.iter().enumerate() {
            for (cell_idx, cell_loc) in cell_coords(loc, dir, len).into_iter().enumerate() {
                entries_by_loc.entry(cell_loc).or_default().push((entry_idx, cell_idx));
            }
        }

        let slot_configs: Vec<SlotConfig> = entries
            .iter()
            .enumerate()
            .map(|(entry_idx, &(loc, len, dir))| {
                let crossings = cell_coords(loc, dir, len)
                    .iter()
                    .map(|cell_loc| {
                        let crossing_idxs: Vec<_> = entries_by_loc[cell_loc]
                            .iter()
                            .filter(|&&(e, _)| e != entry_idx)
                            .collect();

                        if crossing_idxs.is_empty() {
                            None
                        } else if crossing_idxs.len() > 1 {
                            panic!("More than two entries crossing in cell?");
                        } else {
                            let &(other_slot_id, other_slot_cell) = crossing_idxs[0];
                            Some(Crossing { other_slot_id, other_slot_cell })
                        }
                    })
                    .collect();

                SlotConfig {
                    id: entry_idx,
                    start_cell: loc,
                    direction: dir,
                    length: len,
                    crossings,
                }
            })
            .collect();

        debug!(
            "built {}x{} grid with {} slots",
            width,
            height,
            slot_configs.len()
        );

        GridConfig { width, height, structure, slot_configs }
    }

    /// Parse a structure where `_` or `.` is an open cell and `#` or a space is a block. Leading
    /// and trailing blank lines are skipped and the indentation shared by every row is removed, so
    /// templates can be indented. A blank line inside the grid is a fully blocked row.
    pub fn from_template_str(template: &str) -> Result<GridConfig> {
        let lines: Vec<&str> = template.lines().map(str::trim_end).collect();
        let first = lines.iter().position(|line| !line.is_empty());
        let last = lines.iter().rposition(|line| !line.is_empty());
        let lines = match (first, last) {
            (Some(first), Some(last)) => &lines[first..=last],
            _ => return Err(Error::EmptyStructure),
        };

        // Only spaces and tabs count as indentation, so slicing by byte offset is safe.
        let indent = lines
            .iter()
            .filter(|line| !line.is_empty())
            .map(|line| {
                line.len() - line.trim_start_matches(|c: char| c == ' ' || c == '\t').len()
            })
            .min()
            .unwrap_or(0);

        let structure: Vec<Vec<bool>> = lines
            .iter()
            .map(|line| line.get(indent..).unwrap_or(""))
            .enumerate()
            .map(|(row, line)| {
                line.chars()
                    .enumerate()
                    .map(|(column, cell)| match cell {
                        '_' | '.' => Ok(true),
                        '#' | ' ' => Ok(false),
                        _ => Err(Error::InvalidCell { row, column, cell }),
                    })
                    .collect::<Result<Vec<bool>>>()
            })
            .collect::<Result<_>>()?;

        Ok(GridConfig::from_structure(structure))
    }

    pub fn from_template_file<P: AsRef<Path>>(path: P) -> Result<GridConfig> {
        GridConfig::from_template_str(&fs::read_to_string(path)?)
    }

    pub fn is_open(&self, x: usize, y: usize) -> bool {
        self.structure
            .get(y)
            .and_then(|row| row.get(x))
            .cloned()
            .unwrap_or(false)
    }

    /// The pair of cell indexes `(in a, in b)` where slots `a` and `b` share a cell, if any.
    pub fn overlap(&self, a: SlotId, b: SlotId) -> Option<(usize, usize)> {
        if a == b {
            panic!("Requested overlap of slot {} with itself", a);
        }

        self.slot_configs[a]
            .crossings
            .iter()
            .enumerate()
            .find_map(|(cell_idx, crossing)| match crossing {
                Some(crossing) if crossing.other_slot_id == b => {
                    Some((cell_idx, crossing.other_slot_cell))
                }
                _ => None,
            })
    }

    /// Ids of every slot crossing the given one, in cell order.
    pub fn neighbors(&self, slot_id: SlotId) -> impl Iterator<Item = SlotId> + '_ {
        self.slot_configs[slot_id]
            .crossings
            .iter()
            .flatten()
            .map(|crossing| crossing.other_slot_id)
    }

    pub fn slot_count(&self) -> usize {
        self.slot_configs.len()
    }
}
