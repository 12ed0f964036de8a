use std::collections::{BTreeMap, HashSet};

use crate::grid_config::{GridConfig, SlotId};
use crate::word_list::{WordId, WordList};

/// Whether the same word may be used in more than one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    Allow,
    #[default]
    Forbid,
}

/// A (possibly partial) mapping from slots to the words chosen for them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    choices: BTreeMap<SlotId, WordId>,
}

impl Assignment {
    pub fn new() -> Assignment {
        Assignment::default()
    }

    /// A copy of this assignment with one more choice. `self` is left untouched, so sibling
    /// branches of the search never see each other's choices.
    pub fn with(&self, slot_id: SlotId, word_id: WordId) -> Assignment {
        let mut choices = self.choices.clone();
        choices.insert(slot_id, word_id);
        Assignment { choices }
    }

    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        self.choices.get(&slot_id).cloned()
    }

    pub fn contains(&self, slot_id: SlotId) -> bool {
        self.choices.contains_key(&slot_id)
    }

    /// `(slot, word)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, WordId)> + '_ {
        self.choices.iter().map(|(&slot_id, &word_id)| (slot_id, word_id))
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// Does this assign a word to every slot in the grid?
    pub fn is_complete(&self, config: &GridConfig) -> bool {
        config.slot_configs.iter().all(|slot_config| self.contains(slot_config.id))
    }
}

impl FromIterator<(SlotId, WordId)> for Assignment {
    fn from_iter<T: IntoIterator<Item = (SlotId, WordId)>>(iter: T) -> Self {
        Assignment { choices: iter.into_iter().collect() }
    }
}

/// Check that every assigned word fits its slot, that crossing slots agree on their shared
/// letter, and (unless duplicates are allowed) that no word is used twice.
pub fn is_consistent(
    config: &GridConfig,
    word_list: &WordList,
    assignment: &Assignment,
    duplicates: DuplicatePolicy,
) -> bool {
    for (slot_id, word_id) in assignment.iter() {
        if word_list.word(word_id).len() != config.slot_configs[slot_id].length {
            return false;
        }
    }

    for (slot_id, word_id) in assignment.iter() {
        let word = word_list.word(word_id);

        for (cell_idx, crossing) in config.slot_configs[slot_id].crossings.iter().enumerate() {
            let crossing = match crossing {
                // Each pair only needs checking from one side.
                Some(crossing) if crossing.other_slot_id > slot_id => crossing,
                _ => continue,
            };

            if let Some(other_word_id) = assignment.get(crossing.other_slot_id) {
                let other_word = word_list.word(other_word_id);
                if word.glyphs[cell_idx] != other_word.glyphs[crossing.other_slot_cell] {
                    return false;
                }
            }
        }
    }

    if duplicates == DuplicatePolicy::Forbid {
        let mut seen: HashSet<WordId> = HashSet::with_capacity(assignment.len());
        if !assignment.iter().all(|(_, word_id)| seen.insert(word_id)) {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use crate::arc_consistency::tests::{crossing_grid, small_grid, small_grid_word_list};
    use crate::consistency::{is_consistent, Assignment, DuplicatePolicy};
    use crate::grid_config::GridConfig;
    use crate::word_list::WordList;

    fn small_grid_fill(word_list: &WordList) -> Assignment {
        ["toe", "solar", "so", "to", "old", "ea", "re"]
            .iter()
            .enumerate()
            .map(|(slot_id, word)| (slot_id, word_list.find(word).unwrap()))
            .collect()
    }

    #[test]
    fn test_empty_assignment_is_consistent() {
        let grid_config = small_grid();
        let word_list = small_grid_word_list();

        assert!(is_consistent(
            &grid_config,
            &word_list,
            &Assignment::new(),
            DuplicatePolicy::Forbid
        ));
    }

    #[test]
    fn test_complete_fill_is_consistent() {
        let grid_config = small_grid();
        let word_list = small_grid_word_list();
        let assignment = small_grid_fill(&word_list);

        assert!(assignment.is_complete(&grid_config));
        assert!(is_consistent(&grid_config, &word_list, &assignment, DuplicatePolicy::Forbid));
    }

    #[test]
    fn test_consistency_is_monotonic_under_restriction() {
        let grid_config = small_grid();
        let word_list = small_grid_word_list();
        let full: Vec<_> = small_grid_fill(&word_list).iter().collect();

        for mask in 0u32..(1 << full.len()) {
            let subset: Assignment = full
                .iter()
                .enumerate()
                .filter(|(idx, _)| mask & (1 << idx) != 0)
                .map(|(_, &choice)| choice)
                .collect();

            assert!(is_consistent(&grid_config, &word_list, &subset, DuplicatePolicy::Forbid));
        }
    }

    #[test]
    fn test_wrong_length_is_inconsistent() {
        let grid_config = small_grid();
        let word_list = small_grid_word_list();
        let assignment = Assignment::new().with(1, word_list.find("toe").unwrap());

        assert!(!is_consistent(&grid_config, &word_list, &assignment, DuplicatePolicy::Allow));
    }

    #[test]
    fn test_crossing_mismatch_is_inconsistent() {
        let grid_config = crossing_grid();
        let word_list = WordList::new(["cat", "car", "art"]);

        let good = Assignment::new()
            .with(0, word_list.find("car").unwrap())
            .with(1, word_list.find("art").unwrap());
        let bad = Assignment::new()
            .with(0, word_list.find("cat").unwrap())
            .with(1, word_list.find("art").unwrap());

        assert!(is_consistent(&grid_config, &word_list, &good, DuplicatePolicy::Forbid));
        assert!(!is_consistent(&grid_config, &word_list, &bad, DuplicatePolicy::Forbid));
        assert!(!is_consistent(&grid_config, &word_list, &bad, DuplicatePolicy::Allow));
    }

    #[test]
    fn test_duplicate_policy() {
        let grid_config = GridConfig::from_template_str(
            "
            ___
            ###
            ___
            ",
        )
        .unwrap();
        let word_list = WordList::new(["cat", "dog"]);
        let cat = word_list.find("cat").unwrap();
        let assignment = Assignment::new().with(0, cat).with(1, cat);

        assert!(is_consistent(&grid_config, &word_list, &assignment, DuplicatePolicy::Allow));
        assert!(!is_consistent(&grid_config, &word_list, &assignment, DuplicatePolicy::Forbid));
    }

    #[test]
    fn test_with_leaves_original_untouched() {
        let base = Assignment::new().with(0, 3);
        let branch = base.with(1, 4);

        assert_eq!(base.len(), 1);
        assert!(!base.contains(1));
        assert_eq!(branch.get(1), Some(4));
        assert_eq!(branch.get(0), Some(3));
    }
}
