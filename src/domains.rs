use bit_set::BitSet;
use log::debug;

use crate::grid_config::{GridConfig, SlotId};
use crate::word_list::{WordId, WordList};

/// The candidate words still possible for each slot, stored as a set of `WordId`s per slot.
/// Pruning only ever removes words; an empty set means the current problem can't be filled.
#[derive(Debug, Clone, PartialEq)]
pub struct Domains {
    domains: Vec<BitSet>,
}

impl Domains {
    /// Start every slot off with the entire word list.
    pub fn new(config: &GridConfig, word_list: &WordList) -> Domains {
        let all_words: BitSet = (0..word_list.len()).collect();

        Domains {
            domains: config.slot_configs.iter().map(|_| all_words.clone()).collect(),
        }
    }

    /// Remove every word whose length doesn't match its slot. Returns the number of words removed
    /// across all slots.
    pub fn enforce_unary_consistency(
        &mut self,
        config: &GridConfig,
        word_list: &WordList,
    ) -> usize {
        let removed: usize = config
            .slot_configs
            .iter()
            .map(|slot_config| {
                self.retain(slot_config.id, |word_id| {
                    word_list.word(word_id).len() == slot_config.length
                })
            })
            .sum();

        debug!(
            "node consistency removed {} candidates, {} remain",
            removed,
            self.total_size()
        );

        removed
    }

    pub fn get(&self, slot_id: SlotId) -> &BitSet {
        &self.domains[slot_id]
    }

    pub fn words(&self, slot_id: SlotId) -> impl Iterator<Item = WordId> + '_ {
        self.domains[slot_id].iter()
    }

    pub fn len(&self, slot_id: SlotId) -> usize {
        self.domains[slot_id].len()
    }

    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.domains[slot_id].is_empty()
    }

    pub fn contains(&self, slot_id: SlotId, word_id: WordId) -> bool {
        self.domains[slot_id].contains(word_id)
    }

    pub fn remove(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        self.domains[slot_id].remove(word_id)
    }

    /// Keep only the words for which `keep` returns true, returning how many were removed.
    pub fn retain<F>(&mut self, slot_id: SlotId, mut keep: F) -> usize
    where
        F: FnMut(WordId) -> bool,
    {
        let to_remove: Vec<WordId> =
            self.domains[slot_id].iter().filter(|&word_id| !keep(word_id)).collect();

        for &word_id in &to_remove {
            self.domains[slot_id].remove(word_id);
        }

        to_remove.len()
    }

    /// Total number of candidates across all slots.
    pub fn total_size(&self) -> usize {
        self.domains.iter().map(|domain| domain.len()).sum()
    }

    pub fn slot_count(&self) -> usize {
        self.domains.len()
    }
}
