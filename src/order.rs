//! Variable and value ordering for the backtracking search: minimum remaining values with a
//! degree tie-break to pick the next slot, and least constraining value to order its words.

use bit_set::BitSet;
use smallvec::SmallVec;

use crate::consistency::{is_consistent, Assignment, DuplicatePolicy};
use crate::domains::Domains;
use crate::grid_config::{GridConfig, SlotId};
use crate::word_list::{GlyphId, WordId, WordList};
use crate::MAX_SLOT_LENGTH;

/// The outcome of picking the next slot to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotSelection {
    /// Every slot already has a word.
    Complete,
    /// Every unassigned slot has run out of compatible words.
    Exhausted,
    Slot(SlotId),
}

/// The words in a slot's domain that agree with every assigned crossing slot. This is computed
/// fresh each time and never written back to the domain.
pub fn remaining_candidates(
    config: &GridConfig,
    word_list: &WordList,
    domains: &Domains,
    assignment: &Assignment,
    slot_id: SlotId,
) -> BitSet {
    let slot_config = &config.slot_configs[slot_id];

    // The glyph each assigned crossing slot forces into our cells.
    let fixed_glyphs: SmallVec<[(usize, Option<GlyphId>); MAX_SLOT_LENGTH]> = slot_config
        .crossings
        .iter()
        .enumerate()
        .filter_map(|(cell_idx, crossing)| {
            let crossing = crossing.as_ref()?;
            let other_word_id = assignment.get(crossing.other_slot_id)?;
            let glyph = word_list
                .word(other_word_id)
                .glyphs
                .get(crossing.other_slot_cell)
                .cloned();
            Some((cell_idx, glyph))
        })
        .collect();

    domains
        .words(slot_id)
        .filter(|&word_id| {
            let glyphs = &word_list.word(word_id).glyphs;
            fixed_glyphs
                .iter()
                .all(|&(cell_idx, glyph)| glyph.is_some() && glyphs.get(cell_idx).cloned() == glyph)
        })
        .collect()
}

/// The set of glyphs a group of words places in a given cell.
fn glyphs_at(word_list: &WordList, words: &BitSet, cell_idx: usize) -> BitSet {
    words
        .iter()
        .filter_map(|word_id| word_list.word(word_id).glyphs.get(cell_idx).cloned())
        .collect()
}

/// How many unassigned crossing slots would still be constrained by a choice here, meaning that
/// at least one pairing of our remaining words with theirs disagrees at the shared cell.
///
/// Counting the neighbors whose pairings all agree instead, as some CSP fillers do, ranks ties
/// the opposite way and picks different slots.
fn degree(
    config: &GridConfig,
    word_list: &WordList,
    remaining_by_slot: &[Option<BitSet>],
    slot_id: SlotId,
) -> usize {
    let remaining = match &remaining_by_slot[slot_id] {
        Some(remaining) => remaining,
        None => return 0,
    };

    config.slot_configs[slot_id]
        .crossings
        .iter()
        .enumerate()
        .filter(|(cell_idx, crossing)| {
            let crossing = match crossing {
                Some(crossing) => crossing,
                None => return false,
            };
            let other_remaining = match &remaining_by_slot[crossing.other_slot_id] {
                Some(other_remaining) => other_remaining,
                None => return false,
            };

            let ours = glyphs_at(word_list, remaining, *cell_idx);
            let theirs = glyphs_at(word_list, other_remaining, crossing.other_slot_cell);

            // Every joint pairing agrees only when both sides are stuck on the same single glyph;
            // with no words on either side there are no pairings at all.
            !ours.is_empty() && !theirs.is_empty() && !(ours.len() == 1 && ours == theirs)
        })
        .count()
}

/// Pick the unassigned slot with the fewest remaining candidates, ignoring slots that have none
/// left. Ties go to the slot with the higher degree, then to the lower slot id.
pub fn select_unassigned_slot(
    config: &GridConfig,
    word_list: &WordList,
    domains: &Domains,
    assignment: &Assignment,
) -> SlotSelection {
    let remaining_by_slot: Vec<Option<BitSet>> = config
        .slot_configs
        .iter()
        .map(|slot_config| {
            if assignment.contains(slot_config.id) {
                None
            } else {
                Some(remaining_candidates(config, word_list, domains, assignment, slot_config.id))
            }
        })
        .collect();

    if remaining_by_slot.iter().all(Option::is_none) {
        return SlotSelection::Complete;
    }

    let min_count = match remaining_by_slot
        .iter()
        .flatten()
        .map(|remaining| remaining.len())
        .filter(|&count| count > 0)
        .min()
    {
        Some(min_count) => min_count,
        None => return SlotSelection::Exhausted,
    };

    let candidates: Vec<SlotId> = remaining_by_slot
        .iter()
        .enumerate()
        .filter(|(_, remaining)| remaining.as_ref().map(|r| r.len()) == Some(min_count))
        .map(|(slot_id, _)| slot_id)
        .collect();

    if candidates.len() == 1 {
        return SlotSelection::Slot(candidates[0]);
    }

    let mut best_slot_id = candidates[0];
    let mut best_degree = degree(config, word_list, &remaining_by_slot, best_slot_id);
    for &slot_id in &candidates[1..] {
        let slot_degree = degree(config, word_list, &remaining_by_slot, slot_id);
        if slot_degree > best_degree {
            best_slot_id = slot_id;
            best_degree = slot_degree;
        }
    }

    SlotSelection::Slot(best_slot_id)
}

/// Order the words for a slot so the ones that eliminate the fewest candidates from unassigned
/// crossing slots come first. Words that would make the assignment inconsistent are left out.
pub fn order_domain_values(
    config: &GridConfig,
    word_list: &WordList,
    domains: &Domains,
    assignment: &Assignment,
    slot_id: SlotId,
    duplicates: DuplicatePolicy,
) -> Vec<WordId> {
    // For each unassigned crossing: our cell, how many of their words there are, and how many of
    // their words place each glyph in the shared cell.
    let crossing_counts: SmallVec<[(usize, usize, Vec<usize>); MAX_SLOT_LENGTH]> = config
        .slot_configs[slot_id]
        .crossings
        .iter()
        .enumerate()
        .filter_map(|(cell_idx, crossing)| {
            let crossing = crossing.as_ref()?;
            if assignment.contains(crossing.other_slot_id) {
                return None;
            }

            let mut glyph_counts = vec![0; word_list.glyphs.len()];
            let mut total = 0;
            for word_id in domains.words(crossing.other_slot_id) {
                total += 1;
                if let Some(&glyph) = word_list.word(word_id).glyphs.get(crossing.other_slot_cell) {
                    glyph_counts[glyph] += 1;
                }
            }

            Some((cell_idx, total, glyph_counts))
        })
        .collect();

    let mut scored: Vec<(usize, WordId)> = domains
        .words(slot_id)
        .filter(|&word_id| {
            is_consistent(config, word_list, &assignment.with(slot_id, word_id), duplicates)
        })
        .map(|word_id| {
            let glyphs = &word_list.word(word_id).glyphs;
            let eliminated: usize = crossing_counts
                .iter()
                .map(|(cell_idx, total, glyph_counts)| {
                    total - glyphs.get(*cell_idx).map_or(0, |&glyph| glyph_counts[glyph])
                })
                .sum();
            (eliminated, word_id)
        })
        .collect();

    // Stable, so equally constraining words stay in word-id order.
    scored.sort_by_key(|&(eliminated, _)| eliminated);

    scored.into_iter().map(|(_, word_id)| word_id).collect()
}
