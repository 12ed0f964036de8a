use std::collections::{HashSet, VecDeque};

use bit_set::BitSet;
use log::{debug, trace};

use crate::domains::Domains;
use crate::grid_config::{GridConfig, SlotId};
use crate::word_list::WordList;

/// A directed arc `(x, y)`: revising it prunes `x` against `y`.
pub type SlotArc = (SlotId, SlotId);

/// Work queue of arcs to revise. An arc that's already waiting isn't queued a second time.
#[derive(Debug)]
struct ConsistencyQueue {
    queue: VecDeque<SlotArc>,
    pending: HashSet<SlotArc>,
}

impl ConsistencyQueue {
    fn new() -> ConsistencyQueue {
        ConsistencyQueue { queue: VecDeque::new(), pending: HashSet::new() }
    }

    fn with_initial_queue<Items>(items: Items) -> ConsistencyQueue
    where
        Items: IntoIterator<Item = SlotArc>,
    {
        let mut queue = ConsistencyQueue::new();
        for arc in items {
            queue.enqueue(arc);
        }
        queue
    }

    fn pop_front(&mut self) -> Option<SlotArc> {
        let arc = self.queue.pop_front()?;
        self.pending.remove(&arc);
        Some(arc)
    }

    fn enqueue(&mut self, arc: SlotArc) {
        if self.pending.insert(arc) {
            self.queue.push_back(arc);
        }
    }
}

/// Every ordered pair of distinct slots that actually cross. Pairs that don't cross would only
/// ever be no-op revisions.
pub fn all_arcs(config: &GridConfig) -> Vec<SlotArc> {
    config
        .slot_configs
        .iter()
        .flat_map(|slot_config| {
            config
                .neighbors(slot_config.id)
                .map(move |neighbor_id| (slot_config.id, neighbor_id))
        })
        .collect()
}

#[derive(Debug)]
pub struct ArcConsistencySuccess {
    /// How many arcs were revised before the queue ran dry.
    pub revisions: usize,
    /// How many candidates were removed across all slots.
    pub removed: usize,
}

#[derive(Debug)]
pub struct ArcConsistencyFailure {
    /// The slot whose domain ran out of candidates.
    pub slot_id: SlotId,
}

pub type ArcConsistencyResult = Result<ArcConsistencySuccess, ArcConsistencyFailure>;

/// Make `x` arc consistent with `y`: drop every word from `x`'s domain that doesn't agree with
/// any word in `y`'s domain at their shared cell. Returns whether anything was removed; slots
/// that don't cross are left alone.
pub fn revise(
    config: &GridConfig,
    word_list: &WordList,
    domains: &mut Domains,
    x: SlotId,
    y: SlotId,
) -> bool {
    let (x_cell, y_cell) = match config.overlap(x, y) {
        Some(overlap) => overlap,
        None => return false,
    };

    // Which glyphs can `y` still put in the shared cell?
    let supported_glyphs: BitSet = domains
        .words(y)
        .filter_map(|word_id| word_list.word(word_id).glyphs.get(y_cell).cloned())
        .collect();

    let removed = domains.retain(x, |word_id| {
        word_list
            .word(word_id)
            .glyphs
            .get(x_cell)
            .map_or(false, |&glyph| supported_glyphs.contains(glyph))
    });

    if removed > 0 {
        trace!("revise({}, {}) removed {} candidates", x, y, removed);
    }

    removed > 0
}

/// AC-3. Starts from `initial_arcs`, or from every crossing arc in the grid if none are given, and
/// re-queues the arcs pointing at any slot whose domain shrinks. Fails as soon as a domain is
/// empty; on success every remaining word has a partner in each crossing slot's domain.
pub fn ac3(
    config: &GridConfig,
    word_list: &WordList,
    domains: &mut Domains,
    initial_arcs: Option<&[SlotArc]>,
) -> ArcConsistencyResult {
    if let Some(slot_id) = (0..domains.slot_count()).find(|&slot_id| domains.is_empty(slot_id)) {
        debug!("slot {} has no candidates before arc consistency", slot_id);
        return Err(ArcConsistencyFailure { slot_id });
    }

    let mut queue = match initial_arcs {
        Some(arcs) => ConsistencyQueue::with_initial_queue(arcs.iter().cloned()),
        None => ConsistencyQueue::with_initial_queue(all_arcs(config)),
    };

    let size_before = domains.total_size();
    let mut revisions = 0;

    while let Some((x, y)) = queue.pop_front() {
        revisions += 1;

        if revise(config, word_list, domains, x, y) {
            if domains.is_empty(x) {
                debug!("arc consistency emptied slot {} after {} revisions", x, revisions);
                return Err(ArcConsistencyFailure { slot_id: x });
            }

            // `x` lost candidates, so everything crossing it needs another look.
            for z in config.neighbors(x) {
                if z != y {
                    queue.enqueue((z, x));
                }
            }
        }
    }

    let removed = size_before - domains.total_size();
    debug!(
        "arc consistency finished after {} revisions, removed {} candidates",
        revisions, removed
    );

    Ok(ArcConsistencySuccess { revisions, removed })
}
