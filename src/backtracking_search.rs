//! Grid filling by depth-first backtracking search. Domains are first pruned by node consistency
//! and AC-3; after that the search only reads them, choosing slots by minimum remaining values
//! (tie-broken by degree) and trying words in least-constraining-value order.

use instant::{Duration, Instant};
use log::{debug, info, trace};
use thiserror::Error;

use crate::arc_consistency::{ac3, ArcConsistencyFailure};
use crate::consistency::{is_consistent, Assignment, DuplicatePolicy};
use crate::domains::Domains;
use crate::grid_config::GridConfig;
use crate::order::{order_domain_values, select_unassigned_slot, SlotSelection};
use crate::word_list::WordList;

/// Knobs for a fill attempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct FillOptions {
    pub duplicates: DuplicatePolicy,

    /// Give up once this much time has passed. Checked each time the search goes one level deeper.
    pub timeout: Option<Duration>,
}

/// A struct tracking stats about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub states: u64,
    pub backtracks: u64,
    pub initial_eliminations: usize,
    pub duration: Duration,
}

/// A struct representing the results of a fill operation.
#[derive(Debug)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub assignment: Assignment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FillFailure {
    /// No assignment satisfies the grid.
    #[error("no solution")]
    Unsatisfiable,

    /// The configured timeout passed before the search finished.
    #[error("gave up after reaching the time limit")]
    Timeout,
}

struct Search<'a> {
    config: &'a GridConfig,
    word_list: &'a WordList,
    domains: &'a Domains,
    options: FillOptions,
    deadline: Option<Instant>,
    statistics: Statistics,
}

impl<'a> Search<'a> {
    /// Extend `assignment` into a complete one. `Ok(None)` means this branch is a dead end and the
    /// caller should try its next word.
    fn backtrack(&mut self, assignment: &Assignment) -> Result<Option<Assignment>, FillFailure> {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(FillFailure::Timeout);
            }
        }

        self.statistics.states += 1;

        let selection =
            select_unassigned_slot(self.config, self.word_list, self.domains, assignment);

        let slot_id = match selection {
            SlotSelection::Complete => return Ok(Some(assignment.clone())),
            SlotSelection::Exhausted => return Ok(None),
            SlotSelection::Slot(slot_id) => slot_id,
        };

        let word_ids = order_domain_values(
            self.config,
            self.word_list,
            self.domains,
            assignment,
            slot_id,
            self.options.duplicates,
        );

        for word_id in word_ids {
            let extended = assignment.with(slot_id, word_id);

            trace!(
                "depth {}: trying {} in slot {}",
                assignment.len(),
                self.word_list.word(word_id).string,
                slot_id
            );

            if !is_consistent(self.config, self.word_list, &extended, self.options.duplicates) {
                continue;
            }

            if extended.is_complete(self.config) {
                return Ok(Some(extended));
            }

            if let Some(solution) = self.backtrack(&extended)? {
                return Ok(Some(solution));
            }

            self.statistics.backtracks += 1;
        }

        Ok(None)
    }
}

/// Fill the grid: enforce node consistency, then arc consistency, then search.
pub fn solve(
    config: &GridConfig,
    word_list: &WordList,
    options: &FillOptions,
) -> Result<FillSuccess, FillFailure> {
    let start = Instant::now();

    let mut domains = Domains::new(config, word_list);
    domains.enforce_unary_consistency(config, word_list);

    let initial_eliminations = match ac3(config, word_list, &mut domains, None) {
        Ok(success) => success.removed,
        Err(ArcConsistencyFailure { slot_id }) => {
            debug!("slot {} has no viable words, giving up before searching", slot_id);
            return Err(FillFailure::Unsatisfiable);
        }
    };

    let mut search = Search {
        config,
        word_list,
        domains: &domains,
        options: *options,
        deadline: options.timeout.map(|timeout| start + timeout),
        statistics: Statistics { initial_eliminations, ..Statistics::default() },
    };

    let result = search.backtrack(&Assignment::new());
    let mut statistics = search.statistics;
    statistics.duration = start.elapsed();

    match result {
        Ok(Some(assignment)) => {
            info!("found a fill: {:?}", statistics);
            Ok(FillSuccess { statistics, assignment })
        }
        Ok(None) => {
            info!("search exhausted: {:?}", statistics);
            Err(FillFailure::Unsatisfiable)
        }
        Err(failure) => {
            info!("search stopped ({}): {:?}", failure, statistics);
            Err(failure)
        }
    }
}

#[cfg(test)]
mod tests {
    use instant::Duration;

    use crate::arc_consistency::tests::{crossing_grid, small_grid, small_grid_word_list};
    use crate::backtracking_search::{solve, FillFailure, FillOptions};
    use crate::consistency::{is_consistent, DuplicatePolicy};
    use crate::grid_config::GridConfig;
    use crate::render::render_grid;
    use crate::word_list::WordList;

    fn fill_strings(
        grid_config: &GridConfig,
        word_list: &WordList,
        options: &FillOptions,
    ) -> Vec<String> {
        let result = solve(grid_config, word_list, options).expect("Failed to find a fill");
        assert!(result.assignment.is_complete(grid_config));

        result
            .assignment
            .iter()
            .map(|(_, word_id)| word_list.word(word_id).string.clone())
            .collect()
    }

    #[test]
    fn test_find_fill_for_single_slot() {
        let grid_config = GridConfig::from_template_str("___").unwrap();
        let word_list = WordList::new(["cat", "dog"]);

        // Both words are equally good, so word order decides.
        assert_eq!(fill_strings(&grid_config, &word_list, &FillOptions::default()), vec!["CAT"]);
    }

    #[test]
    fn test_find_fill_for_unique_crossing() {
        let grid_config = crossing_grid();
        let word_list = WordList::new(["cat", "car", "art"]);

        assert_eq!(
            fill_strings(&grid_config, &word_list, &FillOptions::default()),
            vec!["CAR", "ART"]
        );
    }

    #[test]
    fn test_statistics_count_arc_consistency_eliminations() {
        let grid_config = crossing_grid();
        let word_list = WordList::new(["cat", "car", "art"]);

        let result = solve(&grid_config, &word_list, &FillOptions::default())
            .expect("Failed to find a fill");

        // AC-3 leaves one word per slot, so the search goes straight down without backtracking.
        assert_eq!(result.statistics.initial_eliminations, 4);
        assert_eq!(result.statistics.backtracks, 0);
        assert_eq!(result.statistics.states, 2);
    }

    #[test]
    fn test_find_fill_for_crossing_in_the_middle() {
        let grid_config = GridConfig::from_template_str(
            "
            #_#
            ___
            #_#
            ",
        )
        .unwrap();
        let word_list = WordList::new(["cat", "car", "art"]);

        let forbid = fill_strings(&grid_config, &word_list, &FillOptions::default());
        assert!(forbid == vec!["CAR", "CAT"] || forbid == vec!["CAT", "CAR"], "{:?}", forbid);

        let allow = fill_strings(
            &grid_config,
            &word_list,
            &FillOptions { duplicates: DuplicatePolicy::Allow, ..FillOptions::default() },
        );
        assert_eq!(allow, vec!["CAR", "CAR"]);
    }

    #[test]
    fn test_find_fill_for_small_grid() {
        let grid_config = small_grid();
        let word_list = small_grid_word_list();

        let result = solve(&grid_config, &word_list, &FillOptions::default())
            .expect("Failed to find a fill");

        assert!(result.assignment.is_complete(&grid_config));
        assert!(is_consistent(
            &grid_config,
            &word_list,
            &result.assignment,
            DuplicatePolicy::Forbid
        ));
        for (slot_id, word_id) in result.assignment.iter() {
            assert_eq!(word_list.word(word_id).len(), grid_config.slot_configs[slot_id].length);
        }

        println!("{:?}", result.statistics);
        println!("{}", render_grid(&grid_config, &word_list, &result.assignment));
    }

    #[test]
    fn test_find_fill_for_2x2_square() {
        let grid_config = GridConfig::from_template_str(
            "
            __
            __
            ",
        )
        .unwrap();
        let word_list = WordList::new(["ab", "ac", "ad", "bd", "cd", "ca", "ba", "da"]);

        let result = solve(&grid_config, &word_list, &FillOptions::default())
            .expect("Failed to find a fill");

        assert!(is_consistent(
            &grid_config,
            &word_list,
            &result.assignment,
            DuplicatePolicy::Forbid
        ));
        assert!(result.assignment.is_complete(&grid_config));
    }

    #[test]
    fn test_fill_fails_gracefully_without_matching_lengths() {
        let grid_config = GridConfig::from_template_str("____").unwrap();
        let word_list = WordList::new(["cat", "dog"]);

        assert_eq!(
            solve(&grid_config, &word_list, &FillOptions::default()).unwrap_err(),
            FillFailure::Unsatisfiable
        );
    }

    #[test]
    fn test_fill_fails_gracefully_when_crossings_disagree() {
        let grid_config = crossing_grid();
        let word_list = WordList::new(["cat", "dog"]);

        assert_eq!(
            solve(&grid_config, &word_list, &FillOptions::default()).unwrap_err(),
            FillFailure::Unsatisfiable
        );
    }

    #[test]
    fn test_fill_fails_gracefully_when_search_is_exhausted() {
        // Arc consistency can't see that two separate slots need two different words.
        let grid_config = GridConfig::from_template_str("___\n###\n___\n").unwrap();
        let word_list = WordList::new(["cat"]);

        assert_eq!(
            solve(&grid_config, &word_list, &FillOptions::default()).unwrap_err(),
            FillFailure::Unsatisfiable
        );

        let allow = fill_strings(
            &grid_config,
            &word_list,
            &FillOptions { duplicates: DuplicatePolicy::Allow, ..FillOptions::default() },
        );
        assert_eq!(allow, vec!["CAT", "CAT"]);
    }

    #[test]
    fn test_fill_respects_timeout() {
        let grid_config = small_grid();
        let word_list = small_grid_word_list();

        let options = FillOptions {
            timeout: Some(Duration::from_secs(0)),
            ..FillOptions::default()
        };
        assert_eq!(
            solve(&grid_config, &word_list, &options).unwrap_err(),
            FillFailure::Timeout
        );
    }
}
