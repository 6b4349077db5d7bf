//! Property-based tests for the status parser and the execution engine.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::engine::fan_out;
    use crate::status::StatusSummary;
    use proptest::prelude::*;

    // ============================================================================
    // StatusSummary::parse property tests
    // ============================================================================

    fn changed_entry(x: char, y: char, path: &str) -> String {
        format!(
            "1 {}{} N... 100644 100644 100644 0000000 1111111 {}",
            x, y, path
        )
    }

    proptest! {
        /// Property: parsing arbitrary text never panics
        #[test]
        fn parse_never_panics(input in ".*") {
            let _ = StatusSummary::parse(&input);
        }

        /// Property: parsing is deterministic (same input = same summary)
        #[test]
        fn parse_is_deterministic(input in "(# branch\\.(head|ab) [-+a-z0-9 ]{0,12}\n|[12u?] [.A-Z]{0,3} [a-z]{0,5}\n){0,10}") {
            prop_assert_eq!(StatusSummary::parse(&input), StatusSummary::parse(&input));
        }

        /// Property: ahead/behind header round-trips any counts
        #[test]
        fn parse_ahead_behind(ahead in any::<u32>(), behind in any::<u32>()) {
            let text = format!("# branch.head main\n# branch.ab +{} -{}\n", ahead, behind);
            let summary = StatusSummary::parse(&text);
            prop_assert_eq!(summary.ahead, ahead);
            prop_assert_eq!(summary.behind, behind);
        }

        /// Property: each changed entry counts once per category
        #[test]
        fn parse_counts_changed_entries(
            flags in prop::collection::vec(("[.MADRC]", "[.MAD]"), 0..20),
            untracked in 0usize..5,
            conflicts in 0usize..5,
        ) {
            let mut text = String::from("# branch.head main\n");
            for (i, (x, y)) in flags.iter().enumerate() {
                let x = x.chars().next().unwrap();
                let y = y.chars().next().unwrap();
                text.push_str(&changed_entry(x, y, &format!("file{}", i)));
                text.push('\n');
            }
            for i in 0..untracked {
                text.push_str(&format!("? new{}\n", i));
            }
            for i in 0..conflicts {
                text.push_str(&format!(
                    "u UU N... 100644 100644 100644 100644 a b c both{}\n",
                    i
                ));
            }

            let summary = StatusSummary::parse(&text);

            let staged = flags.iter().filter(|(x, _)| x != ".").count();
            let modified = flags.iter().filter(|(_, y)| y != ".").count();
            prop_assert_eq!(summary.staged as usize, staged);
            prop_assert_eq!(summary.modified as usize, modified);
            prop_assert_eq!(summary.untracked as usize, untracked);
            prop_assert_eq!(summary.conflicts as usize, conflicts);
            prop_assert_eq!(
                summary.is_clean(),
                staged + modified + untracked + conflicts == 0
            );
        }
    }

    // ============================================================================
    // fan_out property tests
    // ============================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Property: every index in [0, n) completes exactly once
        #[test]
        fn fan_out_yields_each_index_once(n in 0usize..24, concurrency in 1usize..8) {
            let tasks: Vec<_> = (0..n).map(|_| |index: usize| Ok(index)).collect();

            let mut seen: Vec<usize> = fan_out(tasks, concurrency)
                .unwrap()
                .map(|completion| {
                    assert_eq!(*completion.result.as_ref().unwrap(), completion.index);
                    completion.index
                })
                .collect();
            seen.sort_unstable();

            prop_assert_eq!(seen, (0..n).collect::<Vec<_>>());
        }
    }
}
