use proptest::prelude::*;
use wordstat_core::{aggregate_add, aggregate_remove, compute_document_stats, CollectionState, DocumentStats};

fn assert_invariants(state: &CollectionState) {
    for stat in state.stats.values() {
        assert!(stat.count > 0, "{} has count {}", stat.word, stat.count);
        assert!(stat.word_doc_occurrences > 0);
        assert!(stat.word_doc_occurrences as usize <= state.doc_count());
    }
}

fn docs_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-f]{1,2}( [a-f]{1,2}){0,8}", 1..8)
}

proptest! {
    #[test]
    fn counts_sum_to_length(text in "\\PC{0,120}") {
        let stats = compute_document_stats(&text);
        let total: u32 = stats.words.iter().map(|s| s.count).sum();
        prop_assert_eq!(total as usize, stats.length);
    }

    #[test]
    fn invariants_hold_over_any_sequence(
        texts in docs_strategy(),
        ops in prop::collection::vec((any::<bool>(), 0usize..8), 0..40),
    ) {
        let docs: Vec<DocumentStats> = texts.iter().map(|t| compute_document_stats(t)).collect();
        let mut state = CollectionState::new();
        for (add, idx) in ops {
            let idx = idx % docs.len();
            let id = idx as u32;
            state = if add {
                aggregate_add(&state, id, &docs[idx])
            } else if state.contains(id) {
                aggregate_remove(&state, id, &docs[idx]).unwrap()
            } else {
                prop_assert!(aggregate_remove(&state, id, &docs[idx]).is_err());
                state
            };
            assert_invariants(&state);

            let expected_total: usize = state.members.iter().map(|&m| docs[m as usize].length).sum();
            prop_assert_eq!(state.total_words, expected_total as u64);
        }
    }

    #[test]
    fn remove_undoes_add(texts in docs_strategy(), extra in "[a-h]{1,3}( [a-h]{1,3}){0,10}") {
        let mut before = CollectionState::new();
        for (i, t) in texts.iter().enumerate() {
            before = aggregate_add(&before, i as u32, &compute_document_stats(t));
        }
        let d = compute_document_stats(&extra);
        let id = texts.len() as u32;
        let after = aggregate_remove(&aggregate_add(&before, id, &d), id, &d).unwrap();

        prop_assert_eq!(after.total_words, before.total_words);
        prop_assert_eq!(after.stats.len(), before.stats.len());
        for (word, stat) in &before.stats {
            let restored = after.stat(word).unwrap();
            prop_assert_eq!(restored.count, stat.count);
            prop_assert_eq!(restored.word_doc_occurrences, stat.word_doc_occurrences);
            prop_assert!((restored.tf - stat.tf).abs() < 1e-12);
            prop_assert!((restored.idf - stat.idf).abs() < 1e-12);
        }
    }
}
