//! Property tests for the core data model.

use lambek_core::{enumerate_paths, path_count, Atom, Marker, PregroupType, ReductionTable};
use proptest::prelude::*;

const NAMES: [&str; 4] = ["n", "s", "o", "pn"];

fn arb_atom() -> impl Strategy<Value = Atom> {
    (
        0..NAMES.len(),
        -2i32..=2,
        prop::collection::vec(0u32..3, 0..3),
    )
        .prop_map(|(name, adjoint, values)| {
            let markers = values
                .into_iter()
                .enumerate()
                .map(|(category, value)| Marker::new(category as u16, value))
                .collect();
            Atom::with_markers(NAMES[name], adjoint, markers)
        })
}

fn arb_type() -> impl Strategy<Value = PregroupType> {
    prop::collection::vec(arb_atom(), 1..5).prop_map(PregroupType::new)
}

proptest! {
    #[test]
    fn prop_reduction_table_is_reflexive(rules in prop::collection::vec((0..NAMES.len(), 0..NAMES.len()), 0..6)) {
        let rules: Vec<(String, String)> = rules
            .into_iter()
            .map(|(a, b)| (NAMES[a].to_string(), NAMES[b].to_string()))
            .collect();
        let table = ReductionTable::new(NAMES, "x", &rules).unwrap();
        for name in NAMES {
            prop_assert!(table.names_reduce(name, name).unwrap());
        }
    }

    #[test]
    fn prop_copy_matches_and_is_independent(t in arb_type()) {
        let mut copy = t.clone();
        prop_assert!(copy.matches(&t));

        let snapshot = t.to_string();
        let mut atoms = copy.clone().into_atoms();
        atoms[0] = atoms[0].right_adjoint();
        copy = PregroupType::new(atoms);

        prop_assert_eq!(t.to_string(), snapshot);
        prop_assert!(!copy.matches(&t));
    }

    #[test]
    fn prop_display_parse_round_trip(t in arb_type()) {
        let back: PregroupType = t.to_string().parse().unwrap();
        prop_assert_eq!(back, t);
    }

    #[test]
    fn prop_enumeration_cardinality(counts in prop::collection::vec(1usize..4, 1..6)) {
        let words: Vec<Vec<(usize, usize)>> = counts
            .iter()
            .enumerate()
            .map(|(w, &c)| (0..c).map(|k| (w, k)).collect())
            .collect();
        let slices: Vec<&[(usize, usize)]> = words.iter().map(Vec::as_slice).collect();

        let paths = enumerate_paths(&slices);

        let expected: usize = counts.iter().product();
        prop_assert_eq!(paths.len(), expected);
        prop_assert_eq!(path_count(&slices), Some(expected));
        for path in &paths {
            prop_assert_eq!(path.len(), counts.len());
            for (w, choice) in path.iter().enumerate() {
                prop_assert_eq!(choice.0, w);
            }
        }
        // Lexicographic order of candidate indices.
        for pair in paths.windows(2) {
            let a: Vec<usize> = pair[0].iter().map(|c| c.1).collect();
            let b: Vec<usize> = pair[1].iter().map(|c| c.1).collect();
            prop_assert!(a < b);
        }
    }
}
