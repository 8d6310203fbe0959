//! Smoke tests for the core crate.
//!
//! These tests exercise the public surface end to end:
//! - Atoms and types parse, print and compare
//! - Reduction tables compile from an inventory and rules
//! - Metarules derive new candidate types
//! - Paths enumerate in candidate order

use lambek_core::{
    enumerate_paths, expand_types, Atom, CoreError, MetaRule, MetaruleIteration, PregroupType,
    ReductionTable,
};

fn ty(s: &str) -> PregroupType {
    s.parse().unwrap()
}

// ============================================================================
// Model
// ============================================================================

#[test]
fn smoke_type_round_trip() {
    let t = ty("n_1^1 s^0 n_2^-1");
    assert_eq!(t.len(), 3);
    assert_eq!(t.to_string().parse::<PregroupType>().unwrap(), t);
}

#[test]
fn smoke_serde_round_trip() {
    let t = ty("n_1^1 *X^0");
    let json = serde_json::to_string(&t).unwrap();
    let back: PregroupType = serde_json::from_str(&json).unwrap();
    assert_eq!(back, t);
}

// ============================================================================
// Reduction table
// ============================================================================

#[test]
fn smoke_reduction_table() {
    let rules = vec![("pn".to_string(), "n".to_string())];
    let table = ReductionTable::new(["n", "pn", "s"], "x", &rules).unwrap();

    assert_eq!(table.len(), 3);
    assert!(table
        .reduction_exists(&Atom::new("pn", 0), &Atom::new("n", 1))
        .unwrap());
    assert!(matches!(
        table.index_of("adv"),
        Err(CoreError::UnknownAtomType { .. })
    ));
}

// ============================================================================
// Metarules
// ============================================================================

#[test]
fn smoke_metarule_derives_adjective_reading() {
    let rule = MetaRule::new(7, ty("*X^0 v^1"), ty("*X^2")).unwrap();
    let mut types = vec![ty("adj^0 v^1")];

    let report = expand_types(&mut types, &[rule], MetaruleIteration::default());

    assert_eq!(types, vec![ty("adj^0 v^1"), ty("adj^2")]);
    assert_eq!(report.added, 1);
}

// ============================================================================
// Paths
// ============================================================================

#[test]
fn smoke_paths_follow_candidate_order() {
    let first = vec![ty("n^0"), ty("n^0 n^-1")];
    let second = vec![ty("n^1 s^0")];
    let paths = enumerate_paths(&[first.as_slice(), second.as_slice()]);

    assert_eq!(paths.len(), 2);
    assert_eq!(paths[0], vec![&first[0], &second[0]]);
    assert_eq!(paths[1], vec![&first[1], &second[0]]);
}
