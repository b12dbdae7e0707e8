use super::*;

#[test]
fn larger_overlap_is_more_significant() {
    let strong = upper_tail(1000, 50, 20, 10).expect("p");
    let weak = upper_tail(1000, 50, 20, 2).expect("p");
    assert!(strong < weak);
    assert!(strong < 1e-6);
    assert!(weak > 0.1);
}

#[test]
fn zero_overlap_is_one() {
    assert_eq!(upper_tail(100, 10, 5, 0).expect("p"), 1.0);
}

#[test]
fn full_overlap_matches_closed_form() {
    // P(X >= 3) with N=10, K=3, n=3 is 1 / C(10, 3)
    let p = upper_tail(10, 3, 3, 3).expect("p");
    assert!((p - 1.0 / 120.0).abs() < 1e-10);
}

#[test]
fn forced_overlap_is_one() {
    // term + query exceed the population by 2, so X >= 2 always
    assert_eq!(upper_tail(10, 6, 6, 2).expect("p"), 1.0);
}

#[test]
fn tail_sums_with_point_mass() {
    let p2 = upper_tail(20, 5, 6, 2).expect("p");
    let p3 = upper_tail(20, 5, 6, 3).expect("p");
    let point = (ln_choose(5, 2) + ln_choose(15, 4) - ln_choose(20, 6)).exp();
    assert!((p2 - p3 - point).abs() < 1e-10);
}

#[test]
fn invalid_counts_are_rejected() {
    assert!(matches!(
        upper_tail(10, 11, 2, 1),
        Err(HypergeomError::TermTooLarge { .. })
    ));
    assert!(matches!(
        upper_tail(10, 2, 11, 1),
        Err(HypergeomError::QueryTooLarge { .. })
    ));
    assert_eq!(
        upper_tail(10, 2, 3, 3),
        Err(HypergeomError::OverlapTooLarge { overlap: 3, max: 2 })
    );
}

#[test]
fn fisher_matches_upper_tail() {
    let table = ContingencyTable::from_counts(1000, 50, 20, 10).expect("table");
    assert_eq!(table.population(), 1000);
    assert_eq!(table.not_term_not_query, 940);
    let a = fisher_greater(&table).expect("p");
    let b = upper_tail(1000, 50, 20, 10).expect("p");
    assert_eq!(a, b);
}

#[test]
fn inconsistent_tables_are_rejected() {
    assert_eq!(
        ContingencyTable::from_counts(10, 2, 3, 3),
        Err(HypergeomError::OverlapTooLarge { overlap: 3, max: 2 })
    );
    assert_eq!(
        ContingencyTable::from_counts(10, 6, 6, 1),
        Err(HypergeomError::OverlapTooSmall { overlap: 1, min: 2 })
    );
    assert!(matches!(
        ContingencyTable::from_counts(5, 6, 1, 0),
        Err(HypergeomError::TermTooLarge { .. })
    ));
    let table = ContingencyTable::from_counts(10, 6, 6, 2).expect("table");
    assert_eq!(table.not_term_not_query, 0);
}
