use super::*;

fn deg(gene: &str, log2fc: f64) -> DegRecord {
    DegRecord {
        gene: gene.to_string(),
        p_value: 0.001,
        adj_p_value: 0.01,
        log2fc,
        direction: Direction::from_log2fc(log2fc),
    }
}

#[test]
fn splits_by_direction_agreement() {
    let first = vec![deg("C", 1.0), deg("A", -2.0), deg("B", 1.5), deg("X", 3.0)];
    let second = vec![deg("A", -1.0), deg("B", -0.8), deg("C", 0.9), deg("Y", 2.0)];
    let co = intersect_degs(&first, &second);
    assert_eq!(co.concordant_genes(), vec!["A", "C"]);
    assert_eq!(co.discordant.len(), 1);
    assert_eq!(co.discordant[0].gene, "B");
    assert_eq!(co.n_up(), 1);
    assert_eq!(co.n_down(), 1);
    assert_eq!(co.concordant[0].second.log2fc, -1.0);
}

#[test]
fn intersection_is_commutative_on_genes() {
    let first = vec![deg("A", 1.0), deg("B", -1.0), deg("C", 1.0)];
    let second = vec![deg("C", 2.0), deg("A", 0.7), deg("D", 1.0)];
    let ab = intersect_degs(&first, &second);
    let ba = intersect_degs(&second, &first);
    assert_eq!(ab.concordant_genes(), ba.concordant_genes());
    assert_eq!(ab.discordant.len(), ba.discordant.len());
}

#[test]
fn disjoint_inputs_give_empty_set() {
    let co = intersect_degs(&[deg("A", 1.0)], &[deg("B", 1.0)]);
    assert!(co.concordant.is_empty());
    assert!(co.discordant.is_empty());
    let co = intersect_degs(&[], &[deg("B", 1.0)]);
    assert!(co.concordant.is_empty());
}
