use std::collections::HashSet;
use std::sync::Arc;

use quadstore::consts::XSD_INTEGER;
use quadstore::{
    GetOptions, MemoryBackend, Pattern, Quad, QuadStore, Slot, StoreOptions, Term, WriteOptions,
};

fn terms(slot: Slot) -> Vec<Term> {
    match slot {
        Slot::Subject => vec![
            Term::named_node("http://ex.org/s0"),
            Term::named_node("http://ex.org/s1"),
            Term::blank_node("b0"),
        ],
        Slot::Predicate => vec![
            Term::named_node("http://ex.org/p0"),
            Term::named_node("http://ex.org/p1"),
        ],
        Slot::Object => vec![
            Term::named_node("http://ex.org/o0"),
            Term::literal("x"),
            Term::lang_literal("x", "en"),
            Term::typed_literal("1", XSD_INTEGER),
            Term::blank_node("b0"),
        ],
        Slot::Graph => vec![Term::DefaultGraph, Term::named_node("http://ex.org/g0")],
    }
}

fn dataset() -> Vec<Quad> {
    let mut quads = Vec::new();
    let mut i = 0;
    for s in terms(Slot::Subject) {
        for p in terms(Slot::Predicate) {
            for o in terms(Slot::Object) {
                for g in terms(Slot::Graph) {
                    i += 1;
                    if i % 3 == 0 {
                        continue;
                    }
                    quads.push(Quad::new(s.clone(), p.clone(), o.clone(), g.clone()).unwrap());
                }
            }
        }
    }
    quads
}

fn sorted(mut quads: Vec<Quad>) -> Vec<Quad> {
    quads.sort();
    quads
}

#[test]
fn every_bound_slot_combination_matches_brute_force() {
    let store = QuadStore::in_memory();
    let data = dataset();
    store.multi_put(&data, WriteOptions::default()).unwrap();

    for mask in 0..16u8 {
        let bound: Vec<Slot> = Slot::ALL
            .into_iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, s)| s)
            .collect();

        // probe every distinct combination of values present in the data
        let probes: HashSet<Vec<Term>> = data
            .iter()
            .map(|q| bound.iter().map(|s| q.get(*s).clone()).collect())
            .collect();
        for probe in probes {
            let mut pattern = Pattern::new();
            for (slot, term) in bound.iter().zip(&probe) {
                pattern = pattern.with(*slot, term.clone());
            }
            let expected: Vec<Quad> = data
                .iter()
                .filter(|q| bound.iter().zip(&probe).all(|(s, t)| q.get(*s) == t))
                .cloned()
                .collect();
            let result = store.get(&pattern, &GetOptions::default()).unwrap();
            assert!(!result.resorted);
            assert_eq!(
                sorted(result.items),
                sorted(expected),
                "mask {:04b} probe {:?}",
                mask,
                probe
            );
        }
    }
}

#[test]
fn absent_terms_match_nothing() {
    let store = QuadStore::in_memory();
    store.multi_put(&dataset(), WriteOptions::default()).unwrap();
    let pattern = Pattern::new()
        .subject(Term::named_node("http://ex.org/s0"))
        .object(Term::literal("missing"));
    assert!(store.get(&pattern, &GetOptions::default()).unwrap().items.is_empty());

    // an IRI and a literal with the same text are different terms
    let pattern = Pattern::new().object(Term::literal("http://ex.org/o0"));
    assert!(store.get(&pattern, &GetOptions::default()).unwrap().items.is_empty());
}

fn custom_store(indexes: &[&str]) -> QuadStore {
    let options = StoreOptions {
        indexes: Some(indexes.iter().map(|s| s.to_string()).collect()),
        ..StoreOptions::default()
    };
    QuadStore::new(Arc::new(MemoryBackend::new()), options).unwrap()
}

#[test]
fn resorted_results_match_index_order() {
    let data = dataset();
    let default = QuadStore::in_memory();
    let aligned = custom_store(&["SGPO", "OSPG", "POGS", "GSPO"]);
    default.multi_put(&data, WriteOptions::default()).unwrap();
    aligned.multi_put(&data, WriteOptions::default()).unwrap();

    let cases = [
        (
            Pattern::new().subject(Term::named_node("http://ex.org/s0")),
            vec![Slot::Graph],
        ),
        (Pattern::new(), vec![Slot::Object, Slot::Subject]),
    ];
    for (pattern, order) in cases {
        for (reverse, limit) in [(false, None), (true, None), (false, Some(3)), (true, Some(5))] {
            let mut opts = GetOptions::new().order(order.clone()).reverse(reverse);
            opts.limit = limit;
            let a = default.get(&pattern, &opts).unwrap();
            let b = aligned.get(&pattern, &opts).unwrap();
            assert!(a.resorted, "{:?}", order);
            assert!(!b.resorted, "{:?}", order);
            assert_eq!(a.order, b.order);
            assert_eq!(a.items, b.items, "order {:?} reverse {} limit {:?}", order, reverse, limit);
            if let Some(limit) = limit {
                assert_eq!(a.items.len(), limit);
            }
        }
    }
}

#[test]
fn results_follow_the_reported_order() {
    let store = QuadStore::in_memory();
    store.multi_put(&dataset(), WriteOptions::default()).unwrap();
    let opts = GetOptions::new().order([Slot::Graph, Slot::Object]);
    let result = store.get(&Pattern::new(), &opts).unwrap();
    assert_eq!(&result.order[..2], &[Slot::Graph, Slot::Object]);
    let graphs: Vec<&Term> = result.items.iter().map(|q| &q.graph).collect();
    // named graphs (tag 0) sort before the default graph (tag 2)
    let first_default = graphs.iter().position(|g| g.is_default_graph()).unwrap();
    assert!(first_default > 0);
    assert!(graphs[first_default..].iter().all(|g| g.is_default_graph()));
}
