use quadstore::consts::{XSD_DATE_TIME, XSD_DECIMAL, XSD_DOUBLE, XSD_INTEGER};
use quadstore::{Error, GetOptions, Literal, Pattern, Quad, QuadStore, Range, Slot, Term, WriteOptions};

const P: &str = "http://ex.org/value";

fn quad(s: &str, object: Term) -> Quad {
    Quad::new(
        Term::named_node(format!("http://ex.org/{}", s)),
        Term::named_node(P),
        object,
        Term::named_node("http://ex.org/g"),
    )
    .unwrap()
}

fn subjects(store: &QuadStore, pattern: &Pattern) -> Vec<String> {
    store
        .get(pattern, &GetOptions::default())
        .unwrap()
        .items
        .into_iter()
        .map(|q| match q.subject {
            Term::NamedNode(iri) => iri.trim_start_matches("http://ex.org/").to_string(),
            t => panic!("unexpected subject {}", t),
        })
        .collect()
}

fn int(n: &str) -> Literal {
    Literal::new_typed(n, XSD_INTEGER)
}

#[test]
fn integer_objects_above_a_double_bound() {
    let store = QuadStore::in_memory();
    store
        .multi_put(
            &[
                quad("s", Term::typed_literal("5", XSD_INTEGER)),
                quad("s2", Term::typed_literal("7", XSD_INTEGER)),
            ],
            WriteOptions::default(),
        )
        .unwrap();
    let pattern = Pattern::new().object(Range::new().gt(Literal::new_typed("6", XSD_DOUBLE)));
    assert_eq!(subjects(&store, &pattern), ["s2"]);
}

fn numbers() -> QuadStore {
    let store = QuadStore::in_memory();
    let values = [
        ("a", "-100", XSD_INTEGER),
        ("b", "-2.5", XSD_DECIMAL),
        ("c", "0", XSD_INTEGER),
        ("d", "1", XSD_INTEGER),
        ("e", "1.0", XSD_DOUBLE),
        ("f", "2", XSD_INTEGER),
        ("g", "3.5e2", XSD_DOUBLE),
    ];
    let quads: Vec<Quad> = values
        .iter()
        .map(|(s, v, dt)| quad(s, Term::typed_literal(*v, *dt)))
        .collect();
    store.multi_put(&quads, WriteOptions::default()).unwrap();
    // non-numeric objects on the same predicate must never leak into numeric ranges
    store
        .multi_put(
            &[
                quad("x", Term::literal("1")),
                quad("y", Term::named_node("http://ex.org/1")),
                quad("z", Term::typed_literal("1", "http://www.w3.org/2001/XMLSchema#boolean")),
            ],
            WriteOptions::default(),
        )
        .unwrap();
    store
}

#[test]
fn exclusive_and_inclusive_bounds() {
    let store = numbers();
    let cases: Vec<(Range, Vec<&str>)> = vec![
        (Range::new().gt(int("1")), vec!["f", "g"]),
        (Range::new().gte(int("1")), vec!["d", "e", "f", "g"]),
        (Range::new().lt(int("1")), vec!["a", "b", "c"]),
        (Range::new().lte(int("1")), vec!["a", "b", "c", "d", "e"]),
        (Range::new().gt(int("-3")).lt(int("2")), vec!["b", "c", "d", "e"]),
        (Range::new().gte(int("-100")).lte(int("-100")), vec!["a"]),
        (Range::new().gt(int("2")).lt(int("2")), vec![]),
        (Range::new().gt(int("1000")), vec![]),
        // strict wins when both are given
        (Range::new().gt(int("1")).gte(int("0")), vec!["f", "g"]),
        (Range::new().lt(int("0")).lte(int("1")), vec!["a", "b"]),
    ];
    for (range, expected) in cases {
        let pattern = Pattern::new().predicate(Term::named_node(P)).object(range.clone());
        let mut got = subjects(&store, &pattern);
        got.sort();
        assert_eq!(got, expected, "{:?}", range);
    }
}

#[test]
fn numeric_scan_is_in_value_order() {
    let store = numbers();
    let pattern = Pattern::new().object(Range::new().gte(int("-1000")));
    let got = subjects(&store, &pattern);
    // equal values tie-break on the datatype IRI, so 1.0 (double) precedes 1 (integer)
    assert_eq!(got, ["a", "b", "c", "e", "d", "f", "g"]);

    let opts = GetOptions::new().reverse(true).limit(2);
    let result = store.get(&pattern, &opts).unwrap();
    assert_eq!(result.order[0], Slot::Object);
    let objs: Vec<&str> = result
        .items
        .iter()
        .map(|q| q.object.as_literal().unwrap().value())
        .collect();
    assert_eq!(objs, ["3.5e2", "2"]);
}

#[test]
fn string_language_and_date_axes() {
    let store = QuadStore::in_memory();
    store
        .multi_put(
            &[
                quad("a", Term::literal("apple")),
                quad("b", Term::literal("b")),
                quad("ba", Term::literal("banana")),
                quad("c", Term::literal("cherry")),
                quad("en", Term::lang_literal("banana", "en")),
                quad("fr", Term::lang_literal("banane", "fr")),
                quad("d1", Term::typed_literal("1999-12-31T23:59:59Z", XSD_DATE_TIME)),
                quad("d2", Term::typed_literal("2000-01-01T01:00:00+02:00", XSD_DATE_TIME)),
                quad("d3", Term::typed_literal("2020-06-01T00:00:00Z", XSD_DATE_TIME)),
            ],
            WriteOptions::default(),
        )
        .unwrap();

    let gt_b = Pattern::new().object(Range::new().gt(Literal::new_simple("b")));
    assert_eq!(subjects(&store, &gt_b), ["ba", "c"]);
    let lte_b = Pattern::new().object(Range::new().lte(Literal::new_simple("b")));
    assert_eq!(subjects(&store, &lte_b), ["a", "b"]);

    let fr = Pattern::new().object(Range::new().gte(Literal::new_language_tagged("a", "fr")));
    assert_eq!(subjects(&store, &fr), ["fr"]);

    // 2000-01-01T01:00:00+02:00 is 1999-12-31T23:00:00Z
    let dates = Pattern::new().object(
        Range::new().lt(Literal::new_typed("2000-01-01T00:00:00Z", XSD_DATE_TIME)),
    );
    assert_eq!(subjects(&store, &dates), ["d2", "d1"]);
}

#[test]
fn range_after_bound_terms_and_unanswerable_ranges() {
    let store = numbers();
    let pattern = Pattern::new()
        .subject(Term::named_node("http://ex.org/f"))
        .predicate(Term::named_node(P))
        .object(Range::new().gt(int("0")));
    assert_eq!(subjects(&store, &pattern), ["f"]);

    let pattern = Pattern::new()
        .graph(Term::named_node("http://ex.org/g"))
        .object(Range::new().gt(int("0")));
    assert!(matches!(
        store.get(&pattern, &GetOptions::default()),
        Err(Error::UnsupportedPattern(_))
    ));

    let pattern = Pattern::new().object(
        Range::new()
            .gt(int("0"))
            .lt(Literal::new_typed("2020-01-01T00:00:00Z", XSD_DATE_TIME)),
    );
    assert!(matches!(
        store.get(&pattern, &GetOptions::default()),
        Err(Error::InvalidPattern(_))
    ));
}

#[test]
fn approximate_size_of_a_range() {
    let store = numbers();
    let pattern = Pattern::new().object(Range::new().gt(int("0")));
    let size = store.get_approximate_size(&pattern, &GetOptions::default()).unwrap();
    assert_eq!(size.approximate_size, 4);
    let all = store.get_approximate_size(&Pattern::new(), &GetOptions::default()).unwrap();
    assert_eq!(all.approximate_size, 10);
}

#[test]
fn nan_and_malformed_numbers_are_refused() {
    let store = numbers();
    let err = store
        .put(&quad("n", Term::typed_literal("NaN", XSD_DOUBLE)), WriteOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::NotANumber), "{}", err);
    let err = store
        .put(&quad("n", Term::typed_literal("twelve", XSD_INTEGER)), WriteOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::InvalidTerm(_)), "{}", err);

    let pattern = Pattern::new().object(Range::new().gt(Literal::new_typed("NaN", XSD_DOUBLE)));
    assert!(store.get(&pattern, &GetOptions::default()).is_err());
    let all = store.get_approximate_size(&Pattern::new(), &GetOptions::default()).unwrap();
    assert_eq!(all.approximate_size, 10);
}
