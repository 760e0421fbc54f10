use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use quadstore::codec::{quad_value_len, read_quad, write_quad};
use quadstore::consts::{XSD_DOUBLE, XSD_INTEGER};
use quadstore::{
    GetOptions, Literal, NoPrefixes, Pattern, Quad, QuadStore, Range, Slot, Term, WriteOptions, fpstring,
};

/// `n` quads mixing IRIs, blank nodes, plain, language and numeric literals.
fn generate_quads(n: usize) -> Vec<Quad> {
    (0..n)
        .map(|i| {
            let subject = if i % 7 == 0 {
                Term::blank_node(format!("b{i}"))
            } else {
                Term::named_node(format!("http://example.org/s/{i}"))
            };
            let predicate = Term::named_node(format!("http://example.org/p/{}", i % 10));
            let object = match i % 4 {
                0 => Term::typed_literal(i.to_string(), XSD_INTEGER),
                1 => Term::typed_literal(format!("{}.5", i), XSD_DOUBLE),
                2 => Term::lang_literal(format!("hello {i}"), "en"),
                _ => Term::literal(format!("value {i}")),
            };
            let graph = Term::named_node(format!("http://example.org/g/{}", i % 3));
            Quad::new(subject, predicate, object, graph).unwrap()
        })
        .collect()
}

fn bench_fpstring(c: &mut Criterion) {
    let inputs: Vec<f64> = (0..1_000).map(|i| (i as f64 - 500.0) * 1.37e3).collect();
    let mut group = c.benchmark_group("fpstring");
    group.throughput(Throughput::Elements(inputs.len() as u64));
    group.bench_function("encode", |b| {
        b.iter(|| {
            for &n in &inputs {
                fpstring::encode(n).unwrap();
            }
        });
    });
    group.finish();
}

fn bench_quad_codec(c: &mut Criterion) {
    let quads = generate_quads(1_000);
    let slots = [Slot::Subject, Slot::Predicate, Slot::Object, Slot::Graph];
    let prefix = "SPOG\u{0}\u{0}";
    let mut group = c.benchmark_group("quad_codec");
    group.throughput(Throughput::Elements(quads.len() as u64));
    group.bench_function("write", |b| {
        b.iter(|| {
            for q in &quads {
                let mut value = vec![0u8; quad_value_len(q)];
                write_quad(prefix, &mut value, 0, q, &slots, &NoPrefixes).unwrap();
            }
        });
    });

    let encoded: Vec<(String, Vec<u8>)> = quads
        .iter()
        .map(|q| {
            let mut value = vec![0u8; quad_value_len(q)];
            let (key, _) = write_quad(prefix, &mut value, 0, q, &slots, &NoPrefixes).unwrap();
            (key, value)
        })
        .collect();
    group.bench_function("read", |b| {
        b.iter(|| {
            for (key, value) in &encoded {
                read_quad(key, prefix.len(), value, 0, &slots, &NoPrefixes).unwrap();
            }
        });
    });
    group.finish();
}

fn bench_multi_put(c: &mut Criterion) {
    let mut group = c.benchmark_group("multi_put");
    for n in [100, 1_000, 10_000] {
        let quads = generate_quads(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &quads, |b, quads| {
            b.iter(|| {
                let store = QuadStore::in_memory();
                store.multi_put(quads, WriteOptions::default()).unwrap();
            });
        });
    }
    group.finish();
}

fn bench_range_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_query");
    for n in [1_000, 10_000] {
        let store = QuadStore::in_memory();
        store
            .multi_put(&generate_quads(n), WriteOptions::default())
            .unwrap();
        let pattern = Pattern::new()
            .predicate(Term::named_node("http://example.org/p/0"))
            .object(Range::new().gte(Literal::new_typed("100", XSD_INTEGER)));
        group.bench_with_input(BenchmarkId::from_parameter(n), &store, |b, store| {
            b.iter(|| store.get(&pattern, &GetOptions::default()).unwrap());
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_fpstring,
    bench_quad_codec,
    bench_multi_put,
    bench_range_query
);
criterion_main!(benches);
