use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::{json, Map, Value as JsonValue};
use tabread::prelude::*;
use tabread::{from_csv, from_dicts};

fn make_csv(rows: usize) -> Vec<u8> {
    let mut out = String::from("group,order,value\n");
    for i in 0..rows {
        out.push_str(&format!("group-{},{},\"{}.5\"\n", i % 4, i, i % 10));
    }
    out.into_bytes()
}

fn make_records(rows: usize) -> Vec<Map<String, JsonValue>> {
    (0..rows)
        .map(|i| match json!({"group": format!("group-{}", i % 4), "order": i, "value": (i % 10) as f64}) {
            JsonValue::Object(map) => map,
            _ => unreachable!(),
        })
        .collect()
}

fn bench_csv_reader(c: &mut Criterion) {
    let bytes = make_csv(4096);
    let cfg = ReaderConfig::default();
    c.bench_function("csv_reader", |b| {
        b.iter(|| {
            let handle = Handle::binary(std::io::Cursor::new(bytes.clone()));
            let reader = from_csv(handle, &cfg).unwrap();
            assert_eq!(reader.count(), 4097);
        })
    });
}

fn bench_dict_reader(c: &mut Criterion) {
    let records = make_records(4096);
    let cfg = ReaderConfig::default();
    c.bench_function("dict_reader", |b| {
        b.iter(|| {
            let reader = from_dicts(records.clone(), &cfg);
            assert_eq!(reader.count(), 4097);
        })
    });
}

criterion_group!(readers, bench_csv_reader, bench_dict_reader);
criterion_main!(readers);
