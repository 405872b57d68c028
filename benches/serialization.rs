use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use minibuf::{decode, encode, from_str, record, to_string, FieldType, Record, Schema, Shape};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone)]
struct Vector {
    x: f64,
    y: f64,
    z: f64,
}

#[derive(Serialize, Deserialize, Clone)]
struct Config {
    auto_restart: bool,
    id: i32,
    user_name: String,
    score: f64,
}

fn sample_config() -> Config {
    Config {
        auto_restart: false,
        id: 42,
        user_name: "test".to_string(),
        score: 99.5,
    }
}

fn benchmark_serialize_vector(c: &mut Criterion) {
    let vector = Vector {
        x: 1.234,
        y: 5.678,
        z: 9.012,
    };

    c.bench_function("serialize_vector", |b| {
        b.iter(|| to_string(black_box(&vector)))
    });
}

fn benchmark_deserialize_vector(c: &mut Criterion) {
    let text = "[3]1.234;5.678;9.012";

    c.bench_function("deserialize_vector", |b| {
        b.iter(|| from_str::<Vector>(black_box(text)))
    });
}

fn benchmark_serialize_config(c: &mut Criterion) {
    let config = sample_config();

    c.bench_function("serialize_config", |b| {
        b.iter(|| to_string(black_box(&config)))
    });
}

fn benchmark_deserialize_config(c: &mut Criterion) {
    let text = to_string(&sample_config()).unwrap();

    c.bench_function("deserialize_config", |b| {
        b.iter(|| from_str::<Config>(black_box(&text)))
    });
}

fn benchmark_explicit_shape(c: &mut Criterion) {
    let mut group = c.benchmark_group("explicit_shape");

    let shape = Shape::new([
        FieldType::Boolean,
        FieldType::Integer,
        FieldType::Text,
        FieldType::Float,
    ]);
    let config = record![false, 42, "test", 99.5];
    let text = encode(&config, &shape).unwrap();

    group.bench_function("encode", |b| {
        b.iter(|| encode(black_box(&config), black_box(&shape)))
    });
    group.bench_function("decode", |b| {
        b.iter(|| decode(black_box(&text), black_box(&shape)))
    });

    group.finish();
}

fn benchmark_wide_records(c: &mut Criterion) {
    let mut group = c.benchmark_group("wide_float_record");

    for size in [4, 16, 64, 256].iter() {
        let record: Record = (0..*size).map(|i| f64::from(i) * 1.5 - 7.25).map(Into::into).collect();
        let shape = Shape::new(vec![FieldType::Float; *size as usize]);
        let text = encode(&record, &shape).unwrap();

        group.bench_with_input(BenchmarkId::new("encode", size), &record, |b, record| {
            b.iter(|| encode(black_box(record), &shape))
        });
        group.bench_with_input(BenchmarkId::new("decode", size), &text, |b, text| {
            b.iter(|| decode(black_box(text), &shape))
        });
    }
    group.finish();
}

fn benchmark_schema_lookup(c: &mut Criterion) {
    let schema = Schema::parse(
        "Vector {\n  x: float;\n  y: float;\n  z: float;\n}\n\
         Config {\n  auto_restart: bool;\n  id: number;\n  user_name: string;\n  score: float = 0.0;\n}\n",
    )
    .unwrap();

    c.bench_function("schema_decode_config", |b| {
        b.iter(|| schema.decode(black_box("Config"), black_box("[4]F;42;test;99.500")))
    });
}

fn benchmark_versus_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("versus_json");
    let config = sample_config();

    group.bench_function("minibuf", |b| b.iter(|| to_string(black_box(&config))));
    group.bench_function("json", |b| {
        b.iter(|| serde_json::to_string(black_box(&config)))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_serialize_vector,
    benchmark_deserialize_vector,
    benchmark_serialize_config,
    benchmark_deserialize_config,
    benchmark_explicit_shape,
    benchmark_wide_records,
    benchmark_schema_lookup,
    benchmark_versus_json
);
criterion_main!(benches);
