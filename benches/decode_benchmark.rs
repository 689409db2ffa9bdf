use std::{fs::File, io::BufReader, path::Path};

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hmmtagger::{read_sentences, Counter, DecoderConfig, Model, Tagger};

fn data(name: &str) -> File {
    let fpath = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name);
    File::open(fpath).expect("failed to open the stream for the input data")
}

fn train_benchmark(c: &mut Criterion) {
    c.bench_function("count", |b| {
        b.iter(|| Counter::default().read(BufReader::new(black_box(data("train.pos")))).expect("failed to count"))
    });
}

fn decode_benchmark(c: &mut Criterion) {
    let model = Model::from_reader(BufReader::new(data("train.pos"))).expect("failed to train");
    let mut tagger = model.tagger(&DecoderConfig::default()).expect("failed to get tagger from model");
    let sentences = read_sentences(BufReader::new(data("dev.words"))).expect("failed to read sentences");

    c.bench_function("viterbi", |b| {
        b.iter(|| {
            for words in &sentences {
                black_box(tagger.tag(black_box(words)).expect("failed to tag"));
            }
        })
    });
}

criterion_group!(benchmarks, train_benchmark, decode_benchmark);
criterion_main!(benchmarks);
