use boolcoder::{BoolReader, BoolWriter, VP8BoolReader, VP8BoolWriter};
use criterion::{criterion_group, criterion_main, Bencher, Criterion};

const fn gen_pattern() -> [bool; 1024] {
    let mut pattern = [false; 1024];
    let mut i = 0;
    while i < 100 {
        pattern[i] = false;
        i += 1;
    }
    while i < 200 {
        pattern[i] = true;
        i += 1;
    }
    while i < 300 {
        pattern[i] = i % 2 == 0;
        i += 1;
    }
    while i < 400 {
        pattern[i] = i % 10 == 0;
        i += 1;
    }
    while i < 500 {
        pattern[i] = i % 30 != 0;
        i += 1;
    }
    while i < 600 {
        pattern[i] = i % 10 != 0;
        i += 1;
    }
    while i < 700 {
        pattern[i] = i % 5 != 0;
        i += 1;
    }
    while i < 800 {
        pattern[i] = i % 6 != 0;
        i += 1;
    }
    while i < 900 {
        pattern[i] = i % 9 == 0;
        i += 1;
    }
    while i < 1024 {
        pattern[i] = i % 2 == 0;
        i += 1;
    }

    pattern
}

const BOOL_PATTERN: [bool; 1024] = gen_pattern();

/// a probability that roughly follows the pattern, like a model that has been adapting to it
fn probability(i: usize) -> u8 {
    match i / 100 {
        0 => 250,
        1 => 5,
        2 | 10 => 128,
        3 | 8 => 230,
        _ => 40,
    }
}

fn encode_pattern(buffer: &mut [u8], bypass: bool) -> usize {
    let mut writer = VP8BoolWriter::new(buffer);
    for (i, &bit) in BOOL_PATTERN.iter().enumerate() {
        if bypass {
            writer.put_bypass(bit).unwrap();
        } else {
            writer.put(bit, probability(i)).unwrap();
        }
    }
    writer.finish().unwrap();
    writer.bytes_written()
}

fn test_encode(b: &mut Bencher, bypass: bool) {
    let mut buffer = vec![0u8; 4096];
    b.iter(|| encode_pattern(&mut buffer, bypass));
}

fn test_decode(b: &mut Bencher, bypass: bool) {
    let mut buffer = vec![0u8; 4096];
    let len = encode_pattern(&mut buffer, bypass);
    buffer.truncate(len);

    b.iter(|| {
        let mut reader = VP8BoolReader::new(&buffer);
        for (i, &bit) in BOOL_PATTERN.iter().enumerate() {
            let decoded = if bypass {
                reader.get_bypass().unwrap()
            } else {
                reader.get(probability(i)).unwrap()
            };
            assert_eq!(bit, decoded);
        }
    });
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("VP8 write", |b| test_encode(b, false));

    c.bench_function("VP8 read", |b| test_decode(b, false));

    c.bench_function("VP8 write bypass", |b| test_encode(b, true));

    c.bench_function("VP8 read bypass", |b| test_decode(b, true));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
