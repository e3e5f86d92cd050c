use boolcoder::{BoolReader, BoolWriter, VP8BoolReader, VP8BoolWriter};
use proptest::prelude::*;

fn encode(input: &[(bool, u8)]) -> Vec<u8> {
    // no bit ever costs more than 8 bits
    let mut buffer = vec![0u8; input.len() + 16];

    let mut writer = VP8BoolWriter::new(&mut buffer);
    for &(bit, probability) in input {
        writer.put(bit, probability).unwrap();
    }
    writer.finish().unwrap();

    writer.written().to_vec()
}

proptest! {
    #[test]
    fn test_roundtrip(input in prop::collection::vec((any::<bool>(), any::<u8>()), 0..2000)) {
        let encoded = encode(&input);

        let mut reader = VP8BoolReader::new(&encoded);
        for (i, &(bit, probability)) in input.iter().enumerate() {
            prop_assert_eq!(reader.get(probability).unwrap(), bit, "pos {}", i);
        }
    }

    #[test]
    fn test_trailing_bytes_are_dont_care(
        input in prop::collection::vec((any::<bool>(), any::<u8>()), 1..500),
        trailing in prop::collection::vec(any::<u8>(), 0..16),
    ) {
        let mut encoded = encode(&input);
        encoded.extend_from_slice(&trailing);

        let mut reader = VP8BoolReader::new(&encoded);
        for &(bit, probability) in &input {
            prop_assert_eq!(reader.get(probability).unwrap(), bit);
        }
    }

    #[test]
    fn test_skewed_roundtrip(
        bits in prop::collection::vec(any::<bool>(), 0..1000),
        probability in prop_oneof![Just(0u8), Just(1u8), Just(254u8), Just(255u8), any::<u8>()],
    ) {
        let input: Vec<(bool, u8)> = bits.iter().map(|&b| (b, probability)).collect();
        let encoded = encode(&input);

        let mut reader = VP8BoolReader::new(&encoded);
        for &bit in &bits {
            prop_assert_eq!(reader.get(probability).unwrap(), bit);
            prop_assert!((128..=255).contains(&reader.range()));
        }
    }
}
