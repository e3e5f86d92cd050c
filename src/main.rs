use boolcoder::{BoolReader, BoolWriter, VP8BoolReader, VP8BoolWriter};

fn pattern(i: usize) -> bool {
    i % 111 == 0
}

const LOOP: usize = 100 * 1024;

/// probability that a bit of the pattern is false
const PROBABILITY: u8 = 253;

fn norm_vp8(buffer: &mut [u8], print: bool) {
    let len = {
        let mut writer = VP8BoolWriter::new(buffer);
        for i in 0..LOOP {
            writer.put(pattern(i), PROBABILITY).unwrap();
        }

        writer.finish().unwrap();
        writer.bytes_written()
    };

    {
        let mut reader = VP8BoolReader::new(&buffer[..len]);
        for i in 0..LOOP {
            assert_eq!(reader.get(PROBABILITY).unwrap(), pattern(i));
        }
    }

    if print {
        println!("norm_vp8 = {0}", len * 8);
    }
}

fn bypass_vp8(buffer: &mut [u8], print: bool) {
    let len = {
        let mut writer = VP8BoolWriter::new(buffer);
        for i in 0..LOOP {
            writer.put_bypass(pattern(i)).unwrap();
        }

        writer.finish().unwrap();
        writer.bytes_written()
    };

    {
        let mut reader = VP8BoolReader::new(&buffer[..len]);
        for i in 0..LOOP {
            assert_eq!(reader.get_bypass().unwrap(), pattern(i));
        }
    }

    if print {
        println!("bypass_vp8 = {0}", len * 8);
    }
}

fn main() {
    let mut buffer = vec![0u8; LOOP / 8 + 1024];

    for i in 0..1024 {
        bypass_vp8(&mut buffer, i == 1023);
        norm_vp8(&mut buffer, i == 1023);
    }
}
