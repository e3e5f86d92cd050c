//! Debug implementation of the bool reader and writer.
//!
//! It is used to verify that the decoder is driven with exactly the same probabilities, in the
//! same order, as the encoder was. If a different probability is passed, the arithmetic coder
//! silently desynchronizes and produces garbage from that point on, which is very hard to track
//! down, so it is worthwhile to test a new bitstream layout with the debug implementation first.
use std::io::{self, Cursor};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::{
    error::{BoolCoderError, Result},
    traits::{BoolReader, BoolWriter},
};

/// every bit is stored as its sequence number, the probability it was written with and the bit itself
const RECORD_SIZE: usize = 6;

/// Encoder for debugging purposes only. Uses six bytes per bit.
pub struct DebugWriter<'a> {
    output: Cursor<&'a mut [u8]>,
    counter: u32,
}

impl<'a> DebugWriter<'a> {
    pub fn new(buffer: &'a mut [u8]) -> Self {
        DebugWriter {
            output: Cursor::new(buffer),
            counter: 0,
        }
    }

    pub fn bytes_written(&self) -> usize {
        self.output.position() as usize
    }
}

impl BoolWriter for DebugWriter<'_> {
    fn put(&mut self, bit: bool, probability: u8) -> Result<()> {
        let capacity = self.output.get_ref().len();
        if self.bytes_written() + RECORD_SIZE > capacity {
            return Err(BoolCoderError::BufferOverflow { capacity });
        }

        self.output.write_u32::<LittleEndian>(self.counter)?;
        self.output.write_u8(probability)?;
        self.output.write_u8(bit as u8)?;
        self.counter += 1;

        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Decoder for debugging purposes only. It will check that the same probabilities are passed in the same order.
pub struct DebugReader<'a> {
    input: &'a [u8],
    counter: u32,
}

impl<'a> DebugReader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        DebugReader { input, counter: 0 }
    }
}

impl BoolReader for DebugReader<'_> {
    fn get(&mut self, probability: u8) -> Result<bool> {
        let sequence = self.input.read_u32::<LittleEndian>()?;
        if sequence != self.counter {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("expected bit {} but found bit {}", self.counter, sequence),
            )
            .into());
        }

        let expected = self.input.read_u8()?;
        if expected != probability {
            return Err(BoolCoderError::ProbabilityMismatch {
                position: u64::from(self.counter),
                expected,
                actual: probability,
            });
        }

        self.counter += 1;
        Ok(self.input.read_u8()? != 0)
    }
}

#[test]
fn roundtrip_value() {
    let mut output = vec![0u8; 100 * 80 * RECORD_SIZE];

    let len = {
        let mut writer = DebugWriter::new(&mut output);

        for i in 0..100u32 {
            writer.put(i & 1 == 1, (i * 7) as u8).unwrap();
            writer.put_bypass(i & 2 == 2).unwrap();
            writer.put_literal(0x456, 24).unwrap();
            writer.put_literal(i, 7).unwrap();
        }

        writer.finish().unwrap();
        writer.bytes_written()
    };

    assert_eq!(len, 100 * 33 * RECORD_SIZE);

    let mut reader = DebugReader::new(&output[..len]);

    for i in 0..100u32 {
        assert_eq!(reader.get((i * 7) as u8).unwrap(), i & 1 == 1);
        assert_eq!(reader.get_bypass().unwrap(), i & 2 == 2);
        assert_eq!(reader.get_literal(24).unwrap(), 0x456);
        assert_eq!(reader.get_literal(7).unwrap(), i);
    }

    // reading past the end is an error for the debug coder
    assert!(matches!(reader.get(128), Err(BoolCoderError::Io(_))));
}

#[test]
fn detects_wrong_probability() {
    let mut output = [0u8; 4 * RECORD_SIZE];
    let mut writer = DebugWriter::new(&mut output);

    writer.put(true, 10).unwrap();
    writer.put(false, 20).unwrap();
    writer.put(true, 30).unwrap();
    writer.finish().unwrap();

    let mut reader = DebugReader::new(&output);
    assert!(reader.get(10).unwrap());

    assert!(matches!(
        reader.get(21),
        Err(BoolCoderError::ProbabilityMismatch {
            position: 1,
            expected: 20,
            actual: 21
        })
    ));
}

#[test]
fn debug_writer_overflow() {
    let mut output = [0u8; RECORD_SIZE + 3];
    let mut writer = DebugWriter::new(&mut output);

    writer.put(true, 1).unwrap();
    assert!(matches!(
        writer.put(true, 2),
        Err(BoolCoderError::BufferOverflow { capacity }) if capacity == RECORD_SIZE + 3
    ));
    assert_eq!(writer.bytes_written(), RECORD_SIZE);
}
