/*
 *  Copyright (c) 2010 The WebM project authors. All Rights Reserved.
 *
 *  Use of this source code is governed by a BSD-style license
 *  that can be found in the LICENSE banner below
 *  An additional intellectual property rights grant can be found
 *  in the file PATENTS.  All contributing project authors may
 *  be found in the VPX_AUTHORS file in this directory
 */
/*
Copyright (c) 2010, Google Inc. All rights reserved.
Redistribution and use in source and binary forms, with or without modification, are permitted provided that the following conditions are met:
Redistributions of source code must retain the above copyright notice, this list of conditions and the following disclaimer.
Redistributions in binary form must reproduce the above copyright notice, this list of conditions and the following disclaimer in the documentation and/or other materials provided with the distribution.
Neither the name of Google nor the names of its contributors may be used to endorse or promote products derived from this software without specific prior written permission.
THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS “AS IS” AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
*/

#[cfg(feature = "trace")]
use tracing::{debug, trace};

use crate::{
    error::{BoolCoderError, Result},
    norm::shift_for,
    traits::{BoolReader, BoolWriter, BYPASS_PROBABILITY},
};

const BITS_IN_BYTE: i32 = 8;
const BITS_IN_LONG: i32 = 64;
const BITS_IN_LONG_MINUS_LAST_BYTE: i32 = BITS_IN_LONG - BITS_IN_BYTE;

/// The encoder keeps this many bits of the accumulator below the byte it is about to emit,
/// so the first byte only becomes available after this many shifts.
const LOW_VALUE_SLACK_BITS: i32 = 24;

/// number of zero bits written at the end of the stream so that the decoder
/// never needs the bits left behind in the accumulator
const FLUSH_BITS: usize = 32;

/// splits the range into the part for false (below the split) and the part for true (the rest).
/// Both parts are non-empty as long as range >= 2.
#[inline(always)]
fn split(range: u32, probability: u8) -> u32 {
    1 + (((range - 1) * u32::from(probability)) >> 8)
}

/// caller owned output buffer, every write is checked against the end before it happens
struct ByteSink<'a> {
    buffer: &'a mut [u8],
    pos: usize,
}

impl ByteSink<'_> {
    #[inline(always)]
    fn write(&mut self, byte: u8) -> Result<()> {
        let capacity = self.buffer.len();
        let Some(slot) = self.buffer.get_mut(self.pos) else {
            return Err(BoolCoderError::BufferOverflow { capacity });
        };

        *slot = byte;
        self.pos += 1;

        Ok(())
    }

    fn write_run(&mut self, byte: u8, count: usize) -> Result<()> {
        for _i in 0..count {
            self.write(byte)?;
        }
        Ok(())
    }
}

/// Bytes that the encoder has produced but that could still receive a carry.
///
/// The last byte that isn't 0xff is held back together with the count of 0xff bytes following it.
/// A carry increments the held byte and turns the run into zeros. Once a carry has been resolved
/// the interval can no longer reach those bytes, so they are written out immediately.
#[derive(Default)]
struct CarryState {
    pending: Option<u8>,
    run_of_ff: usize,
}

impl CarryState {
    fn push(&mut self, byte: u8, carry: bool, sink: &mut ByteSink<'_>) -> Result<()> {
        if carry {
            // the first byte can never receive a carry since the initial range is below 256
            debug_assert!(self.pending.is_some(), "carry without a pending byte");

            if let Some(pending) = self.pending.take() {
                trace!(
                    "carry into byte {} through {} 0xff bytes",
                    sink.pos,
                    self.run_of_ff
                );

                sink.write(pending + 1)?;
                sink.write_run(0, self.run_of_ff)?;
            }

            self.run_of_ff = 0;
            self.pending = Some(byte);
        } else if byte == 0xff && self.pending.is_some() {
            self.run_of_ff += 1;
        } else {
            self.flush(sink)?;
            self.pending = Some(byte);
        }

        Ok(())
    }

    fn flush(&mut self, sink: &mut ByteSink<'_>) -> Result<()> {
        if let Some(pending) = self.pending.take() {
            sink.write(pending)?;
            sink.write_run(0xff, self.run_of_ff)?;
        }
        self.run_of_ff = 0;

        Ok(())
    }
}

/// encoder from VP8/WebM, writing into a fixed caller owned buffer
pub struct VP8BoolWriter<'a> {
    low_value: u64,
    range: u32,
    bit_count: i32,
    carry: CarryState,
    output: ByteSink<'a>,
}

impl<'a> VP8BoolWriter<'a> {
    /// starts encoding into `buffer`, nothing is written past its end
    pub fn new(buffer: &'a mut [u8]) -> Self {
        VP8BoolWriter {
            low_value: 0,
            range: 255,
            bit_count: -LOW_VALUE_SLACK_BITS,
            carry: CarryState::default(),
            output: ByteSink { buffer, pos: 0 },
        }
    }

    /// current width of the interval, in [128, 255] between calls
    pub fn range(&self) -> u32 {
        self.range
    }

    /// number of bytes that are final in the output buffer. After finish this is the length of the stream.
    pub fn bytes_written(&self) -> usize {
        self.output.pos
    }

    /// the final bytes written so far
    pub fn written(&self) -> &[u8] {
        &self.output.buffer[..self.output.pos]
    }
}

impl BoolWriter for VP8BoolWriter<'_> {
    fn put(&mut self, bit: bool, probability: u8) -> Result<()> {
        let split = split(self.range, probability);

        if bit {
            self.low_value += u64::from(split);
            self.range -= split;
        } else {
            self.range = split;
        }

        let shift = shift_for(self.range);

        self.range <<= shift;
        self.low_value <<= shift;
        self.bit_count += shift as i32;

        while self.bit_count >= 0 {
            // the byte sits right above the slack bits, with a possible carry out of it just above
            let byte_pos = self.bit_count + LOW_VALUE_SLACK_BITS;
            let carry = ((self.low_value >> (byte_pos + BITS_IN_BYTE)) & 1) != 0;

            self.carry
                .push((self.low_value >> byte_pos) as u8, carry, &mut self.output)?;

            self.low_value &= (1u64 << byte_pos) - 1;
            self.bit_count -= BITS_IN_BYTE;
        }

        Ok(())
    }

    /// pads the stream with zero bits and writes out everything that is still held back
    fn finish(&mut self) -> Result<()> {
        for _i in 0..FLUSH_BITS {
            self.put(false, BYPASS_PROBABILITY)?;
        }

        self.carry.flush(&mut self.output)?;

        debug!("finished bool coder stream with {} bytes", self.output.pos);

        Ok(())
    }
}

/// decoder from VP8/WebM, reading from a caller owned buffer
pub struct VP8BoolReader<'a> {
    value: u64,
    range: u32,
    bit_count: i32,
    input: &'a [u8],
    pos: usize,
    exhausted: bool,
}

impl<'a> VP8BoolReader<'a> {
    /// starts decoding `input`. Nothing is read until the first bit is requested.
    pub fn new(input: &'a [u8]) -> Self {
        VP8BoolReader {
            value: 0,
            range: 255,
            bit_count: -BITS_IN_BYTE,
            input,
            pos: 0,
            exhausted: false,
        }
    }

    /// current width of the interval, in [128, 255] between calls
    pub fn range(&self) -> u32 {
        self.range
    }

    /// number of input bytes loaded so far
    pub fn bytes_consumed(&self) -> usize {
        self.pos
    }

    /// true once the input ran out and zero bytes were supplied in its place
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// loads as many whole bytes as fit below the bits already in the value.
    /// Past the end of the input the missing bytes are zero.
    #[inline(always)]
    fn fill(&mut self) {
        let mut shift = BITS_IN_LONG_MINUS_LAST_BYTE - (self.bit_count + BITS_IN_BYTE);

        while shift >= 0 {
            if let Some(&byte) = self.input.get(self.pos) {
                self.value |= u64::from(byte) << shift;
                self.pos += 1;
            } else if !self.exhausted {
                debug!("bool decoder ran out of input after {} bytes", self.pos);
                self.exhausted = true;
            }

            shift -= BITS_IN_BYTE;
            self.bit_count += BITS_IN_BYTE;
        }
    }
}

impl BoolReader for VP8BoolReader<'_> {
    /// reads a single 1 or 0 from the bitstream using the supplied probability
    fn get(&mut self, probability: u8) -> Result<bool> {
        if self.bit_count < 0 {
            self.fill();
        }

        // we split the range into two parts, one for true and one for false using the probability to determine the split point
        let split = split(self.range, probability);
        let big_split = u64::from(split) << BITS_IN_LONG_MINUS_LAST_BYTE;

        // if the value is less than the split, then we know the symbol is false, otherwise it is true
        let (result, overflow) = self.value.overflowing_sub(big_split);

        let bit = if overflow {
            self.range = split;
            false
        } else {
            self.range -= split;
            self.value = result;
            true
        };

        let shift = shift_for(self.range);

        self.range <<= shift;
        self.value <<= shift;
        self.bit_count -= shift as i32;

        Ok(bit)
    }
}

#[cfg(test)]
fn encode(bits: &[bool], probabilities: &[u8]) -> Vec<u8> {
    let mut buffer = vec![0u8; bits.len() + 64];

    let len = {
        let mut writer = VP8BoolWriter::new(&mut buffer);
        for (&bit, &probability) in bits.iter().zip(probabilities) {
            writer.put(bit, probability).unwrap();
        }
        writer.finish().unwrap();
        writer.bytes_written()
    };

    buffer.truncate(len);
    buffer
}

#[cfg(test)]
fn decode(buffer: &[u8], probabilities: &[u8]) -> Vec<bool> {
    let mut reader = VP8BoolReader::new(buffer);
    probabilities
        .iter()
        .map(|&p| reader.get(p).unwrap())
        .collect()
}

/// Bits that keep the coding interval straddling the midpoint of the first byte for `n` steps
/// and then step over it, which forces a carry through every byte written so far.
#[cfg(test)]
fn straddle_then_cross(n: usize, probability: u8) -> Vec<bool> {
    // distance from the bottom of the interval to the midpoint, always inside the interval
    let mut distance = 128u32;
    let mut range = 255u32;
    let mut bits = Vec::new();

    fn renormalize(distance: &mut u32, range: &mut u32) {
        let shift = shift_for(*range);
        *range <<= shift;
        *distance <<= shift;
    }

    for _i in 0..n {
        let split = split(range, probability);
        let bit = split <= distance;
        if bit {
            distance -= split;
            range -= split;
        } else {
            range = split;
        }
        bits.push(bit);
        renormalize(&mut distance, &mut range);
    }

    loop {
        let split = split(range, probability);
        bits.push(true);
        if split > distance {
            break;
        }
        distance -= split;
        range -= split;
        renormalize(&mut distance, &mut range);
    }

    bits
}

#[test]
fn carry_ripples_through_ff_run() {
    let mut buffer = [0u8; 8];
    let mut sink = ByteSink {
        buffer: &mut buffer,
        pos: 0,
    };
    let mut state = CarryState::default();

    state.push(0x12, false, &mut sink).unwrap();
    state.push(0xff, false, &mut sink).unwrap();
    state.push(0xff, false, &mut sink).unwrap();
    assert_eq!(sink.pos, 0);

    state.push(0x34, true, &mut sink).unwrap();
    assert_eq!(sink.pos, 3);

    state.flush(&mut sink).unwrap();
    assert_eq!(sink.pos, 4);
    assert_eq!(buffer[..4], [0x13, 0x00, 0x00, 0x34]);
}

#[test]
fn ff_run_without_carry() {
    let mut buffer = [0u8; 8];
    let mut sink = ByteSink {
        buffer: &mut buffer,
        pos: 0,
    };
    let mut state = CarryState::default();

    // a leading 0xff is held like any other first byte
    state.push(0xff, false, &mut sink).unwrap();
    state.push(0x12, false, &mut sink).unwrap();
    state.push(0xff, false, &mut sink).unwrap();
    state.push(0x34, false, &mut sink).unwrap();
    state.flush(&mut sink).unwrap();

    assert_eq!(sink.pos, 4);
    assert_eq!(buffer[..4], [0xff, 0x12, 0xff, 0x34]);
}

#[test]
fn carry_state_reports_overflow() {
    let mut buffer = [0u8; 2];
    let mut sink = ByteSink {
        buffer: &mut buffer,
        pos: 0,
    };
    let mut state = CarryState::default();

    state.push(0x12, false, &mut sink).unwrap();
    state.push(0xff, false, &mut sink).unwrap();
    state.push(0xff, false, &mut sink).unwrap();

    assert!(matches!(
        state.push(0x34, true, &mut sink),
        Err(BoolCoderError::BufferOverflow { capacity: 2 })
    ));
    assert_eq!(sink.pos, 2);
}

#[test]
fn golden_vector() {
    let bits = [true, false, true, true, false];
    let probabilities = [128u8; 5];

    let encoded = encode(&bits, &probabilities);
    assert_eq!(encoded, [0xaf, 0xa0]);

    assert_eq!(decode(&encoded, &probabilities), bits);
}

#[test]
fn carry_into_first_byte() {
    let bits = straddle_then_cross(40, 200);
    let probabilities = vec![200u8; bits.len()];

    // without the carry the stream would start with 0x7f 0xff 0xff 0xff
    let encoded = encode(&bits, &probabilities);
    assert_eq!(encoded, [0x80, 0x00, 0x00, 0x00, 0x15, 0xc0]);
    assert_eq!(decode(&encoded, &probabilities), bits);
}

#[test]
fn carry_through_long_run() {
    let bits = straddle_then_cross(64, 77);
    let probabilities = vec![77u8; bits.len()];

    let encoded = encode(&bits, &probabilities);
    assert_eq!(encoded, [0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x30]);
    assert_eq!(decode(&encoded, &probabilities), bits);
}

#[test]
fn overflow_is_reported_before_writing() {
    let bits: Vec<bool> = (0..400).map(|i| i % 3 == 0).collect();
    let probabilities = vec![128u8; bits.len()];

    let needed = encode(&bits, &probabilities).len();

    // exactly enough room succeeds
    let mut exact = vec![0u8; needed];
    let mut writer = VP8BoolWriter::new(&mut exact);
    for &bit in &bits {
        writer.put(bit, 128).unwrap();
    }
    writer.finish().unwrap();
    assert_eq!(writer.bytes_written(), needed);

    // one byte less fails somewhere along the way, without going past the end
    let mut short = vec![0u8; needed - 1];
    let mut writer = VP8BoolWriter::new(&mut short);
    let result = bits
        .iter()
        .try_for_each(|&bit| writer.put(bit, 128))
        .and_then(|_| writer.finish());

    assert!(matches!(
        result,
        Err(BoolCoderError::BufferOverflow { capacity }) if capacity == needed - 1
    ));
    assert_eq!(writer.bytes_written(), needed - 1);
}

#[test]
fn empty_input_decodes_zeros() {
    let mut reader = VP8BoolReader::new(&[]);
    assert!(!reader.is_exhausted());

    for _i in 0..100 {
        assert!(!reader.get(128).unwrap());
        assert!((128..=255).contains(&reader.range()));
    }

    assert!(reader.is_exhausted());
    assert_eq!(reader.bytes_consumed(), 0);
}

#[test]
fn reader_not_exhausted_with_input_left() {
    let input = [0x5a; 32];
    let mut reader = VP8BoolReader::new(&input);

    let _ = reader.get(128).unwrap();

    assert!(!reader.is_exhausted());
    assert_eq!(reader.bytes_consumed(), 8);
}

#[test]
fn stream_starts_empty() {
    let mut buffer = [0u8; 16];
    let mut writer = VP8BoolWriter::new(&mut buffer);

    // nothing is final until more bits have been shifted through than the accumulator holds
    for _i in 0..24 {
        writer.put(true, 128).unwrap();
    }
    assert_eq!(writer.bytes_written(), 0);
    assert!(writer.written().is_empty());

    writer.finish().unwrap();
    assert!(writer.bytes_written() > 0);
}
