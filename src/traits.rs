use crate::error::Result;

/// probability used for bits where both values are equally likely
pub const BYPASS_PROBABILITY: u8 = 128;

/// implementation of a binary arithmetic encoder where the caller supplies the probability of every bit
pub trait BoolWriter {
    /// write a bit, where `probability` is the likelihood (out of 256) that the bit is false
    fn put(&mut self, bit: bool, probability: u8) -> Result<()>;

    /// flush any remaining state
    fn finish(&mut self) -> Result<()>;

    /// write a bit that isn't worth modelling at an even probability
    fn put_bypass(&mut self, bit: bool) -> Result<()> {
        self.put(bit, BYPASS_PROBABILITY)
    }

    /// default implementation to write the lower num_bits of value, most significant bit first
    fn put_literal(&mut self, value: u32, num_bits: u32) -> Result<()> {
        assert!(num_bits <= 32, "num_bits {num_bits} > 32");

        for i in (0..num_bits).rev() {
            self.put_bypass(((value >> i) & 1) != 0)?;
        }

        Ok(())
    }
}

/// implementation of a binary arithmetic decoder, mirror of [`BoolWriter`]
pub trait BoolReader {
    /// read a bit using the same probability that was passed to the writer
    fn get(&mut self, probability: u8) -> Result<bool>;

    /// read a bit written with [`BoolWriter::put_bypass`]
    fn get_bypass(&mut self) -> Result<bool> {
        self.get(BYPASS_PROBABILITY)
    }

    /// reads num_bits written with [`BoolWriter::put_literal`]
    fn get_literal(&mut self, num_bits: u32) -> Result<u32> {
        assert!(num_bits <= 32, "num_bits {num_bits} > 32");

        let mut value = 0;
        for i in (0..num_bits).rev() {
            value |= u32::from(self.get_bypass()?) << i;
        }

        Ok(value)
    }
}
