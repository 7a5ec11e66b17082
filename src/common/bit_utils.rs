use std::fmt::Display;

use num_traits::PrimInt;

// Bit stream
//------------------------------------------------------------------------------

/// Append-only, MSB first bit buffer bounded by a bit capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitStream {
    data: Vec<u8>,
    len: usize,
    capacity: usize,
}

impl BitStream {
    pub fn new(capacity: usize) -> Self {
        Self { data: Vec::with_capacity((capacity + 7) >> 3), len: 0, capacity }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(|i| self.data[i >> 3] & (0x80 >> (i & 7)) != 0)
    }

    /// Appends the low `size` bits of `bits`, most significant first.
    pub fn push_bits<T>(&mut self, bits: T, size: usize)
    where
        T: PrimInt + Display,
    {
        debug_assert!(
            bits.count_zeros() + bits.count_ones() - bits.leading_zeros() <= size as u32,
            "Value {bits} does not fit in {size} bits"
        );
        debug_assert!(size <= 32, "At most 32 bits per push");

        let Some(bits) = bits.to_u32() else {
            return;
        };
        (0..size).rev().for_each(|i| self.push((bits >> i) & 1 == 1));
    }

    pub fn push(&mut self, bit: bool) {
        debug_assert!(self.len < self.capacity, "Bit stream full at {} bits", self.capacity);

        if self.len & 7 == 0 {
            self.data.push(0);
        }
        if bit {
            if let Some(last) = self.data.last_mut() {
                *last |= 0x80 >> (self.len & 7);
            }
        }
        self.len += 1;
    }

    /// Appends whole bytes; the stream must be byte aligned.
    pub fn extend(&mut self, bytes: &[u8]) {
        debug_assert!(self.len & 7 == 0, "Unaligned extend at bit {}", self.len);
        debug_assert!(self.len + (bytes.len() << 3) <= self.capacity, "Extend overflows capacity");

        self.data.extend_from_slice(bytes);
        self.len += bytes.len() << 3;
    }
}

#[cfg(test)]
mod bit_stream_tests {
    use super::BitStream;

    #[test]
    fn test_len() {
        let mut bs = BitStream::new(64);
        bs.push_bits(0, 0);
        assert_eq!(bs.len(), 0);
        bs.push_bits(0b1000, 4);
        bs.push_bits(0b1111111, 7);
        assert_eq!(bs.len(), 11);
        bs.push_bits(0b111111111111u16, 16);
        assert_eq!(bs.len(), 27);
        assert_eq!(bs.data().len(), 4);
    }

    #[test]
    fn test_push_bits_across_bytes() {
        let mut bs = BitStream::new(24);
        bs.push_bits(0b0010u8, 4);
        bs.push_bits(0b000001011u16, 9);
        bs.push_bits(0b01100001011u16, 11);
        assert_eq!(bs.data(), [0b0010_0000, 0b0101_1011, 0b0000_1011]);
    }

    #[test]
    fn test_extend_and_bits() {
        let mut bs = BitStream::new(24);
        bs.push_bits(0xABu8, 8);
        bs.extend(&[0xCD, 0xEF]);
        assert_eq!(bs.data(), [0xAB, 0xCD, 0xEF]);

        let first: Vec<bool> = bs.bits().take(8).collect();
        assert_eq!(first, [true, false, true, false, true, false, true, true]);
        assert_eq!(bs.bits().count(), 24);
    }
}
