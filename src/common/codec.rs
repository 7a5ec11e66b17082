pub use encode::*;

// Mode
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Mode {
    Numeric = 0b0001,
    Alphanumeric = 0b0010,
    Byte = 0b0100,
}

impl Mode {
    pub fn contains(&self, ch: char) -> bool {
        match self {
            Self::Numeric => ch.is_ascii_digit(),
            Self::Alphanumeric => ALPHANUMERIC_CHARSET.contains(ch),
            Self::Byte => true,
        }
    }

    // Narrowest mode able to hold every character of the text
    pub fn select(text: &str) -> Self {
        [Self::Numeric, Self::Alphanumeric]
            .into_iter()
            .find(|mode| text.chars().all(|c| mode.contains(c)))
            .unwrap_or(Self::Byte)
    }

    /// Packs up to 3 digits, up to 2 alphanumeric characters or a single byte
    /// into one value.
    pub fn encode_chunk(&self, data: &[u8]) -> u16 {
        let (radix, max_len) = match self {
            Self::Numeric => (10, 3),
            Self::Alphanumeric => (45, 2),
            Self::Byte => (256, 1),
        };
        debug_assert!(data.len() <= max_len, "Chunk of {} too long for {self:?}", data.len());
        data.iter().fold(0_u16, |n, &b| n * radix + self.value_of(b))
    }

    fn value_of(&self, b: u8) -> u16 {
        match self {
            Self::Alphanumeric => {
                debug_assert!(self.contains(b as char), "Invalid alphanumeric {b}");
                ALPHANUMERIC_CHARSET.bytes().position(|c| c == b).unwrap_or(0) as u16
            }
            Self::Numeric => b.wrapping_sub(b'0') as u16,
            Self::Byte => b as u16,
        }
    }
}

#[cfg(test)]
mod mode_tests {
    use test_case::test_case;

    use super::Mode;

    #[test_case("0123456789", Mode::Numeric)]
    #[test_case("HELLO WORLD", Mode::Alphanumeric)]
    #[test_case("$%*+-./:", Mode::Alphanumeric)]
    #[test_case("Hello", Mode::Byte)]
    #[test_case("١٢٣", Mode::Byte)]
    #[test_case("caf\u{e9}", Mode::Byte)]
    fn test_select(text: &str, exp: Mode) {
        assert_eq!(Mode::select(text), exp);
    }

    #[test_case(Mode::Numeric, "012", 12)]
    #[test_case(Mode::Numeric, "67", 67)]
    #[test_case(Mode::Alphanumeric, "AC", 462)]
    #[test_case(Mode::Alphanumeric, "-", 41)]
    #[test_case(Mode::Byte, "a", 97)]
    fn test_encode_chunk(mode: Mode, chunk: &str, exp: u16) {
        assert_eq!(mode.encode_chunk(chunk.as_bytes()), exp);
    }
}

// Segment
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Segment {
    pub mode: Mode,
    pub data: Vec<u8>,
}

impl Segment {
    pub fn new(text: &str) -> Self {
        let mode = Mode::select(text);
        let data = match mode {
            Mode::Numeric | Mode::Alphanumeric => text.as_bytes().to_vec(),
            Mode::Byte => Self::byte_data(text),
        };
        Self { mode, data }
    }

    // ISO-8859-1 when every char fits a single Latin-1 byte, otherwise UTF-8 led by its BOM
    fn byte_data(text: &str) -> Vec<u8> {
        if text.chars().all(|c| (c as u32) <= 0xFF) {
            text.chars().map(|c| c as u8).collect()
        } else {
            let mut data = Vec::with_capacity(UTF8_BOM.len() + text.len());
            data.extend_from_slice(&UTF8_BOM);
            data.extend_from_slice(text.as_bytes());
            data
        }
    }

    pub fn char_cnt(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod segment_tests {
    use super::{Mode, Segment};

    #[test]
    fn test_latin1_segment() {
        let seg = Segment::new("caf\u{e9}");
        assert_eq!(seg.mode, Mode::Byte);
        assert_eq!(seg.data, vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(seg.char_cnt(), 4);
    }

    #[test]
    fn test_utf8_segment_has_bom() {
        let seg = Segment::new("\u{20ac}");
        assert_eq!(seg.mode, Mode::Byte);
        assert_eq!(seg.data, vec![0xEF, 0xBB, 0xBF, 0xE2, 0x82, 0xAC]);
        assert_eq!(seg.char_cnt(), 6);
    }

    #[test]
    fn test_numeric_segment() {
        let seg = Segment::new("01234567");
        assert_eq!(seg.mode, Mode::Numeric);
        assert_eq!(seg.char_cnt(), 8);
    }
}

// Encoder
//------------------------------------------------------------------------------

pub mod encode {
    use tracing::debug;

    use super::writer::{pad_remaining_capacity, push_segment, push_terminator};
    use super::Segment;
    use crate::common::{
        bit_utils::BitStream,
        error::{QRError, QRResult},
        metadata::{ECLevel, Version},
    };

    pub fn encode(text: &str, ecl: ECLevel) -> QRResult<(BitStream, Version)> {
        let seg = Segment::new(text);
        let ver = find_min_version(&seg, ecl)?;
        debug!(mode = ?seg.mode, char_cnt = seg.char_cnt(), version = *ver, "Selected version");
        Ok((write_data(&seg, ver, ecl), ver))
    }

    pub fn encode_with_version(text: &str, ver: Version, ecl: ECLevel) -> QRResult<BitStream> {
        let seg = Segment::new(text);
        if seg.char_cnt() > ver.char_capacity(ecl, seg.mode) {
            return Err(QRError::CapacityExceeded);
        }
        Ok(write_data(&seg, ver, ecl))
    }

    fn find_min_version(seg: &Segment, ecl: ECLevel) -> QRResult<Version> {
        (1..=40)
            .map(Version::new)
            .find(|v| v.char_capacity(ecl, seg.mode) >= seg.char_cnt())
            .ok_or(QRError::CapacityExceeded)
    }

    fn write_data(seg: &Segment, ver: Version, ecl: ECLevel) -> BitStream {
        let mut bs = BitStream::new(ver.data_bit_capacity(ecl));
        push_segment(seg, ver, &mut bs);
        push_terminator(&mut bs);
        pad_remaining_capacity(&mut bs);
        bs
    }

}

// Writer for encoded data
//------------------------------------------------------------------------------

pub(super) mod writer {
    use super::{Mode, Segment, PADDING_CODEWORDS};
    use crate::common::{bit_utils::BitStream, metadata::Version};

    pub fn push_segment(seg: &Segment, ver: Version, out: &mut BitStream) {
        push_header(seg, ver, out);
        match seg.mode {
            Mode::Numeric => push_numeric_data(&seg.data, out),
            Mode::Alphanumeric => push_alphanumeric_data(&seg.data, out),
            Mode::Byte => push_byte_data(&seg.data, out),
        }
    }

    fn push_header(seg: &Segment, ver: Version, out: &mut BitStream) {
        out.push_bits(seg.mode as u8, 4);
        let char_cnt = seg.char_cnt();
        let len_bits = ver.char_cnt_bits(seg.mode);
        debug_assert!(
            char_cnt < (1 << len_bits),
            "Char count exceeds bit length: Char count {char_cnt}, Char count bits {len_bits}"
        );
        out.push_bits(char_cnt as u16, len_bits);
    }

    fn push_numeric_data(data: &[u8], out: &mut BitStream) {
        for chunk in data.chunks(3) {
            let len = (chunk.len() * 10 + 2) / 3;
            let data = Mode::Numeric.encode_chunk(chunk);
            out.push_bits(data, len);
        }
    }

    fn push_alphanumeric_data(data: &[u8], out: &mut BitStream) {
        for chunk in data.chunks(2) {
            let len = (chunk.len() * 11 + 1) / 2;
            let data = Mode::Alphanumeric.encode_chunk(chunk);
            out.push_bits(data, len);
        }
    }

    fn push_byte_data(data: &[u8], out: &mut BitStream) {
        for &b in data {
            out.push_bits(b, 8);
        }
    }

    pub fn push_terminator(out: &mut BitStream) {
        let bit_len = out.len();
        let bit_capacity = out.capacity();
        if bit_len < bit_capacity {
            let term_len = std::cmp::min(4, bit_capacity - bit_len);
            out.push_bits(0, term_len);
        }
    }

    pub fn pad_remaining_capacity(out: &mut BitStream) {
        push_padding_bits(out);
        push_padding_codewords(out);
    }

    fn push_padding_bits(out: &mut BitStream) {
        let offset = out.len() & 7;
        if offset > 0 {
            out.push_bits(0, 8 - offset);
        }
    }

    fn push_padding_codewords(out: &mut BitStream) {
        debug_assert!(
            out.len() & 7 == 0,
            "Bit offset should be zero before padding codewords: {}",
            out.len() & 7
        );

        let remain_bytes = (out.capacity() - out.len()) >> 3;
        PADDING_CODEWORDS.iter().copied().cycle().take(remain_bytes).for_each(|pc| {
            out.push_bits(pc, 8);
        });
    }

}

// Global constants
//------------------------------------------------------------------------------

pub static PADDING_CODEWORDS: [u8; 2] = [0b1110_1100, 0b0001_0001];

pub static UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

// Indexed by alphanumeric value
static ALPHANUMERIC_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";
