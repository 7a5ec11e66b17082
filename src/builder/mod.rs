mod qr;

#[cfg(test)]
pub(crate) use qr::Module;
pub use qr::QR;

use std::ops::Deref;

use tracing::debug;

use crate::common::{
    bit_utils::BitStream,
    codec::{encode, encode_with_version},
    ec::ecc_per_block,
    error::{QRError, QRResult},
    mask::{apply_best_mask, MaskPattern},
    metadata::{ECLevel, Version},
};
use crate::render::ModuleMatrix;

/// Encodes `text` at the given error correction level into a module matrix
/// surrounded by the 4 module quiet zone.
pub fn encode_matrix(text: &str, ec_level: ECLevel) -> QRResult<ModuleMatrix> {
    let qr = QRBuilder::new(text).ec_level(ec_level).build()?;
    Ok(qr.to_matrix(true))
}

pub struct QRBuilder<'a> {
    text: &'a str,
    version: Option<Version>,
    ec_level: ECLevel,
    mask: Option<MaskPattern>,
}

impl<'a> QRBuilder<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, version: None, ec_level: ECLevel::M, mask: None }
    }

    pub fn text(&mut self, text: &'a str) -> &mut Self {
        self.text = text;
        self
    }

    pub fn version(&mut self, version: Version) -> &mut Self {
        self.version = Some(version);
        self
    }

    pub fn unset_version(&mut self) -> &mut Self {
        self.version = None;
        self
    }

    pub fn ec_level(&mut self, ec_level: ECLevel) -> &mut Self {
        self.ec_level = ec_level;
        self
    }

    pub fn mask(&mut self, mask: MaskPattern) -> &mut Self {
        self.mask = Some(mask);
        self
    }
}

impl QRBuilder<'_> {
    /// Encodes the text, picking the smallest fitting version unless one was
    /// forced and the lowest penalty mask unless one was forced.
    pub fn build(&self) -> QRResult<QR> {
        debug!(version = ?self.version.map(|v| *v), ec_level = ?self.ec_level, "Building QR");
        if self.text.is_empty() {
            return Err(QRError::InvalidInput);
        }
        if self.mask.is_some_and(|m| !m.is_valid()) {
            return Err(QRError::InvalidMaskPattern);
        }

        let (data, version) = match self.version {
            Some(v) if !v.is_valid() => return Err(QRError::InvalidVersion),
            Some(v) => (encode_with_version(self.text, v, self.ec_level)?, v),
            None => encode(self.text, self.ec_level)?,
        };

        let mut payload = BitStream::new(version.total_codewords() << 3);
        payload.extend(&codewords(data.data(), version, self.ec_level));

        let mut qr = QR::new(version, self.ec_level);
        qr.draw_function_patterns();
        qr.draw_encoding_region(&payload);

        let mask = match self.mask {
            Some(m) => {
                qr.apply_mask(m);
                m
            }
            None => apply_best_mask(&mut qr),
        };

        debug!(
            version = *version,
            ec_level = ?self.ec_level,
            mask = *mask,
            dark_modules = qr.count_dark_modules(),
            "QR built"
        );

        Ok(qr)
    }
}

// Codewords
//------------------------------------------------------------------------------

/// Final codeword sequence: data blocks interleaved, then their Reed-Solomon
/// blocks interleaved.
fn codewords(data: &[u8], version: Version, ec_level: ECLevel) -> Vec<u8> {
    let blocks = split_blocks(data, version, ec_level);
    let ecc_len = version.ecc_per_block(ec_level);
    let ecc: Vec<Vec<u8>> = blocks.iter().map(|b| ecc_per_block(b, ecc_len)).collect();

    let mut out = interleave(&blocks);
    out.extend(interleave(&ecc));
    out
}

// Group 1 blocks first, then the group 2 blocks that are one codeword longer
fn split_blocks(data: &[u8], version: Version, ec_level: ECLevel) -> Vec<&[u8]> {
    let (len1, count1, len2, count2) = version.data_codewords_per_block(ec_level);
    debug_assert_eq!(data.len(), len1 * count1 + len2 * count2, "Data does not fill the blocks");

    let (group1, group2) = data.split_at(len1 * count1);
    let mut blocks: Vec<&[u8]> = group1.chunks(len1).collect();
    if len2 > 0 {
        blocks.extend(group2.chunks(len2));
    }
    blocks
}

// Round robin over blocks, shorter blocks drop out once exhausted
fn interleave<T: Copy, V: Deref<Target = [T]>>(blocks: &[V]) -> Vec<T> {
    let longest = blocks.iter().map(|b| b.len()).max().unwrap_or(0);
    (0..longest).flat_map(|i| blocks.iter().filter_map(move |b| b.get(i).copied())).collect()
}
