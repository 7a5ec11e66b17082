use image::{GrayImage, Luma};

use crate::common::{
    bit_utils::BitStream,
    iter::enc_region_coords,
    mask::MaskPattern,
    metadata::{format_info, Color, ECLevel, Version, QUIET_ZONE_SIZE},
};
use crate::render::ModuleMatrix;

/// A module of the symbol under construction. Function and info modules are
/// fixed before data placement and are never masked.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum Module {
    Unset,
    Function(Color),
    Info(Color),
    Data(Color),
}

impl Module {
    pub(crate) fn color(self) -> Color {
        match self {
            Module::Unset => Color::Light,
            Module::Function(c) | Module::Info(c) | Module::Data(c) => c,
        }
    }
}

/// An encoded QR symbol, without quiet zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QR {
    grid: Vec<Module>,
    width: usize,
    version: Version,
    ec_level: ECLevel,
    mask: Option<MaskPattern>,
}

impl QR {
    pub(crate) fn new(version: Version, ec_level: ECLevel) -> Self {
        debug_assert!(version.is_valid(), "Invalid version");

        let width = version.width();
        Self { grid: vec![Module::Unset; width * width], width, version, ec_level, mask: None }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn ec_level(&self) -> ECLevel {
        self.ec_level
    }

    pub fn mask(&self) -> Option<MaskPattern> {
        self.mask
    }

    pub(crate) fn count_dark_modules(&self) -> usize {
        self.grid.iter().filter(|m| m.color() == Color::Dark).count()
    }

    // Negative coordinates count from the bottom or right edge
    fn index(&self, r: i16, c: i16) -> usize {
        let w = self.width as i16;
        debug_assert!(-w <= r && r < w, "Row {r} outside symbol of width {w}");
        debug_assert!(-w <= c && c < w, "Column {c} outside symbol of width {w}");

        let r = if r < 0 { r + w } else { r };
        let c = if c < 0 { c + w } else { c };
        (r * w + c) as usize
    }

    pub(crate) fn get(&self, r: i16, c: i16) -> Module {
        self.grid[self.index(r, c)]
    }

    pub(crate) fn color(&self, r: i16, c: i16) -> Color {
        self.get(r, c).color()
    }

    pub(crate) fn set(&mut self, r: i16, c: i16, module: Module) {
        let i = self.index(r, c);
        self.grid[i] = module;
    }
}

// Function patterns
//------------------------------------------------------------------------------

impl QR {
    /// Finders with their separators, alignment patterns, timing lines and
    /// the dark module, in that order.
    pub(crate) fn draw_function_patterns(&mut self) {
        let far = self.width as i16 - 4;
        for (r, c) in [(3, 3), (3, far), (far, 3)] {
            self.draw_finder(r, c);
        }
        self.draw_alignment_patterns();
        self.draw_timing_lines();
        self.set(-8, 8, Module::Function(Color::Dark));
    }

    // Rings by distance from the center: dark core, light ring, dark border,
    // then the light separator where it fits inside the symbol
    fn draw_finder(&mut self, r: i16, c: i16) {
        let w = self.width as i16;
        for i in r - 4..=r + 4 {
            for j in c - 4..=c + 4 {
                if !(0..w).contains(&i) || !(0..w).contains(&j) {
                    continue;
                }
                let ring = (i - r).abs().max((j - c).abs());
                self.set(i, j, Module::Function(Color::from(ring != 2 && ring != 4)));
            }
        }
    }

    // Centers already covered by a finder are skipped
    fn draw_alignment_patterns(&mut self) {
        let centers = self.version.alignment_pattern();
        for &r in centers {
            for &c in centers {
                if self.get(r, c) != Module::Unset {
                    continue;
                }
                for i in r - 2..=r + 2 {
                    for j in c - 2..=c + 2 {
                        let ring = (i - r).abs().max((j - c).abs());
                        self.set(i, j, Module::Function(Color::from(ring != 1)));
                    }
                }
            }
        }
    }

    fn draw_timing_lines(&mut self) {
        let w = self.width as i16;
        for k in 8..w - 8 {
            let clr = Color::from(k & 1 == 0);
            if self.get(6, k) == Module::Unset {
                self.set(6, k, Module::Function(clr));
            }
            if self.get(k, 6) == Module::Unset {
                self.set(k, 6, Module::Function(clr));
            }
        }
    }
}


// Format & version info
//------------------------------------------------------------------------------

// Most significant bit first, around the top left finder
fn format_coords_main() -> [(i16, i16); 15] {
    std::array::from_fn(|i| {
        let i = i as i16;
        match i {
            0..=5 => (8, i),
            6 => (8, 7),
            7 => (8, 8),
            8 => (7, 8),
            _ => (14 - i, 8),
        }
    })
}

// Most significant bit first, split below the top right and right of the
// bottom left finder
fn format_coords_side() -> [(i16, i16); 15] {
    std::array::from_fn(|i| {
        let i = i as i16;
        if i < 7 {
            (-1 - i, 8)
        } else {
            (8, i - 15)
        }
    })
}

// 6x3 block above the bottom left finder, most significant bit first
fn version_coords_bottom_left() -> [(i16, i16); 18] {
    std::array::from_fn(|i| {
        let k = 17 - i as i16;
        (-11 + k % 3, k / 3)
    })
}

fn version_coords_top_right() -> [(i16, i16); 18] {
    version_coords_bottom_left().map(|(r, c)| (c, r))
}

impl QR {
    pub(crate) fn reserve_format_area(&mut self) {
        self.draw_format_info(0);
    }

    fn draw_format_info(&mut self, info: u32) {
        self.place_bits(info, &format_coords_main());
        self.place_bits(info, &format_coords_side());
    }

    pub(crate) fn draw_version_info(&mut self) {
        if *self.version < 7 {
            return;
        }
        let info = self.version.info();
        self.place_bits(info, &version_coords_bottom_left());
        self.place_bits(info, &version_coords_top_right());
    }

    fn place_bits(&mut self, value: u32, coords: &[(i16, i16)]) {
        let n = coords.len();
        for (i, &(r, c)) in coords.iter().enumerate() {
            let dark = (value >> (n - 1 - i)) & 1 == 1;
            self.set(r, c, Module::Info(Color::from(dark)));
        }
    }

    fn read_bits(&self, coords: &[(i16, i16)]) -> u32 {
        coords.iter().fold(0, |n, &(r, c)| (n << 1) | (self.color(r, c) == Color::Dark) as u32)
    }

    /// Format info read back from the placement around the top left finder
    /// and the split placement near the other two.
    pub fn format_info(&self) -> (u32, u32) {
        (self.read_bits(&format_coords_main()), self.read_bits(&format_coords_side()))
    }

    /// Version info read back from the bottom left and top right blocks.
    /// `None` below version 7.
    pub fn version_info(&self) -> Option<(u32, u32)> {
        if *self.version < 7 {
            return None;
        }
        Some((
            self.read_bits(&version_coords_bottom_left()),
            self.read_bits(&version_coords_top_right()),
        ))
    }
}


// Encoding region
//------------------------------------------------------------------------------

impl QR {
    /// Reserves the info areas and fills every remaining module with the
    /// payload, padding the remainder bits light.
    pub(crate) fn draw_encoding_region(&mut self, payload: &BitStream) {
        self.reserve_format_area();
        self.draw_version_info();

        let free: Vec<_> = enc_region_coords(self.version)
            .filter(|&(r, c)| self.get(r, c) == Module::Unset)
            .collect();
        debug_assert!(free.len() >= payload.len(), "Payload exceeds the encoding region");

        let bits = payload.bits().chain(std::iter::repeat(false));
        for ((r, c), bit) in free.into_iter().zip(bits) {
            self.set(r, c, Module::Data(Color::from(bit)));
        }
    }

    /// Flips the data modules selected by `pattern` and writes the matching
    /// format info.
    pub(crate) fn apply_mask(&mut self, pattern: MaskPattern) {
        let w = self.width as i16;
        for r in 0..w {
            for c in 0..w {
                if let Module::Data(clr) = self.get(r, c) {
                    if pattern.hits(r, c) {
                        self.set(r, c, Module::Data(!clr));
                    }
                }
            }
        }
        self.mask = Some(pattern);
        self.draw_format_info(format_info(self.ec_level, pattern));
    }
}

#[cfg(test)]
mod encoding_region_tests {
    use super::{Module, QR};
    use crate::builder::QRBuilder;
    use crate::common::{
        bit_utils::BitStream,
        mask::MaskPattern,
        metadata::{format_info, Color, ECLevel, Version},
    };

    #[test]
    fn test_payload_fills_region() {
        let ver = Version::new(2);
        let mut payload = BitStream::new(ver.total_codewords() * 8);
        payload.extend(&vec![0xFF; ver.total_codewords()]);

        let mut qr = QR::new(ver, ECLevel::L);
        qr.draw_function_patterns();
        qr.draw_encoding_region(&payload);

        assert!(!qr.grid.contains(&Module::Unset));
        let dark = qr.grid.iter().filter(|m| **m == Module::Data(Color::Dark)).count();
        let light = qr.grid.iter().filter(|m| **m == Module::Data(Color::Light)).count();
        assert_eq!(dark, ver.total_codewords() * 8);
        assert_eq!(light, ver.remainder_bits());
        // Placement starts at the bottom right corner
        assert_eq!(qr.get(-1, -1), Module::Data(Color::Dark));
    }

    #[test]
    fn test_mask_leaves_function_modules() {
        let mut plain = QRBuilder::new("HELLO WORLD").ec_level(ECLevel::Q).build().unwrap();
        let mask = plain.mask().unwrap();
        // Masking twice with the same pattern restores the data modules
        plain.apply_mask(mask);
        let mut masked = plain.clone();
        masked.apply_mask(MaskPattern::new(2));

        for (a, b) in plain.grid.iter().zip(masked.grid.iter()) {
            match (a, b) {
                (Module::Function(x), Module::Function(y)) => assert_eq!(x, y),
                (Module::Data(_), Module::Data(_)) | (Module::Info(_), Module::Info(_)) => {}
                _ => panic!("Module kind changed by masking"),
            }
        }
        let exp = format_info(ECLevel::Q, MaskPattern::new(2));
        assert_eq!(masked.format_info(), (exp, exp));
    }

    #[test]
    fn test_hello_world_q_picks_mask_6() {
        let qr = QRBuilder::new("HELLO WORLD").ec_level(ECLevel::Q).build().unwrap();
        assert_eq!(qr.version(), Version::new(1));
        assert_eq!(qr.mask(), Some(MaskPattern::new(6)));
        let exp = format_info(ECLevel::Q, MaskPattern::new(6));
        assert_eq!(qr.format_info(), (exp, exp));
    }
}

// Render
//------------------------------------------------------------------------------

impl QR {
    /// Grayscale image with `module_sz` pixels per module, quiet zone included.
    pub fn render(&self, module_sz: u32) -> GrayImage {
        let matrix = self.to_matrix(true);
        let total_sz = matrix.width() as u32 * module_sz;
        GrayImage::from_fn(total_sz, total_sz, |x, y| {
            let dark = matrix.get((y / module_sz) as usize, (x / module_sz) as usize);
            Luma([if dark { 0 } else { 255 }])
        })
    }

    /// Text rendering for terminals with light text on a dark background:
    /// light modules print as blocks.
    pub fn to_str(&self, module_sz: usize) -> String {
        let matrix = self.to_matrix(true);
        let mut canvas = String::with_capacity(matrix.width() * module_sz * (matrix.width() * module_sz + 1) * 3);
        for row in matrix.rows() {
            let line: String = row
                .iter()
                .flat_map(|&dark| std::iter::repeat(if dark { ' ' } else { '█' }).take(module_sz))
                .collect();
            for _ in 0..module_sz {
                canvas.push_str(&line);
                canvas.push('\n');
            }
        }
        canvas
    }

    pub fn to_matrix(&self, quiet_zone: bool) -> ModuleMatrix {
        let qz = if quiet_zone { QUIET_ZONE_SIZE } else { 0 };
        let width = self.width + 2 * qz;
        let mut modules = vec![false; width * width];
        for (i, module) in self.grid.iter().enumerate() {
            let (r, c) = (i / self.width, i % self.width);
            modules[(r + qz) * width + c + qz] = module.color() == Color::Dark;
        }
        ModuleMatrix::new(width, modules)
    }
}
