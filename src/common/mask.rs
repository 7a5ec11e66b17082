use std::ops::Deref;

use super::metadata::Color;
use crate::builder::QR;

/// One of the 8 data mask patterns.
#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Hash)]
pub struct MaskPattern(u8);

impl MaskPattern {
    pub fn new(pattern: u8) -> Self {
        debug_assert!(pattern < 8, "Invalid masking pattern");
        Self(pattern)
    }

    pub fn is_valid(&self) -> bool {
        self.0 < 8
    }

    /// Whether the module at row `r`, column `c` is flipped by this pattern.
    pub fn hits(self, r: i16, c: i16) -> bool {
        let (r, c) = (r as i32, c as i32);
        match self.0 & 0b111 {
            0 => (r + c) % 2 == 0,
            1 => r % 2 == 0,
            2 => c % 3 == 0,
            3 => (r + c) % 3 == 0,
            4 => (r / 2 + c / 3) % 2 == 0,
            5 => (r * c) % 2 + (r * c) % 3 == 0,
            6 => ((r * c) % 2 + (r * c) % 3) % 2 == 0,
            _ => ((r + c) % 2 + (r * c) % 3) % 2 == 0,
        }
    }
}

impl Deref for MaskPattern {
    type Target = u8;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// Mask selection
//------------------------------------------------------------------------------

/// Applies every pattern to a copy and keeps the one with the lowest penalty.
/// Ties go to the lower pattern number.
pub fn apply_best_mask(qr: &mut QR) -> MaskPattern {
    let mut best: Option<(u32, QR)> = None;
    for pattern in (0..8).map(MaskPattern) {
        let mut candidate = qr.clone();
        candidate.apply_mask(pattern);
        let score = penalty(&Modules::of(&candidate));
        let better = match &best {
            Some((best_score, _)) => score < *best_score,
            None => true,
        };
        if better {
            best = Some((score, candidate));
        }
    }
    if let Some((_, masked)) = best {
        *qr = masked;
    }
    qr.mask().unwrap_or(MaskPattern(0))
}

// Row-major snapshot of module colors
struct Modules {
    w: usize,
    dark: Vec<bool>,
}

impl Modules {
    fn of(qr: &QR) -> Self {
        let w = qr.width() as i16;
        let dark = (0..w)
            .flat_map(|r| (0..w).map(move |c| (r, c)))
            .map(|(r, c)| qr.color(r, c) == Color::Dark)
            .collect();
        Self { w: w as usize, dark }
    }

    fn at(&self, r: usize, c: usize) -> bool {
        self.dark[r * self.w + c]
    }

    fn rows(&self) -> impl Iterator<Item = Vec<bool>> + '_ {
        self.dark.chunks(self.w).map(<[bool]>::to_vec)
    }

    fn columns(&self) -> impl Iterator<Item = Vec<bool>> + '_ {
        (0..self.w).map(move |c| (0..self.w).map(|r| self.at(r, c)).collect())
    }
}

fn penalty(m: &Modules) -> u32 {
    let lines = m.rows().chain(m.columns());
    let line_pen: u32 = lines.map(|l| run_penalty(&l) + finder_penalty(&l)).sum();
    line_pen + block_penalty(m) + balance_penalty(m)
}

// 3 points for a run of 5 same colored modules, plus 1 for each further module
fn run_penalty(line: &[bool]) -> u32 {
    let mut pen = 0;
    let mut run = 0;
    for (i, &dark) in line.iter().enumerate() {
        run = if i > 0 && line[i - 1] == dark { run + 1 } else { 1 };
        pen += match run {
            5 => 3,
            6.. => 1,
            _ => 0,
        };
    }
    pen
}

// 3 points per 2x2 square of one color, overlaps counted
fn block_penalty(m: &Modules) -> u32 {
    let mut pen = 0;
    for r in 1..m.w {
        for c in 1..m.w {
            let clr = m.at(r, c);
            if m.at(r - 1, c) == clr && m.at(r, c - 1) == clr && m.at(r - 1, c - 1) == clr {
                pen += 3;
            }
        }
    }
    pen
}

// 40 points for every 1:1:3:1:1 finder-like pattern with 4 light modules on either side
fn finder_penalty(line: &[bool]) -> u32 {
    const CORE: [bool; 7] = [true, false, true, true, true, false, true];
    const QUIET: [bool; 4] = [false; 4];

    line.windows(11)
        .filter(|win| {
            (win[..7] == CORE && win[7..] == QUIET) || (win[..4] == QUIET && win[4..] == CORE)
        })
        .count() as u32
        * 40
}

// 10 points for every full 5% the dark ratio deviates from 50%
fn balance_penalty(m: &Modules) -> u32 {
    let dark = m.dark.iter().filter(|&&d| d).count();
    let k = (dark * 20 / m.dark.len()) as i32;
    (k - 10).abs().min((k - 9).abs()) as u32 * 10
}
