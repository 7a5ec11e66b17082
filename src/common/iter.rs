use super::metadata::Version;

// Data placement order
//------------------------------------------------------------------------------

/// Every coordinate of the symbol in data placement order: column pairs from
/// the right edge, alternating upwards and downwards, right column first.
/// Column 6 holds the vertical timing line and is skipped. Callers drop the
/// coordinates already taken by function patterns.
pub fn enc_region_coords(version: Version) -> impl Iterator<Item = (i16, i16)> {
    let w = version.width() as i16;
    let rights = (0..)
        .map(move |k| w - 1 - 2 * k)
        .map(|c| if c <= VERT_TIMING_COL { c - 1 } else { c })
        .take_while(|&c| c >= 1);
    rights.enumerate().flat_map(move |(k, right)| {
        (0..w).flat_map(move |i| {
            let r = if k % 2 == 0 { w - 1 - i } else { i };
            [(r, right), (r, right - 1)]
        })
    })
}

const VERT_TIMING_COL: i16 = 6;
