use image::{Rgb, RgbImage};

// Module matrix
//------------------------------------------------------------------------------

/// Square grid of modules produced by the encoder, `true` meaning dark.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleMatrix {
    width: usize,
    modules: Vec<bool>,
}

impl ModuleMatrix {
    pub(crate) fn new(width: usize, modules: Vec<bool>) -> Self {
        debug_assert_eq!(modules.len(), width * width, "Module matrix must be square");
        Self { width, modules }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn get(&self, r: usize, c: usize) -> bool {
        self.modules[r * self.width + c]
    }

    pub fn modules(&self) -> &[bool] {
        &self.modules
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.modules.chunks_exact(self.width)
    }

    /// Rasterizes the matrix with `module_sz` pixels per module.
    pub fn render(&self, module_sz: u32, dark: Rgb<u8>, light: Rgb<u8>) -> RgbImage {
        let total_sz = self.width as u32 * module_sz;
        RgbImage::from_fn(total_sz, total_sz, |x, y| {
            let r = (y / module_sz) as usize;
            let c = (x / module_sz) as usize;
            if self.get(r, c) {
                dark
            } else {
                light
            }
        })
    }
}

#[cfg(test)]
mod module_matrix_tests {
    use image::Rgb;

    use super::ModuleMatrix;

    #[test]
    fn test_render_colors() {
        let matrix = ModuleMatrix::new(2, vec![true, false, false, true]);
        let dark = Rgb([10, 20, 30]);
        let light = Rgb([250, 240, 230]);
        let img = matrix.render(4, dark, light);
        assert_eq!(img.dimensions(), (8, 8));
        assert_eq!(*img.get_pixel(0, 0), dark);
        assert_eq!(*img.get_pixel(7, 0), light);
        assert_eq!(*img.get_pixel(3, 4), light);
        assert_eq!(*img.get_pixel(7, 7), dark);
    }

    #[test]
    fn test_rows() {
        let matrix = ModuleMatrix::new(2, vec![true, false, false, true]);
        let rows: Vec<_> = matrix.rows().collect();
        assert_eq!(rows, vec![&[true, false][..], &[false, true][..]]);
    }
}
