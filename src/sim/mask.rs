//! Pixel occupancy masks
//!
//! A mask is a `width x height` grid of occupied/empty pixels with its origin
//! at the top-left corner. Overlap tests translate one mask into the other's
//! frame by an integer offset and look for any pixel occupied in both.

use glam::IVec2;

/// Occupancy grid for a sprite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    /// Build a mask by evaluating `occupied(x, y)` for every pixel
    pub fn from_fn(width: u32, height: u32, occupied: impl Fn(u32, u32) -> bool) -> Self {
        let mut bits = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                bits.push(occupied(x, y));
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    /// Fully occupied rectangle
    pub fn filled(width: u32, height: u32) -> Self {
        Self::from_fn(width, height, |_, _| true)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn size(&self) -> IVec2 {
        IVec2::new(self.width as i32, self.height as i32)
    }

    /// Occupancy at a pixel; anything outside the grid is empty
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return false;
        }
        self.bits[(y as u32 * self.width + x as u32) as usize]
    }

    /// Number of occupied pixels
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Mirror top to bottom
    pub fn flipped_vertical(&self) -> Self {
        let h = self.height;
        Self::from_fn(self.width, h, |x, y| self.get(x as i32, (h - 1 - y) as i32))
    }

    /// Rotate counter-clockwise (on screen) by `degrees` about the centre.
    ///
    /// The result grows to the rotated bounding box, so its size differs from
    /// the source for any angle that is not a multiple of 360°.
    pub fn rotated(&self, degrees: f32) -> Self {
        if degrees.rem_euclid(360.0) == 0.0 {
            return self.clone();
        }

        let (sin, cos) = degrees.to_radians().sin_cos();
        let (w, h) = (self.width as f32, self.height as f32);
        // Shave float noise so a quarter turn of 20x4 stays 4x20, not 5x21
        let out_w = (w * cos.abs() + h * sin.abs() - 1e-3).ceil().max(1.0) as u32;
        let out_h = (w * sin.abs() + h * cos.abs() - 1e-3).ceil().max(1.0) as u32;
        let (out_cx, out_cy) = (out_w as f32 / 2.0, out_h as f32 / 2.0);
        let (src_cx, src_cy) = (w / 2.0, h / 2.0);

        // Inverse-map each destination pixel centre into the source grid
        Self::from_fn(out_w, out_h, |x, y| {
            let u = x as f32 + 0.5 - out_cx;
            let v = y as f32 + 0.5 - out_cy;
            let sx = u * cos - v * sin + src_cx;
            let sy = u * sin + v * cos + src_cy;
            self.get(sx.floor() as i32, sy.floor() as i32)
        })
    }

    /// First pixel (in this mask's frame) occupied by both masks, with `other`
    /// placed at `offset` relative to this mask's origin.
    pub fn overlap(&self, other: &Mask, offset: IVec2) -> Option<IVec2> {
        let x_start = offset.x.max(0);
        let y_start = offset.y.max(0);
        let x_end = (offset.x + other.width as i32).min(self.width as i32);
        let y_end = (offset.y + other.height as i32).min(self.height as i32);

        for y in y_start..y_end {
            for x in x_start..x_end {
                if self.get(x, y) && other.get(x - offset.x, y - offset.y) {
                    return Some(IVec2::new(x, y));
                }
            }
        }
        None
    }

    /// Number of pixels occupied by both masks at `offset`
    pub fn overlap_area(&self, other: &Mask, offset: IVec2) -> usize {
        let x_start = offset.x.max(0);
        let y_start = offset.y.max(0);
        let x_end = (offset.x + other.width as i32).min(self.width as i32);
        let y_end = (offset.y + other.height as i32).min(self.height as i32);

        let mut area = 0;
        for y in y_start..y_end {
            for x in x_start..x_end {
                if self.get(x, y) && other.get(x - offset.x, y - offset.y) {
                    area += 1;
                }
            }
        }
        area
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagonal(n: u32) -> Mask {
        Mask::from_fn(n, n, |x, y| x == y)
    }

    #[test]
    fn test_get_outside_is_empty() {
        let mask = Mask::filled(4, 3);
        assert!(mask.get(0, 0));
        assert!(mask.get(3, 2));
        assert!(!mask.get(-1, 0));
        assert!(!mask.get(4, 0));
        assert!(!mask.get(0, 3));
    }

    #[test]
    fn test_overlap_touching_edges() {
        let a = Mask::filled(10, 10);
        let b = Mask::filled(5, 5);

        // Adjacent but not sharing a pixel
        assert_eq!(a.overlap(&b, IVec2::new(10, 0)), None);
        assert_eq!(a.overlap(&b, IVec2::new(0, -5)), None);

        // One shared column
        assert_eq!(a.overlap(&b, IVec2::new(9, 2)), Some(IVec2::new(9, 2)));
        assert_eq!(a.overlap_area(&b, IVec2::new(9, 2)), 5);
    }

    #[test]
    fn test_overlap_is_pixel_exact() {
        // Bounding boxes overlap but the diagonals never share a pixel
        let a = diagonal(8);
        let b = diagonal(8);
        assert!(a.overlap(&b, IVec2::new(1, 0)).is_none());
        assert!(a.overlap(&b, IVec2::new(2, 2)).is_some());
    }

    #[test]
    fn test_flip_vertical() {
        let top_row = Mask::from_fn(3, 4, |_, y| y == 0);
        let flipped = top_row.flipped_vertical();
        assert!(flipped.get(1, 3));
        assert!(!flipped.get(1, 0));
        assert_eq!(flipped.count(), 3);
    }

    #[test]
    fn test_rotate_zero_is_identity() {
        let mask = diagonal(5);
        assert_eq!(mask.rotated(0.0), mask);
        assert_eq!(mask.rotated(360.0), mask);
    }

    #[test]
    fn test_rotate_quarter_turn_swaps_dimensions() {
        let bar = Mask::filled(20, 4);
        let upright = bar.rotated(90.0);
        assert_eq!(upright.width(), 4);
        assert_eq!(upright.height(), 20);
        assert_eq!(upright.count(), bar.count());
    }

    #[test]
    fn test_rotate_grows_bounding_box() {
        let square = Mask::filled(10, 10);
        let tilted = square.rotated(45.0);
        assert!(tilted.width() > 10);
        assert!(tilted.height() > 10);
        // Corners of the bounding box stay empty
        assert!(!tilted.get(0, 0));
        assert!(!tilted.get(tilted.width() as i32 - 1, tilted.height() as i32 - 1));
    }
}
