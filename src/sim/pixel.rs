//! Per-pixel collision detection
//!
//! Two sprites collide only where both have a non-transparent pixel at the
//! same screen coordinate. Bounding boxes are integer rectangles; positions
//! are truncated the same way for every sprite so masks line up exactly.

use glam::Vec2;

/// Axis-aligned integer rectangle (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bounding rectangle of a sprite drawn at `pos` (truncated toward zero)
    pub fn at(pos: Vec2, width: u32, height: u32) -> Self {
        Self::new(pos.x as i32, pos.y as i32, width as i32, height as i32)
    }

    #[inline]
    pub fn left(&self) -> i32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> i32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Overlapping region, or None when the rectangles only touch or are apart
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let top = self.top().max(other.top());
        let bottom = self.bottom().min(other.bottom());
        let left = self.left().max(other.left());
        let right = self.right().min(other.right());

        if bottom <= top || right <= left {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.intersection(other).is_some()
    }
}

/// Per-pixel opacity of a sprite, row-major from the top-left corner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaMask {
    width: u32,
    height: u32,
    alpha: Vec<u8>,
}

impl AlphaMask {
    /// Panics if `alpha` does not hold exactly `width * height` entries
    pub fn new(width: u32, height: u32, alpha: Vec<u8>) -> Self {
        assert_eq!(
            alpha.len(),
            (width * height) as usize,
            "alpha mask must have width * height entries"
        );
        Self {
            width,
            height,
            alpha,
        }
    }

    /// Build a mask by evaluating `f(x, y)` for every pixel
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> u8) -> Self {
        let mut alpha = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                alpha.push(f(x, y));
            }
        }
        Self::new(width, height, alpha)
    }

    pub fn opaque(width: u32, height: u32) -> Self {
        Self::new(width, height, vec![255; (width * height) as usize])
    }

    pub fn transparent(width: u32, height: u32) -> Self {
        Self::new(width, height, vec![0; (width * height) as usize])
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
    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        self.alpha[(x + y * self.width) as usize]
    }

    #[inline]
    pub fn is_opaque_at(&self, x: u32, y: u32) -> bool {
        self.alpha_at(x, y) != 0
    }

    /// Count of non-transparent pixels
    pub fn coverage(&self) -> usize {
        self.alpha.iter().filter(|&&a| a != 0).count()
    }
}

/// Check whether two masked sprites share any non-transparent pixel
///
/// Each rectangle must have the same size as its mask; a mismatch is a
/// caller bug and panics. Cost is bounded by the overlap area.
pub fn pixels_intersect(
    rect_a: Rect,
    mask_a: &AlphaMask,
    rect_b: Rect,
    mask_b: &AlphaMask,
) -> bool {
    assert_mask_fits(&rect_a, mask_a);
    assert_mask_fits(&rect_b, mask_b);

    let Some(overlap) = rect_a.intersection(&rect_b) else {
        return false;
    };

    for y in overlap.top()..overlap.bottom() {
        for x in overlap.left()..overlap.right() {
            let a = mask_a.is_opaque_at((x - rect_a.left()) as u32, (y - rect_a.top()) as u32);
            if a && mask_b.is_opaque_at((x - rect_b.left()) as u32, (y - rect_b.top()) as u32) {
                return true;
            }
        }
    }

    false
}

fn assert_mask_fits(rect: &Rect, mask: &AlphaMask) {
    assert!(
        rect.width == mask.width() as i32 && rect.height == mask.height() as i32,
        "rect {}x{} does not match mask {}x{}",
        rect.width,
        rect.height,
        mask.width(),
        mask.height()
    );
}
