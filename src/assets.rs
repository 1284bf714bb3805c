//! Sprite assets
//!
//! Sprites are decoded once at startup into RGBA8 pixels. The simulation only
//! sees their opacity masks; the renderer blits the pixels.

use anyhow::{Context, ensure};
use image::ImageFormat;

use crate::sim::AlphaMask;

/// Embedded sprite files
const PLAYER_PNG: &[u8] = include_bytes!("../assets/man.png");
const BLOCK_PNG: &[u8] = include_bytes!("../assets/block.png");

/// A decoded RGBA8 image, row-major from the top-left
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Sprite {
    /// Wrap raw RGBA8 pixels
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> anyhow::Result<Self> {
        ensure!(width > 0 && height > 0, "sprite has no pixels ({}x{})", width, height);
        ensure!(
            pixels.len() == (width * height * 4) as usize,
            "expected {} bytes for a {}x{} sprite, got {}",
            width * height * 4,
            width,
            height,
            pixels.len()
        );
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Decode a PNG file
    pub fn decode_png(bytes: &[u8]) -> anyhow::Result<Self> {
        let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)
            .context("decoding PNG sprite")?
            .to_rgba8();
        let (width, height) = image.dimensions();
        Self::from_rgba(width, height, image.into_raw())
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGBA bytes of the pixel at (x, y)
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Per-pixel opacity for collision tests
    pub fn alpha_mask(&self) -> AlphaMask {
        let alpha = self.pixels.chunks_exact(4).map(|px| px[3]).collect();
        AlphaMask::new(self.width, self.height, alpha)
    }

    /// Mirror image around the vertical axis
    pub fn flipped_horizontal(&self) -> Self {
        let row = (self.width * 4) as usize;
        let mut pixels = Vec::with_capacity(self.pixels.len());
        for line in self.pixels.chunks_exact(row) {
            for px in line.chunks_exact(4).rev() {
                pixels.extend_from_slice(px);
            }
        }
        Self {
            width: self.width,
            height: self.height,
            pixels,
        }
    }
}

/// Everything loaded at startup
#[derive(Debug, Clone)]
pub struct Assets {
    pub player: Sprite,
    pub block: Sprite,
}

impl Assets {
    /// Decode the sprites compiled into the binary
    pub fn load_embedded() -> anyhow::Result<Self> {
        let assets = Self::from_png(PLAYER_PNG, BLOCK_PNG)?;
        log::info!(
            "Loaded sprites: player {}x{}, block {}x{}",
            assets.player.width(),
            assets.player.height(),
            assets.block.width(),
            assets.block.height()
        );
        Ok(assets)
    }

    pub fn from_png(player: &[u8], block: &[u8]) -> anyhow::Result<Self> {
        Ok(Self {
            player: Sprite::decode_png(player).context("loading player sprite \"man\"")?,
            block: Sprite::decode_png(block).context("loading block sprite \"block\"")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_sprites_decode() {
        let assets = Assets::load_embedded().unwrap();
        assert_eq!((assets.player.width(), assets.player.height()), (24, 40));
        assert_eq!((assets.block.width(), assets.block.height()), (32, 32));
    }

    #[test]
    fn test_block_has_transparent_corners() {
        let block = Sprite::decode_png(BLOCK_PNG).unwrap();
        let mask = block.alpha_mask();
        assert!(!mask.is_opaque_at(0, 0));
        assert!(!mask.is_opaque_at(31, 31));
        assert!(mask.is_opaque_at(16, 16));
        assert!(mask.coverage() < 32 * 32);
    }

    #[test]
    fn test_player_mask_is_partial() {
        let player = Sprite::decode_png(PLAYER_PNG).unwrap();
        let coverage = player.alpha_mask().coverage();
        assert!(coverage > 0 && coverage < 24 * 40);
    }

    #[test]
    fn test_flip_mirrors_rows() {
        let sprite = Sprite::from_rgba(
            2,
            1,
            vec![
                1, 2, 3, 4, //
                5, 6, 7, 8,
            ],
        )
        .unwrap();
        let flipped = sprite.flipped_horizontal();
        assert_eq!(flipped.pixel(0, 0), [5, 6, 7, 8]);
        assert_eq!(flipped.pixel(1, 0), [1, 2, 3, 4]);
        assert_eq!(flipped.flipped_horizontal(), sprite);
    }

    #[test]
    fn test_player_sprite_is_asymmetric() {
        let player = Sprite::decode_png(PLAYER_PNG).unwrap();
        assert_ne!(player.flipped_horizontal(), player);
    }

    #[test]
    fn test_bad_input_is_an_error() {
        assert!(Sprite::decode_png(b"definitely not a png").is_err());
        assert!(Sprite::from_rgba(2, 2, vec![0; 15]).is_err());
        assert!(Sprite::from_rgba(0, 4, Vec::new()).is_err());
        assert!(Assets::from_png(PLAYER_PNG, &[]).is_err());
    }
}
