//! CPU compositor
//!
//! Rasterises a `Frame` into an RGBA8 buffer that the GPU presenter uploads
//! as a single texture. Sprites are clipped to the buffer and alpha-blended.

use super::frame::{Color, Frame, SpriteDraw, SpriteKind};
use crate::assets::{Assets, Sprite};

/// Alpha blend a single color channel
#[inline]
fn blend_channel(src: u8, dst: u8, alpha: u16) -> u8 {
    let result = src as u16 * alpha + dst as u16 * (255 - alpha);
    ((result + 1 + (result >> 8)) >> 8) as u8
}

/// Multiply two 0-255 values
#[inline]
fn modulate(a: u8, b: u8) -> u8 {
    ((a as u16 * b as u16 + 127) / 255) as u8
}

/// Sprites the compositor can draw, with mirrored copies prepared once
pub struct SpriteSheet {
    player: Sprite,
    player_flipped: Sprite,
    block: Sprite,
    block_flipped: Sprite,
}

impl SpriteSheet {
    pub fn new(assets: &Assets) -> Self {
        Self {
            player_flipped: assets.player.flipped_horizontal(),
            player: assets.player.clone(),
            block_flipped: assets.block.flipped_horizontal(),
            block: assets.block.clone(),
        }
    }

    pub fn get(&self, kind: SpriteKind, flip: bool) -> &Sprite {
        match (kind, flip) {
            (SpriteKind::Player, false) => &self.player,
            (SpriteKind::Player, true) => &self.player_flipped,
            (SpriteKind::Block, false) => &self.block,
            (SpriteKind::Block, true) => &self.block_flipped,
        }
    }
}

/// RGBA8888 pixel buffer
pub struct FrameBuffer {
    pixels: Vec<Color>,
    width: u32,
    height: u32,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![[0; 4]; (width * height) as usize],
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw bytes, row-major, ready for a texture upload
    pub fn pixels(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Alpha-blend a sprite with its top-left at (x, y), clipped to the buffer
    pub fn blit(&mut self, sprite: &Sprite, x: i32, y: i32, tint: Color) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + sprite.width() as i32).min(self.width as i32);
        let y1 = (y + sprite.height() as i32).min(self.height as i32);

        for dy in y0..y1 {
            for dx in x0..x1 {
                let [r, g, b, a] = sprite.pixel((dx - x) as u32, (dy - y) as u32);
                let alpha = modulate(a, tint[3]);
                if alpha == 0 {
                    continue;
                }
                let src = [
                    modulate(r, tint[0]),
                    modulate(g, tint[1]),
                    modulate(b, tint[2]),
                ];

                let dst = &mut self.pixels[(dy as u32 * self.width + dx as u32) as usize];
                for c in 0..3 {
                    dst[c] = blend_channel(src[c], dst[c], alpha as u16);
                }
                dst[3] = 255;
            }
        }
    }

    /// Clear and draw every sprite in the frame
    pub fn compose(&mut self, frame: &Frame, sheet: &SpriteSheet) {
        self.clear(frame.clear);
        for SpriteDraw {
            sprite,
            pos,
            flip,
            tint,
        } in &frame.draws
        {
            self.blit(sheet.get(*sprite, *flip), pos.x as i32, pos.y as i32, *tint);
        }
    }
}
