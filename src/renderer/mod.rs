//! Rendering module
//!
//! The frame is described and composited on the CPU, then presented through
//! WebGPU as a single texture.

pub mod frame;
pub mod framebuffer;
pub mod pipeline;

pub use frame::{Frame, SpriteDraw, SpriteKind, build_frame, colors, score_lines};
pub use framebuffer::{FrameBuffer, SpriteSheet};
pub use pipeline::RenderState;
