//! Color buffers and pooled off-screen render targets.

use crate::foundation::pool::Pool;

/// A fixed-size image as **premultiplied** RGBA8 pixels.
///
/// This is the unit scenes and transitions produce and the host consumes.
/// Buffers returned from render calls are transient: they may be overwritten
/// by the next frame.
#[derive(Clone, Debug)]
pub struct ColorBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major, premultiplied alpha.
    pub data: Vec<u8>,
}

impl ColorBuffer {
    /// Create a transparent buffer of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width as usize) * (height as usize) * 4;
        Self {
            width,
            height,
            data: vec![0; len],
        }
    }

    /// Fill every pixel with `rgba` (premultiplied).
    pub fn fill(&mut self, rgba: [u8; 4]) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    /// Read the pixel at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }
}

/// A fixed-size, fixed-format off-screen render target with indexed color
/// attachments.
///
/// Targets are never owned outright by a scene or transition; they are
/// borrowed from the navigator's pool between acquire and release.
#[derive(Debug)]
pub struct RenderTarget {
    attachments: Vec<ColorBuffer>,
}

impl RenderTarget {
    /// Create a target with `attachments` transparent color buffers.
    pub fn new(width: u32, height: u32, attachments: usize) -> Self {
        Self {
            attachments: (0..attachments.max(1))
                .map(|_| ColorBuffer::new(width, height))
                .collect(),
        }
    }

    /// Color attachment at `index`. Panics when out of bounds.
    pub fn color_buffer(&self, index: usize) -> &ColorBuffer {
        &self.attachments[index]
    }

    /// Mutable color attachment at `index`. Panics when out of bounds.
    pub fn color_buffer_mut(&mut self, index: usize) -> &mut ColorBuffer {
        &mut self.attachments[index]
    }
}

/// The navigator's pool of [`RenderTarget`]s.
pub type TargetPool = Pool<RenderTarget>;
