//! The draw-graph collaborator backing composite scenes.

use crate::foundation::core::Canvas;
use crate::foundation::error::CueflowResult;
use crate::render::target::ColorBuffer;

/// An externally supplied draw graph that owns its result buffer.
///
/// Composite scenes execute one of these per frame. The engine treats the
/// graph opaquely: errors raised inside `draw` propagate unmodified.
pub trait DrawGraph {
    /// Execute the graph for the current frame.
    fn draw(&mut self, canvas: &Canvas) -> CueflowResult<()>;

    /// The buffer produced by the most recent [`draw`](DrawGraph::draw).
    fn result(&self) -> &ColorBuffer;
}

/// Factory building a [`DrawGraph`] when its scene starts. Called once per
/// `start`; the graph is dropped again on `finish`, so a restarted scene gets
/// a fresh graph.
pub type DrawGraphFactory = Box<dyn FnMut(&Canvas) -> CueflowResult<Box<dyn DrawGraph>>>;

/// The simplest [`DrawGraph`]: fills its result buffer with one constant
/// premultiplied color. Backs the navigator's default scene.
#[derive(Debug)]
pub struct ClearGraph {
    color: [u8; 4],
    buffer: ColorBuffer,
}

impl ClearGraph {
    /// Create a graph clearing to `color` at canvas size.
    pub fn new(canvas: &Canvas, color: [u8; 4]) -> Self {
        Self {
            color,
            buffer: ColorBuffer::new(canvas.width, canvas.height),
        }
    }
}

impl DrawGraph for ClearGraph {
    fn draw(&mut self, _canvas: &Canvas) -> CueflowResult<()> {
        self.buffer.fill(self.color);
        Ok(())
    }

    fn result(&self) -> &ColorBuffer {
        &self.buffer
    }
}
