//! The video-player collaborator backing video scenes.

use crate::foundation::core::Canvas;
use crate::foundation::error::CueflowResult;
use crate::render::target::RenderTarget;

/// A video-stream player abstraction injected into video scenes.
///
/// The engine owns playback lifecycle but not decoding: decode errors
/// surface from `draw` and propagate to the host loop unmodified.
pub trait VideoPlayer {
    /// Begin playback.
    fn play(&mut self) -> CueflowResult<()>;

    /// Draw the current frame into the target's primary color buffer.
    ///
    /// The target is canvas-sized; the player is responsible for fitting its
    /// decoded frame into it.
    fn draw(&mut self, canvas: &Canvas, target: &mut RenderTarget) -> CueflowResult<()>;

    /// Seek back to the beginning and resume playback.
    fn restart(&mut self) -> CueflowResult<()>;

    /// True once the stream has reached its end. A stream that never reports
    /// this simply never loops.
    fn ended(&self) -> bool;

    /// Stop playback and free decoder resources.
    fn dispose(&mut self);
}

/// Factory building a [`VideoPlayer`] when its scene starts. Called once per
/// `start`; the player is disposed and dropped on `finish`.
pub type VideoPlayerFactory = Box<dyn FnMut() -> CueflowResult<Box<dyn VideoPlayer>>>;
