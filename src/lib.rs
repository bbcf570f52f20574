//! Cueflow is a scene and transition orchestration engine for real-time
//! visuals.
//!
//! A [`SceneNavigator`] renders one of several interchangeable scenes per
//! frame and blends between them with pluggable transition functions, while
//! a fixed pool of off-screen render targets is recycled so steady-state
//! rendering performs no buffer allocation. Content is injected: composite
//! scenes wrap a [`DrawGraph`], video scenes wrap a [`VideoPlayer`], and a
//! [`Clock`] supplies time.
//!
//! - Create scenes and transitions through the navigator
//! - Call [`SceneNavigator::start_transition`] to blend to another scene
//! - Call [`SceneNavigator::render`] once per displayed frame and draw the
//!   returned buffer
//!
//! The engine is single-threaded and frame-synchronous: nothing blocks,
//! nothing runs in the background, and time only advances because the host
//! calls `render`.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;
mod navigator;
/// Render-target buffers and pixel blend operations.
pub mod render;
/// Scene collaborator traits and implementations.
pub mod scene;
mod transition;

pub use crate::foundation::core::{
    Canvas, Clock, ManualClock, MonotonicClock, SceneId, TransitionId,
};
pub use crate::foundation::error::{CueflowError, CueflowResult};
pub use crate::foundation::pool::{Lease, Pool, PoolFactory, PoolStats};
pub use crate::navigator::{NavigationState, NavigatorOpts, SceneNavigator};
pub use crate::render::blend::{PremulRgba8, WipeDir, WipeParams};
pub use crate::render::target::{ColorBuffer, RenderTarget, TargetPool};
pub use crate::scene::graph::{ClearGraph, DrawGraph, DrawGraphFactory};
pub use crate::scene::video::{VideoPlayer, VideoPlayerFactory};
pub use crate::transition::{ScratchBuffers, TransitionFn, crossfade, wipe};
