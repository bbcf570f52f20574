//! Transitions: time-parameterized blends between two scene buffers.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::{debug, warn};

use crate::foundation::error::{CueflowError, CueflowResult};
use crate::foundation::pool::Lease;
use crate::render::blend;
use crate::render::blend::{WipeDir, WipeParams};
use crate::render::target::{ColorBuffer, RenderTarget, TargetPool};

/// Pooled scratch buffers available to a transition function.
///
/// `buffer(index)` lazily acquires from the navigator's pool on the first
/// call per index and memoizes the mapping for the transition's entire
/// active period, so a multi-step blend sees the same buffer every frame
/// rather than a fresh one (which would break any feedback or ping-pong
/// algorithm and could flicker).
pub struct ScratchBuffers<'a> {
    cache: &'a mut HashMap<usize, Lease<RenderTarget>>,
    pool: &'a mut TargetPool,
}

impl ScratchBuffers<'_> {
    /// The scratch buffer at `index`, acquiring it on first use.
    pub fn buffer(&mut self, index: usize) -> CueflowResult<&mut ColorBuffer> {
        let lease = match self.cache.entry(index) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(v) => v.insert(self.pool.acquire_any()?),
        };
        Ok(lease.color_buffer_mut(0))
    }
}

/// A transition's blend function.
///
/// Receives the two scene buffers (read-only: both scenes may be rendered
/// again before the transition ends) and the normalized progress, writes its
/// result into one of its scratch buffers, and returns that buffer's index.
pub type TransitionFn = Box<
    dyn FnMut(&mut ScratchBuffers<'_>, &ColorBuffer, &ColorBuffer, f64) -> CueflowResult<usize>,
>;

/// Linear crossfade, the reference transition (`blend = progress`).
pub fn crossfade() -> TransitionFn {
    Box::new(|scratch, source, target, progress| {
        let out = scratch.buffer(0)?;
        blend::crossfade_into(out, source, target, progress as f32)?;
        Ok(0)
    })
}

/// Directional wipe revealing the target scene, with an optional softened
/// edge (fraction of the swept axis).
pub fn wipe(dir: WipeDir, soft_edge: f32) -> TransitionFn {
    Box::new(move |scratch, source, target, progress| {
        let out = scratch.buffer(0)?;
        blend::wipe_into(
            out,
            source,
            target,
            WipeParams {
                t: progress as f32,
                dir,
                soft_edge,
            },
        )?;
        Ok(0)
    })
}

/// A time-parameterized blend between two scene buffers.
///
/// Idle until the navigator issues `start`; while active it may hold pooled
/// scratch buffers with stable identity, all released again by `finish`.
pub(crate) struct Transition {
    name: String,
    function: TransitionFn,
    cache: HashMap<usize, Lease<RenderTarget>>,
    active: bool,
    output: Option<usize>,
}

impl Transition {
    pub(crate) fn new(name: String, function: TransitionFn) -> Self {
        Self {
            name,
            function,
            cache: HashMap::new(),
            active: false,
            output: None,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn start(&mut self) {
        if self.active {
            warn!(transition = %self.name, "transition already active, skipping start");
            return;
        }
        self.active = true;
        debug!(transition = %self.name, "transition started");
    }

    /// Run the blend function. Valid only while active.
    pub(crate) fn render(
        &mut self,
        source: &ColorBuffer,
        target: &ColorBuffer,
        progress: f64,
        pool: &mut TargetPool,
    ) -> CueflowResult<()> {
        if !self.active {
            return Err(CueflowError::lifecycle(format!(
                "{} rendered outside start..finish",
                self.name
            )));
        }

        let mut scratch = ScratchBuffers {
            cache: &mut self.cache,
            pool,
        };
        let index = (self.function)(&mut scratch, source, target, progress)?;

        if !self.cache.contains_key(&index) {
            return Err(CueflowError::render(format!(
                "{} returned scratch index {index} it never requested",
                self.name
            )));
        }
        self.output = Some(index);
        Ok(())
    }

    /// The scratch buffer selected by the most recent render.
    pub(crate) fn output(&self) -> CueflowResult<&ColorBuffer> {
        let index = self.output.ok_or_else(|| {
            CueflowError::lifecycle(format!("{} has no output before render", self.name))
        })?;
        self.cache
            .get(&index)
            .map(|lease| lease.color_buffer(0))
            .ok_or_else(|| {
                CueflowError::render(format!(
                    "internal error: {} output buffer missing",
                    self.name
                ))
            })
    }

    /// Release every memoized scratch buffer and return to idle.
    pub(crate) fn finish(&mut self, pool: &mut TargetPool) {
        if !self.active {
            warn!(transition = %self.name, "transition not active, skipping finish");
            return;
        }
        for (_, lease) in self.cache.drain() {
            pool.release(lease);
        }
        self.output = None;
        self.active = false;
        debug!(transition = %self.name, "transition finished");
    }
}
