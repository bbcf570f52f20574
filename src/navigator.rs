//! The scene navigator: the per-frame state machine that owns the target
//! pool and every scene and transition.

use tracing::{debug, warn};

use crate::foundation::core::{Canvas, Clock, SceneId, TransitionId};
use crate::foundation::error::{CueflowError, CueflowResult};
use crate::foundation::pool::{Pool, PoolStats};
use crate::render::target::{ColorBuffer, RenderTarget, TargetPool};
use crate::scene::Scene;
use crate::scene::graph::{ClearGraph, DrawGraph, DrawGraphFactory};
use crate::scene::video::VideoPlayerFactory;
use crate::transition::{Transition, TransitionFn, crossfade};

/// Construction options for [`SceneNavigator`].
#[derive(Clone, Copy, Debug)]
pub struct NavigatorOpts {
    /// Premultiplied clear color of the default scene.
    pub default_clear_rgba: [u8; 4],
    /// Render targets created up front; the pool grows past this lazily.
    pub initial_targets: usize,
}

impl Default for NavigatorOpts {
    fn default() -> Self {
        Self {
            default_clear_rgba: [0, 0, 0, 0],
            initial_targets: 4,
        }
    }
}

/// The state of a [`SceneNavigator`]: exactly one scene playing, or exactly
/// one transition between two scenes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NavigationState {
    /// A single scene is playing.
    PlayingScene {
        /// The playing scene.
        scene: SceneId,
    },
    /// A transition between two simultaneously started scenes is playing.
    PlayingTransition {
        /// The scene being transitioned away from.
        source: SceneId,
        /// The scene being transitioned to.
        target: SceneId,
        /// The blending transition.
        transition: TransitionId,
        /// Clock time at which the transition started, in seconds.
        start_time: f64,
        /// Transition length in seconds. Always positive.
        duration_seconds: f64,
    },
}

/// Displays scenes and blends between them with transitions.
///
/// Starts out playing a default scene that clears to
/// [`NavigatorOpts::default_clear_rgba`]. [`start_transition`] blends to a
/// target scene over a duration; during the transition both scenes render
/// every frame. When it completes, the previous scene's resources and the
/// transition's scratch buffers return to the pool.
///
/// Resource usage over a transition:
///
/// ```text
/// scene A    | ----------x
/// scene B    |      x----------
/// transition |      x----x
/// ```
///
/// All operations run synchronously inside the host's per-frame draw
/// callback; time advances only because the host calls [`render`] once per
/// displayed frame.
///
/// [`start_transition`]: SceneNavigator::start_transition
/// [`render`]: SceneNavigator::render
pub struct SceneNavigator {
    canvas: Canvas,
    clock: Box<dyn Clock>,
    pool: TargetPool,
    scenes: Vec<Scene>,
    transitions: Vec<Transition>,
    state: NavigationState,
    default_scene: SceneId,
    default_transition: TransitionId,
}

impl SceneNavigator {
    /// Create a navigator, start its default scene, and pre-warm the target
    /// pool.
    pub fn new(canvas: Canvas, clock: Box<dyn Clock>, opts: NavigatorOpts) -> CueflowResult<Self> {
        let mut pool: TargetPool = Pool::new(
            opts.initial_targets,
            Box::new(move |_| Ok(RenderTarget::new(canvas.width, canvas.height, 1))),
        )?;

        let clear = opts.default_clear_rgba;
        let mut scenes = vec![Scene::composite(
            "scene-0".to_owned(),
            Box::new(move |c| Ok(Box::new(ClearGraph::new(c, clear)) as Box<dyn DrawGraph>)),
        )];
        scenes[0].start(&canvas, &mut pool)?;

        let transitions = vec![Transition::new("transition-0".to_owned(), crossfade())];

        let default_scene = SceneId(0);
        debug!(scene = %scenes[0].name(), "navigator starting on default scene");
        Ok(Self {
            canvas,
            clock,
            pool,
            scenes,
            transitions,
            state: NavigationState::PlayingScene {
                scene: default_scene,
            },
            default_scene,
            default_transition: TransitionId(0),
        })
    }

    /// Create a passive composite scene from a draw-graph factory.
    pub fn composite_scene(&mut self, factory: DrawGraphFactory) -> SceneId {
        let id = SceneId(self.scenes.len() as u32);
        self.scenes.push(Scene::composite(format!("scene-{}", id.0), factory));
        id
    }

    /// Create a passive video scene from a player factory.
    pub fn video_scene(&mut self, factory: VideoPlayerFactory) -> SceneId {
        let id = SceneId(self.scenes.len() as u32);
        self.scenes.push(Scene::video(format!("scene-{}", id.0), factory));
        id
    }

    /// Create a passive transition from a blend function.
    pub fn transition(&mut self, function: TransitionFn) -> TransitionId {
        let id = TransitionId(self.transitions.len() as u32);
        self.transitions
            .push(Transition::new(format!("transition-{}", id.0), function));
        id
    }

    /// The default scene, clearing to the configured color.
    pub fn default_scene(&self) -> SceneId {
        self.default_scene
    }

    /// The default transition, a linear crossfade.
    pub fn default_transition(&self) -> TransitionId {
        self.default_transition
    }

    /// Start a transition to `target` taking `duration_seconds`.
    ///
    /// Ignored (logged, no error) while a transition is already playing or
    /// when `target` is already the playing scene. A non-positive duration
    /// is an instant cut: the current scene finishes, the target starts, and
    /// the transition object is never touched.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn start_transition(
        &mut self,
        transition: TransitionId,
        target: SceneId,
        duration_seconds: f64,
    ) -> CueflowResult<()> {
        let source = match self.state {
            NavigationState::PlayingTransition { .. } => {
                warn!("already playing a transition, ignoring start_transition");
                return Ok(());
            }
            NavigationState::PlayingScene { scene } => scene,
        };

        self.check_scene(target)?;
        self.check_transition(transition)?;

        if target == source {
            warn!("target scene is already playing, ignoring start_transition");
            return Ok(());
        }

        if duration_seconds <= 0.0 {
            debug!(duration_seconds, "non-positive duration, cutting to target scene");
            self.scenes[source.index()].finish(&mut self.pool);
            self.scenes[target.index()].start(&self.canvas, &mut self.pool)?;
            self.set_state(NavigationState::PlayingScene { scene: target });
            return Ok(());
        }

        self.scenes[target.index()].start(&self.canvas, &mut self.pool)?;
        self.transitions[transition.index()].start();
        self.set_state(NavigationState::PlayingTransition {
            source,
            target,
            transition,
            start_time: self.clock.now(),
            duration_seconds,
        });
        Ok(())
    }

    /// Immediately abort a playing transition, reverting to its source
    /// scene. The target scene and the transition release their resources.
    /// Ignored (logged) when no transition is playing.
    pub fn cancel_transition(&mut self) {
        let NavigationState::PlayingTransition {
            source,
            target,
            transition,
            ..
        } = self.state
        else {
            warn!("no transition playing, ignoring cancel_transition");
            return;
        };

        debug!("cancelling transition, reverting to source scene");
        self.scenes[target.index()].finish(&mut self.pool);
        self.transitions[transition.index()].finish(&mut self.pool);
        self.set_state(NavigationState::PlayingScene { scene: source });
    }

    /// Advance the state machine and render the current scene or transition.
    ///
    /// Returns the buffer that was rendered to. The reference is transient:
    /// the next call may overwrite it.
    pub fn render(&mut self) -> CueflowResult<&ColorBuffer> {
        let now = self.clock.now();

        // Completion runs before any rendering, so the first frame past the
        // end is a plain scene frame, never a half-finished transition.
        if let NavigationState::PlayingTransition {
            source,
            target,
            transition,
            start_time,
            duration_seconds,
        } = self.state
            && now >= start_time + duration_seconds
        {
            debug!("transition complete, finishing it and the source scene");
            self.scenes[source.index()].finish(&mut self.pool);
            self.transitions[transition.index()].finish(&mut self.pool);
            self.set_state(NavigationState::PlayingScene { scene: target });
        }

        let canvas = self.canvas;
        match self.state {
            NavigationState::PlayingScene { scene } => {
                self.scenes[scene.index()].render(&canvas)?;
                self.scenes[scene.index()].output()
            }
            NavigationState::PlayingTransition {
                source,
                target,
                transition,
                start_time,
                duration_seconds,
            } => {
                let progress = ((now - start_time) / duration_seconds).clamp(0.0, 1.0);
                // Source renders before target renders before the blend; the
                // blend function sees two fully populated, independent inputs.
                self.scenes[source.index()].render(&canvas)?;
                self.scenes[target.index()].render(&canvas)?;
                let source_buf = self.scenes[source.index()].output()?;
                let target_buf = self.scenes[target.index()].output()?;
                let tr = &mut self.transitions[transition.index()];
                tr.render(source_buf, target_buf, progress, &mut self.pool)?;
                tr.output()
            }
        }
    }

    /// The current navigation state.
    pub fn state(&self) -> NavigationState {
        self.state
    }

    /// The playing scene, when no transition is active.
    pub fn current_scene(&self) -> Option<SceneId> {
        match self.state {
            NavigationState::PlayingScene { scene } => Some(scene),
            NavigationState::PlayingTransition { .. } => None,
        }
    }

    /// The playing transition's source scene, when a transition is active.
    pub fn current_transition_source(&self) -> Option<SceneId> {
        match self.state {
            NavigationState::PlayingScene { .. } => None,
            NavigationState::PlayingTransition { source, .. } => Some(source),
        }
    }

    /// The playing transition's target scene, when a transition is active.
    pub fn current_transition_target(&self) -> Option<SceneId> {
        match self.state {
            NavigationState::PlayingScene { .. } => None,
            NavigationState::PlayingTransition { target, .. } => Some(target),
        }
    }

    /// The playing transition, when one is active.
    pub fn current_transition(&self) -> Option<TransitionId> {
        match self.state {
            NavigationState::PlayingScene { .. } => None,
            NavigationState::PlayingTransition { transition, .. } => Some(transition),
        }
    }

    /// The auto-assigned name of a scene, for logs and overlays.
    pub fn scene_name(&self, id: SceneId) -> Option<&str> {
        self.scenes.get(id.index()).map(Scene::name)
    }

    /// The auto-assigned name of a transition, for logs and overlays.
    pub fn transition_name(&self, id: TransitionId) -> Option<&str> {
        self.transitions.get(id.index()).map(Transition::name)
    }

    /// The canvas every pooled target is sized to.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Occupancy counters of the render-target pool.
    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    fn set_state(&mut self, state: NavigationState) {
        debug!(?state, "navigation state changed");
        self.state = state;
    }

    fn check_scene(&self, id: SceneId) -> CueflowResult<()> {
        if id.index() >= self.scenes.len() {
            return Err(CueflowError::validation(format!(
                "unknown scene id {}",
                id.0
            )));
        }
        Ok(())
    }

    fn check_transition(&self, id: TransitionId) -> CueflowResult<()> {
        if id.index() >= self.transitions.len() {
            return Err(CueflowError::validation(format!(
                "unknown transition id {}",
                id.0
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for SceneNavigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneNavigator")
            .field("canvas", &self.canvas)
            .field("state", &self.state)
            .field("scenes", &self.scenes.len())
            .field("transitions", &self.transitions.len())
            .finish_non_exhaustive()
    }
}
