//! Scenes: renderable units with an explicit start/render/finish lifecycle.

pub mod graph;
pub mod video;

use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::foundation::core::Canvas;
use crate::foundation::error::{CueflowError, CueflowResult};
use crate::foundation::pool::Lease;
use crate::render::target::{ColorBuffer, RenderTarget, TargetPool};
use crate::scene::graph::{DrawGraph, DrawGraphFactory};
use crate::scene::video::{VideoPlayer, VideoPlayerFactory};

/// A renderable unit producing one buffer per frame once started.
///
/// Scenes are passive until the navigator issues `start`, and hold exactly
/// their declared number of pooled targets while started. `finish` releases
/// everything and leaves the scene restartable.
pub(crate) struct Scene {
    name: String,
    kind: SceneKind,
    started: bool,
    targets: SmallVec<[Lease<RenderTarget>; 1]>,
}

enum SceneKind {
    Composite {
        factory: DrawGraphFactory,
        graph: Option<Box<dyn DrawGraph>>,
    },
    Video {
        factory: VideoPlayerFactory,
        player: Option<Box<dyn VideoPlayer>>,
    },
}

impl Scene {
    pub(crate) fn composite(name: String, factory: DrawGraphFactory) -> Self {
        Self {
            name,
            kind: SceneKind::Composite {
                factory,
                graph: None,
            },
            started: false,
            targets: SmallVec::new(),
        }
    }

    pub(crate) fn video(name: String, factory: VideoPlayerFactory) -> Self {
        Self {
            name,
            kind: SceneKind::Video {
                factory,
                player: None,
            },
            started: false,
            targets: SmallVec::new(),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Pooled targets this scene holds while started. Fixed per kind.
    pub(crate) fn used_render_targets(&self) -> usize {
        match self.kind {
            SceneKind::Composite { .. } => 0,
            SceneKind::Video { .. } => 1,
        }
    }

    /// Build collaborators and acquire pooled targets.
    pub(crate) fn start(&mut self, canvas: &Canvas, pool: &mut TargetPool) -> CueflowResult<()> {
        if self.started {
            warn!(scene = %self.name, "scene already started, skipping start");
            return Ok(());
        }

        match &mut self.kind {
            SceneKind::Composite { factory, graph } => {
                *graph = Some(factory(canvas)?);
            }
            SceneKind::Video { factory, player } => {
                let mut p = factory()?;
                p.play()?;
                *player = Some(p);
            }
        }

        for _ in 0..self.used_render_targets() {
            match pool.acquire_any() {
                Ok(lease) => self.targets.push(lease),
                Err(e) => {
                    // Hand back anything already borrowed before bailing.
                    for lease in self.targets.drain(..) {
                        pool.release(lease);
                    }
                    return Err(e);
                }
            }
        }

        self.started = true;
        debug!(scene = %self.name, "scene started");
        Ok(())
    }

    /// Produce this frame's output. Valid only while started.
    pub(crate) fn render(&mut self, canvas: &Canvas) -> CueflowResult<()> {
        if !self.started {
            return Err(CueflowError::lifecycle(format!(
                "{} rendered outside start..finish",
                self.name
            )));
        }

        match &mut self.kind {
            SceneKind::Composite { graph, .. } => {
                let graph = graph.as_mut().ok_or_else(|| {
                    CueflowError::lifecycle(format!("{} has no draw graph", self.name))
                })?;
                graph.draw(canvas)
            }
            SceneKind::Video { player, .. } => {
                let player = player.as_mut().ok_or_else(|| {
                    CueflowError::lifecycle(format!("{} has no video player", self.name))
                })?;
                // Poll-based looping: restart before drawing once the stream
                // reports its end.
                if player.ended() {
                    player.restart()?;
                }
                let target = self.targets.first_mut().ok_or_else(|| {
                    CueflowError::lifecycle(format!("{} holds no render target", self.name))
                })?;
                player.draw(canvas, target)
            }
        }
    }

    /// Read-only view of the most recent render result. Transient: the next
    /// frame may overwrite it.
    pub(crate) fn output(&self) -> CueflowResult<&ColorBuffer> {
        match &self.kind {
            SceneKind::Composite { graph, .. } => graph
                .as_ref()
                .map(|g| g.result())
                .ok_or_else(|| CueflowError::lifecycle(format!("{} is not started", self.name))),
            SceneKind::Video { .. } => self
                .targets
                .first()
                .map(|t| t.color_buffer(0))
                .ok_or_else(|| CueflowError::lifecycle(format!("{} is not started", self.name))),
        }
    }

    /// Drop collaborators and release all pooled targets. The scene can be
    /// started again afterwards.
    pub(crate) fn finish(&mut self, pool: &mut TargetPool) {
        if !self.started {
            warn!(scene = %self.name, "scene not started, skipping finish");
            return;
        }

        match &mut self.kind {
            SceneKind::Composite { graph, .. } => {
                *graph = None;
            }
            SceneKind::Video { player, .. } => {
                if let Some(mut p) = player.take() {
                    p.dispose();
                }
            }
        }

        for lease in self.targets.drain(..) {
            pool.release(lease);
        }

        self.started = false;
        debug!(scene = %self.name, "scene finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::pool::Pool;
    use crate::scene::graph::ClearGraph;
    use std::cell::Cell;
    use std::rc::Rc;

    fn canvas() -> Canvas {
        Canvas::new(8, 8).unwrap()
    }

    fn target_pool(initial: usize) -> TargetPool {
        Pool::new(initial, Box::new(|_| Ok(RenderTarget::new(8, 8, 1)))).unwrap()
    }

    fn clear_scene(rgba: [u8; 4]) -> Scene {
        Scene::composite(
            "scene-0".to_owned(),
            Box::new(move |c| Ok(Box::new(ClearGraph::new(c, rgba)) as Box<dyn DrawGraph>)),
        )
    }

    struct FakePlayer {
        draws: u32,
        end_after: u32,
        restarts: Rc<Cell<u32>>,
        disposed: Rc<Cell<bool>>,
    }

    impl VideoPlayer for FakePlayer {
        fn play(&mut self) -> CueflowResult<()> {
            Ok(())
        }

        fn draw(&mut self, _canvas: &Canvas, target: &mut RenderTarget) -> CueflowResult<()> {
            self.draws += 1;
            target.color_buffer_mut(0).fill([0, 0, 0, 255]);
            Ok(())
        }

        fn restart(&mut self) -> CueflowResult<()> {
            self.draws = 0;
            self.restarts.set(self.restarts.get() + 1);
            Ok(())
        }

        fn ended(&self) -> bool {
            self.draws >= self.end_after
        }

        fn dispose(&mut self) {
            self.disposed.set(true);
        }
    }

    fn video_scene(
        end_after: u32,
        restarts: Rc<Cell<u32>>,
        disposed: Rc<Cell<bool>>,
    ) -> Scene {
        Scene::video(
            "scene-1".to_owned(),
            Box::new(move || {
                Ok(Box::new(FakePlayer {
                    draws: 0,
                    end_after,
                    restarts: restarts.clone(),
                    disposed: disposed.clone(),
                }) as Box<dyn VideoPlayer>)
            }),
        )
    }

    #[test]
    fn composite_lifecycle_holds_zero_targets() {
        let canvas = canvas();
        let mut pool = target_pool(2);
        let free_before = pool.stats().free;

        let mut scene = clear_scene([255, 0, 0, 255]);
        scene.start(&canvas, &mut pool).unwrap();
        assert_eq!(pool.stats().free, free_before);
        scene.render(&canvas).unwrap();
        assert_eq!(scene.output().unwrap().pixel(0, 0), [255, 0, 0, 255]);
        scene.finish(&mut pool);
        assert_eq!(pool.stats().free, free_before);
    }

    #[test]
    fn video_lifecycle_borrows_and_returns_one_target() {
        let canvas = canvas();
        let mut pool = target_pool(2);
        let free_before = pool.stats().free;
        let restarts = Rc::new(Cell::new(0));
        let disposed = Rc::new(Cell::new(false));

        let mut scene = video_scene(100, restarts, disposed.clone());
        scene.start(&canvas, &mut pool).unwrap();
        assert_eq!(pool.stats().in_use, 1);
        scene.render(&canvas).unwrap();
        scene.finish(&mut pool);
        assert_eq!(pool.stats().free, free_before);
        assert!(disposed.get());
    }

    #[test]
    fn video_restarts_after_stream_ends() {
        let canvas = canvas();
        let mut pool = target_pool(1);
        let restarts = Rc::new(Cell::new(0));

        let mut scene = video_scene(2, restarts.clone(), Rc::new(Cell::new(false)));
        scene.start(&canvas, &mut pool).unwrap();
        for _ in 0..3 {
            scene.render(&canvas).unwrap();
        }
        assert_eq!(restarts.get(), 1);
        scene.finish(&mut pool);
    }

    #[test]
    fn render_outside_lifecycle_is_an_error() {
        let canvas = canvas();
        let mut pool = target_pool(1);
        let mut scene = clear_scene([0, 0, 0, 0]);

        assert!(scene.render(&canvas).is_err());
        scene.start(&canvas, &mut pool).unwrap();
        scene.finish(&mut pool);
        assert!(scene.render(&canvas).is_err());
    }

    #[test]
    fn double_start_and_finish_are_skipped() {
        let canvas = canvas();
        let mut pool = target_pool(1);
        let restarts = Rc::new(Cell::new(0));
        let disposed = Rc::new(Cell::new(false));

        let mut scene = video_scene(100, restarts, disposed);
        scene.start(&canvas, &mut pool).unwrap();
        scene.start(&canvas, &mut pool).unwrap();
        assert_eq!(pool.stats().in_use, 1);
        scene.finish(&mut pool);
        scene.finish(&mut pool);
        assert_eq!(pool.stats().in_use, 0);
    }

    #[test]
    fn finished_scene_can_restart() {
        let canvas = canvas();
        let mut pool = target_pool(1);
        let mut scene = clear_scene([0, 0, 255, 255]);

        scene.start(&canvas, &mut pool).unwrap();
        scene.finish(&mut pool);
        scene.start(&canvas, &mut pool).unwrap();
        scene.render(&canvas).unwrap();
        assert_eq!(scene.output().unwrap().pixel(1, 1), [0, 0, 255, 255]);
        scene.finish(&mut pool);
    }
}
