use std::cell::RefCell;
use std::rc::Rc;

use cueflow::{
    Canvas, ClearGraph, DrawGraph, ManualClock, NavigationState, NavigatorOpts, SceneId,
    SceneNavigator,
};

fn navigator() -> (SceneNavigator, ManualClock) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let clock = ManualClock::new();
    let nav = SceneNavigator::new(
        Canvas::new(8, 8).unwrap(),
        Box::new(clock.clone()),
        NavigatorOpts::default(),
    )
    .unwrap();
    (nav, clock)
}

fn solid_scene(nav: &mut SceneNavigator, rgba: [u8; 4]) -> SceneId {
    nav.composite_scene(Box::new(move |c| {
        Ok(Box::new(ClearGraph::new(c, rgba)) as Box<dyn DrawGraph>)
    }))
}

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

#[test]
fn default_scene_clears_to_transparent() {
    let (mut nav, _clock) = navigator();
    assert_eq!(nav.current_scene(), Some(nav.default_scene()));

    let buf = nav.render().unwrap();
    assert!(buf.data.iter().all(|&v| v == 0));
}

#[test]
fn start_transition_while_active_is_a_no_op() {
    let (mut nav, clock) = navigator();
    let a = solid_scene(&mut nav, RED);
    let b = solid_scene(&mut nav, BLUE);
    let t = nav.default_transition();

    nav.start_transition(t, a, 1.0).unwrap();
    let state_before = nav.state();
    let stats_before = nav.pool_stats();

    clock.set(0.25);
    nav.start_transition(t, b, 1.0).unwrap();

    assert_eq!(nav.state(), state_before);
    assert_eq!(nav.pool_stats(), stats_before);
    assert_eq!(nav.current_transition_target(), Some(a));
}

#[test]
fn zero_duration_is_an_instant_cut() {
    let (mut nav, _clock) = navigator();
    let a = solid_scene(&mut nav, RED);

    // Counting transition: must never be invoked on an instant cut.
    let calls = Rc::new(RefCell::new(0u32));
    let calls_in = calls.clone();
    let t = nav.transition(Box::new(move |scratch, _s, _t, _p| {
        *calls_in.borrow_mut() += 1;
        scratch.buffer(0)?;
        Ok(0)
    }));

    let stats_before = nav.pool_stats();
    nav.start_transition(t, a, 0.0).unwrap();

    assert_eq!(nav.current_scene(), Some(a));
    assert!(nav.current_transition().is_none());
    assert_eq!(nav.pool_stats(), stats_before);

    let buf = nav.render().unwrap();
    assert_eq!(buf.pixel(0, 0), RED);
    assert_eq!(*calls.borrow(), 0);
}

#[test]
fn negative_duration_also_cuts() {
    let (mut nav, _clock) = navigator();
    let a = solid_scene(&mut nav, BLUE);
    let t = nav.default_transition();

    nav.start_transition(t, a, -1.0).unwrap();
    assert_eq!(nav.current_scene(), Some(a));
}

#[test]
fn progress_is_non_decreasing_and_clamped() {
    let (mut nav, clock) = navigator();
    let a = solid_scene(&mut nav, RED);

    let seen = Rc::new(RefCell::new(Vec::<f64>::new()));
    let seen_in = seen.clone();
    let t = nav.transition(Box::new(move |scratch, source, target, progress| {
        seen_in.borrow_mut().push(progress);
        let out = scratch.buffer(0)?;
        cueflow::render::blend::crossfade_into(out, source, target, progress as f32)?;
        Ok(0)
    }));

    nav.start_transition(t, a, 1.0).unwrap();
    for time in [0.1, 0.4, 0.4, 0.85] {
        clock.set(time);
        nav.render().unwrap();
    }

    let seen = seen.borrow();
    assert_eq!(seen.len(), 4);
    assert!(seen.windows(2).all(|w| w[1] >= w[0]));
    assert!(seen.iter().all(|p| (0.0..=1.0).contains(p)));
}

#[test]
fn completion_edge_renders_target_as_plain_scene() {
    let (mut nav, clock) = navigator();
    let a = solid_scene(&mut nav, RED);
    let t = nav.default_transition();

    nav.start_transition(t, a, 1.0).unwrap();
    clock.set(0.5);
    nav.render().unwrap();

    // First frame at the boundary already collapses before rendering.
    clock.set(1.0);
    let buf = nav.render().unwrap();
    assert_eq!(buf.pixel(4, 4), RED);
    assert_eq!(nav.current_scene(), Some(a));
    assert!(nav.current_transition().is_none());

    // Identical to rendering the target directly as a plain scene.
    let buf = nav.render().unwrap();
    assert_eq!(buf.pixel(4, 4), RED);
}

#[test]
fn crossfade_midpoint_blends_scenes_end_to_end() {
    let (mut nav, clock) = navigator();
    let a = solid_scene(&mut nav, RED);
    let b = solid_scene(&mut nav, BLUE);
    let t = nav.default_transition();

    // Cut to blue, then crossfade blue -> red over one second.
    nav.start_transition(t, b, 0.0).unwrap();
    nav.start_transition(t, a, 1.0).unwrap();

    clock.set(0.5);
    let px = nav.render().unwrap().pixel(3, 3);
    assert!((px[0] as i32 - 128).abs() <= 2, "red channel: {}", px[0]);
    assert!((px[2] as i32 - 128).abs() <= 2, "blue channel: {}", px[2]);
    assert_eq!(px[3], 255);

    clock.set(1.25);
    let px = nav.render().unwrap().pixel(3, 3);
    assert_eq!(px, RED);
    assert_eq!(nav.current_scene(), Some(a));
}

#[test]
fn introspection_during_transition() {
    let (mut nav, _clock) = navigator();
    let source = nav.default_scene();
    let a = solid_scene(&mut nav, RED);
    let t = nav.default_transition();

    nav.start_transition(t, a, 2.0).unwrap();

    assert_eq!(nav.current_scene(), None);
    assert_eq!(nav.current_transition_source(), Some(source));
    assert_eq!(nav.current_transition_target(), Some(a));
    assert_eq!(nav.current_transition(), Some(t));
    assert!(matches!(
        nav.state(),
        NavigationState::PlayingTransition {
            duration_seconds,
            ..
        } if duration_seconds == 2.0
    ));
    assert_eq!(nav.scene_name(source), Some("scene-0"));
    assert_eq!(nav.transition_name(t), Some("transition-0"));
}

#[test]
fn transition_to_playing_scene_is_a_no_op() {
    let (mut nav, _clock) = navigator();
    let t = nav.default_transition();
    let current = nav.default_scene();

    nav.start_transition(t, current, 1.0).unwrap();
    assert_eq!(nav.current_scene(), Some(current));
    assert!(nav.current_transition().is_none());
}

#[test]
fn cancel_transition_reverts_to_source() {
    let (mut nav, clock) = navigator();
    let source = nav.default_scene();
    let a = solid_scene(&mut nav, RED);
    let t = nav.default_transition();

    let stats_before = nav.pool_stats();
    nav.start_transition(t, a, 1.0).unwrap();
    clock.set(0.5);
    nav.render().unwrap();

    nav.cancel_transition();
    assert_eq!(nav.current_scene(), Some(source));
    assert_eq!(nav.pool_stats().in_use, stats_before.in_use);

    // The same transition and target are usable again afterwards.
    nav.start_transition(t, a, 1.0).unwrap();
    clock.set(2.0);
    let px = nav.render().unwrap().pixel(0, 0);
    assert_eq!(px, RED);
}

#[test]
fn cancel_without_transition_is_ignored() {
    let (mut nav, _clock) = navigator();
    let before = nav.state();
    nav.cancel_transition();
    assert_eq!(nav.state(), before);
}
