use scrollkeeper::platform::viewport::{SimulatedViewport, Viewport};
use scrollkeeper::services::scroll_animator::{ease_out_quint, AnimationStep, ScrollAnimator};

#[test]
fn test_easing_endpoints() {
    assert_eq!(ease_out_quint(0.0), 0.0);
    assert_eq!(ease_out_quint(1.0), 1.0);
    assert!(ease_out_quint(0.5) > 0.9);
}

#[test]
fn test_start_offset_read_at_creation() {
    let mut viewport = SimulatedViewport::new(5000.0, 800.0);
    viewport.user_scroll_to(400.0);

    let animator = ScrollAnimator::start(&viewport, 0.0, 2000.0, 1600, 100);

    assert_eq!(animator.start_y(), 400.0);
    assert_eq!(animator.target_y(), 2000.0);
    assert_eq!(animator.offset_at(100), 400.0);
}

#[test]
fn test_finishes_exactly_on_target() {
    let mut viewport = SimulatedViewport::new(5000.0, 800.0);
    let mut animator = ScrollAnimator::start(&viewport, 0.0, 1234.5, 1600, 0);

    let mut now = 0;
    let mut last = AnimationStep::Running;
    while last == AnimationStep::Running {
        now += 16;
        last = animator.step(&mut viewport, now, false);
    }

    assert_eq!(last, AnimationStep::Finished);
    assert_eq!(now, 1600);
    assert_eq!(viewport.scroll_y(), 1234.5);
}

#[test]
fn test_late_frame_lands_on_target() {
    let mut viewport = SimulatedViewport::new(5000.0, 800.0);
    let mut animator = ScrollAnimator::start(&viewport, 0.0, 900.0, 1600, 0);

    assert_eq!(animator.step(&mut viewport, 5000, false), AnimationStep::Finished);
    assert_eq!(viewport.scroll_y(), 900.0);
}

#[test]
fn test_cancelled_step_writes_nothing() {
    let mut viewport = SimulatedViewport::new(5000.0, 800.0);
    let mut animator = ScrollAnimator::start(&viewport, 0.0, 2000.0, 1600, 0);
    animator.step(&mut viewport, 16, false);
    let before = viewport.scroll_y();
    let writes = viewport.programmatic_scrolls();

    assert_eq!(animator.step(&mut viewport, 32, true), AnimationStep::Cancelled);
    assert_eq!(viewport.scroll_y(), before);
    assert_eq!(viewport.programmatic_scrolls(), writes);
}

#[test]
fn test_zero_duration_jumps() {
    let mut viewport = SimulatedViewport::new(5000.0, 800.0);
    let mut animator = ScrollAnimator::start(&viewport, 0.0, 700.0, 0, 10);
    assert_eq!(animator.progress(10), 1.0);
    assert_eq!(animator.step(&mut viewport, 10, false), AnimationStep::Finished);
    assert_eq!(viewport.scroll_y(), 700.0);
}

#[test]
fn test_offsets_move_monotonically_upward() {
    let mut viewport = SimulatedViewport::new(5000.0, 800.0);
    viewport.user_scroll_to(3000.0);
    let mut animator = ScrollAnimator::start(&viewport, 0.0, 500.0, 1600, 0);

    let mut previous = viewport.scroll_y();
    for frame in 1..=100 {
        animator.step(&mut viewport, frame * 16, false);
        assert!(viewport.scroll_y() <= previous);
        previous = viewport.scroll_y();
    }
    assert_eq!(previous, 500.0);
}
