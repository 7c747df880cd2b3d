use layer_cake::flow::{LoopPhase, LoopState};

#[test]
fn should_start_suspended() {
    let state = LoopState::new();
    assert_eq!(state.phase(), LoopPhase::Suspended);
    assert!(!state.is_running());
}

#[test]
fn should_follow_resume_and_suspend() {
    let mut state = LoopState::new();
    assert_eq!(state.resumed(), LoopPhase::Running);
    assert_eq!(state.suspended(), LoopPhase::Suspended);
    assert_eq!(state.resumed(), LoopPhase::Running);
}

#[test]
fn should_pause_while_occluded() {
    let mut state = LoopState::new();
    state.resumed();
    assert_eq!(state.occluded(true), LoopPhase::Suspended);
    assert_eq!(state.occluded(false), LoopPhase::Running);
}

#[test]
fn should_pause_while_minimized() {
    let mut state = LoopState::new();
    state.resumed();
    assert_eq!(state.resized(0, 0), LoopPhase::Suspended);
    assert_eq!(state.resized(800, 0), LoopPhase::Suspended);
    assert_eq!(state.resized(800, 600), LoopPhase::Running);
}

#[test]
fn should_need_every_condition_to_run() {
    let mut state = LoopState::new();
    state.occluded(true);
    state.resized(0, 0);
    assert_eq!(state.resumed(), LoopPhase::Suspended);
    assert_eq!(state.occluded(false), LoopPhase::Suspended);
    assert_eq!(state.resized(640, 480), LoopPhase::Running);
    assert_eq!(state.suspended(), LoopPhase::Suspended);
    assert_eq!(state.occluded(true), LoopPhase::Suspended);
    assert_eq!(state.resumed(), LoopPhase::Suspended);
}
