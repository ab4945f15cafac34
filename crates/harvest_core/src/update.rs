use crate::{DriverState, Effect, Msg, Phase, StopReason};

/// Pure update function: applies a message to the driver state and returns the next effect.
///
/// Messages that do not fit the current phase are ignored, and a finished driver
/// never produces further effects.
pub fn update(mut state: DriverState, msg: Msg) -> (DriverState, Vec<Effect>) {
    if state.is_done() {
        return (state, Vec::new());
    }

    let effects = match (state.phase(), msg) {
        (Phase::Idle, Msg::Begin { admitted }) => collect_or_finish(&mut state, admitted),
        (Phase::Collecting, Msg::Advanced(progress)) => {
            state.enter_waiting(progress);
            vec![Effect::AwaitResponses]
        }
        (Phase::WaitingForResponse, Msg::WaitElapsed { admitted }) => {
            let stagnation = state.record_cycle(admitted);
            if state.target_reached(admitted) {
                finish(&mut state, StopReason::TargetReached)
            } else if state.exhausted() {
                finish(&mut state, StopReason::Exhausted)
            } else if stagnation >= state.settings().stagnation_threshold {
                finish(&mut state, StopReason::Stagnant)
            } else {
                collect_or_finish(&mut state, admitted)
            }
        }
        _ => Vec::new(),
    };

    (state, effects)
}

fn collect_or_finish(state: &mut DriverState, admitted: usize) -> Vec<Effect> {
    if state.target_reached(admitted) {
        return finish(state, StopReason::TargetReached);
    }
    state.enter_collecting(admitted);
    vec![Effect::Advance]
}

fn finish(state: &mut DriverState, reason: StopReason) -> Vec<Effect> {
    state.finish(reason);
    vec![Effect::Finish(reason)]
}
