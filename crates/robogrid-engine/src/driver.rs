//! The interpreter driver task: batched stepping, delays, pause, victory.

use crate::bindings;
use crate::engine::Shared;
use robogrid_core::{CommandId, Error};
use robogrid_runtime::{StepEvent, Value, Vm};
use robogrid_sim::{evaluate, CollectOutcome, GridView, MoveOutcome, TurnDir, VictoryOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::debug;

/// Drive one run to completion, fault, or abandonment.
///
/// The task never outlives its generation: every await point is followed by
/// a run-id check, and a stale id returns without touching state.
pub(crate) async fn drive(shared: Arc<Shared>, mut vm: Vm, run_id: u64) {
    let batch = shared.config.step_batch;
    let max_steps = shared.config.max_steps;
    let mut steps: u64 = 0;

    'outer: loop {
        if !shared.is_current(run_id) {
            debug!(run_id, "Run superseded, driver exiting");
            return;
        }

        for _ in 0..batch {
            steps += 1;
            if steps > max_steps {
                fault(&shared, run_id, Error::InfiniteLoop(max_steps).to_string());
                return;
            }

            match vm.step() {
                Ok(StepEvent::Ran) => {}
                Ok(StepEvent::Done) => {
                    finish(&shared, run_id);
                    return;
                }
                Ok(StepEvent::Sleep { ms }) => {
                    time::sleep(Duration::from_millis(ms)).await;
                    if !shared.is_current(run_id) {
                        return;
                    }
                    vm.resume(Value::Null);
                    continue 'outer;
                }
                Ok(StepEvent::HostCall { command, args }) => {
                    let alive = if command.is_async() {
                        exec_async(&shared, &mut vm, run_id, command).await
                    } else {
                        exec_sync(&shared, &mut vm, run_id, command, args)
                    };
                    if !alive {
                        return;
                    }
                    continue 'outer;
                }
                Err(e) => {
                    fault(&shared, run_id, Error::Runtime(e.to_string()).to_string());
                    return;
                }
            }
        }

        // Batch exhausted without suspending; let other tasks breathe.
        tokio::task::yield_now().await;
    }
}

/// Record a fault and end the run. Skips victory evaluation.
fn fault(shared: &Shared, run_id: u64, message: String) {
    let mut state = shared.state.lock();
    if state.run_id != run_id {
        return;
    }
    debug!(run_id, %message, "Run faulted");
    state.fail(message);
    shared.publish(&state);
}

/// The program ran to completion: evaluate victory exactly once.
fn finish(shared: &Shared, run_id: u64) {
    let level = shared.level.read().clone();
    let won = {
        let mut state = shared.state.lock();
        if state.run_id != run_id {
            return;
        }
        let outcome = evaluate(&level, &state);
        match outcome {
            VictoryOutcome::NotAtTarget => {}
            VictoryOutcome::MissedCoins {
                collected,
                required,
            } => {
                state.error = Some(
                    Error::MissedCoins {
                        collected,
                        required,
                    }
                    .to_string(),
                );
            }
            VictoryOutcome::TooManyMoves { used, max } => {
                state.error = Some(Error::TooManyMoves { used, max }.to_string());
            }
            VictoryOutcome::Success => state.is_success = true,
        }
        state.is_running = false;
        debug!(run_id, ?outcome, "Run finished");
        shared.publish(&state);
        state.is_success
    };
    if won {
        (shared.on_success)();
    }
}

/// Synchronous commands run inline: no delay, no pause interaction.
fn exec_sync(
    shared: &Shared,
    vm: &mut Vm,
    run_id: u64,
    command: CommandId,
    args: Vec<Value>,
) -> bool {
    let level = shared.level.read().clone();
    let mut state = shared.state.lock();
    if state.run_id != run_id {
        return false;
    }

    let result = match command {
        CommandId::Log => {
            state.push_log(bindings::render_log_line(&args));
            shared.publish(&state);
            Value::Null
        }
        CommandId::GetGrid => bindings::get_grid(&level),
        CommandId::GetRobotState => bindings::get_robot_state(&state),
        CommandId::GetObjectives => bindings::get_objectives(&level),
        CommandId::GetCurrentState => bindings::get_current_state(&state),
        CommandId::SetSpeed => {
            bindings::set_speed(&mut state, &args);
            shared.publish(&state);
            Value::Null
        }
        CommandId::GetSpeed => Value::Num(state.speed_ms as f64),
        _ => Value::Null,
    };

    drop(state);
    vm.resume(result);
    true
}

/// Asynchronous commands: pause-wait, speed-derived delay, pause-wait,
/// id re-check, then the state transition and canonical log line.
async fn exec_async(shared: &Shared, vm: &mut Vm, run_id: u64, command: CommandId) -> bool {
    if !wait_while_paused(shared, run_id).await {
        return false;
    }

    // Speed is sampled when the command starts; setSpeed mid-delay
    // affects the next command.
    let speed = {
        let state = shared.state.lock();
        if state.run_id != run_id {
            return false;
        }
        state.speed_ms
    };
    let delay = if command == CommandId::CollectCoin {
        (speed / 2).min(100)
    } else {
        speed
    };
    time::sleep(Duration::from_millis(delay)).await;

    if !wait_while_paused(shared, run_id).await {
        return false;
    }
    if !shared.is_current(run_id) {
        return false;
    }

    let level = shared.level.read().clone();
    let grid = GridView::new(&level);
    let mut state = shared.state.lock();
    if state.run_id != run_id {
        return false;
    }

    match command {
        CommandId::MoveForward => {
            // The attempt is logged and counted before the collision
            // check, so a blocked move still shows up in the history.
            state.push_log("moveForward()");
            if state.apply_move(&grid) == MoveOutcome::Blocked {
                state.fail(Error::HitObstacle.to_string());
                shared.publish(&state);
                return false;
            }
        }
        CommandId::TurnLeft => {
            state.apply_turn(TurnDir::Left);
            state.push_log("turnLeft()");
        }
        CommandId::TurnRight => {
            state.apply_turn(TurnDir::Right);
            state.push_log("turnRight()");
        }
        CommandId::CollectCoin => {
            state.push_log("collectCoin()");
            if state.collect_coin(&grid) == CollectOutcome::NoCoin {
                state.push_log("No coin here");
            }
        }
        _ => {}
    }

    shared.publish(&state);
    drop(state);
    vm.resume(Value::Null);
    true
}

/// Poll until unpaused. False means the run was superseded meanwhile.
async fn wait_while_paused(shared: &Shared, run_id: u64) -> bool {
    loop {
        if !shared.is_current(run_id) {
            return false;
        }
        let paused = {
            let state = shared.state.lock();
            state.run_id == run_id && state.is_paused
        };
        if !paused {
            return shared.is_current(run_id);
        }
        time::sleep(Duration::from_millis(shared.config.pause_poll_ms)).await;
    }
}
