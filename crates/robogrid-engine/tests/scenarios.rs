//! End-to-end driver scenarios.
//!
//! All tests run with a paused tokio clock, so the speed-derived delays
//! are deterministic and instant.

use robogrid_core::{
    Coord, EngineConfig, Facing, LevelConfig, LocalizedText, Pose, VictoryConditions,
};
use robogrid_engine::{GameEngine, ReadModel};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn all_commands() -> Vec<String> {
    [
        "moveForward",
        "turnLeft",
        "turnRight",
        "collectCoin",
        "log",
        "getGrid",
        "getRobotState",
        "getObjectives",
        "getCurrentState",
        "setSpeed",
        "getSpeed",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// 5x5 level, robot at (0,2) facing east, target at (4,2).
fn corridor() -> LevelConfig {
    LevelConfig {
        id: "corridor".to_string(),
        name: LocalizedText::new("Corridor", "走廊"),
        grid_size: 5,
        start_pos: Pose::new(0, 2, Facing::E),
        target_pos: Coord::new(4, 2),
        walls: vec![],
        coins: vec![],
        available_commands: all_commands(),
        default_code: String::new(),
        victory_conditions: None,
        difficulty: 1,
    }
}

fn engine(level: LevelConfig) -> (GameEngine, Arc<AtomicUsize>) {
    let wins = Arc::new(AtomicUsize::new(0));
    let hook_wins = Arc::clone(&wins);
    let engine = GameEngine::new(level, EngineConfig::default(), move || {
        hook_wins.fetch_add(1, Ordering::SeqCst);
    })
    .expect("level is valid");
    (engine, wins)
}

async fn wait_until(engine: &GameEngine, pred: impl Fn(&ReadModel) -> bool) -> ReadModel {
    for _ in 0..200_000 {
        let snap = engine.snapshot();
        if pred(&snap) {
            return snap;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition never held, last snapshot: {:?}", engine.snapshot());
}

async fn wait_done(engine: &GameEngine, run_id: u64) -> ReadModel {
    wait_until(engine, |s| s.run_id == run_id && !s.is_running).await
}

#[tokio::test(start_paused = true)]
async fn test_four_moves_reach_target() {
    let (engine, wins) = engine(corridor());
    let run_id = engine
        .run_code("for (let i = 0; i < 4; i++) { moveForward() }")
        .unwrap();

    let snap = wait_done(&engine, run_id).await;
    assert_eq!((snap.x, snap.y), (4, 2));
    assert_eq!(snap.move_count, 4);
    assert_eq!(snap.logs, vec!["moveForward()"; 4]);
    assert!(snap.is_success);
    assert_eq!(snap.error, None);
    assert_eq!(wins.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_three_moves_end_short_of_target() {
    let (engine, wins) = engine(corridor());
    let run_id = engine
        .run_code("moveForward()\nmoveForward()\nmoveForward()")
        .unwrap();

    let snap = wait_done(&engine, run_id).await;
    assert_eq!((snap.x, snap.y), (3, 2));
    assert!(!snap.is_success);
    assert_eq!(snap.error, None);
    assert_eq!(wins.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_wall_halts_at_last_valid_cell() {
    let mut level = corridor();
    level.start_pos = Pose::new(0, 0, Facing::E);
    level.target_pos = Coord::new(4, 4);
    level.walls = vec![Coord::new(2, 0)];
    let (engine, wins) = engine(level);

    let run_id = engine
        .run_code("for (let i = 0; i < 4; i++) { moveForward() }")
        .unwrap();

    let snap = wait_done(&engine, run_id).await;
    // The robot halts at the last valid cell; the wall is never entered.
    assert_eq!((snap.x, snap.y), (1, 0));
    // The blocked attempt is counted and logged like any other move.
    assert_eq!(snap.move_count, 2);
    assert_eq!(snap.logs, vec!["moveForward()"; 2]);
    assert_eq!(snap.error.as_deref(), Some("Hit an obstacle"));
    assert!(!snap.is_success);
    assert_eq!(wins.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_missed_coins_is_an_error() {
    let mut level = corridor();
    level.coins = vec![Coord::new(2, 2)];
    let (engine, wins) = engine(level);

    let run_id = engine
        .run_code("for (let i = 0; i < 4; i++) { moveForward() }")
        .unwrap();

    let snap = wait_done(&engine, run_id).await;
    assert_eq!((snap.x, snap.y), (4, 2));
    assert_eq!(
        snap.error.as_deref(),
        Some("Reached the target but missed coins (collected: 0, required: 1)")
    );
    assert!(!snap.is_success);
    assert_eq!(wins.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_collecting_the_coin_wins() {
    let mut level = corridor();
    level.coins = vec![Coord::new(2, 2)];
    let (engine, wins) = engine(level);

    let run_id = engine
        .run_code(
            "moveForward()\nmoveForward()\ncollectCoin()\nmoveForward()\nmoveForward()",
        )
        .unwrap();

    let snap = wait_done(&engine, run_id).await;
    assert!(snap.is_success);
    assert_eq!(snap.collected, vec!["2,2"]);
    assert_eq!(wins.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_collect_on_empty_cell_is_a_notice() {
    let mut level = corridor();
    level.coins = vec![Coord::new(1, 2)];
    let (engine, _) = engine(level);

    let run_id = engine
        .run_code("moveForward()\ncollectCoin()\ncollectCoin()")
        .unwrap();

    let snap = wait_done(&engine, run_id).await;
    assert_eq!(snap.collected, vec!["1,2"]);
    assert_eq!(
        snap.logs,
        vec![
            "moveForward()",
            "collectCoin()",
            "collectCoin()",
            "No coin here"
        ]
    );
    // A wasted collect is not a fault.
    assert_eq!(snap.error, None);
}

#[tokio::test(start_paused = true)]
async fn test_move_budget_exceeded() {
    let mut level = corridor();
    level.victory_conditions = Some(VictoryConditions {
        required_coins: None,
        max_moves: Some(3),
    });
    let (engine, wins) = engine(level);

    let run_id = engine
        .run_code("for (let i = 0; i < 4; i++) { moveForward() }")
        .unwrap();

    let snap = wait_done(&engine, run_id).await;
    assert_eq!(
        snap.error.as_deref(),
        Some("Too many moves (used: 4, max: 3)")
    );
    assert!(!snap.is_success);
    assert_eq!(wins.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_runaway_loop_faults() {
    let (engine, wins) = engine(corridor());
    let run_id = engine.run_code("while (true) { let x = 1 }").unwrap();

    let snap = wait_done(&engine, run_id).await;
    assert_eq!(
        snap.error.as_deref(),
        Some("Infinite loop suspected (exceeded 100000 steps)")
    );
    assert!(!snap.is_success);
    assert_eq!(wins.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_runtime_error_surfaces() {
    let (engine, _) = engine(corridor());
    let run_id = engine.run_code("jump()").unwrap();

    let snap = wait_done(&engine, run_id).await;
    assert_eq!(
        snap.error.as_deref(),
        Some("Execution error: jump is not defined")
    );
}

#[tokio::test(start_paused = true)]
async fn test_uninstalled_command_is_undefined() {
    let mut level = corridor();
    level.available_commands = vec!["log".to_string()];
    let (engine, _) = engine(level);

    let run_id = engine.run_code("moveForward()").unwrap();

    let snap = wait_done(&engine, run_id).await;
    assert_eq!(
        snap.error.as_deref(),
        Some("Execution error: moveForward is not defined")
    );
}

#[tokio::test(start_paused = true)]
async fn test_compile_error_never_starts_a_run() {
    let (engine, _) = engine(corridor());
    let run_id = engine.run_code("let = 5").unwrap();

    let snap = engine.snapshot();
    assert_eq!(snap.run_id, run_id);
    assert!(!snap.is_running);
    assert!(snap
        .error
        .as_deref()
        .unwrap()
        .starts_with("Compile error:"));
    assert_eq!(snap.move_count, 0);
    assert!(snap.logs.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_second_run_is_rejected_while_active() {
    let (engine, _) = engine(corridor());
    let first = engine.run_code("moveForward()\nmoveForward()");
    assert!(first.is_some());

    assert_eq!(engine.run_code("moveForward()"), None);

    let snap = wait_done(&engine, first.unwrap()).await;
    assert_eq!(snap.move_count, 2);
}

#[tokio::test(start_paused = true)]
async fn test_reset_abandons_the_run_without_mutation() {
    let (engine, wins) = engine(corridor());
    engine
        .run_code("for (let i = 0; i < 4; i++) { moveForward() }")
        .unwrap();

    // Let the first move land, then cancel.
    wait_until(&engine, |s| s.move_count >= 1).await;
    engine.reset();
    let reset_snap = engine.snapshot();

    // Give the abandoned driver plenty of simulated time.
    tokio::time::sleep(Duration::from_secs(10)).await;

    let snap = engine.snapshot();
    assert_eq!(snap, reset_snap);
    assert_eq!((snap.x, snap.y), (0, 2));
    assert_eq!(snap.move_count, 0);
    assert!(snap.logs.is_empty());
    assert_eq!(snap.error, None);
    assert!(!snap.is_running);
    assert_eq!(wins.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_force_reset_swaps_the_level() {
    let (engine, _) = engine(corridor());
    engine
        .run_code("for (let i = 0; i < 4; i++) { moveForward() }")
        .unwrap();
    wait_until(&engine, |s| s.move_count >= 1).await;

    let mut next = corridor();
    next.id = "corridor-2".to_string();
    next.start_pos = Pose::new(2, 2, Facing::N);
    engine.force_reset(next).unwrap();

    tokio::time::sleep(Duration::from_secs(10)).await;

    let snap = engine.snapshot();
    assert_eq!((snap.x, snap.y), (2, 2));
    assert_eq!(snap.dir, Facing::N);
    assert_eq!(snap.rotation, 0);
    assert_eq!(snap.move_count, 0);
    assert_eq!(engine.level().id, "corridor-2");
}

#[tokio::test(start_paused = true)]
async fn test_pause_freezes_movement() {
    let (engine, _) = engine(corridor());
    let run_id = engine
        .run_code("moveForward()\nmoveForward()")
        .unwrap();

    wait_until(&engine, |s| s.move_count == 1).await;
    engine.toggle_pause();
    assert!(engine.snapshot().is_paused);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(engine.snapshot().move_count, 1);

    engine.toggle_pause();
    let snap = wait_done(&engine, run_id).await;
    assert_eq!(snap.move_count, 2);
    assert!(!snap.is_paused);
}

#[tokio::test(start_paused = true)]
async fn test_toggle_pause_is_a_noop_when_idle() {
    let (engine, _) = engine(corridor());
    engine.toggle_pause();
    assert!(!engine.snapshot().is_paused);
}

#[tokio::test(start_paused = true)]
async fn test_set_speed_before_moving() {
    let (engine, _) = engine(corridor());
    let run_id = engine
        .run_code("setSpeed(0)\nfor (let i = 0; i < 4; i++) { moveForward() }")
        .unwrap();

    let snap = wait_done(&engine, run_id).await;
    assert!(snap.is_success);
    assert_eq!(snap.speed_ms, 0);
    assert_eq!(snap.logs[0], "setSpeed(0)");
    assert_eq!(snap.logs.len(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_query_commands() {
    let mut level = corridor();
    level.coins = vec![Coord::new(2, 2)];
    let (engine, _) = engine(level);

    let run_id = engine
        .run_code(
            "console.log(getGrid().size)\n\
             console.log(getObjectives().requiredCoins, getObjectives().maxMoves)\n\
             console.log(getRobotState().dir)\n\
             console.log(getCurrentState().moves)\n\
             console.log(getSpeed())",
        )
        .unwrap();

    let snap = wait_done(&engine, run_id).await;
    assert_eq!(snap.logs, vec!["5", "1 -1", "E", "0", "400"]);
}

#[tokio::test(start_paused = true)]
async fn test_wait_builtin_delays_without_moving() {
    let (engine, _) = engine(corridor());
    let run_id = engine
        .run_code("wait(50)\nconsole.log('after the wait')")
        .unwrap();

    let snap = wait_done(&engine, run_id).await;
    assert_eq!(snap.logs, vec!["after the wait"]);
    assert_eq!(snap.move_count, 0);
    assert_eq!(snap.error, None);
}

#[tokio::test(start_paused = true)]
async fn test_turns_update_facing_and_rotation() {
    let (engine, _) = engine(corridor());
    let run_id = engine
        .run_code("turnLeft()\nturnLeft()\nturnRight()")
        .unwrap();

    let snap = wait_done(&engine, run_id).await;
    // E -> N -> W, then back to N. Rotation starts at 90 for east.
    assert_eq!(snap.dir, Facing::N);
    assert_eq!(snap.rotation, 90 - 90 - 90 + 90);
    assert_eq!(snap.logs, vec!["turnLeft()", "turnLeft()", "turnRight()"]);
}
