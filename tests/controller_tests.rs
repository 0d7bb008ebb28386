use std::sync::Arc;

use tankview::{Command, CycleError, GameState, ScriptedServer, ViewerConfig, Visualizer};
use tokio::time::{sleep, Duration};

fn frame(rows: &[&str], turn: u64) -> GameState {
    GameState {
        board: rows.iter().map(|r| r.chars().collect()).collect(),
        turn,
        max_steps: Some(10),
        player1_tanks: Some(1),
        player2_tanks: Some(1),
        ..GameState::default()
    }
}

fn visualizer(frames: Vec<GameState>) -> (Arc<ScriptedServer>, Arc<Visualizer>) {
    let server = Arc::new(ScriptedServer::new(frames));
    let config = ViewerConfig::default().with_refresh_interval(None);
    let visualizer = Visualizer::new(server.clone(), config);
    (server, visualizer)
}

#[tokio::test]
async fn step_sends_command_then_renders() {
    let (server, vis) = visualizer(vec![frame(&["1 2"], 0), frame(&[" 12"], 1)]);
    let cycle = vis.step().await.unwrap();
    assert_eq!(server.steps(), 1);
    assert_eq!(cycle.summary().unwrap().changed.len(), 3);
    vis.with_view(|v| assert_eq!(v.turn_bar().unwrap().turn, 1));
}

#[tokio::test]
async fn failed_step_skips_fetch() {
    let (server, vis) = visualizer(vec![frame(&["1"], 0)]);
    server.fail_next_commands(1);
    let err = vis.step().await.unwrap_err();
    assert!(matches!(err, CycleError::Command { command: Command::Step, .. }));
    assert_eq!(server.fetches(), 0);
    assert_eq!(vis.with_view(|v| v.renders()), 0);
}

#[tokio::test]
async fn toggle_reports_new_setting() {
    let (_server, vis) = visualizer(vec![frame(&["1"], 0)]);
    assert!(vis.toggle_auto_play());
    assert!(vis.is_auto_playing());
    assert!(vis.step_timer_active());
    assert!(!vis.toggle_auto_play());
    assert!(!vis.step_timer_active());
}

#[tokio::test]
async fn shutdown_cancels_everything() {
    let (_server, vis) = visualizer(vec![frame(&["1"], 0)]);
    vis.toggle_auto_play();
    vis.shutdown();
    assert!(!vis.is_auto_playing());
    assert!(!vis.step_timer_active());
    assert!(!vis.restart_pending());
}

#[tokio::test(start_paused = true)]
async fn polling_refreshes_periodically() {
    let server = Arc::new(ScriptedServer::new(vec![frame(&["1"], 0)]));
    let config = ViewerConfig::default().with_refresh_interval(Some(Duration::from_millis(1000)));
    let vis = Visualizer::mount(server.clone(), config).await;
    assert_eq!(server.fetches(), 1);
    sleep(Duration::from_millis(3100)).await;
    assert_eq!(server.fetches(), 4);
    vis.shutdown();
}
