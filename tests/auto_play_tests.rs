use std::sync::Arc;

use tankview::{CycleError, GameState, ScriptedServer, ViewerConfig, Visualizer};
use tokio::time::{sleep, Duration};

fn frame(rows: &[&str], turn: u64) -> GameState {
    GameState {
        board: rows.iter().map(|r| r.chars().collect()).collect(),
        turn,
        max_steps: Some(20),
        player1_tanks: Some(1),
        player2_tanks: Some(1),
        ..GameState::default()
    }
}

fn decided(rows: &[&str], turn: u64, winner: &str) -> GameState {
    GameState {
        game_over: true,
        winner: Some(winner.to_string()),
        player2_tanks: Some(0),
        ..frame(rows, turn)
    }
}

fn config() -> ViewerConfig {
    ViewerConfig::default().with_refresh_interval(None)
}

fn setup(frames: Vec<GameState>) -> (Arc<ScriptedServer>, Arc<Visualizer>) {
    let server = Arc::new(ScriptedServer::new(frames));
    let visualizer = Visualizer::new(server.clone(), config());
    (server, visualizer)
}

#[tokio::test(start_paused = true)]
async fn repeated_toggling_keeps_a_single_timer() {
    let (server, vis) = setup(vec![frame(&["1 2"], 0), frame(&[" 12"], 1)]);
    for _ in 0..5 {
        vis.toggle_auto_play();
    }
    assert!(vis.is_auto_playing());

    sleep(Duration::from_millis(850)).await;
    assert_eq!(server.steps(), 1);
    sleep(Duration::from_millis(800)).await;
    assert_eq!(server.steps(), 2);

    vis.toggle_auto_play();
    sleep(Duration::from_millis(2000)).await;
    assert_eq!(server.steps(), 2);
}

#[tokio::test(start_paused = true)]
async fn game_over_with_auto_play_resets_once_and_resumes() {
    let (server, vis) = setup(vec![
        frame(&["1 2"], 0),
        frame(&[" 12"], 1),
        decided(&[" 1 "], 2, "Player 1"),
    ]);
    vis.refresh().await.unwrap();
    vis.toggle_auto_play();

    // Steps at 800 ms and 1600 ms; the second one lands on the decided game.
    sleep(Duration::from_millis(1650)).await;
    assert_eq!(server.steps(), 2);
    assert!(vis.restart_pending());
    assert!(!vis.step_timer_active());
    vis.with_view(|v| assert_eq!(v.banner(), Some("🏆 Player 1")));

    // Nothing happens during the pause.
    sleep(Duration::from_millis(1900)).await;
    assert_eq!(server.resets(), 0);
    assert_eq!(server.steps(), 2);

    // Reset at 3600 ms, then stepping resumes 800 ms later.
    sleep(Duration::from_millis(100)).await;
    assert_eq!(server.resets(), 1);
    assert_eq!(server.position(), 0);
    vis.with_view(|v| assert_eq!(v.banner(), None));
    assert!(vis.step_timer_active());

    sleep(Duration::from_millis(800)).await;
    assert_eq!(server.steps(), 3);
    assert_eq!(server.resets(), 1);
}

#[tokio::test(start_paused = true)]
async fn game_over_without_auto_play_keeps_banner() {
    let (server, vis) = setup(vec![frame(&["1 2"], 0), decided(&["1  "], 1, "Player 1")]);
    vis.step().await.unwrap();
    vis.with_view(|v| assert_eq!(v.banner(), Some("🏆 Player 1")));
    assert!(!vis.restart_pending());

    sleep(Duration::from_secs(10)).await;
    assert_eq!(server.resets(), 0);
    vis.with_view(|v| assert_eq!(v.banner(), Some("🏆 Player 1")));
}

#[tokio::test(start_paused = true)]
async fn stopping_auto_play_cancels_pending_restart() {
    let (server, vis) = setup(vec![frame(&["1"], 0), decided(&["1"], 1, "Player 1")]);
    vis.toggle_auto_play();
    sleep(Duration::from_millis(850)).await;
    assert!(vis.restart_pending());

    vis.toggle_auto_play();
    sleep(Duration::from_secs(5)).await;
    assert_eq!(server.resets(), 0);
    assert!(!vis.restart_pending());
}

#[tokio::test]
async fn fetch_failure_leaves_view_untouched() {
    let (server, vis) = setup(vec![frame(&["1 2"], 0), frame(&[" 12"], 1)]);
    vis.refresh().await.unwrap();
    let before = vis.with_view(|v| (v.board().to_vec(), v.hud().clone(), v.turn_bar().cloned()));

    server.fail_next_fetches(1);
    let err = vis.step().await.unwrap_err();
    assert!(matches!(err, CycleError::Fetch(_)));
    assert!(err.to_string().starts_with("Error fetching game state"));

    let after = vis.with_view(|v| (v.board().to_vec(), v.hud().clone(), v.turn_bar().cloned()));
    assert_eq!(before, after);
    vis.with_view(|v| assert_eq!(v.renders(), 1));

    // The next cycle recovers.
    vis.refresh().await.unwrap();
    vis.with_view(|v| assert_eq!(v.turn_bar().unwrap().turn, 1));
}

#[tokio::test(start_paused = true)]
async fn fetch_failure_does_not_stop_auto_play() {
    let (server, vis) = setup(vec![frame(&["1"], 0), frame(&["2"], 1), frame(&["1"], 2)]);
    server.fail_next_fetches(1);
    vis.toggle_auto_play();
    sleep(Duration::from_millis(850)).await;
    assert_eq!(server.steps(), 1);
    assert!(vis.step_timer_active());
    vis.with_view(|v| assert_eq!(v.renders(), 0));

    sleep(Duration::from_millis(800)).await;
    assert_eq!(server.steps(), 2);
    vis.with_view(|v| assert_eq!(v.turn_bar().unwrap().turn, 2));
    vis.shutdown();
}

#[tokio::test(start_paused = true)]
async fn overlapping_trigger_is_skipped() {
    let server = Arc::new(
        ScriptedServer::new(vec![frame(&["1"], 0), frame(&["2"], 1)])
            .with_latency(Duration::from_millis(100)),
    );
    let vis = Visualizer::new(server.clone(), config());

    let first = {
        let vis = Arc::clone(&vis);
        tokio::spawn(async move { vis.step().await })
    };
    sleep(Duration::from_millis(10)).await;

    let second = vis.step().await.unwrap();
    assert!(second.is_skipped());
    assert!(vis.refresh().await.unwrap().is_skipped());

    let first = first.await.unwrap().unwrap();
    assert!(!first.is_skipped());
    assert_eq!(server.steps(), 1);
    assert_eq!(server.fetches(), 1);
}

#[tokio::test(start_paused = true)]
async fn game_over_seen_again_while_restart_pending_is_ignored() {
    let server = Arc::new(ScriptedServer::new(vec![
        frame(&["1 2"], 0),
        decided(&["1  "], 1, "Player 1"),
    ]));
    let polling = config().with_refresh_interval(Some(Duration::from_millis(250)));
    let vis = Visualizer::mount(server.clone(), polling).await;
    vis.toggle_auto_play();

    // The step at 800 ms decides the game; polls keep rendering it afterwards.
    sleep(Duration::from_millis(2700)).await;
    assert!(server.fetches() > 5);
    assert!(vis.restart_pending());
    assert_eq!(server.resets(), 0);

    // Exactly one reset at 2800 ms, then one step 800 ms later.
    sleep(Duration::from_millis(150)).await;
    assert_eq!(server.resets(), 1);
    assert_eq!(server.steps(), 1);

    sleep(Duration::from_millis(800)).await;
    assert_eq!(server.steps(), 2);
    assert_eq!(server.resets(), 1);
    vis.shutdown();
}

#[tokio::test(start_paused = true)]
async fn failed_reset_still_fetches_and_resumes() {
    let (server, vis) = setup(vec![frame(&["1"], 0), decided(&["1"], 1, "Player 1")]);
    vis.toggle_auto_play();
    sleep(Duration::from_millis(850)).await;
    assert!(vis.restart_pending());
    let renders = vis.with_view(|v| v.renders());

    server.fail_next_commands(1);
    sleep(Duration::from_millis(2000)).await;
    assert_eq!(server.resets(), 0);
    assert_eq!(vis.with_view(|v| v.renders()), renders + 1);
    assert!(vis.step_timer_active());
    assert!(!vis.restart_pending());
    vis.shutdown();
}

#[tokio::test(start_paused = true)]
async fn aborted_cycle_releases_the_guard() {
    let server = Arc::new(
        ScriptedServer::new(vec![frame(&["1"], 0), frame(&["2"], 1)])
            .with_latency(Duration::from_millis(100)),
    );
    let vis = Visualizer::new(server.clone(), config());

    let inflight = {
        let vis = Arc::clone(&vis);
        tokio::spawn(async move { vis.step().await })
    };
    sleep(Duration::from_millis(10)).await;
    inflight.abort();
    assert!(inflight.await.unwrap_err().is_cancelled());

    let next = vis.step().await.unwrap();
    assert!(!next.is_skipped());
    vis.with_view(|v| assert_eq!(v.renders(), 1));
}
