use std::sync::Arc;

use tankview::{render_text, GameServer, ScriptedServer, ViewerConfig, Visualizer};

const REPLAY: &str = r##"[
    {"board": ["1  ", " # ", "  2"], "turn": 0, "maxSteps": 3},
    {"board": [" 1 ", " $ ", "  2"], "turn": 1, "maxSteps": 3},
    {"board": [" 1 ", "   ", "  *"], "turn": 2, "maxSteps": 3, "gameOver": true, "winner": "Player 1"}
]"##;

#[tokio::test]
async fn steps_clamp_at_last_frame_and_reset_rewinds() {
    let server = ScriptedServer::from_json(REPLAY).unwrap();
    assert_eq!(server.frame_count(), 3);
    for _ in 0..5 {
        server.step().await.unwrap();
    }
    assert_eq!(server.position(), 2);
    assert!(server.fetch_state().await.unwrap().game_over);

    server.reset().await.unwrap();
    assert_eq!(server.position(), 0);
    assert_eq!(server.fetch_state().await.unwrap().turn, 0);
    assert_eq!(server.steps(), 5);
    assert_eq!(server.resets(), 1);
}

#[test]
fn empty_or_invalid_replays_are_rejected() {
    assert!(ScriptedServer::from_json("[]").is_err());
    assert!(ScriptedServer::from_json("{}").is_err());
}

#[tokio::test]
async fn rejected_commands_do_not_advance() {
    let server = ScriptedServer::from_json(REPLAY).unwrap();
    server.fail_next_commands(1);
    assert!(server.step().await.is_err());
    assert_eq!(server.position(), 0);
    server.step().await.unwrap();
    assert_eq!(server.position(), 1);
}

#[tokio::test]
async fn replay_renders_frames_in_order() {
    let server = Arc::new(ScriptedServer::from_json(REPLAY).unwrap());
    let config = ViewerConfig::default().with_refresh_interval(None);
    let vis = Visualizer::new(server.clone(), config);

    let first = vis.refresh().await.unwrap();
    assert_eq!(first.summary().unwrap().changed.len(), 9);

    let second = vis.step().await.unwrap();
    assert_eq!(second.summary().unwrap().changed, vec![(0, 0), (1, 0), (1, 1)]);

    let last = vis.step().await.unwrap();
    assert_eq!(last.summary().unwrap().winner.as_deref(), Some("Player 1"));
    let text = vis.with_view(render_text);
    assert!(text.starts_with("Turn 2 / 2"));
    assert!(text.trim_end().ends_with("🏆 Player 1"));
}

#[tokio::test]
async fn bundled_demo_replay_loads() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/replay.json");
    let server = ScriptedServer::from_file(&path).unwrap();
    assert_eq!(server.frame_count(), 6);
    let first = server.fetch_state().await.unwrap();
    assert_eq!(first.board.len(), 5);
    assert!(first.board.iter().all(|row| row.len() == 10));
}
