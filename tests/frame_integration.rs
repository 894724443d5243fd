//! Whole-frame integration tests driving a built level through `Game::tick`.

use mineshaft::events::audio::AudioCmd;
use mineshaft::events::{Event, EventAction, GameObjectEvent, MenuEvent};
use mineshaft::game::{Game, LevelData};
use mineshaft::resources::gameconfig::GameConfig;
use mineshaft::resources::gamestate::GameStates;
use mineshaft::resources::input::Key;
use mineshaft::systems::render::{DrawCommand, DrawList};
use mineshaft::systems::trace::EventRecorder;

const LEVEL: &str = r#"{
    "player": { "transform": { "translation": [0.0, 0.9, 0.0] }, "move_speed": 4.0 },
    "ground": { "mesh": "floor", "material": "rock" },
    "pickup": {
        "name": "cube", "mesh": "nugget", "material": "gold",
        "description": "Gold nugget", "value": 10, "sound": "Pickup",
        "half_extents": [0.25, 0.25, 0.25]
    },
    "pickups": [
        { "translation": [0.0, 0.9, -1.0] },
        { "translation": [0.0, 0.9, -1.2] },
        { "translation": [8.0, 0.9, 8.0] }
    ],
    "props": [
        { "name": "beam", "mesh": "beam", "material": "wood",
          "transform": { "translation": [3.0, 1.5, 0.0] }, "half_extents": [0.2, 1.5, 0.2] }
    ],
    "health_bar": { "name": "health", "texture": "bar", "width": 100, "height": 10, "position": [0.0, 0.0] },
    "cues": [
        { "name": "Pickup", "category": "Effect" },
        { "name": "Steps", "category": "Effect", "looped": true },
        { "name": "Heartbeat", "category": "Ambient", "looped": true },
        { "name": "Defeat", "category": "Music" }
    ],
    "videos": [ { "name": "main menu video", "fps": 25.0 } ],
    "sound_bindings": [ { "key": "W", "cue": "Steps", "stop_on_release": true } ],
    "ambient_cues": [ "Heartbeat" ],
    "pause_video": "main menu video"
}"#;

fn config() -> GameConfig {
    GameConfig {
        audio_enabled: false,
        pickup_follow_up_cue: None,
        defeat_cue: Some("Defeat".into()),
        health_start: 3,
        health_max: 3,
        decay_interval_ms: 2000,
        target_fps: 50,
        ..GameConfig::new()
    }
}

fn build(config: &GameConfig) -> Game {
    let level = LevelData::from_json(LEVEL).unwrap();
    Game::build(config, &level).unwrap()
}

fn play_ids(commands: &[AudioCmd]) -> Vec<&str> {
    commands
        .iter()
        .filter_map(|c| match c {
            AudioCmd::Play { id } => Some(id.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn build_loads_cues_and_starts_ambience() {
    let game = build(&config());
    let commands = game.drain_audio_commands();
    let loads = commands
        .iter()
        .filter(|c| matches!(c, AudioCmd::Load { .. }))
        .count();
    assert_eq!(loads, 4);
    assert_eq!(play_ids(&commands), vec!["Heartbeat"]);
    assert_eq!(game.state(), GameStates::Playing);
    assert_eq!(game.health(), Some(3));
    assert_eq!(game.remaining_pickups(), 3);
}

#[test]
fn overlapping_pickups_are_each_collected_once() {
    let mut game = build(&config());
    let recorder = EventRecorder::attach(game.bus());
    let mut sink = DrawList::new();

    for _ in 0..20 {
        game.tick(&[Key::W], &mut sink);
    }

    assert_eq!(game.remaining_pickups(), 1);
    let removals: Vec<Event> = recorder
        .events()
        .into_iter()
        .filter(|e| matches!(e, Event::GameObject(GameObjectEvent::Remove { .. })))
        .collect();
    assert_eq!(removals.len(), 2);
    let inventory = recorder
        .actions()
        .into_iter()
        .filter(|a| *a == EventAction::OnAddInventory)
        .count();
    assert_eq!(inventory, 2);

    let plays = play_ids(&game.drain_audio_commands())
        .into_iter()
        .filter(|id| *id == "Pickup")
        .count();
    assert_eq!(plays, 2);
}

#[test]
fn footsteps_follow_the_walk_key() {
    let mut game = build(&config());
    game.drain_audio_commands();
    let mut sink = DrawList::new();

    game.tick(&[Key::W], &mut sink);
    game.tick(&[Key::W], &mut sink);
    game.tick(&[], &mut sink);

    let commands = game.drain_audio_commands();
    assert!(commands.contains(&AudioCmd::Play { id: "Steps".into() }));
    assert!(commands.contains(&AudioCmd::Stop { id: "Steps".into() }));
    assert!(!game.sounds().is_playing("Steps"));
}

#[test]
fn pause_freezes_gameplay_until_resumed() {
    let mut game = build(&config());
    let mut sink = DrawList::new();

    let report = game.tick(&[Key::Escape], &mut sink);
    assert_eq!(report.state, GameStates::Paused);
    assert_eq!(game.videos().current().as_deref(), Some("main menu video"));
    assert!(!game.sounds().is_playing("Heartbeat"));

    let before = game.player_position().unwrap();
    for _ in 0..10 {
        let report = game.tick(&[Key::W], &mut sink);
        assert_eq!(report.contacts, 0);
    }
    assert_eq!(game.player_position().unwrap(), before);

    // health keys are ignored while paused
    game.tick(&[Key::Down], &mut sink);
    assert_eq!(game.health(), Some(3));

    let report = game.tick(&[Key::O], &mut sink);
    assert_eq!(report.state, GameStates::Playing);
    assert_eq!(game.videos().current(), None);

    game.tick(&[Key::W], &mut sink);
    assert_ne!(game.player_position().unwrap(), before);
}

#[test]
fn health_keys_adjust_the_bar() {
    let mut game = build(&config());
    let mut sink = DrawList::new();

    game.tick(&[Key::Down], &mut sink);
    assert_eq!(game.health(), Some(2));
    game.tick(&[], &mut sink);
    game.tick(&[Key::Up], &mut sink);
    game.tick(&[], &mut sink);
    game.tick(&[Key::Up], &mut sink);
    assert_eq!(game.health(), Some(3));
}

#[test]
fn running_out_of_health_loses_the_game_once() {
    let mut game = build(&config());
    let recorder = EventRecorder::attach(game.bus());
    game.drain_audio_commands();
    let mut sink = DrawList::new();

    // 3 health, one point every 2 s, 20 ms frames
    let mut lost_at = None;
    for frame in 0..400 {
        let report = game.tick(&[], &mut sink);
        if report.state == GameStates::Lost && lost_at.is_none() {
            lost_at = Some(frame);
        }
    }

    assert_eq!(lost_at, Some(299));
    assert_eq!(game.state(), GameStates::Lost);
    assert_eq!(game.health(), Some(0));
    assert_eq!(
        recorder
            .actions()
            .into_iter()
            .filter(|a| *a == EventAction::OnLose)
            .count(),
        1
    );
    assert!(recorder.events().contains(&Event::from(MenuEvent::Pause)));
    assert_eq!(play_ids(&game.drain_audio_commands()), vec!["Defeat"]);

    // resuming a finished game does nothing
    game.tick(&[Key::O], &mut sink);
    assert_eq!(game.state(), GameStates::Lost);
}

#[test]
fn render_draws_world_then_ui() {
    let mut game = build(&config());
    let mut sink = DrawList::new();
    let report = game.tick(&[], &mut sink);

    // ground, player, three cubes, beam, health bar
    assert_eq!(report.draw_calls, 7);
    let first_sprite = sink
        .commands
        .iter()
        .position(|c| matches!(c, DrawCommand::Sprite { .. }))
        .unwrap();
    assert_eq!(first_sprite, sink.commands.len() - 1);
    let meshes = sink
        .commands
        .iter()
        .filter(|c| matches!(c, DrawCommand::Mesh { .. }))
        .count();
    assert_eq!(meshes, 5);
}

#[test]
fn trace_serializes_one_line_per_event() {
    let mut game = build(&config());
    let recorder = EventRecorder::attach(game.bus());
    let mut sink = DrawList::new();
    game.tick(&[Key::Escape], &mut sink);

    let text = recorder.to_json_lines().unwrap();
    assert_eq!(text.lines().count(), recorder.len());
    let first: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
    assert_eq!(first["category"], "Video");
    assert_eq!(first["sequence"], 0);
}

#[test]
fn level_cue_volumes_are_clamped_on_load() {
    let mut raw: serde_json::Value = serde_json::from_str(LEVEL).unwrap();
    raw["cues"][1]["volume"] = serde_json::json!(3.0);
    let level = LevelData::from_json(&raw.to_string()).unwrap();
    let game = Game::build(&config(), &level).unwrap();

    let steps = game
        .drain_audio_commands()
        .into_iter()
        .find_map(|c| match c {
            AudioCmd::Load { id, volume, .. } if id == "Steps" => Some(volume),
            _ => None,
        });
    assert_eq!(steps, Some(1.0));
}

#[test]
fn audio_replies_are_drained_every_frame() {
    let config = GameConfig {
        audio_enabled: true,
        decay_interval_ms: 0,
        ..config()
    };
    let mut game = build(&config);
    let mut sink = DrawList::new();

    for frame in 0..2000 {
        let held: &[Key] = if frame % 2 == 0 { &[Key::W] } else { &[] };
        game.tick(held, &mut sink);
    }

    assert_eq!(game.state(), GameStates::Playing);
    assert!(game.audio_acknowledged() > 1000);
    assert!(game.poll_audio_messages().len() < 100);
    game.shutdown().unwrap();
}

#[test]
fn collecting_every_pickup_wins_once() {
    let mut raw: serde_json::Value = serde_json::from_str(LEVEL).unwrap();
    raw["pickups"].as_array_mut().unwrap().truncate(2);
    raw["cues"]
        .as_array_mut()
        .unwrap()
        .push(serde_json::json!({ "name": "Victory", "category": "Music" }));
    let level = LevelData::from_json(&raw.to_string()).unwrap();
    let config = GameConfig {
        victory_cue: Some("Victory".into()),
        ..config()
    };
    let mut game = Game::build(&config, &level).unwrap();
    let recorder = EventRecorder::attach(game.bus());
    game.drain_audio_commands();
    let mut sink = DrawList::new();

    for _ in 0..40 {
        game.tick(&[Key::W], &mut sink);
    }

    assert_eq!(game.remaining_pickups(), 0);
    assert_eq!(game.state(), GameStates::Won);
    let wins = recorder
        .actions()
        .into_iter()
        .filter(|a| *a == EventAction::OnWin)
        .count();
    assert_eq!(wins, 1);
    assert!(play_ids(&game.drain_audio_commands()).contains(&"Victory"));
}
