//! Level assembly.
//!
//! [`LevelData`] is the JSON description of a level: the player, the ground,
//! one pickup archetype and the places it is cloned to, static or animated
//! props, the UI, and the audio/video cues. [`Game::build`] turns it into a
//! running [`Engine`] with the bus, the managers and a loaded scene wired
//! together.

use std::fs;
use std::path::Path;
use std::rc::Rc;

use bevy_math::Vec3;
use crossbeam_channel::{Receiver, unbounded};
use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};

use crate::components::collider::{Collider, ColliderPrimitive, CollisionGroup};
use crate::components::colorflip::TimeColorFlipBehaviour;
use crate::components::controller::FirstPersonController;
use crate::components::curve::{Curve3, CurveController, Keyframe};
use crate::components::gameobject::{GameObject, GameObjectType};
use crate::components::health::UiHealthController;
use crate::components::pickup::PickupBehaviour;
use crate::components::renderer::{Color, MeshRenderer};
use crate::components::response::PickupResponse;
use crate::components::transform::{Transform, TransformData};
use crate::components::uisprite::UiSprite;
use crate::error::EngineError;
use crate::events::{GameObjectEvent, SoundEvent};
use crate::events::audio::{AudioCmd, AudioMessage};
use crate::events::bus::EventBus;
use crate::resources::arena::ObjectId;
use crate::resources::assetstore::AssetStore;
use crate::resources::audio::{AudioBridge, setup_audio, shutdown_audio};
use crate::resources::gameconfig::GameConfig;
use crate::resources::gamestate::GameStates;
use crate::resources::input::Key;
use crate::systems::audio::{Cue, SoundManager};
use crate::systems::frame::{Engine, FrameReport};
use crate::systems::gamestate::StateManager;
use crate::systems::input::{InputBindings, SoundBinding};
use crate::systems::render::RenderSink;
use crate::systems::scene::{Scene, SceneManager};
use crate::systems::video::{VideoCue, VideoCueData, VideoManager};

/// Pickups share this group so overlapping pickups never touch each other.
pub const PICKUP_GROUP: CollisionGroup = CollisionGroup(10);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerData {
    #[serde(default)]
    pub transform: TransformData,
    #[serde(default = "default_move_speed")]
    pub move_speed: f32,
    #[serde(default = "default_turn_speed")]
    pub turn_speed: f32,
    #[serde(default = "default_player_radius")]
    pub radius: f32,
    #[serde(default = "default_player_length")]
    pub length: f32,
}

fn default_move_speed() -> f32 {
    4.0
}

fn default_turn_speed() -> f32 {
    90.0
}

fn default_player_radius() -> f32 {
    0.4
}

fn default_player_length() -> f32 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundData {
    pub mesh: String,
    pub material: String,
    /// World height of the walkable surface.
    #[serde(default)]
    pub height: f32,
}

/// Template every pickup of the level is cloned from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupArchetypeData {
    pub name: String,
    pub mesh: String,
    pub material: String,
    pub description: String,
    pub value: i32,
    pub sound: String,
    pub half_extents: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropData {
    pub name: String,
    #[serde(default = "default_prop_type")]
    pub object_type: GameObjectType,
    pub mesh: String,
    pub material: String,
    #[serde(default)]
    pub transform: TransformData,
    /// Solid, immovable box around the prop.
    #[serde(default)]
    pub half_extents: Option<[f32; 3]>,
    /// Keyframed path the prop follows.
    #[serde(default)]
    pub path: Vec<Keyframe>,
    #[serde(default)]
    pub looped: bool,
}

fn default_prop_type() -> GameObjectType {
    GameObjectType::Architecture
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteData {
    pub name: String,
    pub texture: String,
    pub width: u32,
    pub height: u32,
    pub position: [f32; 2],
}

/// UI sprite flashing between two colours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlasherData {
    pub sprite: SpriteData,
    pub start: Color,
    pub end: Color,
    pub interval_ms: u64,
}

/// Where extra pickups may be scattered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScatterArea {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub player: PlayerData,
    pub ground: GroundData,
    pub pickup: PickupArchetypeData,
    #[serde(default)]
    pub pickups: Vec<TransformData>,
    #[serde(default)]
    pub scatter: Option<ScatterArea>,
    #[serde(default)]
    pub props: Vec<PropData>,
    pub health_bar: SpriteData,
    #[serde(default)]
    pub flashers: Vec<FlasherData>,
    #[serde(default)]
    pub cues: Vec<Cue>,
    #[serde(default)]
    pub videos: Vec<VideoCueData>,
    #[serde(default)]
    pub sound_bindings: Vec<SoundBinding>,
    /// Looping cues started with the level and silenced on pause.
    #[serde(default)]
    pub ambient_cues: Vec<String>,
    #[serde(default)]
    pub pause_video: Option<String>,
}

impl LevelData {
    pub fn from_json(text: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let level = Self::from_json(&text)?;
        info!(
            "Level loaded from {:?}: {} pickups, {} props",
            path,
            level.pickups.len(),
            level.props.len()
        );
        Ok(level)
    }
}

enum AudioOutput {
    Thread(AudioBridge),
    /// Commands kept for inspection instead of being played.
    Captured(Receiver<AudioCmd>),
}

/// A built level: the engine plus every manager listening on its bus.
pub struct Game {
    engine: Engine,
    states: StateManager,
    sounds: SoundManager,
    videos: VideoManager,
    audio: Option<AudioOutput>,
    player: ObjectId,
    health_bar: ObjectId,
    pickups: Vec<ObjectId>,
    frame_ms: u64,
    audio_acknowledged: u64,
}

impl Game {
    pub fn build(config: &GameConfig, level: &LevelData) -> Result<Game, EngineError> {
        let bus = Rc::new(EventBus::new());

        let (tx_cmd, audio) = if config.audio_enabled {
            let bridge = setup_audio();
            (bridge.tx_cmd.clone(), AudioOutput::Thread(bridge))
        } else {
            let (tx, rx) = unbounded::<AudioCmd>();
            (tx, AudioOutput::Captured(rx))
        };

        let sounds = SoundManager::new(Rc::clone(&bus), tx_cmd);
        for cue in &level.cues {
            sounds.register(cue.clone());
        }
        let videos = VideoManager::new(Rc::clone(&bus));
        for video in &level.videos {
            videos.register(VideoCue::from(video));
        }
        let states = StateManager::new(
            Rc::clone(&bus),
            config.start_paused,
            config.defeat_cue.clone(),
            config.victory_cue.clone(),
        );

        let mut assets = AssetStore::new();
        let mut scenes = SceneManager::new(Rc::clone(&bus));
        let mut scene = scenes.create_scene(config.start_scene.clone());

        scene.add(ground_object(&mut assets, &level.ground));
        let player = scene.add(player_object(&bus, config, &level.player));

        let archetype = pickup_archetype(&mut assets, &level.pickup);
        let mut pickups = Vec::with_capacity(level.pickups.len());
        for (i, placement) in level.pickups.iter().enumerate() {
            let cube = archetype
                .clone_as(format!("{} - {}", level.pickup.name, i))
                .with_transform(Transform::from(*placement));
            pickups.push(scene.add(cube));
        }
        if config.extra_pickups > 0 {
            match level.scatter {
                Some(area) => {
                    let mut rng = fastrand::Rng::with_seed(config.seed);
                    for n in 0..config.extra_pickups {
                        let at = Vec3::new(
                            lerp(area.min[0], area.max[0], rng.f32()),
                            lerp(area.min[1], area.max[1], rng.f32()),
                            lerp(area.min[2], area.max[2], rng.f32()),
                        );
                        let index = level.pickups.len() + n as usize;
                        let cube = archetype
                            .clone_as(format!("{} - {}", level.pickup.name, index))
                            .with_transform(Transform::from_translation(at));
                        pickups.push(scene.add(cube));
                    }
                    debug!("Scattered {} extra pickups", config.extra_pickups);
                }
                None => warn!("Level has no scatter area; extra pickups skipped"),
            }
        }

        for prop in &level.props {
            scene.add(prop_object(&mut assets, prop));
        }

        let health_bar = scene.add(
            ui_object(&mut assets, &level.health_bar).with_component(
                UiHealthController::new(Rc::clone(&bus), config.health_start, config.health_max)
                    .with_decay_interval(config.decay_interval_ms),
            ),
        );
        for flasher in &level.flashers {
            scene.add(ui_object(&mut assets, &flasher.sprite).with_component(
                TimeColorFlipBehaviour::new(flasher.start, flasher.end, flasher.interval_ms),
            ));
        }

        scenes.add_scene(scene);
        scenes.load_scene(&config.start_scene)?;

        let bindings = InputBindings {
            health_target: Some(health_bar),
            pause_video: level.pause_video.clone(),
            ambient_cues: level.ambient_cues.clone(),
            sound_bindings: level.sound_bindings.clone(),
            ..InputBindings::default()
        };
        let engine = Engine::new(scenes, states.handle(), bindings);

        for cue in &level.ambient_cues {
            bus.publish(SoundEvent::play_2d(cue.clone()));
        }

        info!(
            "Built '{}': {} objects, {} pickups, {} assets, {} subscribers",
            config.title,
            engine.scenes().active().map_or(0, Scene::len),
            pickups.len(),
            assets.len(),
            bus.total_subscribers()
        );

        Ok(Game {
            engine,
            states,
            sounds,
            videos,
            audio: Some(audio),
            player,
            health_bar,
            pickups,
            frame_ms: config.frame_ms(),
            audio_acknowledged: 0,
        })
    }

    /// Run one frame of `frame_ms` with `held` keys down.
    ///
    /// Replies from the audio thread are drained at the end of every frame.
    /// The game is won at the end of the frame that collects the last pickup.
    pub fn tick(&mut self, held: &[Key], sink: &mut dyn RenderSink) -> FrameReport {
        let report = self.engine.tick(self.frame_ms, held, sink);
        if !self.pickups.is_empty() && self.states.is_playing() && self.remaining_pickups() == 0 {
            info!("All {} pickups collected", self.pickups.len());
            self.engine.bus().publish(GameObjectEvent::Win);
        }
        self.pump_audio_messages();
        report
    }

    fn pump_audio_messages(&mut self) {
        let Some(AudioOutput::Thread(bridge)) = &self.audio else {
            return;
        };
        for message in bridge.rx_msg.try_iter() {
            match &message {
                AudioMessage::Unknown { id } => warn!("[audio] backend has no cue '{}'", id),
                _ => trace!("[audio] {:?}", message),
            }
            self.audio_acknowledged += 1;
        }
    }

    /// Audio thread replies drained by [`Game::tick`] so far.
    pub fn audio_acknowledged(&self) -> u64 {
        self.audio_acknowledged
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn bus(&self) -> &Rc<EventBus> {
        self.engine.bus()
    }

    pub fn state(&self) -> GameStates {
        self.states.state()
    }

    pub fn sounds(&self) -> &SoundManager {
        &self.sounds
    }

    pub fn videos(&self) -> &VideoManager {
        &self.videos
    }

    pub fn player(&self) -> ObjectId {
        self.player
    }

    pub fn health_bar(&self) -> ObjectId {
        self.health_bar
    }

    /// Every pickup placed by the level, collected or not.
    pub fn pickups(&self) -> &[ObjectId] {
        &self.pickups
    }

    /// Pickups still in the scene.
    pub fn remaining_pickups(&self) -> usize {
        self.engine
            .scenes()
            .active()
            .map_or(0, |scene| self.pickups.iter().filter(|id| scene.contains(**id)).count())
    }

    pub fn health(&self) -> Option<i32> {
        self.engine
            .scenes()
            .active()?
            .get(self.health_bar)?
            .get_component::<UiHealthController>()
            .map(UiHealthController::current)
    }

    pub fn player_position(&self) -> Option<Vec3> {
        let scene = self.engine.scenes().active()?;
        Some(scene.get(self.player)?.transform.translation)
    }

    /// Audio commands issued so far when audio output is captured.
    pub fn drain_audio_commands(&self) -> Vec<AudioCmd> {
        match &self.audio {
            Some(AudioOutput::Captured(rx)) => rx.try_iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Audio thread replies that arrived since the last tick.
    pub fn poll_audio_messages(&self) -> Vec<AudioMessage> {
        match &self.audio {
            Some(AudioOutput::Thread(bridge)) => bridge.poll_messages(),
            _ => Vec::new(),
        }
    }

    /// Stop the audio thread, if one was started.
    pub fn shutdown(mut self) -> Result<(), EngineError> {
        match self.audio.take() {
            Some(AudioOutput::Thread(bridge)) => shutdown_audio(bridge),
            _ => Ok(()),
        }
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn ground_object(assets: &mut AssetStore, data: &GroundData) -> GameObject {
    GameObject::new("ground", GameObjectType::Ground)
        .with_transform(Transform::from_translation(Vec3::new(0.0, data.height, 0.0)))
        .with_component(MeshRenderer::new(
            assets.mesh(&data.mesh),
            assets.material(&data.material),
        ))
        .with_component(
            Collider::new()
                .with_primitive(ColliderPrimitive::Plane {
                    normal: Vec3::Y,
                    offset: data.height,
                })
                .immovable()
                .enabled(true, CollisionGroup::NONE),
        )
}

fn player_object(bus: &Rc<EventBus>, config: &GameConfig, data: &PlayerData) -> GameObject {
    let response = PickupResponse::new(Rc::clone(bus), GameObjectType::Consumable)
        .with_follow_up_cue(config.pickup_follow_up_cue.clone());
    GameObject::new("player", GameObjectType::Player)
        .with_transform(Transform::from(data.transform))
        .with_component(FirstPersonController::new(data.move_speed, data.turn_speed))
        .with_component(
            Collider::new()
                .with_primitive(ColliderPrimitive::Capsule {
                    center: Vec3::ZERO,
                    radius: data.radius,
                    length: data.length,
                })
                .with_response(response)
                .enabled(true, CollisionGroup::NONE),
        )
}

fn pickup_archetype(assets: &mut AssetStore, data: &PickupArchetypeData) -> GameObject {
    GameObject::new(data.name.clone(), GameObjectType::Consumable)
        .with_component(MeshRenderer::new(
            assets.mesh(&data.mesh),
            assets.material(&data.material),
        ))
        .with_component(PickupBehaviour::new(
            data.description.clone(),
            data.value,
            data.sound.clone(),
        ))
        .with_component(
            Collider::new()
                .with_primitive(ColliderPrimitive::Box {
                    center: Vec3::ZERO,
                    half_extents: Vec3::from_array(data.half_extents),
                })
                .enabled(false, PICKUP_GROUP),
        )
}

fn prop_object(assets: &mut AssetStore, data: &PropData) -> GameObject {
    let mut object = GameObject::new(data.name.clone(), data.object_type)
        .with_transform(Transform::from(data.transform))
        .with_component(MeshRenderer::new(
            assets.mesh(&data.mesh),
            assets.material(&data.material),
        ));
    if let Some(half_extents) = data.half_extents {
        let mut collider = Collider::new().with_primitive(ColliderPrimitive::Box {
            center: Vec3::ZERO,
            half_extents: Vec3::from_array(half_extents),
        });
        // moving props push the player instead of being pushed
        collider = collider.immovable();
        object.add_component(collider.enabled(true, CollisionGroup::NONE));
    }
    if !data.path.is_empty() {
        object.add_component(CurveController::new(
            Curve3::new(data.path.clone()),
            data.looped,
        ));
    }
    object
}

fn ui_object(assets: &mut AssetStore, data: &SpriteData) -> GameObject {
    let texture = assets.texture(&data.texture, data.width, data.height);
    GameObject::new(data.name.clone(), GameObjectType::Ui)
        .with_sprite(UiSprite::new(texture, data.position))
}
