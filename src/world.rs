//! Frame driver: thief, trigger and alarm stepped together
//!
//! One `Patrol::step` is one rendered frame. Order matters: the thief moves
//! first, the trigger sees the new position, then the alarm ramps.

use bevy_math::{Vec2, Vec3};

use crate::config::{SignalConfig, ThiefConfig};
use crate::ramp::RampPhase;
use crate::signaling::Signaling;
use crate::sink::AudioSink;
use crate::thief::{CameraBasis, FlatGround, Thief, ThiefInput};
use crate::trigger::{SignalingTrigger, TriggerZone, ZoneEvent};

/// Distance at which a waypoint counts as reached
pub const ARRIVE_RADIUS: f32 = 0.25;

/// What happened during one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub time: f32,
    pub position: Vec3,
    pub event: Option<ZoneEvent>,
    pub volume: f32,
    pub playing: bool,
    pub phase: RampPhase,
}

pub struct Patrol<S: AudioSink> {
    thief: Thief,
    trigger: SignalingTrigger,
    signaling: Signaling<S>,
    ground: FlatGround,
    camera: CameraBasis,
    time: f32,
    frame: u64,
}

impl<S: AudioSink> Patrol<S> {
    pub fn new(thief: Thief, trigger: SignalingTrigger, signaling: Signaling<S>) -> Self {
        Self {
            thief,
            trigger,
            signaling,
            ground: FlatGround::default(),
            camera: CameraBasis::from_yaw(0.0),
            time: 0.0,
            frame: 0,
        }
    }

    pub fn with_ground(mut self, ground: FlatGround) -> Self {
        self.ground = ground;
        self
    }

    pub fn with_camera(mut self, camera: CameraBasis) -> Self {
        self.camera = camera;
        self
    }

    /// Advance the whole scene by one frame
    pub fn step(&mut self, dt: f32, input: &ThiefInput) -> FrameReport {
        self.thief.apply_input(input);
        self.thief.update(dt, Some(&self.camera), &self.ground);

        let position = self.thief.position();
        let event = self.trigger.track(&self.thief, position, Some(&mut self.signaling));
        self.signaling.update(dt);

        self.time += dt;
        self.frame += 1;

        FrameReport {
            frame: self.frame,
            time: self.time,
            position,
            event,
            volume: self.signaling.volume(),
            playing: self.signaling.is_playing(),
            phase: self.signaling.phase(),
        }
    }

    pub fn thief(&self) -> &Thief {
        &self.thief
    }

    pub fn thief_mut(&mut self) -> &mut Thief {
        &mut self.thief
    }

    pub fn trigger(&self) -> &SignalingTrigger {
        &self.trigger
    }

    pub fn signaling(&self) -> &Signaling<S> {
        &self.signaling
    }

    pub fn signaling_mut(&mut self) -> &mut Signaling<S> {
        &mut self.signaling
    }

    pub fn camera(&self) -> &CameraBasis {
        &self.camera
    }

    pub fn time(&self) -> f32 {
        self.time
    }
}

/// A point to walk to and how long to linger there
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Waypoint {
    pub position: Vec3,
    pub pause: f32,
}

impl Waypoint {
    pub fn new(position: Vec3, pause: f32) -> Self {
        Self {
            position,
            pause: pause.max(0.0),
        }
    }
}

/// Scripted input source walking the thief through a list of waypoints
#[derive(Clone, Debug)]
pub struct Waypoints {
    points: Vec<Waypoint>,
    index: usize,
    paused_for: f32,
}

impl Waypoints {
    pub fn new(points: Vec<Waypoint>) -> Self {
        Self {
            points,
            index: 0,
            paused_for: 0.0,
        }
    }

    /// Input for this frame given where the thief is and how the camera looks
    pub fn next_input(&mut self, dt: f32, position: Vec3, camera: &CameraBasis) -> ThiefInput {
        let Some(waypoint) = self.points.get(self.index).copied() else {
            return ThiefInput::default();
        };

        let offset = Vec3::new(waypoint.position.x - position.x, 0.0, waypoint.position.z - position.z);
        if offset.length() <= ARRIVE_RADIUS {
            self.paused_for += dt;
            if self.paused_for >= waypoint.pause {
                self.paused_for = 0.0;
                self.index += 1;
            }
            return ThiefInput::default();
        }

        let direction = offset.normalize_or_zero();
        ThiefInput {
            movement: Vec2::new(direction.dot(camera.right), direction.dot(camera.forward)),
            ..ThiefInput::default()
        }
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.points.len()
    }

    pub fn current(&self) -> Option<&Waypoint> {
        self.points.get(self.index)
    }
}

/// The stock scene: a vault zone ten units ahead of the thief, who walks in,
/// lingers long enough for the alarm to peak, then walks out the far side.
pub fn vault_scene<S: AudioSink>(
    signal_config: SignalConfig,
    thief_config: ThiefConfig,
    sink: Option<S>,
) -> (Patrol<S>, Waypoints) {
    let zone = TriggerZone::from_center(Vec3::new(0.0, 1.0, 10.0), Vec3::new(3.0, 2.0, 3.0));
    let thief = Thief::new(thief_config, Vec3::ZERO);
    let signaling = Signaling::new(signal_config, sink);
    let patrol = Patrol::new(thief, SignalingTrigger::new(zone), signaling);

    let linger = signal_config.update_delay + signal_config.max_volume / signal_config.increase_speed + 0.5;
    let route = Waypoints::new(vec![
        Waypoint::new(Vec3::new(0.0, 0.0, 10.0), linger),
        Waypoint::new(Vec3::new(0.0, 0.0, 20.0), 0.0),
    ]);

    (patrol, route)
}
