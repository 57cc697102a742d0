//! Trigger volume that raises the alarm while the thief is inside it

use bevy_math::Vec3;

use crate::signaling::Signaling;
use crate::sink::AudioSink;

/// Anything that can wander into a trigger zone
pub trait Occupant {
    /// Only thieves set off the alarm
    fn is_thief(&self) -> bool;
}

/// Receiver of trigger edges
pub trait SignalTarget {
    fn start_signal(&mut self);
    fn stop_signal(&mut self);
}

impl<S: AudioSink> SignalTarget for Signaling<S> {
    fn start_signal(&mut self) {
        Signaling::start_signal(self);
    }

    fn stop_signal(&mut self) {
        Signaling::stop_signal(self);
    }
}

/// Axis-aligned box volume
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerZone {
    pub min: Vec3,
    pub max: Vec3,
}

impl TriggerZone {
    /// Build a zone from two opposite corners in any order
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self::new(center - half, center + half)
    }

    /// Inclusive containment test
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// Edge produced when the tracked occupant crosses the zone boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneEvent {
    Entered,
    Exited,
}

/// Zone plus the occupancy flag derived from it
#[derive(Clone, Debug)]
pub struct SignalingTrigger {
    zone: TriggerZone,
    occupied: bool,
}

impl SignalingTrigger {
    pub fn new(zone: TriggerZone) -> Self {
        Self {
            zone,
            occupied: false,
        }
    }

    /// Collider entered the zone. Non-thieves and a missing target are ignored.
    pub fn on_trigger_enter(&mut self, other: &dyn Occupant, target: Option<&mut dyn SignalTarget>) {
        if !other.is_thief() {
            return;
        }

        self.occupied = true;
        if let Some(target) = target {
            target.start_signal();
        }
    }

    /// Collider left the zone. Non-thieves and a missing target are ignored.
    pub fn on_trigger_exit(&mut self, other: &dyn Occupant, target: Option<&mut dyn SignalTarget>) {
        if !other.is_thief() {
            return;
        }

        self.occupied = false;
        if let Some(target) = target {
            target.stop_signal();
        }
    }

    /// Derive enter/exit from where the occupant is this frame
    pub fn track(
        &mut self,
        other: &dyn Occupant,
        position: Vec3,
        target: Option<&mut dyn SignalTarget>,
    ) -> Option<ZoneEvent> {
        if !other.is_thief() {
            return None;
        }

        let inside = self.zone.contains(position);
        match (self.occupied, inside) {
            (false, true) => {
                log::info!("intruder entered zone at {:?}", position);
                self.on_trigger_enter(other, target);
                Some(ZoneEvent::Entered)
            }
            (true, false) => {
                log::info!("intruder left zone at {:?}", position);
                self.on_trigger_exit(other, target);
                Some(ZoneEvent::Exited)
            }
            _ => None,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    pub fn zone(&self) -> &TriggerZone {
        &self.zone
    }
}
