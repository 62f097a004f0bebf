use std::collections::BTreeMap;

use tracing::debug;

use crate::command::{Command, OutdoorMode};
use crate::config::Config;
use crate::log::CommandLog;
use crate::schedule::{DayMask, PackedSchedule};
use crate::transport::{PublishError, Transport};

#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("unknown device: {0}")]
    UnknownDevice(String),
    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// A controllable entity with locally-tracked boolean state.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Entity {
    IndoorZone(u8),
    Override(String),
}

/// Record of one optimistic state change, consumed by either commit or
/// rollback. Keeps the revert path data-driven.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Transition {
    pub entity: Entity,
    pub previous: bool,
    pub next: bool,
}

/// Locally believed state of every controllable entity. Reset to defaults on
/// restart; once a command lands, the building controller is the source of
/// truth.
#[derive(Debug, Default)]
struct DeviceState {
    indoor: BTreeMap<u8, bool>,
    overrides: BTreeMap<String, bool>,
    outdoor: BTreeMap<String, OutdoorMode>,
}

/// Root coordinator: owns the transport, the device state and the command
/// log. All mutation funnels through here; rendering code only reads.
///
/// Toggles are optimistic: local state flips before the publish goes out, and
/// is reverted if the publish fails. Commands are never retried.
pub struct Controller<T: Transport> {
    transport: T,
    state: DeviceState,
    zone_labels: BTreeMap<u8, String>,
    access_labels: BTreeMap<u8, String>,
    log: CommandLog,
}

impl<T: Transport> Controller<T> {
    pub fn new(transport: T, config: &Config) -> Self {
        let mut state = DeviceState::default();
        let mut zone_labels = BTreeMap::new();
        let mut access_labels = BTreeMap::new();

        for zone in config.zones.values() {
            state.indoor.insert(zone.id, false);
            zone_labels.insert(zone.id, zone.label.clone());
        }
        for access in config.access.values() {
            access_labels.insert(access.id, access.label.clone());
        }
        for device in &config.overrides {
            state.overrides.insert(device.clone(), false);
        }
        for target in &config.outdoor {
            state.outdoor.insert(target.clone(), OutdoorMode::Auto);
        }

        Self {
            transport,
            state,
            zone_labels,
            access_labels,
            log: CommandLog::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    pub fn indoor_light(&self, zone_id: u8) -> Option<bool> {
        self.state.indoor.get(&zone_id).copied()
    }

    pub fn override_active(&self, device: &str) -> Option<bool> {
        self.state.overrides.get(device).copied()
    }

    pub fn outdoor_mode(&self, target: &str) -> Option<OutdoorMode> {
        self.state.outdoor.get(target).copied()
    }

    pub fn log(&self) -> &CommandLog {
        &self.log
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Apply the flipped value locally and record where we came from.
    fn begin(&mut self, entity: Entity) -> Result<Transition, ControlError> {
        let previous = match &entity {
            Entity::IndoorZone(zone_id) => {
                let state = self
                    .state
                    .indoor
                    .get_mut(zone_id)
                    .ok_or_else(|| ControlError::UnknownDevice(format!("zone {zone_id}")))?;
                let previous = *state;
                *state = !previous;
                previous
            }
            Entity::Override(device) => {
                let state = self
                    .state
                    .overrides
                    .get_mut(device)
                    .ok_or_else(|| ControlError::UnknownDevice(device.clone()))?;
                let previous = *state;
                *state = !previous;
                previous
            }
        };
        Ok(Transition {
            next: !previous,
            previous,
            entity,
        })
    }

    fn rollback(&mut self, transition: &Transition) {
        debug!("Rolling back {:?}", transition);
        match &transition.entity {
            Entity::IndoorZone(zone_id) => {
                self.state.indoor.insert(*zone_id, transition.previous);
            }
            Entity::Override(device) => {
                self.state
                    .overrides
                    .insert(device.clone(), transition.previous);
            }
        }
    }

    /// Publish and, only on success, append the log entry.
    async fn dispatch(&mut self, command: &Command, description: String) -> Result<(), PublishError> {
        self.transport
            .publish(command.topic(), command.to_payload())
            .await?;
        self.log.push(command.kind(), description);
        Ok(())
    }

    /// Pulse a door or gate. No local state; log on success.
    pub async fn send_access(&mut self, command_id: u8) -> Result<(), ControlError> {
        let name = self
            .access_labels
            .get(&command_id)
            .ok_or_else(|| ControlError::UnknownDevice(format!("access {command_id}")))?
            .clone();
        let command = Command::Access { command_id };
        self.dispatch(&command, format!("{name} command sent"))
            .await
            .map_err(Into::into)
    }

    /// Flip one indoor zone. Returns the new state on success; on failure the
    /// zone is reverted and nothing is logged.
    pub async fn toggle_indoor_light(&mut self, zone_id: u8) -> Result<bool, ControlError> {
        let zone = self
            .zone_labels
            .get(&zone_id)
            .ok_or_else(|| ControlError::UnknownDevice(format!("zone {zone_id}")))?
            .clone();

        let transition = self.begin(Entity::IndoorZone(zone_id))?;
        let command = Command::IndoorLightToggle {
            zone_id,
            zone: zone.clone(),
        };
        let state = if transition.next { "on" } else { "off" };
        if let Err(err) = self.dispatch(&command, format!("{zone} switched {state}")).await {
            self.rollback(&transition);
            return Err(err.into());
        }
        Ok(transition.next)
    }

    /// Switch every indoor zone off and send one bulk command. On failure the
    /// per-zone states are intentionally not restored.
    pub async fn turn_off_all_lights(&mut self) -> Result<(), ControlError> {
        for state in self.state.indoor.values_mut() {
            *state = false;
        }
        self.dispatch(&Command::GlobalOff, "All indoor lights off".to_string())
            .await
            .map_err(Into::into)
    }

    /// Flip a manual override (forces the device irrespective of its
    /// schedule). Same optimistic protocol as indoor zones.
    pub async fn toggle_override(&mut self, device: &str) -> Result<bool, ControlError> {
        if !self.state.overrides.contains_key(device) {
            return Err(ControlError::UnknownDevice(device.to_string()));
        }

        let transition = self.begin(Entity::Override(device.to_string()))?;
        let command = Command::ManualToggle {
            device: device.to_string(),
            manual: transition.next,
        };
        let state = if transition.next { "enabled" } else { "disabled" };
        let description = format!("{device} override {state}");
        if let Err(err) = self.dispatch(&command, description).await {
            self.rollback(&transition);
            return Err(err.into());
        }
        Ok(transition.next)
    }

    /// Reprogram an outdoor light. The believed mode follows the controller,
    /// so it only changes once the publish is confirmed accepted.
    pub async fn configure_outdoor_light(
        &mut self,
        target: &str,
        mode: OutdoorMode,
        on_time: u16,
        off_time: u16,
    ) -> Result<(), ControlError> {
        if !self.state.outdoor.contains_key(target) {
            return Err(ControlError::UnknownDevice(target.to_string()));
        }

        let command = Command::OutdoorLightConfig {
            target: target.to_string(),
            mode,
            on_time,
            off_time,
        };
        self.dispatch(&command, format!("{target} configuration updated"))
            .await?;
        self.state.outdoor.insert(target.to_string(), mode);
        Ok(())
    }

    /// Upload a packed weekly schedule. The controller persists it; nothing
    /// is kept locally.
    pub async fn save_schedule(
        &mut self,
        device: &str,
        schedule: PackedSchedule,
        enabled_days: DayMask,
    ) -> Result<(), ControlError> {
        let command = Command::ScheduleSave {
            device: device.to_string(),
            schedule,
            enabled_days,
        };
        self.dispatch(&command, format!("{device} weekly schedule saved"))
            .await
            .map_err(Into::into)
    }
}
