use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::consts;
use crate::schedule::{DayMask, PackedSchedule};

/// Wire value of the bulk "all indoor lights off" command.
const GLOBAL_OFF_CMD: u8 = 99;

/// Outdoor light operating mode.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum OutdoorMode {
    /// Always off.
    Off = 0,
    /// Follows the programmed on/off times.
    Auto = 1,
    /// Always on, schedule ignored.
    AlwaysOn = 2,
}

impl OutdoorMode {
    pub fn as_wire(self) -> u8 {
        self as u8
    }

    pub fn from_wire(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Off),
            1 => Some(Self::Auto),
            2 => Some(Self::AlwaysOn),
            _ => None,
        }
    }
}

/// Command category, used for topic routing and log entries.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CommandKind {
    Access,
    Light,
    Global,
    Control,
    Outdoor,
    Schedule,
}

impl CommandKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Light => "light",
            Self::Global => "global",
            Self::Control => "control",
            Self::Outdoor => "outdoor",
            Self::Schedule => "schedule",
        }
    }
}

/// A command addressed to the building controller. Built synchronously from
/// an operator action, serialized once, never retried.
#[derive(Clone, Debug)]
pub enum Command {
    /// Pulse a door or gate actuator.
    Access { command_id: u8 },
    /// Flip one indoor lighting zone.
    IndoorLightToggle { zone_id: u8, zone: String },
    /// Switch every indoor zone off at once.
    GlobalOff,
    /// Force a device on or off irrespective of its programmed schedule.
    ManualToggle { device: String, manual: bool },
    /// Reprogram an outdoor light's mode and on/off times.
    OutdoorLightConfig {
        target: String,
        mode: OutdoorMode,
        /// Minutes since midnight.
        on_time: u16,
        off_time: u16,
    },
    /// Upload a packed weekly schedule to a device.
    ScheduleSave {
        device: String,
        schedule: PackedSchedule,
        enabled_days: DayMask,
    },
}

/// Bare `{cmd, type}` shape shared by access pulses and the global off.
#[derive(Serialize)]
struct CmdPayload<'a> {
    cmd: u8,
    #[serde(rename = "type")]
    kind: &'a str,
    timestamp: String,
}

#[derive(Serialize)]
struct IndoorLightPayload<'a> {
    cmd: u8,
    #[serde(rename = "type")]
    kind: &'a str,
    zone: &'a str,
    timestamp: String,
}

#[derive(Serialize)]
struct ManualPayload<'a> {
    device: &'a str,
    manual: bool,
    timestamp: String,
}

#[derive(Serialize)]
struct OutdoorLightPayload<'a> {
    target: &'a str,
    mode: u8,
    #[serde(rename = "onTime")]
    on_time: u16,
    #[serde(rename = "offTime")]
    off_time: u16,
    timestamp: String,
}

#[derive(Serialize)]
struct SchedulePayload<'a> {
    device: &'a str,
    schedule: &'a PackedSchedule,
    #[serde(rename = "enabledDays")]
    enabled_days: DayMask,
    timestamp: String,
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Access { .. } => CommandKind::Access,
            Command::IndoorLightToggle { .. } => CommandKind::Light,
            Command::GlobalOff => CommandKind::Global,
            Command::ManualToggle { .. } => CommandKind::Control,
            Command::OutdoorLightConfig { .. } => CommandKind::Outdoor,
            Command::ScheduleSave { .. } => CommandKind::Schedule,
        }
    }

    pub fn topic(&self) -> &'static str {
        match self {
            Command::Access { .. } => consts::TOPIC_ACCESS,
            // The bulk off rides the indoor light topic with a reserved cmd.
            Command::IndoorLightToggle { .. } | Command::GlobalOff => consts::TOPIC_LIGHTS_INDOOR,
            Command::ManualToggle { .. } => consts::TOPIC_MANUAL,
            Command::OutdoorLightConfig { .. } => consts::TOPIC_LIGHTS_OUTDOOR,
            Command::ScheduleSave { .. } => consts::TOPIC_BACKUP,
        }
    }

    /// Build the JSON payload, stamped at build time.
    pub fn to_payload(&self) -> String {
        let json = match self {
            Command::Access { command_id } => serde_json::to_string(&CmdPayload {
                cmd: *command_id,
                kind: "access",
                timestamp: timestamp(),
            }),
            Command::IndoorLightToggle { zone_id, zone } => {
                serde_json::to_string(&IndoorLightPayload {
                    cmd: *zone_id,
                    kind: "light_indoor_toggle",
                    zone,
                    timestamp: timestamp(),
                })
            }
            Command::GlobalOff => serde_json::to_string(&CmdPayload {
                cmd: GLOBAL_OFF_CMD,
                kind: "global_off",
                timestamp: timestamp(),
            }),
            Command::ManualToggle { device, manual } => serde_json::to_string(&ManualPayload {
                device,
                manual: *manual,
                timestamp: timestamp(),
            }),
            Command::OutdoorLightConfig {
                target,
                mode,
                on_time,
                off_time,
            } => serde_json::to_string(&OutdoorLightPayload {
                target,
                mode: mode.as_wire(),
                on_time: *on_time,
                off_time: *off_time,
                timestamp: timestamp(),
            }),
            Command::ScheduleSave {
                device,
                schedule,
                enabled_days,
            } => serde_json::to_string(&SchedulePayload {
                device,
                schedule,
                enabled_days: *enabled_days,
                timestamp: timestamp(),
            }),
        };
        json.expect("command payloads are serializable")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    fn parse(command: &Command) -> Value {
        serde_json::from_str(&command.to_payload()).expect("payload is valid JSON")
    }

    #[test]
    fn access_payload_shape() {
        let command = Command::Access { command_id: 42 };
        assert_eq!(command.topic(), consts::TOPIC_ACCESS);

        let value = parse(&command);
        assert_eq!(value["cmd"], 42);
        assert_eq!(value["type"], "access");
        assert!(value["timestamp"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn indoor_toggle_payload_shape() {
        let command = Command::IndoorLightToggle {
            zone_id: 3,
            zone: "Green Zone".into(),
        };
        assert_eq!(command.topic(), consts::TOPIC_LIGHTS_INDOOR);

        let value = parse(&command);
        assert_eq!(value["cmd"], 3);
        assert_eq!(value["type"], "light_indoor_toggle");
        assert_eq!(value["zone"], "Green Zone");
    }

    #[test]
    fn global_off_rides_the_indoor_topic() {
        let command = Command::GlobalOff;
        assert_eq!(command.topic(), consts::TOPIC_LIGHTS_INDOOR);

        let value = parse(&command);
        assert_eq!(value["cmd"], 99);
        assert_eq!(value["type"], "global_off");
    }

    #[test]
    fn manual_toggle_payload_shape() {
        let command = Command::ManualToggle {
            device: "boiler".into(),
            manual: true,
        };
        assert_eq!(command.topic(), consts::TOPIC_MANUAL);

        let value = parse(&command);
        assert_eq!(value["device"], "boiler");
        assert_eq!(value["manual"], true);
    }

    #[test]
    fn outdoor_config_payload_shape() {
        let command = Command::OutdoorLightConfig {
            target: "porch".into(),
            mode: OutdoorMode::Auto,
            on_time: 18 * 60,
            off_time: 22 * 60 + 30,
        };
        assert_eq!(command.topic(), consts::TOPIC_LIGHTS_OUTDOOR);

        let value = parse(&command);
        assert_eq!(value["target"], "porch");
        assert_eq!(value["mode"], 1);
        assert_eq!(value["onTime"], 1080);
        assert_eq!(value["offTime"], 1350);
    }

    #[test]
    fn schedule_save_payload_shape() {
        let schedule = PackedSchedule::from_hour_range(8, 18);
        let command = Command::ScheduleSave {
            device: "boiler".into(),
            schedule,
            enabled_days: DayMask(0b0011_1110),
        };
        assert_eq!(command.topic(), consts::TOPIC_BACKUP);

        let value = parse(&command);
        assert_eq!(value["device"], "boiler");
        assert_eq!(value["enabledDays"], 62);
        let bytes = value["schedule"].as_array().unwrap();
        assert_eq!(bytes.len(), 12);
        assert_eq!(bytes[4], 255);
    }

    #[test]
    fn outdoor_mode_wire_values() {
        for mode in [OutdoorMode::Off, OutdoorMode::Auto, OutdoorMode::AlwaysOn] {
            assert_eq!(OutdoorMode::from_wire(mode.as_wire()), Some(mode));
        }
        assert_eq!(OutdoorMode::from_wire(3), None);
    }
}
