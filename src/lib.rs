//! Operator control core for a building's actuators: doors and gates, indoor
//! and outdoor lighting zones, heating/compressor overrides, and quarter-hour
//! weekly activation schedules, dispatched over an MQTT broker.
//!
//! The interesting parts are the schedule codec ([`schedule`]) — a 7x24x4
//! activation grid packed into 12 bytes plus a day-enable mask — and the
//! optimistic command dispatch in [`state`], which flips local state before
//! the publish and reverts it on failure.

pub mod command;
pub mod config;
pub mod consts;
pub mod log;
pub mod schedule;
pub mod state;
pub mod template;
pub mod transport;
