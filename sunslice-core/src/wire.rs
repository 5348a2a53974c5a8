//! Node Wire Formats
//!
//! The byte layouts the state handlers exchange with the outside world:
//! the telemetry payload the node transmits each slot, the over-the-air
//! configuration update it may receive back, and the byte-at-a-time frame
//! assembler the anchor serial interrupt feeds.
//!
//! Layouts are fixed and hand-packed little-endian - no allocation, no
//! self-describing envelope, decodable by a host-side tool from the length
//! alone. Radio framing, CRC and RF configuration belong to the transport
//! drivers, not here.

use crate::errors::FrameError;

/// Encoded size of a [`TelemetryPacket`], in bytes.
pub const TELEMETRY_LEN: usize = 17;

/// Encoded size of a [`ConfigUpdate`], in bytes.
pub const CONFIG_UPDATE_LEN: usize = 12;

/// Largest frame payload the assembler accepts.
pub const MAX_PAYLOAD: usize = 64;

/// Per-slot telemetry the node radios out.
///
/// Layout, little-endian:
/// `node_id u8 | temperature f32 | humidity f32 | adaptive_slices u16 |
/// sleep_time u16 | battery_level f32`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TelemetryPacket {
    /// Address of the reporting node
    pub node_id: u8,
    /// Last sampled temperature, in °C
    pub temperature: f32,
    /// Last sampled relative humidity, in %
    pub humidity: f32,
    /// Slices in the current slot
    pub adaptive_slices: u16,
    /// Seconds until the node's next wake
    pub sleep_time: u16,
    /// Storage voltage, in volts
    pub battery_level: f32,
}

impl TelemetryPacket {
    /// Packs the fields into the fixed frame layout.
    pub fn encode(&self) -> [u8; TELEMETRY_LEN] {
        let mut frame = [0u8; TELEMETRY_LEN];

        frame[0] = self.node_id;
        frame[1..5].copy_from_slice(&self.temperature.to_le_bytes());
        frame[5..9].copy_from_slice(&self.humidity.to_le_bytes());
        frame[9..11].copy_from_slice(&self.adaptive_slices.to_le_bytes());
        frame[11..13].copy_from_slice(&self.sleep_time.to_le_bytes());
        frame[13..17].copy_from_slice(&self.battery_level.to_le_bytes());

        frame
    }

    /// Unpacks a frame; tolerates trailing bytes, rejects short input.
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        if bytes.len() < TELEMETRY_LEN {
            return Err(FrameError::Truncated {
                required: TELEMETRY_LEN,
                available: bytes.len(),
            });
        }

        Ok(Self {
            node_id: bytes[0],
            temperature: f32::from_le_bytes(bytes[1..5].try_into().unwrap()),
            humidity: f32::from_le_bytes(bytes[5..9].try_into().unwrap()),
            adaptive_slices: u16::from_le_bytes(bytes[9..11].try_into().unwrap()),
            sleep_time: u16::from_le_bytes(bytes[11..13].try_into().unwrap()),
            battery_level: f32::from_le_bytes(bytes[13..17].try_into().unwrap()),
        })
    }
}

/// Over-the-air configuration update: the three runtime-tunable values.
///
/// Layout, little-endian:
/// `energy_per_sampling_cycle f32 | energy_per_storage_cycle f32 |
/// weighting_factor f32`
///
/// Validation happens when the update is installed
/// ([`Config::apply_update`](crate::Config::apply_update)), not here.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfigUpdate {
    /// Energy cost of one sample-and-transmit slice, in joules
    pub energy_per_sampling_cycle: f32,
    /// Energy cost of one storage cycle, in joules
    pub energy_per_storage_cycle: f32,
    /// Predictor blend factor α
    pub weighting_factor: f32,
}

impl ConfigUpdate {
    /// Packs the update into its fixed frame layout.
    pub fn encode(&self) -> [u8; CONFIG_UPDATE_LEN] {
        let mut frame = [0u8; CONFIG_UPDATE_LEN];

        frame[0..4].copy_from_slice(&self.energy_per_sampling_cycle.to_le_bytes());
        frame[4..8].copy_from_slice(&self.energy_per_storage_cycle.to_le_bytes());
        frame[8..12].copy_from_slice(&self.weighting_factor.to_le_bytes());

        frame
    }

    /// Unpacks an update payload; tolerates trailing bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        if bytes.len() < CONFIG_UPDATE_LEN {
            return Err(FrameError::Truncated {
                required: CONFIG_UPDATE_LEN,
                available: bytes.len(),
            });
        }

        Ok(Self {
            energy_per_sampling_cycle: f32::from_le_bytes(bytes[0..4].try_into().unwrap()),
            energy_per_storage_cycle: f32::from_le_bytes(bytes[4..8].try_into().unwrap()),
            weighting_factor: f32::from_le_bytes(bytes[8..12].try_into().unwrap()),
        })
    }
}

/// Byte-at-a-time assembler for `[address, kind, len, payload…]` frames.
///
/// Fed one byte per serial interrupt by an anchor binding. [`Self::digest`]
/// reports frame completion; the assembled header and payload stay
/// readable until the next byte arrives, and the assembler is immediately
/// ready for the following frame.
#[derive(Debug, Clone)]
pub struct FrameAssembler {
    cursor: usize,
    address: u8,
    kind: u8,
    payload_len: u8,
    payload: [u8; MAX_PAYLOAD],
}

impl FrameAssembler {
    /// Creates an assembler waiting for a frame's first byte.
    pub const fn new() -> Self {
        Self {
            cursor: 0,
            address: 0,
            kind: 0,
            payload_len: 0,
            payload: [0; MAX_PAYLOAD],
        }
    }

    /// Consumes one received byte.
    ///
    /// Returns `true` exactly when the byte completes a frame - at the
    /// `len + 3`rd byte. Payload bytes beyond [`MAX_PAYLOAD`] are counted
    /// for completion but dropped.
    pub fn digest(&mut self, byte: u8) -> bool {
        match self.cursor {
            0 => self.address = byte,
            1 => self.kind = byte,
            2 => self.payload_len = byte,
            n => {
                let index = n - 3;
                if index < MAX_PAYLOAD {
                    self.payload[index] = byte;
                }
            }
        }

        self.cursor += 1;

        if self.cursor == self.payload_len as usize + 3 {
            self.cursor = 0;
            true
        } else {
            false
        }
    }

    /// Destination address of the last assembled frame.
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Kind byte of the last assembled frame.
    pub const fn kind(&self) -> u8 {
        self.kind
    }

    /// Payload of the last assembled frame.
    pub fn payload(&self) -> &[u8] {
        let len = (self.payload_len as usize).min(MAX_PAYLOAD);
        &self.payload[..len]
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}
