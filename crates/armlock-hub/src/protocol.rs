use crate::{HubCommand, UnlockMode};
use armlock_core::{Arm, ArmbandEvent, Pose};
use glam::Quat;
use std::collections::VecDeque;
use thiserror::Error;

/// Frame marker at the start of every hub message.
const MAGIC: [u8; 2] = [0xa9, 0x5c];

/// Frame layout: MAGIC (2) + kind (1) + payload length (1) + payload.
const FRAME_HEADER_LEN: usize = 4;

// Hub -> client event kinds.
const MSG_ORIENTATION: u8 = 0x01;
const MSG_POSE: u8 = 0x02;
const MSG_ARM_SYNC: u8 = 0x03;
const MSG_ARM_UNSYNC: u8 = 0x04;
const MSG_UNPAIR: u8 = 0x05;
const MSG_UNLOCKED: u8 = 0x06;
const MSG_LOCKED: u8 = 0x07;

// Client -> hub command kinds.
const CMD_UNLOCK: u8 = 0x10;
const CMD_LOCK: u8 = 0x11;
const CMD_NOTIFY_USER: u8 = 0x12;

/// Orientation payload: 4 x f32 LE (w, x, y, z).
const ORIENTATION_PAYLOAD_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Unknown hub message kind 0x{0:02x}")]
    UnknownKind(u8),
    #[error("Message kind 0x{kind:02x} carried {len} payload bytes")]
    BadPayload { kind: u8, len: usize },
}

/// Streaming parser for the hub's framed TCP protocol.
///
/// Feed raw bytes via `push_data`, then drain decoded events via
/// `next_event`. Incomplete frames are never an error; the parser waits
/// for more input. A decode error consumes the offending frame, so the
/// stream resynchronizes on the next call.
pub struct EventParser {
    buffer: VecDeque<u8>,
}

impl EventParser {
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::with_capacity(1024),
        }
    }

    /// Append received bytes to the internal buffer.
    pub fn push_data(&mut self, data: &[u8]) {
        self.buffer.extend(data);
    }

    /// Try to extract the next complete event from the buffer.
    /// Returns `None` if no complete frame is available yet.
    pub fn next_event(&mut self) -> Option<Result<ArmbandEvent, ProtocolError>> {
        let (kind, payload, frame_end) = {
            let buf = self.buffer.make_contiguous();

            let start = find_pattern(buf, &MAGIC)?;
            if buf.len() < start + FRAME_HEADER_LEN {
                return None;
            }
            let kind = buf[start + 2];
            let len = buf[start + 3] as usize;
            let payload_start = start + FRAME_HEADER_LEN;
            if buf.len() < payload_start + len {
                return None;
            }
            (
                kind,
                buf[payload_start..payload_start + len].to_vec(),
                payload_start + len,
            )
        };

        // Advance past this frame (and any garbage before it).
        self.buffer.drain(..frame_end);

        Some(decode_event(kind, &payload))
    }
}

impl Default for EventParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode one complete frame's kind + payload into an event.
fn decode_event(kind: u8, payload: &[u8]) -> Result<ArmbandEvent, ProtocolError> {
    let expect_len = |len: usize| {
        if payload.len() == len {
            Ok(())
        } else {
            Err(ProtocolError::BadPayload {
                kind,
                len: payload.len(),
            })
        }
    };

    match kind {
        MSG_ORIENTATION => {
            expect_len(ORIENTATION_PAYLOAD_LEN)?;
            let f = |offset: usize| -> f32 {
                let bytes: [u8; 4] = payload[offset..offset + 4].try_into().unwrap();
                f32::from_le_bytes(bytes)
            };
            // Layout: [w, x, y, z]
            Ok(ArmbandEvent::Orientation(Quat::from_xyzw(
                f(4),
                f(8),
                f(12),
                f(0),
            )))
        }
        MSG_POSE => {
            expect_len(1)?;
            Ok(ArmbandEvent::Pose(Pose::from_wire(payload[0])))
        }
        MSG_ARM_SYNC => {
            expect_len(1)?;
            Ok(ArmbandEvent::ArmSync(Arm::from_wire(payload[0])))
        }
        MSG_ARM_UNSYNC => {
            expect_len(0)?;
            Ok(ArmbandEvent::ArmUnsync)
        }
        MSG_UNPAIR => {
            expect_len(0)?;
            Ok(ArmbandEvent::Unpair)
        }
        MSG_UNLOCKED => {
            expect_len(0)?;
            Ok(ArmbandEvent::Unlocked)
        }
        MSG_LOCKED => {
            expect_len(0)?;
            Ok(ArmbandEvent::Locked)
        }
        other => Err(ProtocolError::UnknownKind(other)),
    }
}

/// Encode an outgoing device command as one frame.
pub(crate) fn encode_command(command: &HubCommand) -> Vec<u8> {
    let (kind, payload): (u8, &[u8]) = match command {
        HubCommand::Unlock(UnlockMode::Timed) => (CMD_UNLOCK, &[0x00]),
        HubCommand::Unlock(UnlockMode::Hold) => (CMD_UNLOCK, &[0x01]),
        HubCommand::Lock => (CMD_LOCK, &[]),
        HubCommand::NotifyUserAction => (CMD_NOTIFY_USER, &[]),
    };

    let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + payload.len());
    frame.extend_from_slice(&MAGIC);
    frame.push(kind);
    frame.push(payload.len() as u8);
    frame.extend_from_slice(payload);
    frame
}

/// Find the first occurrence of `pattern` in `data`.
fn find_pattern(data: &[u8], pattern: &[u8]) -> Option<usize> {
    data.windows(pattern.len())
        .position(|window| window == pattern)
}
