//! Timed performance events and their 3-byte MIDI encoding.
//!
//! Input events (note-on/note-off from the host) and output events (pan,
//! note-on, note-off synthesized from collisions) share one type. `time` is
//! a sample offset from the start of the block being processed.

use core::fmt;

/// Controller number carrying pan.
pub const PAN_CC: u8 = 10;

const NOTE_OFF: u8 = 0x80;
const NOTE_ON: u8 = 0x90;
const CONTROL_CHANGE: u8 = 0xB0;

/// What an event does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventKind {
    /// Start a note at `velocity` in `[0, 1]`.
    NoteOn {
        /// Note number, 0..=127.
        note: u8,
        /// Normalized velocity.
        velocity: f32,
    },
    /// Release a note.
    NoteOff {
        /// Note number, 0..=127.
        note: u8,
    },
    /// Pan for subsequent notes on the event's channel, `-1` to `1`.
    Pan {
        /// Pan position.
        value: f32,
    },
}

/// A performance event at a sample offset on one of 16 channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    /// Sample offset within the current block.
    pub time: u32,
    /// Channel, 0..=15.
    pub channel: u8,
    /// Payload.
    pub kind: EventKind,
}

impl Event {
    /// Note-on on channel 0.
    pub fn note_on(time: u32, note: u8, velocity: f32) -> Self {
        Self {
            time,
            channel: 0,
            kind: EventKind::NoteOn { note, velocity },
        }
    }

    /// Note-off on channel 0.
    pub fn note_off(time: u32, note: u8) -> Self {
        Self {
            time,
            channel: 0,
            kind: EventKind::NoteOff { note },
        }
    }

    /// Pan change on channel 0.
    pub fn pan(time: u32, value: f32) -> Self {
        Self {
            time,
            channel: 0,
            kind: EventKind::Pan { value },
        }
    }

    /// Same event on `channel` (masked to 0..=15).
    pub fn on_channel(self, channel: u8) -> Self {
        Self {
            channel: channel & 0x0F,
            ..self
        }
    }

    /// Note number, if this is a note event.
    pub fn note(&self) -> Option<u8> {
        match self.kind {
            EventKind::NoteOn { note, .. } | EventKind::NoteOff { note } => Some(note),
            EventKind::Pan { .. } => None,
        }
    }

    /// Encode as a 3-byte channel message.
    ///
    /// Note-on velocity is scaled to 1..=127 so that it never reads back as a
    /// note-off. Pan becomes CC 10 with `round((pan + 1) * 64)` clamped to 0..=127.
    ///
    /// ```rust
    /// use particula_engine::Event;
    ///
    /// assert_eq!(Event::note_on(0, 60, 1.0).on_channel(2).to_midi(), [0x92, 60, 127]);
    /// assert_eq!(Event::pan(0, 0.0).to_midi(), [0xB0, 10, 64]);
    /// ```
    pub fn to_midi(&self) -> [u8; 3] {
        let ch = self.channel & 0x0F;
        match self.kind {
            EventKind::NoteOn { note, velocity } => {
                // Zero stays a note-off, as the voice bank treats it; any
                // positive velocity sounds.
                let v = if velocity <= 0.0 {
                    0
                } else {
                    (velocity.min(1.0) * 127.0).round().max(1.0) as u8
                };
                [NOTE_ON | ch, note & 0x7F, v]
            }
            EventKind::NoteOff { note } => [NOTE_OFF | ch, note & 0x7F, 0],
            EventKind::Pan { value } => [CONTROL_CHANGE | ch, PAN_CC, encode_pan(value)],
        }
    }

    /// Decode a channel message. Returns `None` for anything this engine
    /// does not understand, including data bytes above 127.
    ///
    /// A note-on with velocity 0 decodes as a note-off.
    pub fn from_midi(time: u32, bytes: &[u8]) -> Option<Self> {
        let &[status, data1, data2] = bytes.get(..3)? else {
            return None;
        };
        if data1 > 0x7F || data2 > 0x7F {
            return None;
        }
        let channel = status & 0x0F;
        let kind = match status & 0xF0 {
            NOTE_ON if data2 > 0 => EventKind::NoteOn {
                note: data1,
                velocity: f32::from(data2) / 127.0,
            },
            NOTE_ON | NOTE_OFF => EventKind::NoteOff { note: data1 },
            CONTROL_CHANGE if data1 == PAN_CC => EventKind::Pan {
                value: decode_pan(data2),
            },
            _ => return None,
        };
        Some(Self {
            time,
            channel,
            kind,
        })
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EventKind::NoteOn { note, velocity } => write!(
                f,
                "@{} ch{} note-on {} vel {:.3}",
                self.time, self.channel, note, velocity
            ),
            EventKind::NoteOff { note } => {
                write!(f, "@{} ch{} note-off {}", self.time, self.channel, note)
            }
            EventKind::Pan { value } => {
                write!(f, "@{} ch{} pan {:+.3}", self.time, self.channel, value)
            }
        }
    }
}

/// Pan `[-1, 1]` to a controller value.
#[inline]
pub fn encode_pan(pan: f32) -> u8 {
    ((pan.clamp(-1.0, 1.0) + 1.0) * 64.0).round().min(127.0) as u8
}

/// Controller value to pan, `value / 64 - 1`.
#[inline]
pub fn decode_pan(value: u8) -> f32 {
    f32::from(value) / 64.0 - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_on_encoding() {
        assert_eq!(Event::note_on(0, 60, 0.5).to_midi(), [0x90, 60, 64]);
        // tiny velocities never collapse to a note-off
        assert_eq!(Event::note_on(0, 60, 0.001).to_midi()[2], 1);
    }

    #[test]
    fn silent_note_on_encodes_as_release() {
        let bytes = Event::note_on(0, 60, 0.0).to_midi();
        assert_eq!(bytes, [0x90, 60, 0]);
        let decoded = Event::from_midi(0, &bytes).unwrap();
        assert_eq!(decoded.kind, EventKind::NoteOff { note: 60 });
        assert_eq!(Event::note_on(0, 60, -0.5).to_midi()[2], 0);
    }

    #[test]
    fn zero_velocity_note_on_is_note_off() {
        let ev = Event::from_midi(5, &[0x93, 61, 0]).unwrap();
        assert_eq!(ev.kind, EventKind::NoteOff { note: 61 });
        assert_eq!(ev.channel, 3);
        assert_eq!(ev.time, 5);
    }

    #[test]
    fn pan_encoding_clamps() {
        assert_eq!(encode_pan(-1.0), 0);
        assert_eq!(encode_pan(1.0), 127);
        assert_eq!(encode_pan(5.0), 127);
        assert_eq!(decode_pan(64), 0.0);
        assert_eq!(decode_pan(0), -1.0);
    }

    #[test]
    fn malformed_messages_are_rejected() {
        assert!(Event::from_midi(0, &[0x90, 200, 10]).is_none());
        assert!(Event::from_midi(0, &[0x90, 60]).is_none());
        assert!(Event::from_midi(0, &[0xB0, 7, 10]).is_none());
        assert!(Event::from_midi(0, &[0xE0, 0, 64]).is_none());
    }

    #[test]
    fn decode_encoded_pan() {
        let ev = Event::pan(9, 0.5).on_channel(15);
        let back = Event::from_midi(9, &ev.to_midi()).unwrap();
        assert_eq!(back.channel, 15);
        assert_eq!(back.kind, EventKind::Pan { value: 0.5 });
    }

    #[test]
    fn display() {
        let ev = Event::note_off(12, 64).on_channel(1);
        assert_eq!(ev.to_string(), "@12 ch1 note-off 64");
    }
}
