//! Note-number helpers: tuning, validity, display names and hue.

use core::fmt;

/// Highest valid note number.
pub const MAX_NOTE: i32 = 127;

/// Whether `note` lies in the 0..=127 performance-note domain.
#[inline]
pub fn is_valid_note(note: i32) -> bool {
    (0..=MAX_NOTE).contains(&note)
}

/// Convert a note number to frequency in Hz.
///
/// Uses standard tuning: A4 (note 69) = 440 Hz.
#[inline]
pub fn midi_to_freq(note: u8) -> f32 {
    440.0 * libm::powf(2.0, (note as f32 - 69.0) / 12.0)
}

/// Display hue in degrees for a note, one colour per pitch class.
///
/// `hue = 30 + 360 * (note % 12) / 12`
#[inline]
pub fn hue_for_note(note: u8) -> f32 {
    30.0 + 360.0 * f32::from(note % 12) / 12.0
}

const PITCH_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Printable note name, e.g. `C4` or `F#-1`.
///
/// ```rust
/// use particula_core::NoteName;
///
/// assert_eq!(NoteName::from(60).to_string(), "C4");
/// assert_eq!(NoteName::from(1).to_string(), "C#-1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteName {
    pitch: &'static str,
    octave: i8,
}

impl NoteName {
    /// Pitch-class name (`"C"`, `"C#"`, ...).
    pub fn pitch(self) -> &'static str {
        self.pitch
    }

    /// Octave number, with note 60 in octave 4.
    pub fn octave(self) -> i8 {
        self.octave
    }
}

impl From<u8> for NoteName {
    fn from(note: u8) -> Self {
        Self {
            pitch: PITCH_NAMES[usize::from(note % 12)],
            octave: (note / 12) as i8 - 1,
        }
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch, self.octave)
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn a4_is_440() {
        assert!((midi_to_freq(69) - 440.0).abs() < 0.01);
    }

    #[test]
    fn middle_c() {
        assert!((midi_to_freq(60) - 261.63).abs() < 0.1);
    }

    #[test]
    fn validity() {
        assert!(is_valid_note(0));
        assert!(is_valid_note(127));
        assert!(!is_valid_note(128));
        assert!(!is_valid_note(-1));
    }

    #[test]
    fn hue_per_pitch_class() {
        assert_eq!(hue_for_note(0), 30.0);
        assert_eq!(hue_for_note(12), 30.0);
        assert_eq!(hue_for_note(6), 210.0);
    }

    #[test]
    fn names() {
        assert_eq!(NoteName::from(69).to_string(), "A4");
        assert_eq!(NoteName::from(127).to_string(), "G9");
        assert_eq!(NoteName::from(0).octave(), -1);
    }
}
