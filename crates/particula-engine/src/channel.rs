//! Per-note round-robin channel assignment.
//!
//! Repeated triggers of one note land on successive channels so each
//! note-on/note-off pair is matched to its own voice instead of an earlier
//! trigger of the same note. The rotation state is kept per note and
//! survives across blocks.

/// Number of channels notes rotate across.
pub const ROTATION_CHANNELS: u8 = 16;

/// Next channel per note number.
#[derive(Debug, Clone)]
pub struct ChannelRotator {
    next: [u8; 128],
}

impl Default for ChannelRotator {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelRotator {
    /// Every note starts on channel 0.
    pub const fn new() -> Self {
        Self { next: [0; 128] }
    }

    /// Channel for the next trigger of `note`; advances that note's rotation.
    ///
    /// ```rust
    /// use particula_engine::ChannelRotator;
    ///
    /// let mut rot = ChannelRotator::new();
    /// assert_eq!(rot.assign(60), 0);
    /// assert_eq!(rot.assign(60), 1);
    /// assert_eq!(rot.assign(61), 0);
    /// ```
    pub fn assign(&mut self, note: u8) -> u8 {
        let slot = &mut self.next[usize::from(note & 0x7F)];
        let channel = *slot;
        *slot = (channel + 1) % ROTATION_CHANNELS;
        channel
    }

    /// Reset every note to channel 0.
    pub fn reset(&mut self) {
        self.next = [0; 128];
    }
}
