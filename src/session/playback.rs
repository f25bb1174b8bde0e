use std::time::Duration;

/// Frame cursor for the live preview.
///
/// Holds the stepping rules only; the timer driving [`Playback::advance`] belongs to the
/// caller and should fire every [`Playback::interval`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Playback {
    index: usize,
    looping: bool,
    frame_rate: u32,
}

impl Default for Playback {
    fn default() -> Self {
        Self {
            index: 0,
            looping: true,
            frame_rate: 12,
        }
    }
}

impl Playback {
    pub fn new(frame_rate: i32, looping: bool) -> Self {
        let mut p = Self {
            looping,
            ..Self::default()
        };
        p.set_frame_rate(frame_rate);
        p
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    /// Non-positive rates clamp to 1 fps.
    pub fn set_frame_rate(&mut self, fps: i32) {
        self.frame_rate = fps.max(1) as u32;
    }

    /// Time between ticks at the current rate.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Index to show for a `frame_count`-long sequence, recovering from a stale cursor.
    pub fn current(&mut self, frame_count: usize) -> Option<usize> {
        if frame_count == 0 {
            return None;
        }
        if self.index >= frame_count {
            self.index = 0;
        }
        Some(self.index)
    }

    /// Step to the next frame: wraps to 0 when looping, otherwise holds on the last.
    pub fn advance(&mut self, frame_count: usize) -> Option<usize> {
        if frame_count == 0 {
            return None;
        }
        if self.index + 1 < frame_count {
            self.index += 1;
        } else if self.looping {
            self.index = 0;
        } else {
            self.index = frame_count - 1;
        }
        Some(self.index)
    }
}
