//! Volume control
//!
//! Output volume is a linear level in [0, 1]. Muting drops the level to 0 and
//! remembers the previous level so unmuting can restore it.

/// Clamp a requested level into [0, 1]; NaN maps to silence
pub fn clamp(level: f32) -> f32 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}

/// Volume level with mute memory
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    level: f32,
    /// Level restored by unmute
    restore_level: f32,
}

impl Volume {
    pub fn new(level: f32) -> Self {
        let level = clamp(level);
        Self {
            level,
            restore_level: if level > 0.0 { level } else { 1.0 },
        }
    }

    /// Set volume level (clamped), returning the stored value
    pub fn set_level(&mut self, level: f32) -> f32 {
        self.level = clamp(level);
        if self.level > 0.0 {
            self.restore_level = self.level;
        }
        self.level
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn is_muted(&self) -> bool {
        self.level == 0.0
    }

    /// Toggle between silence and the last audible level
    ///
    /// Returns the new level.
    pub fn toggle_mute(&mut self) -> f32 {
        if self.is_muted() {
            self.level = self.restore_level;
        } else {
            self.restore_level = self.level;
            self.level = 0.0;
        }
        self.level
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_law() {
        assert_eq!(clamp(1.5), 1.0);
        assert_eq!(clamp(-0.2), 0.0);
        assert_eq!(clamp(0.35), 0.35);
        assert_eq!(clamp(f32::NAN), 0.0);
        assert_eq!(clamp(f32::INFINITY), 1.0);
    }

    #[test]
    fn set_level_clamps() {
        let mut vol = Volume::new(0.5);
        assert_eq!(vol.set_level(2.0), 1.0);
        assert_eq!(vol.level(), 1.0);
    }

    #[test]
    fn toggle_mute_restores_previous_level() {
        let mut vol = Volume::new(0.6);

        assert_eq!(vol.toggle_mute(), 0.0);
        assert!(vol.is_muted());

        assert_eq!(vol.toggle_mute(), 0.6);
        assert!(!vol.is_muted());
    }

    #[test]
    fn unmute_from_zero_falls_back_to_full() {
        let mut vol = Volume::new(0.0);
        assert!(vol.is_muted());
        assert_eq!(vol.toggle_mute(), 1.0);
    }

    #[test]
    fn setting_zero_keeps_restore_level() {
        let mut vol = Volume::new(0.4);
        vol.set_level(0.0);
        assert_eq!(vol.toggle_mute(), 0.4);
    }
}
