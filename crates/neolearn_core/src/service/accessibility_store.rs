//! Accessibility preference store.
//!
//! # Responsibility
//! - Hold UI preference flags and speech settings.
//! - Project flags onto root-element class names for the renderer.
//! - Forward `speak` requests to a `SpeechSynthesizer` when TTS is on.
//!
//! # Invariants
//! - `speak` is a no-op while `is_tts_enabled` is false.
//! - Speech rate and volume are clamped to the synthesizer's valid ranges.

use crate::model::accessibility::{AccessibilitySettings, FontSize};
use crate::repo::snapshot_repo::{RepoResult, SnapshotRepository};
use log::debug;

pub const MIN_SPEECH_RATE: f32 = 0.1;
pub const MAX_SPEECH_RATE: f32 = 10.0;

/// Class names the renderer toggles on the document root.
pub mod root_class {
    pub const DARK: &str = "dark";
    pub const HIGH_CONTRAST: &str = "high-contrast";
    pub const DYSLEXIC_FONT: &str = "dyslexic-font";
    pub const REDUCED_MOTION: &str = "reduced-motion";
}

/// Speech output device.
pub trait SpeechSynthesizer {
    fn speak(&self, text: &str, rate: f32, volume: f32);
    fn cancel(&self);
}

/// Synthesizer that writes utterances to the log; used when no audio
/// device is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSynthesizer;

impl SpeechSynthesizer for LogSynthesizer {
    fn speak(&self, text: &str, rate: f32, volume: f32) {
        debug!(
            "event=tts_speak module=accessibility chars={} rate={} volume={}",
            text.chars().count(),
            rate,
            volume
        );
    }

    fn cancel(&self) {
        debug!("event=tts_cancel module=accessibility");
    }
}

pub struct AccessibilityStore<S: SpeechSynthesizer> {
    settings: AccessibilitySettings,
    synthesizer: S,
}

impl<S: SpeechSynthesizer> AccessibilityStore<S> {
    pub fn new(synthesizer: S) -> Self {
        Self::with_settings(synthesizer, AccessibilitySettings::default())
    }

    pub fn with_settings(synthesizer: S, settings: AccessibilitySettings) -> Self {
        Self {
            settings,
            synthesizer,
        }
    }

    pub fn load_from<R: SnapshotRepository<AccessibilitySettings>>(
        synthesizer: S,
        repo: &R,
    ) -> RepoResult<Self> {
        let settings = repo.load()?.unwrap_or_default();
        Ok(Self::with_settings(synthesizer, settings))
    }

    pub fn save_to<R: SnapshotRepository<AccessibilitySettings>>(&self, repo: &R) -> RepoResult<()> {
        repo.save(&self.settings)
    }

    pub fn settings(&self) -> &AccessibilitySettings {
        &self.settings
    }

    pub fn synthesizer(&self) -> &S {
        &self.synthesizer
    }

    pub fn toggle_dyslexic_font(&mut self) -> bool {
        self.settings.is_dyslexic_font = !self.settings.is_dyslexic_font;
        self.settings.is_dyslexic_font
    }

    pub fn toggle_high_contrast(&mut self) -> bool {
        self.settings.is_high_contrast = !self.settings.is_high_contrast;
        self.settings.is_high_contrast
    }

    pub fn toggle_reduced_motion(&mut self) -> bool {
        self.settings.is_reduced_motion = !self.settings.is_reduced_motion;
        self.settings.is_reduced_motion
    }

    pub fn toggle_dark_mode(&mut self) -> bool {
        self.settings.is_dark_mode = !self.settings.is_dark_mode;
        self.settings.is_dark_mode
    }

    pub fn toggle_tts(&mut self) -> bool {
        self.settings.is_tts_enabled = !self.settings.is_tts_enabled;
        if !self.settings.is_tts_enabled {
            self.synthesizer.cancel();
        }
        self.settings.is_tts_enabled
    }

    pub fn toggle_stt(&mut self) -> bool {
        self.settings.is_stt_enabled = !self.settings.is_stt_enabled;
        self.settings.is_stt_enabled
    }

    pub fn set_font_size(&mut self, size: FontSize) {
        self.settings.font_size = size;
    }

    pub fn set_speech_rate(&mut self, rate: f32) {
        self.settings.speech_rate = rate.clamp(MIN_SPEECH_RATE, MAX_SPEECH_RATE);
    }

    pub fn set_speech_volume(&mut self, volume: f32) {
        self.settings.speech_volume = volume.clamp(0.0, 1.0);
    }

    /// Reads `text` aloud when TTS is enabled. Returns whether it was spoken.
    pub fn speak(&self, text: &str) -> bool {
        if !self.settings.is_tts_enabled || text.trim().is_empty() {
            return false;
        }
        self.synthesizer.speak(
            text,
            self.settings.speech_rate,
            self.settings.speech_volume,
        );
        true
    }

    pub fn stop_speaking(&self) {
        self.synthesizer.cancel();
    }

    /// Root class names implied by the current flags.
    pub fn root_class_names(&self) -> Vec<&'static str> {
        let flags = [
            (self.settings.is_dark_mode, root_class::DARK),
            (self.settings.is_high_contrast, root_class::HIGH_CONTRAST),
            (self.settings.is_dyslexic_font, root_class::DYSLEXIC_FONT),
            (self.settings.is_reduced_motion, root_class::REDUCED_MOTION),
        ];
        flags
            .into_iter()
            .filter_map(|(enabled, class)| enabled.then_some(class))
            .collect()
    }

    pub fn root_font_size_px(&self) -> u8 {
        self.settings.font_size.px()
    }
}
