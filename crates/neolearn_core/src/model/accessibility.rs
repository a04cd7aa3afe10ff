//! Accessibility preference model.

use serde::{Deserialize, Serialize};

/// Root font size preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl FontSize {
    /// Root element font size in CSS pixels.
    pub fn px(self) -> u8 {
        match self {
            Self::Small => 14,
            Self::Medium => 16,
            Self::Large => 18,
        }
    }
}

/// UI preference flags persisted under `accessibility-storage`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilitySettings {
    pub is_dyslexic_font: bool,
    pub is_high_contrast: bool,
    pub is_reduced_motion: bool,
    pub is_dark_mode: bool,
    pub font_size: FontSize,
    #[serde(rename = "isTTSEnabled")]
    pub is_tts_enabled: bool,
    #[serde(rename = "isSTTEnabled")]
    pub is_stt_enabled: bool,
    pub speech_rate: f32,
    pub speech_volume: f32,
}

impl Default for AccessibilitySettings {
    fn default() -> Self {
        Self {
            is_dyslexic_font: false,
            is_high_contrast: false,
            is_reduced_motion: false,
            is_dark_mode: false,
            font_size: FontSize::Medium,
            is_tts_enabled: false,
            is_stt_enabled: false,
            speech_rate: 1.0,
            speech_volume: 1.0,
        }
    }
}
