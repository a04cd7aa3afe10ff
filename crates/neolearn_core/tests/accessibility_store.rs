use neolearn_core::{AccessibilityStore, FontSize, SpeechSynthesizer};
use std::cell::RefCell;

#[derive(Default)]
struct RecordingSynthesizer {
    spoken: RefCell<Vec<(String, f32, f32)>>,
    cancels: RefCell<usize>,
}

impl SpeechSynthesizer for RecordingSynthesizer {
    fn speak(&self, text: &str, rate: f32, volume: f32) {
        self.spoken.borrow_mut().push((text.to_string(), rate, volume));
    }

    fn cancel(&self) {
        *self.cancels.borrow_mut() += 1;
    }
}

#[test]
fn speak_is_noop_until_tts_enabled() {
    let mut store = AccessibilityStore::new(RecordingSynthesizer::default());
    assert!(!store.speak("hello"));
    assert!(store.synthesizer().spoken.borrow().is_empty());

    assert!(store.toggle_tts());
    store.set_speech_rate(1.5);
    store.set_speech_volume(0.5);
    assert!(store.speak("hello"));
    assert_eq!(
        store.synthesizer().spoken.borrow().as_slice(),
        [("hello".to_string(), 1.5, 0.5)]
    );
}

#[test]
fn disabling_tts_cancels_current_speech() {
    let mut store = AccessibilityStore::new(RecordingSynthesizer::default());
    store.toggle_tts();
    assert!(!store.toggle_tts());
    assert_eq!(*store.synthesizer().cancels.borrow(), 1);
}

#[test]
fn speech_settings_are_clamped() {
    let mut store = AccessibilityStore::new(RecordingSynthesizer::default());
    store.set_speech_volume(3.0);
    store.set_speech_rate(0.0);
    assert_eq!(store.settings().speech_volume, 1.0);
    assert_eq!(store.settings().speech_rate, 0.1);
}

#[test]
fn flags_mirror_onto_root_classes() {
    let mut store = AccessibilityStore::new(RecordingSynthesizer::default());
    assert!(store.root_class_names().is_empty());
    assert_eq!(store.root_font_size_px(), 16);

    store.toggle_dark_mode();
    store.toggle_dyslexic_font();
    store.toggle_high_contrast();
    store.toggle_high_contrast();
    store.set_font_size(FontSize::Small);

    assert_eq!(store.root_class_names(), ["dark", "dyslexic-font"]);
    assert_eq!(store.root_font_size_px(), 14);
}
