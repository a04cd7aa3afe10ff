//! User profile domain model.
//!
//! # Responsibility
//! - Define the single signed-in learner record and its courses/exams.
//! - Derive default accessibility preferences from the declared disability.
//!
//! # Invariants
//! - `uid` is an opaque identifier issued by the identity provider.
//! - `level` is derived from `xp` and refreshed by the auth store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Self-declared accessibility need captured at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisabilityType {
    #[default]
    #[serde(rename = "none")]
    NoDisability,
    Blind,
    Deaf,
    Dyslexic,
    Motor,
    Cognitive,
    Multiple,
}

impl DisabilityType {
    pub const ALL: [DisabilityType; 7] = [
        Self::NoDisability,
        Self::Blind,
        Self::Deaf,
        Self::Dyslexic,
        Self::Motor,
        Self::Cognitive,
        Self::Multiple,
    ];

    /// Human-readable label for selection lists.
    pub fn label(self) -> &'static str {
        match self {
            Self::NoDisability => "No disability",
            Self::Blind => "Blind or visually impaired",
            Self::Deaf => "Deaf or hard of hearing",
            Self::Dyslexic => "Dyslexia or learning disabilities",
            Self::Motor => "Motor disabilities (limited movement)",
            Self::Cognitive => "Cognitive disabilities",
            Self::Multiple => "Multiple disabilities",
        }
    }
}

/// Per-user assistive preferences stored with the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub tts: bool,
    pub stt: bool,
    pub contrast_mode: bool,
    pub dyslexia_font: bool,
}

impl Preferences {
    /// Defaults chosen at registration time.
    pub fn for_disability(disability: DisabilityType) -> Self {
        Self {
            tts: disability == DisabilityType::Blind,
            stt: disability == DisabilityType::Deaf,
            contrast_mode: false,
            dyslexia_font: disability == DisabilityType::Dyslexic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub name: String,
    /// Percent complete, 0..=100.
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub syllabus: Vec<String>,
    #[serde(default)]
    pub completed_topics: Vec<String>,
}

impl Course {
    pub fn new(name: impl Into<String>, target_date: Option<NaiveDate>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            progress: 0,
            target_date,
            syllabus: Vec::new(),
            completed_topics: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    pub id: String,
    pub name: String,
    pub progress: u8,
    pub target_date: NaiveDate,
    #[serde(default)]
    pub syllabus: Vec<String>,
    #[serde(default)]
    pub completed_topics: Vec<String>,
}

impl Exam {
    pub fn new(name: impl Into<String>, target_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            progress: 0,
            target_date,
            syllabus: Vec::new(),
            completed_topics: Vec::new(),
        }
    }
}

/// Signed-in learner record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: Option<String>,
    /// Avatar location as entered on the profile page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambition: Option<String>,
    #[serde(default)]
    pub disability_type: DisabilityType,
    pub onboarding_completed: bool,
    pub preferences: Preferences,
    #[serde(default)]
    pub xp: u32,
    #[serde(default = "first_level")]
    pub level: u32,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub exams: Vec<Exam>,
    /// Earned badge names, in award order.
    #[serde(default)]
    pub badges: Vec<String>,
}

fn first_level() -> u32 {
    1
}

impl UserProfile {
    /// Fresh profile with level 1 and no study plan.
    pub fn new(uid: impl Into<String>, email: Option<String>) -> Self {
        Self {
            uid: uid.into(),
            name: None,
            email,
            profile_picture: None,
            quote: None,
            age: None,
            ambition: None,
            disability_type: DisabilityType::NoDisability,
            onboarding_completed: false,
            preferences: Preferences::default(),
            xp: 0,
            level: first_level(),
            streak: 0,
            courses: Vec::new(),
            exams: Vec::new(),
            badges: Vec::new(),
        }
    }

    /// Name for greetings and reports.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Student")
    }

    /// Adds `badge` unless already earned. Returns whether it was new.
    pub fn award_badge(&mut self, badge: &str) -> bool {
        if self.badges.iter().any(|earned| earned == badge) {
            return false;
        }
        self.badges.push(badge.to_string());
        true
    }
}

/// Partial update merged into the current profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub profile_picture: Option<String>,
    pub quote: Option<String>,
    pub age: Option<u32>,
    pub ambition: Option<String>,
    pub disability_type: Option<DisabilityType>,
    pub onboarding_completed: Option<bool>,
    pub preferences: Option<Preferences>,
    pub streak: Option<u32>,
}

impl ProfilePatch {
    pub fn apply_to(&self, profile: &mut UserProfile) {
        if let Some(name) = &self.name {
            profile.name = Some(name.clone());
        }
        if let Some(email) = &self.email {
            profile.email = Some(email.clone());
        }
        if let Some(picture) = &self.profile_picture {
            profile.profile_picture = Some(picture.clone());
        }
        if let Some(quote) = &self.quote {
            profile.quote = Some(quote.clone());
        }
        if let Some(age) = self.age {
            profile.age = Some(age);
        }
        if let Some(ambition) = &self.ambition {
            profile.ambition = Some(ambition.clone());
        }
        if let Some(disability) = self.disability_type {
            profile.disability_type = disability;
        }
        if let Some(done) = self.onboarding_completed {
            profile.onboarding_completed = done;
        }
        if let Some(preferences) = self.preferences {
            profile.preferences = preferences;
        }
        if let Some(streak) = self.streak {
            profile.streak = streak;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DisabilityType, Preferences, ProfilePatch, UserProfile};

    #[test]
    fn preferences_follow_declared_disability() {
        assert!(Preferences::for_disability(DisabilityType::Blind).tts);
        assert!(Preferences::for_disability(DisabilityType::Deaf).stt);
        assert!(Preferences::for_disability(DisabilityType::Dyslexic).dyslexia_font);
        assert_eq!(
            Preferences::for_disability(DisabilityType::Motor),
            Preferences::default()
        );
    }

    #[test]
    fn disability_none_uses_plain_label() {
        let json = serde_json::to_string(&DisabilityType::NoDisability).unwrap();
        assert_eq!(json, "\"none\"");
    }

    #[test]
    fn profile_deserializes_with_missing_progress_fields() {
        let profile: UserProfile = serde_json::from_str(
            r#"{"uid":"u1","email":null,"onboardingCompleted":true,
                "preferences":{"tts":false,"stt":false,"contrastMode":true,"dyslexiaFont":false}}"#,
        )
        .unwrap();
        assert_eq!(profile.level, 1);
        assert_eq!(profile.display_name(), "Student");
        assert!(profile.preferences.contrast_mode);
    }

    #[test]
    fn patch_fills_personal_fields_and_keeps_the_rest() {
        let mut profile = UserProfile::new("u1", None);
        profile.quote = Some("Keep going".to_string());
        let patch = ProfilePatch {
            age: Some(17),
            ambition: Some("Engineer".to_string()),
            ..ProfilePatch::default()
        };
        patch.apply_to(&mut profile);

        assert_eq!(profile.age, Some(17));
        assert_eq!(profile.ambition.as_deref(), Some("Engineer"));
        assert_eq!(profile.quote.as_deref(), Some("Keep going"));
        assert!(profile.profile_picture.is_none());

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["ambition"], "Engineer");
        assert!(value.get("profilePicture").is_none());
    }

    #[test]
    fn badges_are_awarded_once() {
        let mut profile = UserProfile::new("u1", None);
        assert!(profile.award_badge("first-task"));
        assert!(!profile.award_badge("first-task"));
        assert_eq!(profile.badges, ["first-task"]);
    }
}
