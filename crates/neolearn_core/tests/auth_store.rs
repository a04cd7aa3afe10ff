use chrono::NaiveDate;
use neolearn_core::{
    AccountIdentity, AuthBackend, AuthError, AuthStore, BackendError, Course, DisabilityType,
    Exam, LocalAuthBackend, LogSynthesizer, NewTask, ProfilePatch, RegisterPayload, Session,
    TaskKind, TaskStatus, UserProfile,
};
use std::cell::Cell;

fn payload(disability_type: DisabilityType) -> RegisterPayload {
    RegisterPayload {
        name: "Ada Lovelace".to_string(),
        email: "ada@example.org".to_string(),
        password: "Analytical1".to_string(),
        disability_type,
    }
}

/// Backend whose profile writes can be switched to fail.
#[derive(Default)]
struct FlakyBackend {
    inner: LocalAuthBackend,
    fail_writes: Cell<bool>,
}

impl AuthBackend for FlakyBackend {
    fn create_account(&self, email: &str, password: &str) -> Result<AccountIdentity, BackendError> {
        self.inner.create_account(email, password)
    }

    fn sign_in(&self, _email: &str, _password: &str) -> Result<AccountIdentity, BackendError> {
        Err(BackendError::Rejected("wrong password".to_string()))
    }

    fn sign_in_federated(&self) -> Result<AccountIdentity, BackendError> {
        Err(BackendError::Unavailable("popup closed".to_string()))
    }

    fn sign_out(&self) -> Result<(), BackendError> {
        Err(BackendError::Unavailable("offline".to_string()))
    }

    fn fetch_profile(&self, uid: &str) -> Result<Option<UserProfile>, BackendError> {
        self.inner.fetch_profile(uid)
    }

    fn store_profile(&self, profile: &UserProfile) -> Result<(), BackendError> {
        if self.fail_writes.get() {
            return Err(BackendError::Unavailable("offline".to_string()));
        }
        self.inner.store_profile(profile)
    }
}

#[test]
fn register_signs_in_with_preferences_from_disability() {
    let mut store = AuthStore::new(LocalAuthBackend::new());
    let user = store.register(payload(DisabilityType::Blind)).unwrap();

    assert!(user.uid.starts_with("mock-"));
    assert_eq!(user.name.as_deref(), Some("Ada Lovelace"));
    assert!(user.preferences.tts);
    assert!(!user.preferences.stt);
    assert!(!user.onboarding_completed);
    assert_eq!(user.level, 1);
    assert_eq!(store.backend().document_count(), 1);
    assert!(store.uid().is_some());
}

#[test]
fn register_reports_every_invalid_field() {
    let mut store = AuthStore::new(LocalAuthBackend::new());
    let err = store
        .register(RegisterPayload {
            name: " ".to_string(),
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            disability_type: DisabilityType::NoDisability,
        })
        .unwrap_err();

    match err {
        AuthError::Validation(errors) => {
            assert!(errors.iter().any(|e| e.contains("name")));
            assert!(errors.iter().any(|e| e.contains("valid email")));
            assert!(errors.iter().any(|e| e.contains("at least 8")));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!store.is_signed_in());
}

#[test]
fn login_requires_both_fields() {
    let mut store = AuthStore::new(LocalAuthBackend::new());
    let err = store.login("", "").unwrap_err();
    assert!(matches!(err, AuthError::Validation(errors) if errors.len() == 2));
}

#[test]
fn login_reuses_stored_profile_document() {
    let mut store = AuthStore::new(LocalAuthBackend::new());
    let user = store.login("demo@example.org", "anything").unwrap();
    assert_eq!(user.display_name(), "Demo User");
    assert!(!user.onboarding_completed);

    store.add_xp(120).unwrap();
    store.logout().unwrap();
    assert!(store.user().is_none());

    let user = store.login("demo@example.org", "anything").unwrap();
    assert_eq!(user.xp, 120);
    assert_eq!(user.level, 2);
}

#[test]
fn remote_failures_surface_without_changing_state() {
    let mut store = AuthStore::new(FlakyBackend::default());

    let err = store.login("ada@example.org", "Analytical1").unwrap_err();
    assert_eq!(
        err,
        AuthError::Backend(BackendError::Rejected("wrong password".to_string()))
    );
    assert!(matches!(
        store.login_federated(),
        Err(AuthError::Backend(BackendError::Unavailable(_)))
    ));
    assert!(!store.is_signed_in());

    store.register(payload(DisabilityType::Deaf)).unwrap();
    store.backend().fail_writes.set(true);
    let patch = ProfilePatch {
        name: Some("Countess".to_string()),
        ..ProfilePatch::default()
    };
    assert!(store.update_user(&patch).is_err());
    assert_eq!(store.user().unwrap().name.as_deref(), Some("Ada Lovelace"));
}

#[test]
fn logout_clears_user_even_when_provider_fails() {
    let mut store = AuthStore::new(FlakyBackend::default());
    store.register(payload(DisabilityType::NoDisability)).unwrap();
    assert!(store.logout().is_err());
    assert!(!store.is_signed_in());
}

#[test]
fn edits_while_signed_out_are_noops() {
    let mut store = AuthStore::new(LocalAuthBackend::new());
    assert!(!store.update_user(&ProfilePatch::default()).unwrap());
    assert!(!store.add_xp(50).unwrap());
    assert!(store.courses().is_empty());
    assert!(store.uid().is_none());
}

#[test]
fn onboarding_stores_study_plan() {
    let mut store = AuthStore::new(LocalAuthBackend::new());
    store.register(payload(DisabilityType::Dyslexic)).unwrap();

    let target = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
    let done = store
        .complete_onboarding(
            vec![Course::new("Mathematics", Some(target))],
            vec![Exam::new("SAT", target)],
        )
        .unwrap();
    assert!(done);
    store.add_exam(Exam::new("IELTS", target)).unwrap();

    let user = store.user().unwrap();
    assert!(user.onboarding_completed);
    assert_eq!(store.courses().len(), 1);
    assert_eq!(store.exams().len(), 2);

    let stored = store.backend().fetch_profile(&user.uid).unwrap().unwrap();
    assert_eq!(&stored, user);
}

#[test]
fn profile_page_fields_and_badges_reach_the_backend() {
    let mut store = AuthStore::new(LocalAuthBackend::new());
    store.register(payload(DisabilityType::NoDisability)).unwrap();

    let patch = ProfilePatch {
        quote: Some("Stay curious".to_string()),
        age: Some(19),
        ambition: Some("Mathematician".to_string()),
        profile_picture: Some("avatars/ada.png".to_string()),
        ..ProfilePatch::default()
    };
    assert!(store.update_user(&patch).unwrap());
    store.award_badge("early-bird").unwrap();
    store.award_badge("early-bird").unwrap();

    let user = store.user().unwrap();
    assert_eq!(user.quote.as_deref(), Some("Stay curious"));
    assert_eq!(user.age, Some(19));
    assert_eq!(user.badges, ["early-bird"]);
    let stored = store.backend().fetch_profile(&user.uid).unwrap().unwrap();
    assert_eq!(stored.ambition.as_deref(), Some("Mathematician"));
    assert_eq!(stored.profile_picture.as_deref(), Some("avatars/ada.png"));
}

#[test]
fn failed_xp_write_leaves_task_open_for_retry() {
    let mut session = Session::new(FlakyBackend::default(), LogSynthesizer);
    session.auth.register(payload(DisabilityType::NoDisability)).unwrap();
    let id = session.calendar.add_task(
        NewTask::new("Quiz", "Math", NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), TaskKind::Practice)
            .with_xp(25),
    );

    session.auth.backend().fail_writes.set(true);
    assert!(session.complete_task(&id).is_err());
    assert_eq!(session.calendar.task(&id).unwrap().status, TaskStatus::Pending);
    assert_eq!(session.auth.user().unwrap().xp, 0);

    session.auth.backend().fail_writes.set(false);
    assert!(session.complete_task(&id).unwrap());
    assert_eq!(session.calendar.task(&id).unwrap().status, TaskStatus::Completed);
    assert_eq!(session.auth.user().unwrap().xp, 25);
}
