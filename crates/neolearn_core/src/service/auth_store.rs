//! Signed-in user store backed by an identity/document service.
//!
//! # Responsibility
//! - Register, sign in and sign out through an `AuthBackend`.
//! - Hold the single current `UserProfile` and mirror edits to the
//!   backend's profile documents.
//! - Expose the `uid` and course/exam lists other stores depend on.
//!
//! # Invariants
//! - Local state changes only after the backend call succeeded.
//! - Profile edits while signed out are silent no-ops.
//! - `level` is recomputed whenever `xp` changes.

use crate::model::profile::{
    Course, DisabilityType, Exam, Preferences, ProfilePatch, UserProfile,
};
use crate::repo::snapshot_repo::{RepoResult, SnapshotRepository};
use crate::service::progress::calculate_level;
use crate::service::validation::{require, validate_email, validate_password};
use chrono::Utc;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure reported by the remote identity/document service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Credentials or account state were refused.
    Rejected(String),
    /// Service could not be reached or answered with a transport error.
    Unavailable(String),
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(message) => write!(f, "request rejected: {message}"),
            Self::Unavailable(message) => write!(f, "service unavailable: {message}"),
        }
    }
}

impl Error for BackendError {}

/// Error for auth use-cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Form input failed validation; one message per failed rule.
    Validation(Vec<String>),
    /// Remote service failure; surfaced to the caller, never retried.
    Backend(BackendError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(errors) => write!(f, "invalid input: {}", errors.join("; ")),
            Self::Backend(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Backend(err) => Some(err),
            Self::Validation(_) => None,
        }
    }
}

impl From<BackendError> for AuthError {
    fn from(value: BackendError) -> Self {
        Self::Backend(value)
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Identity returned by a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountIdentity {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// Remote identity provider plus per-user profile documents.
pub trait AuthBackend {
    fn create_account(&self, email: &str, password: &str) -> Result<AccountIdentity, BackendError>;
    fn sign_in(&self, email: &str, password: &str) -> Result<AccountIdentity, BackendError>;
    fn sign_in_federated(&self) -> Result<AccountIdentity, BackendError>;
    fn sign_out(&self) -> Result<(), BackendError>;
    fn fetch_profile(&self, uid: &str) -> Result<Option<UserProfile>, BackendError>;
    fn store_profile(&self, profile: &UserProfile) -> Result<(), BackendError>;
}

/// In-process backend that accepts any credentials.
///
/// Profile documents live in a map keyed by `uid`.
#[derive(Debug, Default)]
pub struct LocalAuthBackend {
    documents: RefCell<HashMap<String, UserProfile>>,
}

/// Uid handed out for every password sign-in by `LocalAuthBackend`.
pub const LOCAL_DEMO_UID: &str = "mock-user-123";

impl LocalAuthBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document_count(&self) -> usize {
        self.documents.borrow().len()
    }
}

impl AuthBackend for LocalAuthBackend {
    fn create_account(&self, email: &str, _password: &str) -> Result<AccountIdentity, BackendError> {
        Ok(AccountIdentity {
            uid: format!("mock-{}", Utc::now().timestamp_millis()),
            email: Some(email.to_string()),
            display_name: None,
        })
    }

    fn sign_in(&self, email: &str, _password: &str) -> Result<AccountIdentity, BackendError> {
        Ok(AccountIdentity {
            uid: LOCAL_DEMO_UID.to_string(),
            email: Some(email.to_string()),
            display_name: Some("Demo User".to_string()),
        })
    }

    fn sign_in_federated(&self) -> Result<AccountIdentity, BackendError> {
        Ok(AccountIdentity {
            uid: "mock-federated-user".to_string(),
            email: None,
            display_name: Some("Demo User".to_string()),
        })
    }

    fn sign_out(&self) -> Result<(), BackendError> {
        Ok(())
    }

    fn fetch_profile(&self, uid: &str) -> Result<Option<UserProfile>, BackendError> {
        Ok(self.documents.borrow().get(uid).cloned())
    }

    fn store_profile(&self, profile: &UserProfile) -> Result<(), BackendError> {
        self.documents
            .borrow_mut()
            .insert(profile.uid.clone(), profile.clone());
        Ok(())
    }
}

/// Registration form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterPayload {
    pub name: String,
    pub email: String,
    pub password: String,
    pub disability_type: DisabilityType,
}

/// Persisted shape of the auth store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState {
    pub user: Option<UserProfile>,
}

/// Current-user store.
pub struct AuthStore<B: AuthBackend> {
    backend: B,
    state: AuthState,
}

impl<B: AuthBackend> AuthStore<B> {
    /// Creates a signed-out store.
    pub fn new(backend: B) -> Self {
        Self::with_state(backend, AuthState::default())
    }

    pub fn with_state(backend: B, state: AuthState) -> Self {
        Self { backend, state }
    }

    /// Rehydrates from `repo`, falling back to signed-out.
    pub fn load_from<R: SnapshotRepository<AuthState>>(backend: B, repo: &R) -> RepoResult<Self> {
        let state = repo.load()?.unwrap_or_default();
        Ok(Self::with_state(backend, state))
    }

    pub fn save_to<R: SnapshotRepository<AuthState>>(&self, repo: &R) -> RepoResult<()> {
        repo.save(&self.state)
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.state.user.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.state.user.is_some()
    }

    /// Opaque partition key of the signed-in user.
    pub fn uid(&self) -> Option<&str> {
        self.state.user.as_ref().map(|user| user.uid.as_str())
    }

    pub fn courses(&self) -> &[Course] {
        self.state
            .user
            .as_ref()
            .map_or(&[][..], |user| user.courses.as_slice())
    }

    pub fn exams(&self) -> &[Exam] {
        self.state
            .user
            .as_ref()
            .map_or(&[][..], |user| user.exams.as_slice())
    }

    /// Creates an account and signs it in.
    ///
    /// Preferences default from the declared disability type.
    pub fn register(&mut self, payload: RegisterPayload) -> AuthResult<&UserProfile> {
        let errors = registration_errors(&payload);
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        let identity = self
            .backend
            .create_account(payload.email.trim(), &payload.password)
            .inspect_err(|err| {
                warn!("event=auth_register module=auth status=error error={err}");
            })?;

        let mut profile = UserProfile::new(identity.uid, Some(payload.email.trim().to_string()));
        profile.name = Some(payload.name.trim().to_string());
        profile.disability_type = payload.disability_type;
        profile.preferences = Preferences::for_disability(payload.disability_type);
        self.backend.store_profile(&profile)?;

        info!(
            "event=auth_register module=auth status=ok uid={}",
            profile.uid
        );
        Ok(&*self.state.user.insert(profile))
    }

    /// Signs in with email/password and loads the stored profile.
    ///
    /// Without a stored profile document a fresh one is created, still
    /// awaiting onboarding.
    pub fn login(&mut self, email: &str, password: &str) -> AuthResult<&UserProfile> {
        let errors: Vec<String> = [
            require("your email", email),
            require("your password", password),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        let identity = self
            .backend
            .sign_in(email.trim(), password)
            .inspect_err(|err| {
                warn!("event=auth_login module=auth status=error mode=password error={err}");
            })?;
        self.finish_sign_in(identity, "password")
    }

    /// Signs in through the federated provider.
    pub fn login_federated(&mut self) -> AuthResult<&UserProfile> {
        let identity = self.backend.sign_in_federated().inspect_err(|err| {
            warn!("event=auth_login module=auth status=error mode=federated error={err}");
        })?;
        self.finish_sign_in(identity, "federated")
    }

    fn finish_sign_in(&mut self, identity: AccountIdentity, mode: &str) -> AuthResult<&UserProfile> {
        let profile = match self.backend.fetch_profile(&identity.uid)? {
            Some(profile) => profile,
            None => {
                let mut profile = UserProfile::new(identity.uid, identity.email);
                profile.name = identity.display_name;
                self.backend.store_profile(&profile)?;
                profile
            }
        };

        info!(
            "event=auth_login module=auth status=ok mode={} uid={}",
            mode, profile.uid
        );
        Ok(&*self.state.user.insert(profile))
    }

    /// Clears the local user, then reports any provider sign-out failure.
    pub fn logout(&mut self) -> AuthResult<()> {
        let previous = self.state.user.take();
        if let Some(user) = previous {
            info!("event=auth_logout module=auth status=ok uid={}", user.uid);
        }
        self.backend.sign_out()?;
        Ok(())
    }

    /// Merges `patch` into the current profile.
    ///
    /// Returns `Ok(false)` when signed out.
    pub fn update_user(&mut self, patch: &ProfilePatch) -> AuthResult<bool> {
        self.commit_profile(|profile| patch.apply_to(profile))
    }

    /// Stores the onboarding study plan and marks onboarding done.
    pub fn complete_onboarding(&mut self, courses: Vec<Course>, exams: Vec<Exam>) -> AuthResult<bool> {
        self.commit_profile(move |profile| {
            profile.courses = courses;
            profile.exams = exams;
            profile.onboarding_completed = true;
        })
    }

    pub fn add_course(&mut self, course: Course) -> AuthResult<bool> {
        self.commit_profile(move |profile| profile.courses.push(course))
    }

    pub fn add_exam(&mut self, exam: Exam) -> AuthResult<bool> {
        self.commit_profile(move |profile| profile.exams.push(exam))
    }

    /// Grants XP and recomputes the level.
    pub fn add_xp(&mut self, amount: u32) -> AuthResult<bool> {
        self.commit_profile(|profile| {
            profile.xp = profile.xp.saturating_add(amount);
            profile.level = calculate_level(profile.xp);
        })
    }

    /// Records a badge on the profile; earning it twice keeps one entry.
    pub fn award_badge(&mut self, badge: &str) -> AuthResult<bool> {
        self.commit_profile(|profile| {
            profile.award_badge(badge);
        })
    }

    fn commit_profile(&mut self, edit: impl FnOnce(&mut UserProfile)) -> AuthResult<bool> {
        let Some(current) = self.state.user.as_ref() else {
            return Ok(false);
        };

        let mut updated = current.clone();
        edit(&mut updated);
        self.backend.store_profile(&updated).inspect_err(|err| {
            warn!(
                "event=profile_update module=auth status=error uid={} error={}",
                updated.uid, err
            );
        })?;
        self.state.user = Some(updated);
        Ok(true)
    }
}

fn registration_errors(payload: &RegisterPayload) -> Vec<String> {
    let mut errors = Vec::new();
    errors.extend(require("your name", &payload.name));
    match require("your email", &payload.email) {
        Some(message) => errors.push(message),
        None if !validate_email(payload.email.trim()) => {
            errors.push("Please enter a valid email address".to_string());
        }
        None => {}
    }
    errors.extend(validate_password(&payload.password));
    errors
}
