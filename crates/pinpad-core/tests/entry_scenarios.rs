//! Integration tests for entry sessions and biometric fallback

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use pinpad_core::{
    BiometricAttemptState, BiometricError, Collaborators, EntrySession, EntryState,
    HapticsError, Haptics, IdentityHasher, LocalAuthOutcome, LocalAuthenticator, MemoryPinStore,
    Mode, PinHost, PinOptions, PinOverlay, PressOutcome, TextOverrides,
};

// ============================================
// Test doubles
// ============================================

#[derive(Default)]
struct Recorder {
    entered: Vec<String>,
    max_attempts: usize,
    local_successes: usize,
    local_errors: Vec<Option<BiometricError>>,
}

impl PinHost for Recorder {
    fn on_enter(&mut self, pin: &str) {
        self.entered.push(pin.to_owned());
    }

    fn on_max_attempt(&mut self) {
        self.max_attempts += 1;
    }

    fn on_local_auth_success(&mut self) {
        self.local_successes += 1;
    }

    fn on_local_auth_error(&mut self, error: Option<&BiometricError>) {
        self.local_errors.push(error.cloned());
    }
}

/// Authenticator that answers after a delay
struct SlowAuthenticator {
    delay: Duration,
    answer: Result<bool, BiometricError>,
    calls: AtomicUsize,
}

impl SlowAuthenticator {
    fn new(delay: Duration, answer: Result<bool, BiometricError>) -> Arc<Self> {
        Arc::new(Self {
            delay,
            answer,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocalAuthenticator for SlowAuthenticator {
    async fn authenticate(&self) -> Result<bool, BiometricError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.answer.clone()
    }
}

/// Device without biometric hardware
struct NoHardware;

#[async_trait]
impl LocalAuthenticator for NoHardware {
    async fn is_available(&self) -> Result<(), BiometricError> {
        Err(BiometricError::Unavailable)
    }

    async fn authenticate(&self) -> Result<bool, BiometricError> {
        unreachable!("authenticate called without hardware")
    }
}

struct CountingHaptics(Arc<AtomicUsize>);

impl Haptics for CountingHaptics {
    fn pulse(&self) -> Result<(), HapticsError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Err(HapticsError::Unsupported)
    }
}

// ============================================
// Helpers
// ============================================

fn mount(options: PinOptions, reference: &str, collaborators: Collaborators) -> EntrySession {
    EntrySession::mount(
        options,
        Some(reference.to_owned()),
        collaborators,
        &mut ChaCha8Rng::seed_from_u64(99),
    )
    .unwrap()
}

fn enter(session: &mut EntrySession, digits: &str, now: Instant, host: &mut Recorder) -> PressOutcome {
    digits
        .chars()
        .map(|c| session.press(pinpad_core::KeyToken::from_char(c).unwrap(), now, host))
        .last()
        .unwrap_or(PressOutcome::Ignored)
}

fn biometric_options() -> PinOptions {
    PinOptions {
        allow_local_auth: true,
        auto_trigger_local_auth: true,
        ..Default::default()
    }
}

// ============================================
// Lockout scenarios
// ============================================

#[test]
fn test_three_attempts_scenario() {
    let options = PinOptions {
        pin_length: 4,
        max_attempt: 3,
        retry_lock_duration: 2_500,
        ..Default::default()
    };
    let retry = Duration::from_millis(2_500);
    let mut host = Recorder::default();
    let mut session = mount(options, "4826", Collaborators::default());
    let t0 = Instant::now();

    assert!(matches!(
        enter(&mut session, "1111", t0, &mut host),
        PressOutcome::Rejected { failures: 1, .. }
    ));
    assert_eq!(session.state(), EntryState::Disabled);
    assert!(session.lockout().is_active());

    let t1 = t0 + retry;
    session.tick(t1);
    assert_eq!(session.state(), EntryState::Awaiting);

    assert!(matches!(
        enter(&mut session, "2222", t1, &mut host),
        PressOutcome::Rejected { failures: 2, .. }
    ));
    assert_eq!(host.max_attempts, 0);

    let t2 = t1 + retry;
    assert_eq!(
        enter(&mut session, "3333", t2, &mut host),
        PressOutcome::MaxAttempt { failures: 3 }
    );
    assert_eq!(host.max_attempts, 1);
    assert_eq!(session.state(), EntryState::Locked);

    // No re-arm, however long we wait
    session.tick(t2 + Duration::from_secs(3600));
    assert_eq!(session.state(), EntryState::Locked);
    assert_eq!(
        enter(&mut session, "4826", t2 + Duration::from_secs(3600), &mut host),
        PressOutcome::Ignored
    );
    assert!(host.entered.is_empty());
}

#[test]
fn test_identity_hash_success() {
    let mut host = Recorder::default();
    let collaborators = Collaborators::default().with_hasher(IdentityHasher);
    let mut session = mount(PinOptions::default(), "9876", collaborators);

    assert_eq!(
        enter(&mut session, "9876", Instant::now(), &mut host),
        PressOutcome::Accepted
    );
    assert_eq!(host.entered, vec!["9876".to_string()]);
    assert_eq!(session.failure_count(), 0);
}

#[test]
fn test_success_after_failures_resets_count() {
    let mut host = Recorder::default();
    let mut session = mount(PinOptions::default(), "9876", Collaborators::default());
    let mut now = Instant::now();

    for _ in 0..3 {
        enter(&mut session, "0000", now, &mut host);
        now += Duration::from_secs(5);
    }
    assert_eq!(session.failure_count(), 3);

    assert_eq!(enter(&mut session, "9876", now, &mut host), PressOutcome::Accepted);
    assert_eq!(session.failure_count(), 0);
}

#[test]
fn test_disable_lock_scenario() {
    let options = PinOptions {
        disable_lock: true,
        max_attempt: 1,
        ..Default::default()
    };
    let pulses = Arc::new(AtomicUsize::new(0));
    let collaborators = Collaborators::default().with_haptics(CountingHaptics(pulses.clone()));
    let mut host = Recorder::default();
    let mut session = mount(options, "1357", collaborators);
    let mut now = Instant::now();

    for _ in 0..10 {
        assert!(matches!(
            enter(&mut session, "0000", now, &mut host),
            PressOutcome::Rejected { .. }
        ));
        assert_eq!(session.state(), EntryState::Disabled);
        now += Duration::from_millis(2_000);
        session.tick(now);
        assert_eq!(session.state(), EntryState::Awaiting);
    }

    assert_eq!(host.max_attempts, 0);
    // Haptic failures never interrupt the flow
    assert_eq!(pulses.load(Ordering::SeqCst), 10);
}

#[test]
fn test_reset_is_idempotent() {
    let mut host = Recorder::default();
    let mut session = mount(PinOptions::default(), "1234", Collaborators::default());
    let now = Instant::now();

    enter(&mut session, "12", now, &mut host);
    session.reset();
    session.reset();

    assert_eq!(session.state(), EntryState::Idle);
    assert_eq!(session.failure_count(), 0);
    assert_eq!(session.entered_len(), 0);
    assert_eq!(session.press(pinpad_core::KeyToken::Digit(1), now, &mut host), PressOutcome::Ignored);
}

// ============================================
// Biometric scenarios
// ============================================

#[tokio::test(start_paused = true)]
async fn test_auto_trigger_once_while_slow() {
    let authenticator = SlowAuthenticator::new(Duration::from_secs(30), Ok(true));
    let collaborators = Collaborators::default().with_authenticator(authenticator.clone());
    let mut host = Recorder::default();
    let mut session = mount(biometric_options(), "1234", collaborators);
    let now = Instant::now();

    let pending = session.maybe_auto_trigger().expect("auto trigger");
    let handle = tokio::spawn(pending.run());

    // Repeated triggers and keypad input while the prompt is up
    assert!(session.maybe_auto_trigger().is_none());
    assert!(session.trigger_local_auth().is_none());
    assert_eq!(
        session.press(pinpad_core::KeyToken::Digit(1), now, &mut host),
        PressOutcome::Ignored
    );
    assert_eq!(session.biometric_state(), BiometricAttemptState::InFlight);

    tokio::time::advance(Duration::from_secs(31)).await;
    let resolution = handle.await.unwrap();

    assert_eq!(
        session.resolve_local_auth(resolution, &mut host),
        Some(LocalAuthOutcome::Succeeded)
    );
    assert_eq!(host.local_successes, 1);
    assert_eq!(authenticator.calls(), 1);
    assert!(session.maybe_auto_trigger().is_none());

    // The entry validator is untouched by biometric success
    assert_eq!(session.state(), EntryState::Awaiting);
    assert!(host.entered.is_empty());
}

#[tokio::test]
async fn test_auto_trigger_without_hardware() {
    let collaborators = Collaborators::default().with_authenticator(Arc::new(NoHardware));
    let mut host = Recorder::default();
    let mut session = mount(biometric_options(), "1234", collaborators);

    let resolution = session.maybe_auto_trigger().unwrap().run().await;
    assert_eq!(
        session.resolve_local_auth(resolution, &mut host),
        Some(LocalAuthOutcome::Failed)
    );
    assert_eq!(host.local_errors, vec![Some(BiometricError::Unavailable)]);
    assert_eq!(session.failure_count(), 0);

    // Keypad usable immediately
    assert!(session.is_input_enabled());
    assert_eq!(
        session.press(pinpad_core::KeyToken::Digit(1), Instant::now(), &mut host),
        PressOutcome::Updated { entered: 1 }
    );
}

#[tokio::test]
async fn test_declined_auth_reports_error_without_penalty() {
    let authenticator = SlowAuthenticator::new(Duration::ZERO, Ok(false));
    let options = PinOptions {
        allow_local_auth: true,
        ..Default::default()
    };
    let mut host = Recorder::default();
    let mut session = mount(
        options,
        "1234",
        Collaborators::default().with_authenticator(authenticator),
    );

    // Auto trigger not enabled
    assert!(session.maybe_auto_trigger().is_none());

    let resolution = session.trigger_local_auth().unwrap().run().await;
    session.resolve_local_auth(resolution, &mut host);

    assert_eq!(host.local_errors, vec![None]);
    assert_eq!(session.failure_count(), 0);
    assert!(session.is_input_enabled());
}

#[test]
fn test_manual_trigger_blocked_during_cooldown() {
    let authenticator = SlowAuthenticator::new(Duration::ZERO, Ok(true));
    let options = PinOptions {
        allow_local_auth: true,
        ..Default::default()
    };
    let mut host = Recorder::default();
    let mut session = mount(
        options,
        "1234",
        Collaborators::default().with_authenticator(authenticator),
    );
    let now = Instant::now();

    enter(&mut session, "0000", now, &mut host);
    assert!(session.trigger_local_auth().is_none());

    session.tick(now + Duration::from_secs(2));
    assert!(session.trigger_local_auth().is_some());
}

#[tokio::test]
async fn test_late_result_after_reset_is_dropped() {
    let authenticator = SlowAuthenticator::new(Duration::ZERO, Ok(true));
    let mut host = Recorder::default();
    let mut session = mount(
        biometric_options(),
        "1234",
        Collaborators::default().with_authenticator(authenticator),
    );

    let pending = session.maybe_auto_trigger().unwrap();
    session.reset();
    let resolution = pending.run().await;

    assert_eq!(session.resolve_local_auth(resolution, &mut host), None);
    assert_eq!(host.local_successes, 0);
}

#[tokio::test]
async fn test_late_result_after_hide_is_dropped() {
    let authenticator = SlowAuthenticator::new(Duration::ZERO, Ok(true));
    let mut host = Recorder::default();
    let mut overlay = PinOverlay::new(
        biometric_options(),
        TextOverrides::default(),
        Box::new(MemoryPinStore::with_pin("1234")),
        Collaborators::default().with_authenticator(authenticator),
    )
    .unwrap();

    let pending = overlay.show(Instant::now(), &mut host).unwrap().unwrap();
    assert_eq!(overlay.mode(), Mode::Enter);
    overlay.hide();

    let resolution = pending.run().await;
    assert_eq!(overlay.resolve_local_auth(resolution, &mut host), None);
    assert_eq!(host.local_successes, 0);
}

#[tokio::test]
async fn test_remount_gets_fresh_latch() {
    let authenticator = SlowAuthenticator::new(Duration::ZERO, Ok(false));
    let mut host = Recorder::default();
    let mut overlay = PinOverlay::new(
        biometric_options(),
        TextOverrides::default(),
        Box::new(MemoryPinStore::with_pin("1234")),
        Collaborators::default().with_authenticator(authenticator.clone()),
    )
    .unwrap();
    let now = Instant::now();

    let first = overlay.show(now, &mut host).unwrap().unwrap();
    overlay.resolve_local_auth(first.run().await, &mut host);
    overlay.hide();

    let second = overlay.show(now, &mut host).unwrap();
    assert!(second.is_some());
    assert_eq!(authenticator.calls(), 1);
}

#[test]
fn test_no_biometric_in_set_mode() {
    let authenticator = SlowAuthenticator::new(Duration::ZERO, Ok(true));
    let mut host = Recorder::default();
    let mut overlay = PinOverlay::new(
        biometric_options(),
        TextOverrides::default(),
        Box::new(MemoryPinStore::new()),
        Collaborators::default().with_authenticator(authenticator),
    )
    .unwrap();

    assert!(overlay.show(Instant::now(), &mut host).unwrap().is_none());
    assert_eq!(overlay.mode(), Mode::Set);
    assert!(overlay.trigger_local_auth().is_none());
}

#[tokio::test]
async fn test_set_success_hands_back_auto_attempt() {
    let authenticator = SlowAuthenticator::new(Duration::ZERO, Ok(true));
    let mut host = Recorder::default();
    let mut overlay = PinOverlay::new(
        biometric_options(),
        TextOverrides::default(),
        Box::new(MemoryPinStore::new()),
        Collaborators::default().with_authenticator(authenticator),
    )
    .unwrap();
    let now = Instant::now();
    overlay.show(now, &mut host).unwrap();

    let mut pending = None;
    for c in "24682468".chars() {
        pending = overlay
            .press(pinpad_core::KeyToken::from_char(c).unwrap(), now, &mut host)
            .unwrap();
    }

    assert_eq!(overlay.mode(), Mode::Enter);
    let resolution = pending.expect("auto attempt after set").run().await;
    assert_eq!(
        overlay.resolve_local_auth(resolution, &mut host),
        Some(LocalAuthOutcome::Succeeded)
    );
    assert!(overlay.session().unwrap().is_input_enabled());
}

// ============================================
// Locked mode
// ============================================

fn locking_overlay(store: MemoryPinStore) -> PinOverlay {
    let options = PinOptions {
        max_attempt: 1,
        ..Default::default()
    };
    PinOverlay::new(
        options,
        TextOverrides::default(),
        Box::new(store),
        Collaborators::default(),
    )
    .unwrap()
}

fn press_all(overlay: &mut PinOverlay, digits: &str, now: Instant, host: &mut Recorder) {
    for c in digits.chars() {
        overlay
            .press(pinpad_core::KeyToken::from_char(c).unwrap(), now, host)
            .unwrap();
    }
}

#[test]
fn test_show_from_reset_prompt_keeps_lock() {
    let mut host = Recorder::default();
    let mut overlay = locking_overlay(MemoryPinStore::with_pin("1234"));
    let now = Instant::now();
    overlay.show(now, &mut host).unwrap();

    press_all(&mut overlay, "0000", now, &mut host);
    assert_eq!(overlay.mode(), Mode::Locked);
    let deadline = overlay.locked_until().unwrap();

    assert!(overlay.request_reset(now, &mut host).unwrap());
    assert_eq!(overlay.mode(), Mode::Reset);

    let later = now + Duration::from_secs(1);
    assert!(overlay.show(later, &mut host).unwrap().is_none());
    assert_eq!(overlay.mode(), Mode::Locked);
    assert_eq!(overlay.locked_until(), Some(deadline));
    assert!(overlay.session().is_none());

    // The keypad stays dead until the deadline passes
    press_all(&mut overlay, "1234", later, &mut host);
    assert!(host.entered.is_empty());

    overlay.tick(deadline, &mut host).unwrap();
    assert_eq!(overlay.mode(), Mode::Enter);
    assert_eq!(overlay.session().unwrap().failure_count(), 0);
}

#[test]
fn test_confirmed_reset_lifts_lock() {
    let mut host = Recorder::default();
    let mut overlay = locking_overlay(MemoryPinStore::with_pin("1234"));
    let now = Instant::now();
    overlay.show(now, &mut host).unwrap();

    press_all(&mut overlay, "0000", now, &mut host);
    overlay.request_reset(now, &mut host).unwrap();
    overlay.confirm_reset(now, &mut host).unwrap();
    assert_eq!(overlay.locked_until(), None);

    overlay.hide();
    overlay.show(now, &mut host).unwrap();
    assert_eq!(overlay.mode(), Mode::Set);
}

#[test]
fn test_resumed_lock_applies_on_show() {
    let mut host = Recorder::default();
    let mut overlay = locking_overlay(MemoryPinStore::with_pin("1234"));
    let now = Instant::now();

    overlay.resume_lock(now + Duration::from_secs(30), now);
    overlay.show(now, &mut host).unwrap();
    assert_eq!(overlay.mode(), Mode::Locked);
    assert_eq!(overlay.locked_remaining(now), Some(Duration::from_secs(30)));
}

#[test]
fn test_expired_resumed_lock_is_ignored() {
    let mut host = Recorder::default();
    let mut overlay = locking_overlay(MemoryPinStore::with_pin("1234"));
    let now = Instant::now() + Duration::from_secs(60);

    overlay.resume_lock(now - Duration::from_secs(1), now);
    overlay.show(now, &mut host).unwrap();
    assert_eq!(overlay.mode(), Mode::Enter);
    assert_eq!(overlay.locked_until(), None);
}
