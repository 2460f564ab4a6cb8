//! End-to-end coverage for the autolock controller: idle locking, unlock
//! flows, and split-context delegation.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use autolock_core::{
    command_pair, delegation_pair, ActivitySignal, AuthMethod, AutolockError, AutolockPeriod,
    AutolockTimer, CredentialSlide, CredentialVerifier, HapticFeedback, InteractionKind,
    LockConfig, LockEffects, LockState, SessionLock, UnlockCredentialFlow, VerifyServiceError,
    WRONG_PASSWORD_MESSAGE,
};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

const FIVE_MINUTES: Duration = Duration::from_secs(5 * 60);

fn password_config() -> LockConfig {
    LockConfig {
        autolock: AutolockPeriod::Minutes5,
        ..LockConfig::default()
    }
}

fn biometric_config() -> LockConfig {
    LockConfig {
        autolock: AutolockPeriod::Minutes5,
        auth: AuthMethod::PlatformBiometrics,
        background_capable: true,
        ..LockConfig::default()
    }
}

#[derive(Default, Clone)]
struct CountingEffects {
    overlay_shown: Arc<Mutex<u32>>,
    overlay_hidden: Arc<Mutex<u32>>,
    browser_hidden: Arc<Mutex<u32>>,
    browser_restored: Arc<Mutex<u32>>,
    pin_cleared: Arc<Mutex<u32>>,
}

impl LockEffects for CountingEffects {
    fn show_lock_overlay(&mut self) {
        *self.overlay_shown.lock().unwrap() += 1;
    }
    fn hide_lock_overlay(&mut self) {
        *self.overlay_hidden.lock().unwrap() += 1;
    }
    fn hide_browser_overlay(&mut self) {
        *self.browser_hidden.lock().unwrap() += 1;
    }
    fn restore_browser_overlay(&mut self) {
        *self.browser_restored.lock().unwrap() += 1;
    }
    fn clear_pin_accepted(&mut self) {
        *self.pin_cleared.lock().unwrap() += 1;
    }
}

struct PasswordIs(&'static str);

#[async_trait::async_trait]
impl CredentialVerifier for PasswordIs {
    async fn verify_password(&self, candidate: &str) -> Result<bool, VerifyServiceError> {
        Ok(candidate == self.0)
    }
}

struct SilentHaptics;

#[async_trait::async_trait]
impl HapticFeedback for SilentHaptics {
    async fn unlock_succeeded(&self) {}
}

/// Builds a primary session plus a manually driven timer so tests can use
/// simulated instants instead of sleeping through real intervals.
fn primary_with_timer(config: LockConfig) -> (SessionLock, ActivitySignal, AutolockTimer, Instant) {
    let signal = ActivitySignal::new();
    let session = SessionLock::primary(
        config,
        Box::new(autolock_core::NoopEffects),
        &signal,
        None,
    );
    let clock = session.clock().expect("primary clock");
    let start = clock.last_activity();
    let timer = AutolockTimer::new(
        clock,
        session.machine(),
        config.autolock.duration().expect("enabled period"),
    );
    (session, signal, timer, start)
}

fn unlock(session: &SessionLock) {
    session
        .machine()
        .lock()
        .unwrap()
        .unlock_success()
        .expect("unlock");
}

#[test]
fn idle_past_period_locks_into_password_form() {
    init_logging();
    let (session, _signal, timer, start) = primary_with_timer(password_config());
    unlock(&session);

    timer.check(start + FIVE_MINUTES + Duration::from_secs(1));
    assert_eq!(
        session.state(),
        LockState::Locked {
            slide: CredentialSlide::PasswordForm
        }
    );
}

#[test]
fn idle_past_period_locks_into_biometric_prompt_when_configured() {
    let (session, _signal, timer, start) = primary_with_timer(biometric_config());
    unlock(&session);

    timer.check(start + FIVE_MINUTES + Duration::from_secs(1));
    assert_eq!(
        session.state(),
        LockState::Locked {
            slide: CredentialSlide::BiometricPrompt
        }
    );
}

#[test]
fn tracked_input_defers_the_lock() {
    let (session, _signal, timer, start) = primary_with_timer(password_config());
    unlock(&session);

    assert!(session.observe_input(InteractionKind::PointerMove, start + Duration::from_secs(240)));
    timer.check(start + FIVE_MINUTES + Duration::from_secs(1));
    assert_eq!(session.state(), LockState::Unlocked);

    // Idle since the tracked event eventually crosses the threshold.
    timer.check(start + Duration::from_secs(240) + FIVE_MINUTES + Duration::from_secs(1));
    assert!(session.state().is_locked());
}

#[test]
fn hardware_backed_account_never_locks() {
    let signal = ActivitySignal::new();
    let config = LockConfig {
        hardware_backed: true,
        ..password_config()
    };
    let session = SessionLock::primary(
        config,
        Box::new(autolock_core::NoopEffects),
        &signal,
        None,
    );
    let clock = session.clock().expect("clock");
    let start = clock.last_activity();
    let timer = AutolockTimer::new(clock, session.machine(), FIVE_MINUTES);

    timer.check(start + Duration::from_secs(24 * 60 * 60));
    assert_eq!(session.state(), LockState::Unlocked);
}

#[test]
fn lock_then_unlock_restores_surfaces_exactly_once() {
    let effects = CountingEffects::default();
    let overlay_hidden = Arc::clone(&effects.overlay_hidden);
    let browser_restored = Arc::clone(&effects.browser_restored);
    let pin_cleared = Arc::clone(&effects.pin_cleared);

    let signal = ActivitySignal::new();
    let session = SessionLock::primary(password_config(), Box::new(effects), &signal, None);
    unlock(&session);

    let machine = session.machine();
    machine.lock().unwrap().lock().expect("lock");
    machine.lock().unwrap().unlock_success().expect("unlock");

    assert_eq!(session.state(), LockState::Unlocked);
    // One initial unlock + one round trip.
    assert_eq!(*overlay_hidden.lock().unwrap(), 2);
    assert_eq!(*browser_restored.lock().unwrap(), 2);
    assert_eq!(*pin_cleared.lock().unwrap(), 2);
}

#[tokio::test]
async fn rejected_credential_does_not_retrigger_lock_effects() {
    let effects = CountingEffects::default();
    let overlay_shown = Arc::clone(&effects.overlay_shown);

    let signal = ActivitySignal::new();
    let session = SessionLock::primary(password_config(), Box::new(effects), &signal, None);
    let mut flow = UnlockCredentialFlow::new(
        session.machine(),
        Arc::new(PasswordIs("correct")),
        Arc::new(SilentHaptics),
    );

    let shown_before = *overlay_shown.lock().unwrap();
    assert_eq!(
        flow.submit_password("wrong").await,
        Err(AutolockError::CredentialRejected)
    );
    assert!(session.state().is_locked());
    assert_eq!(flow.error_message(), Some(WRONG_PASSWORD_MESSAGE));
    assert_eq!(*overlay_shown.lock().unwrap(), shown_before);
}

#[tokio::test]
async fn biometric_prompt_background_then_password_unlock() {
    init_logging();
    let signal = ActivitySignal::new();
    let session = SessionLock::primary(
        biometric_config(),
        Box::new(autolock_core::NoopEffects),
        &signal,
        None,
    );
    assert_eq!(session.state().slide(), Some(CredentialSlide::BiometricPrompt));

    // User bails out of the prompt, app round-trips through background.
    session
        .machine()
        .lock()
        .unwrap()
        .switch_to_password_form()
        .expect("switch");
    session.on_background();
    assert_eq!(session.state().slide(), Some(CredentialSlide::BiometricPrompt));
    session.on_foreground();

    // Chooses the password form again and gets it right this time.
    session
        .machine()
        .lock()
        .unwrap()
        .switch_to_password_form()
        .expect("switch");
    let mut flow = UnlockCredentialFlow::new(
        session.machine(),
        Arc::new(PasswordIs("correct")),
        Arc::new(SilentHaptics),
    );
    flow.submit_password("correct").await.expect("unlock");
    assert_eq!(session.state(), LockState::Unlocked);
}

#[test]
fn delegated_activity_reaches_the_clock_only_through_the_bridge() {
    let primary_signal = ActivitySignal::new();
    let primary = SessionLock::primary(
        password_config(),
        Box::new(autolock_core::NoopEffects),
        &primary_signal,
        None,
    );
    let clock = primary.clock().expect("clock");
    let start = clock.last_activity();

    let (uplink, inbox) = delegation_pair("overlay-1", Arc::clone(&clock), primary_signal.clone());
    let overlay_signal = ActivitySignal::new();
    let delegated = SessionLock::delegated(password_config(), &overlay_signal, uplink);
    assert!(delegated.clock().is_none());

    // Overlay input forwards but cannot move the clock by itself.
    assert!(delegated.observe_input(InteractionKind::KeyPress, start + Duration::from_secs(1)));
    assert_eq!(clock.last_activity(), start);

    let receipt = start + Duration::from_secs(2);
    assert_eq!(inbox.drain(receipt), 1);
    assert_eq!(clock.last_activity(), receipt);
}

#[test]
fn primary_lock_commands_mirror_into_the_delegated_context() {
    let (downlink, delegated_inbox) = command_pair();
    let primary_signal = ActivitySignal::new();
    let primary = SessionLock::primary(
        password_config(),
        Box::new(autolock_core::NoopEffects),
        &primary_signal,
        Some(downlink),
    );

    let overlay_signal = ActivitySignal::new();
    let clock = primary.clock().expect("clock");
    let (uplink, _inbox) = delegation_pair("overlay-1", clock, primary_signal.clone());
    let delegated = SessionLock::delegated(password_config(), &overlay_signal, uplink);

    unlock(&primary);
    primary.machine().lock().unwrap().lock().expect("lock");

    {
        let machine = delegated.machine();
        let mut machine = machine.lock().unwrap();
        assert!(delegated_inbox.drain(&mut machine) > 0);
        assert!(machine.state().is_locked());
        assert!(!machine.surface_visible());
    }

    primary.machine().lock().unwrap().unlock_success().expect("unlock");
    {
        let machine = delegated.machine();
        let mut machine = machine.lock().unwrap();
        delegated_inbox.drain(&mut machine);
        assert_eq!(machine.state(), LockState::Unlocked);
        assert!(machine.surface_visible());
    }
}

#[test]
fn closing_the_overlay_does_not_disturb_the_primary() {
    let (downlink, delegated_inbox) = command_pair();
    let primary_signal = ActivitySignal::new();
    let primary = SessionLock::primary(
        password_config(),
        Box::new(autolock_core::NoopEffects),
        &primary_signal,
        Some(downlink),
    );
    unlock(&primary);

    // Overlay goes away; subsequent broadcasts are dropped silently.
    drop(delegated_inbox);
    primary.machine().lock().unwrap().lock().expect("lock");
    assert!(primary.state().is_locked());
}
