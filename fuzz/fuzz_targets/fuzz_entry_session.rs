#![no_main]

use std::time::{Duration, Instant};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pinpad_core::{
    Collaborators, EntrySession, EntryState, KeyToken, PinHost, PinOptions, PressOutcome,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Arbitrary)]
enum Action {
    Digit(u8),
    Delete,
    Blank,
    Advance(u16),
    Reset,
    Arm,
}

#[derive(Debug, Arbitrary)]
struct Input {
    pin_length: u8,
    max_attempt: u8,
    retry_ms: u16,
    disable_lock: bool,
    shuffle: bool,
    seed: u64,
    actions: Vec<Action>,
}

#[derive(Default)]
struct Counter {
    max_attempts: u32,
}

impl PinHost for Counter {
    fn on_enter(&mut self, _pin: &str) {}

    fn on_max_attempt(&mut self) {
        self.max_attempts += 1;
    }
}

fuzz_target!(|input: Input| {
    let options = PinOptions {
        pin_length: usize::from(input.pin_length % 13),
        max_attempt: u32::from(input.max_attempt % 10),
        retry_lock_duration: u64::from(input.retry_ms),
        disable_lock: input.disable_lock,
        random_positions: input.shuffle,
        ..Default::default()
    };
    let reference = "7".repeat(options.pin_length);

    // Invalid options must be rejected, never panic
    let Ok(mut session) = EntrySession::mount(
        options.clone(),
        Some(reference),
        Collaborators::default(),
        &mut ChaCha8Rng::seed_from_u64(input.seed),
    ) else {
        return;
    };

    let layout = session.layout().clone();
    let mut host = Counter::default();
    let mut now = Instant::now();
    // Exhaustion fires at most once between resets
    let mut exhausted = 0u32;

    for action in input.actions {
        let token = match action {
            Action::Digit(d) => Some(KeyToken::Digit(d % 10)),
            Action::Delete => Some(KeyToken::Delete),
            Action::Blank => Some(KeyToken::Blank),
            Action::Advance(ms) => {
                now += Duration::from_millis(u64::from(ms));
                session.tick(now);
                None
            }
            Action::Reset => {
                session.reset();
                exhausted = 0;
                assert_eq!(session.state(), EntryState::Idle);
                assert_eq!(session.failure_count(), 0);
                None
            }
            Action::Arm => {
                session.arm();
                None
            }
        };

        if let Some(token) = token {
            let outcome = session.press(token, now, &mut host);
            if session.lockout().is_active() || session.state() == EntryState::Locked {
                assert!(!session.is_input_enabled());
            }
            if let PressOutcome::MaxAttempt { failures } = outcome {
                assert!(!options.disable_lock);
                assert_eq!(failures, options.max_attempt);
                exhausted += 1;
                assert_eq!(exhausted, 1);
            }
        }

        assert!(session.failure_count() <= options.max_attempt);
        assert!(session.entered_len() <= options.pin_length);
        assert_eq!(session.layout(), &layout);
    }

    if options.disable_lock {
        assert_eq!(host.max_attempts, 0);
    }
});
