#![no_main]

use libfuzzer_sys::fuzz_target;
use pinpad_core::{PinOptions, TextOptions, TextOverrides, MAX_PIN_LENGTH};

fuzz_target!(|data: &[u8]| {
    // Arbitrary JSON must parse or fail cleanly
    if let Ok(options) = serde_json::from_slice::<PinOptions>(data) {
        if options.validate().is_ok() {
            assert!(options.pin_length >= 1 && options.pin_length <= MAX_PIN_LENGTH);
            assert!(options.max_attempt >= 1);
        }
    }

    if let Ok(overrides) = serde_json::from_slice::<TextOverrides>(data) {
        let merged = TextOptions::merged(overrides.clone());
        if let Some(title) = overrides.enter.title {
            assert_eq!(merged.enter.title, title);
        }
    }
});
