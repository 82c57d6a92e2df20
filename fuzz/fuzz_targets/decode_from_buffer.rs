#![no_main]

use libfuzzer_sys::fuzz_target;
use votecard_crop::engine::decode_source;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // Errors are fine; panics and runaway allocations are not.
    if let Ok(source) = decode_source(data) {
        assert!(source.width() > 0 && source.height() > 0);
    }
});
