#![no_main]
use libfuzzer_sys::fuzz_target;
use stacklog::{EditEvent, Reconstructor};

fuzz_target!(|data: &[u8]| {
    // Malformed records must come back as errors, never panics.
    let s = String::from_utf8_lossy(data);
    let _ = Reconstructor::new().parse(&s);
    let _ = s.parse::<EditEvent>();

    // Give the record grammar a head start past classification.
    let _ = Reconstructor::new().parse(&format!("STACK_APPEND({s}"));
});
