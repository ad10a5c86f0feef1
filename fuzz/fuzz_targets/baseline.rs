#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rawsig_core::signal::RawSignal;
use rawsig_core::types::{BaselineMethod, BinRange};

#[derive(Debug, Arbitrary)]
struct Input {
    samples: Vec<i16>,
    start: u16,
    end: u16,
    robust: bool,
}

fuzz_target!(|input: Input| {
    let mut signal = RawSignal::with_samples(1, input.samples);
    let method = if input.robust {
        BaselineMethod::Robust
    } else {
        BaselineMethod::Standard
    };
    let range = BinRange::new(usize::from(input.start), usize::from(input.end));
    if let Ok(baseline) = signal.calculate_baseline(range, method) {
        assert!(baseline.sigma >= 0.0);
    }
});
