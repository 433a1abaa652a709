#![allow(dead_code)]

use carbonate_rs::{Conditions, SampleConstants, SampleTotals};

pub fn totals() -> SampleTotals {
    SampleTotals {
        tb: 4.16e-4,
        tpo4: 1e-6,
        tsi: 5e-6,
        tso4: 0.02824,
        tf: 6.8e-5,
        ..Default::default()
    }
}

pub fn constants() -> SampleConstants {
    SampleConstants {
        k0: 0.02839,
        k1: 1.42e-6,
        k2: 1.12e-9,
        kb: 2.53e-9,
        kw: 6.0e-14,
        kp1: 0.0244,
        kp2: 1.08e-6,
        kp3: 1.62e-9,
        ksi: 4.1e-10,
        knh3: 5.6e-10,
        kh2s: 1.05e-7,
        kso4: 0.102,
        kf: 2.4e-3,
        ph_factor_to_free: 1.0 / (1.0 + 0.02824 / 0.102),
    }
}

pub fn conditions(n: usize) -> Conditions {
    Conditions::uniform(n, totals(), constants())
}
