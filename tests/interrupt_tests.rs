//! Ctrl+C cancels the collection instead of killing the process
//!
//! Kept in its own test binary: raising SIGINT affects the whole process.
#![cfg(unix)]

use callsweep::collector::CancelToken;
use callsweep::interrupt::cancel_on_interrupt;
use nix::sys::signal::{raise, Signal};
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_sigint_cancels_token() {
    let token = CancelToken::new();
    cancel_on_interrupt(token.clone()).unwrap();
    assert!(!token.is_cancelled());

    raise(Signal::SIGINT).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while !token.is_cancelled() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    assert!(token.is_cancelled());
}
