//! Session control and reply output
//!
//! [`EmulatorControl`] lets another thread halt, single-step or terminate a
//! running emulator loop. [`OutputSink`] serializes writes to the host.

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use tracing::debug;

#[derive(Debug, Default)]
struct Pause {
    halted: bool,
    /// Tokens allowed through while halted
    steps: usize,
}

#[derive(Debug, Default)]
struct Inner {
    terminate: AtomicBool,
    pause: Mutex<Pause>,
    wake: Condvar,
}

/// Cloneable handle controlling an emulator loop
#[derive(Debug, Clone, Default)]
pub struct EmulatorControl {
    inner: Arc<Inner>,
}

impl EmulatorControl {
    pub fn new() -> Self {
        Self::default()
    }

    fn pause(&self) -> MutexGuard<'_, Pause> {
        self.inner.pause.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Halt or resume token processing
    pub fn signal_halt(&self, halt: bool) {
        debug!("Emulator halt: {}", halt);
        let mut pause = self.pause();
        pause.halted = halt;
        if !halt {
            pause.steps = 0;
        }
        self.inner.wake.notify_all();
    }

    /// Let one token through while halted
    pub fn step(&self) {
        let mut pause = self.pause();
        pause.steps += 1;
        self.inner.wake.notify_all();
    }

    /// Stop the loop after the current token. Wakes a halted loop.
    pub fn signal_terminate(&self) {
        self.inner.terminate.store(true, Ordering::SeqCst);
        let _pause = self.pause();
        self.inner.wake.notify_all();
    }

    pub fn is_terminated(&self) -> bool {
        self.inner.terminate.load(Ordering::SeqCst)
    }

    pub fn is_halted(&self) -> bool {
        self.pause().halted
    }

    /// Block while halted. Returns false once terminated.
    pub fn wait_runnable(&self) -> bool {
        let mut pause = self.pause();
        loop {
            if self.is_terminated() {
                return false;
            }
            if !pause.halted {
                return true;
            }
            if pause.steps > 0 {
                pause.steps -= 1;
                return true;
            }
            pause = self
                .inner
                .wake
                .wait(pause)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Shared writer for bytes going back to the host
#[derive(Clone)]
pub struct OutputSink {
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl OutputSink {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Write and flush `bytes` as one unit
    pub fn send(&self, bytes: &[u8]) -> io::Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_all(bytes)?;
        writer.flush()
    }
}

impl fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputSink").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_runnable_by_default() {
        let control = EmulatorControl::new();
        assert!(control.wait_runnable());
        assert!(!control.is_halted());
    }

    #[test]
    fn test_terminate() {
        let control = EmulatorControl::new();
        control.signal_terminate();
        assert!(control.is_terminated());
        assert!(!control.wait_runnable());
    }

    #[test]
    fn test_step_while_halted() {
        let control = EmulatorControl::new();
        control.signal_halt(true);
        control.step();
        control.step();
        assert!(control.wait_runnable());
        assert!(control.wait_runnable());
        assert!(control.is_halted());
    }

    #[test]
    fn test_terminate_wakes_halted_loop() {
        let control = EmulatorControl::new();
        control.signal_halt(true);

        let waiter = control.clone();
        let handle = thread::spawn(move || waiter.wait_runnable());

        thread::sleep(Duration::from_millis(20));
        control.signal_terminate();
        assert!(!handle.join().unwrap());
    }

    #[test]
    fn test_resume_wakes_halted_loop() {
        let control = EmulatorControl::new();
        control.signal_halt(true);

        let waiter = control.clone();
        let handle = thread::spawn(move || waiter.wait_runnable());

        thread::sleep(Duration::from_millis(20));
        control.signal_halt(false);
        assert!(handle.join().unwrap());
    }

    #[test]
    fn test_output_sink() {
        let buffer = Shared::default();
        let sink = OutputSink::new(buffer.clone());
        sink.send(b"\x1b[0n").unwrap();
        sink.clone().send(b"ok").unwrap();
        assert_eq!(buffer.0.lock().unwrap().as_slice(), b"\x1b[0nok");
    }
}
