#![forbid(unsafe_code)]

//! Raw-mode terminal guard.
//!
//! A [`TerminalSession`] puts the terminal in raw mode, optionally turns on
//! mouse reporting, and can flip the alternate screen on and off while it
//! lives (the viewer's fullscreen). Whatever it turned on is turned off
//! again when it drops. A panic hook and, on unix, a SIGINT/SIGTERM watcher
//! restore the terminal on the paths where `Drop` never runs.
//!
//! | Mode | On | Off |
//! |------|----|-----|
//! | Alternate screen | `CSI ? 1049 h` | `CSI ? 1049 l` |
//! | Mouse, SGR with motion | `CSI ? 1000;1002;1003;1006 h` | `CSI ? 1000;1002;1003;1006 l` |
//! | Cursor | `CSI ? 25 h` | `CSI ? 25 l` |
//!
//! ```no_run
//! use gtree_core::terminal_session::{SessionOptions, TerminalSession};
//!
//! let mut session = TerminalSession::new(SessionOptions { mouse_capture: true })?;
//! session.enter_alternate_screen()?;
//! session.leave_alternate_screen()?;
//! # Ok::<(), std::io::Error>(())
//! ```

use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Duration;

use crate::event::Event;

#[cfg(unix)]
use signal_hook::consts::signal::{SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Report presses, drags, motion and the wheel. Motion reporting is what
    /// makes hover work.
    pub mouse_capture: bool,
}

/// Owner of the terminal modes. Keep at most one alive.
#[derive(Debug)]
pub struct TerminalSession {
    alt_screen: bool,
    mouse: bool,
    #[cfg(unix)]
    signals: Option<SignalGuard>,
}

impl TerminalSession {
    /// Enter raw mode and turn on the requested modes.
    ///
    /// # Errors
    ///
    /// Fails if raw mode or mouse capture cannot be enabled; anything already
    /// enabled is undone by `Drop`.
    pub fn new(options: SessionOptions) -> io::Result<Self> {
        install_panic_hook();
        crossterm::terminal::enable_raw_mode()?;
        let mut session = Self {
            alt_screen: false,
            mouse: false,
            #[cfg(unix)]
            signals: Some(SignalGuard::new()?),
        };
        if options.mouse_capture {
            crossterm::execute!(io::stdout(), crossterm::event::EnableMouseCapture)?;
            session.mouse = true;
        }
        crate::info!(mouse = session.mouse, "terminal session started");
        Ok(session)
    }

    /// Terminal size as `(columns, rows)`.
    pub fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }

    /// Wait up to `timeout` for input. `Ok(true)` when an event is ready.
    pub fn poll_event(&self, timeout: Duration) -> io::Result<bool> {
        crossterm::event::poll(timeout)
    }

    /// Read one event; `None` when it has no [`Event`] form.
    pub fn read_event(&self) -> io::Result<Option<Event>> {
        Ok(Event::from_crossterm(crossterm::event::read()?))
    }

    /// Switch to the alternate screen and clear it. No-op when active.
    pub fn enter_alternate_screen(&mut self) -> io::Result<()> {
        if self.alt_screen {
            return Ok(());
        }
        crossterm::execute!(
            io::stdout(),
            crossterm::terminal::EnterAlternateScreen,
            crossterm::terminal::Clear(crossterm::terminal::ClearType::All)
        )?;
        self.alt_screen = true;
        crate::debug!("alternate screen on");
        Ok(())
    }

    /// Back to the main screen. No-op when not active.
    pub fn leave_alternate_screen(&mut self) -> io::Result<()> {
        if !self.alt_screen {
            return Ok(());
        }
        crossterm::execute!(io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;
        self.alt_screen = false;
        crate::debug!("alternate screen off");
        Ok(())
    }

    pub fn hide_cursor(&self) -> io::Result<()> {
        crossterm::execute!(io::stdout(), crossterm::cursor::Hide)
    }

    fn restore(&mut self) {
        #[cfg(unix)]
        drop(self.signals.take());

        let mut out = io::stdout();
        if self.mouse {
            let _ = crossterm::execute!(out, crossterm::event::DisableMouseCapture);
            self.mouse = false;
        }
        let _ = crossterm::execute!(out, crossterm::cursor::Show);
        if self.alt_screen {
            let _ = crossterm::execute!(out, crossterm::terminal::LeaveAlternateScreen);
            self.alt_screen = false;
        }
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = out.flush();
        crate::info!("terminal restored");
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.restore();
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();
            previous(info);
        }));
    });
}

/// Undo every mode unconditionally; used where the session is unreachable.
fn emergency_restore() {
    let mut out = io::stdout();
    let _ = crossterm::execute!(
        out,
        crossterm::event::DisableMouseCapture,
        crossterm::cursor::Show,
        crossterm::terminal::LeaveAlternateScreen
    );
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = out.flush();
}

#[cfg(unix)]
#[derive(Debug)]
struct SignalGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl SignalGuard {
    fn new() -> io::Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(io::Error::other)?;
        let handle = signals.handle();
        let thread = std::thread::Builder::new()
            .name("gtree-signals".into())
            .spawn(move || {
                if let Some(signal) = signals.forever().next() {
                    crate::warn!(signal, "terminated by signal");
                    emergency_restore();
                    std::process::exit(128 + signal);
                }
            })?;
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

#[cfg(unix)]
impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mouse_is_opt_in() {
        assert!(!SessionOptions::default().mouse_capture);
    }

    // Raw mode inside the test runner would break its output; the session
    // lifecycle is covered by running the binary.
}
