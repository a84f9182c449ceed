#![forbid(unsafe_code)]

//! Elm-style program runtime.
//!
//! A [`Model`] turns messages into state changes and [`Cmd`]s; the
//! [`Program`] owns the terminal, feeds events to the model, executes
//! commands, and presents the model's view.
//!
//! # Screen modes
//!
//! The program starts inline: the UI occupies the bottom `ui_height` rows
//! of the terminal and the scrollback above it is left alone. A
//! [`Cmd::Fullscreen`] request switches to the alternate screen, where the
//! UI takes the whole terminal, and back. Pointer coordinates are always
//! delivered relative to the UI region, and `Event::Resize` always carries
//! the region's size rather than the terminal's.
//!
//! # Invariants
//!
//! - Exactly one writer touches stdout: the presenter, from the loop thread.
//! - Background tasks never touch the model; their results come back as
//!   messages through a channel.
//! - After `Cmd::Quit`, no further commands from the same batch run.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Terminal I/O error | stdout closed, tty gone | `run` returns the error; the session guard restores the terminal |
//! | Alternate screen refused | host does not support it | error handed to the model via the fullscreen callback; mode unchanged |
//! | Task thread cannot spawn | resource exhaustion | `run` returns the error |

use std::io::{self, Stdout, Write};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use gtree_core::event::{Event, MouseEventKind};
use gtree_core::geometry::Rect;
use gtree_core::terminal_session::{SessionOptions, TerminalSession};
use gtree_render::frame::{Frame, HitGrid};
use gtree_render::presenter::Presenter;

/// The Model trait defines application state and behavior.
///
/// Implementations own their state and are mutated only through `update`.
pub trait Model: Sized {
    /// The message type for this model. Terminal events convert into it.
    type Message: From<Event> + Send + 'static;

    /// Startup commands, run once before the first frame.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// Update the model in response to a message.
    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Render the current state to a frame.
    fn view(&self, frame: &mut Frame);

    /// Receive the hit grid of the frame just presented.
    ///
    /// Pointer events that follow are hit-tested against this grid.
    fn frame_presented(&mut self, hits: HitGrid) {
        let _ = hits;
    }
}

/// Callback turning the outcome of a fullscreen request into a message.
pub type FullscreenCallback<M> = Box<dyn FnOnce(io::Result<()>) -> M + Send>;

/// Commands for side effects, returned from [`Model::update`].
#[derive(Default)]
pub enum Cmd<M> {
    /// No operation.
    #[default]
    None,
    /// Quit the application.
    Quit,
    /// Execute several commands in order.
    Batch(Vec<Cmd<M>>),
    /// Send a message to the model.
    Msg(M),
    /// Deliver `Event::Tick` at this interval.
    Tick(Duration),
    /// Run a blocking closure on a worker thread; its return value comes
    /// back as a message.
    Task(Option<String>, Box<dyn FnOnce() -> M + Send>),
    /// Enter (`true`) or leave (`false`) the alternate screen, then report
    /// the outcome through the callback.
    Fullscreen(bool, FullscreenCallback<M>),
}

impl<M: std::fmt::Debug> std::fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Quit => write!(f, "Quit"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::Tick(d) => f.debug_tuple("Tick").field(d).finish(),
            Self::Task(name, _) => f.debug_struct("Task").field("name", name).finish(),
            Self::Fullscreen(enter, _) => write!(f, "Fullscreen({enter})"),
        }
    }
}

impl<M> Cmd<M> {
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    #[inline]
    pub fn quit() -> Self {
        Self::Quit
    }

    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    #[inline]
    pub fn tick(interval: Duration) -> Self {
        Self::Tick(interval)
    }

    /// Create a batch, collapsing empty and single-element lists.
    pub fn batch(cmds: Vec<Self>) -> Self {
        let mut cmds: Vec<Self> = cmds.into_iter().filter(|c| !c.is_none()).collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or(Self::None),
            _ => Self::Batch(cmds),
        }
    }

    /// Run `f` on a worker thread.
    pub fn task<F>(f: F) -> Self
    where
        F: FnOnce() -> M + Send + 'static,
    {
        Self::Task(None, Box::new(f))
    }

    /// Run `f` on a worker thread named `name`.
    pub fn task_named<F>(name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce() -> M + Send + 'static,
    {
        Self::Task(Some(name.into()), Box::new(f))
    }

    /// Request the alternate screen (`enter`) or the inline region.
    pub fn fullscreen<F>(enter: bool, done: F) -> Self
    where
        F: FnOnce(io::Result<()>) -> M + Send + 'static,
    {
        Self::Fullscreen(enter, Box::new(done))
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Stable name for logging.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Quit => "Quit",
            Self::Batch(_) => "Batch",
            Self::Msg(_) => "Msg",
            Self::Tick(_) => "Tick",
            Self::Task(..) => "Task",
            Self::Fullscreen(..) => "Fullscreen",
        }
    }
}

/// Program configuration.
#[derive(Debug, Clone)]
pub struct ProgramConfig {
    /// Rows reserved for the UI in inline mode.
    pub ui_height: u16,
    /// Capture mouse input (press, drag, motion, wheel).
    pub mouse: bool,
    /// Longest wait for input before checking task results.
    pub poll_interval: Duration,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            ui_height: 24,
            mouse: true,
            poll_interval: Duration::from_millis(50),
        }
    }
}

impl ProgramConfig {
    #[must_use]
    pub fn with_ui_height(mut self, rows: u16) -> Self {
        self.ui_height = rows;
        self
    }

    #[must_use]
    pub fn with_mouse(mut self, mouse: bool) -> Self {
        self.mouse = mouse;
        self
    }
}

/// Screen rows the UI occupies for a terminal of `size`.
///
/// Fullscreen takes the whole terminal; inline mode takes the bottom
/// `ui_height` rows (at least one, at most all of them).
pub fn ui_region(size: (u16, u16), ui_height: u16, fullscreen: bool) -> Rect {
    let (cols, rows) = size;
    if fullscreen {
        return Rect::new(0, 0, cols, rows);
    }
    let height = ui_height.clamp(1, rows.max(1)).min(rows);
    Rect::new(0, rows - height, cols, height)
}

/// Translate a terminal event into UI-region coordinates.
///
/// Motion, drags, releases and touches outside the region become
/// [`Event::PointerLeft`]; presses and wheel turns there are dropped.
pub fn to_region(event: Event, region: Rect) -> Option<Event> {
    let inside = |x: u16, y: u16| region.contains(x, y);
    match &event {
        Event::Mouse(mouse) if !inside(mouse.x, mouse.y) => match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) | MouseEventKind::Up(_) => {
                Some(Event::PointerLeft)
            }
            _ => None,
        },
        Event::Touch(touch) if touch.touches.iter().any(|&(x, y)| !inside(x, y)) => {
            Some(Event::PointerLeft)
        }
        _ => Some(event.offset(region.x, region.y)),
    }
}

/// The program runtime.
pub struct Program<M: Model> {
    model: M,
    config: ProgramConfig,
    session: TerminalSession,
    presenter: Presenter<Stdout>,
    tasks_tx: mpsc::Sender<M::Message>,
    tasks_rx: mpsc::Receiver<M::Message>,
    running: bool,
    dirty: bool,
    fullscreen: bool,
    size: (u16, u16),
    tick: Option<(Duration, Instant)>,
}

impl<M: Model> Program<M> {
    /// Take over the terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode or mouse capture cannot be enabled.
    pub fn new(model: M, config: ProgramConfig) -> io::Result<Self> {
        let session = TerminalSession::new(SessionOptions {
            mouse_capture: config.mouse,
        })?;
        session.hide_cursor()?;
        let size = session.size()?;
        let (tasks_tx, tasks_rx) = mpsc::channel();
        Ok(Self {
            model,
            config,
            session,
            presenter: Presenter::new(io::stdout()),
            tasks_tx,
            tasks_rx,
            running: true,
            dirty: true,
            fullscreen: false,
            size,
            tick: None,
        })
    }

    /// Run the event loop until the model quits. Returns the model.
    ///
    /// # Errors
    ///
    /// Returns the first terminal I/O error.
    pub fn run(mut self) -> io::Result<M> {
        self.reserve_inline_rows()?;
        let cmd = self.model.init();
        self.execute(cmd)?;
        self.announce_region()?;

        while self.running {
            if self.dirty {
                self.render()?;
            }
            while let Ok(msg) = self.tasks_rx.try_recv() {
                self.dispatch(msg)?;
                if !self.running {
                    break;
                }
            }
            if !self.running {
                break;
            }
            if self.session.poll_event(self.poll_timeout())? {
                if let Some(event) = self.session.read_event()? {
                    self.handle_event(event)?;
                }
            }
            self.fire_tick()?;
        }

        self.finish()?;
        Ok(self.model)
    }

    fn poll_timeout(&self) -> Duration {
        match self.tick {
            Some((interval, last)) => interval
                .saturating_sub(last.elapsed())
                .min(self.config.poll_interval),
            None => self.config.poll_interval,
        }
    }

    fn fire_tick(&mut self) -> io::Result<()> {
        let Some((interval, last)) = self.tick else {
            return Ok(());
        };
        if last.elapsed() >= interval {
            self.tick = Some((interval, Instant::now()));
            self.dispatch(M::Message::from(Event::Tick))?;
        }
        Ok(())
    }

    fn region(&self) -> Rect {
        ui_region(self.size, self.config.ui_height, self.fullscreen)
    }

    /// Tell the model how large its region is, as an `Event::Resize`.
    fn announce_region(&mut self) -> io::Result<()> {
        let region = self.region();
        self.dispatch(M::Message::from(Event::Resize {
            width: region.width,
            height: region.height,
        }))
    }

    fn handle_event(&mut self, event: Event) -> io::Result<()> {
        if let Event::Resize { width, height } = event {
            tracing::debug!(width, height, "terminal resized");
            self.size = (width, height);
            self.presenter.invalidate();
            return self.announce_region();
        }
        match to_region(event, self.region()) {
            Some(event) => self.dispatch(M::Message::from(event)),
            None => Ok(()),
        }
    }

    fn dispatch(&mut self, msg: M::Message) -> io::Result<()> {
        let cmd = self.model.update(msg);
        self.dirty = true;
        self.execute(cmd)
    }

    fn execute(&mut self, cmd: Cmd<M::Message>) -> io::Result<()> {
        match cmd {
            Cmd::None => {}
            Cmd::Quit => {
                tracing::debug!("quit requested");
                self.running = false;
            }
            Cmd::Batch(cmds) => {
                for cmd in cmds {
                    self.execute(cmd)?;
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Msg(msg) => self.dispatch(msg)?,
            Cmd::Tick(interval) => {
                self.tick = Some((interval, Instant::now()));
            }
            Cmd::Task(name, f) => {
                let tx = self.tasks_tx.clone();
                let label = name.unwrap_or_else(|| "gtree-task".to_string());
                tracing::debug!(task = %label, "spawning task");
                thread::Builder::new().name(label).spawn(move || {
                    // The loop may already be gone; nothing to report then.
                    let _ = tx.send(f());
                })?;
            }
            Cmd::Fullscreen(enter, done) => {
                let result = if enter {
                    self.session.enter_alternate_screen()
                } else {
                    self.session.leave_alternate_screen()
                };
                match &result {
                    Ok(()) => {
                        self.fullscreen = enter;
                        self.presenter.invalidate();
                        if !enter {
                            self.clear_inline_region()?;
                        }
                        self.announce_region()?;
                    }
                    Err(err) => tracing::warn!(enter, error = %err, "screen mode switch failed"),
                }
                self.dispatch(done(result))?;
            }
        }
        Ok(())
    }

    fn render(&mut self) -> io::Result<()> {
        let region = self.region();
        let mut frame = Frame::new(region.width.max(1), region.height.max(1));
        self.model.view(&mut frame);
        let (buffer, hits) = frame.into_parts();
        self.presenter.present(&buffer, region.y)?;
        self.model.frame_presented(hits);
        self.dirty = false;
        Ok(())
    }

    /// Scroll the main screen so the inline region starts blank.
    fn reserve_inline_rows(&mut self) -> io::Result<()> {
        if self.fullscreen {
            return Ok(());
        }
        let region = self.region();
        let mut out = io::stdout();
        crossterm::queue!(out, crossterm::cursor::MoveTo(0, self.size.1.saturating_sub(1)))?;
        for _ in 0..region.height {
            crossterm::queue!(out, crossterm::style::Print("\r\n"))?;
        }
        crossterm::queue!(
            out,
            crossterm::cursor::MoveTo(0, region.y),
            crossterm::terminal::Clear(crossterm::terminal::ClearType::FromCursorDown)
        )?;
        out.flush()?;
        self.presenter.invalidate();
        self.dirty = true;
        Ok(())
    }

    /// Blank the inline region after returning from the alternate screen.
    fn clear_inline_region(&mut self) -> io::Result<()> {
        let region = self.region();
        let mut out = io::stdout();
        crossterm::queue!(
            out,
            crossterm::cursor::MoveTo(0, region.y),
            crossterm::terminal::Clear(crossterm::terminal::ClearType::FromCursorDown)
        )?;
        out.flush()?;
        self.dirty = true;
        Ok(())
    }

    /// Leave the cursor below the UI so the shell prompt lands cleanly.
    fn finish(&mut self) -> io::Result<()> {
        if self.fullscreen {
            self.session.leave_alternate_screen()?;
            self.fullscreen = false;
        }
        self.presenter.move_cursor(0, self.size.1.saturating_sub(1))?;
        let mut out = io::stdout();
        crossterm::queue!(out, crossterm::style::Print("\r\n"))?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gtree_core::event::{MouseButton, MouseEvent, TouchEvent, TouchPhase};

    #[test]
    fn batch_collapses() {
        assert!(Cmd::<()>::batch(vec![]).is_none());
        assert!(matches!(Cmd::<()>::batch(vec![Cmd::None, Cmd::Quit]), Cmd::Quit));
        assert!(matches!(
            Cmd::<()>::batch(vec![Cmd::Quit, Cmd::Msg(())]),
            Cmd::Batch(cmds) if cmds.len() == 2
        ));
    }

    #[test]
    fn type_names() {
        assert_eq!(Cmd::<()>::task(|| ()).type_name(), "Task");
        assert_eq!(Cmd::<()>::fullscreen(true, |_| ()).type_name(), "Fullscreen");
        assert_eq!(format!("{:?}", Cmd::<()>::fullscreen(false, |_| ())), "Fullscreen(false)");
    }

    #[test]
    fn inline_region_sits_at_bottom() {
        assert_eq!(ui_region((80, 40), 24, false), Rect::new(0, 16, 80, 24));
        assert_eq!(ui_region((80, 10), 24, false), Rect::new(0, 0, 80, 10));
        assert_eq!(ui_region((80, 40), 0, false), Rect::new(0, 39, 80, 1));
        assert_eq!(ui_region((80, 40), 24, true), Rect::new(0, 0, 80, 40));
    }

    #[test]
    fn pointer_events_are_made_relative() {
        let region = Rect::new(0, 16, 80, 24);
        let down = Event::Mouse(MouseEvent::new(MouseEventKind::Moved, 5, 20));
        assert_eq!(
            to_region(down, region),
            Some(Event::Mouse(MouseEvent::new(MouseEventKind::Moved, 5, 4)))
        );
        let above = Event::Mouse(MouseEvent::new(MouseEventKind::Moved, 5, 3));
        assert_eq!(to_region(above, region), Some(Event::PointerLeft));
        let press_above = Event::Mouse(MouseEvent::new(MouseEventKind::Down(MouseButton::Left), 5, 3));
        assert_eq!(to_region(press_above, region), None);
        let wheel_above = Event::Mouse(MouseEvent::new(MouseEventKind::ScrollUp, 5, 3));
        assert_eq!(to_region(wheel_above, region), None);

        let touch = Event::Touch(TouchEvent::new(TouchPhase::Start, vec![(1, 17)]));
        assert_eq!(
            to_region(touch, region),
            Some(Event::Touch(TouchEvent::new(TouchPhase::Start, vec![(1, 1)])))
        );
        assert_eq!(to_region(Event::Tick, region), Some(Event::Tick));
    }

    #[test]
    fn drag_out_through_the_top_reports_leaving() {
        let region = Rect::new(0, 16, 80, 24);
        let drag = Event::Mouse(MouseEvent::new(MouseEventKind::Drag(MouseButton::Left), 5, 15));
        assert_eq!(to_region(drag, region), Some(Event::PointerLeft));
        let release = Event::Mouse(MouseEvent::new(MouseEventKind::Up(MouseButton::Left), 5, 2));
        assert_eq!(to_region(release, region), Some(Event::PointerLeft));
        let touch = Event::Touch(TouchEvent::new(TouchPhase::Move, vec![(1, 3)]));
        assert_eq!(to_region(touch, region), Some(Event::PointerLeft));
    }
}
