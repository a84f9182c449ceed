#![forbid(unsafe_code)]

//! Headless driver for models under test.
//!
//! `ProgramSimulator` runs a [`Model`] without a real terminal: events and
//! messages are injected directly, tasks run synchronously, fullscreen
//! requests resolve immediately (successfully unless told otherwise), and
//! frames are captured into buffers.
//!
//! # Example
//!
//! ```ignore
//! use gtree_runtime::simulator::ProgramSimulator;
//!
//! let mut sim = ProgramSimulator::new(Counter { value: 0 });
//! sim.init();
//! sim.send(Msg::Increment);
//! assert_eq!(sim.model().value, 1);
//!
//! let buf = sim.capture_frame(80, 24);
//! ```

use std::io;
use std::time::Duration;

use gtree_core::event::Event;
use gtree_render::buffer::Buffer;
use gtree_render::frame::Frame;

use crate::program::{Cmd, Model};

/// What the simulator executed, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmdRecord {
    None,
    Quit,
    Msg,
    Batch(usize),
    Tick(Duration),
    /// Background task, run synchronously; carries its name.
    Task(Option<String>),
    /// Fullscreen request and whether it succeeded.
    Fullscreen { enter: bool, ok: bool },
}

/// Runs a [`Model`] with no terminal attached.
pub struct ProgramSimulator<M: Model> {
    model: M,
    frames: Vec<Buffer>,
    command_log: Vec<CmdRecord>,
    running: bool,
    fullscreen: bool,
    fullscreen_failure: Option<io::ErrorKind>,
    tick_rate: Option<Duration>,
}

impl<M: Model> ProgramSimulator<M> {
    /// Create a simulator. The model is not initialized until
    /// [`init`](Self::init) is called.
    pub fn new(model: M) -> Self {
        Self {
            model,
            frames: Vec::new(),
            command_log: Vec::new(),
            running: true,
            fullscreen: false,
            fullscreen_failure: None,
            tick_rate: None,
        }
    }

    /// Call `Model::init()` and execute the returned commands.
    pub fn init(&mut self) {
        let cmd = self.model.init();
        self.execute_cmd(cmd);
    }

    /// Inject terminal events, converted with `From<Event>`.
    pub fn inject_events(&mut self, events: &[Event]) {
        for event in events {
            if !self.running {
                break;
            }
            let msg = M::Message::from(event.clone());
            let cmd = self.model.update(msg);
            self.execute_cmd(cmd);
        }
    }

    pub fn inject_event(&mut self, event: Event) {
        self.inject_events(&[event]);
    }

    pub fn send(&mut self, msg: M::Message) {
        if !self.running {
            return;
        }
        let cmd = self.model.update(msg);
        self.execute_cmd(cmd);
    }

    /// Make subsequent fullscreen requests fail with `kind`, or succeed
    /// again with `None`.
    pub fn fail_fullscreen(&mut self, kind: Option<io::ErrorKind>) {
        self.fullscreen_failure = kind;
    }

    /// Whether a successful fullscreen request is in effect.
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Render the model at the given size and hand it the hit grid, like a
    /// presented frame.
    pub fn capture_frame(&mut self, width: u16, height: u16) -> &Buffer {
        let mut frame = Frame::new(width.max(1), height.max(1));
        self.model.view(&mut frame);
        let (buffer, hits) = frame.into_parts();
        self.model.frame_presented(hits);
        self.frames.push(buffer);
        let last = self.frames.len() - 1;
        &self.frames[last]
    }

    pub fn frames(&self) -> &[Buffer] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&Buffer> {
        self.frames.last()
    }

    /// Text of the most recent frame, one line per row.
    pub fn last_frame_text(&self) -> String {
        self.last_frame()
            .map(|buf| {
                (0..buf.height())
                    .map(|y| buf.row_text(y))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default()
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// `false` after a `Cmd::Quit` has been executed.
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn tick_rate(&self) -> Option<Duration> {
        self.tick_rate
    }

    pub fn command_log(&self) -> &[CmdRecord] {
        &self.command_log
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => self.command_log.push(CmdRecord::None),
            Cmd::Quit => {
                self.running = false;
                self.command_log.push(CmdRecord::Quit);
            }
            Cmd::Msg(m) => {
                self.command_log.push(CmdRecord::Msg);
                let cmd = self.model.update(m);
                self.execute_cmd(cmd);
            }
            Cmd::Batch(cmds) => {
                self.command_log.push(CmdRecord::Batch(cmds.len()));
                for c in cmds {
                    self.execute_cmd(c);
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Tick(interval) => {
                self.tick_rate = Some(interval);
                self.command_log.push(CmdRecord::Tick(interval));
            }
            Cmd::Task(name, f) => {
                self.command_log.push(CmdRecord::Task(name));
                let msg = f();
                let cmd = self.model.update(msg);
                self.execute_cmd(cmd);
            }
            Cmd::Fullscreen(enter, done) => {
                let result = match self.fullscreen_failure {
                    Some(kind) => Err(io::Error::new(kind, "alternate screen unavailable")),
                    None => {
                        self.fullscreen = enter;
                        Ok(())
                    }
                };
                self.command_log.push(CmdRecord::Fullscreen {
                    enter,
                    ok: result.is_ok(),
                });
                let cmd = self.model.update(done(result));
                self.execute_cmd(cmd);
            }
        }
    }
}
