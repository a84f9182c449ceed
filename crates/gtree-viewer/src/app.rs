#![forbid(unsafe_code)]

//! The viewer's top-level model.
//!
//! One header row, the tree canvas, one status row. The canvas owns the
//! tree interaction ([`GenealogyState`]); this model adds loading, filters,
//! fullscreen requests and the quit/reload keys around it.
//!
//! # Invariants
//!
//! - The canvas renders only after a successful load; a failed or empty
//!   load leaves it blank and explains why in the status row.
//! - A new root resets expansion to "root only" but keeps zoom.
//! - The fullscreen flag changes only through a resolved request.

use std::io;

use gtree_core::event::{Event, KeyCode, KeyEvent, KeyEventKind, Modifiers};
use gtree_core::geometry::Rect;
use gtree_model::{GenerationFilter, TreeFilter, TreeNode};
use gtree_render::cell::PackedRgba;
use gtree_render::drawing::Draw;
use gtree_render::frame::{Frame, HitGrid};
use gtree_render::style::Style;
use gtree_runtime::{Cmd, Model};
use gtree_widgets::Widget;
use gtree_widgets::genealogy::{GenealogyState, GenealogyTree};
use gtree_widgets::layout::TreeLayout;
use gtree_widgets::theme;
use gtree_widgets::viewport::FullscreenRequest;

use crate::api::{DataSource, FetchError};

const ERROR: PackedRgba = PackedRgba::rgb(235, 100, 100);

/// Messages for [`AppModel`].
#[derive(Debug)]
pub enum AppMsg {
    /// A terminal event.
    Event(Event),
    /// Result of the background load with the given sequence number.
    Loaded(u64, Result<Option<TreeNode>, FetchError>),
    /// Outcome of a fullscreen request.
    FullscreenDone(FullscreenRequest, io::Result<()>),
    /// Fetch the tree again.
    Reload,
    Quit,
}

impl From<Event> for AppMsg {
    fn from(event: Event) -> Self {
        Self::Event(event)
    }
}

/// Progress of the current load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    /// The source answered without a tree.
    Empty,
    Failed(FetchError),
}

/// Application state.
pub struct AppModel {
    source: DataSource,
    root: Option<TreeNode>,
    load: LoadState,
    tree: GenealogyState,
    filter: TreeFilter,
    /// Search text while the `/` prompt is open.
    input: Option<String>,
    hits: HitGrid,
    size: (u16, u16),
    /// Sequence number of the newest fetch; older results are dropped.
    fetch_seq: u64,
}

impl AppModel {
    pub fn new(source: DataSource) -> Self {
        Self {
            source,
            root: None,
            load: LoadState::Loading,
            tree: GenealogyState::new(0),
            filter: TreeFilter::none(),
            input: None,
            hits: HitGrid::new(0, 0),
            size: (0, 0),
            fetch_seq: 0,
        }
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn tree(&self) -> &GenealogyState {
        &self.tree
    }

    pub fn filter(&self) -> &TreeFilter {
        &self.filter
    }

    pub fn is_searching(&self) -> bool {
        self.input.is_some()
    }

    /// Canvas area inside a UI region of `size`: everything but the header
    /// and status rows.
    pub fn canvas_area(size: (u16, u16)) -> Rect {
        let (_, rest) = Rect::from_size(size.0, size.1).split_top(1);
        let (canvas, _) = rest.split_bottom(1);
        canvas
    }

    fn fetch(&mut self) -> Cmd<AppMsg> {
        self.load = LoadState::Loading;
        self.fetch_seq += 1;
        let seq = self.fetch_seq;
        let source = self.source.clone();
        tracing::info!(source = %source.describe(), seq, "loading genealogy");
        Cmd::task_named("fetch-genealogy", move || AppMsg::Loaded(seq, source.load()))
    }

    fn loaded(&mut self, seq: u64, result: Result<Option<TreeNode>, FetchError>) {
        if seq != self.fetch_seq {
            tracing::debug!(seq, current = self.fetch_seq, "dropping superseded load");
            return;
        }
        match result {
            Ok(Some(root)) => {
                tracing::info!(root = root.id, nodes = root.node_count(), "genealogy loaded");
                self.tree.reset(root.id);
                self.root = Some(root);
                self.load = LoadState::Ready;
            }
            Ok(None) => {
                tracing::info!("no genealogy for this member");
                self.root = None;
                self.load = LoadState::Empty;
            }
            Err(err) => {
                tracing::warn!(error = %err, "genealogy load failed");
                self.root = None;
                self.load = LoadState::Failed(err);
            }
        }
        self.sync_layout();
    }

    /// Refresh scroll extents and drop stale focus after the visible set
    /// may have changed.
    fn sync_layout(&mut self) {
        if let Some(root) = &self.root {
            let layout = TreeLayout::compute(root, self.tree.expansion(), &self.filter);
            self.tree.sync_layout(&layout);
        }
    }

    fn request_fullscreen(&mut self) -> Cmd<AppMsg> {
        if self.tree.viewport().pending_fullscreen().is_some() {
            return Cmd::none();
        }
        let request = self.tree.viewport_mut().toggle_fullscreen();
        tracing::debug!(?request, "fullscreen requested");
        Cmd::fullscreen(request == FullscreenRequest::Enter, move |result| {
            AppMsg::FullscreenDone(request, result)
        })
    }

    fn handle_event(&mut self, event: Event) -> Cmd<AppMsg> {
        match event {
            Event::Resize { width, height } => {
                self.size = (width, height);
                self.tree.set_canvas(Self::canvas_area(self.size));
            }
            Event::Key(key) if key.kind != KeyEventKind::Release => return self.handle_key(key),
            Event::Mouse(mouse) => {
                let hit = self.hits.hit_test(mouse.x, mouse.y);
                let result = self.tree.handle_mouse(&mouse, hit);
                tracing::trace!(?result, "mouse");
            }
            Event::Touch(touch) => {
                self.tree.handle_touch(&touch);
            }
            Event::PointerLeft => {
                self.tree.pointer_left();
            }
            _ => {}
        }
        Cmd::none()
    }

    fn handle_key(&mut self, key: KeyEvent) -> Cmd<AppMsg> {
        if key.ctrl() && key.is_char('c') {
            return Cmd::msg(AppMsg::Quit);
        }
        if let Some(input) = self.input.as_mut() {
            match key.code {
                KeyCode::Char(c) if !key.modifiers.contains(Modifiers::CTRL) => input.push(c),
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Enter => self.input = None,
                KeyCode::Escape => {
                    self.input = None;
                    self.filter.search.clear();
                }
                _ => return Cmd::none(),
            }
            if let Some(input) = &self.input {
                self.filter.search = input.clone();
            }
            return Cmd::none();
        }

        match key.code {
            KeyCode::Char('q') => return Cmd::msg(AppMsg::Quit),
            KeyCode::Char('r') => return Cmd::msg(AppMsg::Reload),
            KeyCode::Char('f') => return self.request_fullscreen(),
            KeyCode::Char('/') => self.input = Some(self.filter.search.clone()),
            KeyCode::Char('g') => {
                let max = self.root.as_ref().and_then(TreeNode::max_generation).unwrap_or(0);
                self.filter.generation = self.filter.generation.cycle(max);
                tracing::debug!(generation = %self.filter.generation, "generation filter");
            }
            KeyCode::Escape if self.tree.viewport().is_fullscreen() => {
                return self.request_fullscreen();
            }
            _ => {
                if let Some(root) = &self.root {
                    let layout = TreeLayout::compute(root, self.tree.expansion(), &self.filter);
                    self.tree.handle_key(&key, &layout);
                }
            }
        }
        Cmd::none()
    }

    fn header(&self) -> String {
        let mut text = format!(" Genealogy · zoom {}%", self.tree.viewport().scale());
        if self.filter.generation != GenerationFilter::All {
            text.push_str(&format!(" · generation {}", self.filter.generation));
        }
        if !self.filter.search.is_empty() {
            text.push_str(&format!(" · search \"{}\"", self.filter.search));
        }
        if self.tree.viewport().is_fullscreen() {
            text.push_str(" · fullscreen");
        }
        text
    }

    fn status(&self, visible: usize) -> (String, Style) {
        if let Some(input) = &self.input {
            return (format!(" /{input}▏  Enter keep · Esc clear"), theme::title());
        }
        if let Some(err) = self.tree.viewport().fullscreen_error() {
            return (format!(" Fullscreen unavailable: {err}"), Style::new().fg(ERROR));
        }
        match &self.load {
            LoadState::Loading => (
                format!(" Loading genealogy from {}…", self.source.describe()),
                theme::subtle(),
            ),
            LoadState::Failed(err) => (format!(" {err} · r retry · q quit"), Style::new().fg(ERROR)),
            LoadState::Empty => (" No genealogy data for this member.".to_string(), theme::subtle()),
            LoadState::Ready if visible == 0 => (
                " No members match the filter · g generation · / search".to_string(),
                theme::subtle(),
            ),
            LoadState::Ready => {
                let total = self.root.as_ref().map_or(0, TreeNode::node_count);
                (
                    format!(
                        " {visible}/{total} shown · Tab focus · Enter expand · +/- zoom · / search · g gen · f fullscreen · q quit"
                    ),
                    theme::subtle(),
                )
            }
        }
    }
}

impl Model for AppModel {
    type Message = AppMsg;

    fn init(&mut self) -> Cmd<AppMsg> {
        self.fetch()
    }

    fn update(&mut self, msg: AppMsg) -> Cmd<AppMsg> {
        let cmd = match msg {
            AppMsg::Event(event) => self.handle_event(event),
            AppMsg::Loaded(seq, result) => {
                self.loaded(seq, result);
                Cmd::none()
            }
            AppMsg::FullscreenDone(request, result) => {
                self.tree.viewport_mut().resolve_fullscreen(request, result);
                Cmd::none()
            }
            AppMsg::Reload => self.fetch(),
            AppMsg::Quit => {
                tracing::info!("quit");
                Cmd::quit()
            }
        };
        self.sync_layout();
        cmd
    }

    fn view(&self, frame: &mut Frame) {
        let area = frame.bounds();
        if area.is_empty() {
            return;
        }
        let (header, rest) = area.split_top(1);
        let (canvas, status) = rest.split_bottom(1);

        let visible = match (&self.root, &self.load) {
            (Some(root), LoadState::Ready) => {
                let tree = GenealogyTree::new(root, &self.tree, &self.filter);
                let visible = tree.layout().cards.len();
                tree.render(canvas, frame);
                visible
            }
            _ => 0,
        };

        let header_text = self.header();
        frame.buffer.print_text_clipped(
            header.x,
            header.y,
            &header_text,
            theme::title().cell(' '),
            header.right(),
        );
        if !status.is_empty() {
            let (text, style) = self.status(visible);
            frame
                .buffer
                .print_text_clipped(status.x, status.y, &text, style.cell(' '), status.right());
        }
    }

    fn frame_presented(&mut self, hits: HitGrid) {
        self.hits = hits;
    }
}
