#![forbid(unsafe_code)]

//! End-to-end viewer flows through the deterministic program simulator.

use std::io;
use std::path::PathBuf;

use gtree_core::event::{Event, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use gtree_model::fixture_tree;
use gtree_runtime::{CmdRecord, ProgramSimulator};
use gtree_viewer::api::DataSource;
use gtree_viewer::app::{AppModel, LoadState};

const WIDTH: u16 = 100;
const HEIGHT: u16 = 30;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn started(source: DataSource) -> ProgramSimulator<AppModel> {
    init_tracing();
    let mut sim = ProgramSimulator::new(AppModel::new(source));
    sim.init();
    sim.inject_event(Event::Resize {
        width: WIDTH,
        height: HEIGHT,
    });
    sim.capture_frame(WIDTH, HEIGHT);
    sim
}

fn press(sim: &mut ProgramSimulator<AppModel>, code: KeyCode) {
    sim.inject_event(Event::Key(KeyEvent::new(code)));
    sim.capture_frame(WIDTH, HEIGHT);
}

fn click(sim: &mut ProgramSimulator<AppModel>, x: u16, y: u16) {
    for kind in [
        MouseEventKind::Down(MouseButton::Left),
        MouseEventKind::Up(MouseButton::Left),
    ] {
        sim.inject_event(Event::Mouse(MouseEvent::new(kind, x, y)));
    }
    sim.capture_frame(WIDTH, HEIGHT);
}

fn find(sim: &ProgramSimulator<AppModel>, needle: &str) -> Option<(u16, u16)> {
    let buf = sim.last_frame()?;
    (0..buf.height()).find_map(|y| {
        let row = buf.row_text(y);
        row.find(needle)
            .map(|byte| (row[..byte].chars().count() as u16, y))
    })
}

#[test]
fn fixture_loads_and_renders_first_generation() {
    let sim = started(DataSource::Fixture);
    assert_eq!(sim.model().load_state(), &LoadState::Ready);
    assert!(
        sim.command_log()
            .contains(&CmdRecord::Task(Some("fetch-genealogy".into())))
    );
    let text = sim.last_frame_text();
    assert!(text.contains("Genealogy · zoom 100%"));
    assert!(text.contains("Root Admin"));
    assert!(text.contains("Alice Moreau"));
    let total = fixture_tree().node_count();
    assert!(text.contains(&format!("3/{total} shown")), "{text}");
}

#[test]
fn clicking_the_control_expands_below_the_header() {
    let mut sim = started(DataSource::Fixture);
    let (x, y) = find(&sim, "[▸]").expect("collapsed control");
    assert!(y >= 1, "canvas starts below the header");
    click(&mut sim, x + 1, y);
    let text = sim.last_frame_text();
    assert!(text.contains("Mia Santos"), "{text}");
    assert!(!text.contains("Details"));
}

#[test]
fn search_prompt_narrows_the_tree() {
    let mut sim = started(DataSource::Fixture);
    press(&mut sim, KeyCode::Char('/'));
    for c in "zzz".chars() {
        press(&mut sim, KeyCode::Char(c));
    }
    let text = sim.last_frame_text();
    assert!(text.contains("/zzz"));
    assert!(!text.contains("Root Admin"));
    press(&mut sim, KeyCode::Enter);
    let text = sim.last_frame_text();
    assert!(text.contains("search \"zzz\""));
    assert!(text.contains("No members match the filter"));
}

#[test]
fn fullscreen_round_trip() {
    let mut sim = started(DataSource::Fixture);
    press(&mut sim, KeyCode::Char('f'));
    assert!(sim.is_fullscreen());
    assert!(sim.model().tree().viewport().is_fullscreen());
    assert!(sim.last_frame_text().contains("· fullscreen"));

    press(&mut sim, KeyCode::Escape);
    assert!(!sim.is_fullscreen());
    assert!(!sim.model().tree().viewport().is_fullscreen());
    assert!(
        sim.command_log()
            .contains(&CmdRecord::Fullscreen { enter: false, ok: true })
    );
}

#[test]
fn refused_fullscreen_keeps_the_flag_and_says_so() {
    let mut sim = started(DataSource::Fixture);
    sim.fail_fullscreen(Some(io::ErrorKind::Unsupported));
    press(&mut sim, KeyCode::Char('f'));
    assert!(!sim.model().tree().viewport().is_fullscreen());
    assert!(sim.model().tree().viewport().pending_fullscreen().is_none());
    assert!(
        sim.last_frame_text()
            .contains("Fullscreen unavailable: alternate screen unavailable")
    );
}

#[test]
fn failed_load_leaves_canvas_blank() {
    let sim = started(DataSource::File(PathBuf::from("/nonexistent/t.json")));
    assert!(matches!(sim.model().load_state(), LoadState::Failed(_)));
    let text = sim.last_frame_text();
    assert!(text.contains("Cannot read tree file"));
    assert!(text.contains("r retry"));
    assert!(!text.contains("Root Admin"));
}

#[test]
fn file_source_and_reload() {
    let path = std::env::temp_dir().join(format!("gtree-app-{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"{"data":{"id":40,"username":"filed","fullname":"File Person","right":{"id":41,"username":"r"}}}"#,
    )
    .expect("write fixture file");
    let mut sim = started(DataSource::File(path.clone()));
    assert_eq!(sim.model().root().map(|r| r.id), Some(40));
    assert!(sim.last_frame_text().contains("File Person"));

    press(&mut sim, KeyCode::Char('r'));
    let fetches = sim
        .command_log()
        .iter()
        .filter(|c| matches!(c, CmdRecord::Task(_)))
        .count();
    assert_eq!(fetches, 2);
    assert_eq!(sim.model().load_state(), &LoadState::Ready);
    let _ = std::fs::remove_file(path);
}

#[test]
fn quit_stops_the_program() {
    let mut sim = started(DataSource::Fixture);
    press(&mut sim, KeyCode::Char('q'));
    assert!(!sim.is_running());
}
