#![forbid(unsafe_code)]

//! Colors and styles shared by the tree widgets.

use gtree_render::cell::PackedRgba;
use gtree_render::style::Style;

pub const ACCENT: PackedRgba = PackedRgba::rgb(94, 129, 244);
pub const MUTED: PackedRgba = PackedRgba::rgb(140, 146, 160);
pub const TEXT: PackedRgba = PackedRgba::rgb(230, 232, 238);
pub const CONNECTOR: PackedRgba = PackedRgba::rgb(110, 116, 132);
pub const PANEL_BG: PackedRgba = PackedRgba::rgb(30, 33, 42);
pub const CHIP_BG: PackedRgba = PackedRgba::rgb(52, 60, 88);

/// Card border.
pub fn card_border() -> Style {
    Style::new().fg(MUTED)
}

/// Border of the focused card.
pub fn card_border_focused() -> Style {
    Style::new().fg(ACCENT).bold()
}

/// Initials avatar.
pub fn avatar() -> Style {
    Style::new().fg(ACCENT).bold()
}

pub fn title() -> Style {
    Style::new().fg(TEXT).bold()
}

pub fn subtle() -> Style {
    Style::new().fg(MUTED)
}

/// Expand/collapse control.
pub fn toggle() -> Style {
    Style::new().fg(ACCENT).bold()
}

pub fn connector() -> Style {
    Style::new().fg(CONNECTOR)
}

/// One-line chip at the smallest zoom levels.
pub fn chip(focused: bool) -> Style {
    let base = Style::new().fg(TEXT).bg(CHIP_BG);
    if focused { base.reverse() } else { base }
}

/// Detail popover body.
pub fn popover() -> Style {
    Style::new().fg(TEXT).bg(PANEL_BG)
}

pub fn popover_label() -> Style {
    Style::new().fg(MUTED).bg(PANEL_BG)
}

pub fn popover_border() -> Style {
    Style::new().fg(ACCENT).bg(PANEL_BG)
}
