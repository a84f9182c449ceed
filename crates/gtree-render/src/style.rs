#![forbid(unsafe_code)]

//! Optional style overlays applied on top of existing cells.

use crate::cell::{Cell, PackedRgba, StyleFlags};

/// A partial style: unset fields leave the underlying cell untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: Option<PackedRgba>,
    pub bg: Option<PackedRgba>,
    pub attrs: Option<StyleFlags>,
}

impl Style {
    /// Empty style.
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            attrs: None,
        }
    }

    /// Set the foreground color.
    #[must_use]
    pub const fn fg(mut self, color: PackedRgba) -> Self {
        self.fg = Some(color);
        self
    }

    /// Set the background color.
    #[must_use]
    pub const fn bg(mut self, color: PackedRgba) -> Self {
        self.bg = Some(color);
        self
    }

    /// Add bold.
    #[must_use]
    pub const fn bold(self) -> Self {
        self.add_attrs(StyleFlags::BOLD)
    }

    /// Add dim.
    #[must_use]
    pub const fn dim(self) -> Self {
        self.add_attrs(StyleFlags::DIM)
    }

    /// Add reverse video.
    #[must_use]
    pub const fn reverse(self) -> Self {
        self.add_attrs(StyleFlags::REVERSE)
    }

    const fn add_attrs(mut self, flags: StyleFlags) -> Self {
        self.attrs = match self.attrs {
            Some(existing) => Some(existing.union(flags)),
            None => Some(flags),
        };
        self
    }

    /// Overlay `other` on top of `self`; fields set in `other` win.
    #[must_use]
    pub fn patch(self, other: Style) -> Style {
        Style {
            fg: other.fg.or(self.fg),
            bg: other.bg.or(self.bg),
            attrs: match (self.attrs, other.attrs) {
                (Some(a), Some(b)) => Some(a | b),
                (a, b) => b.or(a),
            },
        }
    }

    /// Apply this style to a cell.
    pub fn apply(&self, cell: &mut Cell) {
        if let Some(fg) = self.fg {
            cell.fg = fg;
        }
        if let Some(bg) = self.bg {
            cell.bg = bg;
        }
        if let Some(attrs) = self.attrs {
            cell.attrs |= attrs;
        }
    }

    /// Build a cell with this style from a character.
    pub fn cell(&self, ch: char) -> Cell {
        let mut cell = Cell::from_char(ch);
        self.apply(&mut cell);
        cell
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_prefers_other() {
        let base = Style::new().fg(PackedRgba::WHITE).bold();
        let over = Style::new().fg(PackedRgba::BLACK).dim();
        let merged = base.patch(over);
        assert_eq!(merged.fg, Some(PackedRgba::BLACK));
        assert_eq!(merged.attrs, Some(StyleFlags::BOLD | StyleFlags::DIM));
    }

    #[test]
    fn apply_leaves_unset_fields() {
        let mut cell = Cell::from_char('a').with_bg(PackedRgba::BLACK);
        Style::new().fg(PackedRgba::WHITE).apply(&mut cell);
        assert_eq!(cell.fg, PackedRgba::WHITE);
        assert_eq!(cell.bg, PackedRgba::BLACK);
    }
}
