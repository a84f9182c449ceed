#![forbid(unsafe_code)]

//! Grid cells and colors.
//!
//! Wide characters take their first column as a normal [`Cell`] and mark
//! the rest with [`Cell::CONTINUATION`], which the presenter never prints.

/// `0xRRGGBBAA`. Zero alpha means "use the terminal's own color".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct PackedRgba(pub u32);

impl PackedRgba {
    pub const TRANSPARENT: Self = Self(0);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, u8::MAX)
    }

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(u32::from_be_bytes([r, g, b, a]))
    }

    #[inline]
    pub const fn r(self) -> u8 {
        self.0.to_be_bytes()[0]
    }

    #[inline]
    pub const fn g(self) -> u8 {
        self.0.to_be_bytes()[1]
    }

    #[inline]
    pub const fn b(self) -> u8 {
        self.0.to_be_bytes()[2]
    }

    #[inline]
    pub const fn a(self) -> u8 {
        self.0.to_be_bytes()[3]
    }

    #[inline]
    pub const fn is_transparent(self) -> bool {
        self.a() == 0
    }
}

bitflags::bitflags! {
    /// Text attributes a cell can carry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u8 {
        const BOLD      = 1;
        const DIM       = 1 << 1;
        const ITALIC    = 1 << 2;
        const UNDERLINE = 1 << 3;
        /// Swap foreground and background.
        const REVERSE   = 1 << 5;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// `'\0'` in continuation cells.
    pub ch: char,
    pub fg: PackedRgba,
    pub bg: PackedRgba,
    pub attrs: StyleFlags,
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Cell {
    /// A space in terminal default colors.
    pub const EMPTY: Self = Self::from_char(' ');

    /// Trailing column of a wide character.
    pub const CONTINUATION: Self = Self::from_char('\0');

    #[inline]
    pub const fn from_char(ch: char) -> Self {
        Self {
            ch,
            fg: PackedRgba::TRANSPARENT,
            bg: PackedRgba::TRANSPARENT,
            attrs: StyleFlags::empty(),
        }
    }

    /// Same colors and attributes, different character.
    #[inline]
    #[must_use]
    pub const fn with_char(mut self, ch: char) -> Self {
        self.ch = ch;
        self
    }

    #[inline]
    #[must_use]
    pub const fn with_fg(mut self, fg: PackedRgba) -> Self {
        self.fg = fg;
        self
    }

    #[inline]
    #[must_use]
    pub const fn with_bg(mut self, bg: PackedRgba) -> Self {
        self.bg = bg;
        self
    }

    #[inline]
    #[must_use]
    pub const fn with_attrs(mut self, attrs: StyleFlags) -> Self {
        self.attrs = attrs;
        self
    }

    #[inline]
    pub const fn is_continuation(&self) -> bool {
        self.ch == '\0'
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_unpack_in_order() {
        let c = PackedRgba::rgba(1, 2, 3, 4);
        assert_eq!(c.0, 0x0102_0304);
        assert_eq!((c.r(), c.g(), c.b(), c.a()), (1, 2, 3, 4));
        assert!(PackedRgba::TRANSPARENT.is_transparent());
        assert!(!PackedRgba::BLACK.is_transparent());
    }

    #[test]
    fn builders_and_continuation() {
        let cell = Cell::from_char('x')
            .with_fg(PackedRgba::WHITE)
            .with_attrs(StyleFlags::BOLD);
        assert_eq!(cell.ch, 'x');
        assert_eq!(cell.fg, PackedRgba::WHITE);
        assert!(cell.attrs.contains(StyleFlags::BOLD));
        assert!(!cell.is_continuation());
        assert!(Cell::CONTINUATION.is_continuation());
        assert_eq!(Cell::default(), Cell::from_char(' '));
    }
}
