//! Colors attached to words, spans and environment elements.

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha (255 = opaque).
    pub a: u8,
}

const NAMED_COLORS: &[(&str, (u8, u8, u8))] = &[
    ("black", (0x00, 0x00, 0x00)),
    ("white", (0xFF, 0xFF, 0xFF)),
    ("gray", (0x80, 0x80, 0x80)),
    ("darkgray", (0xA9, 0xA9, 0xA9)),
    ("silver", (0xC0, 0xC0, 0xC0)),
    ("red", (0xFF, 0x00, 0x00)),
    ("darkred", (0x8B, 0x00, 0x00)),
    ("maroon", (0x80, 0x00, 0x00)),
    ("green", (0x00, 0x80, 0x00)),
    ("darkgreen", (0x00, 0x64, 0x00)),
    ("olive", (0x80, 0x80, 0x00)),
    ("blue", (0x00, 0x00, 0xFF)),
    ("darkblue", (0x00, 0x00, 0x8B)),
    ("navy", (0x00, 0x00, 0x80)),
    ("midnightblue", (0x19, 0x19, 0x70)),
    ("teal", (0x00, 0x80, 0x80)),
    ("darkcyan", (0x00, 0x8B, 0x8B)),
    ("cyan", (0x00, 0xFF, 0xFF)),
    ("purple", (0x80, 0x00, 0x80)),
    ("magenta", (0xFF, 0x00, 0xFF)),
    ("darkmagenta", (0x8B, 0x00, 0x8B)),
    ("yellow", (0xFF, 0xFF, 0x00)),
    ("orange", (0xFF, 0xA5, 0x00)),
    ("brown", (0xA5, 0x2A, 0x2A)),
    ("sienna", (0xA0, 0x52, 0x2D)),
];

impl Color {
    /// Opaque black.
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);

    /// An opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    /// Parse `#RRGGBB`, `#AARRGGBB` or a named color (case-insensitive).
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(hex) = text.strip_prefix('#') {
            let value = u32::from_str_radix(hex, 16).ok()?;
            return match hex.len() {
                6 => Some(Self::rgb(
                    (value >> 16) as u8,
                    (value >> 8) as u8,
                    value as u8,
                )),
                8 => Some(Self {
                    a: (value >> 24) as u8,
                    r: (value >> 16) as u8,
                    g: (value >> 8) as u8,
                    b: value as u8,
                }),
                _ => None,
            };
        }
        let lower = text.to_ascii_lowercase();
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, (r, g, b))| Self::rgb(*r, *g, *b))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Foreground/background color plus font style of a highlighted element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HighlightColor {
    /// Foreground color.
    pub color: Color,
    /// Background color, if any.
    pub background: Option<Color>,
    /// Bold font.
    pub bold: bool,
    /// Italic font.
    pub italic: bool,
}

impl HighlightColor {
    /// Plain foreground color.
    pub const fn new(color: Color) -> Self {
        Self {
            color,
            background: None,
            bold: false,
            italic: false,
        }
    }

    /// Same color, bold.
    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Same color, italic.
    pub const fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Same color with a background.
    pub const fn with_background(mut self, background: Color) -> Self {
        self.background = Some(background);
        self
    }
}
