use ratatui::style::Color;
use term_color_support::ColorSupport;

/// Color capability of the attached terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    TrueColor,
    Indexed256,
    Basic,
}

impl Depth {
    /// Detect the stdout color support once at startup
    pub fn detect() -> Depth {
        let support = ColorSupport::stdout();
        if support.has_16m {
            Depth::TrueColor
        } else if support.has_256 {
            Depth::Indexed256
        } else {
            Depth::Basic
        }
    }
}

/// A palette entry: the exact RGB value and the closest ANSI 16 variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swatch {
    pub rgb: (u8, u8, u8),
    pub basic: Color,
}

pub const WHITE: Swatch = Swatch { rgb: (255, 255, 255), basic: Color::White };
pub const BLACK: Swatch = Swatch { rgb: (0, 0, 0), basic: Color::Black };
pub const BLUE: Swatch = Swatch { rgb: (100, 149, 237), basic: Color::Blue };
pub const RED: Swatch = Swatch { rgb: (255, 99, 71), basic: Color::Red };
pub const GREEN: Swatch = Swatch { rgb: (50, 205, 50), basic: Color::Green };
pub const YELLOW: Swatch = Swatch { rgb: (255, 215, 0), basic: Color::Yellow };

/// Amount added to each channel for the hover highlight
pub const HOVER_LIFT: u8 = 30;

impl Swatch {
    /// Brighten every channel, saturating at 255
    pub fn lighten(self, amount: u8) -> Swatch {
        let (r, g, b) = self.rgb;
        let basic = match self.basic {
            Color::Black => Color::DarkGray,
            Color::Red => Color::LightRed,
            Color::Green => Color::LightGreen,
            Color::Yellow => Color::LightYellow,
            Color::Blue => Color::LightBlue,
            Color::Magenta => Color::LightMagenta,
            Color::Cyan => Color::LightCyan,
            Color::Gray => Color::White,
            c => c,
        };
        Swatch {
            rgb: (r.saturating_add(amount), g.saturating_add(amount), b.saturating_add(amount)),
            basic,
        }
    }

    /// Resolve to a ratatui color for the given terminal depth
    pub fn resolve(self, depth: Depth) -> Color {
        let (r, g, b) = self.rgb;
        match depth {
            // 1. TrueColor support: exact RGB value
            Depth::TrueColor => Color::Rgb(r, g, b),
            // 2. 256-color support (e.g., macOS Terminal): nearest cube index
            Depth::Indexed256 => Color::Indexed(ansi256(r, g, b)),
            // 3. Basic 16-color support: the ANSI variant
            Depth::Basic => self.basic,
        }
    }
}

/// Map an RGB value to the 6x6x6 color cube (indices 16-231)
fn ansi256(r: u8, g: u8, b: u8) -> u8 {
    let level = |c: u8| -> u8 {
        // cube levels are 0, 95, 135, 175, 215, 255
        if c < 48 {
            0
        } else if c < 115 {
            1
        } else {
            (c - 35) / 40
        }
    };
    16 + 36 * level(r) + 6 * level(g) + level(b)
}
