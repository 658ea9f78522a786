use crossterm::style::{Color, Stylize};

// Terminal palette. Prefer adding new roles here instead of sprinkling colors through the renderers.
pub const HEADER: Color = Color::Rgb {
    r: 229,
    g: 231,
    b: 235,
};
pub const MUTED: Color = Color::Rgb {
    r: 156,
    g: 163,
    b: 175,
};
pub const DIM: Color = Color::Rgb {
    r: 107,
    g: 114,
    b: 128,
};
pub const ACCENT: Color = Color::Rgb {
    r: 255,
    g: 159,
    b: 26,
};
pub const CODE_SPAN: Color = Color::Rgb {
    r: 250,
    g: 204,
    b: 21,
};

// Semantic colors (keep minimal).
pub const ADDED: Color = Color::Rgb {
    r: 134,
    g: 239,
    b: 172,
};
pub const REMOVED: Color = Color::Rgb {
    r: 248,
    g: 113,
    b: 113,
};
pub const ERROR: Color = REMOVED;

/// Rotates per thinking block.
pub const THINKING_PALETTE: [Color; 5] = [
    Color::Rgb {
        r: 125,
        g: 211,
        b: 252,
    },
    Color::Rgb {
        r: 196,
        g: 181,
        b: 253,
    },
    Color::Rgb {
        r: 134,
        g: 239,
        b: 172,
    },
    Color::Rgb {
        r: 253,
        g: 186,
        b: 116,
    },
    Color::Rgb {
        r: 249,
        g: 168,
        b: 212,
    },
];

pub fn thinking_color(index: usize) -> Color {
    THINKING_PALETTE[index % THINKING_PALETTE.len()]
}

/// Applies colors only when the output supports them.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Painter {
    enabled: bool,
}

impl Painter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn paint(&self, text: &str, color: Color) -> String {
        if self.enabled {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn bold(&self, text: &str, color: Color) -> String {
        if self.enabled {
            text.with(color).bold().to_string()
        } else {
            text.to_string()
        }
    }
}
