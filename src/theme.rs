use ratatui::style::Color;

/// Accent colours offered by the colour picker: eleven soft tones and black.
pub const PALETTE: [(&str, &str); 12] = [
    ("Soft Orange",  "#F59E42"),
    ("Soft Purple",  "#9B87F5"),
    ("Sky Blue",     "#6BA4F6"),
    ("Mint Green",   "#52C9A8"),
    ("Coral Red",    "#F87171"),
    ("Rose Pink",    "#F3A6C3"),
    ("Turquoise",    "#7DD3C0"),
    ("Lavender",     "#A5B4FC"),
    ("Light Cyan",   "#67E8F9"),
    ("Warm Taupe",   "#B4A08A"),
    ("Cool Gray",    "#94A3B8"),
    ("Black",        "#000000"),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Accent(usize);

impl Accent {
    /// Looks up a palette entry by hex code (case-insensitive, `#` optional)
    /// or by name.
    pub fn find(s: &str) -> Option<Self> {
        let s = s.trim();
        let hex = s.trim_start_matches('#');
        PALETTE.iter().position(|(name, code)| {
            code[1..].eq_ignore_ascii_case(hex) || name.eq_ignore_ascii_case(s)
        }).map(Accent)
    }

    pub fn next(self) -> Self {
        Accent((self.0 + 1) % PALETTE.len())
    }

    pub fn name(self) -> &'static str { PALETTE[self.0].0 }

    pub fn hex(self) -> &'static str { PALETTE[self.0].1 }

    pub fn color(self) -> Color {
        self.hex().parse().unwrap_or(Color::Reset)
    }

    /// Text colour readable on top of the accent.
    pub fn contrast(self) -> Color {
        match self.color() {
            Color::Rgb(r, g, b) if (r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000 > 128 => Color::Black,
            _ => Color::White,
        }
    }
}

impl Default for Accent {
    fn default() -> Self { Accent(0) }
}
