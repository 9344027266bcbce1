use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 129, g: 199, b: 132 };
pub const ACCENT: Color = Color::TrueColor { r: 255, g: 213, b: 79 };
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::TrueColor { r: 220, g: 220, b: 220 };
pub const IPV4_ADDR: Color = Color::TrueColor { r: 100, g: 181, b: 246 };
pub const LABEL: Color = Color::TrueColor { r: 186, g: 104, b: 200 };
pub const CREATED: Color = Color::Green;
pub const UPDATED: Color = Color::Cyan;
pub const SKIPPED: Color = Color::Yellow;
pub const FAILED: Color = Color::Red;
