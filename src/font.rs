//! Built-in bitmap fonts installed into memory at boot.

/// Address of the low-resolution font's first glyph ('0').
pub const LOW_RES_ADDRESS: u16 = 0x000;
/// Bytes per low-resolution glyph.
pub const LOW_RES_STEP: u16 = 5;
/// Address of the high-resolution font's first glyph ('0').
pub const HIGH_RES_ADDRESS: u16 = 0x050;
/// Bytes per high-resolution glyph.
pub const HIGH_RES_STEP: u16 = 10;
/// Number of glyphs in each font (hex digits 0..F).
pub const GLYPH_COUNT: usize = 16;

/// Sixteen 5-byte low-resolution glyphs, hex digits 0 through F.
///
/// Each byte uses only its high nibble; low-resolution sprites are 4
/// pixels wide.
pub const LOW_RES_FONT: [u8; LOW_RES_STEP as usize * GLYPH_COUNT] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Sixteen 10-byte high-resolution glyphs, hex digits 0 through F.
pub const HIGH_RES_FONT: [u8; HIGH_RES_STEP as usize * GLYPH_COUNT] = [
    0x3C, 0x7E, 0xE7, 0xC3, 0xC3, 0xC3, 0xC3, 0xE7, 0x7E, 0x3C, // 0
    0x18, 0x38, 0x58, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x3C, // 1
    0x3E, 0x7F, 0xC3, 0x06, 0x0C, 0x18, 0x30, 0x60, 0xFF, 0xFF, // 2
    0x3C, 0x7E, 0xC3, 0x03, 0x0E, 0x0E, 0x03, 0xC3, 0x7E, 0x3C, // 3
    0x06, 0x0E, 0x1E, 0x36, 0x66, 0xC6, 0xFF, 0xFF, 0x06, 0x06, // 4
    0xFF, 0xFF, 0xC0, 0xC0, 0xFC, 0xFE, 0x03, 0xC3, 0x7E, 0x3C, // 5
    0x3E, 0x7C, 0xC0, 0xC0, 0xFC, 0xFE, 0xC3, 0xC3, 0x7E, 0x3C, // 6
    0xFF, 0xFF, 0x03, 0x06, 0x0C, 0x18, 0x30, 0x60, 0x60, 0x60, // 7
    0x3C, 0x7E, 0xC3, 0xC3, 0x7E, 0x7E, 0xC3, 0xC3, 0x7E, 0x3C, // 8
    0x3C, 0x7E, 0xC3, 0xC3, 0x7F, 0x3F, 0x03, 0x03, 0x3E, 0x7C, // 9
    0x3C, 0x66, 0xC3, 0xC3, 0xFF, 0xFF, 0xC3, 0xC3, 0xC3, 0xC3, // A
    0xFC, 0xC6, 0xC3, 0xC6, 0xFC, 0xFC, 0xC6, 0xC3, 0xC6, 0xFC, // B
    0x3C, 0x66, 0xC3, 0xC0, 0xC0, 0xC0, 0xC0, 0xC3, 0x66, 0x3C, // C
    0xFC, 0xC6, 0xC3, 0xC3, 0xC3, 0xC3, 0xC3, 0xC3, 0xC6, 0xFC, // D
    0xFF, 0xFF, 0xC0, 0xC0, 0xFC, 0xFC, 0xC0, 0xC0, 0xFF, 0xFF, // E
    0xFF, 0xFF, 0xC0, 0xC0, 0xFC, 0xFC, 0xC0, 0xC0, 0xC0, 0xC0, // F
];

/// Address of the low-resolution glyph for `digit` (only the low nibble is used).
pub fn low_res_glyph_address(digit: u8) -> u16 {
    LOW_RES_ADDRESS + LOW_RES_STEP * (digit & 0xF) as u16
}

/// Address of the high-resolution glyph for `digit` (only the low nibble is used).
pub fn high_res_glyph_address(digit: u8) -> u16 {
    HIGH_RES_ADDRESS + HIGH_RES_STEP * (digit & 0xF) as u16
}
