//! Pixel Font Module
//! Built-in 5x7 bitmap font so chart text needs no system font files.

use image::{Rgba, RgbaImage};

/// Glyph height in pixels.
pub const FONT_HEIGHT: u32 = 7;

/// Advance for characters without a glyph (plain spaces mostly).
const SPACE_WIDTH: u32 = 3;

#[derive(Clone, Copy)]
struct Glyph {
    width: u8,
    rows: [u8; FONT_HEIGHT as usize],
}

/// Draw `text` with its top-left corner at (x, y). Letters render uppercased;
/// pixels outside the image are clipped.
pub fn draw_text(img: &mut RgbaImage, text: &str, x: i32, y: i32, color: Rgba<u8>) {
    let mut cursor_x = x;
    for ch in text.chars() {
        if let Some(glyph) = lookup_glyph(ch) {
            for (row, pattern) in glyph.rows.iter().enumerate() {
                for col in 0..glyph.width {
                    if pattern & (1 << (glyph.width - 1 - col)) != 0 {
                        put_pixel(img, cursor_x + col as i32, y + row as i32, color);
                    }
                }
            }
            cursor_x += glyph.width as i32 + 1;
        } else {
            cursor_x += SPACE_WIDTH as i32 + 1;
        }
    }
}

/// Width in pixels `draw_text` will use for `text`.
pub fn measure_text(text: &str) -> u32 {
    let mut width = 0u32;
    for ch in text.chars() {
        match lookup_glyph(ch) {
            Some(glyph) => width += glyph.width as u32 + 1,
            None => width += SPACE_WIDTH + 1,
        }
    }
    width.saturating_sub(1)
}

fn put_pixel(img: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    if x < img.width() && y < img.height() {
        img.put_pixel(x, y, color);
    }
}

fn lookup_glyph(ch: char) -> Option<Glyph> {
    let upper = ch.to_ascii_uppercase();
    Some(match upper {
        'A' => Glyph {
            width: 5,
            rows: [
                0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001,
            ],
        },
        'B' => Glyph {
            width: 5,
            rows: [
                0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110,
            ],
        },
        'C' => Glyph {
            width: 5,
            rows: [
                0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110,
            ],
        },
        'D' => Glyph {
            width: 5,
            rows: [
                0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100,
            ],
        },
        'E' => Glyph {
            width: 5,
            rows: [
                0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111,
            ],
        },
        'F' => Glyph {
            width: 5,
            rows: [
                0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000,
            ],
        },
        'G' => Glyph {
            width: 5,
            rows: [
                0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111,
            ],
        },
        'H' => Glyph {
            width: 5,
            rows: [
                0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001,
            ],
        },
        'I' => Glyph {
            width: 3,
            rows: [0b111, 0b010, 0b010, 0b010, 0b010, 0b010, 0b111],
        },
        'J' => Glyph {
            width: 5,
            rows: [
                0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100,
            ],
        },
        'K' => Glyph {
            width: 5,
            rows: [
                0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001,
            ],
        },
        'L' => Glyph {
            width: 5,
            rows: [
                0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111,
            ],
        },
        'M' => Glyph {
            width: 5,
            rows: [
                0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001,
            ],
        },
        'N' => Glyph {
            width: 5,
            rows: [
                0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001,
            ],
        },
        'O' => Glyph {
            width: 5,
            rows: [
                0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110,
            ],
        },
        'P' => Glyph {
            width: 5,
            rows: [
                0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000,
            ],
        },
        'Q' => Glyph {
            width: 5,
            rows: [
                0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101,
            ],
        },
        'R' => Glyph {
            width: 5,
            rows: [
                0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001,
            ],
        },
        'S' => Glyph {
            width: 5,
            rows: [
                0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110,
            ],
        },
        'T' => Glyph {
            width: 5,
            rows: [
                0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100,
            ],
        },
        'U' => Glyph {
            width: 5,
            rows: [
                0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110,
            ],
        },
        'V' => Glyph {
            width: 5,
            rows: [
                0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100,
            ],
        },
        'W' => Glyph {
            width: 5,
            rows: [
                0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010,
            ],
        },
        'X' => Glyph {
            width: 5,
            rows: [
                0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001,
            ],
        },
        'Y' => Glyph {
            width: 5,
            rows: [
                0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100,
            ],
        },
        'Z' => Glyph {
            width: 5,
            rows: [
                0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111,
            ],
        },
        '0' => Glyph {
            width: 5,
            rows: [
                0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110,
            ],
        },
        '1' => Glyph {
            width: 3,
            rows: [0b010, 0b110, 0b010, 0b010, 0b010, 0b010, 0b111],
        },
        '2' => Glyph {
            width: 5,
            rows: [
                0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111,
            ],
        },
        '3' => Glyph {
            width: 5,
            rows: [
                0b11110, 0b00001, 0b00001, 0b00110, 0b00001, 0b00001, 0b11110,
            ],
        },
        '4' => Glyph {
            width: 5,
            rows: [
                0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010,
            ],
        },
        '5' => Glyph {
            width: 5,
            rows: [
                0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110,
            ],
        },
        '6' => Glyph {
            width: 5,
            rows: [
                0b01110, 0b10001, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110,
            ],
        },
        '7' => Glyph {
            width: 5,
            rows: [
                0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000,
            ],
        },
        '8' => Glyph {
            width: 5,
            rows: [
                0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110,
            ],
        },
        '9' => Glyph {
            width: 5,
            rows: [
                0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b10001, 0b01110,
            ],
        },
        '-' => Glyph {
            width: 3,
            rows: [0b000, 0b000, 0b000, 0b111, 0b000, 0b000, 0b000],
        },
        '+' => Glyph {
            width: 5,
            rows: [
                0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000,
            ],
        },
        '/' => Glyph {
            width: 3,
            rows: [0b001, 0b001, 0b010, 0b010, 0b100, 0b100, 0b100],
        },
        '%' => Glyph {
            width: 5,
            rows: [
                0b11000, 0b11001, 0b00010, 0b00100, 0b01000, 0b10011, 0b00011,
            ],
        },
        '(' => Glyph {
            width: 3,
            rows: [0b001, 0b010, 0b100, 0b100, 0b100, 0b010, 0b001],
        },
        ')' => Glyph {
            width: 3,
            rows: [0b100, 0b010, 0b001, 0b001, 0b001, 0b010, 0b100],
        },
        ':' => Glyph {
            width: 1,
            rows: [0b0, 0b1, 0b0, 0b0, 0b0, 0b1, 0b0],
        },
        '.' => Glyph {
            width: 1,
            rows: [0b0, 0b0, 0b0, 0b0, 0b0, 0b0, 0b1],
        },
        ',' => Glyph {
            width: 2,
            rows: [0b00, 0b00, 0b00, 0b00, 0b00, 0b01, 0b10],
        },
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageBuffer;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    #[test]
    fn test_measure_text() {
        assert_eq!(measure_text(""), 0);
        assert_eq!(measure_text("0"), 5);
        // two 5-wide glyphs plus one pixel of spacing
        assert_eq!(measure_text("00"), 11);
        // colon is 1 wide
        assert_eq!(measure_text("0:0"), 13);
    }

    #[test]
    fn test_lowercase_maps_to_uppercase() {
        let lower = lookup_glyph('a').unwrap();
        let upper = lookup_glyph('A').unwrap();
        assert_eq!(lower.rows, upper.rows);
        assert_eq!(lower.width, upper.width);
    }

    #[test]
    fn test_draw_text_sets_pixels() {
        let mut img: RgbaImage = ImageBuffer::from_pixel(20, 10, WHITE);
        draw_text(&mut img, "1", 2, 1, BLACK);
        let dark = img.pixels().filter(|p| **p == BLACK).count();
        assert!(dark > 0);
    }

    #[test]
    fn test_draw_text_clips_outside_image() {
        let mut img: RgbaImage = ImageBuffer::from_pixel(4, 4, WHITE);
        draw_text(&mut img, "88:88", -3, -3, BLACK);
        draw_text(&mut img, "88:88", 3, 3, BLACK);
        assert_eq!(img.width(), 4);
    }
}
