//! Card rasterization
//!
//! A [`Rasterizer`] turns one board card into a bitmap of fixed width. The
//! built-in [`BlockRasterizer`] draws a schematic card: a coloured header
//! band, text rows as bars, inline images decoded from `data:` URIs, and a
//! verdict badge for moderation reports.

use crate::card::{Card, CardBody};
use crate::data_uri::parse_data_uri;
use crate::types::AssetType;
use crea_core::{CreaError, Result};
use image::imageops::FilterType;
use image::{Rgba, RgbaImage};

/// Renders a card to an RGBA bitmap
pub trait Rasterizer {
    fn rasterize(&self, card: &Card) -> Result<RgbaImage>;
}

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BORDER: Rgba<u8> = Rgba([226, 232, 240, 255]);
const TEXT_BAR: Rgba<u8> = Rgba([71, 85, 105, 255]);
const MUTED_BAR: Rgba<u8> = Rgba([148, 163, 184, 255]);
const PLACEHOLDER: Rgba<u8> = Rgba([203, 213, 225, 255]);
const SENSITIVE: Rgba<u8> = Rgba([220, 38, 38, 255]);
const OKAY: Rgba<u8> = Rgba([22, 163, 74, 255]);

// Layout units, multiplied by the scale factor
const PADDING: u32 = 16;
const HEADER: u32 = 40;
const LINE_PITCH: u32 = 20;
const LINE_THICKNESS: u32 = 10;
const GLYPH_WIDTH: u32 = 8;
const BADGE_HEIGHT: u32 = 24;

/// Schematic card renderer backed by the `image` crate
#[derive(Debug, Clone)]
pub struct BlockRasterizer {
    card_width: u32,
    scale: u32,
}

impl Default for BlockRasterizer {
    fn default() -> Self {
        Self::new(800, 2)
    }
}

impl BlockRasterizer {
    pub fn new(card_width: u32, scale: u32) -> Self {
        Self {
            card_width: card_width.max(GLYPH_WIDTH * 8 + PADDING * 2),
            scale: scale.max(1),
        }
    }

    /// Output bitmap width in pixels
    pub fn pixel_width(&self) -> u32 {
        self.card_width * self.scale
    }

    fn px(&self, units: u32) -> u32 {
        units * self.scale
    }

    fn chars_per_line(&self) -> usize {
        ((self.card_width - PADDING * 2) / GLYPH_WIDTH) as usize
    }

    fn content_width(&self) -> u32 {
        self.pixel_width() - self.px(PADDING) * 2
    }

    fn text_height(&self, lines: usize) -> u32 {
        self.px(LINE_PITCH) * lines as u32
    }

    fn draw_text(&self, img: &mut RgbaImage, text: &str, top: u32, color: Rgba<u8>) -> u32 {
        let lines = wrap(text, self.chars_per_line());
        let left = self.px(PADDING);
        for (i, line) in lines.iter().enumerate() {
            let y = top + self.px(LINE_PITCH) * i as u32;
            let width = self.px(GLYPH_WIDTH) * line.chars().count() as u32;
            fill_rect(img, left, y, width, self.px(LINE_THICKNESS), color);
        }
        self.text_height(lines.len())
    }

    fn render_image(&self, source: &str) -> Result<RgbaImage> {
        let side = self.content_width();
        match parse_data_uri(source).map_err(CreaError::RasterError)? {
            Some(data) => {
                let decoded = image::load_from_memory(&data.bytes).map_err(|e| {
                    CreaError::RasterError(format!("Failed to decode {} image: {}", data.mime_type, e))
                })?;
                Ok(decoded.resize_to_fill(side, side, FilterType::Triangle).to_rgba8())
            }
            None => {
                // Remote references are not fetched; draw a framed placeholder.
                let mut placeholder = RgbaImage::from_pixel(side, side, PLACEHOLDER);
                let inset = side / 4;
                fill_rect(&mut placeholder, inset, inset, side - inset * 2, side - inset * 2, BORDER);
                Ok(placeholder)
            }
        }
    }
}

impl Rasterizer for BlockRasterizer {
    fn rasterize(&self, card: &Card) -> Result<RgbaImage> {
        let width = self.pixel_width();
        let pad = self.px(PADDING);
        let header = self.px(HEADER);

        // Body is measured first so the canvas can be allocated once.
        let (body_height, picture) = match &card.body {
            CardBody::Text { text } => (self.text_height(wrap(text, self.chars_per_line()).len()), None),
            CardBody::Image { source } => {
                let picture = self.render_image(source)?;
                (picture.height(), Some(picture))
            }
            CardBody::Verdict { reason, text, .. } => {
                let reason_lines = wrap(reason, self.chars_per_line()).len();
                let text_lines = wrap(text, self.chars_per_line()).len();
                (
                    self.px(BADGE_HEIGHT) + pad + self.text_height(reason_lines + text_lines) + pad,
                    None,
                )
            }
        };

        let height = header + pad + body_height + pad;
        let mut img = RgbaImage::from_pixel(width, height, BACKGROUND);

        fill_rect(&mut img, 0, 0, width, header, type_color(card.asset_type));
        let title_width = self.px(GLYPH_WIDTH) * card.title.chars().count() as u32;
        fill_rect(&mut img, pad, header / 3, title_width, header / 3, BACKGROUND);

        let top = header + pad;
        match &card.body {
            CardBody::Text { text } => {
                self.draw_text(&mut img, text, top, TEXT_BAR);
            }
            CardBody::Image { .. } => {
                if let Some(picture) = &picture {
                    image::imageops::overlay(&mut img, picture, pad as i64, top as i64);
                }
            }
            CardBody::Verdict {
                sensitive,
                reason,
                text,
            } => {
                let badge = if *sensitive { SENSITIVE } else { OKAY };
                let badge_width = self.px(GLYPH_WIDTH) * if *sensitive { 9 } else { 4 } + pad;
                fill_rect(&mut img, pad, top, badge_width, self.px(BADGE_HEIGHT), badge);
                let mut y = top + self.px(BADGE_HEIGHT) + pad;
                y += self.draw_text(&mut img, reason, y, TEXT_BAR);
                y += pad;
                self.draw_text(&mut img, text, y, MUTED_BAR);
            }
        }

        draw_border(&mut img, BORDER);
        Ok(img)
    }
}

fn type_color(asset_type: AssetType) -> Rgba<u8> {
    match asset_type {
        AssetType::Copy => Rgba([37, 99, 235, 255]),
        AssetType::Visual => Rgba([147, 51, 234, 255]),
        AssetType::BrandVoice => Rgba([234, 88, 12, 255]),
        AssetType::Moderation => Rgba([13, 148, 136, 255]),
    }
}

/// Greedy word wrap by character count; always yields at least one line
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let mut word = word.to_string();
            while word.chars().count() > width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let head: String = word.chars().take(width).collect();
                word = word.chars().skip(width).collect();
                lines.push(head);
            }
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&word);
        }
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn fill_rect(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
    let x_end = x.saturating_add(w).min(img.width());
    let y_end = y.saturating_add(h).min(img.height());
    for py in y.min(y_end)..y_end {
        for px in x.min(x_end)..x_end {
            img.put_pixel(px, py, color);
        }
    }
}

fn draw_border(img: &mut RgbaImage, color: Rgba<u8>) {
    let (w, h) = img.dimensions();
    fill_rect(img, 0, 0, w, 1, color);
    fill_rect(img, 0, h.saturating_sub(1), w, 1, color);
    fill_rect(img, 0, 0, 1, h, color);
    fill_rect(img, w.saturating_sub(1), 0, 1, h, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_uri::encode_data_uri;
    use crea_core::AssetId;

    fn card(asset_type: AssetType, body: CardBody) -> Card {
        Card {
            asset_id: AssetId::new(),
            asset_type,
            title: asset_type.label().to_string(),
            age: "less than a minute ago".to_string(),
            body,
        }
    }

    fn png_data_uri(w: u32, h: u32) -> String {
        let img = RgbaImage::from_pixel(w, h, Rgba([200, 100, 50, 255]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
        encode_data_uri("image/png", bytes.get_ref())
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap("", 10), vec![""]);
        assert_eq!(wrap("a\nb", 10), vec!["a", "b"]);
    }

    #[test]
    fn test_fixed_width_and_growing_height() {
        let r = BlockRasterizer::new(400, 1);
        let short = r
            .rasterize(&card(AssetType::Copy, CardBody::Text { text: "Hi".into() }))
            .unwrap();
        let long = r
            .rasterize(&card(
                AssetType::Copy,
                CardBody::Text {
                    text: "word ".repeat(200),
                },
            ))
            .unwrap();
        assert_eq!(short.width(), 400);
        assert_eq!(long.width(), 400);
        assert!(long.height() > short.height());
    }

    #[test]
    fn test_header_uses_type_color() {
        let r = BlockRasterizer::new(400, 1);
        let img = r
            .rasterize(&card(AssetType::BrandVoice, CardBody::Text { text: "x".into() }))
            .unwrap();
        assert_eq!(*img.get_pixel(200, 2), type_color(AssetType::BrandVoice));
    }

    #[test]
    fn test_visual_decodes_data_uri() {
        let r = BlockRasterizer::new(200, 1);
        let img = r
            .rasterize(&card(
                AssetType::Visual,
                CardBody::Image {
                    source: png_data_uri(32, 16),
                },
            ))
            .unwrap();
        let side = 200 - PADDING * 2;
        assert_eq!(img.height(), HEADER + PADDING + side + PADDING);
        let center = img.get_pixel(PADDING + side / 2, HEADER + PADDING + side / 2);
        let expected = [200u8, 100, 50];
        for (got, want) in center.0.iter().zip(expected.iter()) {
            assert!((*got as i32 - *want as i32).abs() <= 2);
        }
    }

    #[test]
    fn test_remote_visual_uses_placeholder() {
        let r = BlockRasterizer::new(200, 1);
        let img = r.rasterize(&card(
            AssetType::Visual,
            CardBody::Image {
                source: "https://cdn.example.com/mockup.png".into(),
            },
        ));
        assert!(img.is_ok());
    }

    #[test]
    fn test_corrupt_image_is_raster_error() {
        let r = BlockRasterizer::new(200, 1);
        let err = r
            .rasterize(&card(
                AssetType::Visual,
                CardBody::Image {
                    source: encode_data_uri("image/png", b"definitely not a png"),
                },
            ))
            .unwrap_err();
        assert!(matches!(err, CreaError::RasterError(_)));
    }

    #[test]
    fn test_verdict_badge_color() {
        let r = BlockRasterizer::new(300, 1);
        let img = r
            .rasterize(&card(
                AssetType::Moderation,
                CardBody::Verdict {
                    sensitive: true,
                    reason: "Uses a stereotype".into(),
                    text: "Some text".into(),
                },
            ))
            .unwrap();
        assert_eq!(*img.get_pixel(PADDING + 2, HEADER + PADDING + 2), SENSITIVE);
    }
}
