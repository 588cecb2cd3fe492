//! Page layout for board export
//!
//! Cards flow top to bottom at full printable width. A card that would run
//! past the bottom margin starts a new page, unless it is the first card on
//! the page, in which case it is placed anyway.

use serde::{Deserialize, Serialize};

/// Physical page geometry in millimetres
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSetup {
    #[serde(default = "default_page_width")]
    pub width_mm: f64,
    #[serde(default = "default_page_height")]
    pub height_mm: f64,
    #[serde(default = "default_margin")]
    pub margin_mm: f64,
    #[serde(default = "default_gap")]
    pub gap_mm: f64,
}

fn default_page_width() -> f64 {
    210.0
}
fn default_page_height() -> f64 {
    297.0
}
fn default_margin() -> f64 {
    10.0
}
fn default_gap() -> f64 {
    5.0
}

impl Default for PageSetup {
    fn default() -> Self {
        Self::a4()
    }
}

impl PageSetup {
    /// A4 portrait with a 10 mm margin and 5 mm between cards
    pub fn a4() -> Self {
        Self {
            width_mm: default_page_width(),
            height_mm: default_page_height(),
            margin_mm: default_margin(),
            gap_mm: default_gap(),
        }
    }

    pub fn printable_width(&self) -> f64 {
        self.width_mm - self.margin_mm * 2.0
    }

    pub fn bottom_limit(&self) -> f64 {
        self.height_mm - self.margin_mm
    }
}

/// Where one card image lands, in millimetres from the page's top-left corner
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub card: usize,
    pub page: usize,
    pub x_mm: f64,
    pub y_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
}

/// Incremental layout state, fed one rasterized card at a time
#[derive(Debug, Clone)]
pub struct PageCursor {
    setup: PageSetup,
    page: usize,
    y_mm: f64,
    placed: usize,
}

impl PageCursor {
    pub fn new(setup: PageSetup) -> Self {
        let y_mm = setup.margin_mm;
        Self {
            setup,
            page: 0,
            y_mm,
            placed: 0,
        }
    }

    /// Place a card image of the given pixel size.
    ///
    /// Returns the placement and whether it opened a new page.
    pub fn place(&mut self, width_px: u32, height_px: u32) -> (Placement, bool) {
        let width_mm = self.setup.printable_width();
        let height_mm = if width_px == 0 {
            0.0
        } else {
            height_px as f64 * width_mm / width_px as f64
        };

        let mut new_page = false;
        if self.y_mm + height_mm > self.setup.bottom_limit() && self.y_mm > self.setup.margin_mm {
            self.page += 1;
            self.y_mm = self.setup.margin_mm;
            new_page = true;
        }

        let placement = Placement {
            card: self.placed,
            page: self.page,
            x_mm: self.setup.margin_mm,
            y_mm: self.y_mm,
            width_mm,
            height_mm,
        };

        self.y_mm += height_mm + self.setup.gap_mm;
        self.placed += 1;
        (placement, new_page)
    }

    pub fn page_count(&self) -> usize {
        if self.placed == 0 {
            0
        } else {
            self.page + 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn place_all(sizes: &[(u32, u32)]) -> (Vec<Placement>, PageCursor) {
        let mut cursor = PageCursor::new(PageSetup::a4());
        let placements = sizes.iter().map(|&(w, h)| cursor.place(w, h).0).collect();
        (placements, cursor)
    }

    #[test]
    fn test_empty_board_has_no_pages() {
        let cursor = PageCursor::new(PageSetup::a4());
        assert_eq!(cursor.page_count(), 0);
    }

    #[test]
    fn test_scales_to_printable_width() {
        let (placements, _) = place_all(&[(1600, 800)]);
        let p = &placements[0];
        assert!(approx(p.width_mm, 190.0));
        assert!(approx(p.height_mm, 95.0));
        assert!(approx(p.x_mm, 10.0));
        assert!(approx(p.y_mm, 10.0));
    }

    #[test]
    fn test_gap_between_cards() {
        let (placements, cursor) = place_all(&[(190, 50), (190, 50)]);
        assert_eq!(cursor.page_count(), 1);
        assert!(approx(placements[1].y_mm, 10.0 + 50.0 + 5.0));
    }

    #[test]
    fn test_overflow_starts_new_page() {
        // 100 mm tall cards: 10 + 100 + 5 + 100 = 215, third would end at 320 > 287
        let mut cursor = PageCursor::new(PageSetup::a4());
        let (_, first_new) = cursor.place(190, 100);
        let (_, second_new) = cursor.place(190, 100);
        let (third, third_new) = cursor.place(190, 100);
        assert!(!first_new && !second_new);
        assert!(third_new);
        assert_eq!(third.page, 1);
        assert_eq!(third.card, 2);
        assert!(approx(third.y_mm, 10.0));
        assert_eq!(cursor.page_count(), 2);
    }

    #[test]
    fn test_oversized_first_card_stays_on_page() {
        let (placements, cursor) = place_all(&[(190, 400), (190, 10)]);
        assert_eq!(cursor.page_count(), 2);
        assert_eq!(placements[0].page, 0);
        assert!(approx(placements[0].y_mm, 10.0));
        assert!(approx(placements[0].height_mm, 400.0));
        assert_eq!(placements[1].page, 1);
    }

    #[test]
    fn test_exact_fit_does_not_break() {
        // 10 + 277 = 287 which is exactly the bottom limit
        let (_, cursor) = place_all(&[(190, 277)]);
        assert_eq!(cursor.page_count(), 1);
        let mut cursor = PageCursor::new(PageSetup::a4());
        let (_, first_new) = cursor.place(190, 100);
        let (_, second_new) = cursor.place(190, 172);
        assert!(!first_new);
        assert!(!second_new);
        assert_eq!(cursor.page_count(), 1);
    }
}
