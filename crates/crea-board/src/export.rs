//! Board export to a paginated PDF
//!
//! Export reads rendered cards only and never touches the asset store.

use crate::card::Card;
use crate::layout::{PageCursor, PageSetup};
use crate::pdf::PdfWriter;
use crate::raster::{BlockRasterizer, Rasterizer};
use crea_core::{CreaError, Notice, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// Export tuning, usually loaded from the `[export]` config section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    #[serde(default)]
    pub page: PageSetup,
    /// Card layout width before scaling, in pixels
    #[serde(default = "default_card_width")]
    pub card_width_px: u32,
    /// Rasterization scale factor
    #[serde(default = "default_scale")]
    pub scale: u32,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

fn default_card_width() -> u32 {
    800
}
fn default_scale() -> u32 {
    2
}
fn default_jpeg_quality() -> u8 {
    90
}
fn default_file_name() -> String {
    "CreaPrompt-Campaign-Board.pdf".to_string()
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            page: PageSetup::default(),
            card_width_px: default_card_width(),
            scale: default_scale(),
            jpeg_quality: default_jpeg_quality(),
            file_name: default_file_name(),
        }
    }
}

/// A finished document held in memory
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub card_count: usize,
}

impl ExportedDocument {
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    CreaError::ExportError(format!("Failed to create {}: {}", parent.display(), e))
                })?;
            }
        }
        std::fs::write(path, &self.bytes).map_err(|e| {
            CreaError::ExportError(format!("Failed to write {}: {}", path.display(), e))
        })
    }
}

/// Result of an export attempt that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The board was empty; nothing was rasterized or written
    NothingToExport,
    Exported {
        path: PathBuf,
        page_count: usize,
        card_count: usize,
    },
}

impl ExportOutcome {
    pub fn notice(&self) -> Notice {
        match self {
            ExportOutcome::NothingToExport => Notice::destructive(
                "Board is Empty",
                "Add some assets to the board before exporting.",
            ),
            ExportOutcome::Exported { .. } => {
                Notice::info("Export Successful!", "Your PDF has been downloaded.")
            }
        }
    }

    /// Shown when an export starts
    pub fn starting_notice() -> Notice {
        Notice::info(
            "Exporting...",
            "Generating PDF of your campaign board. This may take a moment.",
        )
    }

    /// Shown when rasterization or writing fails
    pub fn failure_notice() -> Notice {
        Notice::destructive("Export Failed", "An error occurred while generating the PDF.")
    }
}

/// Rasterizes board cards and lays them out onto pages
pub struct BoardExporter<R: Rasterizer = BlockRasterizer> {
    rasterizer: R,
    settings: ExportSettings,
    in_flight: AtomicBool,
}

impl BoardExporter<BlockRasterizer> {
    pub fn new(settings: ExportSettings) -> Self {
        let rasterizer = BlockRasterizer::new(settings.card_width_px, settings.scale);
        Self::with_rasterizer(rasterizer, settings)
    }
}

impl Default for BoardExporter<BlockRasterizer> {
    fn default() -> Self {
        Self::new(ExportSettings::default())
    }
}

impl<R: Rasterizer> BoardExporter<R> {
    pub fn with_rasterizer(rasterizer: R, settings: ExportSettings) -> Self {
        Self {
            rasterizer,
            settings,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    /// Whether an export is currently running
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Build the document in memory. `None` when there are no cards.
    pub fn render_document(&self, cards: &[Card]) -> Result<Option<ExportedDocument>> {
        if cards.is_empty() {
            return Ok(None);
        }

        let _guard = InFlightGuard::acquire(&self.in_flight)?;
        self.render_cards(cards).map(Some)
    }

    fn render_cards(&self, cards: &[Card]) -> Result<ExportedDocument> {
        let mut cursor = PageCursor::new(self.settings.page.clone());
        let mut writer = PdfWriter::new(&self.settings.page, self.settings.jpeg_quality);

        for card in cards {
            let bitmap = self.rasterizer.rasterize(card)?;
            let (placement, new_page) = cursor.place(bitmap.width(), bitmap.height());
            if new_page {
                writer.add_page();
            }
            writer.add_image(&bitmap, &placement)?;
            tracing::debug!(
                asset = %card.asset_id,
                page = placement.page,
                y_mm = placement.y_mm,
                "card placed"
            );
        }

        let page_count = cursor.page_count();
        Ok(ExportedDocument {
            bytes: writer.finish(),
            page_count,
            card_count: cards.len(),
        })
    }

    /// Render and save the board to `path`. The in-flight flag covers the write.
    pub fn export(&self, cards: &[Card], path: &Path) -> Result<ExportOutcome> {
        if cards.is_empty() {
            tracing::info!("export skipped: board is empty");
            return Ok(ExportOutcome::NothingToExport);
        }

        let _guard = InFlightGuard::acquire(&self.in_flight)?;
        let document = self.render_cards(cards)?;
        document.save(path)?;
        tracing::info!(
            path = %path.display(),
            pages = document.page_count,
            cards = document.card_count,
            "board exported"
        );

        Ok(ExportOutcome::Exported {
            path: path.to_path_buf(),
            page_count: document.page_count,
            card_count: document.card_count,
        })
    }
}

struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| CreaError::ExportError("An export is already in progress".to_string()))?;
        Ok(Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::render_board;
    use crate::store::AssetStore;
    use crate::types::{AssetDraft, AssetKind, PromptData};
    use chrono::Utc;
    use image::{Rgba, RgbaImage};
    use std::cell::Cell;

    /// Fixed-size rasterizer that counts calls
    struct CountingRasterizer {
        calls: Cell<usize>,
        height: u32,
        fail_on: Option<usize>,
    }

    impl CountingRasterizer {
        fn new(height: u32) -> Self {
            Self {
                calls: Cell::new(0),
                height,
                fail_on: None,
            }
        }
    }

    impl Rasterizer for CountingRasterizer {
        fn rasterize(&self, _card: &Card) -> Result<RgbaImage> {
            let n = self.calls.get();
            self.calls.set(n + 1);
            if self.fail_on == Some(n) {
                return Err(CreaError::RasterError("canvas tainted".to_string()));
            }
            Ok(RgbaImage::from_pixel(190, self.height, Rgba([0, 0, 0, 255])))
        }
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("crea_export_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn board_with(n: usize) -> AssetStore {
        let mut store = AssetStore::new();
        for i in 0..n {
            store.add(AssetDraft::new(
                AssetKind::Copy,
                format!("Tagline number {}", i),
                PromptData::new(),
            ));
        }
        store
    }

    #[test]
    fn test_empty_board_does_no_work() {
        let dir = temp_dir();
        let path = dir.join("board.pdf");
        let exporter = BoardExporter::with_rasterizer(CountingRasterizer::new(10), ExportSettings::default());

        let outcome = exporter.export(&[], &path).unwrap();
        assert_eq!(outcome, ExportOutcome::NothingToExport);
        assert_eq!(outcome.notice().title, "Board is Empty");
        assert_eq!(exporter.rasterizer().calls.get(), 0);
        assert!(!path.exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_export_paginates_and_saves() {
        let dir = temp_dir();
        let path = dir.join("out").join("board.pdf");
        let store = board_with(3);
        let cards = render_board(store.iter(), Utc::now());

        // 100 mm per card on A4: two fit on the first page, one spills over
        let exporter = BoardExporter::with_rasterizer(CountingRasterizer::new(100), ExportSettings::default());
        let outcome = exporter.export(&cards, &path).unwrap();

        assert_eq!(
            outcome,
            ExportOutcome::Exported {
                path: path.clone(),
                page_count: 2,
                card_count: 3,
            }
        );
        assert_eq!(exporter.rasterizer().calls.get(), 3);
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(!exporter.is_busy());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_raster_failure_is_export_failure() {
        let store = board_with(2);
        let cards = render_board(store.iter(), Utc::now());
        let mut rasterizer = CountingRasterizer::new(20);
        rasterizer.fail_on = Some(1);
        let exporter = BoardExporter::with_rasterizer(rasterizer, ExportSettings::default());

        let err = exporter.render_document(&cards).unwrap_err();
        assert!(err.is_export_failure());
        assert!(!exporter.is_busy());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_overlapping_export_rejected() {
        let exporter: BoardExporter = BoardExporter::default();
        let _held = InFlightGuard::acquire(&exporter.in_flight).unwrap();
        let store = board_with(1);
        let cards = render_board(store.iter(), Utc::now());

        let err = exporter.render_document(&cards).unwrap_err();
        assert!(matches!(err, CreaError::ExportError(_)));
    }

    #[test]
    fn test_save_into_file_parent_is_export_failure() {
        let dir = temp_dir();
        let blocker = dir.join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let document = ExportedDocument {
            bytes: b"%PDF-1.4".to_vec(),
            page_count: 1,
            card_count: 1,
        };

        let err = document.save(&blocker.join("sub").join("board.pdf")).unwrap_err();
        assert!(err.is_export_failure(), "{:?}", err);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_write_failure_releases_in_flight_flag() {
        let dir = temp_dir();
        let blocker = dir.join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let store = board_with(1);
        let cards = render_board(store.iter(), Utc::now());
        let exporter = BoardExporter::with_rasterizer(CountingRasterizer::new(10), ExportSettings::default());

        let err = exporter.export(&cards, &blocker.join("board.pdf")).unwrap_err();
        assert!(err.is_export_failure());
        assert!(!exporter.is_busy());

        let outcome = exporter.export(&cards, &dir.join("board.pdf")).unwrap();
        assert!(matches!(outcome, ExportOutcome::Exported { .. }));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_export_rejected_while_another_is_writing() {
        let dir = temp_dir();
        let store = board_with(1);
        let cards = render_board(store.iter(), Utc::now());
        let exporter = BoardExporter::with_rasterizer(CountingRasterizer::new(10), ExportSettings::default());
        let _held = InFlightGuard::acquire(&exporter.in_flight).unwrap();

        let path = dir.join("board.pdf");
        let err = exporter.export(&cards, &path).unwrap_err();
        assert!(matches!(err, CreaError::ExportError(_)));
        assert_eq!(exporter.rasterizer().calls.get(), 0);
        assert!(!path.exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_default_block_rasterizer_export() {
        let store = board_with(4);
        let cards = render_board(store.iter(), Utc::now());
        let exporter = BoardExporter::new(ExportSettings {
            card_width_px: 200,
            scale: 1,
            ..Default::default()
        });

        let doc = exporter.render_document(&cards).unwrap().unwrap();
        assert_eq!(doc.card_count, 4);
        assert!(doc.page_count >= 1);
        assert!(doc.bytes.ends_with(b"%%EOF\n"));
    }
}
