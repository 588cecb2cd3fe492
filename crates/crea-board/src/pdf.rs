//! Minimal PDF writer
//!
//! Produces a PDF 1.4 file whose pages contain only JPEG image XObjects.
//! Positions are given in millimetres from the top-left of the page, the
//! same frame [`crate::layout`] works in.

use crate::layout::{PageSetup, Placement};
use crea_core::{CreaError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};
use std::fmt::Write as _;

const POINTS_PER_MM: f64 = 72.0 / 25.4;

struct PlacedImage {
    jpeg: Vec<u8>,
    width_px: u32,
    height_px: u32,
    x_pt: f64,
    top_pt: f64,
    width_pt: f64,
    height_pt: f64,
}

/// Accumulates pages of images and serializes them as a PDF document
pub struct PdfWriter {
    width_pt: f64,
    height_pt: f64,
    quality: u8,
    pages: Vec<Vec<PlacedImage>>,
}

impl PdfWriter {
    pub fn new(setup: &PageSetup, quality: u8) -> Self {
        Self {
            width_pt: setup.width_mm * POINTS_PER_MM,
            height_pt: setup.height_mm * POINTS_PER_MM,
            quality: quality.clamp(1, 100),
            pages: Vec::new(),
        }
    }

    /// Start a new, empty page
    pub fn add_page(&mut self) {
        self.pages.push(Vec::new());
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Draw an image on the current page; opens the first page if needed
    pub fn add_image(&mut self, image: &RgbaImage, placement: &Placement) -> Result<()> {
        if self.pages.is_empty() {
            self.add_page();
        }

        let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, self.quality)
            .encode_image(&rgb)
            .map_err(|e| CreaError::ExportError(format!("Failed to encode card image: {}", e)))?;

        let placed = PlacedImage {
            jpeg,
            width_px: rgb.width(),
            height_px: rgb.height(),
            x_pt: placement.x_mm * POINTS_PER_MM,
            top_pt: placement.y_mm * POINTS_PER_MM,
            width_pt: placement.width_mm * POINTS_PER_MM,
            height_pt: placement.height_mm * POINTS_PER_MM,
        };

        if let Some(page) = self.pages.last_mut() {
            page.push(placed);
        }
        Ok(())
    }

    /// Serialize the document
    pub fn finish(self) -> Vec<u8> {
        // Object ids: 1 catalog, 2 page tree, then per page: page, contents, images.
        let mut objects: Vec<Vec<u8>> = vec![Vec::new(), Vec::new()];
        let mut kids = Vec::new();

        for page in &self.pages {
            let page_id = objects.len() + 1;
            let contents_id = page_id + 1;
            let first_image_id = page_id + 2;
            kids.push(format!("{} 0 R", page_id));

            let mut xobjects = String::new();
            let mut stream = String::new();
            for (i, img) in page.iter().enumerate() {
                let _ = write!(xobjects, "/Im{} {} 0 R ", i, first_image_id + i);
                let y_pt = self.height_pt - img.top_pt - img.height_pt;
                let _ = writeln!(
                    stream,
                    "q {:.2} 0 0 {:.2} {:.2} {:.2} cm /Im{} Do Q",
                    img.width_pt, img.height_pt, img.x_pt, y_pt, i
                );
            }

            objects.push(
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] /Resources << /XObject << {}>> >> /Contents {} 0 R >>",
                    self.width_pt, self.height_pt, xobjects, contents_id
                )
                .into_bytes(),
            );
            objects.push(stream_object(String::new(), stream.as_bytes()));

            for img in page {
                let dict = format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /DCTDecode ",
                    img.width_px, img.height_px
                );
                objects.push(stream_object(dict, &img.jpeg));
            }
        }

        objects[0] = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();
        objects[1] = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            self.pages.len()
        )
        .into_bytes();

        let mut out: Vec<u8> = Vec::new();
        out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
            out.extend_from_slice(body);
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref_offset = out.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in &offsets {
            let _ = write!(xref, "{:010} 00000 n \n", offset);
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        );
        out.extend_from_slice(xref.as_bytes());
        out
    }
}

fn stream_object(dict_entries: String, data: &[u8]) -> Vec<u8> {
    let mut obj = format!("<< {}/Length {} >>\nstream\n", dict_entries, data.len()).into_bytes();
    obj.extend_from_slice(data);
    obj.extend_from_slice(b"\nendstream");
    obj
}
