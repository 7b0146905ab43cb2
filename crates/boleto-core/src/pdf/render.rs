//! Page rasterization through poppler's `pdftoppm`.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use image::DynamicImage;
use tracing::debug;

use super::Result;
use crate::error::PdfError;
use crate::subprocess::wait_or_kill;

const PDFTOPPM: &str = "pdftoppm";

/// Render one page (1-indexed) of a PDF held in memory at `dpi`.
///
/// `pdftoppm` is killed once `timeout` passes.
pub fn render_with_pdftoppm(data: &[u8], page: u32, dpi: u32, timeout: Duration) -> Result<DynamicImage> {
    render_with(PDFTOPPM, data, page, dpi, timeout)
}

fn render_with(binary: &str, data: &[u8], page: u32, dpi: u32, timeout: Duration) -> Result<DynamicImage> {
    let deadline = Instant::now() + timeout;
    let temp_dir = tempfile::TempDir::new().map_err(|e| PdfError::Render(e.to_string()))?;
    let pdf_path = temp_dir.path().join("input.pdf");
    std::fs::write(&pdf_path, data).map_err(|e| PdfError::Render(e.to_string()))?;

    let page_str = page.to_string();
    let dpi_str = dpi.to_string();
    let output_prefix = temp_dir.path().join("page");

    let child = Command::new(binary)
        .args(["-png", "-r", &dpi_str, "-f", &page_str, "-l", &page_str])
        .arg(&pdf_path)
        .arg(&output_prefix)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();

    let mut child = match child {
        Ok(child) => child,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PdfError::Render(format!("{} not found (install poppler-utils)", binary)));
        }
        Err(e) => return Err(PdfError::Render(e.to_string())),
    };

    let status = wait_or_kill(&mut child, deadline, binary).map_err(|e| PdfError::Render(e.to_string()))?;
    let Some(status) = status else {
        return Err(PdfError::Timeout {
            tool: binary.to_string(),
            seconds: timeout.as_secs(),
        });
    };
    if !status.success() {
        return Err(PdfError::Render(format!("{} exited with {}", binary, status)));
    }

    let image_path = find_page_image(temp_dir.path(), page)
        .ok_or_else(|| PdfError::Render(format!("no image generated for page {}", page)))?;
    debug!("{} rendered page {} at {} dpi", binary, page, dpi);
    image::open(&image_path).map_err(|e| PdfError::Render(e.to_string()))
}

/// pdftoppm pads the page number to the width of the page count.
fn find_page_image(dir: &Path, page: u32) -> Option<PathBuf> {
    for digits in [1, 2, 3, 4] {
        let path = dir.join(format!("page-{:0width$}.png", page, width = digits));
        if path.exists() {
            return Some(path);
        }
    }
    None
}
