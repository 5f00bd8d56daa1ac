//! OCR text extraction from package photos
//!
//! The recognizer is a trait so commands can be exercised without a real OCR
//! engine installed. The production implementation shells out to tesseract.

use crate::error::{FoodrecError, Result};
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// Default OCR executable
pub const DEFAULT_PROGRAM: &str = "tesseract";

/// Tesseract page segmentation mode 6: a single uniform block of text
pub const DEFAULT_PAGE_SEGMENTATION_MODE: u8 = 6;

/// Default limit on a single OCR run
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Anything that can turn an image into text
pub trait TextRecognizer {
    fn extract_text(&self, image: &Path) -> Result<String>;
}

/// Runs the tesseract CLI and captures what it prints to stdout
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    program: String,
    page_segmentation_mode: u8,
    timeout: Option<Duration>,
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl TesseractOcr {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            page_segmentation_mode: DEFAULT_PAGE_SEGMENTATION_MODE,
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    pub fn with_page_segmentation_mode(mut self, mode: u8) -> Self {
        self.page_segmentation_mode = mode;
        self
    }

    /// `None` lets the engine run for as long as it needs
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn spawn(&self, image: &Path) -> Result<Child> {
        Command::new(&self.program)
            .arg(image)
            .arg("stdout")
            .arg("--psm")
            .arg(self.page_segmentation_mode.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| FoodrecError::OcrInvocation(format!("failed to run {}: {}", self.program, e)))
    }

    /// Waits for the child, killing it once the deadline passes
    ///
    /// A timeout too large to represent as a deadline means no limit.
    fn wait(&self, child: &mut Child) -> Result<ExitStatus> {
        let deadline = self
            .timeout
            .and_then(|timeout| Instant::now().checked_add(timeout).map(|at| (timeout, at)));
        let Some((timeout, deadline)) = deadline else {
            return child
                .wait()
                .map_err(|e| FoodrecError::OcrInvocation(format!("failed waiting for {}: {}", self.program, e)));
        };

        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) if Instant::now() >= deadline => {
                    log::warn!("{} exceeded {:?}, killing it", self.program, timeout);
                    // The child may exit between try_wait and kill
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(FoodrecError::OcrInvocation(format!(
                        "{} timed out after {:?}",
                        self.program, timeout
                    )));
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    return Err(FoodrecError::OcrInvocation(format!(
                        "failed waiting for {}: {}",
                        self.program, e
                    )))
                }
            }
        }
    }
}

impl TextRecognizer for TesseractOcr {
    fn extract_text(&self, image: &Path) -> Result<String> {
        if !image.is_file() {
            return Err(FoodrecError::OcrInvocation(format!(
                "image not found: {}",
                image.display()
            )));
        }

        log::info!("Running OCR on image file: {}", image.display());
        let mut child = self.spawn(image)?;

        // Drain stdout on a separate thread so a chatty engine cannot block on a full pipe
        let (tx, rx) = mpsc::channel();
        if let Some(mut stdout) = child.stdout.take() {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let result = stdout.read_to_end(&mut buf).map(|_| buf);
                let _ = tx.send(result);
            });
        }

        let status = self.wait(&mut child)?;
        if !status.success() {
            return Err(FoodrecError::OcrInvocation(format!(
                "{} exited with {}",
                self.program, status
            )));
        }

        let bytes = rx
            .recv()
            .map_err(|_| FoodrecError::OcrInvocation("no output captured".to_string()))?
            .map_err(|e| FoodrecError::OcrInvocation(format!("failed reading output: {}", e)))?;

        let text = String::from_utf8_lossy(&bytes).into_owned();
        log::debug!("OCR produced {} bytes of text", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fake_image(dir: &tempfile::TempDir, name: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, b"not really a png").unwrap();
        path
    }

    #[test]
    fn missing_image_is_rejected_before_spawning() {
        let ocr = TesseractOcr::new("definitely-not-an-ocr-engine");
        let err = ocr.extract_text(Path::new("/nonexistent/label.png")).unwrap_err();
        assert!(matches!(err, FoodrecError::OcrInvocation(ref msg) if msg.contains("image not found")));
    }

    #[test]
    fn missing_program_is_an_invocation_error() {
        let dir = tempfile::tempdir().unwrap();
        let image = fake_image(&dir, "label.png");

        let ocr = TesseractOcr::new("definitely-not-an-ocr-engine");
        let err = ocr.extract_text(&image).unwrap_err();
        assert!(matches!(err, FoodrecError::OcrInvocation(ref msg) if msg.contains("failed to run")));
    }

    #[cfg(unix)]
    #[test]
    fn captures_stdout_of_the_engine() {
        let dir = tempfile::tempdir().unwrap();
        let image = fake_image(&dir, "best-by-2024-06-15.png");

        // echo prints its arguments: "<image> stdout --psm 6"
        let ocr = TesseractOcr::new("echo");
        let text = ocr.extract_text(&image).unwrap();
        assert!(text.contains("best-by-2024-06-15.png"));
        assert!(text.contains("--psm 6"));
    }

    #[cfg(unix)]
    #[test]
    fn passes_configured_page_segmentation_mode() {
        let dir = tempfile::tempdir().unwrap();
        let image = fake_image(&dir, "label.png");

        let ocr = TesseractOcr::new("echo").with_page_segmentation_mode(11);
        let text = ocr.extract_text(&image).unwrap();
        assert!(text.trim_end().ends_with("--psm 11"));
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_an_invocation_error() {
        let dir = tempfile::tempdir().unwrap();
        let image = fake_image(&dir, "label.png");

        let ocr = TesseractOcr::new("false");
        let err = ocr.extract_text(&image).unwrap_err();
        assert!(matches!(err, FoodrecError::OcrInvocation(ref msg) if msg.contains("exited with")));
    }

    #[cfg(unix)]
    #[test]
    fn timeout_too_large_for_a_deadline_means_no_limit() {
        let dir = tempfile::tempdir().unwrap();
        let image = fake_image(&dir, "label.png");

        let ocr = TesseractOcr::new("echo").with_timeout(Some(Duration::from_secs(u64::MAX)));
        let text = ocr.extract_text(&image).unwrap();
        assert!(text.contains("label.png"));
    }

    #[cfg(unix)]
    #[test]
    fn slow_engine_is_killed_after_timeout() {
        let dir = tempfile::tempdir().unwrap();
        // sh runs the "image" as a script: sh <image> stdout --psm 6
        let image = dir.path().join("slow.sh");
        fs::write(&image, b"exec sleep 10\n").unwrap();

        let ocr = TesseractOcr::new("sh").with_timeout(Some(Duration::from_millis(200)));
        let started = Instant::now();
        let err = ocr.extract_text(&image).unwrap_err();

        assert!(matches!(err, FoodrecError::OcrInvocation(ref msg) if msg.contains("timed out")));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[test]
    fn works_without_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let image = fake_image(&dir, "label.png");

        let ocr = TesseractOcr::new("echo").with_timeout(None);
        assert!(ocr.extract_text(&image).is_ok());
    }
}
