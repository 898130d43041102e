//! Dustlink integration test harness.
//!
//! Tests here drive the conversion pipeline over real files in a scratch
//! directory under the system temp dir, the same way dust-convert does:
//!
//!   cargo test --test integration
//!
//! Each test owns its scratch directory; nothing is shared between tests.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use dustlink_core::verify::{verify, VerifySummary};
use dustlink_core::{ConvertSummary, Converter, TimestampMode};

mod pipeline;

// ── Harness ───────────────────────────────────────────────────────────────────

pub const HEADER: &str = "id,time,value,aqi,pollution";

/// Scratch directory removed on drop.
pub struct Scratch {
    root: PathBuf,
}

impl Scratch {
    pub fn new(name: &str) -> Result<Self> {
        static NEXT: AtomicUsize = AtomicUsize::new(0);
        let root = std::env::temp_dir().join(format!(
            "dustlink-it-{name}-{}-{}",
            std::process::id(),
            NEXT.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::create_dir_all(&root)
            .with_context(|| format!("failed to create {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    /// Write a CSV file with the standard header and the given data rows.
    pub fn write_csv(&self, file: &str, rows: &[String]) -> Result<PathBuf> {
        let path = self.path(file);
        let mut text = format!("{HEADER}\n");
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        std::fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

/// Convert `input` into `output` with a local-time converter.
pub fn convert_file(input: &Path, output: &Path, mode: TimestampMode) -> Result<ConvertSummary> {
    let reader = BufReader::new(
        File::open(input).with_context(|| format!("failed to open {}", input.display()))?,
    );
    let writer = BufWriter::new(
        File::create(output).with_context(|| format!("failed to create {}", output.display()))?,
    );
    Ok(Converter::new(mode).run(reader, writer)?)
}

pub fn verify_file(path: &Path) -> Result<VerifySummary> {
    let reader = BufReader::new(
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
    );
    Ok(verify(reader)?)
}

pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(text.lines().map(str::to_string).collect())
}

/// A well-formed row for sensor `id` at `hour` with the given reading.
pub fn row(id: u32, hour: u32, pm25: f32, aqi: u16, pollution: &str) -> String {
    format!("{id},2024:01:01 {hour:02}:00:00,{pm25:.1},{aqi},{pollution}")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn test_scratch_dir_is_removed_on_drop() {
    let root = {
        let scratch = Scratch::new("drop").unwrap();
        let path = scratch.write_csv("a.csv", &[]).unwrap();
        assert!(path.exists());
        scratch.root.clone()
    };
    assert!(!root.exists(), "scratch dir should be gone after drop");
}

#[test]
fn test_missing_input_is_an_error() {
    let scratch = Scratch::new("missing").unwrap();
    let result = convert_file(
        &scratch.path("does-not-exist.csv"),
        &scratch.path("out.dat"),
        TimestampMode::Lenient,
    );
    assert!(result.is_err());
    assert!(!scratch.path("out.dat").exists(), "output must not be created");
}
