use crate::detector::SimilarityReport;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Read, Write};
use std::path::Path;

/// Machine-readable result of one detection run; scores keep full precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateReport {
    pub generated_at: String,
    pub threshold: f64,
    pub num_docs: usize,
    pub pairs: Vec<SimilarityReport>,
}

/// `A <--> B | Similarity: 0.87`
pub fn render_line(report: &SimilarityReport) -> String {
    format!("{} <--> {} | Similarity: {:.2}", report.left_id, report.right_id, report.score)
}

pub fn render_text(reports: &[SimilarityReport]) -> String {
    let mut out = String::new();
    for r in reports {
        out.push_str(&render_line(r));
        out.push('\n');
    }
    out
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        create_dir_all(dir)?;
    }
    Ok(())
}

pub fn save_text_report(path: &Path, reports: &[SimilarityReport]) -> Result<()> {
    ensure_parent(path)?;
    let mut f = BufWriter::new(File::create(path).with_context(|| format!("creating {}", path.display()))?);
    f.write_all(render_text(reports).as_bytes())?;
    f.flush()?;
    Ok(())
}

pub fn save_json_report(path: &Path, report: &DuplicateReport) -> Result<()> {
    ensure_parent(path)?;
    let mut f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let json = serde_json::to_string_pretty(report)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_json_report(path: &Path) -> Result<DuplicateReport> {
    let mut f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let report: DuplicateReport = serde_json::from_str(&buf)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<SimilarityReport> {
        vec![
            SimilarityReport { left: 0, right: 1, left_id: "Doc A".into(), right_id: "Doc B".into(), score: 0.8765 },
            SimilarityReport { left: 0, right: 2, left_id: "Doc A".into(), right_id: "Doc C".into(), score: 1.0 },
        ]
    }

    #[test]
    fn renders_two_decimals() {
        assert_eq!(render_text(&sample()), "Doc A <--> Doc B | Similarity: 0.88\nDoc A <--> Doc C | Similarity: 1.00\n");
    }

    #[test]
    fn writes_reports() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("out/duplicate_report.txt");
        save_text_report(&txt, &sample()).unwrap();
        assert!(std::fs::read_to_string(&txt).unwrap().starts_with("Doc A <--> Doc B"));

        let json = dir.path().join("report.json");
        let report = DuplicateReport { generated_at: "2024-01-01T00:00:00Z".into(), threshold: 0.85, num_docs: 3, pairs: sample() };
        save_json_report(&json, &report).unwrap();
        let loaded = load_json_report(&json).unwrap();
        assert_eq!(loaded.pairs[0].score, 0.8765);
        assert_eq!(loaded.num_docs, 3);
    }
}
