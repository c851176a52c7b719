use crate::detector::Document;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A scraped policy page. Any field may be missing in the source data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,
    /// Missing, null, or non-string text is read as "".
    #[serde(default, deserialize_with = "text_or_empty")]
    pub text: String,
}

fn lenient_string<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    let value = serde_json::Value::deserialize(de)?;
    Ok(value.as_str().map(str::to_string))
}

fn text_or_empty<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(lenient_string(de)?.unwrap_or_default())
}

impl Record {
    pub fn new(title: impl Into<String>, url: impl Into<String>, text: impl Into<String>) -> Self {
        Self { title: Some(title.into()), url: Some(url.into()), text: text.into() }
    }

    /// Display label: the title, or `Record {index}` when it is missing.
    pub fn label(&self, index: usize) -> String {
        match &self.title {
            Some(t) => t.clone(),
            None => format!("Record {index}"),
        }
    }

    /// title, url and text all present and not blank.
    pub fn is_valid(&self) -> bool {
        let present = |f: &Option<String>| f.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.title) && present(&self.url) && !self.text.trim().is_empty()
    }
}

pub fn to_documents(records: &[Record]) -> Vec<Document> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| Document::new(r.label(i), r.text.clone()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
}

impl ValidationSummary {
    pub fn has_invalid(&self) -> bool { self.invalid > 0 }
}

pub fn validate_dataset(records: &[Record]) -> ValidationSummary {
    let valid = records.iter().filter(|r| r.is_valid()).count();
    ValidationSummary { total: records.len(), valid, invalid: records.len() - valid }
}

/// Load records from a JSON file (array or single object), a JSONL file, or a
/// directory tree of such files. Directory entries are read in path order.
pub fn load_records(input: &Path) -> Result<Vec<Record>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else {
        files.push(input.to_path_buf());
    }

    let mut records = Vec::new();
    for file in files {
        let loaded = match file.extension().and_then(|s| s.to_str()) {
            Some("jsonl") => load_jsonl(&file),
            _ => load_json(&file),
        };
        records.extend(loaded.with_context(|| format!("loading records from {}", file.display()))?);
    }
    tracing::info!(num_records = records.len(), input = %input.display(), "loaded records");
    Ok(records)
}

fn load_jsonl(file: &Path) -> Result<Vec<Record>> {
    let reader = BufReader::new(File::open(file)?);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}

fn load_json(file: &Path) -> Result<Vec<Record>> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    let records = match json {
        serde_json::Value::Array(arr) => arr
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Record>, _>>()?,
        serde_json::Value::Object(_) => vec![serde_json::from_value(json)?],
        other => bail!("expected a record object or an array of records, found {other}"),
    };
    Ok(records)
}

/// Write records as a pretty-printed JSON array.
pub fn save_records(path: &Path, records: &[Record]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_and_null_text_become_empty() {
        let r: Record = serde_json::from_str(r#"{"title": "Doc"}"#).unwrap();
        assert_eq!(r.text, "");
        let r: Record = serde_json::from_str(r#"{"title": "Doc", "text": null}"#).unwrap();
        assert_eq!(r.text, "");
        let r: Record = serde_json::from_str(r#"{"text": 42}"#).unwrap();
        assert_eq!(r.text, "");
        assert_eq!(r.title, None);
    }

    #[test]
    fn labels_fall_back_to_index() {
        let docs = to_documents(&[Record::new("Doc A", "u", "x"), Record::default()]);
        assert_eq!(docs[0].id, "Doc A");
        assert_eq!(docs[1].id, "Record 1");
    }

    #[test]
    fn validation_counts() {
        let records = vec![
            Record::new("Terms", "https://a.example/tos", "We collect data."),
            Record::new("Blank", "https://b.example", "   "),
            Record { title: None, url: Some("u".into()), text: "t".into() },
        ];
        let summary = validate_dataset(&records);
        assert_eq!(summary, ValidationSummary { total: 3, valid: 1, invalid: 2 });
        assert!(summary.has_invalid());
    }

    #[test]
    fn loads_json_jsonl_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.json"), r#"[{"title": "A", "text": "one"}, {"title": "B"}]"#).unwrap();
        fs::write(dir.path().join("b.jsonl"), "{\"title\": \"C\", \"text\": \"three\"}\n\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let records = load_records(dir.path()).unwrap();
        let titles: Vec<_> = records.iter().map(|r| r.title.clone().unwrap()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);

        let single = dir.path().join("single.json");
        fs::write(&single, r#"{"title": "S", "text": "solo"}"#).unwrap();
        assert_eq!(load_records(&single).unwrap().len(), 1);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "[{").unwrap();
        assert!(load_records(&path).is_err());
    }

    #[test]
    fn top_level_scalar_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scalar.json");
        fs::write(&path, "42").unwrap();
        let err = load_records(&path).unwrap_err();
        assert!(format!("{err:#}").contains("expected a record object"));
    }
}
