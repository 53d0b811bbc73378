use std::collections::{HashMap, HashSet};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::types::{ArticleInput, MetricRecord};

/// Read the article list: a CSV file with `URL_ID` and `URL` columns.
pub fn read_inputs(path: &Path) -> Result<Vec<ArticleInput>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open input file '{}'", path.display()))?;

    let mut inputs = Vec::new();
    for (line, row) in reader.deserialize::<ArticleInput>().enumerate() {
        let input = row.with_context(|| {
            format!("invalid row {} in '{}'", line + 2, path.display())
        })?;
        inputs.push(input);
    }
    Ok(inputs)
}

/// CSV file of completed [`MetricRecord`]s.
///
/// Records are only ever appended. An existing file's header decides the
/// column order of appended rows, so files produced by other tools resume
/// cleanly.
#[derive(Debug, Clone)]
pub struct OutputStore {
    path: PathBuf,
}

impl OutputStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn existing_header(&self) -> Result<Option<Vec<String>>> {
        if !self.path.exists() || std::fs::metadata(&self.path)?.len() == 0 {
            return Ok(None);
        }
        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("failed to open output file '{}'", self.path.display()))?;
        let header = reader
            .headers()
            .with_context(|| format!("failed to read header of '{}'", self.path.display()))?;
        Ok(Some(header.iter().map(str::to_string).collect()))
    }

    /// URLs that already have a record.
    pub fn recorded_urls(&self) -> Result<HashSet<String>> {
        let Some(header) = self.existing_header()? else {
            return Ok(HashSet::new());
        };
        let url_idx = header
            .iter()
            .position(|h| h == MetricRecord::URL_COLUMN)
            .with_context(|| {
                format!(
                    "output file '{}' has no {} column",
                    self.path.display(),
                    MetricRecord::URL_COLUMN
                )
            })?;

        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("failed to open output file '{}'", self.path.display()))?;
        let mut urls = HashSet::new();
        for row in reader.records() {
            let row = row.with_context(|| format!("failed to read '{}'", self.path.display()))?;
            if let Some(url) = row.get(url_idx) {
                urls.insert(url.to_string());
            }
        }
        Ok(urls)
    }

    /// Append records and flush them to disk.
    pub fn append(&self, records: &[MetricRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let existing = self.existing_header()?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        if existing.is_some() && !ends_with_newline(&mut file)? {
            file.write_all(b"\n")
                .with_context(|| format!("failed to write {}", self.path.display()))?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        let header = match existing {
            Some(header) => header,
            None => {
                let header = MetricRecord::header();
                writer.write_record(&header)?;
                header.into_iter().map(str::to_string).collect()
            }
        };

        for record in records {
            writer
                .write_record(align_row(record, &header))
                .with_context(|| format!("failed to write record for {}", record.url))?;
        }
        writer
            .flush()
            .with_context(|| format!("failed to flush {}", self.path.display()))?;
        Ok(())
    }
}

fn ends_with_newline(file: &mut std::fs::File) -> Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Order a record's values by `header`; unknown columns are left blank.
fn align_row(record: &MetricRecord, header: &[String]) -> Vec<String> {
    let values: HashMap<&str, String> = MetricRecord::header()
        .into_iter()
        .zip(record.to_row())
        .collect();
    header
        .iter()
        .map(|column| values.get(column.as_str()).cloned().unwrap_or_default())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::TextMetrics;

    fn record(id: &str, url: &str, words: usize) -> MetricRecord {
        MetricRecord::new(
            &ArticleInput::new(id, url),
            TextMetrics {
                word_count: words,
                ..TextMetrics::default()
            },
        )
    }

    #[test]
    fn test_read_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Input.csv");
        std::fs::write(
            &path,
            "URL_ID,URL\nblackassign0001,https://example.com/a\n37,https://example.com/b\n",
        )
        .unwrap();

        let inputs = read_inputs(&path).unwrap();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0], ArticleInput::new("blackassign0001", "https://example.com/a"));
        assert_eq!(inputs[1].id, "37");
    }

    #[test]
    fn test_read_inputs_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_inputs(&dir.path().join("Input.csv")).unwrap_err();
        assert!(format!("{err:#}").contains("Input.csv"));
    }

    #[test]
    fn test_read_inputs_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Input.csv");
        std::fs::write(&path, "ID,LINK\n1,https://example.com\n").unwrap();
        assert!(read_inputs(&path).is_err());
    }

    #[test]
    fn test_new_store_has_no_urls() {
        let dir = tempfile::tempdir().unwrap();
        let store = OutputStore::new(dir.path().join("Output.csv"));
        assert!(store.recorded_urls().unwrap().is_empty());
    }

    #[test]
    fn test_append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = OutputStore::new(dir.path().join("Output.csv"));
        store.append(&[record("1", "https://a", 10)]).unwrap();
        store.append(&[record("2", "https://b", 20)]).unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(content.matches("URL_ID").count(), 1);
        assert_eq!(content.lines().count(), 3);

        let urls = store.recorded_urls().unwrap();
        assert_eq!(urls.len(), 2);
        assert!(urls.contains("https://a"));
        assert!(urls.contains("https://b"));
    }

    #[test]
    fn test_append_follows_existing_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Output.csv");
        // Metrics first, identity last, no trailing newline
        std::fs::write(&path, "WORD COUNT,URL_ID,URL\n5,old,https://old").unwrap();

        let store = OutputStore::new(&path);
        store.append(&[record("new", "https://new", 42)]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines, vec!["WORD COUNT,URL_ID,URL", "5,old,https://old", "42,new,https://new"]);
    }

    #[test]
    fn test_output_without_url_column_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Output.csv");
        std::fs::write(&path, "A,B\n1,2\n").unwrap();
        assert!(OutputStore::new(&path).recorded_urls().is_err());
    }
}
