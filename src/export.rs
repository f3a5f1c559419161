use std::{fs, path::Path};

use anyhow::Context;
use serde_json::Value;

use crate::{
    bibtex::format_entry,
    config::{ExportOptions, OnError},
    error::RecordError,
    item::Item,
    key::sort_key,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Entries written.
    pub formatted: usize,
    /// Attachments and notes, which are never written.
    pub skipped: usize,
    /// Records dropped because of an error (only with `OnError::Skip`).
    pub failed: usize,
}

#[derive(Debug)]
pub struct Rendered {
    pub bibtex: String,
    pub summary: Summary,
}

struct Prepared {
    position: usize,
    item: Item,
    sort_key: String,
}

/// Save the raw records, untouched, before anything else looks at them.
pub fn write_dump(path: &Path, raw: &[Value]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(raw)?;
    fs::write(path, json).with_context(|| format!("failed to write dump to {}", path.display()))?;
    tracing::info!(path = %path.display(), records = raw.len(), "wrote dump");
    Ok(())
}

pub fn read_dump(path: &Path) -> anyhow::Result<Vec<Value>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("{} is not a JSON list of items", path.display()))
}

/// Sort all records and render them as one BibTeX document.
///
/// Positions in error messages are 1-based indices into `raw`.
pub fn render(raw: &[Value], options: &ExportOptions) -> anyhow::Result<Rendered> {
    let mut summary = Summary::default();
    let mut prepared = prepare(raw, options.on_error, &mut summary)?;

    // Stable, so equal keys keep their fetch order.
    prepared.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));

    let mut bibtex = String::new();
    for p in &prepared {
        match format_entry(&p.item) {
            Ok(Some(entry)) => {
                bibtex.push_str(&entry);
                summary.formatted += 1;
            }
            Ok(None) => summary.skipped += 1,
            Err(err) => on_record_error(options.on_error, p.position, &p.item.describe(), err, &mut summary)?,
        }
    }

    tracing::info!(
        formatted = summary.formatted,
        skipped = summary.skipped,
        failed = summary.failed,
        "export finished"
    );
    Ok(Rendered { bibtex, summary })
}

fn prepare(raw: &[Value], policy: OnError, summary: &mut Summary) -> anyhow::Result<Vec<Prepared>> {
    let mut prepared = Vec::with_capacity(raw.len());
    for (i, value) in raw.iter().enumerate() {
        let position = i + 1;
        let item = match Item::from_json(value) {
            Ok(item) => item,
            Err(err) => {
                on_record_error(policy, position, &raw_label(value), err, summary)?;
                continue;
            }
        };
        match sort_key(&item) {
            Ok(sort_key) => prepared.push(Prepared { position, item, sort_key }),
            Err(err) => on_record_error(policy, position, &item.describe(), err, summary)?,
        }
    }
    Ok(prepared)
}

fn on_record_error(
    policy: OnError,
    position: usize,
    label: &str,
    err: RecordError,
    summary: &mut Summary,
) -> anyhow::Result<()> {
    match policy {
        OnError::Abort => {
            Err(anyhow::Error::new(err).context(format!("record #{position} ({label})")))
        }
        OnError::Skip => {
            tracing::warn!(position, record = label, error = %err, "skipping record");
            summary.failed += 1;
            Ok(())
        }
    }
}

fn raw_label(value: &Value) -> String {
    value
        .get("key")
        .and_then(Value::as_str)
        .map_or_else(|| "unparseable item".to_string(), str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn article(key: &str, surname: &str, title: &str, date: &str) -> Value {
        json!({
            "key": key,
            "data": {
                "itemType": "journalArticle",
                "title": title,
                "date": date,
                "creators": [{"creatorType": "author", "lastName": surname, "firstName": "A"}]
            }
        })
    }

    fn skip() -> ExportOptions {
        ExportOptions { on_error: OnError::Skip }
    }

    #[test]
    fn entries_come_out_in_year_order() {
        let raw = vec![
            article("K1", "Alpha", "First", "2020"),
            json!({"key": "K0", "data": {"itemType": "attachment", "title": "PDF"}}),
            article("K2", "Beta", "Second", "2019"),
            article("K3", "Gamma", "Third", "2021"),
        ];
        let out = render(&raw, &ExportOptions::default()).unwrap();
        let keys: Vec<&str> = out
            .bibtex
            .lines()
            .filter(|l| l.starts_with('@'))
            .collect();
        assert_eq!(
            keys,
            [
                "@article{beta_second_2019,",
                "@article{alpha_first_2020,",
                "@article{gamma_third_2021,"
            ]
        );
        assert_eq!(out.summary, Summary { formatted: 3, skipped: 1, failed: 0 });
    }

    #[test]
    fn equal_keys_keep_fetch_order_and_duplicate() {
        let raw = vec![
            article("K1", "Novak", "Study one", "2018"),
            article("K2", "Novak", "Study two", "2018"),
        ];
        let out = render(&raw, &ExportOptions::default()).unwrap();
        assert_eq!(out.bibtex.matches("@article{novak_study_2018,").count(), 2);
        let one = out.bibtex.find("Study one").unwrap();
        let two = out.bibtex.find("Study two").unwrap();
        assert!(one < two);
    }

    #[test]
    fn abort_names_the_record() {
        let raw = vec![
            article("K1", "Alpha", "First", "2020"),
            article("K2", "Beta", "The", "2019"),
        ];
        let err = render(&raw, &ExportOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "record #2 (K2 \"The\")");
        let cause = err.downcast_ref::<RecordError>().unwrap();
        assert_eq!(cause, &RecordError::TitleWordNotFound("The".into()));
    }

    #[test]
    fn abort_on_unparseable_item() {
        let raw = vec![json!({"key": "BAD", "data": {"title": "no type"}})];
        let err = render(&raw, &ExportOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "record #1 (BAD)");
    }

    #[test]
    fn skip_keeps_going() {
        let raw = vec![
            article("K1", "Alpha", "First", "2020"),
            json!({"key": "K2", "data": {"itemType": "book", "title": "No date",
                "creators": [{"creatorType": "author", "name": "X"}]}}),
            json!(42),
        ];
        let out = render(&raw, &skip()).unwrap();
        assert!(out.bibtex.starts_with("@article{alpha_first_2020,"));
        assert_eq!(out.summary, Summary { formatted: 1, skipped: 0, failed: 2 });
    }

    #[test]
    fn empty_input_renders_nothing() {
        let out = render(&[], &ExportOptions::default()).unwrap();
        assert!(out.bibtex.is_empty());
        assert_eq!(out.summary, Summary::default());
    }

    #[test]
    fn dump_round_trips_raw_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.json");
        let raw = vec![article("K1", "Alpha", "First", "2020"), json!({"odd": [1, 2]})];
        write_dump(&path, &raw).unwrap();
        assert_eq!(read_dump(&path).unwrap(), raw);
    }

    #[test]
    fn read_dump_rejects_non_list() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut tmp, b"{\"not\": \"a list\"}").unwrap();
        let err = read_dump(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("is not a JSON list of items"));
    }
}
