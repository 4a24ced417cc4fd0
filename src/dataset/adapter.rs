//! Line-by-line conversion of a split file into typed records.
//!
//! Each line of a split file is one JSON object. `open` hands back a lazy,
//! forward-only stream of `(line_index, Record)` pairs. Nothing is read until
//! the consumer pulls, and the file handle is owned by the stream, so it is
//! released whenever the stream is dropped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::de::Error as _;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use super::fields::{is_truthy, json_type_name, FieldReader};
use super::schema::{
    Action, ActionStatus, DialogueRecord, Intent, KbEntry, KbRecord, Record, SchemaMode,
    SearchEvent,
};
use crate::error::{LoadError, Result};

/// Source key for a search event timestamp, as spelled in the published data
const SEARCH_TIMESTAMP_KEY: &str = "timestmamp";
const SEARCH_TIMESTAMP_ALIAS: &str = "timestamp";

/// Open a split file and stream its records in the given schema mode
pub fn open<P: AsRef<Path>>(path: P, mode: SchemaMode) -> Result<RecordStream<BufReader<File>>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(target: "adapter", "Opened {} in {} mode", path.display(), mode);
    Ok(RecordStream::new(BufReader::new(file), path, mode))
}

/// Lazy stream of records read from newline-delimited JSON.
///
/// Lines whose dialogue is not a correct sample are skipped without
/// renumbering, so keys may have gaps. The first error ends the stream.
pub struct RecordStream<R> {
    reader: R,
    path: PathBuf,
    mode: SchemaMode,
    next_line: usize,
    buf: Vec<u8>,
    // Most recent `search_info` seen in this stream; reused by lines that lack one
    carried_search_info: Option<Vec<SearchEvent>>,
    finished: bool,
}

impl<R: BufRead> RecordStream<R> {
    /// Build a stream over any buffered reader. `path` is only used to label errors.
    pub fn new<P: Into<PathBuf>>(reader: R, path: P, mode: SchemaMode) -> Self {
        Self {
            reader,
            path: path.into(),
            mode,
            next_line: 0,
            buf: Vec::new(),
            carried_search_info: None,
            finished: false,
        }
    }

    pub fn mode(&self) -> SchemaMode {
        self.mode
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the next raw line, returning its index
    fn read_line(&mut self) -> Result<Option<usize>> {
        self.buf.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.buf)
            .map_err(|source| LoadError::Io {
                path: self.path.clone(),
                source,
            })?;
        if read == 0 {
            return Ok(None);
        }
        let index = self.next_line;
        self.next_line += 1;
        Ok(Some(index))
    }

    /// Bytes are decoded directly, so invalid UTF-8 surfaces as a decode error for this line
    fn decode_line(&self, line: usize) -> Result<Map<String, Value>> {
        let mut end = self.buf.len();
        while end > 0 && matches!(self.buf[end - 1], b'\n' | b'\r') {
            end -= 1;
        }
        let bytes = &self.buf[..end];
        trace!(target: "adapter", "line {}: {}", line, String::from_utf8_lossy(bytes));

        let value: Value =
            serde_json::from_slice(bytes).map_err(|source| self.decode_error(line, source))?;
        match value {
            Value::Object(obj) => Ok(obj),
            other => {
                let reason = format!(
                    "expected a JSON object per line, found {}",
                    json_type_name(&other)
                );
                Err(self.decode_error(line, serde_json::Error::custom(reason)))
            }
        }
    }

    fn decode_error(&self, line: usize, source: serde_json::Error) -> LoadError {
        LoadError::Decode {
            path: self.path.clone(),
            line,
            source,
        }
    }

    /// Decode and normalize one line; `None` means the line emits nothing
    fn process_line(&mut self, line: usize) -> Result<Option<Record>> {
        let obj = self.decode_line(line)?;
        let fields = FieldReader::root(&obj, &self.path, line);

        match self.mode {
            SchemaMode::Kb => kb_record(&fields).map(|r| Some(Record::Kb(r))),
            SchemaMode::Data => {
                if fields.contains("search_info") {
                    self.carried_search_info = Some(search_info(&fields)?);
                }

                let correct = fields.required("correct_sample")?;
                if !is_truthy(correct) {
                    trace!(target: "adapter", "line {} is not a correct sample, skipping", line);
                    return Ok(None);
                }

                let search_info = self.carried_search_info.clone().ok_or_else(|| {
                    LoadError::schema(
                        &self.path,
                        line,
                        "search_info",
                        "absent and no earlier line provided one",
                    )
                })?;

                dialogue_record(&fields, search_info).map(|r| Some(Record::Dialogue(r)))
            }
        }
    }
}

impl<R: BufRead> Iterator for RecordStream<R> {
    type Item = Result<(usize, Record)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let line = match self.read_line() {
                Ok(Some(line)) => line,
                Ok(None) => {
                    debug!(
                        target: "adapter",
                        "Finished {} after {} lines",
                        self.path.display(),
                        self.next_line
                    );
                    self.finished = true;
                    return None;
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            };

            match self.process_line(line) {
                Ok(Some(record)) => return Some(Ok((line, record))),
                Ok(None) => continue,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<R: BufRead> std::iter::FusedIterator for RecordStream<R> {}

fn kb_record(fields: &FieldReader<'_>) -> Result<KbRecord> {
    let kb = fields
        .objects("kb")?
        .iter()
        .map(kb_entry)
        .collect::<Result<Vec<_>>>()?;
    let reservation = fields.int("reservation")?;
    Ok(KbRecord { kb, reservation })
}

fn kb_entry(entry: &FieldReader<'_>) -> Result<KbEntry> {
    Ok(KbEntry {
        return_airport: entry.string("return_airport")?,
        airline: entry.string("airline")?,
        departure_day: entry.string("departure_day")?,
        departure_airport: entry.string("departure_airport")?,
        flight_number: entry.int("flight_number")?,
        departure_month: entry.string("departure_month")?,
        departure_time_num: entry.int("departure_time_num")?,
        class: entry.label("class")?,
        return_time_num: entry.int("return_time_num")?,
        return_month: entry.string("return_month")?,
        return_day: entry.string("return_day")?,
        num_connections: entry.label("num_connections")?,
        price: entry.int("price")?,
    })
}

fn search_info(fields: &FieldReader<'_>) -> Result<Vec<SearchEvent>> {
    fields
        .objects("search_info")?
        .iter()
        .map(|item| -> Result<SearchEvent> {
            let timestamp = if item.contains(SEARCH_TIMESTAMP_KEY) {
                item.int(SEARCH_TIMESTAMP_KEY)?
            } else if item.contains(SEARCH_TIMESTAMP_ALIAS) {
                item.int(SEARCH_TIMESTAMP_ALIAS)?
            } else {
                // Report the canonical key
                item.int(SEARCH_TIMESTAMP_KEY)?
            };
            Ok(SearchEvent {
                timestamp,
                button_name: item.string_or("button_name", "")?,
                field_name: item.string_or("field_name", "")?,
                field_value: item.string_or("field_value", "")?,
            })
        })
        .collect()
}

fn action(fields: &FieldReader<'_>, key: &str) -> Result<Action> {
    let action = fields.object(key)?;
    Ok(Action {
        status: action.label_or("status", ActionStatus::Book)?,
        name: action.string_or("name", "")?,
        flight: action.int_list_or_empty("flight")?,
    })
}

fn intent(fields: &FieldReader<'_>) -> Result<Intent> {
    let intent = fields.object("intent")?;
    Ok(Intent {
        return_month: intent.slot_string("return_month")?,
        return_day: intent.slot_int("return_day")?,
        max_price: intent.slot_int("max_price")?,
        departure_airport: intent.slot_string("departure_airport")?,
        departure_time: intent.slot_string("departure_time")?,
        max_connections: intent.slot_label("max_connections")?,
        departure_day: intent.slot_string("departure_day")?,
        goal: intent.slot_label("goal")?,
        departure_month: intent.slot_string("departure_month")?,
        name: intent.slot_string("name")?,
        return_airport: intent.slot_string("return_airport")?,
    })
}

fn dialogue_record(
    fields: &FieldReader<'_>,
    search_info: Vec<SearchEvent>,
) -> Result<DialogueRecord> {
    Ok(DialogueRecord {
        search_info,
        action: action(fields, "action")?,
        intent: intent(fields)?,
        timestamps: fields.int_list("timestamps")?,
        dialogue: fields.string_list("dialogue")?,
        expected_action: action(fields, "expected_action")?,
        correct_sample: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    fn stream(lines: &[Value], mode: SchemaMode) -> RecordStream<Cursor<String>> {
        let text: String = lines.iter().map(|l| format!("{}\n", l)).collect();
        RecordStream::new(Cursor::new(text), "memory.json", mode)
    }

    fn dialogue_line(correct: bool) -> Value {
        json!({
            "action": {"status": "book", "name": "Ann Lee", "flight": [1004]},
            "intent": {"goal": "book", "max_price": 500},
            "timestamps": [1, 2],
            "dialogue": ["customer: hi", "agent: hello"],
            "expected_action": {"status": "book", "name": "Ann Lee", "flight": [1004]},
            "correct_sample": correct,
            "search_info": []
        })
    }

    #[test]
    fn test_kb_line_is_projected() {
        let line = json!({"kb": [], "reservation": 0, "extra": "ignored"});
        let records: Vec<_> = stream(&[line], SchemaMode::Kb)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records.len(), 1);
        let (key, record) = &records[0];
        assert_eq!(*key, 0);
        assert_eq!(
            serde_json::to_value(record).unwrap(),
            json!({"kb": [], "reservation": 0})
        );
    }

    #[test]
    fn test_incorrect_samples_leave_gaps() {
        let lines = [dialogue_line(true), dialogue_line(false), dialogue_line(true)];
        let keys: Vec<usize> = stream(&lines, SchemaMode::Data)
            .map(|r| r.unwrap().0)
            .collect();
        assert_eq!(keys, vec![0, 2]);
    }

    #[test]
    fn test_missing_correct_sample_is_schema_error() {
        let mut line = dialogue_line(true);
        line.as_object_mut().unwrap().remove("correct_sample");
        let err = stream(&[line], SchemaMode::Data).next().unwrap().unwrap_err();
        assert_eq!(err.field(), Some("correct_sample"));
        assert_eq!(err.line(), Some(0));
    }

    #[test]
    fn test_required_keys_only_checked_on_emitted_lines() {
        let skipped = json!({"correct_sample": false, "search_info": []});
        let records: Vec<_> = stream(&[skipped], SchemaMode::Data).collect();
        assert!(records.is_empty());
    }

    #[test]
    fn test_search_info_without_prior_value_fails_on_emit() {
        let mut line = dialogue_line(true);
        line.as_object_mut().unwrap().remove("search_info");
        let err = stream(&[line], SchemaMode::Data).next().unwrap().unwrap_err();
        assert_eq!(err.field(), Some("search_info"));
    }

    #[test]
    fn test_search_timestamp_alias() {
        let mut line = dialogue_line(true);
        line["search_info"] = json!([
            {"timestmamp": 10, "button_name": "search"},
            {"timestamp": 11, "field_name": "price", "field_value": "500"}
        ]);
        let (_, record) = stream(&[line], SchemaMode::Data).next().unwrap().unwrap();
        let info = &record.as_dialogue().unwrap().search_info;
        assert_eq!(info[0].timestamp, 10);
        assert_eq!(info[0].field_name, "");
        assert_eq!(info[1].timestamp, 11);
        assert_eq!(info[1].button_name, "");
        assert_eq!(info[1].field_value, "500");
    }

    #[test]
    fn test_non_object_line_is_decode_error() {
        let err = stream(&[json!([1, 2])], SchemaMode::Kb)
            .next()
            .unwrap()
            .unwrap_err();
        assert!(err.is_decode());
        assert_eq!(err.line(), Some(0));
        assert!(err.to_string().contains("found array"));
    }

    #[test]
    fn test_invalid_utf8_is_decode_error_for_its_line() {
        let mut bytes = b"{\"kb\": [], \"reservation\": 1}\n".to_vec();
        bytes.extend_from_slice(b"{\"kb\": \"\xff\"}\n");
        let mut records = RecordStream::new(Cursor::new(bytes), "memory.json", SchemaMode::Kb);

        assert!(records.next().unwrap().is_ok());
        let err = records.next().unwrap().unwrap_err();
        assert!(err.is_decode());
        assert_eq!(err.line(), Some(1));
        assert!(err.to_string().contains("memory.json"));
        assert!(records.next().is_none());
    }

    #[test]
    fn test_stream_is_fused_after_error() {
        let text = "not json\n{\"kb\": [], \"reservation\": 1}\n".to_string();
        let mut records = RecordStream::new(Cursor::new(text), "memory.json", SchemaMode::Kb);
        let err = records.next().unwrap().unwrap_err();
        assert!(err.is_decode());
        assert!(records.next().is_none());
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = "{\"kb\": [], \"reservation\": 9}\r\n".to_string();
        let mut records = RecordStream::new(Cursor::new(text), "memory.json", SchemaMode::Kb);
        let (_, record) = records.next().unwrap().unwrap();
        assert_eq!(record.as_kb().unwrap().reservation, 9);
    }

    #[test]
    fn test_open_missing_file_is_io_error() {
        let err = open("/definitely/not/here/train_kb.json", SchemaMode::Kb)
            .err()
            .unwrap();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
