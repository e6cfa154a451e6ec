use crate::file::error::FileError;
use model::core::document::Document;
use serde_json::Value;
use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Lines, Write},
    path::Path,
};
use tracing::debug;

/// Streams documents out of newline-delimited JSON, one object per line.
///
/// Blank lines are skipped. Line numbers in errors are 1-based and count
/// blank lines, so they match what an editor shows.
pub struct JsonlReader<R: BufRead> {
    lines: Lines<R>,
    line_no: usize,
}

impl JsonlReader<BufReader<File>> {
    pub fn open(path: &str) -> Result<Self, FileError> {
        let file = File::open(path).map_err(|err| FileError::from_open(path, err))?;
        debug!("Opened {} for reading", path);
        Ok(JsonlReader::new(BufReader::new(file)))
    }
}

impl<R: BufRead> JsonlReader<R> {
    pub fn new(reader: R) -> Self {
        JsonlReader {
            lines: reader.lines(),
            line_no: 0,
        }
    }

    /// Number of lines consumed so far.
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    fn parse_line(&self, line: &str) -> Result<Document, FileError> {
        let value: Value = serde_json::from_str(line).map_err(|source| FileError::Malformed {
            line: self.line_no,
            source,
        })?;
        Document::try_from(value).map_err(|_| FileError::NotAnObject { line: self.line_no })
    }
}

impl<R: BufRead> Iterator for JsonlReader<R> {
    type Item = Result<Document, FileError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(FileError::IoError(err))),
            };
            self.line_no += 1;

            if line.trim().is_empty() {
                continue;
            }
            return Some(self.parse_line(&line));
        }
    }
}

/// Writes documents as newline-delimited JSON.
///
/// Output is buffered; call [`JsonlWriter::finish`] to flush. Dropping the
/// writer on an error path still closes the underlying handle.
pub struct JsonlWriter<W: Write> {
    inner: BufWriter<W>,
    written: u64,
}

impl JsonlWriter<File> {
    /// Creates (or truncates) `path`, creating missing parent directories.
    pub fn create(path: &str) -> Result<Self, FileError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path).map_err(|err| FileError::from_open(path, err))?;
        debug!("Opened {} for writing", path);
        Ok(JsonlWriter::new(file))
    }
}

impl<W: Write> JsonlWriter<W> {
    pub fn new(writer: W) -> Self {
        JsonlWriter {
            inner: BufWriter::new(writer),
            written: 0,
        }
    }

    pub fn write(&mut self, doc: &Document) -> Result<(), FileError> {
        serde_json::to_writer(&mut self.inner, doc).map_err(FileError::Serialize)?;
        self.inner.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Documents written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flushes buffered output and hands back the underlying writer.
    pub fn finish(self) -> Result<W, FileError> {
        self.inner
            .into_inner()
            .map_err(|err| FileError::IoError(err.into_error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;
    use tempfile::NamedTempFile;

    fn doc(id: &str) -> Document {
        [("id", json!(id)), ("_version_", json!(1))].into_iter().collect()
    }

    #[test]
    fn test_writes_one_object_per_line() {
        let mut writer = JsonlWriter::new(Vec::new());
        writer.write(&doc("a")).unwrap();
        writer.write(&doc("b")).unwrap();
        assert_eq!(writer.written(), 2);

        let out = String::from_utf8(writer.finish().unwrap()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(out.ends_with('\n'));
        assert_eq!(lines[0], r#"{"id":"a","_version_":1}"#);
    }

    #[test]
    fn test_reader_skips_blank_lines() {
        let input = "{\"id\":\"a\"}\n\n   \n{\"id\":\"b\"}\n";
        let docs: Vec<Document> = JsonlReader::new(Cursor::new(input))
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].get("id"), Some(&json!("b")));
    }

    #[test]
    fn test_reader_reports_line_of_malformed_input() {
        let input = "{\"id\":\"a\"}\n\n{\"id\": oops}\n";
        let err = JsonlReader::new(Cursor::new(input))
            .find_map(Result::err)
            .unwrap();

        assert!(matches!(err, FileError::Malformed { line: 3, .. }));
    }

    #[test]
    fn test_reader_rejects_non_object_lines() {
        let err = JsonlReader::new(Cursor::new("[1,2,3]\n"))
            .next()
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, FileError::NotAnObject { line: 1 }));
    }

    #[test]
    fn test_file_round_trip() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap().to_string();

        let mut writer = JsonlWriter::create(&path).unwrap();
        writer.write(&doc("x")).unwrap();
        writer.finish().unwrap();

        let docs: Vec<Document> = JsonlReader::open(&path)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(docs, vec![doc("x")]);
    }

    #[test]
    fn test_create_makes_parent_directories() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("out.jsonl");

        JsonlWriter::create(path.to_str().unwrap())
            .unwrap()
            .finish()
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_open_missing_file() {
        let err = JsonlReader::open("/definitely/not/here.jsonl").err().unwrap();
        assert!(matches!(err, FileError::NotFound(_)));
    }
}
