//! Observational output of the classifier, consumed by external plotting.
//! Nothing emitted here feeds back into a decision.

use log::warn;
use serde::Serialize;
use std::io::{self, Write};

use crate::analysis::stationarity::Transform;
use crate::analysis::transforms::RollingStats;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticRecord {
    Rolling { series: String, stage: Transform, values: Vec<f64>, stats: RollingStats },
    Correlogram { series: String, stage: Transform, acf: Vec<f64>, pacf: Vec<f64> },
}

pub trait DiagnosticSink {
    fn emit(&mut self, record: DiagnosticRecord);
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&mut self, _record: DiagnosticRecord) {}
}

#[derive(Debug, Default)]
pub struct CollectingSink {
    pub records: Vec<DiagnosticRecord>,
}

impl DiagnosticSink for CollectingSink {
    fn emit(&mut self, record: DiagnosticRecord) {
        self.records.push(record);
    }
}

/// One JSON object per line. The first write failure is kept and every later
/// record is dropped; [`JsonLinesSink::finish`] reports it.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    error: Option<io::Error>,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, error: None }
    }

    /// Flushes the writer and hands it back, or returns the first write error.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> DiagnosticSink for JsonLinesSink<W> {
    fn emit(&mut self, record: DiagnosticRecord) {
        if self.error.is_some() {
            return;
        }
        let result = serde_json::to_writer(&mut self.writer, &record)
            .map_err(io::Error::from)
            .and_then(|()| self.writer.write_all(b"\n"));
        if let Err(e) = result {
            warn!("diagnostic output failed, dropping further records: {}", e);
            self.error = Some(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_lines() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.emit(DiagnosticRecord::Correlogram {
            series: "record-000000/num_rev".to_string(),
            stage: Transform::Difference,
            acf: vec![1.0, 0.5],
            pacf: vec![1.0, 0.5],
        });
        let text = String::from_utf8(sink.finish().unwrap()).unwrap();
        assert!(text.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(value["kind"], "correlogram");
        assert_eq!(value["stage"], "difference");
    }

    /// Accepts `budget` bytes, then fails every write.
    struct FullDisk {
        budget: usize,
    }

    impl Write for FullDisk {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "no space left on device"));
            }
            let n = buf.len().min(self.budget);
            self.budget -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_surfaces_on_finish() {
        let mut sink = JsonLinesSink::new(FullDisk { budget: 8 });
        for _ in 0..3 {
            sink.emit(DiagnosticRecord::Correlogram {
                series: "record-000001/size_rev".to_string(),
                stage: Transform::None,
                acf: vec![1.0],
                pacf: vec![1.0],
            });
        }
        let err = sink.finish().err().expect("write error kept");
        assert_eq!(err.to_string(), "no space left on device");
    }
}
