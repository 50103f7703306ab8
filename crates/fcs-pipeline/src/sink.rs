//! Ordered, record-at-a-time delivery of ranked offers.

use std::io::Write;

use async_trait::async_trait;
use fcs_core::OfferRecord;
use thiserror::Error;
use tokio::sync::mpsc;

pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("writing offer record: {0}")]
    Io(#[from] std::io::Error),
    #[error("serializing offer record: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("emission task failed: {0}")]
    Emitter(String),
}

/// Receives offers in their final order. Implementations must not reorder.
#[async_trait]
pub trait ResultSink: Send {
    async fn push(&mut self, record: OfferRecord) -> Result<(), SinkError>;

    async fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Writes one compact JSON object per line.
#[derive(Debug)]
pub struct JsonLinesSink<W> {
    writer: W,
    written: usize,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W: Write + Send> ResultSink for JsonLinesSink<W> {
    async fn push(&mut self, record: OfferRecord) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, record.as_json())?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Collects records in memory.
#[derive(Debug, Default)]
pub struct VecSink {
    pub records: Vec<OfferRecord>,
    pub finished: bool,
}

#[async_trait]
impl ResultSink for VecSink {
    async fn push(&mut self, record: OfferRecord) -> Result<(), SinkError> {
        self.records.push(record);
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), SinkError> {
        self.finished = true;
        Ok(())
    }
}

/// Feed `records` through a bounded channel into `sink`, one at a time and in
/// order. Returns how many records the sink accepted.
pub async fn emit_ordered<S>(records: Vec<OfferRecord>, sink: &mut S, capacity: usize) -> Result<usize, SinkError>
where
    S: ResultSink + ?Sized,
{
    let (tx, mut rx) = mpsc::channel(capacity.max(1));
    let producer = tokio::spawn(async move {
        for record in records {
            if tx.send(record).await.is_err() {
                break;
            }
        }
    });

    let mut emitted = 0usize;
    while let Some(record) = rx.recv().await {
        sink.push(record).await?;
        emitted += 1;
    }
    producer.await.map_err(|e| SinkError::Emitter(e.to_string()))?;
    Ok(emitted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(n: usize) -> Vec<OfferRecord> {
        (0..n).map(|i| OfferRecord::new(json!({ "seq": i }))).collect()
    }

    #[tokio::test]
    async fn emission_preserves_order_through_a_small_channel() {
        let mut sink = VecSink::default();
        let emitted = emit_ordered(records(25), &mut sink, 2).await.unwrap();
        assert_eq!(emitted, 25);
        let seqs: Vec<u64> = sink
            .records
            .iter()
            .map(|r| r.as_json()["seq"].as_u64().unwrap())
            .collect();
        assert_eq!(seqs, (0..25).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn json_lines_sink_writes_one_object_per_line() {
        let mut sink = JsonLinesSink::new(Vec::new());
        emit_ordered(records(3), &mut sink, DEFAULT_CHANNEL_CAPACITY).await.unwrap();
        sink.finish().await.unwrap();
        assert_eq!(sink.written(), 3);
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text, "{\"seq\":0}\n{\"seq\":1}\n{\"seq\":2}\n");
    }

    #[tokio::test]
    async fn empty_batch_emits_nothing() {
        let mut sink = VecSink::default();
        assert_eq!(emit_ordered(Vec::new(), &mut sink, 0).await.unwrap(), 0);
        assert!(sink.records.is_empty());
    }

    struct FailingSink {
        accepted: usize,
    }

    #[async_trait]
    impl ResultSink for FailingSink {
        async fn push(&mut self, _record: OfferRecord) -> Result<(), SinkError> {
            if self.accepted == 2 {
                return Err(SinkError::Io(std::io::Error::other("disk full")));
            }
            self.accepted += 1;
            Ok(())
        }
    }

    #[tokio::test]
    async fn sink_failure_stops_emission() {
        let mut sink = FailingSink { accepted: 0 };
        let err = emit_ordered(records(10), &mut sink, 1).await.unwrap_err();
        assert!(matches!(err, SinkError::Io(_)));
        assert_eq!(sink.accepted, 2);
    }
}
