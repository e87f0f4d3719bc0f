//! Document ingestion
//!
//! Embeds chunked text in batches and writes the vectors to the index.

use crate::embeddings::Embedder;
use crate::retriever::VectorIndex;
use crate::types::{RagError, RagResult, TextChunk, VectorRecord};
use scholarly_core::{log_operation_start, log_operation_success};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// Inputs per embedding request and vectors per upsert request
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Progress notification emitted after each stage of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestProgress {
    Embedded { done: usize, total: usize },
    Upserted { done: usize, total: usize },
}

/// Summary of a finished ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub chunks: usize,
    pub vectors_upserted: usize,
    pub batches: usize,
}

/// Vector identifier for the chunk at `index`
pub fn chunk_id(index: usize) -> String {
    format!("chunk_{}", index)
}

/// Writes chunked documents into a vector index
pub struct Ingestor {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    batch_size: usize,
}

impl Ingestor {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self {
            embedder,
            index,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Embed every chunk, then upsert the vectors with their metadata.
    ///
    /// Each vector stores the chunk text, index, offsets and `source`.
    pub async fn ingest(
        &self,
        chunks: &[TextChunk],
        source: &str,
        progress: &(dyn Fn(IngestProgress) + Send + Sync),
    ) -> RagResult<IngestStats> {
        log_operation_start!("ingest", chunks = chunks.len(), source = source);

        let total = chunks.len();
        let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(total);

        for batch in chunks.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let embedded = self.embedder.embed(&texts).await?;
            if embedded.len() != texts.len() {
                return Err(RagError::Ingestion(format!(
                    "embedder returned {} vectors for {} chunks",
                    embedded.len(),
                    texts.len()
                )));
            }
            vectors.extend(embedded);
            progress(IngestProgress::Embedded {
                done: vectors.len(),
                total,
            });
        }

        if let (Some(expected), Some(actual)) =
            (self.embedder.dimension(), vectors.first().map(Vec::len))
        {
            if expected != actual {
                return Err(RagError::Ingestion(format!(
                    "embedding dimension {} does not match index dimension {}",
                    actual, expected
                )));
            }
        }

        let records: Vec<VectorRecord> = chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, values)| VectorRecord {
                id: chunk_id(chunk.chunk_index),
                values,
                metadata: chunk_metadata(chunk, source),
            })
            .collect();

        let mut stats = IngestStats {
            chunks: total,
            ..IngestStats::default()
        };
        let mut sent = 0;

        for batch in records.chunks(self.batch_size) {
            stats.vectors_upserted += self.index.upsert(batch).await?;
            stats.batches += 1;
            sent += batch.len();
            debug!(batch = stats.batches, size = batch.len(), "Upserted batch");
            progress(IngestProgress::Upserted { done: sent, total });
        }

        log_operation_success!(
            "ingest",
            vectors = stats.vectors_upserted,
            batches = stats.batches
        );

        Ok(stats)
    }
}

fn chunk_metadata(chunk: &TextChunk, source: &str) -> Map<String, Value> {
    let mut metadata = Map::new();
    metadata.insert("text".to_string(), Value::from(chunk.text.clone()));
    metadata.insert("chunk_index".to_string(), Value::from(chunk.chunk_index));
    metadata.insert("start".to_string(), Value::from(chunk.start));
    metadata.insert("end".to_string(), Value::from(chunk.end));
    metadata.insert("source".to_string(), Value::from(source));
    metadata
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RetrievedChunk;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct CountingEmbedder {
        batch_sizes: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        async fn embed(&self, inputs: &[String]) -> RagResult<Vec<Vec<f32>>> {
            self.batch_sizes.lock().unwrap().push(inputs.len());
            Ok(inputs.iter().map(|_| vec![0.5; 4]).collect())
        }

        fn dimension(&self) -> Option<usize> {
            Some(4)
        }
    }

    #[derive(Default)]
    struct RecordingIndex {
        upserts: Mutex<Vec<Vec<VectorRecord>>>,
    }

    #[async_trait]
    impl VectorIndex for RecordingIndex {
        async fn query(&self, _vector: &[f32], _top_k: usize) -> RagResult<Vec<RetrievedChunk>> {
            Ok(Vec::new())
        }

        async fn upsert(&self, records: &[VectorRecord]) -> RagResult<usize> {
            self.upserts.lock().unwrap().push(records.to_vec());
            Ok(records.len())
        }
    }

    fn chunks(n: usize) -> Vec<TextChunk> {
        (0..n)
            .map(|i| TextChunk {
                text: format!("passage {}", i),
                chunk_index: i,
                start: i * 800,
                end: i * 800 + 1000,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_ingest_batches_by_hundred() {
        let embedder = Arc::new(CountingEmbedder {
            batch_sizes: Mutex::new(Vec::new()),
        });
        let index = Arc::new(RecordingIndex::default());
        let ingestor = Ingestor::new(embedder.clone(), index.clone());

        let events = Mutex::new(Vec::new());
        let stats = ingestor
            .ingest(&chunks(250), "thesis.pdf", &|event: IngestProgress| {
                events.lock().unwrap().push(event)
            })
            .await
            .unwrap();

        assert_eq!(stats.chunks, 250);
        assert_eq!(stats.vectors_upserted, 250);
        assert_eq!(stats.batches, 3);
        assert_eq!(*embedder.batch_sizes.lock().unwrap(), vec![100, 100, 50]);

        let upserts = index.upserts.lock().unwrap();
        let sizes: Vec<usize> = upserts.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![100, 100, 50]);

        let first = &upserts[0][0];
        assert_eq!(first.id, "chunk_0");
        assert_eq!(first.metadata["text"], "passage 0");
        assert_eq!(first.metadata["source"], "thesis.pdf");
        assert_eq!(first.metadata["end"], 1000);
        assert_eq!(upserts[2][49].id, "chunk_249");

        assert_eq!(
            events.lock().unwrap().last(),
            Some(&IngestProgress::Upserted {
                done: 250,
                total: 250
            })
        );
    }

    #[tokio::test]
    async fn test_dimension_mismatch_aborts_before_upsert() {
        struct WrongSize;

        #[async_trait]
        impl Embedder for WrongSize {
            async fn embed(&self, inputs: &[String]) -> RagResult<Vec<Vec<f32>>> {
                Ok(inputs.iter().map(|_| vec![0.0; 3]).collect())
            }

            fn dimension(&self) -> Option<usize> {
                Some(1024)
            }
        }

        let index = Arc::new(RecordingIndex::default());
        let ingestor = Ingestor::new(Arc::new(WrongSize), index.clone());

        let err = ingestor.ingest(&chunks(2), "notes.md", &|_: IngestProgress| {}).await.unwrap_err();
        assert!(matches!(err, RagError::Ingestion(_)));
        assert!(index.upserts.lock().unwrap().is_empty());
    }
}
