#[cfg(test)]
mod tests;

use super::{ChunkMetadata, EmbeddingRecord};
use crate::{CorpusError, config::Config};
use arrow::array::{Array, FixedSizeListArray, Float32Array, RecordBatchIterator, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use lancedb::{
    Connection,
    query::{ExecutableQuery, QueryBase},
};
use std::sync::Arc;
use tracing::{debug, info};

const TABLE_NAME: &str = "chunks";

/// Persisted vector index over document chunks, backed by LanceDB. The index
/// directory is written and read only through LanceDB's own routines.
pub struct VectorStore {
    connection: Connection,
    dimension: usize,
}

/// One retrieval hit: a stored chunk with its similarity to the query.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub chunk: ChunkMetadata,
    pub similarity_score: f32,
    pub distance: f32,
}

impl VectorStore {
    /// Open (or create) the vector store under the configured base directory.
    /// The vector dimension is fixed by the embedding configuration.
    #[inline]
    pub async fn new(config: &Config) -> Result<Self, CorpusError> {
        let db_path = config.vector_db_path();
        debug!("Opening LanceDB index at {:?}", db_path);

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CorpusError::Index(format!("Failed to create index directory: {}", e))
            })?;
        }

        let uri = format!("file://{}", db_path.display());
        let connection = lancedb::connect(&uri)
            .execute()
            .await
            .map_err(|e| CorpusError::Index(format!("Failed to connect to LanceDB: {}", e)))?;

        let store = Self {
            connection,
            dimension: config.ollama.embedding_dimension as usize,
        };

        store.initialize_table().await?;

        Ok(store)
    }

    async fn initialize_table(&self) -> Result<(), CorpusError> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| CorpusError::Index(format!("Failed to list tables: {}", e)))?;

        if table_names.contains(&TABLE_NAME.to_string()) {
            return Ok(());
        }

        self.connection
            .create_empty_table(TABLE_NAME, self.schema())
            .execute()
            .await
            .map_err(|e| CorpusError::Index(format!("Failed to create chunks table: {}", e)))?;

        info!(
            "Created chunks table with {} vector dimensions",
            self.dimension
        );
        Ok(())
    }

    fn schema(&self) -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new(
                "vector",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, false)),
                    self.dimension as i32,
                ),
                false,
            ),
            Field::new("source_file", DataType::Utf8, false),
            Field::new("page", DataType::UInt32, true),
            Field::new("chunk_index", DataType::UInt32, false),
            Field::new("content", DataType::Utf8, false),
            Field::new("created_at", DataType::Utf8, false),
        ]))
    }

    /// Store a batch of embedded chunks. All vectors must match the
    /// configured embedding dimension.
    #[inline]
    pub async fn store_batch(&self, records: Vec<EmbeddingRecord>) -> Result<(), CorpusError> {
        if records.is_empty() {
            debug!("No embeddings to store");
            return Ok(());
        }

        for record in &records {
            if record.vector.len() != self.dimension {
                return Err(CorpusError::Index(format!(
                    "Embedding dimension mismatch: expected {}, got {}",
                    self.dimension,
                    record.vector.len()
                )));
            }
        }

        debug!("Storing batch of {} embeddings", records.len());

        let record_batch = self.create_record_batch(&records)?;

        let table = self.open_table().await?;
        let schema = record_batch.schema();
        let reader = RecordBatchIterator::new(std::iter::once(Ok(record_batch)), schema);
        table
            .add(reader)
            .execute()
            .await
            .map_err(|e| CorpusError::Index(format!("Failed to insert embeddings: {}", e)))?;

        info!("Stored {} embeddings", records.len());
        Ok(())
    }

    fn create_record_batch(&self, records: &[EmbeddingRecord]) -> Result<RecordBatch, CorpusError> {
        let len = records.len();

        let mut ids = Vec::with_capacity(len);
        let mut flat_values = Vec::with_capacity(len * self.dimension);
        let mut source_files = Vec::with_capacity(len);
        let mut pages = Vec::with_capacity(len);
        let mut chunk_indices = Vec::with_capacity(len);
        let mut contents = Vec::with_capacity(len);
        let mut created_ats = Vec::with_capacity(len);

        for record in records {
            ids.push(record.id.as_str());
            flat_values.extend_from_slice(&record.vector);
            source_files.push(record.metadata.source_file.as_str());
            pages.push(record.metadata.page);
            chunk_indices.push(record.metadata.chunk_index);
            contents.push(record.metadata.content.as_str());
            created_ats.push(record.metadata.created_at.as_str());
        }

        let values_array = Float32Array::from(flat_values);
        let field = Arc::new(Field::new("item", DataType::Float32, false));
        let vector_array = FixedSizeListArray::try_new(
            field,
            self.dimension as i32,
            Arc::new(values_array),
            None,
        )
        .map_err(|e| CorpusError::Index(format!("Failed to create vector array: {}", e)))?;

        let arrays: Vec<Arc<dyn arrow::array::Array>> = vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(vector_array),
            Arc::new(StringArray::from(source_files)),
            Arc::new(UInt32Array::from(pages)),
            Arc::new(UInt32Array::from(chunk_indices)),
            Arc::new(StringArray::from(contents)),
            Arc::new(StringArray::from(created_ats)),
        ];

        RecordBatch::try_new(self.schema(), arrays)
            .map_err(|e| CorpusError::Index(format!("Failed to create record batch: {}", e)))
    }

    /// Search for the `limit` chunks nearest to the query vector.
    #[inline]
    pub async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>, CorpusError> {
        debug!("Searching for similar vectors with limit: {}", limit);

        let table = self.open_table().await?;

        let results = table
            .vector_search(query_vector)
            .map_err(|e| CorpusError::Index(format!("Failed to create vector search: {}", e)))?
            .column("vector")
            .limit(limit)
            .execute()
            .await
            .map_err(|e| CorpusError::Index(format!("Failed to execute search: {}", e)))?;

        self.parse_search_results_stream(results).await
    }

    async fn parse_search_results_stream(
        &self,
        mut results: lancedb::arrow::SendableRecordBatchStream,
    ) -> Result<Vec<SearchResult>, CorpusError> {
        let mut search_results = Vec::new();

        while let Some(batch) = results
            .try_next()
            .await
            .map_err(|e| CorpusError::Index(format!("Failed to read result stream: {}", e)))?
        {
            search_results.extend(self.parse_search_batch(&batch)?);
        }

        debug!("Parsed {} search results", search_results.len());
        Ok(search_results)
    }

    fn parse_search_batch(&self, batch: &RecordBatch) -> Result<Vec<SearchResult>, CorpusError> {
        let num_rows = batch.num_rows();

        let source_files = string_column(batch, "source_file")?;
        let contents = string_column(batch, "content")?;
        let created_ats = string_column(batch, "created_at")?;

        let pages = batch
            .column_by_name("page")
            .ok_or_else(|| CorpusError::Index("Missing page column".to_string()))?
            .as_any()
            .downcast_ref::<UInt32Array>()
            .ok_or_else(|| CorpusError::Index("Invalid page column type".to_string()))?;

        let chunk_indices = batch
            .column_by_name("chunk_index")
            .ok_or_else(|| CorpusError::Index("Missing chunk_index column".to_string()))?
            .as_any()
            .downcast_ref::<UInt32Array>()
            .ok_or_else(|| CorpusError::Index("Invalid chunk_index column type".to_string()))?;

        let distances = batch
            .column_by_name("_distance")
            .map(|col| col.as_any().downcast_ref::<Float32Array>());

        let mut search_results = Vec::with_capacity(num_rows);

        for row in 0..num_rows {
            let chunk = ChunkMetadata {
                source_file: source_files.value(row).to_string(),
                page: if pages.is_null(row) {
                    None
                } else {
                    Some(pages.value(row))
                },
                chunk_index: chunk_indices.value(row),
                content: contents.value(row).to_string(),
                created_at: created_ats.value(row).to_string(),
            };

            let distance = distances
                .flatten()
                .map_or(0.0, |d| if d.is_null(row) { 0.0 } else { d.value(row) });

            search_results.push(SearchResult {
                chunk,
                similarity_score: 1.0 - distance,
                distance,
            });
        }

        Ok(search_results)
    }

    /// Number of chunks currently stored. A freshly created store reports 0;
    /// any positive count means a persisted index exists.
    #[inline]
    pub async fn count_chunks(&self) -> Result<u64, CorpusError> {
        let table = self.open_table().await?;

        let count = table
            .count_rows(None)
            .await
            .map_err(|e| CorpusError::Index(format!("Failed to count rows: {}", e)))?;

        Ok(count as u64)
    }

    /// Drop every stored chunk, leaving an empty table ready for a rebuild.
    #[inline]
    pub async fn clear(&self) -> Result<(), CorpusError> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| CorpusError::Index(format!("Failed to list tables: {}", e)))?;

        if table_names.contains(&TABLE_NAME.to_string()) {
            info!("Dropping existing chunks table");
            self.connection
                .drop_table(TABLE_NAME)
                .await
                .map_err(|e| CorpusError::Index(format!("Failed to drop table: {}", e)))?;
        }

        self.initialize_table().await
    }

    async fn open_table(&self) -> Result<lancedb::Table, CorpusError> {
        self.connection
            .open_table(TABLE_NAME)
            .execute()
            .await
            .map_err(|e| CorpusError::Index(format!("Failed to open chunks table: {}", e)))
    }
}

fn string_column<'a>(
    batch: &'a RecordBatch,
    name: &str,
) -> Result<&'a StringArray, CorpusError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| CorpusError::Index(format!("Missing {} column", name)))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| CorpusError::Index(format!("Invalid {} column type", name)))
}
