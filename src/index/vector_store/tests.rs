use super::*;
use tempfile::TempDir;

fn test_config(temp_dir: &TempDir, dimension: u32) -> Config {
    Config {
        base_dir: temp_dir.path().to_path_buf(),
        ollama: crate::config::OllamaConfig {
            embedding_dimension: dimension,
            ..crate::config::OllamaConfig::default()
        },
        ..Config::default()
    }
}

fn record(id: &str, vector: Vec<f32>, content: &str) -> EmbeddingRecord {
    EmbeddingRecord {
        id: id.to_string(),
        vector,
        metadata: ChunkMetadata {
            source_file: "notes.txt".to_string(),
            page: None,
            chunk_index: 0,
            content: content.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        },
    }
}

#[tokio::test]
async fn new_store_is_empty() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = test_config(&temp_dir, 4);

    let store = VectorStore::new(&config).await.expect("should open store");
    assert_eq!(store.count_chunks().await.expect("should count"), 0);
}

#[tokio::test]
async fn store_and_count() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = test_config(&temp_dir, 4);

    let store = VectorStore::new(&config).await.expect("should open store");
    store
        .store_batch(vec![
            record("1", vec![1.0, 0.0, 0.0, 0.0], "first"),
            record("2", vec![0.0, 1.0, 0.0, 0.0], "second"),
        ])
        .await
        .expect("should store batch");

    assert_eq!(store.count_chunks().await.expect("should count"), 2);
}

#[tokio::test]
async fn rejects_dimension_mismatch() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = test_config(&temp_dir, 4);

    let store = VectorStore::new(&config).await.expect("should open store");
    let result = store
        .store_batch(vec![record("1", vec![1.0, 0.0], "short vector")])
        .await;

    assert!(matches!(result, Err(CorpusError::Index(_))));
}

#[tokio::test]
async fn search_orders_by_similarity() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = test_config(&temp_dir, 4);

    let store = VectorStore::new(&config).await.expect("should open store");
    store
        .store_batch(vec![
            record("1", vec![1.0, 0.0, 0.0, 0.0], "x axis"),
            record("2", vec![0.0, 1.0, 0.0, 0.0], "y axis"),
            record("3", vec![0.9, 0.1, 0.0, 0.0], "near x"),
        ])
        .await
        .expect("should store batch");

    let results = store
        .search(&[1.0, 0.0, 0.0, 0.0], 2)
        .await
        .expect("should search");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].chunk.content, "x axis");
    assert_eq!(results[1].chunk.content, "near x");
    assert!(results[0].distance <= results[1].distance);
}

#[tokio::test]
async fn clear_empties_the_store() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = test_config(&temp_dir, 4);

    let store = VectorStore::new(&config).await.expect("should open store");
    store
        .store_batch(vec![record("1", vec![1.0, 0.0, 0.0, 0.0], "first")])
        .await
        .expect("should store batch");
    assert_eq!(store.count_chunks().await.expect("should count"), 1);

    store.clear().await.expect("should clear");
    assert_eq!(store.count_chunks().await.expect("should count"), 0);

    let results = store
        .search(&[1.0, 0.0, 0.0, 0.0], 5)
        .await
        .expect("should search empty store");
    assert!(results.is_empty());
}

#[tokio::test]
async fn page_provenance_round_trips() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = test_config(&temp_dir, 4);

    let store = VectorStore::new(&config).await.expect("should open store");
    let mut pdf_record = record("1", vec![0.5, 0.5, 0.0, 0.0], "from a pdf page");
    pdf_record.metadata.source_file = "thesis.pdf".to_string();
    pdf_record.metadata.page = Some(12);
    pdf_record.metadata.chunk_index = 7;

    store
        .store_batch(vec![pdf_record])
        .await
        .expect("should store batch");

    let results = store
        .search(&[0.5, 0.5, 0.0, 0.0], 1)
        .await
        .expect("should search");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].chunk.source_file, "thesis.pdf");
    assert_eq!(results[0].chunk.page, Some(12));
    assert_eq!(results[0].chunk.chunk_index, 7);
    assert_eq!(results[0].chunk.content, "from a pdf page");
}
