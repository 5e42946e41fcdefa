use crate::error::StoreError;
use crate::models::IngestionBundle;
use async_trait::async_trait;
use elasticsearch::{indices::IndicesCreateParts, Elasticsearch, IndexParts, SearchParts};
use log::{debug, error, info};
use serde::Serialize;
use serde_json::{json, Value};

/// Keeps one document per harvest run.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Stores the bundle as a new document and returns its id.
    async fn insert_bundle(&self, bundle: &IngestionBundle) -> Result<String, StoreError>;

    /// Every stored bundle document, newest first.
    async fn scan_bundles(&self) -> Result<Vec<Value>, StoreError>;
}

const SCAN_PAGE_SIZE: usize = 1000;

#[derive(Serialize)]
struct BundleDocument<'a> {
    harvested_at: String,
    #[serde(flatten)]
    bundle: &'a IngestionBundle,
}

#[derive(Clone)]
pub struct ElasticBundleStore {
    client: Elasticsearch,
    index: String,
}

impl ElasticBundleStore {
    pub fn new(client: Elasticsearch, index: impl Into<String>) -> Self {
        ElasticBundleStore {
            client,
            index: index.into(),
        }
    }

    pub async fn ensure_index(&self) -> Result<(), StoreError> {
        let create_index_body = json!({
            "mappings": {
                "properties": {
                    "harvested_at": { "type": "date" },
                    "channel": {
                        "properties": {
                            "channel_id": { "type": "keyword" },
                            "playlist_id": { "type": "keyword" }
                        }
                    }
                }
            }
        });

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&self.index))
            .body(create_index_body)
            .send()
            .await?;

        if response.status_code().is_success() {
            info!("Elasticsearch index '{}' created.", self.index);
            return Ok(());
        }

        let status = response.status_code().as_u16();
        let response_text = response.text().await.unwrap_or_default();
        if response_text.contains("resource_already_exists_exception") {
            info!("Elasticsearch index '{}' already exists.", self.index);
            Ok(())
        } else {
            error!("Failed to create Elasticsearch index: {response_text}");
            Err(StoreError::DocumentRejected {
                status,
                body: response_text,
            })
        }
    }
}

#[async_trait]
impl DocumentSink for ElasticBundleStore {
    async fn insert_bundle(&self, bundle: &IngestionBundle) -> Result<String, StoreError> {
        let document = BundleDocument {
            harvested_at: chrono::Utc::now().to_rfc3339(),
            bundle,
        };

        // No explicit id: every run becomes a new document.
        let response = self
            .client
            .index(IndexParts::Index(&self.index))
            .body(serde_json::to_value(&document)?)
            .send()
            .await?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                "Failed to index bundle for channel {}: {body}",
                bundle.channel.channel_id
            );
            return Err(StoreError::DocumentRejected {
                status: status.as_u16(),
                body,
            });
        }

        let json_response: Value = response.json().await?;
        let id = json_response["_id"].as_str().unwrap_or_default().to_string();
        info!(
            "Bundle for channel {} saved to Elasticsearch as {id}",
            bundle.channel.channel_id
        );
        Ok(id)
    }

    async fn scan_bundles(&self) -> Result<Vec<Value>, StoreError> {
        let mut bundles = Vec::new();
        let mut cursor: Option<Value> = None;

        loop {
            let response = self
                .client
                .search(SearchParts::Index(&[self.index.as_str()]))
                .body(scan_page_body(cursor.as_ref()))
                .send()
                .await?;

            let status = response.status_code();
            if !status.is_success() {
                return Err(StoreError::DocumentRejected {
                    status: status.as_u16(),
                    body: response.text().await.unwrap_or_default(),
                });
            }

            let json_response: Value = response.json().await?;
            let hits = json_response["hits"]["hits"]
                .as_array()
                .cloned()
                .unwrap_or_default();

            for hit in &hits {
                if let Some(source) = hit.get("_source") {
                    bundles.push(source.clone());
                }
            }
            debug!("Scanned {} bundle documents so far", bundles.len());

            match next_cursor(&hits) {
                Some(sort) if hits.len() == SCAN_PAGE_SIZE => cursor = Some(sort),
                _ => break,
            }
        }

        Ok(bundles)
    }
}

/// One page of the newest-first scan, continuing after `cursor` when given.
fn scan_page_body(cursor: Option<&Value>) -> Value {
    let mut body = json!({
        "size": SCAN_PAGE_SIZE,
        "query": {
            "match_all": {}
        },
        "sort": [
            { "harvested_at": { "order": "desc" } },
            { "channel.channel_id": { "order": "asc" } }
        ]
    });
    if let Some(sort) = cursor {
        body["search_after"] = sort.clone();
    }
    body
}

fn next_cursor(hits: &[Value]) -> Option<Value> {
    hits.last().and_then(|hit| hit.get("sort")).cloned()
}
