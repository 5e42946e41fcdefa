use crate::error::HarvestError;
use crate::models::{IngestionBundle, WriteSummary};
use crate::services::document_store::DocumentSink;
use crate::services::relational_store::RelationalSink;
use log::info;

/// Persists a bundle to the document store, then row by row to the relational store.
pub struct DualSinkWriter<'a, D: ?Sized, R: ?Sized> {
    documents: &'a D,
    relational: &'a R,
}

impl<'a, D, R> DualSinkWriter<'a, D, R>
where
    D: DocumentSink + ?Sized,
    R: RelationalSink + ?Sized,
{
    pub fn new(documents: &'a D, relational: &'a R) -> Self {
        DualSinkWriter {
            documents,
            relational,
        }
    }

    /// A failed document write fails the whole run before any row is written.
    pub async fn write(&self, bundle: &IngestionBundle) -> Result<WriteSummary, HarvestError> {
        let document_id = self.documents.insert_bundle(bundle).await?;
        info!(
            "Data saved to document store for channel {} ({document_id})",
            bundle.channel.channel_id
        );

        Ok(self.relational.write_bundle(bundle).await?)
    }
}
