use crate::error::HarvestError;
use crate::models::{ChannelOutcome, HarvestStatus, WriteSummary};
use crate::services::document_store::DocumentSink;
use crate::services::pipeline::IngestionPipeline;
use crate::services::relational_store::RelationalSink;
use crate::services::writer::DualSinkWriter;
use crate::services::youtube_client::MetadataSource;
use async_trait::async_trait;
use log::{error, info, warn};

/// Fetch-and-persist of one whole channel.
#[async_trait]
pub trait ChannelHarvester: Send + Sync {
    async fn harvest(&self, channel_id: &str) -> Result<WriteSummary, HarvestError>;
}

#[async_trait]
impl<T: ChannelHarvester + ?Sized> ChannelHarvester for &T {
    async fn harvest(&self, channel_id: &str) -> Result<WriteSummary, HarvestError> {
        (**self).harvest(channel_id).await
    }
}

pub struct Harvester<'a, S: ?Sized, D: ?Sized, R: ?Sized> {
    pipeline: IngestionPipeline<'a, S>,
    writer: DualSinkWriter<'a, D, R>,
}

impl<'a, S, D, R> Harvester<'a, S, D, R>
where
    S: MetadataSource + ?Sized,
    D: DocumentSink + ?Sized,
    R: RelationalSink + ?Sized,
{
    pub fn new(source: &'a S, documents: &'a D, relational: &'a R) -> Self {
        Harvester {
            pipeline: IngestionPipeline::new(source),
            writer: DualSinkWriter::new(documents, relational),
        }
    }
}

#[async_trait]
impl<'a, S, D, R> ChannelHarvester for Harvester<'a, S, D, R>
where
    S: MetadataSource + ?Sized,
    D: DocumentSink + ?Sized,
    R: RelationalSink + ?Sized,
{
    async fn harvest(&self, channel_id: &str) -> Result<WriteSummary, HarvestError> {
        let bundle = self.pipeline.run(channel_id).await?;
        self.writer.write(&bundle).await
    }
}

/// Runs a batch of channels one after another and retries the failed ones once.
pub struct RetrySupervisor<H> {
    harvester: H,
    retry_failed: bool,
}

impl<H: ChannelHarvester> RetrySupervisor<H> {
    pub fn new(harvester: H, retry_failed: bool) -> Self {
        RetrySupervisor {
            harvester,
            retry_failed,
        }
    }

    /// Never fails; inspect the returned outcomes.
    pub async fn run(&self, channel_ids: &[String]) -> Vec<ChannelOutcome> {
        let mut results = Vec::with_capacity(channel_ids.len());
        for channel_id in channel_ids {
            let status = self.attempt(channel_id).await;
            results.push(ChannelOutcome {
                channel_id: channel_id.clone(),
                status,
            });
        }

        if self.retry_failed {
            for outcome in results.iter_mut().filter(|o| o.status.is_failed()) {
                warn!("Retrying for channel ID: {}", outcome.channel_id);
                outcome.status = self.attempt(&outcome.channel_id).await;
            }
        }

        results
    }

    async fn attempt(&self, channel_id: &str) -> HarvestStatus {
        match self.harvester.harvest(channel_id).await {
            Ok(summary) => {
                info!(
                    "Channel {channel_id} harvested: {} rows inserted, {} already stored",
                    summary.inserted(),
                    summary.duplicates()
                );
                HarvestStatus::Success
            }
            Err(e) => {
                error!("Channel {channel_id} failed: {e}");
                HarvestStatus::Failed(e.to_string())
            }
        }
    }
}
