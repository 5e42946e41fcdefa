pub mod document_store;
pub mod normalizer;
pub mod pipeline;
pub mod relational_store;
pub mod supervisor;
pub mod writer;
pub mod youtube_client;

#[cfg(test)]
pub(crate) mod test_support;
