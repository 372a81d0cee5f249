// Repository trait for the remote ozone data service
use crate::domain::plot::{PlotRequest, RawModelSeries};
use async_trait::async_trait;

#[async_trait]
pub trait OzoneRepository: Send + Sync {
    /// List all model identifiers the service knows about
    async fn get_models(&self) -> anyhow::Result<Vec<String>>;

    /// List the plot type tags the service can compute
    async fn get_plot_types(&self) -> anyhow::Result<Vec<String>>;

    /// Fetch one raw series per requested model
    async fn get_plot_data(&self, request: &PlotRequest) -> anyhow::Result<Vec<RawModelSeries>>;
}
