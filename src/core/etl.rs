use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting result extraction...");

        let rows = self.pipeline.extract().await?;
        tracing::info!("Extracted {} rows", rows.len());

        let transformed = self.pipeline.transform(rows).await?;
        tracing::info!("Rendered {} rows to CSV", transformed.rows.len());

        let output_path = self.pipeline.load(transformed).await?;
        tracing::info!(
            "Output saved to: {} (elapsed {:?})",
            output_path,
            started.elapsed()
        );

        Ok(output_path)
    }
}
