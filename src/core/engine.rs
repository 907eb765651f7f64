use crate::domain::model::RunReport;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::RunMonitor;

/// Drives a pipeline through extract, transform and load.
pub struct RunEngine<'m, P: Pipeline> {
    pipeline: P,
    monitor: Option<&'m RunMonitor>,
}

impl<'m, P: Pipeline> RunEngine<'m, P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            monitor: None,
        }
    }

    pub fn with_monitor(mut self, monitor: &'m RunMonitor) -> Self {
        self.monitor = Some(monitor);
        self
    }

    fn phase_done(&self, phase: &str) {
        if let Some(monitor) = self.monitor {
            monitor.log_phase(phase);
        }
    }

    pub async fn run(&self) -> Result<RunReport> {
        let name = self.pipeline.name();
        tracing::info!("Starting {} run...", name);

        tracing::info!("Extracting candidates...");
        let candidates = self.pipeline.extract().await?;
        let candidate_count = candidates.len();
        tracing::info!("Extracted {} candidates", candidate_count);
        self.phase_done("extract");

        tracing::info!("Preparing posts...");
        let posts = self.pipeline.transform(candidates).await?;
        tracing::info!("Prepared {} posts", posts.len());
        self.phase_done("transform");

        tracing::info!("Publishing...");
        let mut report = self.pipeline.load(posts).await?;
        report.candidates = candidate_count;
        tracing::info!(
            "Published {} posts, {} failed{}",
            report.published.len(),
            report.failed.len(),
            if report.dry_run { " (dry run)" } else { "" }
        );
        self.phase_done("load");

        if report.nothing_published() {
            tracing::info!("--- No new posts were made in this run. ---");
        }
        if let Some(monitor) = self.monitor {
            monitor.log_final();
        }
        Ok(report)
    }
}
