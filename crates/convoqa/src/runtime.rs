// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter construction from configuration.

use std::sync::Arc;
use std::time::Duration;

use convoqa_analyzer::HttpAnalyzer;
use convoqa_config::ConvoqaConfig;
use convoqa_core::types::BatchReport;
use convoqa_core::{AnalyzerAdapter, ConvoqaError, StorageAdapter};
use convoqa_pipeline::{
    IngestReport, Ingestor, JsonFileSource, Reconciler, ReconcilerOptions, WorkingCalendar,
};
use convoqa_storage::{Database, SqliteStorage};
use tracing::{debug, info, warn};

/// Every long-lived component a subcommand needs, built once from config.
pub struct Runtime {
    pub config: ConvoqaConfig,
    pub storage: Arc<SqliteStorage>,
    pub db: Database,
    pub calendar: Arc<WorkingCalendar>,
    pub reconciler: Arc<Reconciler>,
    pub ingestor: Option<Arc<Ingestor>>,
}

impl Runtime {
    /// Open the warehouse and build the HTTP analyzer from config.
    pub async fn build(config: ConvoqaConfig) -> Result<Self, ConvoqaError> {
        let analyzer: Arc<dyn AnalyzerAdapter + Send + Sync> =
            Arc::new(HttpAnalyzer::new(&config.analyzer)?);
        Self::with_analyzer(config, analyzer).await
    }

    /// Same as [`Runtime::build`] with a caller-supplied analyzer.
    pub async fn with_analyzer(
        config: ConvoqaConfig,
        analyzer: Arc<dyn AnalyzerAdapter + Send + Sync>,
    ) -> Result<Self, ConvoqaError> {
        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        let db = storage.database()?.clone();
        let storage = Arc::new(storage);

        let calendar = Arc::new(WorkingCalendar::new(&config.calendar)?);

        let reconciler = Arc::new(Reconciler::new(
            db.clone(),
            analyzer,
            ReconcilerOptions {
                threshold: config.analysis.threshold,
                dry_run: config.analysis.dry_run,
            },
        ));

        let ingestor = match &config.ingestion.source_file {
            Some(path) => {
                debug!(path = %path, "using JSON record dump as source");
                Some(Arc::new(Ingestor::new(
                    db.clone(),
                    Arc::new(JsonFileSource::new(path)),
                    config.ingestion.page_id.clone(),
                    Duration::from_millis(config.ingestion.request_delay_ms),
                )))
            }
            None => None,
        };

        info!(
            database = %config.storage.database_path,
            threshold = config.analysis.threshold,
            dry_run = config.analysis.dry_run,
            ingestion = ingestor.is_some(),
            "runtime initialized"
        );

        Ok(Self {
            config,
            storage,
            db,
            calendar,
            reconciler,
            ingestor,
        })
    }

    /// Run ingestion if a source is configured. `None` when there is none.
    pub async fn ingest(&self) -> Result<Option<IngestReport>, ConvoqaError> {
        match &self.ingestor {
            Some(ingestor) => ingestor.run().await.map(Some),
            None => {
                warn!("no record source configured (ingestion.source_file), skipping ingestion");
                Ok(None)
            }
        }
    }

    /// Ingest (unless `analysis.skip_ingestion`), then run one analysis batch.
    pub async fn analyze(&self) -> Result<BatchReport, ConvoqaError> {
        if !self.config.analysis.skip_ingestion {
            self.ingest().await?;
        }
        self.reconciler.run_batch().await
    }

    /// Checkpoint the warehouse.
    pub async fn shutdown(&self) -> Result<(), ConvoqaError> {
        self.storage.close().await
    }
}
