use std::convert::Infallible;
use std::sync::Arc;

use harvest_core::{
    normalize_username, DestinationResolver, DownloadResult, DownloadStatus, MediaTask, Profile,
    RunSummary, SeedKind,
};
use harvest_logging::{harvest_error, harvest_info};

use crate::{
    run_bounded, DiscoveryTrigger, EventSink, HarvestError, HarvestEvent, HarvestLoop,
    HarvestSettings, MediaWriter, NullEventSink, PayloadReceiver, Platform, RequestKind,
    SessionProvider, Transport,
};

/// One harvest to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub platform: Platform,
    pub username: String,
    /// Overrides the configured cap when set.
    pub max_items: Option<usize>,
}

/// Sequences load, discovery, seeding and bounded downloads for one run.
pub struct Coordinator {
    settings: HarvestSettings,
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionProvider>,
    events: Arc<dyn EventSink>,
}

impl Coordinator {
    pub fn new(
        settings: HarvestSettings,
        transport: Arc<dyn Transport>,
        session: Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            settings,
            transport,
            session,
            events: Arc::new(NullEventSink),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Only session, load and discovery failures are returned as `Err`;
    /// download failures are entries in the summary.
    pub async fn run(
        &self,
        request: &RunRequest,
        trigger: &mut dyn DiscoveryTrigger,
        mut responses: PayloadReceiver,
    ) -> Result<RunSummary, HarvestError> {
        let result = self.harvest(request, trigger, &mut responses).await;
        if let Err(err) = &result {
            harvest_error!("Run for {} failed: {}", request.username, err);
        }
        result
    }

    async fn harvest(
        &self,
        request: &RunRequest,
        trigger: &mut dyn DiscoveryTrigger,
        responses: &mut PayloadReceiver,
    ) -> Result<RunSummary, HarvestError> {
        let username = normalize_username(&request.username);
        if username.is_empty() {
            return Err(HarvestError::Config("a username is required".to_string()));
        }
        let settings = HarvestSettings {
            max_items: request.max_items.or(self.settings.max_items),
            ..self.settings.clone()
        };
        harvest_info!(
            "Harvesting {} profile {} (cap {:?}, {} parallel downloads)",
            request.platform,
            username,
            settings.max_items,
            settings.concurrency
        );

        trigger.load().await?;

        let resolver =
            DestinationResolver::new(&settings.storage_root, request.platform.dir_name());
        let profile = Profile::for_username(&username, request.platform.profile_url(&username));
        let harvest = HarvestLoop::new(
            settings.clone(),
            request.platform.adapter(),
            resolver.clone(),
            profile,
        )
        .with_events(self.events.clone());
        let outcome = harvest.run(trigger, responses).await?;
        harvest_info!(
            "Discovery stopped ({}) after {} cycles with {} items",
            outcome.stop_reason,
            outcome.cycles,
            outcome.tasks.len()
        );

        let mut tasks = seed_tasks(&resolver, &outcome.profile);
        tasks.extend(outcome.tasks);
        let downloads = self.download(tasks, &settings).await;

        let summary = RunSummary::new(outcome.profile, settings.max_items, downloads);
        harvest_info!(
            "Run finished: {} downloaded, {} already present, {} failed",
            summary.count(DownloadStatus::Downloaded),
            summary.count(DownloadStatus::Exists),
            summary.count(DownloadStatus::Error)
        );
        Ok(summary)
    }

    async fn download(
        &self,
        tasks: Vec<MediaTask>,
        settings: &HarvestSettings,
    ) -> Vec<DownloadResult> {
        let writer = MediaWriter::new(self.transport.clone());
        let filenames: Vec<String> = tasks.iter().map(|t| t.filename.clone()).collect();
        let jitter = settings.jitter;

        let results = run_bounded(
            tasks.into_iter().enumerate().collect(),
            settings.concurrency,
            |(index, task): (usize, MediaTask)| {
                let writer = writer.clone();
                let session = self.session.clone();
                let events = self.events.clone();
                async move {
                    let kind = if task.is_original {
                        RequestKind::Original
                    } else {
                        RequestKind::Media
                    };
                    let headers = session.headers(kind);
                    let result = writer
                        .write(&task.url, &task.destination, &task.filename, &headers)
                        .await;
                    events.emit(HarvestEvent::DownloadFinished {
                        index,
                        result: result.clone(),
                    });
                    if let Some(jitter) = jitter {
                        tokio::time::sleep(jitter.sample()).await;
                    }
                    Ok::<_, Infallible>(result)
                }
            },
        )
        .await;

        results
            .into_iter()
            .zip(filenames)
            .map(|(result, filename)| {
                result.unwrap_or_else(|failure| {
                    let result = DownloadResult::error(filename, failure.message);
                    self.events.emit(HarvestEvent::DownloadFinished {
                        index: failure.index,
                        result: result.clone(),
                    });
                    result
                })
            })
            .collect()
    }
}

/// Profile picture and header tasks, in that order, for whatever the profile knows.
/// A header that is the same image as the picture is not fetched twice.
fn seed_tasks(resolver: &DestinationResolver, profile: &Profile) -> Vec<MediaTask> {
    let mut seeds: Vec<MediaTask> = Vec::new();
    for (kind, url) in [
        (SeedKind::Picture, profile.picture.as_str()),
        (SeedKind::Header, profile.header.as_str()),
    ] {
        if url.trim().is_empty() {
            continue;
        }
        if seeds.iter().any(|s| s.url == url) {
            continue;
        }
        let destination = resolver.seed(profile, kind);
        seeds.push(MediaTask {
            id: kind.filename().to_string(),
            url: url.to_string(),
            filename: destination.filename,
            destination: destination.folder,
            is_original: true,
        });
    }
    seeds
}
