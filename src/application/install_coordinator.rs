use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::{stream::BoxStream, FutureExt, StreamExt};
use tracing::{debug, info, warn};

use crate::{
    domain::{CatalogEntry, InstallOutcome, InstallReport},
    fetch::FetchClient,
    platform::InstallTarget,
};

/// Asks the user whether an existing file may be replaced.
pub trait OverwritePrompt: Send + Sync {
    fn confirm_overwrite(&self, entry: &CatalogEntry, path: &Path) -> BoxFuture<'static, bool>;
}

/// Native Yes/No dialog.
pub struct DialogPrompt;

impl OverwritePrompt for DialogPrompt {
    fn confirm_overwrite(&self, entry: &CatalogEntry, _path: &Path) -> BoxFuture<'static, bool> {
        let description = format!("{} already exists. Overwrite?", entry.label());
        async move {
            let answer = rfd::AsyncMessageDialog::new()
                .set_level(rfd::MessageLevel::Warning)
                .set_title("File Exists")
                .set_description(description)
                .set_buttons(rfd::MessageButtons::YesNo)
                .show()
                .await;
            matches!(answer, rfd::MessageDialogResult::Yes)
        }
        .boxed()
    }
}

#[derive(Debug, Clone)]
pub enum InstallEvent {
    /// The fetch for this entry is starting.
    Downloading(CatalogEntry),
    Finished(InstallReport),
}

#[derive(Clone)]
pub struct InstallCoordinator {
    fetch_client: FetchClient,
    target: InstallTarget,
    prompt: Arc<dyn OverwritePrompt>,
}

impl InstallCoordinator {
    pub fn new(
        fetch_client: FetchClient,
        target: InstallTarget,
        prompt: Arc<dyn OverwritePrompt>,
    ) -> Self {
        Self {
            fetch_client,
            target,
            prompt,
        }
    }

    pub fn target(&self) -> &InstallTarget {
        &self.target
    }

    pub fn fetch_client(&self) -> &FetchClient {
        &self.fetch_client
    }

    /// Installs `entries` one after another. Every entry yields exactly one
    /// `Finished` event; a failure never stops the rest of the batch.
    pub fn install_stream(&self, entries: Vec<CatalogEntry>) -> BoxStream<'static, InstallEvent> {
        futures::stream::unfold(
            BatchState::Next {
                coordinator: self.clone(),
                remaining: entries.into(),
            },
            |state| async move {
                match state {
                    BatchState::Next {
                        coordinator,
                        mut remaining,
                    } => {
                        let entry = remaining.pop_front()?;
                        let dest = coordinator.target.destination(&entry);

                        match tokio::fs::try_exists(&dest).await {
                            Ok(true) => {
                                let confirmed =
                                    coordinator.prompt.confirm_overwrite(&entry, &dest).await;
                                if !confirmed {
                                    debug!(label = entry.label(), "Overwrite declined");
                                    return Some((
                                        InstallEvent::Finished(InstallReport {
                                            entry,
                                            outcome: InstallOutcome::Skipped,
                                        }),
                                        BatchState::Next {
                                            coordinator,
                                            remaining,
                                        },
                                    ));
                                }
                            }
                            Ok(false) => {}
                            Err(e) => {
                                return Some((
                                    InstallEvent::Finished(InstallReport {
                                        entry,
                                        outcome: InstallOutcome::Failed(format!(
                                            "could not inspect {}: {}",
                                            dest.display(),
                                            e
                                        )),
                                    }),
                                    BatchState::Next {
                                        coordinator,
                                        remaining,
                                    },
                                ));
                            }
                        }

                        Some((
                            InstallEvent::Downloading(entry.clone()),
                            BatchState::Fetching {
                                coordinator,
                                entry,
                                dest,
                                remaining,
                            },
                        ))
                    }
                    BatchState::Fetching {
                        coordinator,
                        entry,
                        dest,
                        remaining,
                    } => {
                        let outcome = match coordinator
                            .fetch_client
                            .fetch_to_path(entry.source_url(), &dest)
                            .await
                        {
                            Ok(bytes) => {
                                info!(label = entry.label(), bytes, path = %dest.display(), "Installed");
                                InstallOutcome::Installed(dest)
                            }
                            Err(e) => {
                                warn!(label = entry.label(), error = %e, "Install failed");
                                InstallOutcome::Failed(e.to_string())
                            }
                        };

                        Some((
                            InstallEvent::Finished(InstallReport { entry, outcome }),
                            BatchState::Next {
                                coordinator,
                                remaining,
                            },
                        ))
                    }
                }
            },
        )
        .boxed()
    }
}

enum BatchState {
    Next {
        coordinator: InstallCoordinator,
        remaining: VecDeque<CatalogEntry>,
    },
    Fetching {
        coordinator: InstallCoordinator,
        entry: CatalogEntry,
        dest: PathBuf,
        remaining: VecDeque<CatalogEntry>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Catalog, Category};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedPrompt {
        answer: bool,
        asked: AtomicUsize,
    }

    impl ScriptedPrompt {
        fn new(answer: bool) -> Arc<Self> {
            Arc::new(Self {
                answer,
                asked: AtomicUsize::new(0),
            })
        }
    }

    impl OverwritePrompt for ScriptedPrompt {
        fn confirm_overwrite(&self, _entry: &CatalogEntry, _path: &Path) -> BoxFuture<'static, bool> {
            self.asked.fetch_add(1, Ordering::SeqCst);
            futures::future::ready(self.answer).boxed()
        }
    }

    fn coordinator(dir: &tempfile::TempDir, prompt: Arc<ScriptedPrompt>) -> InstallCoordinator {
        let target = InstallTarget::prepare(dir.path().to_path_buf()).unwrap();
        InstallCoordinator::new(FetchClient::new().unwrap(), target, prompt)
    }

    async fn reports(stream: BoxStream<'static, InstallEvent>) -> Vec<InstallReport> {
        stream
            .filter_map(|event| async move {
                match event {
                    InstallEvent::Finished(report) => Some(report),
                    InstallEvent::Downloading(_) => None,
                }
            })
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_install_all_music_fresh() {
        let mut server = mockito::Server::new_async().await;
        let song1 = server
            .mock("GET", "/song1")
            .with_body("first song")
            .expect(1)
            .create_async()
            .await;
        let song2 = server
            .mock("GET", "/song2")
            .with_body("second song")
            .expect(1)
            .create_async()
            .await;

        let music = Category::new(
            "Music",
            vec![
                CatalogEntry::new("Song 1", format!("{}/song1", server.url()), "song1.mp3"),
                CatalogEntry::new("Song 2", format!("{}/song2", server.url()), "song2.mp3"),
            ],
        );

        let dir = tempfile::tempdir().unwrap();
        let prompt = ScriptedPrompt::new(true);
        let coordinator = coordinator(&dir, prompt.clone());

        let reports = reports(coordinator.install_stream(music.entries().to_vec())).await;

        assert_eq!(reports.len(), 2);
        let lines: Vec<_> = reports.iter().map(|r| r.log_line()).collect();
        assert_eq!(
            lines,
            [
                format!("Installed Song 1 → {}", dir.path().join("song1.mp3").display()),
                format!("Installed Song 2 → {}", dir.path().join("song2.mp3").display()),
            ]
        );
        assert_eq!(std::fs::read_to_string(dir.path().join("song1.mp3")).unwrap(), "first song");
        assert_eq!(std::fs::read_to_string(dir.path().join("song2.mp3")).unwrap(), "second song");
        assert_eq!(prompt.asked.load(Ordering::SeqCst), 0);
        song1.assert_async().await;
        song2.assert_async().await;
    }

    #[tokio::test]
    async fn test_events_announce_download_before_finish() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("GET", "/c").with_body("k=v").create_async().await;

        let entry = CatalogEntry::new("Main Config", format!("{}/c", server.url()), "config.ini");
        let dir = tempfile::tempdir().unwrap();
        let events: Vec<_> = coordinator(&dir, ScriptedPrompt::new(true))
            .install_stream(vec![entry.clone()])
            .collect()
            .await;

        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], InstallEvent::Downloading(e) if *e == entry));
        assert!(matches!(
            &events[1],
            InstallEvent::Finished(InstallReport { outcome: InstallOutcome::Installed(_), .. })
        ));
    }

    #[tokio::test]
    async fn test_declined_overwrite_issues_no_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/config")
            .with_body("new=2")
            .expect(0)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("config.ini");
        std::fs::write(&dest, "old=1").unwrap();

        let prompt = ScriptedPrompt::new(false);
        let entry = CatalogEntry::new("Main Config", format!("{}/config", server.url()), "config.ini");
        let events: Vec<_> = coordinator(&dir, prompt.clone())
            .install_stream(vec![entry])
            .collect()
            .await;

        assert_eq!(events.len(), 1);
        match &events[0] {
            InstallEvent::Finished(report) => {
                assert_eq!(report.outcome, InstallOutcome::Skipped);
                assert_eq!(report.log_line(), "Skipped Main Config");
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "old=1");
        assert_eq!(prompt.asked.load(Ordering::SeqCst), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_confirmed_overwrite_replaces_file() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/config")
            .with_body("new=2")
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("config.ini");
        std::fs::write(&dest, "old=1").unwrap();

        let prompt = ScriptedPrompt::new(true);
        let entry = CatalogEntry::new("Main Config", format!("{}/config", server.url()), "config.ini");
        let reports = reports(coordinator(&dir, prompt.clone()).install_stream(vec![entry])).await;

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].outcome, InstallOutcome::Installed(dest.clone()));
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "new=2");
        assert_eq!(prompt.asked.load(Ordering::SeqCst), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_batch() {
        let mut server = mockito::Server::new_async().await;
        let broken = server
            .mock("GET", "/broken")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;
        let fine = server
            .mock("GET", "/fine")
            .with_body("ok")
            .expect(1)
            .create_async()
            .await;

        let entries = vec![
            CatalogEntry::new("Broken", format!("{}/broken", server.url()), "broken.bin"),
            CatalogEntry::new("Fine", format!("{}/fine", server.url()), "fine.bin"),
        ];
        let dir = tempfile::tempdir().unwrap();
        let reports = reports(coordinator(&dir, ScriptedPrompt::new(true)).install_stream(entries)).await;

        assert_eq!(reports.len(), 2);
        match &reports[0].outcome {
            InstallOutcome::Failed(reason) => assert!(reason.contains("500"), "{reason}"),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(reports[0].log_line().starts_with("Failed Broken: "));
        assert!(!dir.path().join("broken.bin").exists());
        assert!(matches!(reports[1].outcome, InstallOutcome::Installed(_)));
        broken.assert_async().await;
        fine.assert_async().await;
    }

    #[tokio::test]
    async fn test_install_everything_fetches_every_entry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", mockito::Matcher::Regex("^/files/".to_string()))
            .with_body("payload")
            .expect(4)
            .create_async()
            .await;

        let url = |name: &str| format!("{}/files/{}", server.url(), name);
        let catalog = Catalog::new(
            format!("{}/bg.jpg", server.url()),
            vec![
                Category::new(
                    "Music",
                    vec![
                        CatalogEntry::new("Song 1", url("s1"), "song1.mp3"),
                        CatalogEntry::new("Song 2", url("s2"), "song2.mp3"),
                    ],
                ),
                Category::new("Config", vec![CatalogEntry::new("Main Config", url("c"), "config.ini")]),
                Category::new("Scripts", vec![CatalogEntry::new("Setup Script", url("p"), "setup.py")]),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let everything: Vec<_> = catalog.entries().cloned().collect();
        let reports = reports(coordinator(&dir, ScriptedPrompt::new(true)).install_stream(everything)).await;

        assert_eq!(reports.len(), catalog.entry_count());
        assert!(reports
            .iter()
            .all(|r| matches!(r.outcome, InstallOutcome::Installed(_))));
        for entry in catalog.entries() {
            assert!(dir.path().join(entry.destination_filename()).exists());
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_batch_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let events: Vec<_> = coordinator(&dir, ScriptedPrompt::new(true))
            .install_stream(Vec::new())
            .collect()
            .await;
        assert!(events.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_destination_fails_without_fetch() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/config")
            .with_body("k=v")
            .expect(0)
            .create_async()
            .await;

        let root = tempfile::tempdir().unwrap();
        let install_dir = root.path().join("install");
        let target = InstallTarget::prepare(install_dir.clone()).unwrap();
        // A file where the directory was makes the existence check fail with ENOTDIR.
        std::fs::remove_dir(&install_dir).unwrap();
        std::fs::write(&install_dir, "not a directory").unwrap();

        let prompt = ScriptedPrompt::new(true);
        let coordinator = InstallCoordinator::new(FetchClient::new().unwrap(), target, prompt.clone());
        let entry = CatalogEntry::new("Main Config", format!("{}/config", server.url()), "config.ini");

        let events: Vec<_> = coordinator.install_stream(vec![entry]).collect().await;

        assert_eq!(events.len(), 1);
        match &events[0] {
            InstallEvent::Finished(report) => match &report.outcome {
                InstallOutcome::Failed(reason) => {
                    assert!(reason.starts_with("could not inspect"), "{reason}");
                    assert!(report.log_line().starts_with("Failed Main Config: "));
                }
                other => panic!("unexpected outcome: {other:?}"),
            },
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(prompt.asked.load(Ordering::SeqCst), 0);
        mock.assert_async().await;
    }
}
