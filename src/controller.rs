//! Client controller: one handler per user action.
//!
//! Every handler moves through Idle → Running → (Success | Failed) → Idle and
//! reports progress only through the status line of the [`ViewModel`]. A
//! failure anywhere inside a handler ends it with `Error: <message>` on the
//! status line; nothing is re-thrown.
//!
//! | Handler | Requests |
//! |---------|----------|
//! | [`Controller::load_demo`] | `POST /load_demo?max_pages=N`, `GET /stats` |
//! | [`Controller::reset`] | `POST /reset`, `GET /stats` |
//! | [`Controller::upload`] | `POST /upload?max_pages=N` per file, `GET /stats` |
//! | [`Controller::search`] | `GET /search?q=Q&k=K`, `GET /stats` |
//! | [`Controller::refresh_stats`] | `GET /stats` |
//!
//! Each action carries a busy flag: invoking an action while the same action
//! is still in flight returns [`Outcome::Busy`] without issuing a request or
//! touching the view. Different actions may still overlap.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::api::{decode, path_with_query, Backend, RequestBody, UploadFile};
use crate::config::{Config, DefaultsConfig, UploadFailurePolicy};
use crate::error::RequestError;
use crate::models::{HealthResponse, SearchResponse, StatsSnapshot, UploadResponse};
use crate::view::{Controls, ResultsPanel, ViewModel};

pub const MSG_NO_FILES: &str = "Choose at least one PDF.";
pub const MSG_NO_QUERY: &str = "Enter a query.";

/// How a handler invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// A request failed; the message is what followed `Error: `.
    Failed(String),
    /// Input validation stopped the handler before any request.
    Rejected,
    /// The same action was already in flight.
    Busy,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Done)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    LoadDemo,
    Reset,
    Upload,
    Search,
}

impl Action {
    fn name(self) -> &'static str {
        match self {
            Action::LoadDemo => "load_demo",
            Action::Reset => "reset",
            Action::Upload => "upload",
            Action::Search => "search",
        }
    }
}

#[derive(Default)]
struct BusyFlags {
    load_demo: AtomicBool,
    reset: AtomicBool,
    upload: AtomicBool,
    search: AtomicBool,
}

impl BusyFlags {
    fn flag(&self, action: Action) -> &AtomicBool {
        match action {
            Action::LoadDemo => &self.load_demo,
            Action::Reset => &self.reset,
            Action::Upload => &self.upload,
            Action::Search => &self.search,
        }
    }
}

/// Clears its action's busy flag when dropped.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct Controller<B: Backend> {
    backend: B,
    view: Mutex<ViewModel>,
    defaults: DefaultsConfig,
    upload_policy: UploadFailurePolicy,
    busy: BusyFlags,
}

impl<B: Backend> Controller<B> {
    pub fn new(backend: B, config: &Config) -> Self {
        Self {
            backend,
            view: Mutex::new(ViewModel::default()),
            defaults: config.defaults.clone(),
            upload_policy: config.upload.on_failure,
            busy: BusyFlags::default(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn upload_policy(&self) -> UploadFailurePolicy {
        self.upload_policy
    }

    pub fn set_upload_policy(&mut self, policy: UploadFailurePolicy) {
        self.upload_policy = policy;
    }

    /// A copy of the current view-model.
    pub fn snapshot(&self) -> ViewModel {
        self.view().clone()
    }

    /// Edit the input controls.
    pub fn update_controls(&self, f: impl FnOnce(&mut Controls)) {
        f(&mut self.view().controls);
    }

    pub fn status(&self) -> String {
        self.view().status.clone()
    }

    fn view(&self) -> MutexGuard<'_, ViewModel> {
        // The view holds plain data; a panic mid-update cannot leave it unusable.
        self.view.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_status(&self, msg: impl Into<String>) {
        let msg = msg.into();
        debug!(status = %msg, "status");
        self.view().status = msg;
    }

    fn begin(&self, action: Action) -> Option<BusyGuard<'_>> {
        let flag = self.busy.flag(action);
        match flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire) {
            Ok(_) => Some(BusyGuard { flag }),
            Err(_) => {
                debug!(action = action.name(), "already in flight");
                None
            }
        }
    }

    /// Convert a handler result into its final status and outcome.
    fn finish(&self, action: Action, result: Result<(), RequestError>) -> Outcome {
        match result {
            Ok(()) => {
                info!(action = action.name(), "done");
                Outcome::Done
            }
            Err(e) => {
                warn!(action = action.name(), error = %e, "failed");
                let message = e.to_string();
                self.set_status(format!("Error: {}", message));
                Outcome::Failed(message)
            }
        }
    }

    fn max_pages(&self) -> String {
        input_or_default(&self.view().controls.max_pages, self.defaults.max_pages)
    }

    fn k(&self) -> String {
        input_or_default(&self.view().controls.k, self.defaults.k)
    }

    /// `GET /stats` and write `docs=…, indexed=…` to the status line.
    async fn update_stats(&self) -> Result<StatsSnapshot, RequestError> {
        let stats: StatsSnapshot = decode(self.backend.get_json("/stats").await?)?;
        self.set_status(stats.status_line());
        Ok(stats)
    }

    /// First stats refresh when a session starts. Failures are ignored so
    /// nothing alarming shows before the user has done anything.
    pub async fn init(&self) {
        if let Err(e) = self.update_stats().await {
            debug!(error = %e, "initial stats refresh failed");
        }
    }

    /// Stats refresh triggered by the user.
    pub async fn refresh_stats(&self) -> Outcome {
        match self.update_stats().await {
            Ok(_) => Outcome::Done,
            Err(e) => {
                let message = e.to_string();
                self.set_status(format!("Error: {}", message));
                Outcome::Failed(message)
            }
        }
    }

    /// `GET /health`. Not part of the view; reported directly to the caller.
    pub async fn check_health(&self) -> Result<HealthResponse, RequestError> {
        decode(self.backend.get_json("/health").await?)
    }

    pub async fn load_demo(&self) -> Outcome {
        let Some(_busy) = self.begin(Action::LoadDemo) else {
            return Outcome::Busy;
        };

        let result = async {
            self.set_status("Loading demo PDFs...");
            let max_pages = self.max_pages();
            let path = path_with_query("/load_demo", &[("max_pages", max_pages.as_str())]);
            self.backend.post_json(&path, None).await?;
            self.update_stats().await?;
            Ok::<(), RequestError>(())
        }
        .await;

        self.finish(Action::LoadDemo, result)
    }

    pub async fn reset(&self) -> Outcome {
        let Some(_busy) = self.begin(Action::Reset) else {
            return Outcome::Busy;
        };

        let result = async {
            self.set_status("Resetting...");
            self.backend.post_json("/reset", None).await?;
            {
                let mut view = self.view();
                view.results = ResultsPanel::Empty;
                view.upload_log.clear();
            }
            self.update_stats().await?;
            Ok::<(), RequestError>(())
        }
        .await;

        self.finish(Action::Reset, result)
    }

    /// Upload the selected files one at a time, in selection order.
    ///
    /// Under [`UploadFailurePolicy::Abort`] the first failure ends the batch
    /// and later files are never sent. Under
    /// [`UploadFailurePolicy::Continue`] each failure is logged and the batch
    /// carries on.
    pub async fn upload(&self) -> Outcome {
        let Some(_busy) = self.begin(Action::Upload) else {
            return Outcome::Busy;
        };

        let files = {
            let mut view = self.view();
            view.upload_log.clear();
            if view.controls.files.is_empty() {
                view.upload_log = MSG_NO_FILES.to_string();
                return Outcome::Rejected;
            }
            view.controls.files.clone()
        };

        self.set_status(format!("Uploading {} file(s)...", files.len()));
        let max_pages = self.max_pages();
        let path = path_with_query("/upload", &[("max_pages", max_pages.as_str())]);

        let mut failures = 0usize;
        for file in &files {
            match self.upload_one(&path, file).await {
                Ok(resp) => {
                    self.view().append_log_line(&resp.log_line());
                }
                Err(e) => match self.upload_policy {
                    UploadFailurePolicy::Abort => return self.finish(Action::Upload, Err(e)),
                    UploadFailurePolicy::Continue => {
                        warn!(file = %file.display(), error = %e, "upload failed, continuing");
                        failures += 1;
                        let line = format!("Failed: {} ({})", display_name(file), e);
                        self.view().append_log_line(&line);
                    }
                },
            }
        }

        if let Err(e) = self.update_stats().await {
            return self.finish(Action::Upload, Err(e));
        }

        if failures == 0 {
            self.set_status("Upload complete.");
            self.view().controls.files.clear();
            self.finish(Action::Upload, Ok(()))
        } else {
            self.set_status(format!("Upload finished with {} failure(s).", failures));
            warn!(failures, total = files.len(), "upload batch had failures");
            Outcome::Failed(format!("{} of {} uploads failed", failures, files.len()))
        }
    }

    async fn upload_one(&self, path: &str, file: &Path) -> Result<UploadResponse, RequestError> {
        let bytes = tokio::fs::read(file)
            .await
            .map_err(|e| RequestError::File {
                path: file.display().to_string(),
                message: e.to_string(),
            })?;
        debug!(file = %file.display(), bytes = bytes.len(), "uploading");

        let body = RequestBody::Multipart(UploadFile {
            file_name: display_name(file),
            bytes,
        });
        decode(self.backend.post_json(path, Some(body)).await?)
    }

    /// Run the query in the controls. The previous results stay on screen
    /// until the new payload has arrived.
    pub async fn search(&self) -> Outcome {
        let Some(_busy) = self.begin(Action::Search) else {
            return Outcome::Busy;
        };

        let query = self.view().controls.query.trim().to_string();
        if query.is_empty() {
            self.set_status(MSG_NO_QUERY);
            return Outcome::Rejected;
        }

        let result = async {
            self.set_status("Searching...");
            let k = self.k();
            let path = path_with_query("/search", &[("q", query.as_str()), ("k", k.as_str())]);
            let data: SearchResponse = decode(self.backend.get_json(&path).await?)?;
            debug!(hits = data.items().len(), "search results");
            self.view().results = ResultsPanel::Rendered(data);
            self.update_stats().await?;
            self.set_status("Done.");
            Ok::<(), RequestError>(())
        }
        .await;

        self.finish(Action::Search, result)
    }
}

fn input_or_default(input: &str, default: u32) -> String {
    let input = input.trim();
    if input.is_empty() {
        default.to_string()
    } else {
        input.to_string()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
