use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::AbortHandle;

use crate::types::EditorSettings;

/// Quiet period after the last edit before a save is issued.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(1000);

/// How long the `Saved` indicator stays up before reverting to `Idle`.
pub const SAVED_STATUS_WINDOW: Duration = Duration::from_secs(2);

/// How long the `Error` indicator stays up before reverting to `Idle`.
pub const ERROR_STATUS_WINDOW: Duration = Duration::from_secs(3);

/// The persistence boundary the engine saves through.
pub trait SaveGateway: Send + Sync + 'static {
    /// Persists the file's current title and content. Failures are reported
    /// through the engine's status signal, never propagated to the editor.
    fn save_file(
        &self,
        file_id: &str,
        title: &str,
        content: &str,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// Save-state indicator surfaced to the editing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Idle,
    Saving,
    Saved,
    Error,
}

impl std::fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SaveStatus::Idle => "idle",
            SaveStatus::Saving => "saving",
            SaveStatus::Saved => "saved",
            SaveStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// Debounced autosave state machine for a single open file.
///
/// The engine tracks live edits against the last persisted snapshot. While
/// autosave is active, an edit that leaves the trimmed title or content
/// different from the snapshot arms a debounce timer; further edits re-arm
/// it, so one save is issued per quiet period. Saves go through the
/// [`SaveGateway`] and their outcome is reported on a status channel.
///
/// A failed save keeps the dirty flag set but schedules no retry. The next
/// edit or an explicit [`force_save`](AutosaveEngine::force_save) tries
/// again.
///
/// Loading a different file resets the machine. A save already in flight for
/// the previous file still completes against the gateway, but its outcome no
/// longer touches engine state.
pub struct AutosaveEngine<G: SaveGateway> {
    inner: Arc<EngineInner<G>>,
}

impl<G: SaveGateway> Clone for AutosaveEngine<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct EngineInner<G> {
    gateway: G,
    state: Mutex<EngineState>,
    status_tx: watch::Sender<SaveStatus>,
    on_saved: Mutex<Option<Arc<dyn Fn() + Send + Sync>>>,
}

struct EngineState {
    /// Bumped on every identity change. Timer fires and save completions
    /// carry the epoch they were scheduled under and are discarded when it
    /// no longer matches.
    epoch: u64,
    file_id: Option<String>,
    title: String,
    content: String,
    last_saved_title: String,
    last_saved_content: String,
    status: SaveStatus,
    has_changes: bool,
    active: bool,
    debounce_task: Option<AbortHandle>,
    revert_task: Option<AbortHandle>,
}

impl EngineState {
    fn trimmed_differs(&self) -> bool {
        self.title.trim() != self.last_saved_title.trim()
            || self.content.trim() != self.last_saved_content.trim()
    }

    fn cancel_debounce(&mut self) {
        if let Some(handle) = self.debounce_task.take() {
            handle.abort();
        }
    }

    fn cancel_revert(&mut self) {
        if let Some(handle) = self.revert_task.take() {
            handle.abort();
        }
    }
}

impl<G: SaveGateway> AutosaveEngine<G> {
    #[must_use]
    pub fn new(gateway: G) -> Self {
        let (status_tx, _) = watch::channel(SaveStatus::Idle);
        Self {
            inner: Arc::new(EngineInner {
                gateway,
                state: Mutex::new(EngineState {
                    epoch: 0,
                    file_id: None,
                    title: String::new(),
                    content: String::new(),
                    last_saved_title: String::new(),
                    last_saved_content: String::new(),
                    status: SaveStatus::Idle,
                    has_changes: false,
                    active: false,
                    debounce_task: None,
                    revert_task: None,
                }),
                status_tx,
                on_saved: Mutex::new(None),
            }),
        }
    }

    /// Registers a callback invoked after every successful save. Callers use
    /// it to refresh views derived from persisted state; it must be
    /// idempotent since it can fire for a file that is no longer loaded. The
    /// callback runs with no engine locks held, so it may call back into the
    /// engine, including replacing itself.
    pub fn set_save_listener(&self, listener: impl Fn() + Send + Sync + 'static) {
        *lock(&self.inner.on_saved) = Some(Arc::new(listener));
    }

    /// Points the engine at a file, replacing all prior state. Pending
    /// debounce and status timers are cancelled, dirty flags cleared, and
    /// autosave activation re-evaluated from the given settings.
    pub fn load_file(
        &self,
        file_id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        settings: EditorSettings,
    ) {
        let mut state = lock(&self.inner.state);
        state.epoch += 1;
        state.cancel_debounce();
        state.cancel_revert();
        state.file_id = Some(file_id.into());
        state.title = title.into();
        state.content = content.into();
        state.last_saved_title = state.title.clone();
        state.last_saved_content = state.content.clone();
        state.has_changes = false;
        state.active = settings.autosave_on;
        state.status = SaveStatus::Idle;
        self.inner.status_tx.send_replace(SaveStatus::Idle);
    }

    pub fn update_title(&self, title: impl Into<String>) {
        let title = title.into();
        self.apply_edit(|state| state.title = title);
    }

    pub fn update_content(&self, content: impl Into<String>) {
        let content = content.into();
        self.apply_edit(|state| state.content = content);
    }

    fn apply_edit(&self, edit: impl FnOnce(&mut EngineState)) {
        let mut state = lock(&self.inner.state);
        edit(&mut state);

        // Dirty tracking and the debounce cycle only run while autosave is
        // active; edits still land in local state either way.
        if !state.active {
            return;
        }

        state.has_changes = state.trimmed_differs();
        state.cancel_debounce();

        if state.has_changes {
            let epoch = state.epoch;
            let inner = Arc::clone(&self.inner);
            let task = tokio::spawn(async move {
                tokio::time::sleep(DEBOUNCE_DELAY).await;
                inner.run_save(epoch).await;
            });
            state.debounce_task = Some(task.abort_handle());
        }
    }

    /// Cancels any pending debounce timer and saves immediately, subject to
    /// the usual guards (a file must be loaded and have pending changes).
    pub async fn force_save(&self) {
        let epoch = {
            let mut state = lock(&self.inner.state);
            state.cancel_debounce();
            state.epoch
        };
        self.inner.clone().run_save(epoch).await;
    }

    /// Turns autosave on or off for the loaded file. Turning it off cancels
    /// any pending debounce timer; turning it on arms nothing until the next
    /// edit.
    pub fn set_active(&self, active: bool) {
        let mut state = lock(&self.inner.state);
        state.active = active;
        if !active {
            state.cancel_debounce();
        }
    }

    #[must_use]
    pub fn status(&self) -> SaveStatus {
        lock(&self.inner.state).status
    }

    /// Status channel for the editing surface. The receiver sees every
    /// transition: `Saving`, `Saved`/`Error`, and the timed revert to `Idle`.
    #[must_use]
    pub fn subscribe_status(&self) -> watch::Receiver<SaveStatus> {
        self.inner.status_tx.subscribe()
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        lock(&self.inner.state).has_changes
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        lock(&self.inner.state).active
    }

    #[must_use]
    pub fn title(&self) -> String {
        lock(&self.inner.state).title.clone()
    }

    #[must_use]
    pub fn content(&self) -> String {
        lock(&self.inner.state).content.clone()
    }

    #[must_use]
    pub fn file_id(&self) -> Option<String> {
        lock(&self.inner.state).file_id.clone()
    }
}

impl<G: SaveGateway> EngineInner<G> {
    async fn run_save(self: Arc<Self>, epoch: u64) {
        let (file_id, title, content) = {
            let mut state = lock(&self.state);
            if state.epoch != epoch {
                return;
            }
            let Some(file_id) = state.file_id.clone() else {
                return;
            };
            if !state.has_changes {
                return;
            }
            // One request in flight at a time; the completion handler
            // recomputes the dirty flag so edits made meanwhile are not
            // lost, they just wait for the next trigger.
            if state.status == SaveStatus::Saving {
                return;
            }
            state.status = SaveStatus::Saving;
            self.status_tx.send_replace(SaveStatus::Saving);
            (file_id, state.title.clone(), state.content.clone())
        };

        let result = self.gateway.save_file(&file_id, &title, &content).await;

        let saved = result.is_ok();
        {
            let mut state = lock(&self.state);
            // The engine may have been pointed at another file while the
            // request was in flight. The write still happened server-side;
            // only local state is off limits.
            if state.epoch == epoch {
                match result {
                    Ok(()) => {
                        state.last_saved_title = title;
                        state.last_saved_content = content;
                        state.has_changes = state.trimmed_differs();
                        state.status = SaveStatus::Saved;
                        self.status_tx.send_replace(SaveStatus::Saved);
                        Self::schedule_revert(
                            &self,
                            &mut state,
                            SaveStatus::Saved,
                            SAVED_STATUS_WINDOW,
                        );
                    }
                    Err(e) => {
                        tracing::warn!("autosave failed for file {file_id}: {e:#}");
                        state.status = SaveStatus::Error;
                        self.status_tx.send_replace(SaveStatus::Error);
                        Self::schedule_revert(
                            &self,
                            &mut state,
                            SaveStatus::Error,
                            ERROR_STATUS_WINDOW,
                        );
                    }
                }
            }
        }

        if saved {
            // Cloned out so the registration lock is released before the
            // callback runs.
            let listener = lock(&self.on_saved).as_ref().map(Arc::clone);
            if let Some(listener) = listener {
                (*listener)();
            }
        }
    }

    fn schedule_revert(
        inner: &Arc<Self>,
        state: &mut EngineState,
        expected: SaveStatus,
        window: Duration,
    ) {
        state.cancel_revert();
        let epoch = state.epoch;
        let inner = Arc::clone(inner);
        let task = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let mut state = lock(&inner.state);
            if state.epoch == epoch && state.status == expected {
                state.status = SaveStatus::Idle;
                inner.status_tx.send_replace(SaveStatus::Idle);
            }
        });
        state.revert_task = Some(task.abort_handle());
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
