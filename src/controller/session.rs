//! Message-driven search session.
//!
//! A [`SearchSession`] task owns the [`SearchController`]. Commands arrive on
//! an mpsc channel; provider calls run as spawned tasks and report back on a
//! completion channel, so several requests may be in flight while state is
//! still mutated by exactly one task. Snapshots are published on a `watch`
//! channel after every change.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::download::{AssetDownloader, DownloadError, SavedAsset};
use crate::provider::{Image, ProviderError, SearchPage};

use super::{Completion, PendingSearch, SearchController, SearchError, SearchState};

/// Command channel capacity.
const COMMAND_BUFFER: usize = 32;

/// Acknowledgement sent once a command has been accepted: the sequence
/// number of the issued request, or `None` when nothing was issued.
type Ack = oneshot::Sender<Result<Option<u64>, SearchError>>;

/// Commands understood by the session task.
#[derive(Debug)]
pub enum SessionCommand {
    /// Load the default term.
    LoadDefault { ack: Ack },
    /// Replace the query input text.
    SetQueryInput { text: String, ack: Ack },
    /// Search for the given term.
    Submit { term: String, ack: Ack },
    /// Search for the current query input.
    SubmitQueryInput { ack: Ack },
    /// Navigate to a page.
    GoToPage { page: u32, ack: Ack },
    /// Navigate to the next page.
    NextPage { ack: Ack },
    /// Navigate to the previous page.
    PrevPage { ack: Ack },
    /// Download an image's full-resolution asset.
    Download {
        image: Box<Image>,
        reply: oneshot::Sender<Result<SavedAsset, DownloadError>>,
    },
}

type CompletionMsg = (PendingSearch, Result<SearchPage, ProviderError>);

/// The state-owning task.
pub struct SearchSession {
    controller: SearchController,
    downloader: Arc<AssetDownloader>,
    commands: mpsc::Receiver<SessionCommand>,
    completions_tx: mpsc::UnboundedSender<CompletionMsg>,
    completions_rx: mpsc::UnboundedReceiver<CompletionMsg>,
    state_tx: watch::Sender<SearchState>,
}

impl SearchSession {
    /// Spawns the session task and returns a handle to drive it.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(controller: SearchController, downloader: Arc<AssetDownloader>) -> SessionHandle {
        let (commands_tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(controller.state().clone());

        let session = Self {
            controller,
            downloader,
            commands,
            completions_tx,
            completions_rx,
            state_tx,
        };
        let task = tokio::spawn(session.run());

        SessionHandle {
            commands: commands_tx,
            state: state_rx,
            task,
        }
    }

    async fn run(mut self) {
        debug!("search session started");
        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    let Some(command) = command else { break };
                    self.handle(command);
                }
                Some((pending, outcome)) = self.completions_rx.recv() => {
                    // Failures are already logged by the controller.
                    match self.controller.apply(pending, outcome) {
                        Ok(Completion::Stale) => self.publish_if_changed(),
                        _ => self.publish(),
                    }
                }
            }
        }
        debug!("search session stopped");
    }

    fn handle(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::LoadDefault { ack } => {
                let pending = self.controller.begin_load_default();
                self.dispatch_and_ack(Some(pending), ack);
            }
            SessionCommand::SetQueryInput { text, ack } => {
                self.controller.set_query_input(text);
                self.publish();
                let _ = ack.send(Ok(None));
            }
            SessionCommand::Submit { term, ack } => match self.controller.begin_submit(&term) {
                Ok(pending) => self.dispatch_and_ack(Some(pending), ack),
                Err(error) => {
                    let _ = ack.send(Err(error));
                }
            },
            SessionCommand::SubmitQueryInput { ack } => {
                match self.controller.begin_submit_query_input() {
                    Ok(pending) => self.dispatch_and_ack(Some(pending), ack),
                    Err(error) => {
                        let _ = ack.send(Err(error));
                    }
                }
            }
            SessionCommand::GoToPage { page, ack } => {
                let pending = self.controller.begin_go_to_page(page);
                self.dispatch_and_ack(pending, ack);
            }
            SessionCommand::NextPage { ack } => {
                let pending = self.controller.begin_next_page();
                self.dispatch_and_ack(pending, ack);
            }
            SessionCommand::PrevPage { ack } => {
                let pending = self.controller.begin_prev_page();
                self.dispatch_and_ack(pending, ack);
            }
            SessionCommand::Download { image, reply } => {
                let downloader = Arc::clone(&self.downloader);
                tokio::spawn(async move {
                    let result = downloader.download(&image).await;
                    let _ = reply.send(result);
                });
            }
        }
    }

    fn dispatch_and_ack(&mut self, pending: Option<PendingSearch>, ack: Ack) {
        let seq = pending.as_ref().map(PendingSearch::seq);
        if let Some(pending) = pending {
            let provider = self.controller.provider();
            let completions = self.completions_tx.clone();
            tokio::spawn(async move {
                let outcome = provider.search(pending.request()).await;
                if completions.send((pending, outcome)).is_err() {
                    warn!("search session closed before response arrived");
                }
            });
            self.publish();
        }
        let _ = ack.send(Ok(seq));
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.controller.state().clone());
    }

    fn publish_if_changed(&self) {
        let state = self.controller.state();
        self.state_tx.send_if_modified(|current| {
            if current == state {
                return false;
            }
            current.clone_from(state);
            true
        });
    }
}

/// Client side of a running [`SearchSession`].
#[derive(Debug)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    state: watch::Receiver<SearchState>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    async fn request(
        &self,
        build: impl FnOnce(Ack) -> SessionCommand,
    ) -> Result<Option<u64>, SearchError> {
        let (ack, accepted) = oneshot::channel();
        self.commands
            .send(build(ack))
            .await
            .map_err(|_| SearchError::SessionClosed)?;
        accepted.await.map_err(|_| SearchError::SessionClosed)?
    }

    /// Issues the default load. Returns the request sequence number.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::SessionClosed`] if the task has stopped.
    pub async fn load_default(&self) -> Result<Option<u64>, SearchError> {
        self.request(|ack| SessionCommand::LoadDefault { ack }).await
    }

    /// Replaces the query input text.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::SessionClosed`] if the task has stopped.
    pub async fn set_query_input(&self, text: impl Into<String>) -> Result<(), SearchError> {
        let text = text.into();
        self.request(|ack| SessionCommand::SetQueryInput { text, ack })
            .await
            .map(|_| ())
    }

    /// Issues a search for `term`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::EmptyQuery`] for blank terms or
    /// [`SearchError::SessionClosed`] if the task has stopped.
    pub async fn submit(&self, term: impl Into<String>) -> Result<Option<u64>, SearchError> {
        let term = term.into();
        self.request(|ack| SessionCommand::Submit { term, ack }).await
    }

    /// Issues a search for the current query input.
    ///
    /// # Errors
    ///
    /// Same as [`submit`](Self::submit).
    pub async fn submit_query_input(&self) -> Result<Option<u64>, SearchError> {
        self.request(|ack| SessionCommand::SubmitQueryInput { ack })
            .await
    }

    /// Navigates to `page`; `Ok(None)` when out of range.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::SessionClosed`] if the task has stopped.
    pub async fn go_to_page(&self, page: u32) -> Result<Option<u64>, SearchError> {
        self.request(|ack| SessionCommand::GoToPage { page, ack })
            .await
    }

    /// Navigates to the next page; `Ok(None)` at the last page.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::SessionClosed`] if the task has stopped.
    pub async fn next_page(&self) -> Result<Option<u64>, SearchError> {
        self.request(|ack| SessionCommand::NextPage { ack }).await
    }

    /// Navigates to the previous page; `Ok(None)` at the first page.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::SessionClosed`] if the task has stopped.
    pub async fn prev_page(&self) -> Result<Option<u64>, SearchError> {
        self.request(|ack| SessionCommand::PrevPage { ack }).await
    }

    /// Downloads `image`; independent of any search in flight.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Download`] on fetch/save failure or
    /// [`SearchError::SessionClosed`] if the task has stopped.
    pub async fn download(&self, image: Image) -> Result<SavedAsset, SearchError> {
        let (reply, result) = oneshot::channel();
        self.commands
            .send(SessionCommand::Download {
                image: Box::new(image),
                reply,
            })
            .await
            .map_err(|_| SearchError::SessionClosed)?;
        let saved = result.await.map_err(|_| SearchError::SessionClosed)??;
        Ok(saved)
    }

    /// Latest published state.
    #[must_use]
    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// A receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.clone()
    }

    /// Waits until no request is outstanding and returns that state.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::SessionClosed`] if the task has stopped.
    pub async fn wait_until_idle(&mut self) -> Result<SearchState, SearchError> {
        let state = self
            .state
            .wait_for(|state| !state.loading)
            .await
            .map_err(|_| SearchError::SessionClosed)?;
        Ok(state.clone())
    }

    /// Stops the session task; in-flight responses are dropped.
    pub async fn shutdown(self) {
        drop(self.commands);
        if let Err(error) = self.task.await {
            warn!(error = %error, "search session task ended abnormally");
        }
    }
}
