//! Async event loop around a [`Session`].
//!
//! One task owns the session. Store calls run as spawned tasks and report back
//! over a channel, so session logic never runs concurrently with itself.
//! Timers are slept on with `tokio::time`, which tests pause and advance.

use std::sync::Arc;
use std::time::Duration;

use foundation::time::Time;
use posts::Post;
use store::{ImageUpload, PostStore};
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::debug;

use crate::compose::PostComposer;
use crate::error::ClientError;
use crate::geolocation::Geolocator;
use crate::script::{ScriptLine, UiEvent};
use crate::session::{Command, Completion, Input, MapSurface, Session};

pub struct Driver<S> {
    session: Session,
    surface: S,
    store: Arc<dyn PostStore>,
    started: Instant,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions: Option<mpsc::UnboundedReceiver<Completion>>,
    in_flight: usize,
}

impl<S: MapSurface> Driver<S> {
    pub fn new(session: Session, surface: S, store: Arc<dyn PostStore>) -> Self {
        let (completions_tx, completions) = mpsc::unbounded_channel();
        Self {
            session,
            surface,
            store,
            started: Instant::now(),
            completions_tx,
            completions: Some(completions),
            in_flight: 0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn started(&self) -> Instant {
        self.started
    }

    pub fn into_parts(self) -> (Session, S) {
        (self.session, self.surface)
    }

    /// Milliseconds since the driver was created.
    pub fn now(&self) -> Time {
        let elapsed = self.started.elapsed().as_millis();
        Time(u64::try_from(elapsed).unwrap_or(u64::MAX))
    }

    /// Looks up the user's position, then fetches the top posts.
    ///
    /// Posts are fetched whether or not the lookup succeeds.
    pub async fn start(&mut self, geolocator: &dyn Geolocator) {
        let located = geolocator.current_position().await;
        let now = self.now();
        let commands = self
            .session
            .complete(Completion::Located(located), now, &mut self.surface);
        self.dispatch(commands);

        let commands = self.session.start();
        self.dispatch(commands);
    }

    /// Handles one input right away.
    pub fn input(&mut self, input: Input) {
        let now = self.now();
        let commands = self.session.handle(input, now, &mut self.surface);
        self.dispatch(commands);
    }

    /// Re-fetches the top posts and rebuilds the markers.
    pub fn refresh(&mut self) {
        self.input(Input::Refresh);
    }

    /// Creates a post through `composer`, then refreshes the map.
    pub async fn create_post(
        &mut self,
        composer: &PostComposer,
        text: &str,
        image: Option<ImageUpload>,
    ) -> Result<Post, ClientError> {
        let store = Arc::clone(&self.store);
        let post = composer.submit(store.as_ref(), text, image).await?;
        self.refresh();
        Ok(post)
    }

    /// Comments on the selected post, then refreshes the map.
    ///
    /// On failure the thread keeps the draft and raises its notice.
    pub async fn submit_comment(&mut self, text: &str) -> Result<(), ClientError> {
        let store = Arc::clone(&self.store);
        let thread = self
            .session
            .comments_mut()
            .ok_or(ClientError::NoSelection)?;
        thread.set_draft(text);
        thread.submit(store.as_ref()).await?;
        self.refresh();
        Ok(())
    }

    /// Runs until `events` closes and every timer and store call has settled.
    pub async fn run(&mut self, mut events: mpsc::Receiver<UiEvent>) {
        let Some(mut completions) = self.completions.take() else {
            return;
        };
        let mut open = true;

        loop {
            let wake = self
                .session
                .next_deadline()
                .map(|t| self.started + Duration::from_millis(t.as_millis()));
            if !open && self.in_flight == 0 && wake.is_none() {
                break;
            }

            tokio::select! {
                biased;

                Some(completion) = completions.recv() => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    let now = self.now();
                    let commands = self.session.complete(completion, now, &mut self.surface);
                    self.dispatch(commands);
                }
                event = events.recv(), if open => match event {
                    Some(event) => {
                        let input = event.into_input(self.session.generation());
                        self.input(input);
                    }
                    None => open = false,
                },
                _ = sleep_until(wake.unwrap_or(self.started)), if wake.is_some() => {
                    let now = self.now();
                    self.session.advance(now, &mut self.surface);
                }
            }
        }

        self.completions = Some(completions);
    }

    fn dispatch(&mut self, commands: Vec<Command>) {
        for command in commands {
            debug!(?command, "dispatching");
            let store = Arc::clone(&self.store);
            let tx = self.completions_tx.clone();
            self.in_flight += 1;
            tokio::spawn(async move {
                let completion = match command {
                    Command::FetchTopPosts { limit } => {
                        Completion::PostsFetched(store.fetch_top_posts(limit).await)
                    }
                    Command::IncrementView(increment) => Completion::ViewStored {
                        ticket: increment.ticket,
                        result: store
                            .update_post_views(increment.post_id, increment.views)
                            .await,
                    },
                    Command::FetchComments { post_id } => Completion::CommentsFetched {
                        result: store.fetch_comments(post_id.clone()).await,
                        post_id,
                    },
                };
                // The driver holds the receiver for as long as it can act on it.
                let _ = tx.send(completion);
            });
        }
    }
}

/// Sends each line's event at its scripted time, relative to `started`.
pub async fn feed_script(script: Vec<ScriptLine>, started: Instant, tx: mpsc::Sender<UiEvent>) {
    for line in script {
        sleep_until(started + Duration::from_millis(line.at)).await;
        if tx.send(line.event).await.is_err() {
            break;
        }
    }
}
