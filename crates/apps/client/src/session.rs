//! Top-level controller for one map view.
//!
//! A `Session` owns the post snapshot, the popup machine, the selection and
//! the viewport. It performs no I/O: inputs and store responses come in with
//! the current [`Time`], drawing goes to a [`MapSurface`], and remote work
//! goes out as [`Command`]s for the driver to run.

use foundation::math::LatLng;
use foundation::time::Time;
use layers::{
    CloseReason, MarkerCanvas, MarkerStyle, PopupContent, PopupMachine, PopupTransition,
    present_world,
};
use posts::{Comment, Post, PostId};
use runtime::event_bus::EventBus;
use scene::{
    GroupId, MapView, SelectionChange, SelectionController, ViewIncrement, ViewOutcome,
    ViewTicket, ViewportController, World,
};
use store::StoreError;
use tracing::{debug, info, warn};

use crate::comments::CommentThread;
use crate::config::{ClientConfig, LOCATED_ZOOM};
use crate::error::ClientError;

/// Everything the session draws on.
pub trait MapSurface: MapView + MarkerCanvas {}

impl<T: MapView + MarkerCanvas + ?Sized> MapSurface for T {}

/// Pointer and panel events from the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    MarkerEnter(GroupId),
    MarkerLeave(GroupId),
    PopupEnter(GroupId),
    PopupLeave(GroupId),
    PopupRemoved(GroupId),
    /// Click on the marker itself; selects the group's top post.
    MarkerClick(GroupId),
    PreviewClick {
        group: GroupId,
        post_id: PostId,
    },
    /// Click outside the detail panel, or on its close button.
    ClosePanel,
    /// Re-fetch the top posts, e.g. after a post was created.
    Refresh,
}

/// Result of a [`Command`] or of a host lookup.
#[derive(Debug)]
pub enum Completion {
    PostsFetched(Result<Vec<Post>, StoreError>),
    ViewStored {
        ticket: ViewTicket,
        result: Result<Post, StoreError>,
    },
    CommentsFetched {
        post_id: PostId,
        result: Result<Vec<Comment>, StoreError>,
    },
    Located(Result<LatLng, ClientError>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FetchTopPosts { limit: usize },
    IncrementView(ViewIncrement),
    FetchComments { post_id: PostId },
}

/// What the detail panel shows for the selected post.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub post_id: PostId,
    pub image_url: String,
    pub text: String,
    pub views: u64,
    /// Newest first; empty until the thread has loaded.
    pub comments: Vec<Comment>,
    pub comment_notice: Option<String>,
}

pub struct Session {
    top_limit: usize,
    style: MarkerStyle,
    world: World,
    popups: PopupMachine,
    selection: SelectionController,
    viewport: ViewportController,
    /// Popup descriptors of the current generation, indexed by group.
    contents: Vec<PopupContent>,
    /// Comments under the selected post.
    thread: Option<CommentThread>,
    location: Option<LatLng>,
    bus: EventBus,
}

impl Session {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            top_limit: config.top_limit,
            style: MarkerStyle::default(),
            world: World::new(config.cell_size_deg),
            popups: PopupMachine::new(config.popup_close_ms),
            selection: SelectionController::new(),
            viewport: ViewportController::new(config.viewport()),
            contents: Vec::new(),
            thread: None,
            location: None,
            bus: EventBus::new(),
        }
    }

    /// Commands to issue when the map is first shown.
    pub fn start(&self) -> Vec<Command> {
        vec![self.fetch()]
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn popups(&self) -> &PopupMachine {
        &self.popups
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    /// Marker-set generation that group indices currently refer to.
    pub fn generation(&self) -> u32 {
        self.world.generation()
    }

    pub fn location(&self) -> Option<LatLng> {
        self.location
    }

    /// Posting needs a known location.
    pub fn can_compose(&self) -> bool {
        self.location.is_some()
    }

    pub fn detail(&self) -> Option<DetailView> {
        let thread = self.thread.as_ref();
        self.selection.selected().map(|p| DetailView {
            post_id: p.id.clone(),
            image_url: p.image_url.clone(),
            text: p.text.clone(),
            views: p.views,
            comments: thread.map(|t| t.comments().to_vec()).unwrap_or_default(),
            comment_notice: thread.and_then(|t| t.notice()).map(str::to_string),
        })
    }

    pub fn comments(&self) -> Option<&CommentThread> {
        self.thread.as_ref()
    }

    /// The selected post's thread, for drafting and submitting.
    pub fn comments_mut(&mut self) -> Option<&mut CommentThread> {
        self.thread.as_mut()
    }

    pub fn trace(&self) -> &EventBus {
        &self.bus
    }

    pub fn next_deadline(&self) -> Option<Time> {
        match (self.popups.next_deadline(), self.viewport.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn handle<S>(&mut self, input: Input, now: Time, surface: &mut S) -> Vec<Command>
    where
        S: MapSurface + ?Sized,
    {
        match input {
            Input::MarkerEnter(group) => {
                let transitions = self.popups.marker_enter(group);
                self.apply_popups(transitions, now, surface);
            }
            Input::MarkerLeave(group) => self.popups.marker_leave(group, now),
            Input::PopupEnter(group) => self.popups.popup_enter(group),
            Input::PopupLeave(group) => self.popups.popup_leave(group, now),
            Input::PopupRemoved(group) => {
                let transitions = self.popups.popup_removed(group);
                self.apply_popups(transitions, now, surface);
            }
            Input::MarkerClick(group) => {
                let top = self.world.group(group).and_then(|g| g.top()).cloned();
                match top {
                    Some(post) => return self.select(post, now, surface),
                    None => debug!(%group, "click on stale marker ignored"),
                }
            }
            Input::PreviewClick { group, post_id } => {
                let post = self
                    .world
                    .group(group)
                    .and_then(|g| g.find(&post_id))
                    .cloned();
                match post {
                    Some(post) => return self.select(post, now, surface),
                    None => debug!(%group, post = %post_id, "click on stale preview ignored"),
                }
            }
            Input::ClosePanel => {
                if let Some(post) = self.selection.deselect() {
                    self.thread = None;
                    self.viewport.on_cleared(surface, now);
                    self.bus.emit(now, "selection.cleared", post.id.to_string());
                }
            }
            Input::Refresh => return vec![self.fetch()],
        }
        Vec::new()
    }

    pub fn complete<S>(&mut self, completion: Completion, now: Time, surface: &mut S) -> Vec<Command>
    where
        S: MapSurface + ?Sized,
    {
        match completion {
            Completion::PostsFetched(Ok(posts)) => self.rebuild(posts, now, surface),
            Completion::PostsFetched(Err(e)) => {
                warn!(error = %e, "failed to fetch posts");
                self.bus.emit(now, "fetch.failed", e.to_string());
            }
            Completion::ViewStored { ticket, result } => {
                let outcome = match result {
                    Ok(stored) => self
                        .selection
                        .apply_stored(ticket, &stored, self.world.posts_mut()),
                    Err(e) => {
                        debug!(error = %e, ticket = ticket.get(), "view increment failed");
                        self.selection.apply_failed(ticket)
                    }
                };
                self.record_view(outcome, now);
            }
            Completion::CommentsFetched { post_id, result } => {
                let thread = self.thread.as_mut().filter(|t| t.post_id() == &post_id);
                match (thread, result) {
                    (Some(thread), Ok(comments)) => {
                        let count = comments.len();
                        self.bus.emit(now, "comments.loaded", format!("{post_id}: {count}"));
                        thread.replace(comments);
                    }
                    (Some(_), Err(e)) => {
                        warn!(post = %post_id, error = %e, "failed to fetch comments");
                        self.bus.emit(now, "comments.failed", e.to_string());
                    }
                    (None, _) => debug!(post = %post_id, "comments for an unselected post ignored"),
                }
            }
            Completion::Located(Ok(position)) => {
                info!(lat = position.lat, lng = position.lng, "located user");
                self.location = Some(position);
                surface.set_view(position, LOCATED_ZOOM);
                self.bus.emit(now, "located", format!("{:.5},{:.5}", position.lat, position.lng));
            }
            Completion::Located(Err(e)) => {
                warn!(error = %e, "geolocation failed; posting disabled");
                self.location = None;
                self.bus.emit(now, "geolocation.failed", e.to_string());
            }
        }
        Vec::new()
    }

    /// Fires popup close timers and the deferred viewport step due at `now`.
    pub fn advance<S>(&mut self, now: Time, surface: &mut S)
    where
        S: MapSurface + ?Sized,
    {
        let transitions = self.popups.advance(now);
        self.apply_popups(transitions, now, surface);
        if self.viewport.advance(surface, now) {
            let c = surface.center();
            self.bus.emit(
                now,
                "viewport",
                format!("{:.5},{:.5} z{}", c.lat, c.lng, surface.zoom()),
            );
        }
    }

    fn fetch(&self) -> Command {
        Command::FetchTopPosts {
            limit: self.top_limit,
        }
    }

    fn select<S>(&mut self, post: Post, now: Time, surface: &mut S) -> Vec<Command>
    where
        S: MapSurface + ?Sized,
    {
        let (change, increment) = self.selection.select(&post, self.world.posts());
        if change == SelectionChange::Entered {
            self.viewport.on_selected(surface, now);
        }
        self.bus.emit(now, "selection", format!("{} {change:?}", post.id));

        if self.thread.as_ref().is_none_or(|t| t.post_id() != &post.id) {
            self.thread = Some(CommentThread::new(post.id.clone()));
        }
        vec![
            Command::IncrementView(increment),
            Command::FetchComments { post_id: post.id },
        ]
    }

    fn rebuild<S>(&mut self, posts: Vec<Post>, now: Time, surface: &mut S)
    where
        S: MapSurface + ?Sized,
    {
        let count = posts.len();
        let generation = self.world.replace_posts(posts);
        self.selection.retain_posts(self.world.posts());
        let torn_down = self.popups.rebuild(generation, self.world.group_count());
        self.apply_popups(torn_down, now, surface);

        let (markers, contents): (Vec<_>, Vec<_>) =
            present_world(&self.world, &self.style).into_iter().unzip();
        surface.replace_markers(generation, &markers);
        self.contents = contents;
        self.bus.emit(
            now,
            "markers.rebuilt",
            format!("generation {generation}: {} groups from {count} posts", markers.len()),
        );
    }

    fn apply_popups<S>(&mut self, transitions: Vec<PopupTransition>, now: Time, surface: &mut S)
    where
        S: MapSurface + ?Sized,
    {
        for transition in transitions {
            match transition {
                PopupTransition::Opened(group) => {
                    let content = self
                        .contents
                        .get(group.index() as usize)
                        .filter(|c| c.group == group);
                    if let Some(content) = content {
                        surface.open_popup(content);
                    }
                    self.bus.emit(now, "popup.opened", group.to_string());
                }
                PopupTransition::Closed(group, reason) => {
                    // Torn-down popups went with their markers.
                    if reason != CloseReason::Teardown {
                        surface.close_popup(group);
                    }
                    self.bus.emit(now, "popup.closed", format!("{group} {reason:?}"));
                }
            }
        }
    }

    fn record_view(&mut self, outcome: ViewOutcome, now: Time) {
        match outcome {
            ViewOutcome::Applied { post_id, views } => {
                self.bus.emit(now, "view.applied", format!("{post_id} = {views}"));
            }
            ViewOutcome::Stale { post_id } => {
                self.bus.emit(now, "view.stale", post_id.to_string());
            }
            ViewOutcome::Dropped { post_id } => {
                self.bus.emit(now, "view.dropped", post_id.to_string());
            }
            ViewOutcome::Unknown => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Command, Completion, Input, Session};
    use crate::config::{ClientConfig, DEFAULT_CENTER, DEFAULT_ZOOM};
    use crate::error::ClientError;
    use crate::headless::HeadlessMap;
    use chrono::{TimeZone, Utc};
    use foundation::math::LatLng;
    use foundation::time::Time;
    use layers::PopupEntry;
    use posts::{Comment, CommentId, Post, PostId};
    use pretty_assertions::assert_eq;
    use scene::{GroupId, MapView};
    use store::StoreError;

    fn post(id: &str, lat: f64, lng: f64, views: u64) -> Post {
        Post {
            id: PostId::new(id),
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            latitude: lat,
            longitude: lng,
            image_url: format!("https://img.example/{id}.png"),
            text: format!("post {id}"),
            views,
            owner_id: None,
        }
    }

    fn fixture() -> Vec<Post> {
        vec![
            post("a", 37.56650, 126.97800, 9),
            post("b", 37.56651, 126.97801, 3),
            post("c", 37.6, 127.0, 1),
        ]
    }

    fn loaded() -> (Session, HeadlessMap) {
        let mut session = Session::new(&ClientConfig::default());
        let mut map = HeadlessMap::new(DEFAULT_CENTER, DEFAULT_ZOOM);
        session.complete(Completion::PostsFetched(Ok(fixture())), Time(0), &mut map);
        (session, map)
    }

    fn g(index: u32, session: &Session) -> GroupId {
        GroupId::new(index, session.generation())
    }

    fn increment(commands: &[Command]) -> &scene::ViewIncrement {
        match commands {
            [Command::IncrementView(inc), Command::FetchComments { .. }] => inc,
            other => panic!("expected an increment and a comment fetch, got {other:?}"),
        }
    }

    #[test]
    fn start_fetches_top_posts() {
        let session = Session::new(&ClientConfig::default());
        assert_eq!(session.start(), vec![Command::FetchTopPosts { limit: 15 }]);
    }

    #[test]
    fn fetch_draws_one_marker_per_group() {
        let (session, map) = loaded();
        assert_eq!(map.generation(), session.generation());
        let badges: Vec<&str> = map.markers().iter().map(|m| m.badge.as_str()).collect();
        assert_eq!(badges, vec!["2", "1"]);
    }

    #[test]
    fn hover_opens_popup_for_that_group() {
        let (mut session, mut map) = loaded();
        let first = g(0, &session);
        session.handle(Input::MarkerEnter(first), Time(10), &mut map);

        let popup = map.popup().expect("popup shown");
        assert_eq!(popup.group, first);
        let ids: Vec<&PostId> = popup.previews().collect();
        assert_eq!(ids, vec![&PostId::new("a"), &PostId::new("b")]);

        session.handle(Input::MarkerLeave(first), Time(20), &mut map);
        assert_eq!(session.next_deadline(), Some(Time(140)));
        session.advance(Time(140), &mut map);
        assert!(map.popup().is_none());
    }

    #[test]
    fn marker_click_selects_top_post_and_shrinks_map() {
        let (mut session, mut map) = loaded();
        let commands = session.handle(Input::MarkerClick(g(0, &session)), Time(5), &mut map);
        let inc = increment(&commands);
        assert_eq!(inc.post_id, PostId::new("a"));
        assert_eq!(inc.views, 10);

        let detail = session.detail().expect("panel open");
        assert_eq!(detail.views, 9);
        assert_eq!(map.height_fraction(), 0.5);
        assert_eq!(map.invalidations(), 0);

        session.advance(Time(105), &mut map);
        assert_eq!(map.invalidations(), 1);
        assert_eq!(map.center(), DEFAULT_CENTER);
    }

    #[test]
    fn preview_click_selects_that_post() {
        let (mut session, mut map) = loaded();
        let commands = session.handle(
            Input::PreviewClick {
                group: g(0, &session),
                post_id: PostId::new("b"),
            },
            Time(0),
            &mut map,
        );
        assert_eq!(increment(&commands).post_id, PostId::new("b"));
        assert_eq!(session.detail().unwrap().post_id, PostId::new("b"));
    }

    #[test]
    fn stored_count_reaches_list_and_panel() {
        let (mut session, mut map) = loaded();
        let commands = session.handle(Input::MarkerClick(g(1, &session)), Time(0), &mut map);
        let ticket = increment(&commands).ticket;

        let mut stored = post("c", 37.6, 127.0, 2);
        stored.text = "ignored".into();
        session.complete(
            Completion::ViewStored {
                ticket,
                result: Ok(stored),
            },
            Time(30),
            &mut map,
        );
        assert_eq!(session.detail().unwrap().views, 2);
        assert_eq!(session.world().post(&PostId::new("c")).unwrap().views, 2);
    }

    #[test]
    fn late_response_does_not_roll_count_back() {
        let (mut session, mut map) = loaded();
        let group = g(1, &session);
        let first = increment(&session.handle(Input::MarkerClick(group), Time(0), &mut map)).ticket;
        session.handle(Input::ClosePanel, Time(10), &mut map);
        let second =
            increment(&session.handle(Input::MarkerClick(group), Time(20), &mut map)).ticket;

        let ok = |views| Ok(post("c", 37.6, 127.0, views));
        session.complete(
            Completion::ViewStored { ticket: second, result: ok(3) },
            Time(30),
            &mut map,
        );
        session.complete(
            Completion::ViewStored { ticket: first, result: ok(2) },
            Time(40),
            &mut map,
        );
        assert_eq!(session.world().post(&PostId::new("c")).unwrap().views, 3);
        assert_eq!(session.detail().unwrap().views, 3);
    }

    #[test]
    fn reopening_after_stored_count_shows_it() {
        let (mut session, mut map) = loaded();
        let group = g(1, &session);
        let commands = session.handle(Input::MarkerClick(group), Time(0), &mut map);
        session.complete(
            Completion::ViewStored {
                ticket: increment(&commands).ticket,
                result: Ok(post("c", 37.6, 127.0, 2)),
            },
            Time(10),
            &mut map,
        );
        session.handle(Input::ClosePanel, Time(20), &mut map);

        let commands = session.handle(Input::MarkerClick(group), Time(30), &mut map);
        assert_eq!(session.detail().unwrap().views, 2);
        assert_eq!(increment(&commands).views, 3);
    }

    #[test]
    fn refetch_forgets_posts_no_longer_listed() {
        let (mut session, mut map) = loaded();
        let commands = session.handle(Input::MarkerClick(g(1, &session)), Time(0), &mut map);
        session.complete(
            Completion::ViewStored {
                ticket: increment(&commands).ticket,
                result: Ok(post("c", 37.6, 127.0, 2)),
            },
            Time(10),
            &mut map,
        );
        assert_eq!(session.selection().tracked_posts(), 1);

        let remaining = vec![post("a", 37.56650, 126.97800, 9)];
        session.complete(Completion::PostsFetched(Ok(remaining)), Time(20), &mut map);
        assert_eq!(session.selection().tracked_posts(), 0);
    }

    fn comment(id: &str, post_id: &str, text: &str) -> Comment {
        Comment {
            id: CommentId(id.into()),
            created_at: Utc.timestamp_opt(1_700_000_100, 0).unwrap(),
            post_id: PostId::new(post_id),
            text: text.into(),
            user_id: None,
        }
    }

    #[test]
    fn selecting_loads_thread_into_panel() {
        let (mut session, mut map) = loaded();
        let commands = session.handle(Input::MarkerClick(g(0, &session)), Time(0), &mut map);
        assert_eq!(
            commands.last(),
            Some(&Command::FetchComments {
                post_id: PostId::new("a")
            })
        );
        assert!(session.detail().unwrap().comments.is_empty());

        session.complete(
            Completion::CommentsFetched {
                post_id: PostId::new("a"),
                result: Ok(vec![comment("k1", "a", "nice")]),
            },
            Time(5),
            &mut map,
        );
        let detail = session.detail().unwrap();
        assert_eq!(detail.comments, vec![comment("k1", "a", "nice")]);
        assert_eq!(detail.comment_notice, None);

        session.handle(Input::ClosePanel, Time(10), &mut map);
        assert!(session.comments().is_none());
    }

    #[test]
    fn comments_for_another_post_are_ignored() {
        let (mut session, mut map) = loaded();
        session.handle(Input::MarkerClick(g(0, &session)), Time(0), &mut map);
        session.handle(Input::MarkerClick(g(1, &session)), Time(5), &mut map);
        session.complete(
            Completion::CommentsFetched {
                post_id: PostId::new("a"),
                result: Ok(vec![comment("k1", "a", "late")]),
            },
            Time(10),
            &mut map,
        );

        let thread = session.comments().unwrap();
        assert_eq!(thread.post_id(), &PostId::new("c"));
        assert!(thread.comments().is_empty());
    }

    #[test]
    fn removed_popup_leaves_nothing_on_map() {
        let (mut session, mut map) = loaded();
        let first = g(0, &session);
        session.handle(Input::MarkerEnter(first), Time(0), &mut map);
        assert!(map.popup().is_some());

        session.handle(Input::PopupRemoved(first), Time(5), &mut map);
        assert_eq!(session.popups().open_group(), None);
        assert!(map.popup().is_none());
    }

    #[test]
    fn failed_increment_keeps_displayed_count() {
        let (mut session, mut map) = loaded();
        let commands = session.handle(Input::MarkerClick(g(1, &session)), Time(0), &mut map);
        session.complete(
            Completion::ViewStored {
                ticket: increment(&commands).ticket,
                result: Err(StoreError::Unavailable("down".into())),
            },
            Time(10),
            &mut map,
        );
        assert_eq!(session.detail().unwrap().views, 1);
        assert_eq!(session.selection().pending_increments(), 0);
    }

    #[test]
    fn select_then_close_restores_view() {
        let (mut session, mut map) = loaded();
        let before = (map.center(), map.zoom());

        session.handle(Input::MarkerClick(g(0, &session)), Time(0), &mut map);
        session.advance(Time(100), &mut map);
        session.handle(Input::ClosePanel, Time(200), &mut map);
        assert_eq!(map.height_fraction(), 1.0);
        assert!(session.detail().is_none());

        session.advance(Time(300), &mut map);
        assert_eq!((map.center(), map.zoom()), before);
        assert_eq!(session.next_deadline(), None);
    }

    #[test]
    fn switching_posts_keeps_first_saved_view() {
        let (mut session, mut map) = loaded();
        let before = map.center();
        session.handle(Input::MarkerClick(g(0, &session)), Time(0), &mut map);
        session.advance(Time(100), &mut map);
        map.pan_to(LatLng::new(1.0, 2.0), 5.0);

        session.handle(Input::MarkerClick(g(1, &session)), Time(200), &mut map);
        session.handle(Input::ClosePanel, Time(300), &mut map);
        session.advance(Time(400), &mut map);
        assert_eq!(map.center(), before);
        assert_eq!(map.zoom(), DEFAULT_ZOOM);
    }

    #[test]
    fn refetch_tears_down_popup_and_stales_old_ids() {
        let (mut session, mut map) = loaded();
        let old = g(0, &session);
        session.handle(Input::MarkerEnter(old), Time(0), &mut map);
        session.handle(Input::MarkerLeave(old), Time(10), &mut map);

        assert_eq!(
            session.handle(Input::Refresh, Time(20), &mut map),
            vec![Command::FetchTopPosts { limit: 15 }]
        );
        session.complete(Completion::PostsFetched(Ok(fixture())), Time(30), &mut map);
        assert_eq!(session.popups().open_group(), None);
        assert_eq!(session.popups().pending_timers(), 0);

        assert!(session.handle(Input::MarkerClick(old), Time(40), &mut map).is_empty());
        session.handle(Input::MarkerEnter(old), Time(50), &mut map);
        assert!(map.popup().is_none());
        assert_eq!(session.trace().count("popup.closed"), 1);
    }

    #[test]
    fn fetch_failure_keeps_previous_markers() {
        let (mut session, mut map) = loaded();
        let generation = session.generation();
        session.complete(
            Completion::PostsFetched(Err(StoreError::Unavailable("offline".into()))),
            Time(10),
            &mut map,
        );
        assert_eq!(session.generation(), generation);
        assert_eq!(map.markers().len(), 2);
        assert_eq!(session.trace().last().map(|e| e.kind), Some("fetch.failed"));
    }

    #[test]
    fn geolocation_moves_map_and_enables_posting() {
        let mut session = Session::new(&ClientConfig::default());
        let mut map = HeadlessMap::new(DEFAULT_CENTER, DEFAULT_ZOOM);

        session.complete(
            Completion::Located(Err(ClientError::Geolocation("denied".into()))),
            Time(0),
            &mut map,
        );
        assert!(!session.can_compose());
        assert_eq!(map.center(), DEFAULT_CENTER);

        let here = LatLng::new(35.1796, 129.0756);
        session.complete(Completion::Located(Ok(here)), Time(5), &mut map);
        assert!(session.can_compose());
        assert_eq!((map.center(), map.zoom()), (here, 14.0));
    }

    #[test]
    fn large_group_popup_ends_with_more_entry() {
        let mut session = Session::new(&ClientConfig::default());
        let mut map = HeadlessMap::new(DEFAULT_CENTER, DEFAULT_ZOOM);
        let posts = (0..6).map(|i| post(&format!("p{i}"), 1.0, 1.0, i)).collect();
        session.complete(Completion::PostsFetched(Ok(posts)), Time(0), &mut map);
        session.handle(Input::MarkerEnter(g(0, &session)), Time(1), &mut map);

        let popup = map.popup().unwrap();
        assert_eq!(popup.entries.len(), 5);
        assert_eq!(popup.entries.last(), Some(&PopupEntry::More { remaining: 2 }));
    }
}
