use crate::adapter::MovieAdapter;
use crate::catalog::{status_of, CatalogApi, PopularRequest, SearchRequest};
use crate::models::{Movie, MoviePage};
use crate::view::{ListScreen, Navigator, Notice};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    Idle,
    LoadingPopular,
    LoadingSearch,
    Displaying,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Popular,
    Search(String),
}

#[derive(Debug)]
pub struct Completion {
    pub id: RequestId,
    pub query: Query,
    pub outcome: Result<MoviePage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    QueryChanged(String),
    ClearPressed,
    RowTapped(usize),
    Quit,
}

pub struct MovieListController<S: ListScreen> {
    catalog: Arc<dyn CatalogApi>,
    navigator: Box<dyn Navigator>,
    screen: S,
    adapter: MovieAdapter,
    state: ListState,
    clear_visible: bool,
    last_issued: RequestId,
    in_flight: usize,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl<S: ListScreen> MovieListController<S> {
    pub fn new(catalog: Arc<dyn CatalogApi>, screen: S, navigator: Box<dyn Navigator>) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            catalog,
            navigator,
            screen,
            adapter: MovieAdapter::new(),
            state: ListState::Idle,
            clear_visible: false,
            last_issued: 0,
            in_flight: 0,
            completions_tx,
            completions_rx,
        }
    }

    pub fn state(&self) -> ListState {
        self.state
    }

    pub fn adapter(&self) -> &MovieAdapter {
        &self.adapter
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut S {
        &mut self.screen
    }

    pub fn clear_button_visible(&self) -> bool {
        self.clear_visible
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn start(&mut self) -> RequestId {
        self.issue(Query::Popular)
    }

    pub fn handle_event(&mut self, event: UiEvent) -> bool {
        match event {
            UiEvent::QueryChanged(text) => {
                self.on_query_changed(&text);
            }
            UiEvent::ClearPressed => {
                self.on_clear_pressed();
            }
            UiEvent::RowTapped(position) => self.on_row_tapped(position),
            UiEvent::Quit => return false,
        }
        true
    }

    pub fn on_query_changed(&mut self, text: &str) -> RequestId {
        let query = text.trim();
        self.set_clear_visible(!query.is_empty());
        if query.is_empty() {
            self.issue(Query::Popular)
        } else {
            self.issue(Query::Search(query.to_string()))
        }
    }

    pub fn on_clear_pressed(&mut self) -> RequestId {
        self.screen.clear_search_field();
        let id = self.issue(Query::Popular);
        self.set_clear_visible(false);
        id
    }

    pub fn on_row_tapped(&mut self, position: usize) {
        self.adapter.on_item_click(position, self.navigator.as_ref());
    }

    fn set_clear_visible(&mut self, visible: bool) {
        if self.clear_visible != visible {
            self.clear_visible = visible;
            self.screen.set_clear_button_visible(visible);
        }
    }

    fn issue(&mut self, query: Query) -> RequestId {
        self.last_issued += 1;
        let id = self.last_issued;
        self.in_flight += 1;
        self.state = match query {
            Query::Popular => ListState::LoadingPopular,
            Query::Search(_) => ListState::LoadingSearch,
        };
        debug!(request_id = id, query = ?query, in_flight = self.in_flight, "Issuing catalog request");

        let catalog = Arc::clone(&self.catalog);
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let outcome = match &query {
                Query::Popular => catalog.popular(&PopularRequest::default()).await,
                Query::Search(text) => catalog.search(&SearchRequest::new(text.clone())).await,
            };
            if tx.send(Completion { id, query, outcome }).is_err() {
                debug!(request_id = id, "Screen closed before completion was delivered");
            }
        });
        id
    }

    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.completions_rx.recv().await
    }

    // Requests are never cancelled: whichever response arrives last stays on screen.
    pub fn apply(&mut self, completion: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let Completion { id, query, outcome } = completion;
        if id < self.last_issued {
            debug!(
                request_id = id,
                latest = self.last_issued,
                "Applying response of a superseded request"
            );
        }

        match (query, outcome) {
            (Query::Popular, Ok(page)) => {
                info!(request_id = id, "Loaded {} popular movies", page.docs.len());
                self.display(page.docs);
            }
            (Query::Popular, Err(e)) => {
                match status_of(&e) {
                    Some(status) => error!(request_id = id, "Popular load failed with status {}", status),
                    None => error!(request_id = id, "Popular load network error: {:#}", e),
                }
                self.state = ListState::Error;
            }
            (Query::Search(text), Ok(page)) => {
                info!(request_id = id, query = %text, "Search returned {} movies", page.docs.len());
                let empty = page.docs.is_empty();
                self.display(page.docs);
                if empty {
                    self.screen.show_notice(Notice::NotFound);
                }
            }
            (Query::Search(text), Err(e)) => {
                warn!(request_id = id, query = %text, "Search failed: {:#}", e);
                self.state = ListState::Error;
                let notice = if status_of(&e).is_some() {
                    Notice::NotFound
                } else {
                    Notice::SearchFailed(format!("{:#}", e))
                };
                self.screen.show_notice(notice);
            }
        }
    }

    fn display(&mut self, movies: Vec<Movie>) {
        self.adapter.set_movies(movies);
        self.state = ListState::Displaying;
        self.screen.data_set_changed(&self.adapter);
    }

    pub async fn run(&mut self, mut events: mpsc::UnboundedReceiver<UiEvent>) {
        self.start();
        loop {
            tokio::select! {
                event = events.recv() => {
                    match event {
                        Some(event) => {
                            if !self.handle_event(event) {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                Some(completion) = self.completions_rx.recv() => {
                    self.apply(completion);
                }
            }
        }
        info!("Movie list closed with {} request(s) still in flight", self.in_flight);
    }
}
