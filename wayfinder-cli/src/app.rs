//! The interactive session: one search engine, a map and the chosen destination.

use std::error::Error;

use tokio::sync::{mpsc, watch};
use wayfinder_lib::map::{DEFAULT_CENTER, FixedGeolocator, MapView};
use wayfinder_lib::{Candidate, Coordinates, LocationSearch, SuggestionView};

use crate::command::{Command, HELP};
use crate::render;
use crate::rides::RIDE_OPTIONS;
use crate::session::Session;

/// Whether the input loop keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    session: Session,
    search: LocationSearch,
    changes: watch::Receiver<u64>,
    picked_tx: mpsc::UnboundedSender<Candidate>,
    map: MapView,
    user_location: Option<Coordinates>,
    destination: Option<Candidate>,
    last_view: SuggestionView,
}

impl App {
    /// Builds the engine from `session` and locates the user.
    ///
    /// Selected candidates arrive on the returned receiver and must be passed
    /// back to [`App::on_pick`].
    pub async fn new(
        session: Session,
    ) -> Result<(Self, mpsc::UnboundedReceiver<Candidate>), Box<dyn Error>> {
        let (picked_tx, picked_rx) = mpsc::unbounded_channel();
        let search = build_engine(&session, picked_tx.clone()).await?;
        let changes = search.subscribe();

        let mut map = MapView::default();
        let user_location = map
            .locate(&FixedGeolocator::new(Some(DEFAULT_CENTER)))
            .await;

        let app = Self {
            session,
            search,
            changes,
            picked_tx,
            map,
            user_location,
            destination: None,
            last_view: SuggestionView::Hidden,
        };
        Ok((app, picked_rx))
    }

    /// Waits until the engine reports a change.
    pub async fn changed(&mut self) -> bool {
        self.changes.changed().await.is_ok()
    }

    /// Handles one input line.
    pub async fn handle_line(&mut self, line: &str) -> Result<Flow, Box<dyn Error>> {
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                return Ok(Flow::Continue);
            }
        };
        log::debug!("Command: {:?}", command);

        match command {
            Command::Query(text) => self.search.set_query(text),
            Command::Focus => self.search.focus(),
            Command::Dismiss => self.search.dismiss(),
            Command::Select(n) => {
                if self.search.select(n - 1).is_none() {
                    println!("No suggestion {} to select", n);
                }
            }
            Command::Retry => self.search.retry(),
            Command::Clear => {
                self.search.clear();
                println!("Search cleared");
            }
            Command::Token(token) => {
                match token {
                    Some(token) => {
                        self.session.set_mapbox_token(&token).await?;
                        println!("Mapbox token saved");
                    }
                    None => {
                        self.session.clear_mapbox_token().await?;
                        println!("Mapbox token cleared");
                    }
                }
                self.rebuild().await?;
            }
            Command::Mode(mode) => {
                self.session.set_lookup_mode(mode).await?;
                println!("Lookup mode: {}", mode);
                self.rebuild().await?;
            }
            Command::Map => println!("{}", render::map(&self.map)),
            Command::Rides => match &self.destination {
                Some(destination) => {
                    println!("{}", render::rides(&destination.name, &RIDE_OPTIONS))
                }
                None => println!("Select a destination first"),
            },
            Command::Help => println!("{}", HELP),
            Command::Quit => return Ok(Flow::Quit),
        }

        self.render_if_changed();
        Ok(Flow::Continue)
    }

    /// Navigates to a selected candidate.
    pub fn on_pick(&mut self, candidate: Candidate) {
        log::info!("Selected {} ({})", candidate.name, candidate.id);
        self.search.set_query(candidate.name.clone());

        if self.map.focus_on(&candidate)
            && let (Some(from), Some(to)) = (self.user_location, candidate.coordinates)
        {
            self.map.frame(from, to);
        }

        println!("Destination: {}", candidate.name);
        println!("{}", render::map(&self.map));
        println!("Use :rides to see ride options");
        self.destination = Some(candidate);
        self.render_if_changed();
    }

    /// Prints the suggestion dropdown if it differs from the last one printed.
    pub fn render_if_changed(&mut self) {
        self.search.clear_dirty();
        let view = self.search.view();
        if view == self.last_view {
            return;
        }
        if let Some(text) = render::suggestions(&view) {
            println!("{}", text);
        }
        self.last_view = view;
    }

    /// Replaces the engine with one built from the current settings,
    /// carrying the query over.
    async fn rebuild(&mut self) -> Result<(), Box<dyn Error>> {
        let query = self.search.query();
        let search = build_engine(&self.session, self.picked_tx.clone()).await?;

        self.search.dispose();
        self.changes = search.subscribe();
        self.search = search;
        self.last_view = SuggestionView::Hidden;

        if !query.is_empty() {
            self.search.set_query(query);
        }
        Ok(())
    }

    pub fn shutdown(&self) {
        self.search.dispose();
    }
}

async fn build_engine(
    session: &Session,
    picked_tx: mpsc::UnboundedSender<Candidate>,
) -> Result<LocationSearch, Box<dyn Error>> {
    let backend = session.build_backend().await?;
    let search = LocationSearch::builder()
        .backend(backend)
        .on_select(move |candidate| {
            let _ = picked_tx.send(candidate);
        })
        .build()?;
    Ok(search)
}
