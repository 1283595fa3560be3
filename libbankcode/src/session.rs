//! Lookup session: the single event loop of the engine
//!
//! `LookupSession` owns the only [`SelectionStateMachine`], the address
//! history and the queue of finished fetches. User commands and fetch
//! completions are handled one at a time through `&mut self`, so a transition
//! always runs to completion before the next event is looked at.
//!
//! Fetches run as spawned tokio tasks and report back over a channel; the
//! session must therefore be used from within a tokio runtime.
//!
//! # Example
//!
//! ```no_run
//! use libbankcode::{Config, Location, LookupSession};
//!
//! # async fn example() -> libbankcode::Result<()> {
//! let mut session = LookupSession::from_config(&Config::default_config())?;
//! session.start(Location::parse("/banks/004/0040001"));
//! session.settle().await;
//!
//! if let Some(branch) = session.selection().authoritative_branch() {
//!     println!("{} {}", branch.bank_name, branch.phone);
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::catalog::http::HttpCatalogClient;
use crate::catalog::CatalogClient;
use crate::clipboard::{self, ClipboardSink, ExportKind};
use crate::config::Config;
use crate::error::{ClipboardError, Result};
use crate::events::{EventBus, EventReceiver, Notice, SessionEvent};
use crate::location::{History, Location, LocationSynchronizer, MemoryHistory};
use crate::selection::{Completion, Effect, FetchRequest, Selection, SelectionStateMachine, Snapshot};

const EVENT_CAPACITY: usize = 64;

pub struct LookupSession {
    client: Arc<dyn CatalogClient>,
    machine: SelectionStateMachine,
    sync: LocationSynchronizer,
    history: MemoryHistory,
    origin: String,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    /// Spawned fetches whose completion has not been received yet, stale ones included
    outstanding: usize,
    events: EventBus,
    last_published: Option<Snapshot>,
}

impl LookupSession {
    /// `origin` is used for shareable URLs, e.g. `https://lookup.example.tw`
    pub fn new(client: Arc<dyn CatalogClient>, origin: impl Into<String>) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            client,
            machine: SelectionStateMachine::new(),
            sync: LocationSynchronizer::new(),
            history: MemoryHistory::default(),
            origin: origin.into(),
            completions_tx,
            completions_rx,
            outstanding: 0,
            events: EventBus::new(EVENT_CAPACITY),
            last_published: None,
        }
    }

    /// Session backed by the HTTP catalog client
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let client = HttpCatalogClient::new(&config.catalog)?;
        Ok(Self::new(Arc::new(client), config.share.origin.clone()))
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.events.subscribe()
    }

    pub fn selection(&self) -> &Selection {
        self.machine.selection()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.machine.snapshot()
    }

    /// The currently installed address
    pub fn address(&self) -> &Location {
        self.history.current()
    }

    pub fn history(&self) -> &MemoryHistory {
        &self.history
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Begin a session at `initial`: load banks and hydrate from the address
    pub fn start(&mut self, initial: Location) {
        tracing::info!(address = %initial, "Starting lookup session");
        self.history = MemoryHistory::new(initial.clone());
        let mut effects = self.machine.init();
        effects.extend(self.sync.inbound(&initial, &mut self.machine));
        self.run(effects);
    }

    pub fn select_bank(&mut self, code: &str) {
        let effects = self.machine.select_bank(code);
        self.run(effects);
    }

    pub fn select_branch(&mut self, code: &str) {
        let effects = self.machine.select_branch(code);
        self.run(effects);
    }

    pub fn clear(&mut self) {
        let effects = self.machine.clear();
        self.run(effects);
    }

    /// Go to an address as if it had been typed in: new history entry, then hydrate
    pub fn navigate(&mut self, location: Location) {
        if self.history.current() != &location {
            self.history.push(location.clone());
            self.publish_address();
        }
        let effects = self.sync.inbound(&location, &mut self.machine);
        self.run(effects);
    }

    /// Browser-style back. Returns false at the start of history.
    pub fn back(&mut self) -> bool {
        match self.history.back() {
            Some(location) => {
                self.publish_address();
                let effects = self.sync.inbound(&location, &mut self.machine);
                self.run(effects);
                true
            }
            None => false,
        }
    }

    pub fn forward(&mut self) -> bool {
        match self.history.forward() {
            Some(location) => {
                self.publish_address();
                let effects = self.sync.inbound(&location, &mut self.machine);
                self.run(effects);
                true
            }
            None => false,
        }
    }

    /// Copy the selected branch code or shareable URL.
    ///
    /// The outcome is also published as a notification. Selection is never touched.
    pub fn copy(
        &mut self,
        kind: ExportKind,
        sink: &mut dyn ClipboardSink,
    ) -> std::result::Result<String, ClipboardError> {
        let result = clipboard::export(kind, self.machine.selection(), &self.origin, sink);
        let notice = match &result {
            Ok(text) => Notice::info(format!("Copied {}", text)),
            Err(e) => {
                tracing::warn!(error = %e, "Clipboard export failed");
                Notice::error(e.to_string())
            }
        };
        self.events.emit(SessionEvent::Notification(notice));
        result
    }

    /// True while any spawned fetch has not reported back
    pub fn has_outstanding(&self) -> bool {
        self.outstanding > 0
    }

    /// Wait for the next finished fetch. `None` when nothing is outstanding.
    ///
    /// Cancel-safe, so it can sit in a `tokio::select!` next to user input.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        if self.outstanding == 0 {
            return None;
        }
        let completion = self.completions_rx.recv().await?;
        self.outstanding -= 1;
        Some(completion)
    }

    pub fn handle_completion(&mut self, completion: Completion) {
        let effects = self.machine.apply(completion);
        self.run(effects);
    }

    /// Receive and apply one completion. Returns false if none was outstanding.
    pub async fn pump(&mut self) -> bool {
        match self.next_completion().await {
            Some(completion) => {
                self.handle_completion(completion);
                true
            }
            None => false,
        }
    }

    /// Apply completions until no current fetch is outstanding
    ///
    /// Stale fetches may still be in flight afterwards; they are dropped on arrival.
    pub async fn settle(&mut self) {
        while self.machine.has_pending_fetch() {
            if !self.pump().await {
                break;
            }
        }
    }

    /// Perform effects in order, then publish the committed state
    fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Fetch(request) => self.spawn_fetch(request),
                other => {
                    if self.sync.outbound(&other, &mut self.history).is_some() {
                        self.publish_address();
                    }
                }
            }
        }
        self.publish_snapshot();
    }

    fn spawn_fetch(&mut self, request: FetchRequest) {
        let client = Arc::clone(&self.client);
        let tx = self.completions_tx.clone();
        self.outstanding += 1;
        tokio::spawn(async move {
            let completion = request.execute(client.as_ref()).await;
            // The session is gone if the receiver was dropped
            let _ = tx.send(completion);
        });
    }

    fn publish_snapshot(&mut self) {
        let snapshot = self.machine.snapshot();
        if self.last_published.as_ref() == Some(&snapshot) {
            return;
        }
        self.last_published = Some(snapshot.clone());
        self.events.emit(SessionEvent::Committed {
            snapshot: Box::new(snapshot),
        });
    }

    fn publish_address(&self) {
        self.events.emit(SessionEvent::AddressChanged {
            path: self.history.current().path(),
        });
    }
}
