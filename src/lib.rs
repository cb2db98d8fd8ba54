//! frochat
//!
//! The rendering core of an embeddable chat widget: network `say`, `join` and
//! `leave` events become sanitized, timestamped, linkified lines in a
//! capacity-bounded, auto-scrolling history.
//!
//! # Architecture
//!
//! - **Render**: HTML escaping, URL linkification and `H:MM:SS` timestamps
//! - **History**: FIFO-evicting line buffer that drives a scrollable pane
//! - **Router**: subscribes to the network and maps events and local input
//!   onto the history
//! - **Chatbox**: the widget shell around the router (input, size, menu)
//! - **Server**: a small axum host that serves one chatbox for manual testing
//!
//! # Modules
//!
//! - [`render`]: escaping, linkification, timestamps
//! - [`history`]: [`HistoryBuffer`](history::HistoryBuffer) and the [`Pane`](history::Pane) contract
//! - [`events`]: inbound event model
//! - [`network`]: network pub/sub contract and an in-process implementation
//! - [`world`]: entity lookup contract and an in-process registry
//! - [`router`]: [`EventRouter`](router::EventRouter)
//! - [`chatbox`]: [`Chatbox`](chatbox::Chatbox)
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use frochat::chatbox::Chatbox;
//! use frochat::config::ChatboxConfig;
//! use frochat::events::InboundEvent;
//! use frochat::history::HtmlPane;
//! use frochat::network::LocalNetwork;
//! use frochat::world::{Entity, EntityRegistry};
//!
//! let world = EntityRegistry::new();
//! world.insert("e1", Entity::new("alice"));
//! let network = LocalNetwork::new();
//!
//! let mut chatbox = Chatbox::new(
//!     &ChatboxConfig::default(),
//!     HtmlPane::new(),
//!     Arc::new(world.clone()),
//!     Arc::new(network.clone()),
//! )
//! .unwrap();
//!
//! network.deliver(InboundEvent::say("e1", "<b>hi</b>"));
//! chatbox.pump();
//!
//! let line = chatbox.history().lines().last().unwrap().markup().to_string();
//! assert!(line.ends_with("&lt;b&gt;hi&lt;&#x2F;b&gt;"));
//! ```

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod chatbox;
pub mod config;
pub mod error;
pub mod events;
pub mod history;
pub mod network;
pub mod render;
pub mod router;
pub mod server;
pub mod telemetry;
pub mod world;

pub use chatbox::Chatbox;
pub use error::{ChatboxError, Result};
pub use history::{ChatLine, HistoryBuffer, MAX_HISTORY_LINES, Pane};
pub use router::{EventRouter, SubmitOutcome};
