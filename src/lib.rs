// Copyright (c) 2024 Botho Foundation

//! Gossip plane in which every node publishes a single mutable note and
//! converges on the set of live peers.
//!
//! Every participant authors one small record (a note number plus a mute
//! flag), signs it, and periodically pushes a random sample of its view
//! to randomly chosen peers. Ingested records are authenticated against
//! the identity they claim before they can touch the store, and peers
//! that fall silent are aged out by a clock-free attrition heuristic.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                          Node                             │
//! ├───────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌──────────────────────┐  ┌────────────┐  │
//! │  │ NoteStore │  │ NotificationProtocol │  │ GossipHost │  │
//! │  │  (view)   │  │   (push / ingest)    │  │ (transport)│  │
//! │  └───────────┘  └──────────────────────┘  └────────────┘  │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! The crate opens no sockets and generates no keys: the [`GossipHost`]
//! trait is the seam to whatever transport hosts the node, providing the
//! local identity, an address book and a factory for the one-exchange
//! streams the protocol runs over.
//!
//! # Usage
//!
//! ```ignore
//! use loopnet_gossip::{GossipConfig, Node};
//!
//! // `host` is whatever implements GossipHost over your transport.
//! let node = Node::new(host, GossipConfig::default(), 63, false);
//!
//! // Introduce ourselves to a bootstrap peer...
//! node.connect_to_host(&peer_id, &addrs).await?;
//!
//! // ...then gossip on whatever cadence the driver chooses.
//! node.notify().await?;
//! println!("{:?}", node.store().active_note_numbers());
//! ```

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

pub mod config;
pub mod error;
pub mod host;
pub mod messages;
pub mod node;
pub mod protocol;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types for convenience
pub use config::{GossipConfig, GossipConfigBuilder};
pub use error::{GossipError, GossipResult};
pub use host::{GossipHost, StreamHandler};
pub use messages::{NoteData, Notification};
pub use node::{Node, CLIENT_VERSION};
pub use protocol::{NotificationProtocol, NOTIFY_PROTOCOL};
pub use store::{new_shared_store, NoteStore, NoteStoreConfig, SharedNoteStore};
