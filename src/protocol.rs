// Copyright (c) 2024 Botho Foundation

//! The notification protocol: push a sample of the local view to randomly
//! chosen peers, and ingest the batches other nodes push to us.
//!
//! Every exchange is one fresh, ephemeral stream carrying one
//! length-delimited [`Notification`]; the sender closes the stream after
//! writing and the receiver reads to end-of-stream. Streams are never
//! cached or shared, so concurrent `notify` rounds cannot interleave
//! writes.

use crate::{
    config::GossipConfig,
    error::{GossipError, GossipResult},
    host::{GossipHost, StreamHandler},
    messages::Notification,
    store::SharedNoteStore,
};
use async_trait::async_trait;
use libp2p::{Multiaddr, PeerId};
use std::sync::Arc;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    time::timeout,
};
use tracing::{debug, warn};

/// Protocol id of the gossip exchange.
/// Pattern: /protocol-name/request-or-response-message/version.
pub const NOTIFY_PROTOCOL: &str = "/loopnet/notify/0.0.1";

/// Dispatch and ingest pipeline for note notifications.
pub struct NotificationProtocol<H: GossipHost> {
    host: Arc<H>,
    store: SharedNoteStore,
    config: GossipConfig,
}

impl<H: GossipHost> NotificationProtocol<H> {
    /// Create the protocol over a host and a store.
    pub fn new(host: Arc<H>, store: SharedNoteStore, config: GossipConfig) -> Self {
        Self {
            host,
            store,
            config,
        }
    }

    /// The note store this protocol feeds.
    pub fn store(&self) -> &SharedNoteStore {
        &self.store
    }

    /// Push one round of notifications to randomly sampled peers.
    ///
    /// Samples up to `fanout` destinations, excluding ourselves; an empty
    /// sample is success. Each destination gets an independent exchange,
    /// and a failed destination never aborts the remaining ones. The
    /// store lock is released before any stream is opened.
    pub async fn notify(&self) -> GossipResult<()> {
        let destinations = self.store.random_notes(self.config.fanout, true);
        if destinations.is_empty() {
            debug!("no peers to notify");
            return Ok(());
        }

        for destination in destinations {
            let peer: PeerId = match destination.node_id.parse() {
                Ok(peer) => peer,
                Err(err) => {
                    warn!(
                        node_id = %destination.node_id,
                        error = %err,
                        "skipping destination with unparseable node id"
                    );
                    continue;
                }
            };

            if let Err(err) = self.send_notification(&peer).await {
                warn!(peer = %peer, error = %err, "failed to deliver notification");
            }
        }

        Ok(())
    }

    /// Seed the host's address book with a peer's addresses (permanent
    /// TTL), then push one notification so the newly connected peer
    /// learns our identity and initial view.
    pub async fn connect_to_host(&self, peer: &PeerId, addrs: &[Multiaddr]) -> GossipResult<()> {
        for addr in addrs {
            self.host.add_address(peer, addr.clone());
        }
        self.send_notification(peer).await
    }

    /// Run one outbound exchange: sample a batch (our own record
    /// included), open a fresh stream, write the message, close. The
    /// whole exchange runs under the configured deadline.
    async fn send_notification(&self, peer: &PeerId) -> GossipResult<()> {
        let notes = self
            .store
            .random_notes(self.config.max_notes_per_notification, false);
        let notification = Notification { notes };

        let exchange = async {
            let mut stream = self.host.open_stream(peer, NOTIFY_PROTOCOL).await?;
            stream.write_all(&notification.to_wire()).await?;
            stream.shutdown().await?;
            Ok(())
        };

        match timeout(self.config.request_timeout(), exchange).await {
            Ok(result) => result,
            Err(_) => Err(GossipError::Timeout),
        }
    }

    /// Ingest one inbound exchange.
    ///
    /// Reads the whole stream and decodes one message; an undecodable
    /// stream is dropped without touching the store. Notes are applied in
    /// arrival order: each is authenticated, then handed to the store,
    /// and a first-sight insert also registers the declared address with
    /// the host. A note that fails any step is skipped, never the batch.
    pub async fn on_notification(&self, mut stream: H::Stream) {
        let mut buf = Vec::new();
        if let Err(err) = stream.read_to_end(&mut buf).await {
            warn!(error = %err, "failed to read notification stream");
            return;
        }

        let notification = match Notification::from_wire(&buf) {
            Ok(notification) => notification,
            Err(err) => {
                warn!(error = %err, "dropping undecodable notification");
                return;
            }
        };

        for note in notification.notes {
            if let Err(err) = note.verify() {
                warn!(node_id = %note.node_id, error = %err, "failed to authenticate note");
                continue;
            }

            let node_id = note.node_id.clone();
            let address = note.address.clone();

            if self.store.on_note(note) {
                // First sight of this node: learn where to reach it. The
                // note itself stays stored even if the address is junk.
                let peer: PeerId = match node_id.parse() {
                    Ok(peer) => peer,
                    Err(err) => {
                        warn!(node_id = %node_id, error = %err, "cannot convert node id");
                        continue;
                    }
                };

                let addr: Multiaddr = match address.parse() {
                    Ok(addr) => addr,
                    Err(err) => {
                        warn!(peer = %peer, address = %address, error = %err, "cannot parse note address");
                        continue;
                    }
                };

                self.host.add_address(&peer, addr);
                debug!(peer = %peer, "registered newly seen peer");
            }
        }
    }
}

#[async_trait]
impl<H: GossipHost> StreamHandler<H::Stream> for NotificationProtocol<H> {
    async fn handle_stream(&self, stream: H::Stream) {
        self.on_notification(stream).await;
    }
}
