// Copyright (c) 2024 Botho Foundation

//! The node facade: the local identity wired to the note store and the
//! notification protocol.

use crate::{
    config::GossipConfig,
    error::GossipResult,
    host::{GossipHost, StreamHandler},
    messages::NoteData,
    protocol::{NotificationProtocol, NOTIFY_PROTOCOL},
    store::{new_shared_store, SharedNoteStore},
};
use libp2p::{Multiaddr, PeerId};
use std::sync::Arc;

/// Protocol family tag embedded in every record this node authors.
pub const CLIENT_VERSION: &str = "loopnet/0.0.1";

/// A gossip participant: one identity, one note, one view of the network.
pub struct Node<H: GossipHost> {
    host: Arc<H>,
    store: SharedNoteStore,
    protocol: Arc<NotificationProtocol<H>>,
}

impl<H: GossipHost> Node<H> {
    /// Create a node over a host, publishing `note` at revision 0 as its
    /// initial datum, and bind the inbound stream handler for
    /// [`NOTIFY_PROTOCOL`].
    pub fn new(host: Arc<H>, config: GossipConfig, note: u32, mute: bool) -> Self {
        let self_note = build_signed_note(host.as_ref(), 0, note, mute);
        let store = new_shared_store(self_note, config.store_config.clone());
        let protocol = Arc::new(NotificationProtocol::new(
            Arc::clone(&host),
            Arc::clone(&store),
            config,
        ));
        host.set_stream_handler(
            NOTIFY_PROTOCOL,
            Arc::clone(&protocol) as Arc<dyn StreamHandler<H::Stream>>,
        );

        Self {
            host,
            store,
            protocol,
        }
    }

    /// Build and self-sign a record carrying the local identity and the
    /// host's first listen address.
    ///
    /// Panics if the host cannot sign with its own key: a node that
    /// cannot represent itself has no business continuing.
    pub fn new_note_data(&self, revision: u32, note: u32, mute: bool) -> NoteData {
        build_signed_note(self.host.as_ref(), revision, note, mute)
    }

    /// Publish a new revision of the local note. The next notify rounds
    /// advertise it.
    pub fn set_note(&self, revision: u32, note: u32, mute: bool) {
        self.store.on_note(self.new_note_data(revision, note, mute));
    }

    /// Push one round of notifications to sampled peers. See
    /// [`NotificationProtocol::notify`].
    pub async fn notify(&self) -> GossipResult<()> {
        self.protocol.notify().await
    }

    /// Introduce ourselves to a peer whose addresses we already know.
    pub async fn connect_to_host(&self, peer: &PeerId, addrs: &[Multiaddr]) -> GossipResult<()> {
        self.protocol.connect_to_host(peer, addrs).await
    }

    /// Query-only access to the note store.
    pub fn store(&self) -> &SharedNoteStore {
        &self.store
    }

    /// The local node's identity.
    pub fn local_peer_id(&self) -> PeerId {
        self.host.local_peer_id()
    }
}

fn build_signed_note<H: GossipHost>(host: &H, revision: u32, note: u32, mute: bool) -> NoteData {
    let keypair = host.keypair();
    let address = host
        .listen_addrs()
        .first()
        .map(ToString::to_string)
        .unwrap_or_default();

    let mut data = NoteData {
        client_version: CLIENT_VERSION.to_string(),
        revision,
        note,
        mute,
        node_id: host.local_peer_id().to_base58(),
        address,
        node_pub_key: keypair.public().encode_protobuf(),
        sign: Vec::new(),
    };
    data.sign = keypair
        .sign(&data.signing_bytes())
        .expect("local keypair failed to sign own note");
    data
}
