// Copyright (c) 2024 Botho Foundation

//! In-memory host used by the protocol and node tests.
//!
//! A [`MemoryNetwork`] is a registry of hosts; opening a stream to a peer
//! hands the far end of a duplex pipe to that peer's registered handler,
//! so complete gossip exchanges run without sockets.

use crate::{
    error::{GossipError, GossipResult},
    host::{GossipHost, StreamHandler},
    messages::NoteData,
    node::CLIENT_VERSION,
};
use async_trait::async_trait;
use libp2p::{identity::Keypair, Multiaddr, PeerId};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, Weak,
    },
};
use tokio::io::DuplexStream;

pub(crate) struct MemoryNetwork {
    hosts: Mutex<HashMap<PeerId, Weak<MemoryHost>>>,
    next_port: AtomicU64,
}

impl MemoryNetwork {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            hosts: Mutex::new(HashMap::new()),
            next_port: AtomicU64::new(1),
        })
    }

    /// Create a host with a fresh ed25519 identity, joined to this
    /// network.
    pub(crate) fn host(self: &Arc<Self>) -> Arc<MemoryHost> {
        let keypair = Keypair::generate_ed25519();
        let peer_id = keypair.public().to_peer_id();
        let port = self.next_port.fetch_add(1, Ordering::Relaxed);
        let listen_addr: Multiaddr = format!("/memory/{port}")
            .parse()
            .expect("memory multiaddr is well formed");

        let host = Arc::new(MemoryHost {
            keypair,
            peer_id,
            listen_addr,
            network: Arc::clone(self),
            addresses: Mutex::new(HashMap::new()),
            handlers: Mutex::new(HashMap::new()),
        });
        self.hosts
            .lock()
            .unwrap()
            .insert(peer_id, Arc::downgrade(&host));
        host
    }
}

pub(crate) struct MemoryHost {
    keypair: Keypair,
    peer_id: PeerId,
    listen_addr: Multiaddr,
    network: Arc<MemoryNetwork>,
    addresses: Mutex<HashMap<PeerId, Vec<Multiaddr>>>,
    handlers: Mutex<HashMap<&'static str, Arc<dyn StreamHandler<DuplexStream>>>>,
}

impl MemoryHost {
    /// What this host's address book knows about a peer.
    pub(crate) fn known_addresses(&self, peer: &PeerId) -> Vec<Multiaddr> {
        self.addresses
            .lock()
            .unwrap()
            .get(peer)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl GossipHost for MemoryHost {
    type Stream = DuplexStream;

    fn local_peer_id(&self) -> PeerId {
        self.peer_id
    }

    fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    fn listen_addrs(&self) -> Vec<Multiaddr> {
        vec![self.listen_addr.clone()]
    }

    fn add_address(&self, peer: &PeerId, addr: Multiaddr) {
        let mut addresses = self.addresses.lock().unwrap();
        let entry = addresses.entry(*peer).or_default();
        if !entry.contains(&addr) {
            entry.push(addr);
        }
    }

    async fn open_stream(
        &self,
        peer: &PeerId,
        protocol: &'static str,
    ) -> GossipResult<DuplexStream> {
        let remote = self
            .network
            .hosts
            .lock()
            .unwrap()
            .get(peer)
            .and_then(Weak::upgrade)
            .ok_or_else(|| GossipError::PeerNotFound(peer.to_base58()))?;

        let handler = remote
            .handlers
            .lock()
            .unwrap()
            .get(protocol)
            .cloned()
            .ok_or_else(|| GossipError::Network(format!("{peer} does not speak {protocol}")))?;

        let (local, far) = tokio::io::duplex(64 * 1024);
        tokio::spawn(async move { handler.handle_stream(far).await });
        Ok(local)
    }

    fn set_stream_handler(
        &self,
        protocol: &'static str,
        handler: Arc<dyn StreamHandler<DuplexStream>>,
    ) {
        self.handlers.lock().unwrap().insert(protocol, handler);
    }
}

/// Build a note signed by the host's own key, the way the node facade
/// authors its records.
pub(crate) fn signed_note(host: &MemoryHost, revision: u32, note: u32, mute: bool) -> NoteData {
    let mut data = NoteData {
        client_version: CLIENT_VERSION.to_string(),
        revision,
        note,
        mute,
        node_id: host.peer_id.to_base58(),
        address: host.listen_addr.to_string(),
        node_pub_key: host.keypair.public().encode_protobuf(),
        sign: Vec::new(),
    };
    data.sign = host
        .keypair
        .sign(&data.signing_bytes())
        .expect("test keypair failed to sign");
    data
}
