// Copyright (c) 2024 Botho Foundation

//! The seam between the gossip plane and the underlying peer-to-peer host.
//!
//! The core neither opens sockets nor generates keys: it composes a
//! signing primitive, an address book and a stream factory that the host
//! provides through [`GossipHost`]. Inbound streams flow the other way,
//! through a [`StreamHandler`] the core registers per protocol id.

use crate::error::GossipResult;
use async_trait::async_trait;
use libp2p::{identity::Keypair, Multiaddr, PeerId};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};

/// Handler invoked by the host for each inbound stream on a registered
/// protocol. One invocation handles one complete gossip exchange.
#[async_trait]
pub trait StreamHandler<S>: Send + Sync {
    /// Consume one inbound stream. The handler owns the stream and drops
    /// it when the exchange is over, on both the success and failure
    /// paths.
    async fn handle_stream(&self, stream: S);
}

/// What the gossip plane requires from the transport layer.
#[async_trait]
pub trait GossipHost: Send + Sync + 'static {
    /// Bidirectional byte channel scoped to a single gossip exchange.
    type Stream: AsyncRead + AsyncWrite + Send + Unpin + 'static;

    /// The local node's identity.
    fn local_peer_id(&self) -> PeerId;

    /// Read-only access to the local keypair, for signing note records
    /// and embedding the public key in them.
    fn keypair(&self) -> &Keypair;

    /// Addresses the local node is reachable at; the first one is
    /// advertised in outgoing note records.
    fn listen_addrs(&self) -> Vec<Multiaddr>;

    /// Record a peer's address in the host's address book with a
    /// permanent TTL.
    fn add_address(&self, peer: &PeerId, addr: Multiaddr);

    /// Open a fresh outbound stream to a peer on the given protocol.
    async fn open_stream(&self, peer: &PeerId, protocol: &'static str)
        -> GossipResult<Self::Stream>;

    /// Register the handler the host invokes for inbound streams on the
    /// given protocol id.
    fn set_stream_handler(
        &self,
        protocol: &'static str,
        handler: Arc<dyn StreamHandler<Self::Stream>>,
    );
}
