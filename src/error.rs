// Copyright (c) 2024 Botho Foundation

//! Error types for the gossip plane.

use displaydoc::Display;
use thiserror::Error;

/// Errors that can occur in the gossip plane.
#[derive(Debug, Display, Error)]
pub enum GossipError {
    /// Failed to decode wire message: {0}
    Decode(prost::DecodeError),

    /// Note signature is invalid
    InvalidSignature,

    /// Node id {claimed} does not match its public key (derives {derived})
    IdentityMismatch {
        /// The id claimed by the record
        claimed: String,
        /// The id actually derived from the embedded public key
        derived: String,
    },

    /// Failed to parse public key: {0}
    KeyParse(libp2p::identity::DecodingError),

    /// Stream error: {0}
    Stream(std::io::Error),

    /// Peer not found: {0}
    PeerNotFound(String),

    /// Network error: {0}
    Network(String),

    /// Gossip exchange timed out
    Timeout,
}

impl From<prost::DecodeError> for GossipError {
    fn from(err: prost::DecodeError) -> Self {
        GossipError::Decode(err)
    }
}

impl From<libp2p::identity::DecodingError> for GossipError {
    fn from(err: libp2p::identity::DecodingError) -> Self {
        GossipError::KeyParse(err)
    }
}

impl From<std::io::Error> for GossipError {
    fn from(err: std::io::Error) -> Self {
        GossipError::Stream(err)
    }
}

/// Result type for gossip operations.
pub type GossipResult<T> = Result<T, GossipError>;
