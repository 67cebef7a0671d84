// Copyright (c) 2024 Botho Foundation

//! Wire messages for the notification protocol.
//!
//! A gossip exchange carries exactly one [`Notification`] per stream,
//! length-delimited, and each [`NoteData`] inside it is independently
//! signed by its origin node. The protobuf encoding is canonical: two
//! equal records produce byte-identical output, which is what makes the
//! signatures verifiable after a round-trip over the wire.

use crate::error::{GossipError, GossipResult};
use libp2p::identity::PublicKey;
use prost::Message;

/// A signed note record, authored once by its origin node and immutable
/// thereafter.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NoteData {
    /// Protocol family identifier of the authoring client.
    #[prost(string, tag = "1")]
    pub client_version: String,

    /// Monotonic counter chosen by the origin; strictly increasing across
    /// successive emissions from the same node.
    #[prost(uint32, tag = "2")]
    pub revision: u32,

    /// The note payload. A MIDI note number in the present use, but the
    /// store is agnostic.
    #[prost(uint32, tag = "3")]
    pub note: u32,

    /// Muted notes are excluded from the active-notes projection but still
    /// tracked for liveness.
    #[prost(bool, tag = "4")]
    pub mute: bool,

    /// Base58-encoded identity of the origin. Must be derivable from
    /// `node_pub_key`.
    #[prost(string, tag = "5")]
    pub node_id: String,

    /// Transport address of the origin, used to populate the receiver's
    /// address book on first sight.
    #[prost(string, tag = "6")]
    pub address: String,

    /// Protobuf encoding of the origin's public key.
    #[prost(bytes = "vec", tag = "7")]
    pub node_pub_key: Vec<u8>,

    /// Signature by the origin's private key over the canonical encoding
    /// of this record with `sign` set to empty.
    #[prost(bytes = "vec", tag = "8")]
    pub sign: Vec<u8>,
}

/// The wire envelope for one gossip exchange.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Notification {
    /// The batch of note records being pushed.
    #[prost(message, repeated, tag = "1")]
    pub notes: Vec<NoteData>,
}

impl NoteData {
    /// The canonical bytes covered by the signature: this record with its
    /// `sign` field substituted by the empty byte string.
    ///
    /// The field is substituted, never removed, so the encoding
    /// round-trips identically on the signing and verifying sides.
    pub fn signing_bytes(&self) -> Vec<u8> {
        let mut unsigned = self.clone();
        unsigned.sign = Vec::new();
        unsigned.encode_to_vec()
    }

    /// Authenticate this record against its own declared identity.
    ///
    /// Checks, in order: the embedded public key parses; the id derived
    /// from it matches `node_id`; the signature verifies over
    /// [`signing_bytes`](Self::signing_bytes). Nothing else (freshness,
    /// rate, address validity) is checked here.
    pub fn verify(&self) -> GossipResult<()> {
        let public_key = PublicKey::try_decode_protobuf(&self.node_pub_key)?;

        let derived = public_key.to_peer_id().to_base58();
        if derived != self.node_id {
            return Err(GossipError::IdentityMismatch {
                claimed: self.node_id.clone(),
                derived,
            });
        }

        if !public_key.verify(&self.signing_bytes(), &self.sign) {
            return Err(GossipError::InvalidSignature);
        }

        Ok(())
    }
}

impl Notification {
    /// Encode this notification with its self-delimiting length prefix,
    /// ready to be written to a stream.
    pub fn to_wire(&self) -> Vec<u8> {
        self.encode_length_delimited_to_vec()
    }

    /// Decode one length-delimited notification from the full contents of
    /// a stream. A truncated or malformed buffer is a decode error.
    pub fn from_wire(bytes: &[u8]) -> GossipResult<Self> {
        Ok(Notification::decode_length_delimited(bytes)?)
    }
}
