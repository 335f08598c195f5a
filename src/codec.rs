use serde::Serialize;
use serde::de::DeserializeOwned;

/// Canonical byte form of a ledger entity.
///
/// Fields are written in declaration order, so the output is both the
/// digest preimage and the wire payload exchanged between nodes.
pub fn encode<T: Serialize + ?Sized>(entity: &T) -> Vec<u8> {
    serde_json::to_vec(entity).expect("ledger entities always serialize")
}

/// Parse a payload received from a peer.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, serde_json::Error> {
    serde_json::from_slice(bytes)
}
