//! Content digests.
//!
//! SHA-256 is the content identity; SHA-1 is the integrity digest the storage
//! provider verifies on receipt. Both are taken over the same buffer.

use async_trait::async_trait;
use bytes::Bytes;
use omnisora_core::{Digests, UploadError, UploadResult};
use sha1::Sha1;
use sha2::{Digest, Sha256};

/// Compute both digests of `data`.
pub fn compute_digests(data: &[u8]) -> UploadResult<Digests> {
    let primary = hex::encode(Sha256::digest(data));
    let integrity = hex::encode(Sha1::digest(data));
    Digests::from_hex(&primary, &integrity)
}

/// Produces the [`Digests`] for an upload attempt.
#[async_trait]
pub trait ContentDigester: Send + Sync {
    async fn digest(&self, data: Bytes) -> UploadResult<Digests>;
}

/// SHA-256 + SHA-1, hashed on the blocking pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Sha1Digester;

#[async_trait]
impl ContentDigester for Sha256Sha1Digester {
    async fn digest(&self, data: Bytes) -> UploadResult<Digests> {
        tokio::task::spawn_blocking(move || compute_digests(&data))
            .await
            .map_err(|e| UploadError::DigestComputation(format!("Digest task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vectors() {
        let digests = compute_digests(b"abc").unwrap();
        assert_eq!(
            digests.primary(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            digests.integrity(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert_eq!(digests.short_id().as_str(), "ba7816bf8f01");
    }

    #[test]
    fn empty_input() {
        let digests = compute_digests(b"").unwrap();
        assert_eq!(
            digests.primary(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            digests.integrity(),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    #[test]
    fn deterministic() {
        let data: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
        assert_eq!(
            compute_digests(&data).unwrap(),
            compute_digests(&data).unwrap()
        );
    }

    #[tokio::test]
    async fn digester_matches_direct_computation() {
        let data = Bytes::from_static(b"hello world");
        let digests = Sha256Sha1Digester.digest(data.clone()).await.unwrap();
        assert_eq!(digests, compute_digests(&data).unwrap());
        assert_eq!(
            digests.integrity(),
            "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"
        );
    }
}
