//! Digest calculations for the handshake.
//!
//! Packet 1 hides a 32 byte HMAC-SHA256 value inside the packet at an offset
//! derived from four selector bytes.  Two placement conventions exist in the
//! wild (selector bytes at offset 8 or at offset 772) and the packet carries
//! no marker for which one was used, so validation has to try both.

use hmac::{Hmac, Mac, NewMac};
use sha2::Sha256;

use super::errors::{HandshakeError, HandshakeErrorKind};
use super::RTMP_PACKET_SIZE;

/// The number of bytes in every digest and signature produced by the
/// handshake.
pub const SHA256_DIGEST_SIZE: usize = 32;

const SELECTOR_SIZE: usize = 4;
const DIGEST_OFFSET_MODULUS: usize = 728;

/// One of the two known conventions for placing the digest inside packet 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestScheme {
    /// Selector bytes at offset 8, digest placed in the first half of the
    /// packet
    Scheme0,

    /// Selector bytes at offset 772, digest placed in the second half of the
    /// packet
    Scheme1,
}

impl DigestScheme {
    fn selector_offset(self) -> usize {
        match self {
            DigestScheme::Scheme0 => 8,
            DigestScheme::Scheme1 => 772,
        }
    }

    fn digest_base(self) -> usize {
        match self {
            DigestScheme::Scheme0 => 12,
            DigestScheme::Scheme1 => 776,
        }
    }
}

/// Computes an HMAC-SHA256 value over the concatenation of the input slices.
pub fn calculate_hmac_sha256(input: &[&[u8]], key: &[u8]) -> [u8; SHA256_DIGEST_SIZE] {
    let mut mac =
        Hmac::<Sha256>::new_varkey(key).expect("HMAC accepts keys of arbitrary length");
    for slice in input {
        mac.update(slice);
    }

    let mut digest = [0_u8; SHA256_DIGEST_SIZE];
    digest.copy_from_slice(&mac.finalize().into_bytes());
    digest
}

/// Signs a full size packet in place by writing the digest for the given
/// scheme at its computed offset.  The packet length is guaranteed by the
/// array type, so unlike validation this cannot fail.
pub fn sign_packet(packet: &mut [u8; RTMP_PACKET_SIZE], scheme: DigestScheme, key: &[u8]) {
    let selector_offset = scheme.selector_offset();
    let digest_offset = digest_offset(
        scheme,
        &packet[selector_offset..selector_offset + SELECTOR_SIZE],
    );

    let digest = {
        let before = &packet[..digest_offset];
        let after = &packet[digest_offset + SHA256_DIGEST_SIZE..];
        calculate_hmac_sha256(&[before, after], key)
    };

    packet[digest_offset..digest_offset + SHA256_DIGEST_SIZE].copy_from_slice(&digest);
}

/// Validates a packet against both digest placement schemes, returning the
/// embedded digest bytes of whichever scheme matched.
pub fn verify_embedded_digest(packet: &[u8], key: &[u8]) -> Result<Vec<u8>, HandshakeError> {
    if let Some(digest) = verify_scheme(packet, DigestScheme::Scheme0, key)? {
        return Ok(digest);
    }

    if let Some(digest) = verify_scheme(packet, DigestScheme::Scheme1, key)? {
        return Ok(digest);
    }

    Err(HandshakeErrorKind::UnknownPacket1Format.into())
}

fn verify_scheme(
    packet: &[u8],
    scheme: DigestScheme,
    key: &[u8],
) -> Result<Option<Vec<u8>>, HandshakeError> {
    let selector_offset = scheme.selector_offset();
    let selector_bytes = match packet.get(selector_offset..selector_offset + SELECTOR_SIZE) {
        Some(bytes) => bytes,
        None => return Err(HandshakeErrorKind::UnknownPacket1Format.into()),
    };

    let digest_offset = digest_offset(scheme, selector_bytes);
    let (before, digest, after) = split_at_digest(packet, digest_offset)?;
    let expected = calculate_hmac_sha256(&[before, after], key);

    if digest == &expected[..] {
        Ok(Some(digest.to_vec()))
    } else {
        Ok(None)
    }
}

fn digest_offset(scheme: DigestScheme, selector_bytes: &[u8]) -> usize {
    let sum: usize = selector_bytes.iter().map(|byte| *byte as usize).sum();
    sum % DIGEST_OFFSET_MODULUS + scheme.digest_base()
}

/// Splits a packet into the span before the digest, the digest itself, and
/// the span after it.  Fails instead of panicking when the packet cannot
/// contain a digest at the requested offset.
fn split_at_digest(
    packet: &[u8],
    digest_offset: usize,
) -> Result<(&[u8], &[u8], &[u8]), HandshakeError> {
    if packet.len() < digest_offset + SHA256_DIGEST_SIZE {
        return Err(HandshakeErrorKind::UnknownPacket1Format.into());
    }

    let before = &packet[..digest_offset];
    let digest = &packet[digest_offset..digest_offset + SHA256_DIGEST_SIZE];
    let after = &packet[digest_offset + SHA256_DIGEST_SIZE..];
    Ok((before, digest, after))
}
