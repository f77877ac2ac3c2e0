//! Construction and validation of the fixed size packets exchanged during
//! the handshake.

use rand::RngCore;

use super::digest;
use super::digest::{DigestScheme, SHA256_DIGEST_SIZE};
use super::errors::HandshakeError;
use super::RTMP_PACKET_SIZE;

/// The only RTMP protocol version this handshake speaks.
pub const RTMP_PROTOCOL_VERSION: u8 = 3;

const TIME_FIELD_SIZE: usize = 4;
const VERSION_TAG: [u8; 4] = [0x80, 0x00, 0x07, 0x02];
const PACKET_HEADER_SIZE: usize = 8;

const GENUINE_FMS_NAME: &'static [u8] = b"Genuine Adobe Flash Media Server 001";
const GENUINE_FP_NAME: &'static [u8] = b"Genuine Adobe Flash Player 001";

const GENUINE_KEY_TAIL: [u8; 32] = [
    0xf0, 0xee, 0xc2, 0x4a, 0x80, 0x68, 0xbe, 0xe8, 0x2e, 0x00, 0xd0, 0xd1, 0x02, 0x9e, 0x7e,
    0x57, 0x6e, 0xec, 0x5d, 0x2d, 0x29, 0x80, 0x6f, 0xab, 0x93, 0xb8, 0xe6, 0x36, 0xcf, 0xeb,
    0x31, 0xae,
];

/// Key material for packets originated by the server side of a connection.
pub fn genuine_fms_key() -> Vec<u8> {
    let mut key = GENUINE_FMS_NAME.to_vec();
    key.extend_from_slice(&GENUINE_KEY_TAIL);
    key
}

/// Key material for packets originated by the client side of a connection.
pub fn genuine_fp_key() -> Vec<u8> {
    let mut key = GENUINE_FP_NAME.to_vec();
    key.extend_from_slice(&GENUINE_KEY_TAIL);
    key
}

/// Builds the version byte followed by a digest signed packet 1.  This pair
/// forms c0 and c1 when sent by a client, and s0 and s1 when sent by a
/// server responding to a verified c1.
pub fn create_p0_and_p1<R: RngCore>(rng: &mut R, signing_key: &[u8]) -> Vec<u8> {
    let mut packet = [0_u8; RTMP_PACKET_SIZE];

    // The time field stays zeroed; the four bytes after it hold the version
    // tag the digest handshake requires.
    packet[TIME_FIELD_SIZE..PACKET_HEADER_SIZE].copy_from_slice(&VERSION_TAG);
    rng.fill_bytes(&mut packet[PACKET_HEADER_SIZE..]);
    digest::sign_packet(&mut packet, DigestScheme::Scheme0, signing_key);

    let mut bytes = Vec::with_capacity(1 + RTMP_PACKET_SIZE);
    bytes.push(RTMP_PROTOCOL_VERSION);
    bytes.extend_from_slice(&packet);
    bytes
}

/// Builds the acknowledgment packet (c2 or s2): a fresh random payload with
/// an HMAC-SHA256 signature appended.  The signature is keyed off the digest
/// extracted from the peer's packet 1, run through the local key first.
pub fn create_ack_packet<R: RngCore>(
    rng: &mut R,
    remote_digest: &[u8],
    signing_key: &[u8],
) -> Vec<u8> {
    let mut packet = vec![0_u8; RTMP_PACKET_SIZE - SHA256_DIGEST_SIZE];
    rng.fill_bytes(&mut packet);

    let signature_key = digest::calculate_hmac_sha256(&[remote_digest], signing_key);
    let signature = digest::calculate_hmac_sha256(&[&packet[..]], &signature_key);
    packet.extend_from_slice(&signature);
    packet
}

/// Checks an inbound packet 1 against both digest placement schemes,
/// returning the digest the peer embedded when one of them matches.
pub fn validate_packet_1(
    packet: &[u8],
    verification_key: &[u8],
) -> Result<Vec<u8>, HandshakeError> {
    digest::verify_embedded_digest(packet, verification_key)
}

#[cfg(test)]
mod tests {
    use byteorder::{BigEndian, ReadBytesExt};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Cursor;

    use super::super::errors::{HandshakeError, HandshakeErrorKind};
    use super::super::RTMP_PACKET_SIZE;
    use super::*;

    #[test]
    fn p0_and_p1_contain_version_byte_zeroed_time_and_version_tag() {
        let mut rng = StdRng::seed_from_u64(5);
        let bytes = create_p0_and_p1(&mut rng, &genuine_fp_key());

        assert_eq!(bytes.len(), 1 + RTMP_PACKET_SIZE);
        assert_eq!(bytes[0], RTMP_PROTOCOL_VERSION);

        let mut cursor = Cursor::new(&bytes[1..]);
        let time = cursor.read_u32::<BigEndian>().unwrap();
        assert_eq!(time, 0);
        assert_eq!(&bytes[5..9], &VERSION_TAG[..]);
    }

    #[test]
    fn p1_validates_under_the_key_that_signed_it() {
        let mut rng = StdRng::seed_from_u64(5);
        let bytes = create_p0_and_p1(&mut rng, &genuine_fp_key());

        validate_packet_1(&bytes[1..], &genuine_fp_key()).unwrap();
    }

    #[test]
    fn p1_does_not_validate_under_the_other_genuine_key() {
        let mut rng = StdRng::seed_from_u64(5);
        let bytes = create_p0_and_p1(&mut rng, &genuine_fp_key());

        match validate_packet_1(&bytes[1..], &genuine_fms_key()) {
            Err(HandshakeError {
                kind: HandshakeErrorKind::UnknownPacket1Format,
            }) => (),
            x => panic!("Expected UnknownPacket1Format but got {:?}", x),
        }
    }

    #[test]
    fn ack_packet_signature_is_keyed_off_the_remote_digest() {
        let mut rng = StdRng::seed_from_u64(5);
        let remote_digest = [11_u8; 32];
        let packet = create_ack_packet(&mut rng, &remote_digest, &genuine_fms_key());

        assert_eq!(packet.len(), RTMP_PACKET_SIZE);

        let payload = &packet[..RTMP_PACKET_SIZE - SHA256_DIGEST_SIZE];
        let signature_key =
            super::super::digest::calculate_hmac_sha256(&[&remote_digest[..]], &genuine_fms_key());
        let expected =
            super::super::digest::calculate_hmac_sha256(&[payload], &signature_key);

        assert_eq!(&packet[RTMP_PACKET_SIZE - SHA256_DIGEST_SIZE..], &expected[..]);
    }

    #[test]
    fn same_seed_produces_the_same_p0_and_p1() {
        let mut rng1 = StdRng::seed_from_u64(99);
        let mut rng2 = StdRng::seed_from_u64(99);

        let bytes1 = create_p0_and_p1(&mut rng1, &genuine_fp_key());
        let bytes2 = create_p0_and_p1(&mut rng2, &genuine_fp_key());

        assert_eq!(bytes1, bytes2);
    }
}
