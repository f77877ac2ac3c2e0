//! This module handles the digest version of the RTMP handshake, which both
//! sides of a connection must perform before any RTMP messages can flow.
//!
//! The exchange consists of three packets in each direction.  The client
//! opens with its protocol version byte (c0) and a 1536 byte packet carrying
//! a hidden HMAC-SHA256 digest (c1).  The server verifies the digest, then
//! answers with its own version byte, its own digest carrying packet (s0 and
//! s1), and an acknowledgment signed off the client's digest (s2).  The
//! client verifies s1 and acknowledges it in turn with c2.  Neither side is
//! trusted until the digest it sent has been verified, which is what rules
//! out plain byte echoing peers.
//!
//! The state machine performs no I/O.  Drivers repeatedly call
//! [`Handshake::take_action`] and service whatever it returns: `Write`
//! means deliver bytes to the peer, `Read` means feed the next received
//! bytes to [`Handshake::process_bytes`], and `Finish` ends the loop,
//! handing over any bytes that arrived past the handshake boundary so the
//! next protocol layer can consume them.

mod digest;
mod errors;
mod packet;

use std::mem;

use rand;
use rand::rngs::ThreadRng;
use rand::RngCore;

pub use self::errors::{HandshakeError, HandshakeErrorKind};

/// Packets 1 and 2 of the handshake are always exactly this many bytes.
pub const RTMP_PACKET_SIZE: usize = 1536;

/// Identifies which end of the connection a handshake acts as.  The role
/// fixes which genuine key signs outbound packets and which one inbound
/// packets are verified against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerType {
    Server,
    Client,
}

#[derive(Eq, PartialEq, Debug, Clone)]
enum Stage {
    WaitingForPacket0,
    WaitingForPacket1,
    WaitingForPacket2,
    Complete,
}

/// The next step a driver must perform on behalf of the handshake.
#[derive(Debug, PartialEq)]
pub enum HandshakeAction {
    /// More bytes are needed from the peer.  The driver should read from its
    /// transport and hand whatever arrives to `process_bytes`.
    Read,

    /// These bytes must be delivered to the peer in full before the next
    /// action is requested.
    Write(Vec<u8>),

    /// The handshake has been verified as complete.  Contains any bytes that
    /// were received past the handshake boundary, which belong to the next
    /// protocol layer and may be empty.
    Finish { remaining_bytes: Vec<u8> },
}

/// State machine for the digest handshake.
///
/// A handshake is created once per connection with the role it should play
/// and is discarded after `Finish` has been observed.  All blocking, timeout
/// and retry behavior belongs to the driver; every operation here returns
/// immediately.
pub struct Handshake<R: RngCore = ThreadRng> {
    peer_type: PeerType,
    current_stage: Stage,
    buffer: Vec<u8>,
    outbound: Vec<u8>,
    rng: R,
}

impl Handshake<ThreadRng> {
    /// Creates a handshake backed by the thread local random number
    /// generator.  A client starts with its version byte and packet 1
    /// already queued for writing; a server starts silent, waiting to
    /// receive c0 and c1 first.
    pub fn new(peer_type: PeerType) -> Handshake<ThreadRng> {
        Handshake::with_rng(peer_type, rand::thread_rng())
    }
}

impl<R: RngCore> Handshake<R> {
    /// Creates a handshake that draws all of its packet payloads from the
    /// provided random source, which allows deterministic output in tests.
    pub fn with_rng(peer_type: PeerType, rng: R) -> Handshake<R> {
        let mut handshake = Handshake {
            peer_type,
            current_stage: Stage::WaitingForPacket0,
            buffer: Vec::new(),
            outbound: Vec::new(),
            rng,
        };

        if handshake.peer_type == PeerType::Client {
            let p0_and_p1 =
                packet::create_p0_and_p1(&mut handshake.rng, &packet::genuine_fp_key());
            handshake.outbound.extend(p0_and_p1);
        }

        handshake
    }

    /// Returns the next action the driver must take.  Pending output always
    /// takes priority over reading; once the handshake is complete and all
    /// output has been handed over, the leftover bytes are surfaced through
    /// `Finish`.
    pub fn take_action(&mut self) -> HandshakeAction {
        if !self.outbound.is_empty() {
            return HandshakeAction::Write(mem::replace(&mut self.outbound, Vec::new()));
        }

        if self.current_stage == Stage::Complete {
            return HandshakeAction::Finish {
                remaining_bytes: mem::replace(&mut self.buffer, Vec::new()),
            };
        }

        HandshakeAction::Read
    }

    /// Feeds bytes received from the peer into the state machine.  Multiple
    /// logical packets arriving in one read are all handled within a single
    /// call, and incomplete packets are buffered until enough bytes arrive.
    /// Any error returned is terminal for the handshake and the driver
    /// should close the connection.
    pub fn process_bytes(&mut self, data: &[u8]) -> Result<(), HandshakeError> {
        if self.current_stage == Stage::Complete {
            return Ok(());
        }

        self.buffer.extend_from_slice(data);

        loop {
            let starting_stage = self.current_stage.clone();
            match self.current_stage {
                Stage::WaitingForPacket0 => self.parse_p0()?,
                Stage::WaitingForPacket1 => self.parse_p1()?,
                Stage::WaitingForPacket2 => self.parse_p2()?,
                Stage::Complete => break,
            }

            if self.current_stage == starting_stage {
                // If we are still on the same stage assume that we didn't
                // have enough bytes to process the current packet and wait
                // to try again
                break;
            }
        }

        Ok(())
    }

    fn parse_p0(&mut self) -> Result<(), HandshakeError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        if self.buffer[0] != packet::RTMP_PROTOCOL_VERSION {
            return Err(HandshakeErrorKind::BadVersionId.into());
        }

        self.buffer.remove(0);
        self.current_stage = Stage::WaitingForPacket1;
        Ok(())
    }

    fn parse_p1(&mut self) -> Result<(), HandshakeError> {
        if self.buffer.len() < RTMP_PACKET_SIZE {
            return Ok(());
        }

        let p1: Vec<u8> = self.buffer.drain(..RTMP_PACKET_SIZE).collect();
        let remote_digest = packet::validate_packet_1(&p1, &self.remote_key())?;

        let local_key = self.local_key();
        if self.peer_type == PeerType::Server {
            // The server's version byte and own packet 1 go out ahead of the
            // acknowledgment, so the client sees s0, s1, then s2.
            let p0_and_p1 = packet::create_p0_and_p1(&mut self.rng, &local_key);
            self.outbound.extend(p0_and_p1);
        }

        let ack = packet::create_ack_packet(&mut self.rng, &remote_digest, &local_key);
        self.outbound.extend(ack);

        self.current_stage = Stage::WaitingForPacket2;
        Ok(())
    }

    fn parse_p2(&mut self) -> Result<(), HandshakeError> {
        if self.buffer.len() < RTMP_PACKET_SIZE {
            return Ok(());
        }

        // The acknowledgment is taken on length alone, with no content
        // verification.  Bytes past it stay buffered for the next protocol
        // layer.
        self.buffer.drain(..RTMP_PACKET_SIZE);
        self.current_stage = Stage::Complete;
        Ok(())
    }

    fn local_key(&self) -> Vec<u8> {
        match self.peer_type {
            PeerType::Server => packet::genuine_fms_key(),
            PeerType::Client => packet::genuine_fp_key(),
        }
    }

    fn remote_key(&self) -> Vec<u8> {
        match self.peer_type {
            PeerType::Server => packet::genuine_fp_key(),
            PeerType::Client => packet::genuine_fms_key(),
        }
    }
}
