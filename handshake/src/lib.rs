//! This crate provides an implementation of the digest (also called complex)
//! version of the RTMP handshake, the cryptographically verified exchange
//! that precedes every RTMP media session.
//!
//! The handshake is exposed as a pull based state machine.  The state machine
//! never performs any I/O itself; instead the caller repeatedly asks it for
//! the next action to take, performs the corresponding read or write on
//! whatever transport it owns, and feeds received bytes back in.  This keeps
//! the handshake usable from blocking sockets, mio style event loops, and
//! async runtimes alike.
//!
//! # Examples
//!
//! Driving a client and a server handshake against each other in memory:
//!
//! ```
//! use rtmp_handshake::handshake::{Handshake, HandshakeAction, PeerType};
//!
//! let mut client = Handshake::new(PeerType::Client);
//! let mut server = Handshake::new(PeerType::Server);
//!
//! let mut client_finished = false;
//! let mut server_finished = false;
//!
//! while !client_finished || !server_finished {
//!     match client.take_action() {
//!         HandshakeAction::Write(bytes) => server.process_bytes(&bytes).unwrap(),
//!         HandshakeAction::Read => (),
//!         HandshakeAction::Finish { remaining_bytes } => {
//!             assert!(remaining_bytes.is_empty());
//!             client_finished = true;
//!         }
//!     }
//!
//!     match server.take_action() {
//!         HandshakeAction::Write(bytes) => client.process_bytes(&bytes).unwrap(),
//!         HandshakeAction::Read => (),
//!         HandshakeAction::Finish { remaining_bytes } => {
//!             assert!(remaining_bytes.is_empty());
//!             server_finished = true;
//!         }
//!     }
//! }
//! ```

extern crate hmac;
extern crate rand;
extern crate sha2;
extern crate thiserror;

#[cfg(test)]
extern crate byteorder;

pub mod handshake;
