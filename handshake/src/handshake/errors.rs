use thiserror::Error;

/// Error state when an error occurs during the handshake process
#[derive(Debug, Error)]
#[error(transparent)]
pub struct HandshakeError {
    /// The kind of error that occurred
    #[from]
    pub kind: HandshakeErrorKind,
}

/// An enumeration defining all the possible errors that could occur during
/// the handshake process
#[derive(Debug, Error)]
pub enum HandshakeErrorKind {
    /// The first byte of the handshake carries the RTMP protocol version,
    /// and 3 is the only version this handshake speaks
    #[error("The first byte of the handshake did not contain a version of 3")]
    BadVersionId,

    /// Packet 1 did not carry a digest that validates under either known
    /// placement scheme.  The peer is malformed, hostile, or attempting the
    /// unsupported legacy handshake
    #[error("Packet 1 did not match any known format")]
    UnknownPacket1Format,

    /// Reserved for signaling short reads.  Incomplete packets are currently
    /// buffered transparently instead, so this kind is never raised
    #[error("More bytes are needed before the handshake can continue")]
    NeedMoreBytes,
}
