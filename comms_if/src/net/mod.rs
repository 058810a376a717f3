//! # Network Module
//!
//! This module provides a thin layer over ZMQ, the networking library chosen for the software.
//! The wireless command endpoint is a REP socket, one request being one command line and the reply
//! being the response text.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::debug;
use serde::Deserialize;
use zmq::{Context, Socket, SocketType};

// Export zmq
pub use zmq;

// ------------------------------------------------------------------------------------------------
// MACROS
// ------------------------------------------------------------------------------------------------

macro_rules! set_sockopts {
    ($socket:expr, $(($opt:ident, $val:expr)),+) => {
        $(
            $socket.$opt($val)
                .map_err(|e| NetError::SocketOptionError(stringify!($opt).into(), e))?;
        )+
    };
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Options set on a socket before it is bound or connected.
///
/// Most options here correspond to those found in the
/// [`zmq_setsockopt`](http://api.zeromq.org/4-2:zmq-setsockopt) documentation. All times are in
/// milliseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SocketOptions {
    /// Bind to the endpoint rather than connect to it. Servers bind.
    pub bind: bool,

    /// `ZMQ_LINGER`: Set linger period for socket shutdown
    pub linger: i32,

    /// `ZMQ_RCVTIMEO`: Maximum time before a recv operation returns with `EAGAIN`
    pub recv_timeout: i32,

    /// `ZMQ_SNDTIMEO`: Maximum time before a send operation returns with `EAGAIN`
    pub send_timeout: i32,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum NetError {
    #[error("Error creating the socket: {0}")]
    CreateSocketError(zmq::Error),

    #[error("Could not bind or connect the socket to {0}: {1}")]
    EndpointError(String, zmq::Error),

    #[error("Could not set the {0} socket option: {1}")]
    SocketOptionError(String, zmq::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SocketOptions {
    /// Set these options on the given socket.
    pub fn set(&self, socket: &Socket) -> Result<(), NetError> {
        set_sockopts!(
            socket,
            (set_linger, self.linger),
            (set_rcvtimeo, self.recv_timeout),
            (set_sndtimeo, self.send_timeout)
        );

        Ok(())
    }
}

impl Default for SocketOptions {
    fn default() -> Self {
        // A server which never blocks the control loop for long
        Self {
            bind: true,
            linger: 1,
            recv_timeout: 10,
            send_timeout: 10,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Create a socket, set its options, then bind or connect it to `endpoint`.
pub fn create_socket(
    ctx: &Context,
    socket_type: SocketType,
    options: &SocketOptions,
    endpoint: &str
) -> Result<Socket, NetError> {
    let socket = ctx.socket(socket_type)
        .map_err(NetError::CreateSocketError)?;

    options.set(&socket)?;

    match options.bind {
        true => socket.bind(endpoint),
        false => socket.connect(endpoint)
    }.map_err(|e| NetError::EndpointError(endpoint.to_string(), e))?;

    debug!(
        "Socket {} {}", 
        if options.bind { "bound to" } else { "connected to" }, 
        endpoint
    );

    Ok(socket)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_req_rep_inproc() {
        let ctx = Context::new();

        let server = create_socket(
            &ctx,
            zmq::REP,
            &SocketOptions { recv_timeout: 1000, ..Default::default() },
            "inproc://net_test"
        ).unwrap();

        let client = create_socket(
            &ctx,
            zmq::REQ,
            &SocketOptions { bind: false, recv_timeout: 1000, ..Default::default() },
            "inproc://net_test"
        ).unwrap();

        client.send("ping", 0).unwrap();
        assert_eq!(server.recv_string(0).unwrap().unwrap(), "ping");
        server.send("pong", 0).unwrap();
        assert_eq!(client.recv_string(0).unwrap().unwrap(), "pong");
    }
}
