//! # Wireless Command Server
//!
//! REP socket on which the operator's tablet sends command lines. Every request must be answered
//! before the next one can be received, so callers pair each `recv_line` returning a line with a
//! `send_response`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    cmd::Response,
    net::{create_socket, zmq, NetError},
};

use crate::params::RovExecParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Wireless command server
pub struct CmdServer {
    socket: zmq::Socket,

    /// True between receiving a request and replying to it.
    awaiting_reply: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CmdServerError {
    #[error("Socket error: {0}")]
    SocketError(NetError),

    #[error("Could not send the response: {0}")]
    SendError(zmq::Error),

    #[error("Could not receive a request: {0}")]
    RecvError(zmq::Error),

    #[error("The client sent a request which was not valid UTF-8")]
    NonUtf8Request,

    #[error("No request is waiting for a response")]
    NoPendingRequest,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CmdServer {
    /// Bind the server to the command endpoint.
    pub fn new(ctx: &zmq::Context, params: &RovExecParams) -> Result<Self, CmdServerError> {
        Self::with_endpoint(ctx, &params.cmd_socket, &params.cmd_endpoint)
    }

    pub fn with_endpoint(
        ctx: &zmq::Context, 
        options: &comms_if::net::SocketOptions, 
        endpoint: &str
    ) -> Result<Self, CmdServerError> {
        let socket = create_socket(ctx, zmq::REP, options, endpoint)
            .map_err(CmdServerError::SocketError)?;

        Ok(Self {
            socket,
            awaiting_reply: false,
        })
    }

    /// Receive a single command line, `Ok(None)` if nothing arrived within the receive timeout.
    ///
    /// A request which is not valid UTF-8 is answered straight away with an error response.
    pub fn recv_line(&mut self) -> Result<Option<String>, CmdServerError> {
        if self.awaiting_reply {
            return Ok(None)
        }

        match self.socket.recv_string(0) {
            Ok(Ok(s)) => {
                self.awaiting_reply = true;
                Ok(Some(s))
            },
            Ok(Err(_)) => {
                self.awaiting_reply = true;
                self.send_response(&Response::Rejected("request is not valid UTF-8".into()))?;
                Err(CmdServerError::NonUtf8Request)
            },
            Err(zmq::Error::EAGAIN) => Ok(None),
            Err(e) => Err(CmdServerError::RecvError(e))
        }
    }

    /// Send the response to the last request received.
    pub fn send_response(&mut self, response: &Response) -> Result<(), CmdServerError> {
        if !self.awaiting_reply {
            return Err(CmdServerError::NoPendingRequest)
        }

        self.socket.send(&response.to_string(), 0)
            .map_err(CmdServerError::SendError)?;
        self.awaiting_reply = false;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::net::SocketOptions;

    #[test]
    fn test_request_reply() {
        let ctx = zmq::Context::new();
        let mut server = CmdServer::with_endpoint(
            &ctx, 
            &SocketOptions::default(), 
            "inproc://cmd_server_test"
        ).unwrap();

        let client = create_socket(
            &ctx, 
            zmq::REQ, 
            &SocketOptions { bind: false, recv_timeout: 1000, ..Default::default() },
            "inproc://cmd_server_test"
        ).unwrap();

        // Nothing yet
        assert!(server.recv_line().unwrap().is_none());
        assert!(server.send_response(&Response::Ok).is_err());

        client.send("status", 0).unwrap();

        let mut line = None;
        for _ in 0..100 {
            line = server.recv_line().unwrap();
            if line.is_some() {
                break
            }
        }
        assert_eq!(line.as_deref(), Some("status"));

        server.send_response(&Response::Blocked("navigation active".into())).unwrap();
        assert_eq!(
            client.recv_string(0).unwrap().unwrap(), 
            "BLOCKED: navigation active"
        );
    }
}
