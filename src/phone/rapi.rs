//! RAPI transport session.
//!
//! A session is one socket speaking the length-prefixed RAPI framing: every
//! request and reply is a u32 LE byte count followed by that many payload
//! bytes. How the socket reaches the device depends on the connection
//! record: `ppp` transports carry a routable address, so we dial the
//! device's RAPI port directly (authenticating first when the handset is
//! password-locked); everything else goes through the unix proxy socket the
//! connection daemon keeps next to its info files.

pub mod ops;
pub mod wire;

use crate::phone::error::PhoneError;
use std::path::Path;
use synce_conninfo::ConnectionInfo;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;
use wire::{Frame, Reply};

/// TCP port a connected handset listens on for RAPI traffic.
pub const RAPI_PORT: u16 = 990;

/// Upper bound on reply sizes; anything larger is a framing bug.
const MAX_FRAME: u32 = 16 * 1024 * 1024;

pub(crate) trait Transport: AsyncRead + AsyncWrite + Unpin + Send {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send> Transport for T {}

pub struct RapiSession {
    stream: Box<dyn Transport>,
}

impl RapiSession {
    /// Opens a session for the device described by `info`.
    pub async fn connect(info: &ConnectionInfo, synce_dir: &Path) -> Result<Self, PhoneError> {
        if info.uses_direct_tcp() {
            debug!("dialing {}:{}", info.device_ip, RAPI_PORT);
            let stream = TcpStream::connect((info.device_ip.as_str(), RAPI_PORT)).await?;
            let mut session = Self {
                stream: Box::new(stream),
            };
            if let Some(password) = &info.password {
                session.authenticate(password, info.key).await?;
            }
            Ok(session)
        } else {
            Self::connect_proxy(info, synce_dir).await
        }
    }

    #[cfg(unix)]
    async fn connect_proxy(info: &ConnectionInfo, synce_dir: &Path) -> Result<Self, PhoneError> {
        let socket = info.proxy_socket_path(synce_dir);
        debug!("connecting to daemon proxy {}", socket.display());
        // The daemon already holds the authenticated device link; the proxy
        // socket needs no password step.
        let stream = tokio::net::UnixStream::connect(&socket).await?;
        Ok(Self {
            stream: Box::new(stream),
        })
    }

    #[cfg(not(unix))]
    async fn connect_proxy(_info: &ConnectionInfo, _synce_dir: &Path) -> Result<Self, PhoneError> {
        Err(PhoneError::Protocol(
            "daemon proxy sockets are only available on unix".to_string(),
        ))
    }

    pub(crate) fn from_stream(stream: impl Transport + 'static) -> Self {
        Self {
            stream: Box::new(stream),
        }
    }

    /// Password handshake for locked handsets: each password byte XORed with
    /// the recorded key, sent behind a u16 LE length, answered by a single
    /// accept byte.
    async fn authenticate(&mut self, password: &str, key: u32) -> Result<(), PhoneError> {
        debug!("device is password locked, authenticating");
        let encoded: Vec<u8> = password.bytes().map(|b| b ^ key as u8).collect();
        let len = u16::try_from(encoded.len())
            .map_err(|_| PhoneError::Protocol("password too long".to_string()))?;

        self.stream.write_all(&len.to_le_bytes()).await?;
        self.stream.write_all(&encoded).await?;
        self.stream.flush().await?;

        let mut accepted = [0u8; 1];
        self.stream.read_exact(&mut accepted).await?;
        if accepted[0] == 0 {
            return Err(PhoneError::AuthRefused);
        }
        Ok(())
    }

    /// Sends one request and parses the matching reply.
    pub async fn invoke(&mut self, frame: Frame) -> Result<Reply, PhoneError> {
        debug!(
            "rapi call {:#04x} ({} payload bytes)",
            frame.command(),
            frame.payload().len()
        );
        self.send_raw(frame.payload()).await?;
        let data = self.recv_raw().await?;
        Reply::parse(data)
    }

    async fn send_raw(&mut self, payload: &[u8]) -> Result<(), PhoneError> {
        let size = u32::try_from(payload.len())
            .map_err(|_| PhoneError::Protocol("request too large".to_string()))?;
        self.stream.write_all(&size.to_le_bytes()).await?;
        self.stream.write_all(payload).await?;
        self.stream.flush().await?;
        Ok(())
    }

    async fn recv_raw(&mut self) -> Result<Vec<u8>, PhoneError> {
        let mut size_bytes = [0u8; 4];
        self.stream.read_exact(&mut size_bytes).await?;
        let size = u32::from_le_bytes(size_bytes);
        if size > MAX_FRAME {
            return Err(PhoneError::Protocol(format!(
                "reply frame of {} bytes exceeds limit",
                size
            )));
        }
        let mut data = vec![0u8; size as usize];
        self.stream.read_exact(&mut data).await?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    async fn read_request(stream: &mut tokio::io::DuplexStream) -> Vec<u8> {
        let mut size_bytes = [0u8; 4];
        stream.read_exact(&mut size_bytes).await.unwrap();
        let mut payload = vec![0u8; u32::from_le_bytes(size_bytes) as usize];
        stream.read_exact(&mut payload).await.unwrap();
        payload
    }

    async fn write_reply(stream: &mut tokio::io::DuplexStream, payload: &[u8]) {
        stream
            .write_all(&(payload.len() as u32).to_le_bytes())
            .await
            .unwrap();
        stream.write_all(payload).await.unwrap();
    }

    #[tokio::test]
    async fn invoke_frames_request_and_parses_reply() {
        let (client, mut server) = tokio::io::duplex(64 * 1024);
        let mut session = RapiSession::from_stream(client);

        let device = tokio::spawn(async move {
            let request = read_request(&mut server).await;
            assert_eq!(&request[..4], &0x29u32.to_le_bytes());
            assert_eq!(&request[4..8], &5u32.to_le_bytes());

            let mut reply = Vec::new();
            reply.extend_from_slice(&1u32.to_le_bytes());
            reply.extend_from_slice(&0u32.to_le_bytes());
            reply.extend_from_slice(&123u32.to_le_bytes());
            write_reply(&mut server, &reply).await;
            server
        });

        let mut frame = Frame::new(0x29);
        frame.put_u32(5);
        let mut reply = session.invoke(frame).await.unwrap();
        assert_eq!(reply.take_u32().unwrap(), 123);
        device.await.unwrap();
    }

    #[tokio::test]
    async fn invoke_surfaces_remote_failure() {
        let (client, mut server) = tokio::io::duplex(64 * 1024);
        let mut session = RapiSession::from_stream(client);

        let device = tokio::spawn(async move {
            let _ = read_request(&mut server).await;
            let mut reply = Vec::new();
            reply.extend_from_slice(&1u32.to_le_bytes());
            reply.extend_from_slice(&0x8000_4005u32.to_le_bytes()); // E_FAIL
            write_reply(&mut server, &reply).await;
            server
        });

        let result = session.invoke(Frame::new(0x05)).await;
        assert!(matches!(result, Err(PhoneError::Remote(0x8000_4005))));
        device.await.unwrap();
    }

    #[tokio::test]
    async fn oversized_reply_is_rejected() {
        let (client, mut server) = tokio::io::duplex(64 * 1024);
        let mut session = RapiSession::from_stream(client);

        let device = tokio::spawn(async move {
            let _ = read_request(&mut server).await;
            server
                .write_all(&(MAX_FRAME + 1).to_le_bytes())
                .await
                .unwrap();
            server
        });

        let result = session.invoke(Frame::new(0x05)).await;
        assert!(matches!(result, Err(PhoneError::Protocol(_))));
        device.await.unwrap();
    }

    #[tokio::test]
    async fn authenticate_xors_password_with_key() {
        let (client, mut server) = tokio::io::duplex(1024);
        let mut session = RapiSession::from_stream(client);

        let device = tokio::spawn(async move {
            let mut len_bytes = [0u8; 2];
            server.read_exact(&mut len_bytes).await.unwrap();
            let mut encoded = vec![0u8; u16::from_le_bytes(len_bytes) as usize];
            server.read_exact(&mut encoded).await.unwrap();

            let decoded: Vec<u8> = encoded.iter().map(|b| b ^ 66u8).collect();
            assert_eq!(decoded, b"1234");
            server.write_all(&[1u8]).await.unwrap();
            server
        });

        session.authenticate("1234", 66).await.unwrap();
        device.await.unwrap();
    }

    #[tokio::test]
    async fn refused_password_is_an_auth_error() {
        let (client, mut server) = tokio::io::duplex(1024);
        let mut session = RapiSession::from_stream(client);

        let device = tokio::spawn(async move {
            let mut len_bytes = [0u8; 2];
            server.read_exact(&mut len_bytes).await.unwrap();
            let mut encoded = vec![0u8; u16::from_le_bytes(len_bytes) as usize];
            server.read_exact(&mut encoded).await.unwrap();
            server.write_all(&[0u8]).await.unwrap();
            server
        });

        let result = session.authenticate("wrong", 66).await;
        assert!(matches!(result, Err(PhoneError::AuthRefused)));
        device.await.unwrap();
    }
}
