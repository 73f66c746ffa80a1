//! SNTP client: one UDP round trip per sync
//!
//! The station only needs whole seconds, so the client sends the minimal
//! 48-byte client request (`LI=0, VN=3, Mode=3`, everything else zero) and
//! reads the integer part of the server's transmit timestamp:
//!
//! ```text
//! byte  0       40      44      48
//!       | 0x1B ... | secs  | frac  |
//!                   big-endian, seconds since 1900-01-01
//! ```
//!
//! No retries here. The scheduler decides when to try again.

use std::net::UdpSocket;
use std::time::Duration;

use meteo_core::civil_time::UnixSeconds;
use meteo_core::constants::time::{
    NTP_CLIENT_REQUEST, NTP_PACKET_LEN, NTP_TIMEOUT_MS, NTP_TRANSMIT_SECONDS_OFFSET,
    NTP_UNIX_EPOCH_DELTA_S,
};
use meteo_core::traits::NetworkTimeSource;
use meteo_core::StationResult;

use crate::ConnectorError;

/// Well-known NTP port
pub const NTP_PORT: u16 = 123;

/// Default public pool
pub const DEFAULT_SERVER: &str = "pool.ntp.org";

/// Build a client request packet
pub fn build_request() -> [u8; NTP_PACKET_LEN] {
    let mut packet = [0u8; NTP_PACKET_LEN];
    packet[0] = NTP_CLIENT_REQUEST;
    packet
}

/// Extract UTC seconds from a server reply
pub fn parse_reply(reply: &[u8]) -> Result<UnixSeconds, ConnectorError> {
    let offset = NTP_TRANSMIT_SECONDS_OFFSET;
    if reply.len() < NTP_PACKET_LEN {
        return Err(ConnectorError::ProtocolError(format!(
            "reply is {} bytes, expected {}",
            reply.len(),
            NTP_PACKET_LEN
        )));
    }

    let mut word = [0u8; 4];
    word.copy_from_slice(&reply[offset..offset + 4]);
    let ntp_seconds = u32::from_be_bytes(word);

    // unsynchronized servers answer with a zero timestamp
    if ntp_seconds == 0 {
        return Err(ConnectorError::ProtocolError("zero transmit timestamp".into()));
    }

    Ok(ntp_seconds as i64 - NTP_UNIX_EPOCH_DELTA_S)
}

/// Blocking SNTP client
#[derive(Debug, Clone)]
pub struct SntpClient {
    server: String,
    timeout: Duration,
}

impl SntpClient {
    /// `server` may carry a port; port 123 is used otherwise
    pub fn new(server: impl Into<String>) -> Self {
        let mut server = server.into();
        if !server.contains(':') {
            server = format!("{}:{}", server, NTP_PORT);
        }
        Self {
            server,
            timeout: Duration::from_millis(NTP_TIMEOUT_MS as u64),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    /// One request, one reply
    pub fn query(&self) -> Result<UnixSeconds, ConnectorError> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.set_read_timeout(Some(self.timeout))?;
        socket.connect(&self.server)?;
        socket.send(&build_request())?;

        let mut reply = [0u8; NTP_PACKET_LEN];
        let len = socket.recv(&mut reply).map_err(|e| {
            let err = ConnectorError::Io(e);
            if err.is_timeout() {
                ConnectorError::Timeout
            } else {
                err
            }
        })?;

        parse_reply(&reply[..len])
    }
}

impl Default for SntpClient {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER)
    }
}

impl NetworkTimeSource for SntpClient {
    fn fetch_utc(&mut self) -> StationResult<UnixSeconds> {
        match self.query() {
            Ok(utc) => {
                log::debug!("NTP {} answered {}", self.server, utc);
                Ok(utc)
            }
            Err(err) => {
                log::warn!("NTP query to {} failed: {}", self.server, err);
                Err(err.into())
            }
        }
    }
}
