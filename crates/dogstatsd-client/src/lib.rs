// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Minimal DogStatsD client for fire-and-forget metric emission over UDP.
//!
//! Serializes one metric per datagram in the DogStatsD text format
//! (`name:value|type|#tag1:val1,tag2:val2`) and sends it without waiting
//! for, or ever receiving, an acknowledgement. UDP statistics are
//! best-effort by design: send failures are logged at debug and dropped so
//! an unreachable agent never slows the caller down.

use std::fmt::Write as _;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use tracing::debug;

/// Errors constructing a [`StatsdClient`]. Emission itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("unable to resolve statsd endpoint {endpoint}: {source}")]
    Resolve {
        endpoint: String,
        source: std::io::Error,
    },

    #[error("statsd endpoint {endpoint} did not resolve to any address")]
    NoAddress { endpoint: String },

    #[error("unable to open statsd socket: {0}")]
    Socket(#[from] std::io::Error),
}

/// A DogStatsD emitter bound to one agent endpoint.
///
/// Constant tags are appended to every emission after the per-call tags.
/// The socket is nonblocking; `timing` and `histogram` return immediately
/// whether or not the datagram could be written.
pub struct StatsdClient {
    socket: UdpSocket,
    destination: SocketAddr,
    constant_tags: Vec<String>,
}

impl StatsdClient {
    pub fn new(host: &str, port: u16, constant_tags: Vec<String>) -> Result<Self, ClientError> {
        let endpoint = format!("{host}:{port}");
        let destination = endpoint
            .to_socket_addrs()
            .map_err(|source| ClientError::Resolve {
                endpoint: endpoint.clone(),
                source,
            })?
            .next()
            .ok_or(ClientError::NoAddress { endpoint })?;
        let socket = UdpSocket::bind(("0.0.0.0", 0))?;
        socket.set_nonblocking(true)?;
        Ok(Self {
            socket,
            destination,
            constant_tags,
        })
    }

    /// Emits a timer value (`|ms`). The value is passed through unscaled.
    pub fn timing(&self, metric: &str, value: f64, tags: &[String]) {
        self.send(metric, value, "ms", tags);
    }

    /// Emits a histogram sample (`|h`).
    pub fn histogram(&self, metric: &str, value: f64, tags: &[String]) {
        self.send(metric, value, "h", tags);
    }

    fn send(&self, metric: &str, value: f64, metric_type: &str, tags: &[String]) {
        let datagram = self.serialize(metric, value, metric_type, tags);
        if let Err(e) = self.socket.send_to(datagram.as_bytes(), self.destination) {
            debug!("dropping statsd datagram for {}: {}", metric, e);
        }
    }

    fn serialize(&self, metric: &str, value: f64, metric_type: &str, tags: &[String]) -> String {
        let mut datagram = format!("{metric}:{value}|{metric_type}");
        let mut all_tags = tags.iter().chain(self.constant_tags.iter());
        if let Some(first) = all_tags.next() {
            // Infallible; write! keeps the tag loop allocation-free.
            let _ = write!(datagram, "|#{first}");
            for tag in all_tags {
                let _ = write!(datagram, ",{tag}");
            }
        }
        datagram
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receiver() -> (UdpSocket, u16) {
        let socket = UdpSocket::bind(("127.0.0.1", 0)).unwrap();
        socket
            .set_read_timeout(Some(std::time::Duration::from_secs(2)))
            .unwrap();
        let port = socket.local_addr().unwrap().port();
        (socket, port)
    }

    fn recv_datagram(socket: &UdpSocket) -> String {
        let mut buf = [0u8; 1024];
        let (amt, _) = socket.recv_from(&mut buf).unwrap();
        String::from_utf8(buf[..amt].to_vec()).unwrap()
    }

    #[test]
    fn test_timing_wire_format() {
        let (socket, port) = receiver();
        let client = StatsdClient::new("127.0.0.1", port, vec![]).unwrap();
        client.timing(
            "garbagedog_gc_event_duration",
            0.06,
            &["stw:True".to_string(), "event_type:DefNew".to_string()],
        );
        assert_eq!(
            recv_datagram(&socket),
            "garbagedog_gc_event_duration:0.06|ms|#stw:True,event_type:DefNew"
        );
    }

    #[test]
    fn test_histogram_without_tags() {
        let (socket, port) = receiver();
        let client = StatsdClient::new("127.0.0.1", port, vec![]).unwrap();
        client.histogram("garbagedog_time_between_old_gc", 120.0, &[]);
        assert_eq!(
            recv_datagram(&socket),
            "garbagedog_time_between_old_gc:120|h"
        );
    }

    #[test]
    fn test_constant_tags_follow_call_tags() {
        let (socket, port) = receiver();
        let client =
            StatsdClient::new("127.0.0.1", port, vec!["env:prod".to_string()]).unwrap();
        client.histogram(
            "garbagedog_allocation_rate_histogram",
            -50.0,
            &["source:gc".to_string()],
        );
        assert_eq!(
            recv_datagram(&socket),
            "garbagedog_allocation_rate_histogram:-50|h|#source:gc,env:prod"
        );
    }

    #[test]
    fn test_constant_tags_only() {
        let (socket, port) = receiver();
        let client = StatsdClient::new("127.0.0.1", port, vec!["env:prod".to_string()]).unwrap();
        client.timing("garbagedog_gc_event_duration", 1.5, &[]);
        assert_eq!(
            recv_datagram(&socket),
            "garbagedog_gc_event_duration:1.5|ms|#env:prod"
        );
    }

    #[test]
    fn test_unresolvable_endpoint() {
        let result = StatsdClient::new("definitely-not-a-real-host.invalid", 8125, vec![]);
        assert!(result.is_err());
    }
}
