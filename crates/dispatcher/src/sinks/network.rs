//! NetworkSink - UDP publication of annotation summaries
//!
//! Only the pixel-free [`AnnotationSummary`] goes on the wire.

use contracts::{AnnotatedFrame, AnnotationSummary, ContractError, DataSink};
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, instrument, warn};

/// Serialization format for network transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkFormat {
    #[default]
    Json,
    Bincode,
}

/// Configuration for NetworkSink
#[derive(Debug, Clone)]
pub struct NetworkSinkConfig {
    /// Target address
    pub addr: SocketAddr,
    pub format: NetworkFormat,
    /// Largest datagram sent; bigger summaries are rejected
    pub max_packet_size: usize,
}

impl NetworkSinkConfig {
    /// `addr` is required; `format` is `json` (default) or `bincode`
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let addr_str = params
            .get("addr")
            .ok_or_else(|| "missing 'addr' parameter".to_string())?;

        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|e| format!("invalid address '{addr_str}': {e}"))?;

        let format = match params.get("format").map(String::as_str) {
            Some("bincode") => NetworkFormat::Bincode,
            Some("json") | None => NetworkFormat::Json,
            Some(other) => return Err(format!("unknown format '{other}'")),
        };

        let max_packet_size = match params.get("max_packet_size") {
            Some(s) => s
                .parse()
                .map_err(|e| format!("invalid max_packet_size '{s}': {e}"))?,
            None => 65000,
        };

        Ok(Self {
            addr,
            format,
            max_packet_size,
        })
    }
}

/// Sink that sends annotation summaries over UDP
pub struct NetworkSink {
    name: String,
    config: NetworkSinkConfig,
    socket: Option<UdpSocket>,
}

impl NetworkSink {
    #[instrument(name = "network_sink_new", skip(name, config), fields(target = %config.addr))]
    pub async fn new(name: impl Into<String>, config: NetworkSinkConfig) -> std::io::Result<Self> {
        let name = name.into();
        let bind_addr: SocketAddr = if config.addr.is_ipv6() {
            ([0u16; 8], 0).into()
        } else {
            ([0, 0, 0, 0], 0).into()
        };
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.connect(&config.addr).await?;

        debug!(sink = %name, target = %config.addr, "NetworkSink connected");

        Ok(Self {
            name,
            config,
            socket: Some(socket),
        })
    }

    #[instrument(name = "network_sink_from_params", skip(name, params))]
    pub async fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let config = NetworkSinkConfig::from_params(params)
            .map_err(|e| ContractError::sink_write(&name, e))?;

        Self::new(name.clone(), config)
            .await
            .map_err(|e| ContractError::SinkConnection {
                sink_name: name,
                message: e.to_string(),
            })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }

    fn encode(&self, summary: &AnnotationSummary) -> Result<Vec<u8>, ContractError> {
        let data = match self.config.format {
            NetworkFormat::Json => {
                serde_json::to_vec(summary).map_err(|e| format!("json error: {e}"))
            }
            NetworkFormat::Bincode => {
                bincode::serialize(summary).map_err(|e| format!("bincode error: {e}"))
            }
        }
        .map_err(|e| ContractError::sink_write(&self.name, e))?;

        if data.len() > self.config.max_packet_size {
            return Err(ContractError::sink_write(
                &self.name,
                format!(
                    "summary of {} bytes exceeds max packet size {}",
                    data.len(),
                    self.config.max_packet_size
                ),
            ));
        }
        Ok(data)
    }
}

impl DataSink for NetworkSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "network_sink_write",
        skip(self, frame),
        fields(sink = %self.name, frame_id = frame.frame_id)
    )]
    async fn write(&mut self, frame: &AnnotatedFrame) -> Result<(), ContractError> {
        let data = self.encode(&frame.summary())?;
        let socket = self
            .socket
            .as_ref()
            .ok_or_else(|| ContractError::sink_write(&self.name, "socket not connected"))?;

        // Best effort: a lost datagram is not a sink failure
        match socket.send(&data).await {
            Ok(sent) => debug!(bytes = sent, "Summary sent"),
            Err(e) => warn!(error = %e, "UDP send failed"),
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "network_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.socket = None;
        debug!(sink = %self.name, "NetworkSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{annotated_frame, correlation};
    use contracts::ProjectionResult;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    async fn receiver() -> (UdpSocket, SocketAddr) {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        (socket, addr)
    }

    #[test]
    fn test_config_parsing() {
        let config =
            NetworkSinkConfig::from_params(&params(&[("addr", "127.0.0.1:9999"), ("format", "bincode")]))
                .unwrap();
        assert_eq!(config.addr.port(), 9999);
        assert_eq!(config.format, NetworkFormat::Bincode);
        assert_eq!(config.max_packet_size, 65000);

        assert!(NetworkSinkConfig::from_params(&params(&[])).is_err());
        assert!(NetworkSinkConfig::from_params(&params(&[("addr", "nope")])).is_err());
        assert!(
            NetworkSinkConfig::from_params(&params(&[("addr", "127.0.0.1:1"), ("format", "xml")]))
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_json_summary_received() {
        let (rx, addr) = receiver().await;
        let config = NetworkSinkConfig {
            addr,
            format: NetworkFormat::Json,
            max_packet_size: 65000,
        };
        let mut sink = NetworkSink::new("udp", config).await.unwrap();
        let frame = annotated_frame(
            4,
            vec![correlation(ProjectionResult::Located {
                depth_pixel_x: 2,
                depth_pixel_y: 3,
                distance_meters: 0.75,
            })],
            None,
        );

        sink.write(&frame).await.unwrap();

        let mut buf = vec![0u8; 65536];
        let n = rx.recv(&mut buf).await.unwrap();
        let summary: AnnotationSummary = serde_json::from_slice(&buf[..n]).unwrap();
        assert_eq!(summary, frame.summary());
    }

    #[tokio::test]
    async fn test_bincode_summary_received() {
        let (rx, addr) = receiver().await;
        let config = NetworkSinkConfig {
            addr,
            format: NetworkFormat::Bincode,
            max_packet_size: 65000,
        };
        let mut sink = NetworkSink::new("udp", config).await.unwrap();
        let frame = annotated_frame(8, vec![correlation(ProjectionResult::NoDepth)], None);

        sink.write(&frame).await.unwrap();

        let mut buf = vec![0u8; 65536];
        let n = rx.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], bincode::serialize(&frame.summary()).unwrap().as_slice());
    }

    #[tokio::test]
    async fn test_oversized_summary_rejected() {
        let (_rx, addr) = receiver().await;
        let config = NetworkSinkConfig {
            addr,
            format: NetworkFormat::Json,
            max_packet_size: 16,
        };
        let mut sink = NetworkSink::new("udp", config).await.unwrap();

        let err = sink.write(&annotated_frame(1, vec![], None)).await.unwrap_err();
        assert!(matches!(err, ContractError::SinkWrite { .. }));
    }

    #[tokio::test]
    async fn test_write_after_close_fails() {
        let (_rx, addr) = receiver().await;
        let config = NetworkSinkConfig {
            addr,
            format: NetworkFormat::Json,
            max_packet_size: 65000,
        };
        let mut sink = NetworkSink::new("udp", config).await.unwrap();
        assert!(sink.local_addr().is_some());
        sink.close().await.unwrap();

        assert!(sink.write(&annotated_frame(1, vec![], None)).await.is_err());
    }
}
