use std::sync::Arc;

use junction_watch::core_modules::camera_feed::FeedMeta;
use junction_watch::{EncodedFrame, FrameSink};
use tokio::sync::broadcast;

#[cfg(feature = "web")]
mod error;
#[cfg(feature = "web")]
mod server;
#[cfg(feature = "web")]
mod view;

#[cfg(feature = "web")]
pub use error::HttpApiError;
#[cfg(feature = "web")]
pub use server::{AppState, SystemInfo, router, start_server};

pub const DEFAULT_BIND: &str = "127.0.0.1:3001";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    Jpeg,
}

impl FrameFormat {
    pub fn mime(self) -> &'static str {
        match self {
            FrameFormat::Jpeg => "image/jpeg",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FramePacket {
    pub ts_millis: u64,
    pub width: u32,
    pub height: u32,
    pub format: FrameFormat,
    pub data: Arc<[u8]>,
}

impl From<EncodedFrame> for FramePacket {
    fn from(frame: EncodedFrame) -> Self {
        Self {
            ts_millis: frame.ts_millis,
            width: frame.width,
            height: frame.height,
            format: FrameFormat::Jpeg,
            data: frame.jpeg,
        }
    }
}

/// Fan-out for camera frames and their metadata. Slow subscribers lag and skip.
#[derive(Clone)]
pub struct FrameBus {
    pub frames_tx: broadcast::Sender<FramePacket>,
    pub meta_tx: broadcast::Sender<FeedMeta>,
}

impl FrameBus {
    pub fn new(capacity: usize) -> Self {
        let (frames_tx, _) = broadcast::channel::<FramePacket>(capacity.max(1));
        let (meta_tx, _) = broadcast::channel::<FeedMeta>(capacity.max(1));
        Self { frames_tx, meta_tx }
    }
}

impl FrameSink for FrameBus {
    fn publish_frame(&self, frame: EncodedFrame) {
        // Nobody watching is not an error.
        let _ = self.frames_tx.send(frame.into());
    }

    fn publish_meta(&self, meta: FeedMeta) {
        let _ = self.meta_tx.send(meta);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Capacity of the frame and metadata broadcast channels.
    pub frame_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_addr: DEFAULT_BIND.to_string(), frame_capacity: 2 }
    }
}

impl ServerConfig {
    /// Defaults merged with `JW_BIND`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(bind) = lookup("JW_BIND").map(|b| b.trim().to_string()).filter(|b| !b.is_empty()) {
            cfg.bind_addr = bind;
        }
        cfg
    }
}

/// Play/pause switch for the camera feed loop.
#[derive(Clone)]
pub struct ControlHandle {
    pub play_tx: tokio::sync::watch::Sender<bool>,
}

impl ControlHandle {
    /// A handle plus the receiver the feed loop listens on.
    pub fn new(playing: bool) -> (Self, tokio::sync::watch::Receiver<bool>) {
        let (play_tx, play_rx) = tokio::sync::watch::channel(playing);
        (Self { play_tx }, play_rx)
    }

    pub fn set_playing(&self, playing: bool) {
        self.play_tx.send_replace(playing);
    }

    pub fn is_playing(&self) -> bool {
        *self.play_tx.borrow()
    }
}

#[cfg(not(feature = "web"))]
pub async fn start_server(
    _monitor: junction_watch::Monitor,
    _bus: FrameBus,
    _cfg: ServerConfig,
    _control: ControlHandle,
) -> anyhow::Result<tokio::task::JoinHandle<()>> {
    Err(anyhow::anyhow!("web feature not enabled for junction_watch_visualizer"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_defaults_and_override() {
        assert_eq!(ServerConfig::from_lookup(|_| None).bind_addr, DEFAULT_BIND);
        assert_eq!(ServerConfig::from_lookup(|_| Some("  ".into())).bind_addr, DEFAULT_BIND);
        let cfg = ServerConfig::from_lookup(|k| (k == "JW_BIND").then(|| "0.0.0.0:8080".to_string()));
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn bus_forwards_frames_to_subscribers() {
        let bus = FrameBus::new(4);
        let mut rx = bus.frames_tx.subscribe();
        bus.publish_frame(EncodedFrame { ts_millis: 7, width: 2, height: 1, jpeg: Arc::from(vec![0xFF, 0xD8]) });
        let packet = rx.try_recv().expect("packet");
        assert_eq!(packet.ts_millis, 7);
        assert_eq!(packet.format.mime(), "image/jpeg");
        assert_eq!(&packet.data[..], &[0xFF, 0xD8]);

        // Publishing with no subscribers must not panic.
        drop(rx);
        bus.publish_meta(FeedMeta { frame_index: 0, playing: true, detected_count: 0, boxes: Vec::new() });
    }

    #[test]
    fn control_handle_toggles() {
        let (control, rx) = ControlHandle::new(true);
        control.set_playing(false);
        assert!(!*rx.borrow());
        assert!(!control.is_playing());
    }
}
