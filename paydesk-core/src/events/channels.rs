//! Push-frame channel factory.

use paydesk_sdk::objects::ws::WsServerMessage;
use tokio::sync::mpsc;

/// Default buffer size for push-frame channels.
///
/// This provides enough buffer to handle notification bursts while keeping
/// memory per connection bounded.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for outbound push frames.
pub type PushFrameSender = mpsc::Sender<WsServerMessage>;
/// Receiver handle for outbound push frames.
pub type PushFrameReceiver = mpsc::Receiver<WsServerMessage>;

/// Create a new push-frame channel.
///
/// Returns a (sender, receiver) pair for one seller connection.  The
/// sender goes into the registry; the receiver stays with the socket task.
pub fn push_frame_channel() -> (PushFrameSender, PushFrameReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
