//! Channel infrastructure for push delivery.
//!
//! Each open seller WebSocket owns the receiving end of one push-frame
//! channel; the registry holds the sending end and everything that wants
//! to reach the seller goes through it.  The frame types themselves live
//! in `paydesk_sdk::objects::ws` because the SDK client decodes them too.

pub mod channels;

pub use channels::{DEFAULT_CHANNEL_BUFFER, PushFrameReceiver, PushFrameSender, push_frame_channel};
