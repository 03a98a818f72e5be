//! Request, response, and frame types shared by the server and its clients.

pub mod admin;
pub mod payment;
pub mod submit;
pub mod ws;

pub use crate::signature::Signature;
pub use payment::{PaymentResponse, PaymentStatus};
pub use submit::{NotificationAck, SubmitNotification};
