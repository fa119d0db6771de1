//! Email adapter: the notifier port over the Resend API.

mod resend;

pub use resend::ResendClient;
