pub mod mailer;
pub mod render;

pub use mailer::{build_message, DeliveryError, Envelope, Mailer, SmtpConfig, SmtpMailer};
pub use render::{digest_subject, html_to_plain_text, render_email_html};

pub use lettre::Message;
