//! Email delivery for reservation notifications

use async_trait::async_trait;
use chrono::{DateTime, Duration};
use lettre::{
    message::{header::ContentType, Mailbox, Message, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};
use std::str::FromStr;

use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
    models::reservation::{ReservationDetails, ReservationStatus},
    services::notifications::ReservationNotifier,
    services::timeslots::SLOT_MINUTES,
};

#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Confirmation sent when a checkout commits.
    pub async fn send_reservation_received(&self, details: &ReservationDetails) -> AppResult<()> {
        let subject = "Book Reservation Request Received";
        let body = format!(
            r#"
Dear {name},

Thank you for your reservation request. We have received it and will
process it shortly.

{summary}

We will confirm a pickup time once your reservation is approved.
"#,
            name = details.user.name,
            summary = reservation_summary(details),
        );

        self.send_email(&details.user.email, subject, &body).await
    }

    /// Update sent when an admin approves, rejects, or closes out a
    /// reservation.
    pub async fn send_reservation_status_update(
        &self,
        details: &ReservationDetails,
    ) -> AppResult<()> {
        let (subject, lead) = match details.status {
            ReservationStatus::Approved => (
                "Your Book Reservation Has Been Approved",
                "Good news - your reservation has been approved.",
            ),
            ReservationStatus::Rejected => (
                "Your Book Reservation Has Been Rejected",
                "Unfortunately we could not fulfil your reservation.",
            ),
            ReservationStatus::Returned => (
                "Your Books Have Been Returned",
                "Your borrowed copies have been checked back in. Thank you!",
            ),
            ReservationStatus::Pending => return Ok(()),
        };

        let confirmed = match (details.pickup_time, details.return_time) {
            (Some(pickup), Some(ret)) => format!(
                "\nConfirmed pickup: {}\nConfirmed return: {}\n",
                pickup.format("%Y-%m-%d %I:%M %p UTC"),
                ret.format("%Y-%m-%d %I:%M %p UTC"),
            ),
            _ => String::new(),
        };

        let body = format!(
            r#"
Dear {name},

{lead}

{summary}{confirmed}
"#,
            name = details.user.name,
            lead = lead,
            summary = reservation_summary(details),
            confirmed = confirmed,
        );

        self.send_email(&details.user.email, subject, &body).await
    }

    /// Generic email sending function
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        let from_name = self.config.smtp_from_name.as_deref().unwrap_or("Lectern");
        let from_mailbox = Mailbox::from_str(&format!("{} <{}>", from_name, self.config.smtp_from))
            .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;

        let to_mailbox = Mailbox::from_str(to)
            .map_err(|e| AppError::Internal(format!("Invalid to address: {}", e)))?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(format!(
                                r#"<html><body><pre>{}</pre></body></html>"#,
                                body.replace('\n', "<br>")
                            )),
                    ),
            )
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        let mailer_builder = if self.config.smtp_use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::Internal(format!("Failed to create SMTP transport: {}", e)))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port);

        let mailer_builder = if let (Some(username), Some(password)) =
            (&self.config.smtp_username, &self.config.smtp_password)
        {
            mailer_builder.credentials(Credentials::new(username.clone(), password.clone()))
        } else {
            mailer_builder
        };

        let mailer = mailer_builder.build();

        mailer
            .send(&email)
            .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl ReservationNotifier for EmailService {
    async fn reservation_received(&self, details: &ReservationDetails) -> AppResult<()> {
        self.send_reservation_received(details).await
    }

    async fn reservation_status_changed(&self, details: &ReservationDetails) -> AppResult<()> {
        self.send_reservation_status_update(details).await
    }
}

fn reservation_summary(details: &ReservationDetails) -> String {
    let mut lines = vec!["Reservation details:".to_string()];
    for copy in &details.copies {
        let authors = if copy.book.authors.is_empty() {
            String::new()
        } else {
            format!(" by {}", copy.book.authors.join(", "))
        };
        lines.push(format!("  - {}{}", copy.book.title, authors));
    }
    lines.push(format!(
        "Borrow period: {} to {}",
        details.start_date.format("%Y-%m-%d"),
        details.end_date.format("%Y-%m-%d"),
    ));

    if !details.suggested_pickup_timeslots.is_empty() {
        lines.push("Suggested pickup times:".to_string());
        for slot in &details.suggested_pickup_timeslots {
            lines.push(format!("  {}", format_slot(slot)));
        }
    }
    if !details.suggested_return_timeslots.is_empty() {
        lines.push("Suggested return times:".to_string());
        for slot in &details.suggested_return_timeslots {
            lines.push(format!("  {}", format_slot(slot)));
        }
    }

    lines.join("\n")
}

/// Render one suggested timeslot as the half-hour window it occupies.
fn format_slot(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(start) => {
            let end = start + Duration::minutes(SLOT_MINUTES);
            format!(
                "{} - {} ({})",
                start.format("%Y-%m-%d %I:%M %p"),
                end.format("%I:%M %p"),
                start.format("%:z"),
            )
        }
        // Slots are validated before persisting, but render gracefully.
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_rendered_as_half_hour_window() {
        let rendered = format_slot("2024-01-01T09:00:00+07:00");
        assert!(rendered.contains("09:00 AM"));
        assert!(rendered.contains("09:30 AM"));
        assert!(rendered.contains("+07:00"));
    }

    #[test]
    fn unparseable_slot_falls_back_to_raw_text() {
        assert_eq!(format_slot("not a time"), "not a time");
    }
}
