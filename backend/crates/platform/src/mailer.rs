//! Outbound Mail Queue
//!
//! Bounded work queue with a single consumer task sending over SMTP.
//! Enqueue is fire-and-forget: it never blocks the caller and a full
//! queue drops the job with a warning. Shutdown drains enqueued jobs
//! under a deadline; past the deadline the worker is aborted so the
//! process never hangs on exit.
//!
//! When no SMTP host is configured the worker runs in no-op mode and
//! only logs, which keeps development and tests free of mail
//! infrastructure.

use std::time::Duration;

use lettre::message::{Mailbox, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Default queue capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// A single outbound email
#[derive(Debug, Clone)]
pub struct EmailJob {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Mailer construction errors
#[derive(Debug, Error)]
pub enum MailerError {
    #[error("Invalid from address: {0}")]
    InvalidFromAddress(String),

    #[error("Failed to configure SMTP transport: {0}")]
    Transport(String),
}

/// SMTP configuration
///
/// An empty `host` selects no-op mode.
#[derive(Debug, Clone, Default)]
pub struct MailerConfig {
    pub host: String,
    pub port: u16,
    pub from: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Accepts outbound mail without reporting delivery back to the caller
pub trait Notifier: Send + Sync {
    /// Enqueue a job; non-blocking, best-effort
    fn enqueue(&self, job: EmailJob);
}

/// Producer half of the mail queue
#[derive(Clone)]
pub struct MailQueue {
    tx: mpsc::Sender<EmailJob>,
}

impl Notifier for MailQueue {
    fn enqueue(&self, job: EmailJob) {
        if let Err(err) = self.tx.try_send(job) {
            match err {
                mpsc::error::TrySendError::Full(job) => {
                    tracing::warn!(to = %job.to, "Mail queue full, dropping job");
                }
                mpsc::error::TrySendError::Closed(job) => {
                    tracing::warn!(to = %job.to, "Mail queue closed, dropping job");
                }
            }
        }
    }
}

/// Consumer half: a single task draining the queue
pub struct MailWorker {
    handle: JoinHandle<()>,
}

impl MailWorker {
    /// Wait for the queue to drain, up to `deadline`
    ///
    /// All `MailQueue` clones must be dropped before calling this, or
    /// the channel never closes. Past the deadline, remaining jobs are
    /// dropped and the worker is aborted.
    pub async fn shutdown(mut self, deadline: Duration) {
        if tokio::time::timeout(deadline, &mut self.handle).await.is_err() {
            tracing::warn!("Mail worker did not drain before deadline, aborting");
            self.handle.abort();
        }
    }
}

/// Spawn the mail worker and return the queue producer
pub fn spawn_mailer(
    config: MailerConfig,
    capacity: usize,
) -> Result<(MailQueue, MailWorker), MailerError> {
    let from: Mailbox = config
        .from
        .parse()
        .map_err(|_| MailerError::InvalidFromAddress(config.from.clone()))?;

    let transport = if config.host.trim().is_empty() {
        tracing::warn!("SMTP host not configured; mail worker running in no-op mode");
        None
    } else {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| MailerError::Transport(e.to_string()))?
            .port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Some(builder.build())
    };

    let (tx, rx) = mpsc::channel(capacity);
    let handle = tokio::spawn(run_worker(rx, transport, from));

    Ok((MailQueue { tx }, MailWorker { handle }))
}

async fn run_worker(
    mut rx: mpsc::Receiver<EmailJob>,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
) {
    while let Some(job) = rx.recv().await {
        match send_job(&transport, &from, &job).await {
            Ok(()) => tracing::info!(to = %job.to, "Sent email"),
            Err(e) => tracing::warn!(to = %job.to, error = %e, "Failed to send email"),
        }
    }
    tracing::debug!("Mail queue closed, worker exiting");
}

async fn send_job(
    transport: &Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: &Mailbox,
    job: &EmailJob,
) -> Result<(), String> {
    let Some(transport) = transport else {
        tracing::info!(to = %job.to, subject = %job.subject, "No-op mail mode, not sending");
        return Ok(());
    };

    let to: Mailbox = job
        .to
        .parse()
        .map_err(|_| format!("invalid recipient address: {}", job.to))?;

    let message = Message::builder()
        .from(from.clone())
        .to(to)
        .subject(job.subject.clone())
        .header(header::ContentType::TEXT_HTML)
        .body(job.html_body.clone())
        .map_err(|e| e.to_string())?;

    transport.send(message).await.map_err(|e| e.to_string())?;
    Ok(())
}
