//! Background contact email queue
//!
//! Jobs are pushed onto a bounded channel and drained by a fixed pool of
//! worker tasks. Each delivery attempt runs under a timeout and failed
//! attempts are retried with exponential backoff.

use crate::contact::ContactEmailJob;
use crate::error::{MailError, MailResult};
use crate::mailer::{Mailer, OutgoingEmail};
use scholarly_core::{retry_async, with_timeout, EmailSettings, RetryConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Accepts contact jobs for asynchronous delivery
pub trait ContactQueue: Send + Sync {
    /// Enqueue a job without waiting for delivery
    fn submit(&self, job: ContactEmailJob) -> MailResult<()>;
}

/// Worker pool settings
#[derive(Debug, Clone)]
pub struct QueueSettings {
    pub workers: usize,
    pub capacity: usize,
    pub max_attempts: usize,
    pub job_timeout: Duration,
    pub retry_delay: Duration,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            workers: 2,
            capacity: 50,
            max_attempts: 3,
            job_timeout: Duration::from_secs(60),
            retry_delay: Duration::from_secs(2),
        }
    }
}

impl From<&EmailSettings> for QueueSettings {
    fn from(settings: &EmailSettings) -> Self {
        Self {
            workers: settings.workers,
            capacity: settings.queue_limit,
            max_attempts: settings.max_attempts,
            job_timeout: settings.job_timeout,
            retry_delay: settings.retry_delay,
        }
    }
}

impl QueueSettings {
    fn retry_config(&self) -> RetryConfig {
        let initial = self.retry_delay.as_millis() as u64;
        RetryConfig {
            max_attempts: self.max_attempts,
            initial_delay_ms: initial,
            max_delay_ms: initial.saturating_mul(8).max(1),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

/// Delivery counters
#[derive(Debug, Default)]
pub struct QueueStats {
    enqueued: AtomicUsize,
    delivered: AtomicUsize,
    failed: AtomicUsize,
}

/// Point-in-time copy of [`QueueStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub enqueued: usize,
    pub delivered: usize,
    pub failed: usize,
}

impl QueueStats {
    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// In-process email queue backed by a bounded channel
pub struct EmailQueue {
    sender: Mutex<Option<mpsc::Sender<ContactEmailJob>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    stats: Arc<QueueStats>,
}

impl EmailQueue {
    /// Create the queue and spawn its workers on the current runtime
    pub fn start(mailer: Arc<dyn Mailer>, settings: QueueSettings) -> Self {
        let (sender, receiver) = mpsc::channel(settings.capacity.max(1));
        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));
        let stats = Arc::new(QueueStats::default());

        let handles = (0..settings.workers.max(1))
            .map(|worker_id| {
                let worker = Worker {
                    id: worker_id,
                    receiver: Arc::clone(&receiver),
                    mailer: Arc::clone(&mailer),
                    settings: settings.clone(),
                    stats: Arc::clone(&stats),
                };
                tokio::spawn(worker.run())
            })
            .collect();

        info!(
            workers = settings.workers,
            capacity = settings.capacity,
            max_attempts = settings.max_attempts,
            "Contact email queue started"
        );

        Self {
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(handles),
            stats,
        }
    }

    pub fn stats(&self) -> QueueSnapshot {
        self.stats.snapshot()
    }

    /// Stop accepting jobs and wait for the workers to drain the queue
    pub async fn shutdown(&self) {
        let sender = self.sender.lock().ok().and_then(|mut guard| guard.take());
        if sender.is_none() {
            return;
        }
        drop(sender);

        let handles = self
            .workers
            .lock()
            .map(|mut guard| std::mem::take(&mut *guard))
            .unwrap_or_default();

        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Email worker ended abnormally");
            }
        }

        let stats = self.stats();
        info!(
            delivered = stats.delivered,
            failed = stats.failed,
            "Contact email queue stopped"
        );
    }
}

impl ContactQueue for EmailQueue {
    fn submit(&self, job: ContactEmailJob) -> MailResult<()> {
        let guard = self.sender.lock().map_err(|_| MailError::QueueClosed)?;
        let sender = guard.as_ref().ok_or(MailError::QueueClosed)?;

        let job_id = job.id;
        sender.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => MailError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => MailError::QueueClosed,
        })?;

        self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
        debug!(job_id = %job_id, "Contact email queued");
        Ok(())
    }
}

struct Worker {
    id: usize,
    receiver: Arc<tokio::sync::Mutex<mpsc::Receiver<ContactEmailJob>>>,
    mailer: Arc<dyn Mailer>,
    settings: QueueSettings,
    stats: Arc<QueueStats>,
}

impl Worker {
    async fn run(self) {
        debug!(worker = self.id, "Email worker started");

        loop {
            let job = {
                let mut receiver = self.receiver.lock().await;
                receiver.recv().await
            };

            match job {
                Some(job) => self.process(job).await,
                None => break,
            }
        }

        debug!(worker = self.id, "Email worker stopped");
    }

    async fn process(&self, job: ContactEmailJob) {
        let email = match OutgoingEmail::for_contact(&job) {
            Ok(email) => email,
            Err(e) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                error!(job_id = %job.id, error = %e, "Failed to render contact email");
                return;
            }
        };

        let mailer = &self.mailer;
        let email = &email;
        let timeout = self.settings.job_timeout;
        let result = retry_async(
            move || async move {
                match with_timeout(mailer.send(email), timeout, "send_contact_email").await {
                    Ok(sent) => sent,
                    Err(e) => {
                        e.log();
                        Err(MailError::from(e))
                    }
                }
            },
            &self.settings.retry_config(),
            "contact_email",
        )
        .await;

        match result {
            Ok(()) => {
                self.stats.delivered.fetch_add(1, Ordering::Relaxed);
                info!(
                    worker = self.id,
                    job_id = %job.id,
                    to = %job.to_email,
                    "Contact email sent"
                );
            }
            Err(e) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                error!(
                    worker = self.id,
                    job_id = %job.id,
                    to = %job.to_email,
                    attempts = self.settings.max_attempts,
                    error = %e,
                    "Contact email delivery failed"
                );
            }
        }
    }
}
