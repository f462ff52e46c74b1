use std::{
    any::Any,
    panic::AssertUnwindSafe,
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use futures::FutureExt;
use intake_common::{dtos::QueueStatsDto, models::FileKind};
use thiserror::Error;
use tokio::sync::{
    mpsc::{self, error::TrySendError},
    Mutex,
};
use tracing::{error, info};

mod process;
pub use process::*;

/// An accepted upload waiting for extraction and validation.
#[derive(Debug, Clone)]
pub struct ScheduledJob {
    pub job_id: String,
    pub kind: FileKind,
    pub source_path: PathBuf,
}

#[async_trait::async_trait]
pub trait IWorker: Send + Sync {
    /// Runs one job to a terminal state. Must not return early without recording an outcome.
    async fn process(&self, job: ScheduledJob);
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("processing queue is full")]
    QueueFull,

    #[error("processing queue is closed")]
    Closed,
}

/// Bounded queue in front of a fixed number of worker tasks.
pub struct Dispatcher {
    sender: mpsc::Sender<ScheduledJob>,
    depth: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    capacity: usize,
    workers: usize,
}

impl Dispatcher {
    pub fn start(worker: Arc<dyn IWorker>, workers: usize, capacity: usize) -> Self {
        let workers = workers.max(1);
        let capacity = capacity.max(1);
        let (sender, receiver) = mpsc::channel::<ScheduledJob>(capacity);
        let receiver = Arc::new(Mutex::new(receiver));
        let depth = Arc::new(AtomicUsize::new(0));
        let in_flight = Arc::new(AtomicUsize::new(0));

        for worker_id in 0..workers {
            let receiver = receiver.clone();
            let worker = worker.clone();
            let depth = depth.clone();
            let in_flight = in_flight.clone();
            tokio::spawn(async move {
                loop {
                    let job = receiver.lock().await.recv().await;
                    let Some(job) = job else {
                        break;
                    };
                    depth.fetch_sub(1, Ordering::SeqCst);
                    in_flight.fetch_add(1, Ordering::SeqCst);
                    let job_id = job.job_id.clone();
                    if let Err(panic) = AssertUnwindSafe(worker.process(job)).catch_unwind().await {
                        error!("Worker {} panicked on job {}: {}", worker_id, &job_id, panic_message(panic.as_ref()));
                    }
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                }
                info!("Worker {} stopped", worker_id);
            });
        }
        info!("Started {} workers with a queue of {}", workers, capacity);

        Dispatcher {
            sender,
            depth,
            in_flight,
            capacity,
            workers,
        }
    }

    /// Enqueues without waiting; a full queue is reported instead of blocking the caller.
    pub fn schedule(&self, job: ScheduledJob) -> Result<(), ScheduleError> {
        self.depth.fetch_add(1, Ordering::SeqCst);
        match self.sender.try_send(job) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.depth.fetch_sub(1, Ordering::SeqCst);
                match err {
                    TrySendError::Full(_) => Err(ScheduleError::QueueFull),
                    TrySendError::Closed(_) => Err(ScheduleError::Closed),
                }
            }
        }
    }

    pub fn stats(&self) -> QueueStatsDto {
        QueueStatsDto {
            depth: self.depth.load(Ordering::SeqCst),
            capacity: self.capacity,
            in_flight: self.in_flight.load(Ordering::SeqCst),
            workers: self.workers,
        }
    }
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::{mpsc::UnboundedSender, Notify};

    fn job(id: &str) -> ScheduledJob {
        ScheduledJob {
            job_id: id.to_string(),
            kind: FileKind::Csv,
            source_path: PathBuf::from(format!("{}.csv", id)),
        }
    }

    struct Recording(UnboundedSender<String>);

    #[async_trait::async_trait]
    impl IWorker for Recording {
        async fn process(&self, job: ScheduledJob) {
            if job.job_id == "boom" {
                panic!("worker exploded");
            }
            _ = self.0.send(job.job_id);
        }
    }

    struct Blocking {
        started: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait::async_trait]
    impl IWorker for Blocking {
        async fn process(&self, _job: ScheduledJob) {
            self.started.notify_one();
            self.release.notified().await;
        }
    }

    #[tokio::test]
    async fn every_scheduled_job_is_processed() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher::start(Arc::new(Recording(sender)), 3, 10);

        for id in ["a", "b", "c", "d"] {
            dispatcher.schedule(job(id)).unwrap();
        }

        let mut processed = Vec::new();
        for _ in 0..4 {
            processed.push(tokio::time::timeout(Duration::from_secs(5), receiver.recv()).await.unwrap().unwrap());
        }
        processed.sort();
        assert_eq!(processed, vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn a_panicking_job_does_not_stop_the_worker() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher::start(Arc::new(Recording(sender)), 1, 10);

        dispatcher.schedule(job("boom")).unwrap();
        dispatcher.schedule(job("after")).unwrap();

        let processed = tokio::time::timeout(Duration::from_secs(5), receiver.recv()).await.unwrap();
        assert_eq!(processed.as_deref(), Some("after"));
    }

    #[tokio::test]
    async fn full_queue_is_rejected_and_observable() {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let worker = Blocking {
            started: started.clone(),
            release: release.clone(),
        };
        let dispatcher = Dispatcher::start(Arc::new(worker), 1, 2);

        dispatcher.schedule(job("running")).unwrap();
        started.notified().await;
        dispatcher.schedule(job("queued-1")).unwrap();
        dispatcher.schedule(job("queued-2")).unwrap();

        assert_eq!(dispatcher.schedule(job("overflow")), Err(ScheduleError::QueueFull));
        assert_eq!(
            dispatcher.stats(),
            QueueStatsDto {
                depth: 2,
                capacity: 2,
                in_flight: 1,
                workers: 1
            }
        );
        release.notify_waiters();
    }

    #[test]
    fn panic_messages_are_readable() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&"owned".to_string()), "owned");
        assert_eq!(panic_message(&42), "unknown panic");
    }
}
