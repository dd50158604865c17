use std::{
    sync::{mpsc, Arc},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use log::{debug, error, warn};
use tokio::sync::oneshot;

use super::{
    controller::{CheckpointOutcome, LabelingController, PageView, Update},
    state::Event,
};

type Job = Box<dyn FnOnce(&mut LabelingController) + Send + 'static>;

enum Request {
    Run(Job),
    /// Save one last time, report how it went and stop the worker.
    Close(oneshot::Sender<CheckpointOutcome>),
}

struct Worker {
    requests: Option<mpsc::Sender<Request>>,
    thread: Option<JoinHandle<()>>,
}

impl Drop for Worker {
    fn drop(&mut self) {
        // Hanging up the channel ends the worker loop if close() never ran.
        drop(self.requests.take());
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Labeling session worker panicked");
            }
        }
    }
}

fn serve(mut controller: LabelingController, requests: mpsc::Receiver<Request>) {
    for request in requests {
        match request {
            Request::Run(job) => job(&mut controller),
            Request::Close(reply) => {
                let outcome = controller.finish();
                if reply.send(outcome).is_err() {
                    warn!("Session closed without anyone waiting for the final save");
                }
                break;
            }
        }
    }
    debug!("Labeling session worker stopped");
}

/// Cloneable, async front for a [`LabelingController`].
///
/// The controller lives on its own thread and handles one request at a
/// time, so cursor and labels are never mutated concurrently. Once any
/// clone calls [`SessionHandle::close`], every later request fails.
#[derive(Clone)]
pub struct SessionHandle {
    worker: Arc<Worker>,
}

impl SessionHandle {
    pub fn spawn(controller: LabelingController) -> Result<Self> {
        let (requests, inbox) = mpsc::channel();
        let thread = thread::Builder::new()
            .name("lc-labeler-session".into())
            .spawn(move || serve(controller, inbox))
            .context("failed to start labeling session thread")?;

        Ok(Self {
            worker: Arc::new(Worker {
                requests: Some(requests),
                thread: Some(thread),
            }),
        })
    }

    fn send(&self, request: Request) -> Result<()> {
        self.worker
            .requests
            .as_ref()
            .and_then(|requests| requests.send(request).ok())
            .ok_or_else(|| anyhow!("labeling session is closed"))
    }

    /// Run `job` against the controller and wait for its result.
    pub async fn execute<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut LabelingController) -> T + Send + 'static,
        T: Send + 'static,
    {
        let (reply, result) = oneshot::channel();
        self.send(Request::Run(Box::new(move |controller| {
            // The caller may have given up waiting; the job still ran.
            let _ = reply.send(job(controller));
        })))?;

        result
            .await
            .map_err(|_| anyhow!("labeling session stopped while handling a request"))
    }

    pub async fn dispatch(&self, event: Event) -> Result<Update> {
        self.execute(move |controller| controller.handle(event)).await
    }

    pub async fn view(&self) -> Result<PageView> {
        self.execute(|controller| controller.view()).await
    }

    /// Write a final checkpoint and stop the session, returning the outcome
    /// of that save once it is on disk (or has failed).
    pub async fn close(&self) -> Result<CheckpointOutcome> {
        let (reply, outcome) = oneshot::channel();
        self.send(Request::Close(reply))?;
        outcome
            .await
            .map_err(|_| anyhow!("labeling session stopped before the final save"))
    }
}
