//! Background derivative generation for image uploads.

mod queue;
mod worker;

pub use queue::{DerivativeJob, JobId, JobQueue, JobStatus};
pub use worker::DerivativeWorker;
