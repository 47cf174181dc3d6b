//! Download task execution -- the per-document page download procedure.
//!
//! Split into focused submodules:
//! - [`context`] - Claimed document, its cancellation token and the manager
//! - [`orchestration`] - Top-level lifecycle of one document
//! - [`pages`] - Sequential page fetching with cancellation
//! - [`finalization`] - Resolving the document as completed or failed

mod context;
mod finalization;
mod orchestration;
mod pages;


pub(crate) use context::DownloadTaskContext;
pub(crate) use finalization::finalize_failure;
pub(crate) use orchestration::run_download_task;
