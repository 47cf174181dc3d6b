//! DownloadManager tests, grouped by concern.

use super::*;
use crate::downloader::test_helpers::{
    PageScript, TestHarness, create_test_manager, create_test_manager_with, document, test_config,
    wait_for, wait_until_idle,
};
use crate::listeners::Interaction;
use crate::types::{CancelOutcome, Document, DocumentId, Event, Status};
use std::sync::atomic::Ordering;
use std::time::Duration;
