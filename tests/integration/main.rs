#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;
mod dataset_jobs;
mod duplicates;
