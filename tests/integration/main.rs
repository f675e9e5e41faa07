//! Integration tests for the job system
//!
//! The browser is replaced by scripted renderers; everything else (store on
//! disk, worker pool, extraction, export, image proxy) runs for real.

mod support;

mod export_tests;
mod image_tests;
mod job_tests;
