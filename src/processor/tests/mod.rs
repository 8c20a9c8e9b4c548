//! End-to-end tests for the processor module
//!
//! Drives whole granules through the pipeline using in-memory sources.
