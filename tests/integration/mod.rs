//! Integration Tests Module
//!
//! End-to-end tests for Interview Assist against a scripted completion client.
//! Tests cover the session workflow, solution orchestration and fallback,
//! response parsing and validation, and the behavioral assistant.

// Scripted completion client and fixtures
mod common;

// Session workflow: extraction, confirmation, follow-ups, debug, cancellation
mod workflow_test;

// Orchestrator fallback and cancellation
mod orchestrator_test;

// Text parser and JSON validator properties
mod parsing_test;

// Behavioral assistant over an on-disk story library
mod behavioral_test;
