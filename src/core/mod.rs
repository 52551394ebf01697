// src/core/mod.rs

/// Data structures shared by every probe and the final `ScanReport`.
pub mod models;

/// Probe collaborators, the concurrent port scan engine and the orchestrating `Assessor`.
pub mod scanner;

/// Weighted scoring of probe results into a risk tier with recommendations.
pub mod risk;

/// Static catalogue of findings and their recommendation text.
pub mod knowledge_base;
