//! Cross-crate test harness for the Ferrit core. All behavior lives in the
//! `tests/` targets; this library exists only so the package builds.
