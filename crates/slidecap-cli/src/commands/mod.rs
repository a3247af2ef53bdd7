//! CLI subcommand implementations (§10.5).

pub mod batch;
pub mod extract;
pub mod info;
