pub mod config;
pub mod ingest;
pub mod process;
pub mod rank;
pub mod related;
pub mod status;

pub use ingest::run_ingest;
pub use process::run_process;
pub use rank::run_rank;
pub use related::show_related;
pub use status::show_status;
