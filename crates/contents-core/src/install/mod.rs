//! Package installation: extraction, validation, finalize and apply.

mod error;
mod extract;
mod pipeline;

pub use error::{ApplyError, InstallFailedReason, InstallFailure};
pub use extract::{ArchiveExtractor, ExtractError, TarCodec, default_extractors};
pub use pipeline::{ContentInstaller, FinalizeError, ValidatedContent};
