//! One-shot rotation.

use rotalog_core::{RotatingFileSink, SinkResult};
use std::path::{Path, PathBuf};
use tracing::info;

/// Opens the sink, rotates it once and closes it again.
///
/// Returns the path the previous file was archived to, if any.
pub fn run(sink: &RotatingFileSink) -> SinkResult<Option<PathBuf>> {
    info!("Rotating {:?}", sink.path());

    sink.open()?;
    let mut archived = None;
    sink.rotate_with(|path| archived = path.map(Path::to_path_buf))?;
    sink.close()?;

    Ok(archived)
}
