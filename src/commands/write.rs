//! Implementation of the `filegate write` command.

use crate::cli::WriteArgs;
use filegate::error::{LockError, Result};
use filegate::exit_codes;
use filegate::fs::AtomicWriter;
use std::io::{self, Read};
use std::path::Path;

/// Execute the `filegate write` command.
pub fn cmd_write(args: WriteArgs) -> Result<i32> {
    write_from(io::stdin().lock(), &args.path)?;
    Ok(exit_codes::SUCCESS)
}

/// Stream `reader` into a new file at `path`, publishing it only when complete.
pub fn write_from<R: Read>(mut reader: R, path: &Path) -> Result<u64> {
    let mut writer = AtomicWriter::create(path)?;
    let written = io::copy(&mut reader, &mut writer).map_err(|e| {
        LockError::resource(format!("failed to write '{}'", path.display()), e)
    })?;
    writer.commit()?;
    Ok(written)
}
