use std::fs;
use std::io;
use std::path::Path;

/// What happens to the source file once classified.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransferMode {
    /// Déplacer (la source disparaît).
    #[default]
    Move,
    /// Copier (la source est conservée).
    Copy,
}

/// Move or copy `from` to `to`, overwriting an existing destination.
///
/// Moves try a rename first and fall back to copy + delete (e.g. across
/// filesystems).
///
/// # Errors
/// Returns the underlying I/O error.
pub fn transfer(from: &Path, to: &Path, mode: TransferMode) -> io::Result<()> {
    if to.exists() {
        log::warn!("{} existe déjà, écrasement", to.display());
    }
    match mode {
        TransferMode::Copy => fs::copy(from, to).map(|_| ()),
        TransferMode::Move => match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(e) => {
                log::debug!("rename {} failed ({e}), copying", from.display());
                fs::copy(from, to)?;
                fs::remove_file(from)
            }
        },
    }
}
