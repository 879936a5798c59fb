use std::path::{Component, Path};

use crate::TransferError;

/// Validates the file name announced to the server.
///
/// The server stores chunks under this name, so it must be a single plain
/// path component.
///
/// Rejects:
/// - Empty names
/// - Names containing `/` or `\`
/// - `.` and `..`
/// - NUL bytes
pub fn validate_file_name(name: &str) -> Result<(), TransferError> {
    if name.is_empty() {
        return Err(TransferError::InvalidFileName("empty name".into()));
    }

    if name.contains('\0') {
        return Err(TransferError::InvalidFileName(format!(
            "NUL byte not allowed: {name:?}"
        )));
    }

    if name.contains('/') || name.contains('\\') {
        return Err(TransferError::InvalidFileName(format!(
            "path separators not allowed: {name}"
        )));
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(TransferError::InvalidFileName(format!(
            "not a plain file name: {name}"
        ))),
    }
}
