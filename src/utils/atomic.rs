//! Atomic file writes
//!
//! Saved memories are written to a sibling `.tmp` file, synced, then renamed
//! over the destination. A reader therefore sees either the previous file or
//! the complete new one, never a partial write.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Path of the temp file used while writing `path`
///
/// The suffix is appended to the full file name so that `memory.json.gz`
/// becomes `memory.json.gz.tmp` rather than `memory.json.tmp`.
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name: OsString = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("memory"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Atomically write a file using a writer function
///
/// The closure receives a buffered writer over the temp file. If it fails,
/// the temp file is removed and the destination is left untouched.
pub fn atomic_write_with<P, F>(path: P, write_fn: F) -> io::Result<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let path = path.as_ref();
    let temp_path = temp_path_for(path);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let result: io::Result<()> = (|| {
        let mut writer = BufWriter::new(File::create(&temp_path)?);
        write_fn(&mut writer)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    fs::rename(&temp_path, path)
}

/// Atomically write a byte buffer to a file
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> io::Result<()> {
    atomic_write_with(path, |writer| writer.write_all(content))
}
