//! Container sniffing with lofty
//!
//! Only used to flag uploads whose content doesn't match their declared
//! extension. The reported format always comes from the extension.

use crate::model::AudioFormat;
use lofty::file::FileType;
use lofty::probe::Probe;
use std::io::Cursor;
use std::path::Path;

fn map_file_type(file_type: FileType) -> AudioFormat {
    match file_type {
        FileType::Mpeg => AudioFormat::Mp3,
        FileType::Wav => AudioFormat::Wav,
        FileType::Flac => AudioFormat::Flac,
        FileType::Mp4 => AudioFormat::M4a,
        _ => AudioFormat::Unknown,
    }
}

/// Guess the container from the leading bytes, `None` if lofty can't tell
pub fn sniff_bytes(bytes: &[u8]) -> Option<AudioFormat> {
    let probe = Probe::new(Cursor::new(bytes)).guess_file_type().ok()?;
    probe.file_type().map(map_file_type)
}

/// Guess the container of a file on disk
pub fn sniff_file(path: &Path) -> Option<AudioFormat> {
    let probe = Probe::open(path).ok()?.guess_file_type().ok()?;
    probe.file_type().map(map_file_type)
}

/// Log a warning when sniffed content disagrees with the declared extension
pub fn check_declared(sniffed: Option<AudioFormat>, extension: &str) {
    let declared = AudioFormat::from_extension(extension);
    if let Some(actual) = sniffed {
        if actual != declared {
            log::warn!(
                "Declared extension {:?} ({}) but content looks like {}",
                extension,
                declared,
                actual
            );
        }
    }
}
