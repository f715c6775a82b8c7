use std::io::{self, Cursor, Read, Seek, SeekFrom};

use zip::ZipArchive;

use crate::error::{Error, Result};

/// Local file header, the first record of any non-empty ZIP.
const ZIP_LOCAL_HEADER: [u8; 4] = *b"PK\x03\x04";
/// End of central directory, the first record of an empty ZIP.
const ZIP_EMPTY_ARCHIVE: [u8; 4] = *b"PK\x05\x06";
/// Upper bound on the buffer reserved up front; the declared entry size is
/// untrusted input.
const MAX_PREALLOC: u64 = 1 << 20;

// ---------------------------------------------------------------------------
// TabularSource – what the loader reads from
// ---------------------------------------------------------------------------

/// The tabular byte stream behind an input: either the input itself or the
/// extracted first entry of a ZIP archive.
#[derive(Debug)]
pub enum TabularSource<R> {
    /// Not an archive; the original source, untouched.
    Raw(R),
    /// Contents of the first archive entry.
    Archived {
        entry_name: String,
        data: Cursor<Vec<u8>>,
    },
}

impl<R> TabularSource<R> {
    /// Name of the extracted entry, if any.
    pub fn entry_name(&self) -> Option<&str> {
        match self {
            TabularSource::Raw(_) => None,
            TabularSource::Archived { entry_name, .. } => Some(entry_name),
        }
    }

    /// Give back the original source when it was passed through.
    pub fn into_raw(self) -> Option<R> {
        match self {
            TabularSource::Raw(source) => Some(source),
            TabularSource::Archived { .. } => None,
        }
    }
}

impl<R: Read> Read for TabularSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            TabularSource::Raw(source) => source.read(buf),
            TabularSource::Archived { data, .. } => data.read(buf),
        }
    }
}

// ---------------------------------------------------------------------------
// Detection and extraction
// ---------------------------------------------------------------------------

/// Open an input that may be a ZIP wrapping a single tabular file.
///
/// ZIP inputs yield the bytes of their first entry in listing order; any
/// other input is returned unchanged, positioned where it was.
///
/// Only the first entry is ever considered. Archives with several files are
/// accepted, but the rest of their entries are ignored.
pub fn open_tabular<R: Read + Seek>(mut source: R) -> Result<TabularSource<R>> {
    if !looks_like_zip(&mut source)? {
        return Ok(TabularSource::Raw(source));
    }

    // The archive (and the handle it owns) is dropped when this returns,
    // on success and failure alike.
    let mut archive =
        ZipArchive::new(source).map_err(|e| Error::Format(format!("reading archive: {e}")))?;

    let entries = archive.len();
    if entries == 0 {
        return Err(Error::Format("archive contains no files".into()));
    }

    let mut entry = archive
        .by_index(0)
        .map_err(|e| Error::Format(format!("opening first archive entry: {e}")))?;
    let entry_name = entry.name().to_string();

    let mut data = Vec::with_capacity(entry.size().min(MAX_PREALLOC) as usize);
    entry
        .read_to_end(&mut data)
        .map_err(|e| Error::Format(format!("extracting '{entry_name}': {e}")))?;

    log::debug!(
        "extracted '{entry_name}' ({} bytes) from a {entries}-entry archive",
        data.len()
    );

    Ok(TabularSource::Archived {
        entry_name,
        data: Cursor::new(data),
    })
}

/// Peek at the signature, restoring the stream position afterwards.
fn looks_like_zip<R: Read + Seek>(source: &mut R) -> Result<bool> {
    let start = source.stream_position()?;
    let mut magic = [0u8; 4];
    let mut filled = 0;
    while filled < magic.len() {
        let n = source.read(&mut magic[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    source.seek(SeekFrom::Start(start))?;
    Ok(filled == magic.len() && (magic == ZIP_LOCAL_HEADER || magic == ZIP_EMPTY_ARCHIVE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    fn zip_with(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn read_all<R: Read>(mut source: TabularSource<R>) -> String {
        let mut out = String::new();
        source.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn plain_text_passes_through_unchanged() {
        let input = b"a,b\n1,2\n".to_vec();
        let source = open_tabular(Cursor::new(input.clone())).unwrap();
        assert_eq!(source.entry_name(), None);
        let raw = source.into_raw().unwrap();
        assert_eq!(raw.position(), 0);
        assert_eq!(raw.into_inner(), input);
    }

    #[test]
    fn inputs_shorter_than_a_signature_pass_through() {
        let source = open_tabular(Cursor::new(b"PK".to_vec())).unwrap();
        assert_eq!(read_all(source), "PK");
    }

    #[test]
    fn passthrough_keeps_the_current_position() {
        let mut cursor = Cursor::new(b"skip|a,b\n1,2\n".to_vec());
        cursor.set_position(5);
        let source = open_tabular(cursor).unwrap();
        assert_eq!(read_all(source), "a,b\n1,2\n");
    }

    #[test]
    fn single_entry_archive_yields_entry_contents() {
        let bytes = zip_with(&[("data.csv", "x,y\n1,2\n")]);
        let source = open_tabular(Cursor::new(bytes)).unwrap();
        assert_eq!(source.entry_name(), Some("data.csv"));
        assert_eq!(read_all(source), "x,y\n1,2\n");
    }

    #[test]
    fn first_entry_wins_in_multi_entry_archives() {
        let bytes = zip_with(&[("first.csv", "a\n1\n"), ("second.csv", "b\n2\n")]);
        let source = open_tabular(Cursor::new(bytes)).unwrap();
        assert_eq!(source.entry_name(), Some("first.csv"));
        assert_eq!(read_all(source), "a\n1\n");
    }

    #[test]
    fn empty_archive_is_a_format_error() {
        let bytes = zip_with(&[]);
        let err = open_tabular(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, Error::Format(_)), "got {err:?}");
    }

    #[test]
    fn truncated_archive_is_a_format_error() {
        let mut bytes = zip_with(&[("data.csv", "x,y\n1,2\n")]);
        bytes.truncate(bytes.len() / 2);
        let err = open_tabular(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, Error::Format(_)), "got {err:?}");
    }

    fn stored(name: &str, body: &str, large_file: bool) -> Vec<u8> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .large_file(large_file);
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file(name, options).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    fn u16_at(bytes: &[u8], at: usize) -> usize {
        u16::from_le_bytes([bytes[at], bytes[at + 1]]) as usize
    }

    fn find(bytes: &[u8], signature: &[u8; 4]) -> usize {
        bytes
            .windows(4)
            .position(|w| w == signature)
            .unwrap()
    }

    #[test]
    fn corrupt_entry_data_is_a_format_error() {
        let mut bytes = stored("d.csv", "x,y\n1,2\n", false);
        // Local header is 30 bytes, then the name and the extra field.
        let data_start = 30 + u16_at(&bytes, 26) + u16_at(&bytes, 28);
        bytes[data_start] ^= 0xff;

        let err = open_tabular(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, Error::Format(_)), "got {err:?}");
    }

    #[test]
    fn huge_declared_entry_size_does_not_panic() {
        let mut bytes = stored("d.csv", "x,y\n1,2\n", true);
        let central = find(&bytes, b"PK\x01\x02");
        // 0xFFFFFFFF defers the uncompressed size to the ZIP64 record.
        bytes[central + 24..central + 28].copy_from_slice(&[0xff; 4]);

        // Walk the central header's extra fields to the ZIP64 record, whose
        // first value is the uncompressed size.
        let name_len = u16_at(&bytes, central + 28);
        let extra_len = u16_at(&bytes, central + 30);
        let mut at = central + 46 + name_len;
        let end = at + extra_len;
        while at + 4 <= end && u16_at(&bytes, at) != 0x0001 {
            at += 4 + u16_at(&bytes, at + 2);
        }
        assert!(at + 12 <= end, "no ZIP64 extra field written");
        bytes[at + 4..at + 12].copy_from_slice(&u64::MAX.to_le_bytes());

        match open_tabular(Cursor::new(bytes)) {
            Ok(source) => assert_eq!(read_all(source), "x,y\n1,2\n"),
            Err(err) => assert!(matches!(err, Error::Format(_)), "got {err:?}"),
        }
    }
}
