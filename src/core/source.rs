use crate::error::{Result, SubsampleError};
use memmap2::{Mmap, MmapOptions};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Read-only, memory-mapped view of the file being subsampled.
///
/// Cloning is cheap: every clone shares the same mapping, which is released
/// once the last clone is dropped.
#[derive(Clone)]
pub struct SourceFile {
    path: PathBuf,
    mmap: Arc<Mmap>,
}

impl SourceFile {
    // 内存映射文件
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SubsampleError::FileNotFound(path.to_path_buf()));
        }

        let file = File::open(path).map_err(SubsampleError::FileAccess)?;

        // The mapping is read-only; the caller owns the file and must not
        // modify it while a scan or stream is running.
        let mmap = unsafe {
            MmapOptions::new()
                .map(&file)
                .map_err(SubsampleError::FileAccess)?
        };

        Ok(Self {
            path: path.to_path_buf(),
            mmap: Arc::new(mmap),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> u64 {
        self.mmap.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.mmap
    }

    #[cfg(test)]
    pub(crate) fn handle_count(&self) -> usize {
        Arc::strong_count(&self.mmap)
    }
}

impl std::fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFile")
            .field("path", &self.path)
            .field("len", &self.mmap.len())
            .finish()
    }
}

/// Returns the end of the line starting at `pos`.
///
/// A line runs through the next `\n`, or to EOF when the last line is
/// unterminated. `None` means there is no line at `pos`.
pub(crate) fn line_end(bytes: &[u8], pos: usize) -> Option<usize> {
    if pos >= bytes.len() {
        return None;
    }
    match memchr::memchr(b'\n', &bytes[pos..]) {
        Some(i) => Some(pos + i + 1),
        None => Some(bytes.len()),
    }
}

/// Slices exactly `lines` lines out of `bytes`, starting at `offset`.
pub fn read_lines(bytes: &[u8], offset: u64, lines: usize) -> Result<&[u8]> {
    let start = usize::try_from(offset).map_err(|_| SubsampleError::TruncatedToken {
        offset,
        expected: lines,
        found: 0,
    })?;

    if lines == 0 {
        return Ok(&[]);
    }

    let mut pos = start;
    for found in 0..lines {
        pos = line_end(bytes, pos).ok_or(SubsampleError::TruncatedToken {
            offset,
            expected: lines,
            found,
        })?;
    }

    Ok(&bytes[start..pos])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CONTENT: &[u8] = b"1\n2\n3\n4\n5\n6\n7\n8\n9\n10\n11\n12\n";

    #[test]
    fn reads_whole_lines_from_offset() {
        assert_eq!(read_lines(CONTENT, 0, 2).unwrap(), b"1\n2\n");
        assert_eq!(read_lines(CONTENT, 16, 4).unwrap(), b"9\n10\n11\n12\n");
    }

    #[test]
    fn unterminated_last_line_counts() {
        let bytes = b"a\nb";
        assert_eq!(read_lines(bytes, 0, 2).unwrap(), b"a\nb");
    }

    #[test]
    fn short_read_reports_lines_found() {
        match read_lines(CONTENT, 21, 3) {
            Err(SubsampleError::TruncatedToken {
                offset,
                expected,
                found,
            }) => {
                assert_eq!(offset, 21);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected result: {:?}", other.map(|b| b.to_vec())),
        }
    }

    #[test]
    fn offset_past_eof_is_truncated() {
        let err = read_lines(CONTENT, 1_000, 1).unwrap_err();
        assert!(matches!(
            err,
            SubsampleError::TruncatedToken { found: 0, .. }
        ));
    }

    #[test]
    fn zero_lines_is_empty() {
        assert_eq!(read_lines(CONTENT, 4, 0).unwrap(), b"");
    }

    #[test]
    fn open_maps_file_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CONTENT).unwrap();

        let source = SourceFile::open(file.path()).unwrap();
        assert_eq!(source.len(), CONTENT.len() as u64);
        assert_eq!(source.bytes(), CONTENT);
    }

    #[test]
    fn open_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = SourceFile::open(dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, SubsampleError::FileNotFound(_)));
    }
}
