//! File handles returned by the facade.
//!
//! A handle is either a write stream (bytes buffered until [`File::close`]
//! uploads them in one request), a read stream (lazy ranged reads with a
//! read-ahead buffer) or a directory handle (enumeration only).

use std::io::SeekFrom;

use bytes::{Buf, Bytes};

use crate::error::{FsError, Result};
use crate::fs::info::FileInfo;
use crate::fs::path::{base, key_of};
use crate::fs::Fs;
use crate::store::ListRequest;

/// Minimum number of bytes fetched per ranged read.
const READ_AHEAD: u64 = 1024 * 1024;

/// Page size used when listing a whole directory.
const READDIR_PAGE: usize = 1000;

#[derive(Debug)]
enum Stream {
    None,
    Read(ReadStream),
    Write(Vec<u8>),
}

#[derive(Debug)]
struct ReadStream {
    /// Position of the next byte handed to the caller
    offset: u64,
    /// Object size, learned from stat or a point lookup
    size: Option<u64>,
    /// Bytes starting at `offset` already fetched from the store
    buffer: Bytes,
}

#[derive(Debug, Default)]
struct ReaddirCursor {
    token: Option<String>,
    exhausted: bool,
}

/// An open path in the filesystem.
#[derive(Debug)]
pub struct File {
    fs: Fs,
    name: String,
    key: String,
    stream: Stream,
    info: Option<FileInfo>,
    readdir: ReaddirCursor,
    closed: bool,
}

impl File {
    pub(crate) fn new(fs: Fs, name: impl Into<String>) -> Self {
        let name = name.into();
        let key = key_of(&name).to_string();
        Self::with_key(fs, name, key)
    }

    /// Handle on an exact object key, bypassing path-to-key conversion.
    pub(crate) fn at_key(fs: Fs, key: impl Into<String>) -> Self {
        let key = key.into();
        Self::with_key(fs, key.clone(), key)
    }

    fn with_key(fs: Fs, name: String, key: String) -> Self {
        Self {
            fs,
            name,
            key,
            stream: Stream::None,
            info: None,
            readdir: ReaddirCursor::default(),
            closed: false,
        }
    }

    pub(crate) fn with_info(mut self, info: FileInfo) -> Self {
        self.info = Some(info);
        self
    }

    /// Path this handle was opened with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fresh stat of the handle's path.
    pub async fn stat(&self) -> Result<FileInfo> {
        self.fs.stat(&self.name).await
    }

    fn ensure_open(&self, op: &'static str) -> Result<()> {
        if self.closed {
            return Err(FsError::Closed {
                op,
                path: self.name.clone(),
            });
        }
        Ok(())
    }

    fn not_opened(&self, op: &'static str) -> FsError {
        FsError::NotOpened {
            op,
            path: self.name.clone(),
        }
    }

    /// Start buffering writes for this path.
    pub fn open_write_stream(&mut self) -> Result<()> {
        self.ensure_open("open")?;
        if !matches!(self.stream, Stream::None) {
            return Err(FsError::AlreadyOpened {
                op: "open",
                path: self.name.clone(),
            });
        }
        self.stream = Stream::Write(Vec::new());
        Ok(())
    }

    /// Start reading this path at `offset`.
    ///
    /// No request is made until the first read.
    pub fn open_read_stream(&mut self, offset: u64) -> Result<()> {
        self.ensure_open("open")?;
        if !matches!(self.stream, Stream::None) {
            return Err(FsError::AlreadyOpened {
                op: "open",
                path: self.name.clone(),
            });
        }
        // Only a file record carries the size of the object at this key.
        let size = self
            .info
            .as_ref()
            .filter(|info| info.is_file())
            .map(FileInfo::size);
        self.stream = Stream::Read(ReadStream {
            offset,
            size,
            buffer: Bytes::new(),
        });
        Ok(())
    }

    /// Read into `buf`, returning the number of bytes read; 0 means end of
    /// object.
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.ensure_open("read")?;
        if !matches!(self.stream, Stream::Read(_)) {
            return Err(self.not_opened("read"));
        }
        if buf.is_empty() {
            return Ok(0);
        }

        let size = self.object_size("read").await?;
        let Self {
            fs,
            name,
            key,
            stream,
            ..
        } = self;
        let Stream::Read(stream) = stream else {
            return Ok(0);
        };

        if stream.buffer.is_empty() {
            if stream.offset >= size {
                return Ok(0);
            }
            let len = (buf.len() as u64).max(READ_AHEAD).min(size - stream.offset);
            tracing::trace!(path = %name, offset = stream.offset, len, "ranged read");
            stream.buffer = fs
                .store
                .get_object_range(&fs.bucket, key, stream.offset, len)
                .await
                .map_err(|e| FsError::store("read", name.as_str(), e))?;
            if stream.buffer.is_empty() {
                return Ok(0);
            }
        }

        let n = buf.len().min(stream.buffer.len());
        buf[..n].copy_from_slice(&stream.buffer[..n]);
        stream.buffer.advance(n);
        stream.offset += n as u64;
        Ok(n)
    }

    /// Read until `buf` is full or the object ends.
    pub async fn read_full(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.read(&mut buf[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }

    /// Read the rest of the object.
    pub async fn read_to_end(&mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut chunk = vec![0u8; 64 * 1024];
        loop {
            let n = self.read(&mut chunk).await?;
            if n == 0 {
                return Ok(out);
            }
            out.extend_from_slice(&chunk[..n]);
        }
    }

    /// Seek, then read.
    pub async fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize> {
        self.seek(SeekFrom::Start(offset)).await?;
        self.read(buf).await
    }

    /// Move the read position. Only read streams can seek.
    pub async fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        self.ensure_open("seek")?;
        match &self.stream {
            Stream::Read(_) => {}
            Stream::Write(_) => return Err(FsError::not_supported("seek", self.name.as_str())),
            Stream::None => return Err(self.not_opened("seek")),
        }

        let target = match pos {
            SeekFrom::Start(n) => i128::from(n),
            SeekFrom::Current(delta) => i128::from(self.read_offset()) + i128::from(delta),
            SeekFrom::End(delta) => {
                i128::from(self.object_size("seek").await?) + i128::from(delta)
            }
        };
        if target < 0 || target > i128::from(u64::MAX) {
            return Err(FsError::InvalidSeek {
                op: "seek",
                path: self.name.clone(),
                offset: target.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64,
            });
        }

        let target = target as u64;
        if let Stream::Read(stream) = &mut self.stream {
            if target != stream.offset {
                stream.offset = target;
                stream.buffer = Bytes::new();
            }
        }
        Ok(target)
    }

    fn read_offset(&self) -> u64 {
        match &self.stream {
            Stream::Read(stream) => stream.offset,
            _ => 0,
        }
    }

    /// Object size for the read stream, looked up once.
    async fn object_size(&mut self, op: &'static str) -> Result<u64> {
        if let Stream::Read(ReadStream {
            size: Some(size), ..
        }) = &self.stream
        {
            return Ok(*size);
        }

        let head = self
            .fs
            .store
            .head_object(&self.fs.bucket, &self.key)
            .await
            .map_err(|e| FsError::store(op, self.name.as_str(), e))?;
        if let Stream::Read(stream) = &mut self.stream {
            stream.size = Some(head.size);
        }
        Ok(head.size)
    }

    /// Append `data` to the write buffer.
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.ensure_open("write")?;
        match &mut self.stream {
            Stream::Write(buffer) => {
                buffer.extend_from_slice(data);
                Ok(data.len())
            }
            _ => Err(self.not_opened("write")),
        }
    }

    pub fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.write(data).map(|_| ())
    }

    pub fn write_str(&mut self, s: &str) -> Result<usize> {
        self.write(s.as_bytes())
    }

    /// Positional writes cannot be expressed as a single upload.
    pub fn write_at(&mut self, _data: &[u8], _offset: u64) -> Result<usize> {
        Err(FsError::not_supported("write_at", self.name.as_str()))
    }

    pub fn truncate(&mut self, _size: u64) -> Result<()> {
        Err(FsError::not_supported("truncate", self.name.as_str()))
    }

    /// List directory entries.
    ///
    /// `count == 0` returns every remaining entry; otherwise at most `count`
    /// entries are returned per call and an empty vector marks the end.
    /// Sub-prefixes appear as directories; the directory's own marker is
    /// skipped.
    pub async fn readdir(&mut self, count: usize) -> Result<Vec<FileInfo>> {
        if count > 0 {
            self.ensure_listable()?;
            loop {
                let page = self.readdir_page(count).await?;
                if !page.is_empty() || self.readdir.exhausted {
                    return Ok(page.into_iter().map(|(_, info)| info).collect());
                }
            }
        }

        let entries = self.readdir_keyed().await?;
        Ok(entries.into_iter().map(|(_, info)| info).collect())
    }

    /// Every remaining entry paired with the object key (or common prefix)
    /// it was listed under.
    pub(crate) async fn readdir_keyed(&mut self) -> Result<Vec<(String, FileInfo)>> {
        self.ensure_listable()?;
        let mut entries = Vec::new();
        while !self.readdir.exhausted {
            entries.extend(self.readdir_page(READDIR_PAGE).await?);
        }
        Ok(entries)
    }

    fn ensure_listable(&self) -> Result<()> {
        self.ensure_open("readdir")?;
        match &self.info {
            Some(info) if !info.is_dir() => Err(FsError::NotDirectory {
                op: "readdir",
                path: self.name.clone(),
            }),
            _ => Ok(()),
        }
    }

    /// Names of directory entries; see [`readdir`](Self::readdir).
    pub async fn readdir_names(&mut self, count: usize) -> Result<Vec<String>> {
        Ok(self
            .readdir(count)
            .await?
            .into_iter()
            .map(|info| info.name().to_string())
            .collect())
    }

    async fn readdir_page(&mut self, max_keys: usize) -> Result<Vec<(String, FileInfo)>> {
        if self.readdir.exhausted {
            return Ok(Vec::new());
        }

        let mut prefix = self.key.clone();
        if !prefix.is_empty() && !prefix.ends_with('/') {
            prefix.push('/');
        }

        let out = self
            .fs
            .store
            .list_objects(ListRequest {
                bucket: self.fs.bucket.clone(),
                prefix,
                delimiter: Some("/".to_string()),
                max_keys,
                continuation_token: self.readdir.token.take(),
            })
            .await
            .map_err(|e| FsError::store("readdir", self.name.as_str(), e))?;

        self.readdir.token = out.next_continuation_token;
        if !out.is_truncated || self.readdir.token.is_none() {
            self.readdir.exhausted = true;
        }

        let mut entries = Vec::with_capacity(out.common_prefixes.len() + out.objects.len());
        for prefix in out.common_prefixes {
            let info = FileInfo::directory(base(&prefix));
            entries.push((prefix, info));
        }
        for object in out.objects {
            // The listing includes the directory's own marker.
            if object.key.ends_with('/') {
                continue;
            }
            let info = FileInfo::file(base(&object.key), object.size, object.last_modified);
            entries.push((object.key, info));
        }
        Ok(entries)
    }

    /// Release the handle. A write stream is uploaded here.
    pub async fn close(&mut self) -> Result<()> {
        self.ensure_open("close")?;
        self.closed = true;

        match std::mem::replace(&mut self.stream, Stream::None) {
            Stream::Write(buffer) => self.fs.upload_body("close", &self.name, buffer).await,
            Stream::Read(_) | Stream::None => Ok(()),
        }
    }
}

impl Drop for File {
    fn drop(&mut self) {
        if let Stream::Write(buffer) = &self.stream {
            if !buffer.is_empty() {
                tracing::warn!(
                    path = %self.name,
                    pending = buffer.len(),
                    "write handle dropped without close; buffered data discarded"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::{MemoryStore, ObjectStore, PutObjectRequest};

    async fn fs_with(objects: &[(&str, &[u8])]) -> (Fs, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        for (key, body) in objects {
            store
                .put_object(PutObjectRequest::new("b", *key, body.to_vec()))
                .await
                .unwrap();
        }
        (Fs::new("b", store.clone()), store)
    }

    #[tokio::test]
    async fn test_write_then_close_uploads() {
        let (fs, store) = fs_with(&[]).await;
        let mut file = File::new(fs, "notes/today.txt");
        file.open_write_stream().unwrap();
        file.write_str("hello ").unwrap();
        file.write_all(b"world").unwrap();

        assert!(store.object("b", "notes/today.txt").await.is_none());
        file.close().await.unwrap();

        let object = store.object("b", "notes/today.txt").await.unwrap();
        assert_eq!(&object.body[..], b"hello world");
        assert_eq!(object.content_type.as_deref(), Some("text/plain"));
    }

    #[tokio::test]
    async fn test_double_open_and_close() {
        let (fs, _) = fs_with(&[]).await;
        let mut file = File::new(fs, "a");
        file.open_write_stream().unwrap();
        assert!(matches!(
            file.open_read_stream(0),
            Err(FsError::AlreadyOpened { .. })
        ));

        file.close().await.unwrap();
        assert!(matches!(file.close().await, Err(FsError::Closed { .. })));
        assert!(matches!(file.write(b"x"), Err(FsError::Closed { .. })));
    }

    #[tokio::test]
    async fn test_read_and_seek() {
        let (fs, _) = fs_with(&[("data.bin", b"0123456789")]).await;
        let mut file = File::new(fs, "/data.bin");
        file.open_read_stream(0).unwrap();

        let mut buf = [0u8; 4];
        assert_eq!(file.read(&mut buf).await.unwrap(), 4);
        assert_eq!(&buf, b"0123");

        assert_eq!(file.seek(SeekFrom::Current(2)).await.unwrap(), 6);
        assert_eq!(file.read(&mut buf).await.unwrap(), 4);
        assert_eq!(&buf, b"6789");
        assert_eq!(file.read(&mut buf).await.unwrap(), 0);

        assert_eq!(file.seek(SeekFrom::End(-3)).await.unwrap(), 7);
        assert_eq!(file.read_to_end().await.unwrap(), b"789");

        let err = file.seek(SeekFrom::Current(-100)).await.unwrap_err();
        assert!(matches!(err, FsError::InvalidSeek { .. }));

        let mut two = [0u8; 2];
        assert_eq!(file.read_at(&mut two, 1).await.unwrap(), 2);
        assert_eq!(&two, b"12");
    }

    #[tokio::test]
    async fn test_read_empty_object() {
        let (fs, _) = fs_with(&[("empty", b"")]).await;
        let mut file = File::new(fs, "empty");
        file.open_read_stream(0).unwrap();
        assert!(file.read_to_end().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_handle_cannot_seek_or_read() {
        let (fs, _) = fs_with(&[]).await;
        let mut file = File::new(fs, "out");
        file.open_write_stream().unwrap();

        let err = file.seek(SeekFrom::Start(0)).await.unwrap_err();
        assert!(err.is_not_supported());
        let mut buf = [0u8; 1];
        assert!(matches!(
            file.read(&mut buf).await,
            Err(FsError::NotOpened { .. })
        ));
        assert!(file.write_at(b"x", 3).unwrap_err().is_not_supported());
    }

    #[tokio::test]
    async fn test_readdir() {
        let (fs, _) = fs_with(&[
            ("dir/", b""),
            ("dir/a.txt", b"aaa"),
            ("dir/b.txt", b"b"),
            ("dir/sub/c.txt", b"c"),
            ("dirt", b"x"),
        ])
        .await;

        let mut dir = File::new(fs.clone(), "dir");
        let entries = dir.readdir(0).await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["sub", "a.txt", "b.txt"]);
        assert!(entries[0].is_dir());
        assert_eq!(entries[1].size(), 3);

        let mut paged = File::new(fs, "dir/");
        let mut seen = Vec::new();
        loop {
            let page = paged.readdir_names(2).await.unwrap();
            if page.is_empty() {
                break;
            }
            assert!(page.len() <= 2);
            seen.extend(page);
        }
        seen.sort();
        assert_eq!(seen, vec!["a.txt", "b.txt", "sub"]);
    }

    #[tokio::test]
    async fn test_readdir_keyed_keeps_listed_keys() {
        let (fs, _) = fs_with(&[("dir/", b""), ("dir//x", b"1"), ("dir/a", b"2")]).await;

        let mut dir = File::at_key(fs, "dir/");
        let keys: Vec<_> = dir
            .readdir_keyed()
            .await
            .unwrap()
            .into_iter()
            .map(|(key, info)| (key, info.is_dir()))
            .collect();
        assert_eq!(
            keys,
            vec![("dir//".to_string(), true), ("dir/a".to_string(), false)]
        );
    }

    #[tokio::test]
    async fn test_read_size_comes_from_file_records_only() {
        let (fs, _) = fs_with(&[("weird/", b"payload")]).await;

        let mut file = File::new(fs, "weird/").with_info(FileInfo::directory("weird"));
        file.open_read_stream(0).unwrap();
        assert_eq!(file.read_to_end().await.unwrap(), b"payload");
    }

    #[tokio::test]
    async fn test_readdir_on_file() {
        let (fs, _) = fs_with(&[("f", b"1")]).await;
        let mut file = File::new(fs, "f").with_info(FileInfo::file("f", 1, std::time::UNIX_EPOCH));
        assert!(matches!(
            file.readdir(0).await,
            Err(FsError::NotDirectory { .. })
        ));
    }
}
