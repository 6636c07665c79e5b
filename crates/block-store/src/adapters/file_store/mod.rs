//! # File-Backed Block Store
//!
//! The concrete engine: owns the backing file handle, the bump allocator and
//! the block encode/decode logic. Every block is checksummed with CRC32 and
//! validated on every read.
//!
//! ## Write
//!
//! The payload is serialized first so its actual length can be checked
//! against the size it reported. Marker, type tag, length and payload bytes
//! are then streamed to the block's address through a checksum accumulator,
//! followed by the checksum trailer. The file is extended if it is still
//! shorter than the block's end.
//!
//! ## Read
//!
//! Header and payload bytes are read through a checksum accumulator and the
//! trailer is compared before the payload sees any byte, so damaged bytes are
//! always reported as corruption rather than handed to the payload.
//!
//! Not safe for concurrent use on its own: wrap it in a
//! [`LockingBlockStore`](crate::adapters::LockingBlockStore) when the file is
//! shared.

use crate::adapters::checksum::{ChecksumReader, ChecksumWriter};
use crate::domain::{
    Allocator, Block, BlockPayload, BlockPointer, CorruptionReason, Decoder, Encoder,
    PayloadFactory, Result, StoreConfig, StoreError, StoreState, BLOCK_MARKER, HEADER_SIZE,
    TRAILER_SIZE,
};
use crate::ports::{BlockStore, Initializer};
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};


/// Block store over a single growable file.
pub struct FileBackedBlockStore<P: BlockPayload> {
    path: PathBuf,
    config: StoreConfig,
    display_name: String,
    state: StoreState,
    file: Option<File>,
    allocator: Allocator,
    factory: Option<Box<dyn PayloadFactory<P> + Send>>,
}

impl<P: BlockPayload> FileBackedBlockStore<P> {
    /// Create an unopened store for the file at `path`.
    pub fn new<T: AsRef<Path>>(path: T, config: StoreConfig) -> Self {
        let path = path.as_ref().to_path_buf();
        let display_name = config.display_name_for(&path);
        Self {
            path,
            config,
            display_name,
            state: StoreState::Unopened,
            file: None,
            allocator: Allocator::default(),
            factory: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Offset the next newly allocated block would start at, ignoring any
    /// growth of the file by other store instances.
    pub fn next_allocation(&self) -> u64 {
        self.allocator.next()
    }

    /// Current length of the backing file.
    pub fn len(&self) -> Result<u64> {
        let file = self.handle("measure")?;
        self.file_len(file)
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.len().map(|len| len == 0)
    }

    fn handle(&self, operation: &'static str) -> Result<&File> {
        match (&self.file, self.state) {
            (Some(file), StoreState::Open) => Ok(file),
            _ => Err(self.invalid_state(operation)),
        }
    }

    fn ensure_open(&self, operation: &'static str) -> Result<()> {
        self.handle(operation).map(|_| ())
    }

    fn invalid_state(&self, operation: &'static str) -> StoreError {
        StoreError::InvalidState {
            store: self.display_name.clone(),
            state: self.state,
            operation,
        }
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::io(&self.display_name, source)
    }

    fn corrupted(&self, pointer: BlockPointer, reason: CorruptionReason) -> StoreError {
        #[cfg(feature = "tracing-log")]
        tracing::warn!(
            "[block-store] Corrupted {} found in {}: {}",
            pointer,
            self.display_name,
            reason
        );
        StoreError::corrupted(&self.display_name, pointer, reason)
    }

    fn file_len(&self, file: &File) -> Result<u64> {
        file.metadata()
            .map(|metadata| metadata.len())
            .map_err(|e| self.io_error(e))
    }

    /// Serialize a payload, checking it wrote exactly what it reported.
    fn serialize(&self, payload: &P) -> Result<Vec<u8>> {
        let reported = payload.size();
        let max = self.config.max_payload_size;
        if reported > max {
            return Err(StoreError::PayloadTooLarge {
                store: self.display_name.clone(),
                size: u64::from(reported),
                max,
            });
        }

        let mut body = Vec::with_capacity(reported as usize);
        let mut encoder = Encoder::new(&mut body);
        payload
            .write_to(&mut encoder)
            .map_err(|e| self.io_error(e))?;
        let written = encoder.written();
        if written != u64::from(reported) {
            return Err(StoreError::PayloadSizeMismatch {
                store: self.display_name.clone(),
                reported,
                written,
            });
        }
        Ok(body)
    }

    /// Give a block with `payload_size` bytes an address at the end of the file.
    fn allocate(&mut self, payload_size: u32) -> Result<Block> {
        let file_len = self.file_len(self.handle("allocate in")?)?;
        let (allocator, pointer) = self.allocator.observe(file_len).allocate(payload_size);
        self.allocator = allocator;

        #[cfg(feature = "tracing-log")]
        tracing::debug!(
            "[block-store] Allocated {} ({} payload bytes) in {}",
            pointer,
            payload_size,
            self.display_name
        );

        Ok(Block::Allocated {
            pointer,
            payload_size,
        })
    }

    fn write_block(&self, pointer: BlockPointer, type_tag: u8, body: &[u8]) -> Result<()> {
        let mut file = self.handle("write to")?;
        let offset = pointer.offset().ok_or_else(|| StoreError::NullPointer {
            store: self.display_name.clone(),
        })?;
        // Bounded by the validated max_payload_size in serialize().
        let length = body.len() as u32;

        file.seek(SeekFrom::Start(offset))
            .map_err(|e| self.io_error(e))?;

        let mut out = ChecksumWriter::new(BufWriter::new(file));
        let written: io::Result<()> = (|| {
            out.write_all(&[BLOCK_MARKER, type_tag])?;
            out.write_all(&(length as i32).to_be_bytes())?;
            out.write_all(body)?;
            let checksum = out.checksum();
            let mut out = out.into_inner();
            out.write_all(&checksum.to_be_bytes())?;
            out.flush()
        })();
        written.map_err(|e| self.io_error(e))?;

        let final_size = offset + Block::total_size(length);
        if self.file_len(file)? < final_size {
            file.set_len(final_size).map_err(|e| self.io_error(e))?;
        }

        #[cfg(feature = "tracing-log")]
        tracing::trace!(
            "[block-store] Wrote {} (type {:#04x}, {} bytes) to {}",
            pointer,
            type_tag,
            length,
            self.display_name
        );

        Ok(())
    }

    /// Read and validate the raw payload bytes of the block at `pointer`.
    fn read_block(&self, pointer: BlockPointer, expected_type: u8) -> Result<Vec<u8>> {
        let mut file = self.handle("read from")?;
        let offset = pointer.offset().ok_or_else(|| StoreError::NullPointer {
            store: self.display_name.clone(),
        })?;

        let file_len = self.file_len(file)?;
        if offset.saturating_add(HEADER_SIZE) >= file_len {
            return Err(self.corrupted(pointer, CorruptionReason::Truncated { file_len }));
        }
        file.seek(SeekFrom::Start(offset))
            .map_err(|e| self.io_error(e))?;

        let read_failed = |e: io::Error| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                self.corrupted(pointer, CorruptionReason::Truncated { file_len })
            } else {
                self.io_error(e)
            }
        };

        let mut input = ChecksumReader::new(BufReader::new(file));
        let mut header = [0u8; HEADER_SIZE as usize];
        input.read_exact(&mut header).map_err(read_failed)?;

        if header[0] != BLOCK_MARKER {
            return Err(self.corrupted(
                pointer,
                CorruptionReason::BadMarker {
                    expected: BLOCK_MARKER,
                    found: header[0],
                },
            ));
        }
        if header[1] != expected_type {
            return Err(self.corrupted(
                pointer,
                CorruptionReason::TypeMismatch {
                    expected: expected_type,
                    found: header[1],
                },
            ));
        }

        let length = i32::from_be_bytes([header[2], header[3], header[4], header[5]]);
        let length = u32::try_from(length)
            .map_err(|_| self.corrupted(pointer, CorruptionReason::NegativeLength { length }))?;
        if offset + Block::total_size(length) > file_len {
            return Err(self.corrupted(
                pointer,
                CorruptionReason::LengthOverrun { length, file_len },
            ));
        }

        let mut body = vec![0u8; length as usize];
        input.read_exact(&mut body).map_err(read_failed)?;
        let computed = input.checksum();

        let mut trailer = [0u8; TRAILER_SIZE as usize];
        input
            .into_inner()
            .read_exact(&mut trailer)
            .map_err(read_failed)?;
        let stored = u64::from_be_bytes(trailer);
        if stored != computed {
            return Err(self.corrupted(
                pointer,
                CorruptionReason::ChecksumMismatch { stored, computed },
            ));
        }

        #[cfg(feature = "tracing-log")]
        tracing::trace!(
            "[block-store] Read {} (type {:#04x}, {} bytes) from {}",
            pointer,
            expected_type,
            length,
            self.display_name
        );

        Ok(body)
    }
}

impl<P: BlockPayload> BlockStore for FileBackedBlockStore<P> {
    type Payload = P;

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn state(&self) -> StoreState {
        self.state
    }

    fn open(
        &mut self,
        initializer: Initializer<'_, P>,
        factory: Box<dyn PayloadFactory<P> + Send>,
    ) -> Result<()> {
        if self.state != StoreState::Unopened {
            return Err(self.invalid_state("open"));
        }
        self.config.validate()?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        let file_len = self.file_len(&file)?;

        self.file = Some(file);
        self.allocator = Allocator::starting_at(file_len);
        self.factory = Some(factory);
        self.state = StoreState::Open;

        if file_len == 0 {
            #[cfg(feature = "tracing-log")]
            tracing::info!(
                "[block-store] 📁 Initializing empty {} at {}",
                self.display_name,
                self.path.display()
            );
            initializer(self)?;
        } else {
            #[cfg(feature = "tracing-log")]
            tracing::info!(
                "[block-store] 💾 Opened {} ({} bytes)",
                self.display_name,
                file_len
            );
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.ensure_open("close")?;
        self.file = None;
        self.factory = None;
        self.state = StoreState::Closed;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        let file = self.handle("clear")?;
        file.set_len(0).map_err(|e| self.io_error(e))?;
        self.allocator = Allocator::reset();

        #[cfg(feature = "tracing-log")]
        tracing::info!("[block-store] Cleared {}", self.display_name);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let file = self.handle("flush")?;
        if self.config.sync_on_flush {
            file.sync_data().map_err(|e| self.io_error(e))?;
        }
        Ok(())
    }

    fn attach(&mut self, payload: &mut P) -> Result<()> {
        self.ensure_open("attach to")?;
        if payload.block().is_none() {
            payload.set_block(Some(Block::Unallocated));
        }
        Ok(())
    }

    fn remove(&mut self, payload: &mut P) -> Result<()> {
        self.ensure_open("remove from")?;
        payload.set_block(None);
        Ok(())
    }

    fn read(&mut self, pointer: BlockPointer, kind: P::Kind) -> Result<P> {
        self.ensure_open("read from")?;
        let mut payload = match &self.factory {
            Some(factory) => factory.create(kind),
            None => return Err(self.invalid_state("read from")),
        };

        let body = self.read_block(pointer, payload.type_tag())?;
        let mut decoder = Decoder::new(&body);
        payload.read_from(&mut decoder).map_err(|e| {
            self.corrupted(
                pointer,
                CorruptionReason::Undecodable {
                    message: e.to_string(),
                },
            )
        })?;
        if decoder.remaining() > 0 {
            return Err(self.corrupted(
                pointer,
                CorruptionReason::TrailingBytes {
                    remaining: decoder.remaining(),
                },
            ));
        }

        payload.set_block(Some(Block::Allocated {
            pointer,
            payload_size: body.len() as u32,
        }));
        Ok(payload)
    }

    fn write(&mut self, payload: &mut P) -> Result<BlockPointer> {
        self.ensure_open("write to")?;
        let body = self.serialize(payload)?;
        let size = body.len() as u32;

        let block = match payload.block() {
            Some(Block::Allocated {
                pointer,
                payload_size,
            }) => {
                if size > payload_size {
                    return Err(StoreError::BlockOverflow {
                        store: self.display_name.clone(),
                        pointer,
                        allocated: payload_size,
                        requested: size,
                    });
                }
                Block::Allocated {
                    pointer,
                    payload_size,
                }
            }
            Some(Block::Unallocated) | None => self.allocate(size)?,
        };

        let pointer = block.pointer();
        self.write_block(pointer, payload.type_tag(), &body)?;
        payload.set_block(Some(block));
        Ok(pointer)
    }
}
