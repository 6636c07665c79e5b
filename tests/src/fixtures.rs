//! # Test Fixtures
//!
//! A small persistent cache built on the block store: a header block at
//! offset 0 heads a singly linked list of key/value entry blocks. Inserting
//! rewrites the header in place, so every scenario exercises allocation,
//! pointer chaining and in-place rewrites together.

use block_store::{
    Block, BlockPayload, BlockPointer, BlockStore, Decoder, Encoder, FileBackedBlockStore,
    Initializer, PayloadFactory, Result, StoreConfig,
};
use std::io;
use std::path::Path;

pub const HEADER_TAG: u8 = 1;
pub const ENTRY_TAG: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Header,
    Entry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordBody {
    Header {
        head: BlockPointer,
        count: u32,
    },
    Entry {
        key: String,
        value: Vec<u8>,
        next: BlockPointer,
    },
}

/// Payload of the linked cache.
#[derive(Debug, Clone)]
pub struct CacheRecord {
    pub body: RecordBody,
    block: Option<Block>,
}

impl CacheRecord {
    pub fn header(head: BlockPointer, count: u32) -> Self {
        Self {
            body: RecordBody::Header { head, count },
            block: None,
        }
    }

    pub fn entry(key: impl Into<String>, value: Vec<u8>, next: BlockPointer) -> Self {
        Self {
            body: RecordBody::Entry {
                key: key.into(),
                value,
                next,
            },
            block: None,
        }
    }

    pub fn empty(kind: RecordKind) -> Self {
        match kind {
            RecordKind::Header => Self::header(BlockPointer::null(), 0),
            RecordKind::Entry => Self::entry(String::new(), Vec::new(), BlockPointer::null()),
        }
    }
}

impl BlockPayload for CacheRecord {
    type Kind = RecordKind;

    fn type_tag(&self) -> u8 {
        match self.body {
            RecordBody::Header { .. } => HEADER_TAG,
            RecordBody::Entry { .. } => ENTRY_TAG,
        }
    }

    fn size(&self) -> u32 {
        match &self.body {
            RecordBody::Header { .. } => 8 + 4,
            RecordBody::Entry { key, value, .. } => {
                Encoder::sized_len(key.len())
                    .saturating_add(Encoder::sized_len(value.len()))
                    .saturating_add(8)
            }
        }
    }

    fn write_to(&self, encoder: &mut Encoder<'_>) -> io::Result<()> {
        match &self.body {
            RecordBody::Header { head, count } => {
                encoder.write_pointer(*head)?;
                encoder.write_u32(*count)
            }
            RecordBody::Entry { key, value, next } => {
                encoder.write_str(key)?;
                encoder.write_sized_bytes(value)?;
                encoder.write_pointer(*next)
            }
        }
    }

    fn read_from(&mut self, decoder: &mut Decoder<'_>) -> io::Result<()> {
        self.body = match self.body {
            RecordBody::Header { .. } => RecordBody::Header {
                head: decoder.read_pointer()?,
                count: decoder.read_u32()?,
            },
            RecordBody::Entry { .. } => RecordBody::Entry {
                key: decoder.read_string()?,
                value: decoder.read_sized_bytes()?.to_vec(),
                next: decoder.read_pointer()?,
            },
        };
        Ok(())
    }

    fn block(&self) -> Option<Block> {
        self.block
    }

    fn set_block(&mut self, block: Option<Block>) {
        self.block = block;
    }
}

pub fn record_factory() -> Box<dyn PayloadFactory<CacheRecord> + Send> {
    Box::new(CacheRecord::empty)
}

/// Seeds an empty file with an empty header at offset 0.
pub fn header_initializer<'a>() -> Initializer<'a, CacheRecord> {
    Box::new(|store: &mut dyn BlockStore<Payload = CacheRecord>| {
        store
            .write(&mut CacheRecord::header(BlockPointer::null(), 0))
            .map(|_| ())
    })
}

pub fn file_store(path: &Path, name: &str) -> FileBackedBlockStore<CacheRecord> {
    FileBackedBlockStore::new(path, StoreConfig::default().with_display_name(name))
}

/// Insert-and-lookup cache over any block store holding [`CacheRecord`]s.
pub struct LinkedCache<S> {
    store: S,
}

impl<S: BlockStore<Payload = CacheRecord>> LinkedCache<S> {
    /// Open `store`, seeding the header block if the file is empty.
    pub fn open(mut store: S) -> Result<Self> {
        store.open(header_initializer(), record_factory())?;
        Ok(Self { store })
    }

    pub fn store(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn header(&mut self) -> Result<CacheRecord> {
        self.store.read_first(RecordKind::Header)
    }

    /// Prepend an entry and rewrite the header to point at it.
    pub fn insert(&mut self, key: &str, value: Vec<u8>) -> Result<BlockPointer> {
        let mut header = self.header()?;
        let (head, count) = match header.body {
            RecordBody::Header { head, count } => (head, count),
            RecordBody::Entry { .. } => unreachable!("header kind decodes as header"),
        };

        let pointer = self
            .store
            .write(&mut CacheRecord::entry(key, value, head))?;
        header.body = RecordBody::Header {
            head: pointer,
            count: count + 1,
        };
        self.store.write(&mut header)?;
        Ok(pointer)
    }

    /// Every entry, newest first, with its pointer.
    pub fn entries(&mut self) -> Result<Vec<(BlockPointer, String, Vec<u8>)>> {
        let mut entries = Vec::new();
        let mut next = match self.header()?.body {
            RecordBody::Header { head, .. } => head,
            RecordBody::Entry { .. } => unreachable!("header kind decodes as header"),
        };
        while !next.is_null() {
            let record = self.store.read(next, RecordKind::Entry)?;
            match record.body {
                RecordBody::Entry {
                    key,
                    value,
                    next: following,
                } => {
                    entries.push((next, key, value));
                    next = following;
                }
                RecordBody::Header { .. } => unreachable!("entry kind decodes as entry"),
            }
        }
        Ok(entries)
    }

    pub fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .entries()?
            .into_iter()
            .find(|(_, k, _)| k == key)
            .map(|(_, _, value)| value))
    }

    /// Every live block, for integrity verification.
    pub fn live_blocks(&mut self) -> Result<Vec<(BlockPointer, RecordKind)>> {
        let mut blocks = vec![(BlockPointer::first(), RecordKind::Header)];
        blocks.extend(
            self.entries()?
                .into_iter()
                .map(|(pointer, _, _)| (pointer, RecordKind::Entry)),
        );
        Ok(blocks)
    }
}

/// Install a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
