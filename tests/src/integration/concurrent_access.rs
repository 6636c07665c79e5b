//! # Concurrent Access
//!
//! Several store instances, each with its own file handle and allocator,
//! write into one shared file from separate threads. Through
//! `LockingBlockStore` every write lands in its own non-overlapping block
//! and every block reads back intact.

#[cfg(test)]
mod tests {
    use crate::fixtures::{
        file_store, header_initializer, init_tracing, record_factory, CacheRecord, RecordBody,
        RecordKind,
    };
    use block_store::{
        verify_blocks, BlockPayload, BlockPointer, BlockStore, ExclusiveLock,
        FileBackedBlockStore, FileLock, LockConfig, LockingBlockStore, ProcessLock,
    };
    use parking_lot::Mutex;
    use std::path::Path;
    use std::sync::Arc;
    use std::thread;

    const THREADS: usize = 4;
    const WRITES_PER_THREAD: usize = 25;

    type Written = Arc<Mutex<Vec<(BlockPointer, String)>>>;
    type SharedStore<L> = LockingBlockStore<FileBackedBlockStore<CacheRecord>, L>;

    /// Open one store per thread, in order, so only the first seeds the file.
    fn open_stores<L, F>(path: &Path, mut lock_for: F) -> Vec<SharedStore<L>>
    where
        L: ExclusiveLock,
        F: FnMut() -> L,
    {
        (0..THREADS)
            .map(|i| {
                let mut store =
                    LockingBlockStore::new(file_store(path, &format!("shared-{}", i)), lock_for());
                store.open(header_initializer(), record_factory()).unwrap();
                store
            })
            .collect()
    }

    fn run_writers<L>(stores: Vec<SharedStore<L>>) -> Written
    where
        L: ExclusiveLock + Send + 'static,
    {
        let written: Written = Arc::new(Mutex::new(Vec::new()));
        let handles: Vec<_> = stores
            .into_iter()
            .enumerate()
            .map(|(t, mut store)| {
                let written = written.clone();
                thread::spawn(move || {
                    for i in 0..WRITES_PER_THREAD {
                        let key = format!("thread-{}/entry-{}", t, i);
                        let value = vec![t as u8; i];
                        let mut record =
                            CacheRecord::entry(key.clone(), value, BlockPointer::null());
                        let pointer = store.write(&mut record).unwrap();
                        assert_eq!(record.block().map(|b| b.pointer()), Some(pointer));
                        written.lock().push((pointer, key));
                    }
                    store.close().unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        written
    }

    fn check_shared_file(path: &Path, written: &Written) {
        let mut reader = file_store(path, "reader");
        reader.open(header_initializer(), record_factory()).unwrap();

        let written = written.lock();
        assert_eq!(written.len(), THREADS * WRITES_PER_THREAD);

        for (pointer, key) in written.iter() {
            match reader.read(*pointer, RecordKind::Entry).unwrap().body {
                RecordBody::Entry { key: stored, .. } => assert_eq!(&stored, key),
                other => panic!("unexpected body {:?}", other),
            }
        }

        let mut blocks = vec![(BlockPointer::first(), RecordKind::Header)];
        blocks.extend(written.iter().map(|(pointer, _)| (*pointer, RecordKind::Entry)));
        let report = verify_blocks(&mut reader, blocks).unwrap();
        assert_eq!(report.blocks, THREADS * WRITES_PER_THREAD + 1);
        assert_eq!(report.end, reader.len().unwrap());
    }

    #[test]
    fn test_process_lock_keeps_writers_apart() {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.bin");
        let lock = Arc::new(ProcessLock::new());

        let stores = open_stores(&path, || lock.clone());
        let written = run_writers(stores);

        check_shared_file(&path, &written);
    }

    #[test]
    fn test_file_lock_keeps_writers_apart() {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.bin");

        // A separate lock handle per store, as separate processes would have.
        let stores = open_stores(&path, || {
            FileLock::for_cache_file(&path, LockConfig::default()).unwrap()
        });
        let written = run_writers(stores);

        check_shared_file(&path, &written);
    }

    #[test]
    fn test_concurrent_readers_share_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.bin");
        let lock = Arc::new(ProcessLock::new());

        let mut stores = open_stores(&path, || lock.clone());
        let pointer = stores[0]
            .write(&mut CacheRecord::entry("k", vec![7; 64], BlockPointer::null()))
            .unwrap();

        let handles: Vec<_> = stores
            .into_iter()
            .map(|mut store| {
                thread::spawn(move || {
                    for _ in 0..50 {
                        let record = store.read(pointer, RecordKind::Entry).unwrap();
                        match record.body {
                            RecordBody::Entry { value, .. } => assert_eq!(value, vec![7u8; 64]),
                            other => panic!("unexpected body {:?}", other),
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
