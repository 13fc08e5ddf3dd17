//! Log levels emitted by the resolver.

#![allow(clippy::unwrap_used)]

use std::io;
use std::sync::{Arc, Mutex};
use tagfs_fs::PathResolver;
use tagfs_testkit::MemoryStore;
use tracing::Level;

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_creations_are_info_lookups_are_debug() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let resolver = PathResolver::new(MemoryStore::new());
    resolver.put("/a/b", b"one".to_vec()).await.unwrap();
    resolver.put("/a/b", b"two".to_vec()).await.unwrap();
    resolver.get("/a/b").await.unwrap();

    let output = logs.contents();
    // one directory and one file
    assert_eq!(output.matches("created entry").count(), 2);
    assert!(output.contains("INFO"));
    assert!(!output.contains("resolving"));
    assert!(!output.contains("updated file"));
}
