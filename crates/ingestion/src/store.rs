//! Depth frame store
//!
//! Single shared cell holding the most recent valid depth frame. Writers swap
//! in a whole new `Arc`; readers clone the `Arc` and keep a consistent
//! snapshot for as long as they need it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use contracts::DepthFrame;

/// Latest-value store for decoded depth frames
#[derive(Debug, Default)]
pub struct DepthFrameStore {
    current: RwLock<Option<Arc<DepthFrame>>>,
    version: AtomicU64,
}

impl DepthFrameStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current frame, `None` before the first replace.
    ///
    /// The returned frame stays valid regardless of later `replace` calls.
    pub fn current_frame(&self) -> Option<Arc<DepthFrame>> {
        // A poisoned lock still guards a whole Arc, never a half-written frame.
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        guard.clone()
    }

    /// Publish a new frame, superseding the previous one
    pub fn replace(&self, frame: DepthFrame) -> Arc<DepthFrame> {
        let frame = Arc::new(frame);
        let previous = {
            let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
            let previous = guard.replace(frame.clone());
            self.version.fetch_add(1, Ordering::Release);
            previous
        };
        // Old frame is released outside the lock
        drop(previous);
        frame
    }

    /// Number of successful replaces so far
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Whether any frame has been published
    pub fn is_empty(&self) -> bool {
        self.version() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::DepthEncoding;
    use rand::Rng;
    use std::sync::atomic::AtomicBool;
    use std::thread;

    fn frame(width: u32, height: u32, fill: f32) -> DepthFrame {
        DepthFrame::from_meters(
            width,
            height,
            DepthEncoding::Float32Meters,
            fill as f64,
            None,
            vec![fill; (width * height) as usize],
        )
        .unwrap()
    }

    #[test]
    fn test_empty_store() {
        let store = DepthFrameStore::new();
        assert!(store.current_frame().is_none());
        assert!(store.is_empty());
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn test_replace_then_read() {
        let store = DepthFrameStore::new();
        store.replace(frame(2, 2, 1.0));
        let current = store.current_frame().unwrap();
        assert_eq!(current.samples(), &[1.0; 4]);
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn test_snapshot_survives_replace() {
        let store = DepthFrameStore::new();
        store.replace(frame(2, 2, 1.0));
        let snapshot = store.current_frame().unwrap();

        store.replace(frame(3, 1, 2.0));

        assert_eq!(snapshot.width, 2);
        assert_eq!(snapshot.samples(), &[1.0; 4]);
        assert_eq!(store.current_frame().unwrap().width, 3);
    }

    #[test]
    fn test_concurrent_replace_never_tears() {
        let store = Arc::new(DepthFrameStore::new());
        let done = Arc::new(AtomicBool::new(false));

        let writer = {
            let store = store.clone();
            thread::spawn(move || {
                let mut rng = rand::rng();
                for i in 0..2000u32 {
                    let width = rng.random_range(1..=16);
                    let height = rng.random_range(1..=16);
                    // Each frame is uniform so any mix of two frames is detectable
                    store.replace(frame(width, height, (i + 1) as f32));
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                let done = done.clone();
                thread::spawn(move || {
                    let mut checked = 0u64;
                    while !done.load(Ordering::Relaxed) {
                        if let Some(f) = store.current_frame() {
                            assert_eq!(f.samples().len(), (f.width * f.height) as usize);
                            let first = f.samples()[0];
                            assert!(f.samples().iter().all(|s| *s == first));
                            assert_eq!(f.captured_at, first as f64);
                            checked += 1;
                        }
                    }
                    checked
                })
            })
            .collect();

        writer.join().unwrap();
        done.store(true, Ordering::Relaxed);
        for reader in readers {
            reader.join().unwrap();
        }

        assert_eq!(store.version(), 2000);
        assert_eq!(store.current_frame().unwrap().samples()[0], 2000.0);
    }
}
