use std::sync::Arc;
use tokio::sync::Mutex;

use crate::canvas::{Canvas, Cell, Color};
use crate::error::{PlaceError, StoreError};
use crate::store::{DocumentStore, CANVAS_COLLECTION, CANVAS_KEY};

/// The shared grid, persisted as one document in the backing store
pub struct CanvasStore {
    store: Arc<dyn DocumentStore>,
    size: usize,
    default_color: Color,
    /// Serialises load-modify-save of the canvas document
    write_lock: Mutex<()>,
}

impl CanvasStore {
    pub fn new(store: Arc<dyn DocumentStore>, size: usize, default_color: Color) -> Self {
        Self {
            store,
            size,
            default_color,
            write_lock: Mutex::new(()),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Full snapshot of the grid, creating the default one on first access
    pub async fn read_all(&self, now: i64) -> Result<Canvas, StoreError> {
        self.load_or_init(now).await
    }

    /// Overwrite one cell with a new color and writer
    pub async fn write_cell(
        &self,
        x: i64,
        y: i64,
        color: &Color,
        identity: &str,
        now: i64,
    ) -> Result<(), PlaceError> {
        if !Canvas::contains(self.size, x, y) {
            return Err(PlaceError::OutOfBounds {
                x,
                y,
                size: self.size,
            });
        }

        let _guard = self.write_lock.lock().await;
        let mut canvas = self.load_or_init(now).await?;

        let cell = Cell {
            color: color.clone(),
            last_updated: now,
            last_updated_by: identity.to_string(),
        };
        canvas.set_cell(x as usize, y as usize, cell);

        let doc = serde_json::to_value(&canvas).map_err(StoreError::from)?;
        self.store.set(CANVAS_COLLECTION, CANVAS_KEY, doc).await?;
        Ok(())
    }

    async fn load_or_init(&self, now: i64) -> Result<Canvas, StoreError> {
        if let Some(doc) = self.store.get(CANVAS_COLLECTION, CANVAS_KEY).await? {
            return self.decode(doc);
        }

        let fresh = Canvas::new(self.size, &self.default_color, now);
        let doc = serde_json::to_value(&fresh)?;

        if self
            .store
            .set_if_absent(CANVAS_COLLECTION, CANVAS_KEY, doc)
            .await?
        {
            tracing::info!("Initialized {}x{} canvas", self.size, self.size);
            return Ok(fresh);
        }

        // Another initializer won the race; use its grid
        match self.store.get(CANVAS_COLLECTION, CANVAS_KEY).await? {
            Some(doc) => self.decode(doc),
            None => {
                tracing::warn!("Canvas document vanished after a lost initialization race");
                Err(StoreError::Corrupt {
                    collection: CANVAS_COLLECTION.to_string(),
                    key: CANVAS_KEY.to_string(),
                    reason: "initialization was refused but no document is stored".into(),
                })
            }
        }
    }

    fn decode(&self, doc: serde_json::Value) -> Result<Canvas, StoreError> {
        let canvas: Canvas = serde_json::from_value(doc)?;

        if !canvas.is_well_formed() || canvas.size != self.size {
            return Err(StoreError::Corrupt {
                collection: CANVAS_COLLECTION.to_string(),
                key: CANVAS_KEY.to_string(),
                reason: format!(
                    "expected a {}x{} grid, found size {}",
                    self.size, self.size, canvas.size
                ),
            });
        }

        Ok(canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn white() -> Color {
        Color::parse("#FFFFFF").unwrap()
    }

    fn canvas_store(store: Arc<MemoryStore>) -> CanvasStore {
        CanvasStore::new(store, 50, white())
    }

    #[tokio::test]
    async fn test_lazy_init_persists_default_grid() {
        let backing = Arc::new(MemoryStore::new());
        let canvas = canvas_store(Arc::clone(&backing));
        assert!(backing.is_empty());

        let snapshot = canvas.read_all(1000).await.unwrap();
        assert_eq!(snapshot.size, 50);
        assert!(snapshot.is_well_formed());
        assert_eq!(backing.len(), 1);
    }

    #[tokio::test]
    async fn test_read_is_idempotent() {
        let canvas = canvas_store(Arc::new(MemoryStore::new()));
        let first = canvas.read_all(1000).await.unwrap();
        let second = canvas.read_all(2000).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_write_cell() {
        let canvas = canvas_store(Arc::new(MemoryStore::new()));
        let red = Color::parse("#FF0000").unwrap();

        canvas.write_cell(3, 4, &red, "alice", 1000).await.unwrap();

        let snapshot = canvas.read_all(1000).await.unwrap();
        let cell = &snapshot.pixels[4][3];
        assert_eq!(cell.color, red);
        assert_eq!(cell.last_updated, 1000);
        assert_eq!(cell.last_updated_by, "alice");
        assert_eq!(snapshot.pixels[3][4].last_updated_by, "");
    }

    #[tokio::test]
    async fn test_write_out_of_bounds() {
        let canvas = canvas_store(Arc::new(MemoryStore::new()));
        let before = canvas.read_all(0).await.unwrap();

        for (x, y) in [(50, 0), (0, 50), (-1, 0), (0, -1)] {
            let result = canvas.write_cell(x, y, &white(), "alice", 10).await;
            assert!(matches!(result, Err(PlaceError::OutOfBounds { .. })));
        }

        assert_eq!(canvas.read_all(0).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_concurrent_writes_all_land() {
        let canvas = Arc::new(canvas_store(Arc::new(MemoryStore::new())));
        let red = Color::parse("#FF0000").unwrap();

        let mut handles = Vec::new();
        for i in 0..20i64 {
            let canvas = Arc::clone(&canvas);
            let red = red.clone();
            handles.push(tokio::spawn(async move {
                canvas
                    .write_cell(i, i, &red, &format!("user{}", i), 100 + i)
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let snapshot = canvas.read_all(0).await.unwrap();
        for i in 0..20usize {
            assert_eq!(snapshot.pixels[i][i].last_updated_by, format!("user{}", i));
        }
    }

    #[tokio::test]
    async fn test_concurrent_init_keeps_one_grid() {
        let backing = Arc::new(MemoryStore::new());
        let canvas = Arc::new(canvas_store(Arc::clone(&backing)));

        let a = {
            let canvas = Arc::clone(&canvas);
            tokio::spawn(async move { canvas.read_all(1).await })
        };
        let b = {
            let canvas = Arc::clone(&canvas);
            tokio::spawn(async move { canvas.read_all(2).await })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let stored = canvas.read_all(3).await.unwrap();
        assert_eq!(canvas.read_all(4).await.unwrap(), stored);
        assert_eq!(backing.len(), 1);
    }

    /// Refuses every insert but never stores anything
    struct RefusingStore;

    #[async_trait::async_trait]
    impl DocumentStore for RefusingStore {
        async fn get(
            &self,
            _collection: &str,
            _key: &str,
        ) -> Result<Option<serde_json::Value>, StoreError> {
            Ok(None)
        }

        async fn set(
            &self,
            _collection: &str,
            _key: &str,
            _value: serde_json::Value,
        ) -> Result<(), StoreError> {
            Ok(())
        }

        async fn set_if_absent(
            &self,
            _collection: &str,
            _key: &str,
            _value: serde_json::Value,
        ) -> Result<bool, StoreError> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_lost_init_without_document_is_an_error() {
        let canvas = CanvasStore::new(Arc::new(RefusingStore), 50, white());
        assert!(matches!(
            canvas.read_all(0).await,
            Err(StoreError::Corrupt { .. })
        ));

        let red = Color::parse("#FF0000").unwrap();
        assert!(matches!(
            canvas.write_cell(1, 1, &red, "alice", 0).await,
            Err(PlaceError::Storage(StoreError::Corrupt { .. }))
        ));
    }

    #[tokio::test]
    async fn test_corrupt_document() {
        let backing = Arc::new(MemoryStore::new());
        let small = Canvas::new(2, &white(), 0);
        backing
            .set(
                CANVAS_COLLECTION,
                CANVAS_KEY,
                serde_json::to_value(&small).unwrap(),
            )
            .await
            .unwrap();

        let canvas = canvas_store(backing);
        assert!(matches!(
            canvas.read_all(0).await,
            Err(StoreError::Corrupt { .. })
        ));
    }
}
