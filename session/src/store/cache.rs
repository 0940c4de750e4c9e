use async_trait::async_trait;
use redis::aio::ConnectionManager;

use crate::error::Result;

/// Minimal command surface the network-backed store needs from its
/// key-value cache.
///
/// Any client exposing SET/GET/DEL/EXISTS/DBSIZE/FLUSHDB plus key
/// enumeration is substitutable; tests swap in an in-memory fake.
#[async_trait]
pub trait CacheClient: Send + Sync {
    /// Store `value` under `key` with no expiry.
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Fetch the raw bytes under `key`; `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn del(&self, key: &str) -> Result<()>;

    async fn exists(&self, key: &str) -> Result<bool>;

    /// Total number of keys in the logical database.
    async fn db_size(&self) -> Result<usize>;

    /// Drop every key in the logical database.
    async fn flush_db(&self) -> Result<()>;

    /// Enumerate every key in the logical database.
    async fn scan_keys(&self) -> Result<Vec<String>>;
}

#[async_trait]
impl CacheClient for ConnectionManager {
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let mut conn = self.clone();
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.clone();
        let value: Option<Vec<u8>> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        Ok(value)
    }

    async fn del(&self, key: &str) -> Result<()> {
        let mut conn = self.clone();
        let _: () = redis::cmd("DEL").arg(key).query_async(&mut conn).await?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.clone();
        let found: i64 = redis::cmd("EXISTS").arg(key).query_async(&mut conn).await?;
        Ok(found == 1)
    }

    async fn db_size(&self) -> Result<usize> {
        let mut conn = self.clone();
        let size: i64 = redis::cmd("DBSIZE").query_async(&mut conn).await?;
        Ok(size as usize)
    }

    async fn flush_db(&self) -> Result<()> {
        let mut conn = self.clone();
        let _: () = redis::cmd("FLUSHDB").query_async(&mut conn).await?;
        Ok(())
    }

    async fn scan_keys(&self) -> Result<Vec<String>> {
        let mut conn = self.clone();
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let (next, mut batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await?;

            keys.append(&mut batch);
            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        Ok(keys)
    }
}
