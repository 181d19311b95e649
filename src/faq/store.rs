//! FAQ 存储抽象层
//!
//! 定义统一的键→答案文本存储接口，支持内存和 SQLite 两种实现。
//!
//! 约定：
//! - 键在写入时统一转小写，同键判定一律基于小写形式；调用方负责去首尾空白
//! - alias 为拷贝语义：新键拿到源条目文本的一份拷贝，两个键此后互相独立
//! - 每个操作对并发读者表现为原子：SQLite 实现靠连接互斥锁，内存实现靠写锁

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::RwLock;

use super::error::StoreError;

/// FAQ 存储接口
#[async_trait]
pub trait FaqStore: Send + Sync {
    /// 后端存储是否已初始化
    async fn exists(&self) -> bool;

    /// （重）建空存储；破坏性操作，之前的条目全部丢弃；可重复调用
    async fn initialize(&self) -> Result<(), StoreError>;

    /// 按键查询答案文本
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// 新增条目；键已存在时返回 AlreadyExists
    async fn create(&self, key: &str, text: &str) -> Result<(), StoreError>;

    /// 更新既有条目；键不存在时返回 NotFound
    async fn update(&self, key: &str, text: &str) -> Result<(), StoreError>;

    /// 把既有条目的文本拷贝到新键下
    async fn alias(&self, existing: &str, new_key: &str) -> Result<(), StoreError>;

    /// 删除条目；键不存在时返回 NotFound
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// 全部键，按存储迭代顺序，供模糊匹配使用
    async fn keys(&self) -> Result<Vec<String>, StoreError>;
}

fn normalize(key: &str) -> String {
    key.to_lowercase()
}

/// 首次建库时写入的默认条目（历史部署沿用的领域 FAQ 文本）
pub fn default_entries() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "rates",
            "Levels 1-9: 1x\nLevels 10-29: 20x\nLevels 30-49: 35x\nLevels 50-69: 50x\n\
             Levels 70-99: 75x\nLevels 100-149: 90x\nLevels 150-250: 100x\n\
             Quest EXP: 3x\nMeso: 6 * Monster Level ~ 9 * Monster Level\n\
             Drop: Custom (use `@wd <item>` in game)",
        ),
        (
            "dll",
            "If you get an error saying a .dll file is missing, download and run this: \
             https://aka.ms/vs/16/release/vc_redist.x86.exe.",
        ),
        (
            "download",
            "To download, download the patcher at https://windia.me/download. Place this in an \
             empty folder. Before you run it, add the folder to your antivirus and Windows \
             Defender's exclusions. Then run the patcher.",
        ),
        (
            "patch",
            "To patch, run the patcher inside of your Windia folder.",
        ),
        (
            "flames",
            "Flames are items that provide extra stats to your gear. Overalls get 2x the flame \
             stats of other gears.\nMaximum eternal flame stats: ((item_level + 1) / 20) * 10\n\
             Maximum powerful flame stats: ((item_level + 1) / 20) * 7",
        ),
        (
            "cog",
            "Cog, or Chaos Scroll of Goodness, functions as a Chaos Scroll but gives +2 ~ +8 \
             stats. You can convert 100 Chaos Scrolls into 1 Cog through the pink bushes in the \
             Free Market.",
        ),
        (
            "antivirus",
            "If you get `Windia.dll was not found` or `0x0F` when launching Windia, please add \
             the game's folder to your antivirus and/or Windows Defender's exclusions then \
             re-run the patcher.",
        ),
        (
            "vote",
            "To vote, either type `@vote` in game or log into the Windia site and click the Vote \
             button at the top. You can vote 3x per day per account.",
        ),
        (
            "changepass",
            "To change your password, you must link your account in-game by typing `@discord` \
             and inputting your Discord ID into the text box. Then DM the bot `!resetpassword`.",
        ),
        (
            "legion",
            "For every 10 levels achieved on a unique class, you will obtain 1% All Stats for \
             every character. Ironman provides double legion bonuses for your account.",
        ),
    ]
}

// ── SQLite 实现 ──────────────────────────────────────────────────────────

/// SQLite 存储：表 commands(command TEXT UNIQUE, description TEXT)，逐条 CRUD 语句
///
/// 所有操作持同一把连接互斥锁，单键写入天然线性化。
pub struct SqliteFaqStore {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl SqliteFaqStore {
    /// 打开（或创建）数据库文件；首次建库时写入默认条目
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path)?;
        let store = Self {
            conn: Mutex::new(conn),
            path,
        };
        if !store.table_exists()? {
            store.recreate_table()?;
            store.seed_defaults()?;
            tracing::info!(path = %store.path.display(), "faq store created and seeded");
        }
        Ok(store)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn table_exists(&self) -> Result<bool, StoreError> {
        let conn = self.lock();
        let found: Option<String> = conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'commands'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn recreate_table(&self) -> Result<(), StoreError> {
        let conn = self.lock();
        conn.execute("DROP TABLE IF EXISTS commands", [])?;
        conn.execute(
            "CREATE TABLE commands (command TEXT UNIQUE, description TEXT)",
            [],
        )?;
        Ok(())
    }

    fn seed_defaults(&self) -> Result<(), StoreError> {
        let conn = self.lock();
        for (key, text) in default_entries() {
            conn.execute(
                "INSERT INTO commands (command, description) VALUES (?1, ?2)",
                params![key, text],
            )?;
        }
        Ok(())
    }
}

#[async_trait]
impl FaqStore for SqliteFaqStore {
    async fn exists(&self) -> bool {
        self.table_exists().unwrap_or(false)
    }

    async fn initialize(&self) -> Result<(), StoreError> {
        self.recreate_table()
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let key = normalize(key);
        let conn = self.lock();
        let text: Option<String> = conn
            .query_row(
                "SELECT description FROM commands WHERE command = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(text)
    }

    async fn create(&self, key: &str, text: &str) -> Result<(), StoreError> {
        let key = normalize(key);
        let conn = self.lock();
        let existing: Option<String> = conn
            .query_row(
                "SELECT command FROM commands WHERE command = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            return Err(StoreError::AlreadyExists(key));
        }
        conn.execute(
            "INSERT INTO commands (command, description) VALUES (?1, ?2)",
            params![key, text],
        )?;
        Ok(())
    }

    async fn update(&self, key: &str, text: &str) -> Result<(), StoreError> {
        let key = normalize(key);
        let conn = self.lock();
        let changed = conn.execute(
            "UPDATE commands SET description = ?1 WHERE command = ?2",
            params![text, key],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(key));
        }
        Ok(())
    }

    async fn alias(&self, existing: &str, new_key: &str) -> Result<(), StoreError> {
        let existing = normalize(existing);
        let new_key = normalize(new_key);
        let conn = self.lock();
        let text: Option<String> = conn
            .query_row(
                "SELECT description FROM commands WHERE command = ?1",
                params![existing],
                |row| row.get(0),
            )
            .optional()?;
        let Some(text) = text else {
            return Err(StoreError::NotFound(existing));
        };
        let taken: Option<String> = conn
            .query_row(
                "SELECT command FROM commands WHERE command = ?1",
                params![new_key],
                |row| row.get(0),
            )
            .optional()?;
        if taken.is_some() {
            return Err(StoreError::AlreadyExists(new_key));
        }
        conn.execute(
            "INSERT INTO commands (command, description) VALUES (?1, ?2)",
            params![new_key, text],
        )?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let key = normalize(key);
        let conn = self.lock();
        let changed = conn.execute("DELETE FROM commands WHERE command = ?1", params![key])?;
        if changed == 0 {
            return Err(StoreError::NotFound(key));
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT command FROM commands ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut keys = Vec::new();
        for row in rows {
            keys.push(row?);
        }
        Ok(keys)
    }
}

// ── 内存实现 ─────────────────────────────────────────────────────────────

/// 内存存储：测试与 SQLite 不可用时的回退
pub struct MemoryFaqStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryFaqStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// 预置默认条目的内存存储
    pub fn with_defaults() -> Self {
        let mut entries = HashMap::new();
        for (key, text) in default_entries() {
            entries.insert(key.to_string(), text.to_string());
        }
        Self {
            entries: RwLock::new(entries),
        }
    }
}

impl Default for MemoryFaqStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FaqStore for MemoryFaqStore {
    async fn exists(&self) -> bool {
        true
    }

    async fn initialize(&self) -> Result<(), StoreError> {
        self.entries.write().await.clear();
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(&normalize(key)).cloned())
    }

    async fn create(&self, key: &str, text: &str) -> Result<(), StoreError> {
        let key = normalize(key);
        let mut entries = self.entries.write().await;
        if entries.contains_key(&key) {
            return Err(StoreError::AlreadyExists(key));
        }
        entries.insert(key, text.to_string());
        Ok(())
    }

    async fn update(&self, key: &str, text: &str) -> Result<(), StoreError> {
        let key = normalize(key);
        let mut entries = self.entries.write().await;
        match entries.get_mut(&key) {
            Some(slot) => {
                *slot = text.to_string();
                Ok(())
            }
            None => Err(StoreError::NotFound(key)),
        }
    }

    async fn alias(&self, existing: &str, new_key: &str) -> Result<(), StoreError> {
        let existing = normalize(existing);
        let new_key = normalize(new_key);
        let mut entries = self.entries.write().await;
        let Some(text) = entries.get(&existing).cloned() else {
            return Err(StoreError::NotFound(existing));
        };
        if entries.contains_key(&new_key) {
            return Err(StoreError::AlreadyExists(new_key));
        }
        entries.insert(new_key, text);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let key = normalize(key);
        match self.entries.write().await.remove(&key) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(key)),
        }
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        // HashMap 无序，排序后返回，保证迭代顺序稳定
        let mut keys: Vec<String> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

/// 创建 FAQ 存储
///
/// 给定 db_path 时使用 SQLite；打开失败则告警并回退到预置默认条目的内存存储。
pub fn create_faq_store(db_path: Option<&Path>) -> std::sync::Arc<dyn FaqStore> {
    if let Some(path) = db_path {
        match SqliteFaqStore::open(path) {
            Ok(store) => {
                tracing::info!("Using sqlite faq store: {:?}", path);
                return std::sync::Arc::new(store);
            }
            Err(e) => {
                tracing::warn!("Failed to open sqlite store, falling back to memory: {}", e);
            }
        }
    }

    tracing::info!("Using in-memory faq store");
    std::sync::Arc::new(MemoryFaqStore::with_defaults())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let store = MemoryFaqStore::new();
        store.create("Rates", "exp rates").await.unwrap();
        assert_eq!(store.get("rates").await.unwrap().as_deref(), Some("exp rates"));
        // 查询侧同样大小写不敏感
        assert_eq!(store.get("RATES").await.unwrap().as_deref(), Some("exp rates"));
    }

    #[tokio::test]
    async fn test_create_duplicate_keeps_first_value() {
        let store = MemoryFaqStore::new();
        store.create("rates", "first").await.unwrap();
        let err = store.create("rates", "second").await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
        assert_eq!(store.get("rates").await.unwrap().as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_update_missing_key() {
        let store = MemoryFaqStore::new();
        let err = store.update("ghost", "text").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_alias_copies_independently() {
        let store = MemoryFaqStore::new();
        store.create("rates", "v1").await.unwrap();
        store.alias("rates", "exp").await.unwrap();
        // 更新源键不影响别名键
        store.update("rates", "v2").await.unwrap();
        assert_eq!(store.get("exp").await.unwrap().as_deref(), Some("v1"));
        assert_eq!(store.get("rates").await.unwrap().as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn test_alias_source_missing_and_target_taken() {
        let store = MemoryFaqStore::new();
        store.create("a", "1").await.unwrap();
        store.create("b", "2").await.unwrap();
        assert!(matches!(
            store.alias("ghost", "c").await.unwrap_err(),
            StoreError::NotFound(_)
        ));
        assert!(matches!(
            store.alias("a", "b").await.unwrap_err(),
            StoreError::AlreadyExists(_)
        ));
    }

    #[tokio::test]
    async fn test_initialize_idempotent() {
        let store = MemoryFaqStore::with_defaults();
        store.initialize().await.unwrap();
        assert!(store.keys().await.unwrap().is_empty());
        store.initialize().await.unwrap();
        assert!(store.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sqlite_first_open_seeds_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faq.db");
        let store = SqliteFaqStore::open(&path).unwrap();
        assert!(store.exists().await);
        let keys = store.keys().await.unwrap();
        assert!(keys.len() >= 7);
        assert!(keys.contains(&"rates".to_string()));
    }

    #[tokio::test]
    async fn test_sqlite_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faq.db");
        {
            let store = SqliteFaqStore::open(&path).unwrap();
            store.create("custom", "answer").await.unwrap();
        }
        let store = SqliteFaqStore::open(&path).unwrap();
        assert_eq!(store.get("custom").await.unwrap().as_deref(), Some("answer"));
    }

    #[tokio::test]
    async fn test_sqlite_full_crud_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteFaqStore::open(dir.path().join("faq.db")).unwrap();
        store.initialize().await.unwrap();
        assert!(store.keys().await.unwrap().is_empty());

        store.create("Patch", "run the patcher").await.unwrap();
        assert!(matches!(
            store.create("patch", "again").await.unwrap_err(),
            StoreError::AlreadyExists(_)
        ));
        store.update("patch", "run it inside the folder").await.unwrap();
        store.alias("patch", "patcher").await.unwrap();
        store.update("patch", "changed").await.unwrap();
        assert_eq!(
            store.get("patcher").await.unwrap().as_deref(),
            Some("run it inside the folder")
        );
        store.delete("patch").await.unwrap();
        assert!(store.get("patch").await.unwrap().is_none());
        assert!(matches!(
            store.delete("patch").await.unwrap_err(),
            StoreError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_sqlite_keys_follow_insertion_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteFaqStore::open(dir.path().join("faq.db")).unwrap();
        store.initialize().await.unwrap();
        store.create("zeta", "1").await.unwrap();
        store.create("alpha", "2").await.unwrap();
        assert_eq!(store.keys().await.unwrap(), vec!["zeta", "alpha"]);
    }
}
