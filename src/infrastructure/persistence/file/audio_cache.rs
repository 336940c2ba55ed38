//! File-based Audio Cache Implementation
//!
//! 缓存文件: `{dir}/{md5}.{ext}`，原始无头音频。
//! 文件存在即视为有效，不过期、不淘汰、不校验；多个进程共享同一目录，不加锁

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use crate::application::ports::{AudioCachePort, CacheError, CACHE_KEY_LEN};
use crate::domain::voice::AudioFormat;

/// 控制端协议的单行长度上限
pub const MAX_COMMAND_LINE: usize = 4096;

/// 文件缓存配置
#[derive(Debug, Clone)]
pub struct FileCacheConfig {
    pub enabled: bool,
    /// 缓存目录
    pub dir: PathBuf,
}

impl Default for FileCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from("/var/spool/asterisk/tmp/ivrtts"),
        }
    }
}

/// 缓存路径最长可能长度
fn max_cache_path_len(dir: &Path) -> usize {
    // dir + '/' + key + '.' + ext
    dir.as_os_str().len() + 1 + CACHE_KEY_LEN + 1 + AudioFormat::MAX_EXTENSION_LEN
}

/// 文件音频缓存
pub struct FileAudioCache {
    /// None 表示本次会话不使用缓存
    dir: Option<PathBuf>,
}

impl FileAudioCache {
    /// 创建缓存实例
    ///
    /// 路径过长或目录无法创建时禁用缓存并告警，不返回错误
    pub fn new(config: &FileCacheConfig) -> Self {
        if !config.enabled {
            tracing::debug!("Audio cache disabled by configuration");
            return Self::disabled();
        }

        let max_len = max_cache_path_len(&config.dir);
        if max_len > MAX_COMMAND_LINE {
            tracing::warn!(
                dir = %config.dir.display(),
                max_len = max_len,
                "Cache path too long for control protocol, disabling cache"
            );
            return Self::disabled();
        }

        if let Err(e) = std::fs::create_dir_all(&config.dir) {
            tracing::warn!(
                dir = %config.dir.display(),
                error = %e,
                "Failed to create cache directory, disabling cache"
            );
            return Self::disabled();
        }

        tracing::debug!(dir = %config.dir.display(), "FileAudioCache initialized");
        Self {
            dir: Some(config.dir.clone()),
        }
    }

    pub fn disabled() -> Self {
        Self { dir: None }
    }

    /// 缓存文件路径
    pub fn cache_path(&self, cache_key: &str, format: AudioFormat) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.{}", cache_key, format.extension())))
    }

    /// rename 失败时（如跨文件系统）先复制到缓存目录内的临时名，再 rename
    async fn copy_into_place(temp_path: &Path, target: &Path) -> std::io::Result<()> {
        let staging = target.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        fs::copy(temp_path, &staging).await?;
        if let Err(e) = fs::rename(&staging, target).await {
            let _ = fs::remove_file(&staging).await;
            return Err(e);
        }
        let _ = fs::remove_file(temp_path).await;
        Ok(())
    }
}

#[async_trait]
impl AudioCachePort for FileAudioCache {
    fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    async fn lookup(&self, cache_key: &str, format: AudioFormat) -> Option<PathBuf> {
        let path = self.cache_path(cache_key, format)?;

        // 能打开即视为可读
        match fs::File::open(&path).await {
            Ok(_) => Some(path),
            Err(_) => None,
        }
    }

    async fn store(
        &self,
        temp_path: &Path,
        cache_key: &str,
        format: AudioFormat,
    ) -> Result<PathBuf, CacheError> {
        let target = self
            .cache_path(cache_key, format)
            .ok_or(CacheError::Disabled)?;

        if let Err(e) = fs::rename(temp_path, &target).await {
            tracing::debug!(error = %e, "Rename into cache failed, copying instead");
            Self::copy_into_place(temp_path, &target)
                .await
                .map_err(|e| CacheError::IoError(e.to_string()))?;
        }

        tracing::debug!(cache_key = %cache_key, path = %target.display(), "Audio cached");
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::generate_cache_key;
    use crate::domain::voice::{Gender, Language};
    use tempfile::tempdir;

    fn cache_in(dir: &Path) -> FileAudioCache {
        FileAudioCache::new(&FileCacheConfig {
            enabled: true,
            dir: dir.to_path_buf(),
        })
    }

    #[tokio::test]
    async fn test_store_then_lookup() {
        let cache_dir = tempdir().unwrap();
        let work_dir = tempdir().unwrap();
        let cache = cache_in(cache_dir.path());
        assert!(cache.is_enabled());

        let language = Language::parse("en-US").unwrap();
        let key = generate_cache_key("Hello", &language, Gender::Female, AudioFormat::Narrowband);
        assert!(cache.lookup(&key, AudioFormat::Narrowband).await.is_none());

        let temp = work_dir.path().join("segment_0.sln");
        std::fs::write(&temp, [9u8, 8, 7]).unwrap();

        let stored = cache.store(&temp, &key, AudioFormat::Narrowband).await.unwrap();
        assert_eq!(stored, cache_dir.path().join(format!("{}.sln", key)));
        assert!(!temp.exists());

        let found = cache.lookup(&key, AudioFormat::Narrowband).await.unwrap();
        assert_eq!(found, stored);
        assert_eq!(std::fs::read(found).unwrap(), vec![9, 8, 7]);

        // 同一 key 不同格式不命中
        assert!(cache.lookup(&key, AudioFormat::Wideband).await.is_none());
    }

    #[tokio::test]
    async fn test_store_same_key_twice_overwrites() {
        let cache_dir = tempdir().unwrap();
        let work_dir = tempdir().unwrap();
        let cache = cache_in(cache_dir.path());

        for content in [[1u8], [2u8]] {
            let temp = work_dir.path().join("segment.sln16");
            std::fs::write(&temp, content).unwrap();
            cache.store(&temp, "abc", AudioFormat::Wideband).await.unwrap();
        }

        let found = cache.lookup("abc", AudioFormat::Wideband).await.unwrap();
        assert_eq!(std::fs::read(found).unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn test_missing_temp_file_is_error() {
        let cache_dir = tempdir().unwrap();
        let cache = cache_in(cache_dir.path());
        let result = cache
            .store(Path::new("/nonexistent/segment.sln"), "abc", AudioFormat::Narrowband)
            .await;
        assert!(matches!(result, Err(CacheError::IoError(_))));
    }

    #[test]
    fn test_creates_missing_directory() {
        let base = tempdir().unwrap();
        let dir = base.path().join("nested").join("cache");
        let cache = cache_in(&dir);
        assert!(cache.is_enabled());
        assert!(dir.is_dir());
    }

    #[tokio::test]
    async fn test_overlong_directory_disables_cache() {
        let dir = PathBuf::from(format!("/{}", "d".repeat(MAX_COMMAND_LINE)));
        let cache = cache_in(&dir);
        assert!(!cache.is_enabled());
        assert!(cache.lookup("abc", AudioFormat::Narrowband).await.is_none());
        assert!(matches!(
            cache.store(Path::new("/tmp/x.sln"), "abc", AudioFormat::Narrowband).await,
            Err(CacheError::Disabled)
        ));
    }

    #[test]
    fn test_disabled_by_config() {
        let cache = FileAudioCache::new(&FileCacheConfig {
            enabled: false,
            dir: PathBuf::from("/tmp"),
        });
        assert!(!cache.is_enabled());
    }
}
