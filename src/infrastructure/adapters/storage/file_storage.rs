//! File Storage - 会话临时音频文件
//!
//! 实现 AudioStoragePort trait。所有文件写在会话私有的临时目录中，
//! 目录随 FileAudioStorage 一起 drop，无论会话如何结束都会被删除

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::fs;

use crate::application::ports::{AudioStorageError, AudioStoragePort};
use crate::domain::voice::AudioFormat;

/// 临时目录名前缀
const TEMP_DIR_PREFIX: &str = "ivrtts_";

/// 文件系统音频存储
pub struct FileAudioStorage {
    /// 会话临时目录（drop 时删除）
    dir: TempDir,
}

impl FileAudioStorage {
    /// 在 base_dir 下创建会话临时目录，None 时使用系统临时目录
    pub fn new(base_dir: Option<&Path>) -> Result<Self, AudioStorageError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_DIR_PREFIX);

        let dir = match base_dir {
            Some(base) => builder.tempdir_in(base),
            None => builder.tempdir(),
        }
        .map_err(|e| AudioStorageError::IoError(e.to_string()))?;

        tracing::debug!(dir = %dir.path().display(), "Session temp dir created");
        Ok(Self { dir })
    }

    /// 获取会话临时目录
    pub fn base_dir(&self) -> &Path {
        self.dir.path()
    }

    fn get_audio_path(&self, segment_index: usize, format: AudioFormat) -> PathBuf {
        self.dir
            .path()
            .join(format!("segment_{}.{}", segment_index, format.extension()))
    }
}

#[async_trait]
impl AudioStoragePort for FileAudioStorage {
    async fn save_audio(
        &self,
        segment_index: usize,
        format: AudioFormat,
        data: &[u8],
    ) -> Result<PathBuf, AudioStorageError> {
        let audio_path = self.get_audio_path(segment_index, format);

        fs::write(&audio_path, data)
            .await
            .map_err(|e| AudioStorageError::IoError(e.to_string()))?;

        tracing::debug!(
            "Saved audio: segment={}, size={} bytes",
            segment_index,
            data.len()
        );

        Ok(audio_path)
    }

    async fn delete_audio(&self, path: &Path) -> Result<(), AudioStorageError> {
        match fs::remove_file(path).await {
            Ok(()) => {
                tracing::debug!("Deleted audio: {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AudioStorageError::IoError(e.to_string())),
        }
    }
}
