use chrono::Local;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;

/// セッション記録ファイル
///
/// 現状は開始マーカーを書くだけで、フィット結果の書き出しと再生は行わない。
pub struct Recorder {
    path: PathBuf,
    file: Option<BufWriter<File>>,
}

impl Recorder {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            file: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_recording(&self) -> bool {
        self.file.is_some()
    }

    /// ファイルを切り詰めて開始マーカーを書く。記録中なら何もしない
    pub fn start(&mut self) -> Result<()> {
        if self.file.is_some() {
            return Ok(());
        }
        let mut file = BufWriter::new(File::create(&self.path)?);
        write!(file, "// Starting recording at {}", Local::now().format("%c"))?;
        file.flush()?;
        info!(path = %self.path.display(), "recording started");
        self.file = Some(file);
        Ok(())
    }

    pub fn stop(&mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
            info!(path = %self.path.display(), "recording stopped");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_writes_marker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rec.txt");
        std::fs::write(&path, "old contents that must disappear").unwrap();

        let mut rec = Recorder::new(&path);
        rec.start().unwrap();
        assert!(rec.is_recording());
        rec.stop().unwrap();
        assert!(!rec.is_recording());

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("// Starting recording at "));
        assert!(!text.contains("old contents"));
    }

    #[test]
    fn test_stop_without_start() {
        let dir = tempfile::tempdir().unwrap();
        let mut rec = Recorder::new(dir.path().join("never.txt"));
        rec.stop().unwrap();
        assert!(!rec.path().exists());
    }
}
