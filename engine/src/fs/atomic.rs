//! 整文件原子替换
//!
//! 新内容先写入目标目录下的匿名临时文件，fsync 后 persist
//! 到目标路径。任一步失败时临时文件随 drop 删除，目标文件
//! 保持旧内容。

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::Builder;

/// 用 `contents` 原子替换 `target`，父目录不存在时自动创建
pub async fn write_atomic(target: &Path, contents: &[u8]) -> io::Result<()> {
    let target = target.to_path_buf();
    let contents = contents.to_vec();

    tokio::task::spawn_blocking(move || replace_file(&target, &contents))
        .await
        .map_err(io::Error::other)?
}

fn replace_file(target: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = parent_dir(target)?;
    std::fs::create_dir_all(&dir)?;

    // 必须与目标同目录，rename 才不会跨文件系统
    let mut staged = Builder::new()
        .prefix(".env-vault-")
        .suffix(".tmp")
        .tempfile_in(&dir)?;

    staged.write_all(contents)?;
    staged.as_file().sync_all()?;
    staged.persist(target).map_err(|e| e.error)?;

    Ok(())
}

fn parent_dir(target: &Path) -> io::Result<PathBuf> {
    match target.parent() {
        Some(p) if p.as_os_str().is_empty() => Ok(PathBuf::from(".")),
        Some(p) => Ok(p.to_path_buf()),
        None => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "target path has no parent directory",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn replaces_existing_file_and_leaves_no_temp() {
        let dir = tempdir().expect("create temp dir");
        let target = dir.path().join(".env");
        std::fs::write(&target, "OLD=1\n").expect("seed file");

        write_atomic(&target, b"NEW=2\n").await.expect("atomic write");

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "NEW=2\n");
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn creates_missing_directories() {
        let dir = tempdir().expect("create temp dir");
        let target = dir.path().join("nested/envs/.env.dev");

        write_atomic(&target, b"A=1").await.expect("atomic write");

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "A=1");
    }

    #[tokio::test]
    async fn failed_persist_keeps_original() {
        let dir = tempdir().expect("create temp dir");
        // 目标是目录，persist 失败
        let target = dir.path().join("occupied");
        std::fs::create_dir(&target).expect("create dir");
        std::fs::write(target.join("inner"), "keep").expect("seed file");

        assert!(write_atomic(&target, b"A=1").await.is_err());

        assert!(target.is_dir());
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
