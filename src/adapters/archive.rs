use crate::utils::error::{MoittError, Result};
use flate2::read::GzDecoder;
use std::fs;
use std::path::Path;

/// Unpacks a `.tar.gz` into `dest`, creating it when missing.
pub async fn unpack_tar_gz(archive: &Path, dest: &Path) -> Result<()> {
    let archive = archive.to_path_buf();
    let dest = dest.to_path_buf();

    tokio::task::spawn_blocking(move || unpack_blocking(&archive, &dest))
        .await
        .map_err(|e| MoittError::ArchiveError {
            message: format!("unpack task failed: {}", e),
        })?
}

fn unpack_blocking(archive: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest)?;
    let file = fs::File::open(archive)?;
    let mut tarball = tar::Archive::new(GzDecoder::new(file));
    tarball
        .unpack(dest)
        .map_err(|e| MoittError::ArchiveError {
            message: format!("failed to unpack {}: {}", archive.display(), e),
        })?;
    tracing::debug!("Unpacked {} into {}", archive.display(), dest.display());
    Ok(())
}

/// 搬移檔案；跨檔案系統時改用複製後刪除
pub fn move_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    if fs::rename(from, to).is_err() {
        copy_then_remove(from, to)?;
    }
    Ok(())
}

/// 複製後刪除；符號連結照原目標重建，不跟隨連結
fn copy_then_remove(from: &Path, to: &Path) -> Result<()> {
    if fs::symlink_metadata(from)?.file_type().is_symlink() {
        let target = fs::read_link(from)?;
        if fs::symlink_metadata(to).is_ok() {
            fs::remove_file(to)?;
        }
        symlink(&target, to)?;
    } else {
        fs::copy(from, to)?;
    }
    fs::remove_file(from)?;
    Ok(())
}

#[cfg(unix)]
pub fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
pub fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

/// Creates the directory and applies `mode` to it.
pub fn create_dir_with_mode(path: &Path, mode: u32) -> Result<()> {
    fs::create_dir_all(path)?;
    set_mode(path, mode)
}

#[cfg(unix)]
pub fn symlink(target: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link)?;
    Ok(())
}

#[cfg(not(unix))]
pub fn symlink(target: &Path, link: &Path) -> Result<()> {
    let base = link.parent().unwrap_or_else(|| Path::new("."));
    fs::copy(base.join(target), link)?;
    Ok(())
}
