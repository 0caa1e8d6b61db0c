use eyre::Context as _;
use std::{fs, path::Path};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt as _;

pub const MODE_DIR_PRIVATE: u32 = 0o700;

fn is_symlink(p: &Path) -> eyre::Result<bool> {
    let md = fs::symlink_metadata(p).with_context(|| format!("stat {}", p.display()))?;
    Ok(md.file_type().is_symlink())
}

/// Creates `dir` if absent and clamps it to owner-only permissions.
///
/// Refuses symlinked directories; the wallet database must not be silently
/// redirected elsewhere.
pub fn ensure_private_dir(dir: &Path) -> eyre::Result<()> {
    if dir.exists() {
        if is_symlink(dir)? {
            eyre::bail!("refusing to use symlinked directory: {}", dir.display());
        }
        let md = fs::metadata(dir).with_context(|| format!("stat {}", dir.display()))?;
        if !md.is_dir() {
            eyre::bail!("expected directory at {}", dir.display());
        }
    } else {
        fs::create_dir_all(dir).with_context(|| format!("create dir {}", dir.display()))?;
    }

    // Best-effort: enforce private perms on Unix.
    #[cfg(unix)]
    {
        let md = fs::metadata(dir).with_context(|| format!("stat {}", dir.display()))?;
        let mut mode = md.permissions().mode();
        // If group/other have any bits set, clamp to 0700.
        if (mode & 0o077) != 0 {
            mode = MODE_DIR_PRIVATE;
            fs::set_permissions(dir, fs::Permissions::from_mode(mode))
                .with_context(|| format!("chmod {:o} {}", mode, dir.display()))?;
        }
    }

    Ok(())
}
