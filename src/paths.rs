use std::env;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Directory whose presence marks the top of a source checkout.
pub const REPO_MARKER: &str = ".repo";

/// Home directory of the chroot user, relative to which `trunk` is mounted.
const CHROOT_HOME: &str = "/home";

/// Name of the source tree mount point inside the chroot user's home.
const CHROOT_TRUNK: &str = "trunk";

/// Return the nearest directory at or above `path` that contains a
/// [`REPO_MARKER`] directory.
///
/// `path` defaults to the current working directory. The filesystem root
/// itself is never inspected.
pub fn find_repo_dir(path: Option<&Path>) -> Result<Option<PathBuf>> {
    let start = match path {
        Some(p) => absolutize(p)?,
        None => env::current_dir()?,
    };

    for dir in start.ancestors() {
        if dir.parent().is_none() {
            break;
        }
        if dir.join(REPO_MARKER).is_dir() {
            return Ok(Some(dir.to_path_buf()));
        }
    }
    Ok(None)
}

/// Translate a path in the host's source tree to the same location inside
/// the chroot, for the user named by `$USER`.
pub fn reinterpret_path_for_chroot(path: impl AsRef<Path>) -> Result<PathBuf> {
    let user = env::var("USER").map_err(|_| Error::MissingUser)?;
    reinterpret_path_for_user(path, &user)
}

/// Translate a host path to `/home/<user>/trunk/<path relative to the
/// source root>`, the source root being the directory holding `.repo`.
pub fn reinterpret_path_for_user(path: impl AsRef<Path>, user: &str) -> Result<PathBuf> {
    let path = path.as_ref();
    let root = find_repo_dir(Some(path))?.ok_or_else(|| Error::RepoNotFound {
        path: path.to_path_buf(),
    })?;
    chroot_path_under(&root, path, user)
}

/// Map `path` below `root` to the same location below `/home/<user>/trunk`.
///
/// The relative part is obtained by removing the root's string form from the
/// path's string form, so a root that also appears later in the path is
/// removed there too. Fails when the root does not occur in the path at all.
pub fn chroot_path_under(root: &Path, path: &Path, user: &str) -> Result<PathBuf> {
    let path_abs = absolutize(path)?.to_string_lossy().into_owned();
    let root_abs = absolutize(root)?.to_string_lossy().into_owned();

    let stripped = path_abs.replace(&root_abs, "");
    if stripped == path_abs {
        return Err(Error::OutsideSourceTree {
            path: PathBuf::from(path_abs),
        });
    }
    let relative = stripped.strip_prefix('/').unwrap_or(&stripped);

    Ok(Path::new(CHROOT_HOME)
        .join(user)
        .join(CHROOT_TRUNK)
        .join(relative))
}

/// Make `path` absolute against the current directory and fold `.` and `..`
/// components without touching the filesystem.
fn absolutize(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()?.join(path)
    };
    Ok(normalize_lexically(&joined))
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `pop` refuses to remove the root, matching `/..` == `/`.
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
