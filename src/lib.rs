//! Shell-command helpers for build scripts.
//!
//! * [`process`] runs external commands ([`RunCommand`]),
//! * [`color`] wraps text in ANSI escapes ([`Colorizer`]),
//! * [`log`] prints leveled diagnostics to stderr ([`info`], [`warning`], [`die`]),
//! * [`paths`] locates the source checkout and maps paths into the chroot.
//!
//! ```no_run
//! use buildhelp::{info, RunCommand};
//!
//! let rev = RunCommand::new("git rev-parse HEAD")
//!     .redirect_stdout(true)
//!     .caller("build_image")
//!     .output()?;
//! info(&format!("building {}", rev.trim()));
//! # Ok::<(), buildhelp::Error>(())
//! ```

pub mod color;
pub mod error;
pub mod log;
pub mod paths;
pub mod process;

pub use color::{Color, Colorizer};
pub use error::{Error, Result};
pub use log::{die, info, warning};
pub use paths::{
    chroot_path_under, find_repo_dir, reinterpret_path_for_chroot, reinterpret_path_for_user,
};
pub use process::{CommandLine, CommandOutput, RunCommand};
