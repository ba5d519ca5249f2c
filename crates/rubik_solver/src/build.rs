// SPDX-License-Identifier: MIT OR Apache-2.0
//! Building the solver executable with `make`.
//!
//! The executable is rebuilt only when missing or when `make -q` reports
//! the target as stale.

use crate::error::BuildError;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How to build the solver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverBuild {
    /// Executable the build produces
    pub executable: PathBuf,
    /// Directory containing the Makefile
    pub make_dir: PathBuf,
    /// Make target (empty for the executable's file name)
    pub target: String,
    /// Build timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SolverBuild {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("solver/rubik-solver"),
            make_dir: PathBuf::from("solver"),
            target: String::new(),
            timeout_secs: 300,
        }
    }
}

impl SolverBuild {
    /// Build timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Target passed to `make`
    pub fn make_target(&self) -> Option<String> {
        if !self.target.is_empty() {
            return Some(self.target.clone());
        }
        self.executable
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }

    fn make_command(&self, make: &Path) -> Command {
        let mut cmd = Command::new(make);
        cmd.current_dir(&self.make_dir);
        if let Some(target) = self.make_target() {
            cmd.arg(target);
        }
        cmd
    }
}

/// What `ensure_solver_built` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The executable was already current
    UpToDate,
    /// `make` ran successfully
    Built {
        /// Time spent building
        elapsed: Duration,
    },
}

/// Make sure the solver executable exists and is current
pub fn ensure_solver_built(build: &SolverBuild) -> Result<BuildOutcome, BuildError> {
    let make = which::which("make").map_err(|_| BuildError::MakeNotFound)?;

    if build.executable.exists() && is_up_to_date(build, &make)? {
        tracing::debug!("Solver {:?} is up to date", build.executable);
        return Ok(BuildOutcome::UpToDate);
    }

    tracing::info!("Building solver in {:?}", build.make_dir);
    let start = Instant::now();

    let mut child = build
        .make_command(&make)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let output = spawn_collector(&mut child);
    let Some(status) = wait_with_deadline(&mut child, build.timeout())? else {
        // Leave the collector behind, orphaned children may still hold the pipes
        tracing::warn!("Solver build timed out after {:?}", build.timeout());
        return Err(BuildError::TimedOut(build.timeout()));
    };
    let output = output.join().unwrap_or_default();

    if !status.success() {
        return Err(BuildError::Failed {
            code: status.code(),
            output,
        });
    }

    if !build.executable.exists() {
        return Err(BuildError::Failed {
            code: status.code(),
            output: format!(
                "{output}{:?} was not produced by the build",
                build.executable
            ),
        });
    }

    let elapsed = start.elapsed();
    tracing::info!("Solver built in {:.2}s", elapsed.as_secs_f64());
    Ok(BuildOutcome::Built { elapsed })
}

/// `make -q` exits 0 when nothing needs rebuilding
fn is_up_to_date(build: &SolverBuild, make: &Path) -> Result<bool, BuildError> {
    let status = build
        .make_command(make)
        .arg("-q")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    Ok(status.success())
}

/// Collect stdout and stderr on background threads so the pipes never fill
fn spawn_collector(child: &mut Child) -> thread::JoinHandle<String> {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    thread::spawn(move || {
        let err = stderr.map(|mut pipe| {
            thread::spawn(move || {
                let mut text = String::new();
                let _ = pipe.read_to_string(&mut text);
                text
            })
        });
        let mut text = String::new();
        if let Some(mut pipe) = stdout {
            let _ = pipe.read_to_string(&mut text);
        }
        if let Some(handle) = err {
            text.push_str(&handle.join().unwrap_or_default());
        }
        text
    })
}

/// Wait for the child, killing it once `timeout` has passed.
///
/// Returns `None` when the child was killed.
fn wait_with_deadline(
    child: &mut Child,
    timeout: Duration,
) -> Result<Option<ExitStatus>, BuildError> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rubik-build-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn config(dir: &Path, makefile: &str) -> SolverBuild {
        fs::write(dir.join("Makefile"), makefile).unwrap();
        SolverBuild {
            executable: dir.join("solver"),
            make_dir: dir.to_path_buf(),
            target: String::new(),
            timeout_secs: 30,
        }
    }

    fn has_make() -> bool {
        which::which("make").is_ok()
    }

    #[test]
    fn test_builds_then_up_to_date() {
        if !has_make() {
            return;
        }
        let dir = scratch_dir("ok");
        let build = config(&dir, "solver:\n\ttouch solver\n");

        assert!(matches!(
            ensure_solver_built(&build).unwrap(),
            BuildOutcome::Built { .. }
        ));
        assert!(build.executable.exists());
        assert_eq!(ensure_solver_built(&build).unwrap(), BuildOutcome::UpToDate);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_failed_build_reports_output() {
        if !has_make() {
            return;
        }
        let dir = scratch_dir("fail");
        let build = config(&dir, "solver:\n\t@echo broken compiler >&2; exit 3\n");

        match ensure_solver_built(&build) {
            Err(BuildError::Failed { code, output }) => {
                assert_ne!(code, Some(0));
                assert!(output.contains("broken compiler"));
            }
            other => panic!("expected failure, got {other:?}"),
        }

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_executable_is_failure() {
        if !has_make() {
            return;
        }
        let dir = scratch_dir("missing");
        let build = config(&dir, "solver:\n\t@true\n");

        assert!(matches!(
            ensure_solver_built(&build),
            Err(BuildError::Failed { .. })
        ));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_target_defaults_to_executable_name() {
        let build = SolverBuild::default();
        assert_eq!(build.make_target().as_deref(), Some("rubik-solver"));

        let explicit = SolverBuild {
            target: "all".to_string(),
            ..SolverBuild::default()
        };
        assert_eq!(explicit.make_target().as_deref(), Some("all"));
    }

    #[test]
    fn test_up_to_date_checks_executable_target() {
        if !has_make() {
            return;
        }
        // The first target is unrelated, so only a named target builds the solver
        let dir = scratch_dir("target");
        let build = config(&dir, "other:\n\t@true\n\nsolver:\n\ttouch solver\n");

        assert!(matches!(
            ensure_solver_built(&build).unwrap(),
            BuildOutcome::Built { .. }
        ));
        assert_eq!(ensure_solver_built(&build).unwrap(), BuildOutcome::UpToDate);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_default_config_round_trip() {
        let build = SolverBuild::default();
        let text = ron::to_string(&build).unwrap();
        let loaded: SolverBuild = ron::from_str(&text).unwrap();
        assert_eq!(loaded, build);
        assert_eq!(build.timeout(), Duration::from_secs(300));
    }
}
