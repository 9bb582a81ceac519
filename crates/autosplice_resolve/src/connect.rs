//! Connection bootstrap: find the scripting module, launch the host if
//! needed, and retry `scriptapp` until the host answers.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

use pyo3::prelude::*;
use pyo3::types::{PyList, PyModule};
use thiserror::Error;
use tracing::{debug, info, warn};

use autosplice_core::config::HostSettings;

use crate::handles::ResolveApp;

/// Failures while establishing the host connection.
#[derive(Error, Debug)]
pub enum ConnectError {
    /// The scripting module could not be imported.
    #[error("could not import the host scripting module: {0}")]
    ScriptModule(String),

    /// The host never answered within the retry budget.
    #[error("host did not answer after {attempts} connection attempts")]
    Unavailable { attempts: u32 },

    /// Interpreter-level failure outside a scripting call.
    #[error("python error during connection: {0}")]
    Python(#[from] PyErr),
}

/// Connect to a running host, launching one if none answers at first.
///
/// Connection sequence:
/// 1. Extend `sys.path` with the scripting-module locations
///    (`RESOLVE_SCRIPT_API` first, then the per-platform installs).
/// 2. Import `DaVinciResolveScript`.
/// 3. Call `scriptapp("Resolve")`; on the first miss, spawn the host
///    executable and wait out the launch grace period.
/// 4. Keep retrying on the configured interval until the budget runs out.
pub fn connect(settings: &HostSettings) -> Result<ResolveApp, ConnectError> {
    pyo3::prepare_freethreaded_python();

    let module: Py<PyModule> = Python::with_gil(|py| {
        extend_sys_path(py)?;
        PyModule::import(py, "DaVinciResolveScript")
            .map(Bound::unbind)
            .map_err(|e| ConnectError::ScriptModule(e.to_string()))
    })?;

    let attempts = settings.connect_retries.max(1);
    let interval = Duration::from_secs(settings.connect_interval_secs);
    let mut launched = false;

    for attempt in 1..=attempts {
        let resolve = Python::with_gil(|py| -> Result<Option<ResolveApp>, ConnectError> {
            let handle = module
                .bind(py)
                .call_method1("scriptapp", ("Resolve",))?;
            if handle.is_none() {
                return Ok(None);
            }
            match ResolveApp::new(py, handle.unbind()) {
                Ok(app) => Ok(Some(app)),
                Err(e) => {
                    // Host answered but its object graph is not up yet.
                    debug!("host answered but is not ready: {}", e);
                    Ok(None)
                }
            }
        })?;

        if let Some(app) = resolve {
            info!("connected to the host (attempt {}/{})", attempt, attempts);
            return Ok(app);
        }

        if !launched {
            launched = true;
            if launch_host() {
                info!(
                    "waiting {}s for the host to come up",
                    settings.launch_grace_secs
                );
                std::thread::sleep(Duration::from_secs(settings.launch_grace_secs));
                continue;
            }
            warn!("no host executable found, waiting for one to be started manually");
        }

        if attempt < attempts {
            debug!("host not answering (attempt {}/{})", attempt, attempts);
            std::thread::sleep(interval);
        }
    }

    Err(ConnectError::Unavailable { attempts })
}

/// Add the scripting-module directories to `sys.path`.
fn extend_sys_path(py: Python<'_>) -> Result<(), ConnectError> {
    let sys = PyModule::import(py, "sys")?;
    let path_attr = sys.getattr("path")?;
    let sys_path = path_attr
        .downcast::<PyList>()
        .map_err(|e| ConnectError::ScriptModule(e.to_string()))?;

    for candidate in script_module_candidates() {
        if !candidate.is_dir() {
            continue;
        }
        let entry = candidate.to_string_lossy().to_string();
        let present = sys_path.iter().any(|p| {
            p.extract::<String>()
                .map(|existing| existing == entry)
                .unwrap_or(false)
        });
        if !present {
            debug!("adding scripting module path {}", entry);
            sys_path.append(entry)?;
        }
    }
    Ok(())
}

/// Scripting-module locations, environment override first.
fn script_module_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(api_dir) = std::env::var("RESOLVE_SCRIPT_API") {
        candidates.push(PathBuf::from(api_dir).join("Modules"));
    }

    if cfg!(target_os = "windows") {
        candidates.push(PathBuf::from(
            r"C:\ProgramData\Blackmagic Design\DaVinci Resolve\Support\Developer\Scripting\Modules",
        ));
        candidates.push(PathBuf::from(
            r"C:\Program Files\Blackmagic Design\DaVinci Resolve\Developer\Scripting\Modules",
        ));
    } else if cfg!(target_os = "macos") {
        candidates.push(PathBuf::from(
            "/Library/Application Support/Blackmagic Design/DaVinci Resolve/Developer/Scripting/Modules",
        ));
    } else {
        candidates.push(PathBuf::from("/opt/resolve/Developer/Scripting/Modules"));
        candidates.push(PathBuf::from("/home/resolve/Developer/Scripting/Modules"));
    }
    candidates
}

/// Host executable locations per platform.
fn host_executable_candidates() -> Vec<PathBuf> {
    if cfg!(target_os = "windows") {
        vec![
            PathBuf::from(r"C:\Program Files\Blackmagic Design\DaVinci Resolve\Resolve.exe"),
            PathBuf::from(r"C:\Program Files (x86)\Blackmagic Design\DaVinci Resolve\Resolve.exe"),
        ]
    } else if cfg!(target_os = "macos") {
        vec![PathBuf::from(
            "/Applications/DaVinci Resolve/DaVinci Resolve.app/Contents/MacOS/Resolve",
        )]
    } else {
        vec![
            PathBuf::from("/opt/resolve/bin/resolve"),
            PathBuf::from("/usr/bin/resolve"),
        ]
    }
}

/// Spawn the host detached; returns whether an executable was found.
fn launch_host() -> bool {
    for exe in host_executable_candidates() {
        if !exe.is_file() {
            continue;
        }
        info!("launching host: {}", exe.display());
        match Command::new(&exe)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(_) => return true,
            Err(e) => warn!("could not launch {}: {}", exe.display(), e),
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_override_comes_first() {
        std::env::set_var("RESOLVE_SCRIPT_API", "/tmp/resolve-api");
        let candidates = script_module_candidates();
        assert_eq!(candidates[0], PathBuf::from("/tmp/resolve-api/Modules"));
        std::env::remove_var("RESOLVE_SCRIPT_API");
    }

    #[test]
    fn executable_candidates_are_absolute() {
        assert!(host_executable_candidates()
            .iter()
            .all(|p| p.is_absolute()));
    }
}
