use anyhow::{Context, Result, bail};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Write the rendered report to `path`, or to stdout when none is given.
pub fn write_report(path: Option<&Path>, report: &str) -> Result<()> {
    match path {
        Some(p) => {
            if let Some(dir) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
            }
            fs::write(p, report).with_context(|| format!("write {}", p.display()))?;
            tracing::info!(file = %p.display(), bytes = report.len(), "report written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(report.as_bytes()).context("write stdout")?;
            stdout.flush().context("flush stdout")?;
        }
    }
    Ok(())
}

/// Program and leading args that open a file with the desktop's default viewer.
fn viewer_command() -> (&'static str, &'static [&'static str]) {
    if cfg!(target_os = "windows") {
        ("cmd", &["/C", "start", ""])
    } else if cfg!(target_os = "macos") {
        ("open", &[])
    } else {
        ("xdg-open", &[])
    }
}

pub fn open_in_viewer(path: &Path) -> Result<()> {
    let (program, args) = viewer_command();
    let bin = match which::which(program) {
        Ok(p) => p,
        Err(_) => bail!("{program} not found on PATH; open {} manually", path.display()),
    };

    let status = std::process::Command::new(&bin)
        .args(args)
        .arg(path)
        .status()
        .with_context(|| format!("running {}", bin.display()))?;

    if !status.success() {
        bail!("{program} failed with status: {status}");
    }
    Ok(())
}
