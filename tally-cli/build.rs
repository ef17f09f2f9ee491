use std::path::Path;
use std::process::Command;

/// Trimmed stdout of a successful git invocation inside `repo`.
fn git(repo: &Path, args: &[&str]) -> Option<String> {
    let out = Command::new("git").arg("-C").arg(repo).args(args).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let text = String::from_utf8(out.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_owned())
}

fn main() {
    let manifest = std::env::var_os("CARGO_MANIFEST_DIR").unwrap_or_else(|| ".".into());
    let workspace = Path::new(&manifest).join("..");

    for watched in [".git/HEAD", ".git/index"] {
        println!("cargo:rerun-if-changed={}", workspace.join(watched).display());
    }

    let build_id = match git(&workspace, &["rev-parse", "--short=10", "HEAD"]) {
        Some(sha) if git(&workspace, &["status", "--porcelain", "--untracked-files=no"]).is_some() => {
            format!("{sha}-dirty")
        }
        Some(sha) => sha,
        None => "unknown".to_owned(),
    };

    println!("cargo:rustc-env=TALLY_BUILD_SHA={build_id}");
}
