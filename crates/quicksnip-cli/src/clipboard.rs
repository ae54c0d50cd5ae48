use anyhow::{bail, Context, Result};
use std::io::Write;
use std::process::{Command, Stdio};

/// Copies text to the system clipboard in an OS-specific way.
/// - macOS: uses pbcopy
/// - Linux: uses xclip or xsel
/// - Windows: uses clip.exe
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        pipe_into(Command::new("pbcopy"), "pbcopy", text)
    }

    #[cfg(target_os = "linux")]
    {
        copy_linux(text)
    }

    #[cfg(target_os = "windows")]
    {
        pipe_into(Command::new("clip"), "clip", text)
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        let _ = text;
        bail!("Clipboard not supported on this platform")
    }
}

#[cfg(target_os = "linux")]
fn copy_linux(text: &str) -> Result<()> {
    let mut xclip = Command::new("xclip");
    xclip.args(["-selection", "clipboard"]);
    match pipe_into(xclip, "xclip", text) {
        Ok(()) => Ok(()),
        Err(first) => {
            // Try xsel as fallback
            let mut xsel = Command::new("xsel");
            xsel.args(["--clipboard", "--input"]);
            pipe_into(xsel, "xsel", text).with_context(|| {
                format!("{:#}. Install xclip or xsel, or use --print", first)
            })
        }
    }
}

/// Spawns `command`, writes `text` to its stdin and waits for it.
fn pipe_into(mut command: Command, label: &str, text: &str) -> Result<()> {
    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to spawn {}", label))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .with_context(|| format!("Failed to write to {}", label))?;
    }

    let status = child
        .wait()
        .with_context(|| format!("Failed to wait for {}", label))?;

    if !status.success() {
        bail!("{} exited with error", label);
    }
    Ok(())
}
