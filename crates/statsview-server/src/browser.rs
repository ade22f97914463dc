//! Opening the dashboard in the user's browser.

use std::io;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::JoinHandle;

#[cfg(target_os = "macos")]
const OPENER: (&str, &[&str]) = ("open", &[]);
#[cfg(target_os = "windows")]
const OPENER: (&str, &[&str]) = ("cmd", &["/C", "start", ""]);
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const OPENER: (&str, &[&str]) = ("xdg-open", &[]);

/// Launch the platform opener for `url` without waiting for it.
///
/// Failures are logged; the dashboard keeps serving either way.
pub fn open(url: &str) {
    let (program, args) = OPENER;
    match launch(program, args, url) {
        Ok(_) => log::info!("opened {url} in the browser"),
        Err(e) => log::warn!("could not open browser with {program}: {e}"),
    }
}

/// Spawn `program args.. url` and reap it on a background thread, so the
/// opener never lingers as a zombie.
fn launch(
    program: &str,
    args: &[&str],
    url: &str,
) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    let mut child = Command::new(program)
        .args(args)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    let program = program.to_string();
    Ok(std::thread::spawn(move || {
        let status = child.wait();
        match &status {
            Ok(s) if !s.success() => log::debug!("{program} exited with {s}"),
            Err(e) => log::debug!("waiting for {program}: {e}"),
            Ok(_) => {}
        }
        status
    }))
}
