use tokio::sync::mpsc;

/// Lines typed by the user, in order. `None` from `recv` means stdin closed.
pub type InputLines = mpsc::UnboundedReceiver<String>;

/// Reads stdin on a dedicated thread and forwards each line.
///
/// A blocking stdin read cannot be cancelled. Keeping it off the runtime lets
/// the process exit while the thread still waits for input.
pub fn stdin_lines() -> std::io::Result<InputLines> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || {
            for line in std::io::stdin().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        log::warn!("stopped reading stdin: {err}");
                        break;
                    }
                }
            }
        })?;
    Ok(rx)
}
