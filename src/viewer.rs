use std::path::Path;
use std::process::{Command, Stdio};

/// 既定のブラウザでファイルを開くコマンド
pub fn browser_command(path: &Path) -> Command {
    let mut command = if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else if cfg!(target_os = "macos") {
        Command::new("open")
    } else {
        Command::new("xdg-open")
    };
    command
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    command
}

/// ブラウザを起動する。終了は待たない
///
/// 失敗しても出力ファイルは残っているので、警告のみ出して処理を続ける。
pub fn open_in_browser(path: &Path) -> bool {
    match browser_command(path).spawn() {
        Ok(_) => {
            tracing::info!("Opened in browser: {:?}", path);
            true
        }
        Err(e) => {
            tracing::warn!("Failed to open browser for {:?}: {}", path, e);
            false
        }
    }
}
