#[cfg(target_os = "windows")]
use std::os::windows::process::CommandExt;
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::errors::{BackendError, Result};

#[cfg(target_os = "windows")]
const CREATE_NO_WINDOW: u32 = 0x08000000;

const TOAST_TAG: &str = "OnlineFix";
const TOAST_APP_NAME: &str = "Steam - OnlineFix";

pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str, timeout: Duration) -> Result<()>;
}

/// Writes notifications to the log only. Used headless and off Windows.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, message: &str, _timeout: Duration) -> Result<()> {
        tracing::info!("NOTIFICATION: {} - {}", title, message);
        Ok(())
    }
}

/// Windows toast through a hidden PowerShell process.
#[derive(Clone, Copy, Debug, Default)]
pub struct ToastNotifier;

impl Notifier for ToastNotifier {
    fn notify(&self, title: &str, message: &str, timeout: Duration) -> Result<()> {
        let script = toast_script(title, message, timeout);
        let mut command = Command::new("powershell");
        command
            .args(["-WindowStyle", "Hidden", "-Command", &script])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        hide_console_window(&mut command);

        command.spawn()?;
        tracing::info!("Notification shown: {} - {}", title, message);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub timeout: Duration,
}

/// Keeps notifications in memory so callers can inspect what would have
/// been shown. Can be told to fail every call.
#[derive(Clone, Debug, Default)]
pub struct MemoryNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
    fail: bool,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            sent: Arc::default(),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, title: &str, message: &str, timeout: Duration) -> Result<()> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(Notification {
                title: title.to_string(),
                message: message.to_string(),
                timeout,
            });
        }
        if self.fail {
            return Err(BackendError::Config("notification backend unavailable".to_string()));
        }
        Ok(())
    }
}

pub fn default_notifier(enabled: bool) -> Arc<dyn Notifier> {
    if enabled && cfg!(target_os = "windows") {
        Arc::new(ToastNotifier)
    } else {
        Arc::new(LogNotifier)
    }
}

#[inline]
fn hide_console_window(command: &mut Command) {
    #[cfg(target_os = "windows")]
    {
        command.creation_flags(CREATE_NO_WINDOW);
    }
    #[cfg(not(target_os = "windows"))]
    {
        let _ = command;
    }
}

fn escape_powershell(text: &str) -> String {
    text.replace('"', "`\"").replace('\'', "''")
}

fn toast_script(title: &str, message: &str, timeout: Duration) -> String {
    let title = escape_powershell(title);
    let message = escape_powershell(message);
    let seconds = timeout.as_secs().max(1);
    format!(
        r#"
[Windows.UI.Notifications.ToastNotificationManager, Windows.UI.Notifications, ContentType = WindowsRuntime] > $null
$Template = [Windows.UI.Notifications.ToastNotificationManager]::GetTemplateContent([Windows.UI.Notifications.ToastTemplateType]::ToastText02)

$RawXml = [xml] $Template.GetXml()
($RawXml.toast.visual.binding.text|where {{$_.id -eq "1"}}).AppendChild($RawXml.CreateTextNode("{title}")) > $null
($RawXml.toast.visual.binding.text|where {{$_.id -eq "2"}}).AppendChild($RawXml.CreateTextNode("{message}")) > $null

$SerializedXml = New-Object Windows.Data.Xml.Dom.XmlDocument
$SerializedXml.LoadXml($RawXml.OuterXml)

$Toast = [Windows.UI.Notifications.ToastNotification]::new($SerializedXml)
$Toast.Tag = "{tag}"
$Toast.Group = "{tag}"
$Toast.ExpirationTime = [DateTimeOffset]::Now.AddSeconds({seconds})

$Notifier = [Windows.UI.Notifications.ToastNotificationManager]::CreateToastNotifier("{app}")
$Notifier.Show($Toast);
"#,
        title = title,
        message = message,
        tag = TOAST_TAG,
        seconds = seconds,
        app = TOAST_APP_NAME,
    )
}
