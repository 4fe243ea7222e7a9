use std::process::Command;

use crate::collaborators::{PowerAction, SystemControl, VolumeAction};
use crate::error::{AssistantError, Result};

/// Shell-backed system control. Volume and power go through the
/// platform's native tools; unsupported platforms degrade to a
/// "not supported" message rather than an error.
pub struct ShellSystemControl;

fn run(program: &str, args: &[&str]) -> Result<()> {
    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|e| AssistantError::collaborator("system control", e.to_string()))?;
    if status.success() {
        Ok(())
    } else {
        Err(AssistantError::collaborator(
            "system control",
            format!("{} exited with {}", program, status),
        ))
    }
}

fn spawn(program: &str, args: &[&str]) -> Result<()> {
    Command::new(program)
        .args(args)
        .spawn()
        .map(|_| ())
        .map_err(|e| AssistantError::collaborator("system control", e.to_string()))
}

/// Common application names mapped to Linux launch commands.
fn linux_app_command(app: &str) -> &str {
    match app.to_lowercase().as_str() {
        "chrome" => "google-chrome",
        "terminal" => "gnome-terminal",
        "calculator" => "gnome-calculator",
        "file manager" | "files" => "nautilus",
        "text editor" | "editor" => "gedit",
        "vscode" | "vs code" => "code",
        _ => "",
    }
}

impl SystemControl for ShellSystemControl {
    fn control_volume(&self, action: VolumeAction) -> Result<String> {
        match std::env::consts::OS {
            "linux" => {
                match action {
                    VolumeAction::Up => run("amixer", &["set", "Master", "5%+"])?,
                    VolumeAction::Down => run("amixer", &["set", "Master", "5%-"])?,
                    VolumeAction::Mute => run("amixer", &["set", "Master", "toggle"])?,
                    VolumeAction::Set(level) => {
                        let target = format!("{}%", level.min(100));
                        run("amixer", &["set", "Master", &target])?
                    }
                }
                Ok(match action {
                    VolumeAction::Up => "Volume increased".to_string(),
                    VolumeAction::Down => "Volume decreased".to_string(),
                    VolumeAction::Mute => "Volume toggled".to_string(),
                    VolumeAction::Set(level) => format!("Volume set to {}%", level.min(100)),
                })
            }
            "macos" => {
                let script = match action {
                    VolumeAction::Up => {
                        "set volume output volume (output volume of (get volume settings) + 10)"
                            .to_string()
                    }
                    VolumeAction::Down => {
                        "set volume output volume (output volume of (get volume settings) - 10)"
                            .to_string()
                    }
                    VolumeAction::Mute => "set volume with output muted".to_string(),
                    VolumeAction::Set(level) => {
                        format!("set volume output volume {}", level.min(100))
                    }
                };
                run("osascript", &["-e", &script])?;
                Ok(match action {
                    VolumeAction::Up => "Volume increased".to_string(),
                    VolumeAction::Down => "Volume decreased".to_string(),
                    VolumeAction::Mute => "Volume muted".to_string(),
                    VolumeAction::Set(level) => format!("Volume set to {}%", level.min(100)),
                })
            }
            os => Ok(format!("Volume control not implemented for {}", os)),
        }
    }

    fn launch_application(&self, app: &str) -> Result<String> {
        match std::env::consts::OS {
            "linux" => {
                let mapped = linux_app_command(app);
                let command = if mapped.is_empty() { app } else { mapped };
                spawn(command, &[])?;
                Ok(format!("Launched {}", app))
            }
            "macos" => {
                spawn("open", &["-a", app])?;
                Ok(format!("Launched {}", app))
            }
            "windows" => {
                spawn(app, &[])?;
                Ok(format!("Launched {}", app))
            }
            os => Ok(format!("Application launch not implemented for {}", os)),
        }
    }

    fn system_info(&self) -> Result<String> {
        let mut lines = vec![format!(
            "OS: {} ({})",
            std::env::consts::OS,
            std::env::consts::ARCH
        )];
        if let Some(load) = read_loadavg() {
            lines.push(format!("Load average: {}", load));
        }
        if let Some((used, total)) = read_memory() {
            lines.push(format!("Memory: {} MB used of {} MB", used, total));
        }
        if let Some(uptime) = read_uptime() {
            lines.push(format!("Uptime: {}", uptime));
        }
        Ok(lines.join("\n"))
    }

    fn power(&self, action: PowerAction) -> Result<String> {
        match std::env::consts::OS {
            "linux" => {
                match action {
                    PowerAction::Lock => run("loginctl", &["lock-session"])?,
                    PowerAction::Sleep => run("systemctl", &["suspend"])?,
                    PowerAction::Restart => run("systemctl", &["reboot"])?,
                    PowerAction::Shutdown => run("systemctl", &["poweroff"])?,
                }
                Ok(power_message(action))
            }
            "macos" => {
                match action {
                    PowerAction::Lock => run("pmset", &["displaysleepnow"])?,
                    PowerAction::Sleep => run("pmset", &["sleepnow"])?,
                    PowerAction::Restart => {
                        run("osascript", &["-e", "tell app \"System Events\" to restart"])?
                    }
                    PowerAction::Shutdown => {
                        run("osascript", &["-e", "tell app \"System Events\" to shut down"])?
                    }
                }
                Ok(power_message(action))
            }
            os => Ok(format!("Power management not implemented for {}", os)),
        }
    }
}

fn power_message(action: PowerAction) -> String {
    match action {
        PowerAction::Lock => "Screen locked".to_string(),
        PowerAction::Sleep => "System sleep initiated".to_string(),
        PowerAction::Restart => "System restart initiated".to_string(),
        PowerAction::Shutdown => "System shutdown initiated".to_string(),
    }
}

fn read_loadavg() -> Option<String> {
    let raw = std::fs::read_to_string("/proc/loadavg").ok()?;
    let fields: Vec<&str> = raw.split_whitespace().take(3).collect();
    if fields.len() == 3 {
        Some(fields.join(" "))
    } else {
        None
    }
}

fn read_memory() -> Option<(u64, u64)> {
    let raw = std::fs::read_to_string("/proc/meminfo").ok()?;
    let mut total_kb = None;
    let mut available_kb = None;
    for line in raw.lines() {
        if let Some(rest) = line.strip_prefix("MemTotal:") {
            total_kb = rest.trim().split_whitespace().next()?.parse::<u64>().ok();
        } else if let Some(rest) = line.strip_prefix("MemAvailable:") {
            available_kb = rest.trim().split_whitespace().next()?.parse::<u64>().ok();
        }
    }
    let total = total_kb?;
    let available = available_kb?;
    Some(((total - available) / 1024, total / 1024))
}

fn read_uptime() -> Option<String> {
    let raw = std::fs::read_to_string("/proc/uptime").ok()?;
    let seconds: f64 = raw.split_whitespace().next()?.parse().ok()?;
    let hours = (seconds / 3600.0) as u64;
    let minutes = ((seconds % 3600.0) / 60.0) as u64;
    Some(format!("{}h {}m", hours, minutes))
}
