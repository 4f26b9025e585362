//! Console menu over the inbound port. Inquire prompts run on the blocking pool
//! so the admin server and the cron loop keep running underneath.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::FixedOffset;
use inquire::error::InquireError;
use inquire::ui::{Color, RenderConfig, Styled};
use inquire::{Confirm, Select, Text};
use tracing::warn;

use super::progress::with_spinner;
use crate::domain::SendOutcome;
use crate::ports::InputPort;

/// Amber prompt prefix and highlighted option, matching the banner.
pub fn apply_theme() {
    let amber = Color::Rgb {
        r: 0xf7,
        g: 0xb3,
        b: 0x2b,
    };
    let config = RenderConfig::default()
        .with_prompt_prefix(Styled::new("?").with_fg(amber))
        .with_highlighted_option_prefix(Styled::new(">").with_fg(amber));
    inquire::set_global_render_config(config);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    RunDaemon,
    SendNow,
    SendTest,
    WritePreview,
    NextSend,
    Activate,
    Deactivate,
    Uninstall,
    Exit,
}

impl Action {
    const ALL: [Action; 9] = [
        Action::RunDaemon,
        Action::SendNow,
        Action::SendTest,
        Action::WritePreview,
        Action::NextSend,
        Action::Activate,
        Action::Deactivate,
        Action::Uninstall,
        Action::Exit,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::RunDaemon => "Run daemon (Ctrl-C returns here)",
            Action::SendNow => "Send the digest now",
            Action::SendTest => "Send a test email",
            Action::WritePreview => "Write preview to file",
            Action::NextSend => "Show next scheduled send",
            Action::Activate => "Activate (defaults + schedule)",
            Action::Deactivate => "Deactivate (clear schedule)",
            Action::Uninstall => "Uninstall (delete settings and uploads)",
            Action::Exit => "Exit",
        })
    }
}

/// Run a blocking prompt off the async workers. `None` when the user cancels.
async fn prompt<T, F>(f: F) -> anyhow::Result<Option<T>>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, InquireError> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await? {
        Ok(v) => Ok(Some(v)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn describe(outcome: &SendOutcome) -> String {
    match outcome {
        SendOutcome::Disabled => "Newsletter is disabled; nothing sent.".to_string(),
        SendOutcome::Sent {
            report,
            items,
            subject,
        } => format!(
            "\"{}\": sent to {}/{} recipients, {} failed, {} items.",
            subject, report.sent, report.recipients, report.failed, items
        ),
    }
}

pub struct Console {
    port: Arc<dyn InputPort>,
    tz: FixedOffset,
    preview_path: PathBuf,
}

impl Console {
    pub fn new(port: Arc<dyn InputPort>, tz: FixedOffset, preview_path: PathBuf) -> Self {
        Self {
            port,
            tz,
            preview_path,
        }
    }

    /// Menu loop until Exit or a cancelled prompt. Failed actions are reported and the loop continues.
    pub async fn run(&self) -> anyhow::Result<()> {
        loop {
            let choice = prompt(|| {
                Select::new("What next?", Action::ALL.to_vec())
                    .with_page_size(Action::ALL.len())
                    .prompt()
            })
            .await?;
            let Some(action) = choice else {
                return Ok(());
            };
            if action == Action::Exit {
                return Ok(());
            }
            match self.handle(action).await {
                Ok(Some(message)) => println!("{}", message),
                Ok(None) => {}
                Err(e) => {
                    warn!(action = %action, error = %e, "console action failed");
                    println!("Failed: {:#}", e);
                }
            }
        }
    }

    async fn handle(&self, action: Action) -> anyhow::Result<Option<String>> {
        match action {
            Action::RunDaemon => {
                // The cron runner already ticks in the background; just hold the terminal.
                println!("Daemon running. Press Ctrl-C to return to the menu.");
                tokio::signal::ctrl_c().await?;
                Ok(Some("Back in the menu; the schedule keeps running.".to_string()))
            }
            Action::SendNow => {
                let outcome = with_spinner("Sending digest...", self.port.send_now()).await?;
                Ok(Some(describe(&outcome)))
            }
            Action::SendTest => {
                let Some(to) = prompt(|| Text::new("Send test to:").prompt()).await? else {
                    return Ok(None);
                };
                let outcome = with_spinner("Sending test...", self.port.send_test(&to)).await?;
                Ok(Some(describe(&outcome)))
            }
            Action::WritePreview => {
                let html = with_spinner("Rendering preview...", self.port.preview(&HashMap::new()))
                    .await?;
                tokio::fs::write(&self.preview_path, html)
                    .await
                    .with_context(|| format!("writing {}", self.preview_path.display()))?;
                Ok(Some(format!(
                    "Preview written to {}",
                    self.preview_path.display()
                )))
            }
            Action::NextSend => Ok(Some(match self.port.next_send().await? {
                Some(at) => format!(
                    "Next send: {}",
                    at.with_timezone(&self.tz).format("%A %d.%m.%Y %H:%M")
                ),
                None => "No send is scheduled.".to_string(),
            })),
            Action::Activate => {
                self.port.activate().await?;
                Ok(Some("Activated.".to_string()))
            }
            Action::Deactivate => {
                self.port.deactivate().await?;
                Ok(Some("Schedule cleared.".to_string()))
            }
            Action::Uninstall => {
                let confirmed = prompt(|| {
                    Confirm::new("Delete all digest settings and uploads?")
                        .with_default(false)
                        .prompt()
                })
                .await?;
                if confirmed != Some(true) {
                    return Ok(None);
                }
                self.port.uninstall().await?;
                Ok(Some("Uninstalled.".to_string()))
            }
            Action::Exit => Ok(None),
        }
    }
}
