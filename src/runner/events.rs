use super::state::PipelineStage;
use tokio::sync::broadcast;

/// Pipeline progress events for real-time updates
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    RunStarted {
        run_id: String,
        url: String,
    },
    StageStarted {
        run_id: String,
        stage: PipelineStage,
    },
    StageFinished {
        run_id: String,
        stage: PipelineStage,
        duration_ms: u64,
    },
    RunFinished {
        run_id: String,
        duration_ms: u64,
    },
    RunFailed {
        run_id: String,
        stage: PipelineStage,
        error: String,
    },
}

impl PipelineEvent {
    pub fn run_id(&self) -> &str {
        match self {
            PipelineEvent::RunStarted { run_id, .. }
            | PipelineEvent::StageStarted { run_id, .. }
            | PipelineEvent::StageFinished { run_id, .. }
            | PipelineEvent::RunFinished { run_id, .. }
            | PipelineEvent::RunFailed { run_id, .. } => run_id,
        }
    }
}

/// Event emitter for broadcasting pipeline events
pub struct EventEmitter {
    sender: broadcast::Sender<PipelineEvent>,
}

impl EventEmitter {
    pub fn new() -> (Self, broadcast::Receiver<PipelineEvent>) {
        let (sender, receiver) = broadcast::channel(100);
        (Self { sender }, receiver)
    }

    /// Send to all subscribers. Having none is fine.
    pub fn emit(&self, event: PipelineEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }
}

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration as StdDuration;

/// Console event listener for printing real-time updates
pub struct ConsoleEventListener;

impl ConsoleEventListener {
    /// Render events until the channel closes or the run ends.
    pub async fn listen(mut receiver: broadcast::Receiver<PipelineEvent>) {
        use colored::Colorize;
        use std::io::IsTerminal;

        let draw_target = || {
            if std::io::stdout().is_terminal() {
                ProgressDrawTarget::stdout()
            } else {
                // Piped output: no escape codes
                ProgressDrawTarget::hidden()
            }
        };
        let spinner_style = ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", " "])
            .template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let mut spinner: Option<ProgressBar> = None;

        loop {
            let event = match receiver.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            };

            match event {
                PipelineEvent::RunStarted { url, .. } => {
                    println!("{} Testing {}", "▶".green().bold(), url.cyan());
                }
                PipelineEvent::StageStarted { stage, .. } => {
                    let pb = ProgressBar::with_draw_target(None, draw_target());
                    pb.set_style(spinner_style.clone());
                    pb.set_message(format!("{}...", stage.label()));
                    pb.enable_steady_tick(StdDuration::from_millis(80));
                    spinner = Some(pb);
                }
                PipelineEvent::StageFinished {
                    stage, duration_ms, ..
                } => {
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                    }
                    println!(
                        "  {} {} {}",
                        "✓".green(),
                        stage.label(),
                        format!("({}ms)", duration_ms).dimmed()
                    );
                }
                PipelineEvent::RunFinished { duration_ms, .. } => {
                    println!(
                        "{} Run finished in {}ms",
                        "✅".green(),
                        duration_ms.to_string().cyan()
                    );
                    break;
                }
                PipelineEvent::RunFailed { stage, error, .. } => {
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                    }
                    println!("  {} {}", "✗".red(), stage.label());
                    println!("{} {}", "❌".red(), error.red());
                    break;
                }
            }
        }
    }
}
