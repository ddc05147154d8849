//! Event handling and status display

use console::Style;
use polyenv_events::{
    AppEvent, ArtifactEvent, DependencyEvent, EventMessage, GeneralEvent, PipelineEvent,
    RuntimeEvent, SourceEvent,
};
use polyenv_types::RuntimeState;

use crate::logging::log_event_with_tracing;

/// Turns the event stream into status lines on stderr
pub struct EventHandler {
    colors_enabled: bool,
    debug_enabled: bool,
    quiet: bool,
}

impl EventHandler {
    /// Create new event handler
    pub fn new(colors_enabled: bool, debug_enabled: bool, quiet: bool) -> Self {
        Self {
            colors_enabled,
            debug_enabled,
            quiet,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, message: EventMessage) {
        log_event_with_tracing(&message);
        if self.quiet {
            return;
        }

        match message.event {
            AppEvent::Pipeline(PipelineEvent::StageStarted { stage }) => {
                self.show_status(&format!("==> {stage}"));
            }
            AppEvent::Pipeline(PipelineEvent::StageFailed { stage, failure }) => {
                self.show_error(&format!("{stage} failed: {}", failure.message));
            }
            AppEvent::Pipeline(PipelineEvent::StageSkipped { stage }) => {
                self.show_muted(&format!("    {stage} skipped"));
            }
            AppEvent::Source(SourceEvent::Registered { source_id }) => {
                self.show_status(&format!("    trusted {source_id}"));
            }
            AppEvent::Runtime(RuntimeEvent::Installing { runtimes, packages }) => {
                let runtimes: Vec<String> = runtimes.iter().map(ToString::to_string).collect();
                self.show_status(&format!(
                    "    {} packages for python {}",
                    packages.len(),
                    runtimes.join(", ")
                ));
            }
            AppEvent::Runtime(RuntimeEvent::Probed { version, reported }) => {
                self.show_success(&format!("    python{version}: {reported}"));
            }
            AppEvent::Artifact(ArtifactEvent::Installed { path, mode }) => {
                self.show_success(&format!("    {} ({mode})", path.display()));
            }
            AppEvent::Artifact(ArtifactEvent::ChecksumSkipped { url }) => {
                self.show_warning(&format!("    no checksum pinned for {url}"));
            }
            AppEvent::Dependency(DependencyEvent::StateChanged { version, to, .. }) => {
                let line = format!("    python{version}: {to}");
                match to {
                    RuntimeState::DependenciesInstalled => self.show_success(&line),
                    RuntimeState::Failed => self.show_error(&line),
                    _ => self.show_status(&line),
                }
            }
            AppEvent::General(GeneralEvent::RetryScheduled {
                operation,
                attempt,
                max_attempts,
                error,
                ..
            }) => {
                self.show_warning(&format!(
                    "    {operation}: attempt {attempt}/{max_attempts} failed ({error}), retrying"
                ));
            }
            AppEvent::General(GeneralEvent::Warning { message, .. }) => {
                self.show_warning(&message);
            }
            AppEvent::General(GeneralEvent::Error { message, .. }) => {
                self.show_error(&message);
            }
            AppEvent::General(GeneralEvent::DebugLog { message, .. }) if self.debug_enabled => {
                self.show_muted(&format!("    {message}"));
            }
            _ => {}
        }
    }

    fn paint(&self, style: &Style, message: &str) -> String {
        if self.colors_enabled {
            style.apply_to(message).to_string()
        } else {
            message.to_string()
        }
    }

    fn show_status(&self, message: &str) {
        eprintln!("{}", self.paint(&Style::new().bold(), message));
    }

    fn show_success(&self, message: &str) {
        eprintln!("{}", self.paint(&Style::new().green(), message));
    }

    fn show_warning(&self, message: &str) {
        eprintln!("{}", self.paint(&Style::new().yellow(), message));
    }

    fn show_error(&self, message: &str) {
        eprintln!("{}", self.paint(&Style::new().red().bold(), message));
    }

    fn show_muted(&self, message: &str) {
        eprintln!("{}", self.paint(&Style::new().dim(), message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polyenv_types::Stage;

    #[test]
    fn test_paint_respects_color_choice() {
        let plain = EventHandler::new(false, false, false);
        assert_eq!(plain.paint(&Style::new().red(), "failed"), "failed");
    }

    #[test]
    fn test_handles_events_quietly() {
        let mut handler = EventHandler::new(false, false, true);
        handler.handle_event(EventMessage::from_event(AppEvent::Pipeline(
            PipelineEvent::StageStarted {
                stage: Stage::RegisterSource,
            },
        )));
    }
}
