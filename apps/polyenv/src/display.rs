//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::Term;
use polyenv_ops::OperationResult;
use polyenv_types::{ColorChoice, ProvisionPlan, ProvisionReport, RuntimeState};
use std::io;

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    /// Color configuration
    color_choice: ColorChoice,
    /// Terminal instance
    term: Term,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool, color_choice: ColorChoice) -> Self {
        Self {
            json_output,
            color_choice,
            term: Term::stdout(),
        }
    }

    /// Render operation result
    pub fn render_result(&self, result: &OperationResult) -> io::Result<()> {
        if self.json_output {
            let json = result.to_json().map_err(io::Error::other)?;
            println!("{json}");
            return Ok(());
        }

        match result {
            OperationResult::ProvisionReport(report) => self.render_report(report),
            OperationResult::ProvisionPlan(plan) => self.render_plan(plan),
            OperationResult::Success(message) => {
                println!("{message}");
                Ok(())
            }
        }
    }

    fn colors_enabled(&self) -> bool {
        match self.color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.term.features().colors_supported(),
        }
    }

    fn table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if !self.colors_enabled() {
            table.force_no_tty();
        }
        table
    }

    fn state_cell(&self, state: RuntimeState) -> Cell {
        let cell = Cell::new(state.to_string());
        if !self.colors_enabled() {
            return cell;
        }
        match state {
            RuntimeState::DependenciesInstalled => cell.fg(Color::Green),
            RuntimeState::Failed => cell.fg(Color::Red),
            RuntimeState::Pending | RuntimeState::Bootstrapped => cell.fg(Color::Yellow),
        }
    }

    fn render_report(&self, report: &ProvisionReport) -> io::Result<()> {
        println!("Provisioned {} (run {})", report.base_image, report.run_id);
        println!();

        let mut runtimes = self.table();
        runtimes.set_header(vec![
            Cell::new("Runtime").add_attribute(Attribute::Bold),
            Cell::new("State").add_attribute(Attribute::Bold),
            Cell::new("Interpreter").add_attribute(Attribute::Bold),
            Cell::new("System packages").add_attribute(Attribute::Bold),
        ]);
        for runtime in &report.runtimes {
            let packages: Vec<&str> = runtime.packages.iter().map(|p| p.as_str()).collect();
            runtimes.add_row(vec![
                Cell::new(runtime.version.to_string()),
                self.state_cell(runtime.state),
                Cell::new(runtime.interpreter.as_deref().unwrap_or("-")),
                Cell::new(packages.join(" ")),
            ]);
        }
        println!("{runtimes}");

        let mut stages = self.table();
        stages.set_header(vec![
            Cell::new("Stage").add_attribute(Attribute::Bold),
            Cell::new("Duration").add_attribute(Attribute::Bold),
        ]);
        for stage in &report.stages {
            stages.add_row(vec![
                Cell::new(stage.stage.to_string()),
                Cell::new(format!("{}ms", stage.duration_ms)),
            ]);
        }
        println!("{stages}");

        println!(
            "Artifact: {} mode {} ({} bytes, blake3 {})",
            report.artifact.path.display(),
            report.artifact.mode,
            report.artifact.size,
            report.artifact.blake3
        );
        println!("Total: {}ms", report.duration_ms);
        Ok(())
    }

    fn render_plan(&self, plan: &ProvisionPlan) -> io::Result<()> {
        println!("Base image: {}", plan.base_image);
        println!("Trusted source: {}", plan.source);
        println!("Attempts per package operation: {}", plan.max_attempts);
        println!();

        let mut runtimes = self.table();
        runtimes.set_header(vec![
            Cell::new("Runtime").add_attribute(Attribute::Bold),
            Cell::new("System packages").add_attribute(Attribute::Bold),
        ]);
        for entry in &plan.runtimes.entries {
            let packages: Vec<&str> = entry.packages.iter().map(|p| p.as_str()).collect();
            runtimes.add_row(vec![
                Cell::new(entry.version.to_string()),
                Cell::new(packages.join(" ")),
            ]);
        }
        println!("{runtimes}");

        let dependencies: Vec<&str> = plan.dependencies.iter().map(|p| p.as_str()).collect();
        println!("Bootstrap: {}", plan.bootstrap_url);
        println!("Dependencies per runtime: {}", dependencies.join(" "));
        println!(
            "Artifact: {} -> {} (mode {})",
            plan.artifact_url,
            plan.artifact_path.display(),
            plan.artifact_mode
        );
        Ok(())
    }
}
