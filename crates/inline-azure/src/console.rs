//! Console output

use colored::Colorize;
use inline_azure_automation::OutputSink;

/// Where the sequencer writes its progress
///
/// Engine progress arrives through [`OutputSink::on_line`]; the sequencer's
/// own messages go through the methods below.
pub trait Console: OutputSink {
    /// Announce a step that is starting
    fn step(&self, message: &str);

    /// Report a finished step
    fn done(&self, message: &str);

    fn heading(&self, message: &str);

    fn line(&self, message: &str);
}

/// Writes everything to standard output
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutConsole;

impl OutputSink for StdoutConsole {
    fn on_line(&self, line: &str) {
        println!("{}", line);
    }
}

impl Console for StdoutConsole {
    fn step(&self, message: &str) {
        println!("{}", message.cyan());
    }

    fn done(&self, message: &str) {
        println!("{}", message.green());
    }

    fn heading(&self, message: &str) {
        println!("{}", message.bold());
    }

    fn line(&self, message: &str) {
        println!("{}", message);
    }
}
