//! Colored output helpers for CLI
//!
//! Provides consistent, colored terminal output for the kidtutor-server CLI.

use owo_colors::OwoColorize;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Pick colored or plain output from the `--no-color` flag
    pub fn from_flag(no_color: bool) -> Self {
        if no_color {
            Self::no_color()
        } else {
            Self::new()
        }
    }

    /// Print the startup banner
    pub fn banner(&self) {
        if self.colored {
            println!(
                r#"
   {}
   {}
   {}
"#,
                " _  ___     _   _____      _             ".bright_cyan().bold(),
                "| |/ (_) __| | |_   _|   _| |_ ___  _ __ ".cyan().bold(),
                "| ' /| |/ _` |   | || | | | __/ _ \\| '__|".blue().bold(),
            );
            println!(
                "   {} {}\n",
                "Kid-friendly answers, one question at a time"
                    .bright_white()
                    .bold(),
                format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
            );
        } else {
            println!(
                "\n   Kid Tutor Server v{}\n   Kid-friendly answers, one question at a time\n",
                env!("CARGO_PKG_VERSION")
            );
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a header for a section
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// Print a model answer as a quoted block
    pub fn answer(&self, text: &str) {
        for line in text.lines() {
            if self.colored {
                println!("  {} {}", "│".bright_cyan(), line);
            } else {
                println!("  | {}", line);
            }
        }
    }

    /// Print a hint/tip message
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "💡".dimmed(), message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// Print newline
    pub fn newline(&self) {
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_new() {
        let output = Output::new();
        assert!(output.colored);
    }

    #[test]
    fn test_output_no_color() {
        let output = Output::no_color();
        assert!(!output.colored);
    }

    #[test]
    fn test_from_flag() {
        assert!(Output::from_flag(false).colored);
        assert!(!Output::from_flag(true).colored);
    }

    #[test]
    fn test_output_methods_no_panic() {
        for output in [Output::no_color(), Output::new()] {
            output.banner();
            output.success("test success");
            output.info("test info");
            output.warning("test warning");
            output.error("test error");
            output.header("Test Header");
            output.kv("key", "value");
            output.answer("line one\nline two");
            output.answer("");
            output.hint("hint message");
            output.newline();
        }
    }
}
