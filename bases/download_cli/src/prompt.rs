// bases/download_cli/src/prompt.rs
use std::io::{self, BufRead, Write};

/// Source of answers to interactive questions
pub trait Prompter {
    /// Show `question` and return the answer without its line ending
    fn ask(&mut self, question: &str) -> io::Result<String>;

    /// Yes/no question, only `y` or `Y` counts as yes
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        let answer = self.ask(&format!("{} (y/n): ", question))?;
        Ok(answer.trim().eq_ignore_ascii_case("y"))
    }
}

/// Reads answers from standard input
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        print!("{}", question);
        io::stdout().flush()?;

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(answer.trim_end_matches(['\r', '\n']).to_string())
    }
}
