use std::io::{self, BufRead, IsTerminal, Write};

use forgeops_core::Prompter;

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;

/// Asks on stderr and reads one line from stdin. Stdout carries the JSON
/// result and never sees prompt text.
pub struct StdinPrompter;

impl StdinPrompter {
    /// A prompter when stdin is a terminal, so CI runs never block.
    pub fn when_interactive() -> Option<Self> {
        io::stdin().is_terminal().then_some(StdinPrompter)
    }
}

impl Prompter for StdinPrompter {
    fn ask(&self, label: &str) -> Result<String, forgeops_core::Error> {
        ask_line(label, &mut io::stdin().lock(), &mut io::stderr())
    }
}

/// Writes `label` to `output` and reads one trimmed answer from `input`.
pub fn ask_line<R: BufRead, W: Write>(
    label: &str,
    input: &mut R,
    output: &mut W,
) -> Result<String, forgeops_core::Error> {
    write!(output, "{label}")
        .and_then(|_| output.flush())
        .map_err(|e| forgeops_core::Error::Prompt(e.to_string()))?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .map_err(|e| forgeops_core::Error::Prompt(e.to_string()))?;
    Ok(answer.trim().to_string())
}
