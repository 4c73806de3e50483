use anyhow::{Context, Result, bail};
use colored::Colorize;
use std::io::{self, BufRead, Write};

/// Interactive choice between labelled values.
pub trait Selector {
    /// Present `options` as `(label, value)` pairs and return the chosen value.
    ///
    /// # Errors
    /// Implementations decide what an empty option set or aborted input means.
    fn select(&mut self, prompt: &str, options: &[(String, String)]) -> Result<String>;
}

/// Numbered menu read from a line-oriented input.
///
/// ```text
/// Choose a branch from widgets
///   1) main
///   2) dev
/// > 2
/// ```
pub struct TerminalSelector<R, W> {
    input: R,
    output: W,
}

impl TerminalSelector<io::StdinLock<'static>, io::Stderr> {
    /// Menu on stdin, rendered to stderr so stdout stays clean for results.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalSelector<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn render(&mut self, prompt: &str, options: &[(String, String)]) -> io::Result<()> {
        writeln!(self.output, "{}", prompt.bold())?;
        for (i, (label, _)) in options.iter().enumerate() {
            writeln!(self.output, "  {}) {}", (i + 1).to_string().cyan(), label)?;
        }
        Ok(())
    }
}

impl<R: BufRead, W: Write> Selector for TerminalSelector<R, W> {
    fn select(&mut self, prompt: &str, options: &[(String, String)]) -> Result<String> {
        if options.is_empty() {
            bail!("nothing to choose from: {}", prompt);
        }
        self.render(prompt, options)?;

        let mut line = String::new();
        loop {
            write!(self.output, "{} ", ">".green())?;
            self.output.flush()?;

            line.clear();
            let n = self
                .input
                .read_line(&mut line)
                .context("failed to read selection")?;
            if n == 0 {
                bail!("selection aborted");
            }

            match line.trim().parse::<usize>() {
                Ok(i) if (1..=options.len()).contains(&i) => return Ok(options[i - 1].1.clone()),
                _ => writeln!(
                    self.output,
                    "{} enter a number between 1 and {}",
                    "✘".red(),
                    options.len()
                )?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn opts(values: &[&str]) -> Vec<(String, String)> {
        values
            .iter()
            .map(|v| (v.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn returns_value_of_chosen_entry() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        let mut sel = TerminalSelector::new(Cursor::new("2\n"), &mut out);

        let got = sel.select("Choose a branch from widgets", &opts(&["main", "dev"])).unwrap();

        assert_eq!(got, "dev");
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("Choose a branch from widgets"));
        assert!(shown.contains("1) main"));
        assert!(shown.contains("2) dev"));
    }

    #[test]
    fn reprompts_on_invalid_input() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        let mut sel = TerminalSelector::new(Cursor::new("zero\n0\n3\n 1 \n"), &mut out);

        let got = sel.select("pick", &opts(&["main", "dev"])).unwrap();

        assert_eq!(got, "main");
        let shown = String::from_utf8(out).unwrap();
        assert_eq!(shown.matches("enter a number between 1 and 2").count(), 3);
    }

    #[test]
    fn eof_aborts_selection() {
        let mut sel = TerminalSelector::new(Cursor::new("9\n"), Vec::new());
        let err = sel.select("pick", &opts(&["main"])).unwrap_err();
        assert!(err.to_string().contains("selection aborted"));
    }

    #[test]
    fn empty_options_are_an_error() {
        let mut sel = TerminalSelector::new(Cursor::new("1\n"), Vec::new());
        assert!(sel.select("pick", &[]).is_err());
    }
}
