use std::io::{BufRead, Write};

/// Yes/no confirmation from the operator.
pub trait Confirm {
    /// Ask `question`; `Ok(true)` only on an explicit yes.
    fn confirm(&self, question: &str) -> std::io::Result<bool>;
}

impl<C: Confirm + ?Sized> Confirm for &C {
    fn confirm(&self, question: &str) -> std::io::Result<bool> {
        (**self).confirm(question)
    }
}

/// Asks on stdout and reads the answer from stdin. Defaults to no.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompt;

impl Confirm for StdinPrompt {
    fn confirm(&self, question: &str) -> std::io::Result<bool> {
        print!("{question} [y/N] ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().lock().read_line(&mut input)?;

        Ok(is_yes(&input))
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim(), "y" | "Y" | "yes" | "YES" | "Yes")
}
