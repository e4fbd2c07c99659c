//! Interactive yes/no confirmation.
//!
//! A prompt is answered by exactly one line of input. An empty line selects
//! the stated default, `y` or `Y` accepts, anything else declines. End of
//! input or a read failure declines.
use async_trait::async_trait;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader,
    Stdin, Stdout,
};

#[cfg(test)]
use mockall::automock;

use crate::Result;

/// Answer used when the user just presses enter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultAnswer {
    Yes,
    No,
}

impl DefaultAnswer {
    fn hint(&self) -> &'static str {
        match self {
            Self::Yes => "[Y/n]",
            Self::No => "[y/N]",
        }
    }
}

/// Asks the user a yes/no question.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Prompter: Send {
    async fn confirm(
        &mut self,
        prompt: &str,
        default: DefaultAnswer,
    ) -> Result<bool>;
}

/// Interprets one line of input. `None` means no line could be read.
pub fn interpret_answer(input: Option<&str>, default: DefaultAnswer) -> bool {
    match input.map(str::trim) {
        None => false,
        Some("") => default == DefaultAnswer::Yes,
        Some(answer) => answer.eq_ignore_ascii_case("y"),
    }
}

/// Line-oriented [`Prompter`] over any async reader and writer.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl LinePrompter<BufReader<Stdin>, Stdout> {
    /// Prompter bound to the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> LinePrompter<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    async fn read_answer(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line).await {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line),
        }
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.output
    }
}

#[async_trait]
impl<R, W> Prompter for LinePrompter<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn confirm(
        &mut self,
        prompt: &str,
        default: DefaultAnswer,
    ) -> Result<bool> {
        let question = format!("? {} {} ", prompt, default.hint());
        self.output.write_all(question.as_bytes()).await?;
        self.output.flush().await?;

        let answer = self.read_answer().await;
        if answer.is_none() {
            // end the prompt line when input is closed
            self.output.write_all(b"\n").await?;
            self.output.flush().await?;
        }

        Ok(interpret_answer(answer.as_deref(), default))
    }
}
