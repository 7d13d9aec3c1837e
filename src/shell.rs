//! Interactive session: one command per line against a single controller.
//!
//! The session starts with a silent stats refresh (errors are not shown),
//! then reads commands until EOF or `quit`. Inputs set with `k`,
//! `max-pages` and `add` persist between commands, the way form fields do.
//!
//! ```text
//! pdfs> max-pages 5
//! pdfs> upload ./papers/a.pdf ./papers/b.pdf
//! Uploaded: a.pdf (chars=18231)
//! Uploaded: b.pdf (chars=9120)
//! Upload complete.
//! pdfs> search attention is all you need
//! ```
//!
//! File paths are split on whitespace; paths containing spaces are not
//! supported here.

use anyhow::Result;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::api::Backend;
use crate::controller::{Controller, Outcome};
use crate::view::{OutputFormat, Sections};

const PROMPT: &str = "pdfs> ";

const HELP: &str = "\
Commands:
  search <query>        run a search with the current k
  k [n]                 set results per search (blank to use the default)
  max-pages [n]         set pages processed per PDF (blank to use the default)
  add <path>...         add PDFs to the selection
  files                 list the selection
  clear-files           empty the selection
  upload [path...]      upload the selection (or the given paths)
  load-demo             load the backend's demo PDFs
  reset                 clear the backend index and local panels
  stats                 refresh document counts
  help                  show this help
  quit                  leave the session";

/// Session options.
#[derive(Debug, Clone, Copy)]
pub struct ShellOptions {
    pub format: OutputFormat,
    /// Print a prompt before each line (when attached to a terminal).
    pub prompt: bool,
}

/// Run a session until EOF or `quit`.
pub async fn run<B, R, W>(
    controller: &Controller<B>,
    input: R,
    mut output: W,
    options: ShellOptions,
) -> Result<()>
where
    B: Backend,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    controller.init().await;
    let status = controller.status();
    if !status.is_empty() {
        output.write_all(format!("{}\n", status).as_bytes()).await?;
    }

    let mut lines = input.lines();
    loop {
        if options.prompt {
            output.write_all(PROMPT.as_bytes()).await?;
        }
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };

        let sections = match command {
            "quit" | "exit" => break,
            "help" => {
                output.write_all(format!("{}\n", HELP).as_bytes()).await?;
                continue;
            }
            "k" => {
                controller.update_controls(|c| c.k = rest.to_string());
                continue;
            }
            "max-pages" => {
                controller.update_controls(|c| c.max_pages = rest.to_string());
                continue;
            }
            "add" => {
                controller.update_controls(|c| c.files.extend(split_paths(rest)));
                continue;
            }
            "files" => {
                let files = controller.snapshot().controls.files;
                let listing = if files.is_empty() {
                    "(no files selected)\n".to_string()
                } else {
                    files
                        .iter()
                        .map(|f| format!("{}\n", f.display()))
                        .collect::<String>()
                };
                output.write_all(listing.as_bytes()).await?;
                continue;
            }
            "clear-files" => {
                controller.update_controls(|c| c.files.clear());
                continue;
            }
            "stats" => {
                controller.refresh_stats().await;
                Sections::STATUS_ONLY
            }
            "load-demo" => {
                report_busy(&mut output, controller.load_demo().await).await?;
                Sections::STATUS_ONLY
            }
            "reset" => {
                report_busy(&mut output, controller.reset().await).await?;
                Sections::LOG
            }
            "upload" => {
                if !rest.is_empty() {
                    controller.update_controls(|c| c.files = split_paths(rest));
                }
                report_busy(&mut output, controller.upload().await).await?;
                Sections::LOG
            }
            "search" => {
                controller.update_controls(|c| c.query = rest.to_string());
                report_busy(&mut output, controller.search().await).await?;
                Sections::RESULTS
            }
            other => {
                let msg = format!("Unknown command: {} (try `help`)\n", other);
                output.write_all(msg.as_bytes()).await?;
                continue;
            }
        };

        let report = controller.snapshot().report(sections, options.format);
        output.write_all(report.as_bytes()).await?;
    }

    output.flush().await?;
    Ok(())
}

async fn report_busy<W: AsyncWrite + Unpin>(output: &mut W, outcome: Outcome) -> Result<()> {
    if outcome == Outcome::Busy {
        output.write_all(b"(already running)\n").await?;
    }
    Ok(())
}

fn split_paths(rest: &str) -> Vec<PathBuf> {
    rest.split_whitespace().map(PathBuf::from).collect()
}
