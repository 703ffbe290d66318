//! A long-lived session: one `Context`, so cached queries are reused between commands.

use crate::args::{Command, ConsoleLine};
use crate::commands::run;
use crate::context::Context;
use crate::utils::split_args;
use crate::Result;
use clap::Parser;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, error};

const HELP: &str = "Type any lendbook command without the leading 'lendbook', e.g. 'company list'.
  back     return to the previous page
  cache    show cache statistics
  help     show this text
  exit     leave the console";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Reads commands from stdin until `exit` or end of input.
pub async fn console(ctx: &Context) -> Result<()> {
    println!("{HELP}");
    read_lines(ctx, BufReader::new(tokio::io::stdin())).await
}

async fn read_lines<R>(ctx: &Context, reader: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        print!("{}> ", ctx.navigator().current().await);
        // the prompt is cosmetic
        let _ = std::io::stdout().flush();
        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        if run_line(ctx, &line).await == Flow::Exit {
            break;
        }
    }
    Ok(())
}

async fn run_line(ctx: &Context, line: &str) -> Flow {
    let line = line.trim();
    match line {
        "" => {}
        "exit" | "quit" => return Flow::Exit,
        "help" => println!("{HELP}"),
        "back" => {
            let route = ctx.navigator().back().await;
            println!("{route}");
        }
        "cache" => {
            let stats = ctx.queries().cache_stats().await;
            println!("{stats:?}");
        }
        _ => match ConsoleLine::try_parse_from(split_args(line)) {
            Ok(parsed) => match parsed.command() {
                Command::Init(_) | Command::Console => {
                    error!("'{line}' cannot be run from the console")
                }
                command => {
                    debug!("Running {command:?}");
                    if let Err(e) = run(ctx, command).await {
                        error!("{e}");
                    }
                }
            },
            // clap renders its own usage and help text
            Err(e) => println!("{e}"),
        },
    }
    Flow::Continue
}
