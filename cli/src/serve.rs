use std::io::{self, BufRead, Write};

use anyhow::Context;
use clap::Args;
use sweephint_protocol::ProtocolServer;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Force a seed instead of random
    #[arg(short, long)]
    pub seed: Option<u64>,
}

pub fn run(args: ServeArgs) -> anyhow::Result<()> {
    let seed = crate::resolve_seed(args.seed);
    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    serve(ProtocolServer::new(seed), stdin, stdout)
}

/// Answers one command per input line. Each response block ends with a blank
/// line; lines that do not parse are answered with `error: <reason>`.
fn serve(
    mut server: ProtocolServer,
    input: impl BufRead,
    mut output: impl Write,
) -> anyhow::Result<()> {
    for line in input.lines() {
        let line = line.context("Could not read command")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match server.handle_line(line) {
            Ok(response) => write!(output, "{response}")?,
            Err(err) => {
                log::warn!("rejected {line:?}: {err}");
                writeln!(output, "error: {err}")?;
            }
        }
        writeln!(output)?;
        output.flush()?;
    }
    log::debug!("input closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweephint_protocol::{Response, ResponseStatus, Verb};

    fn blocks(input: &str, seed: u64) -> Vec<String> {
        let mut output = Vec::new();
        serve(ProtocolServer::new(seed), input.as_bytes(), &mut output).unwrap();
        String::from_utf8(output)
            .unwrap()
            .split("\n\n")
            .filter(|block| !block.is_empty())
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn answers_each_command_with_a_block() {
        let blocks = blocks("new 1\n\nmap\nopen 4 4\n", 3);

        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0], "new: OK");
        let map = Response::parse(&blocks[1]).unwrap();
        assert_eq!(map.verb, Verb::Map);
        assert_eq!(map.grid.unwrap().size(), (9, 9));
        let open = Response::parse(&blocks[2]).unwrap();
        assert_ne!(open.status, ResponseStatus::Empty);
    }

    #[test]
    fn malformed_commands_do_not_stop_the_server() {
        let blocks = blocks("jump\nmap\n", 0);

        assert_eq!(blocks[0], "error: Unknown command \"jump\"");
        assert_eq!(
            Response::parse(&blocks[1]).unwrap().status,
            ResponseStatus::Error("No game in progress".to_owned())
        );
    }
}
