//! Manifest loading: drives the parser and applies its statements to a
//! build state.

use crate::fs::FileSystem;
use crate::graph::{Dir, State};
use crate::parse::{Parser, Statement};
use anyhow::{anyhow, bail};

/// Parse manifest text (nul-terminated) into a populated State.
pub fn parse(buf: &[u8]) -> anyhow::Result<State> {
    let mut parser = Parser::new(buf);
    let mut state = State::new();
    loop {
        let stmt = match parser.read() {
            Err(err) => bail!(parser.format_parse_error(err)),
            Ok(None) => break,
            Ok(Some(stmt)) => stmt,
        };
        match stmt {
            Statement::Rule(rule) => {
                state.add_parsed_rule(rule.name, rule.command.into_owned())?;
            }
            Statement::Build(build) => {
                let edge = state.add_edge_named(build.rule)?;
                for path in build.ins {
                    state.add_in_out(edge, Dir::In, path)?;
                }
                for path in build.outs {
                    state.add_in_out(edge, Dir::Out, path)?;
                }
            }
        }
    }
    Ok(state)
}

/// Read and parse the manifest at `path`.
pub fn read(fs: &dyn FileSystem, path: &str) -> anyhow::Result<State> {
    let mut bytes = fs.read(path).map_err(|err| anyhow!("read {}: {}", path, err))?;
    bytes.push(0);
    parse(&bytes)
}
