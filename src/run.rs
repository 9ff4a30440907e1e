//! The command-line front-end.  It plays the two roles the core leaves to
//! its caller: the filesystem oracle (observing source mtimes) and the
//! command consumer (here a dry run that prints the schedule).

use crate::fs::{FileSystem, RealFileSystem};
use crate::graph::{MTime, NodeId};
use crate::{load, plan, trace};
use anyhow::anyhow;
use std::path::Path;

#[derive(argh::FromArgs)] // this struct generates the flags and --help output
/// nudge, an incremental build scheduler
struct Opts {
    /// chdir before running
    #[argh(option, short = 'C')]
    chdir: Option<String>,

    /// input build file [default=build.nudge]
    #[argh(option, short = 'f', default = "(\"build.nudge\".into())")]
    manifest: String,

    /// debugging tools
    #[argh(option, short = 'd')]
    debug: Option<String>,

    /// targets to schedule
    #[argh(positional)]
    targets: Vec<String>,
}

fn run_impl() -> anyhow::Result<i32> {
    let opts: Opts = argh::from_env();

    if let Some(debug) = opts.debug {
        match debug.as_str() {
            "list" => {
                println!("debug tools:");
                println!("  trace  generate json performance trace");
                return Ok(1);
            }
            "trace" => trace::open("trace.json")?,
            _ => anyhow::bail!("unknown -d {:?}, use -d list to list", debug),
        }
    }

    if let Some(dir) = opts.chdir {
        let dir = Path::new(&dir);
        std::env::set_current_dir(dir).map_err(|err| anyhow!("chdir {:?}: {}", dir, err))?;
    }

    if opts.targets.is_empty() {
        anyhow::bail!("no targets specified");
    }

    let fsys = RealFileSystem::new();
    let mut state = trace::scope("load", || load::read(&fsys, &opts.manifest))?;

    // Oracle phase: observe every source file (no producing edge).  Files
    // with a stamp are reported via touch; files we cannot see are marked
    // dirty directly so planning a target that needs them fails loudly.
    let sources: Vec<(NodeId, String)> = state
        .nodes()
        .filter(|(_, node)| node.in_edge.is_none())
        .map(|(id, node)| (id, state.file(node.file).path.clone()))
        .collect();
    for (node, path) in sources {
        match fsys
            .stat(&path)
            .map_err(|err| anyhow!("stat {}: {}", path, err))?
        {
            MTime::Stamp(mtime) => state.touch(&path, mtime),
            MTime::Unknown => state.mark_dirty(node),
        }
    }

    let mut plan = plan::Plan::new();
    trace::scope("plan", || -> anyhow::Result<()> {
        for name in &opts.targets {
            let node = state
                .lookup_node(name)
                .ok_or_else(|| anyhow!("unknown target {:?}", name))?;
            plan.add_target(&state, node)?;
        }
        Ok(())
    })?;

    let mut ran = 0;
    while let Some(edge) = plan.find_work() {
        println!("{}", state.evaluate_command(edge));
        ran += 1;
    }

    if ran == 0 {
        println!("nudge: no work to do");
    } else {
        println!(
            "nudge: {} command{} ready",
            ran,
            if ran == 1 { "" } else { "s" }
        );
    }

    Ok(0)
}

pub fn run() -> anyhow::Result<i32> {
    let res = run_impl();
    trace::close()?;
    res
}
