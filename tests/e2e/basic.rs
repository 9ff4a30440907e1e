use super::*;

#[test]
fn schedule_single_edge() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write(
        "build.nudge",
        &[CAT_RULE, "build in : cat out", ""].join("\n"),
    )?;
    space.write("in", "hello")?;

    let out = space.run_expect(&mut nudge_command(vec!["out"]))?;
    assert_output_contains(&out, "cat in > out");
    assert_output_contains(&out, "1 command ready");
    Ok(())
}

#[test]
fn chain_prints_only_ready_step() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write(
        "build.nudge",
        &[CAT_RULE, "build a : cat b", "build b : cat c", ""].join("\n"),
    )?;
    space.write("a", "x")?;

    let out = space.run_expect(&mut nudge_command(vec!["c"]))?;
    assert_output_contains(&out, "cat a > b");
    assert_output_contains(&out, "1 command ready");
    // The downstream step awaits b; it is not dispensed in this layer.
    let stdout = std::str::from_utf8(&out.stdout)?;
    assert!(!stdout.contains("cat b > c"));
    Ok(())
}

#[test]
fn clean_target_no_work() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write(
        "build.nudge",
        &[CAT_RULE, "build : cat out", ""].join("\n"),
    )?;

    let out = space.run_expect(&mut nudge_command(vec!["out"]))?;
    assert_output_contains(&out, "nudge: no work to do");
    Ok(())
}

#[test]
fn explicit_manifest_path() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write(
        "other.manifest",
        &[CAT_RULE, "build in : cat out", ""].join("\n"),
    )?;
    space.write("in", "hello")?;

    let out = space.run_expect(&mut nudge_command(vec!["-f", "other.manifest", "out"]))?;
    assert_output_contains(&out, "cat in > out");
    Ok(())
}

#[test]
fn unknown_target() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("build.nudge", &[CAT_RULE, ""].join("\n"))?;

    let out = space.run(&mut nudge_command(vec!["nonesuch"]))?;
    assert!(!out.status.success());
    assert_output_contains(&out, "unknown target \"nonesuch\"");
    Ok(())
}

#[test]
fn no_targets() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("build.nudge", &[CAT_RULE, ""].join("\n"))?;

    let out = space.run(&mut nudge_command(vec![]))?;
    assert!(!out.status.success());
    assert_output_contains(&out, "nudge: error: no targets specified");
    Ok(())
}

#[test]
fn parse_error_reports_position() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("build.nudge", "xyz\n")?;

    let out = space.run(&mut nudge_command(vec!["out"]))?;
    assert!(!out.status.success());
    assert_output_contains(&out, "line 1, col 1: unknown token: xyz");
    Ok(())
}

#[test]
fn missing_manifest() -> anyhow::Result<()> {
    let space = TestSpace::new()?;

    let out = space.run(&mut nudge_command(vec!["out"]))?;
    assert!(!out.status.success());
    assert_output_contains(&out, "read build.nudge:");
    Ok(())
}
