//! Tests for behavior around missing files.

use super::*;

#[test]
fn missing_input() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write(
        "build.nudge",
        &[CAT_RULE, "build in : cat out", ""].join("\n"),
    )?;

    let out = space.run(&mut nudge_command(vec!["out"]))?;
    assert!(!out.status.success());
    assert_output_contains(&out, "input in missing");
    Ok(())
}

#[test]
fn missing_input_unrelated_to_target() -> anyhow::Result<()> {
    // A missing source only matters if the requested target needs it.
    let space = TestSpace::new()?;
    space.write(
        "build.nudge",
        &[
            CAT_RULE,
            "build gone : cat dead",
            "build in : cat out",
            "",
        ]
        .join("\n"),
    )?;
    space.write("in", "hello")?;

    let out = space.run_expect(&mut nudge_command(vec!["out"]))?;
    assert_output_contains(&out, "cat in > out");
    Ok(())
}
