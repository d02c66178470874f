//! Then steps for board workflow BDD scenarios.

use super::world::{BoardWorld, run_async};
use rstest_bdd_macros::then;

#[then(r#"the board states are "{codes}""#)]
fn board_states_are(world: &BoardWorld, codes: String) -> Result<(), eyre::Report> {
    let expected: Vec<&str> = codes.split(',').collect();
    let states = world.current_states()?;
    let actual: Vec<&str> = states.iter().map(|state| state.code()).collect();
    if actual != expected {
        return Err(eyre::eyre!("expected states {expected:?}, found {actual:?}"));
    }
    Ok(())
}

#[then("the board positions are contiguous")]
fn board_positions_are_contiguous(world: &BoardWorld) -> Result<(), eyre::Report> {
    let positions: Vec<u32> = world
        .current_states()?
        .iter()
        .map(|state| state.position().value())
        .collect();
    let expected: Vec<u32> = (1..).take(positions.len()).collect();
    if positions != expected {
        return Err(eyre::eyre!("positions are not contiguous: {positions:?}"));
    }
    Ok(())
}

#[then(r#"the task is in state "{code}""#)]
fn task_is_in_state(world: &BoardWorld, code: String) -> Result<(), eyre::Report> {
    let expected = world.state_by_code(&code)?;
    let task = run_async(world.tasks.get(world.task()?.id()))?.task;
    if task.state_id() != expected.id() {
        return Err(eyre::eyre!(
            "expected task in {code}, found state {}",
            task.state_id()
        ));
    }
    Ok(())
}

#[then("the task history has {count:usize} records")]
fn task_history_has(world: &BoardWorld, count: usize) -> Result<(), eyre::Report> {
    let history = run_async(world.tasks.history(world.task()?.id()))?;
    if history.len() != count {
        return Err(eyre::eyre!(
            "expected {count} history records, found {}",
            history.len()
        ));
    }
    Ok(())
}

#[then(r#"the operation fails with code "{code}""#)]
fn operation_fails_with(world: &BoardWorld, code: String) -> Result<(), eyre::Report> {
    let error = world
        .last_error
        .as_ref()
        .ok_or_else(|| eyre::eyre!("expected the operation to fail"))?;
    if error.code() != code {
        return Err(eyre::eyre!("expected {code}, got {} ({error})", error.code()));
    }
    Ok(())
}
