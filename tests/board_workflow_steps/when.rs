//! When steps for board workflow BDD scenarios.

use super::world::{BoardWorld, MANAGER, OWNER, caller, run_async};
use rstest_bdd_macros::when;
use taskboard::workflow::domain::{MoveDirection, ReorderDirection};

#[when(r#"a manager inserts state "{code}" after "{previous}""#)]
fn insert_state_after(
    world: &mut BoardWorld,
    code: String,
    previous: String,
) -> Result<(), eyre::Report> {
    let board_id = world.board()?.id();
    let after = world.state_by_code(&previous)?;
    let name = code.replace('_', " ");
    if let Err(err) = run_async(world.states.insert(
        &caller(MANAGER),
        board_id,
        &name,
        &code,
        Some(after.id()),
    )) {
        world.last_error = Some(err);
    }
    Ok(())
}

#[when(r#"a manager moves state "{code}" up"#)]
fn move_state_up(world: &mut BoardWorld, code: String) -> Result<(), eyre::Report> {
    let state = world.state_by_code(&code)?;
    if let Err(err) = run_async(world.states.reorder(
        &caller(MANAGER),
        state.id(),
        ReorderDirection::Up,
    )) {
        world.last_error = Some(err);
    }
    Ok(())
}

#[when(r#"a manager removes state "{code}""#)]
fn remove_state(world: &mut BoardWorld, code: String) -> Result<(), eyre::Report> {
    let state = world.state_by_code(&code)?;
    if let Err(err) = run_async(world.states.remove(&caller(MANAGER), state.id())) {
        world.last_error = Some(err);
    }
    Ok(())
}

#[when("the owner moves the task forward {count:u32} times")]
fn move_task_forward(world: &mut BoardWorld, count: u32) -> Result<(), eyre::Report> {
    for _ in 0..count {
        move_task(world, MoveDirection::Forward)?;
    }
    Ok(())
}

#[when("the owner moves the task backward")]
fn move_task_backward(world: &mut BoardWorld) -> Result<(), eyre::Report> {
    move_task(world, MoveDirection::Backward)
}

fn move_task(world: &mut BoardWorld, direction: MoveDirection) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    match run_async(world.tasks.move_task(&caller(OWNER), task_id, direction)) {
        Ok(task) => world.task = Some(task),
        Err(err) => world.last_error = Some(err),
    }
    Ok(())
}
