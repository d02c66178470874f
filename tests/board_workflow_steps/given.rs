//! Given steps for board workflow BDD scenarios.

use super::world::{BoardWorld, MANAGER, OWNER, caller, run_async};
use chrono::NaiveDate;
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskboard::workflow::{domain::Priority, services::TaskDraft};

#[given("a board with the default states")]
fn board_with_default_states(world: &mut BoardWorld) -> Result<(), eyre::Report> {
    let manager = caller(MANAGER);
    let project = run_async(world.projects.create(&manager, "Apollo", None))
        .wrap_err("create project for board scenario")?;
    let (board, _) = run_async(world.boards.create(&manager, project.id(), "main", "Main board"))
        .wrap_err("create board for board scenario")?;
    world.board = Some(board);
    Ok(())
}

#[given(r#"a task named "{name}" on the board"#)]
fn task_on_board(world: &mut BoardWorld, name: String) -> Result<(), eyre::Report> {
    let draft = TaskDraft {
        board_id: world.board()?.id(),
        name,
        description: "Collect the numbers".to_owned(),
        due_date: NaiveDate::from_ymd_opt(2026, 12, 31)
            .ok_or_else(|| eyre::eyre!("invalid due date"))?,
        priority: Priority::new(3)?,
    };
    let task = run_async(world.tasks.create(&caller(OWNER), draft))
        .wrap_err("create task for board scenario")?;
    world.task = Some(task);
    Ok(())
}
