//! Task CLI commands

use anyhow::Result;
use chrono::{NaiveDate, Utc};

use super::output::{pluralize_tasks, task_line, Output};
use crate::domain::{DueDateChange, Priority, SortMode, StatusFilter, Task, TaskId, TaskUpdate};
use crate::store::TodoApp;

pub fn add(
    app: &mut TodoApp,
    output: &Output,
    text: &str,
    priority: Priority,
    due: Option<NaiveDate>,
) -> Result<()> {
    let id = app.tasks.add_task(text, priority, due)?;
    report(app, output, &id, |task| {
        format!("Added task: {} - {}", task.id, task.text)
    });
    Ok(())
}

pub fn list(
    app: &mut TodoApp,
    output: &Output,
    filter: StatusFilter,
    search: Option<&str>,
    sort: SortMode,
) -> Result<()> {
    app.view.set_filter(filter);
    app.view.set_sort_mode(sort);
    if let Some(query) = search {
        app.view.set_search_query(query);
    }

    let visible = app.visible_tasks();
    output.verbose_ctx(
        "list",
        &format!("filter={}, sort={}, search={:?}", filter, sort, search),
    );

    if output.is_json() {
        output.data(&visible);
        return Ok(());
    }

    if visible.is_empty() {
        if app.tasks.is_empty() {
            println!("No tasks yet. Add one with `todo add <text>`.");
        } else {
            println!("No tasks match.");
        }
        return Ok(());
    }

    let now = Utc::now();
    for task in &visible {
        println!("{}", task_line(task, now));
    }

    println!();
    let total = app.tasks.len();
    if total > visible.len() {
        println!(
            "Showing {} of {}",
            pluralize_tasks(visible.len()),
            pluralize_tasks(total)
        );
    } else {
        println!("Showing {}", pluralize_tasks(visible.len()));
    }

    Ok(())
}

pub fn toggle(app: &mut TodoApp, output: &Output, id: &TaskId) -> Result<()> {
    app.tasks.toggle_task(id)?;
    report(app, output, id, |task| {
        if task.completed {
            format!("Completed task: {}", task.id)
        } else {
            format!("Reopened task: {}", task.id)
        }
    });
    Ok(())
}

pub fn edit(
    app: &mut TodoApp,
    output: &Output,
    id: &TaskId,
    text: &str,
    priority: Option<Priority>,
    due: DueDateChange,
) -> Result<()> {
    let mut update = TaskUpdate::text(text).with_due_date(due);
    if let Some(priority) = priority {
        update = update.with_priority(priority);
    }

    app.tasks.update_task(id, update)?;
    report(app, output, id, |task| {
        format!("Updated task: {} - {}", task.id, task.text)
    });
    Ok(())
}

pub fn set_priority(
    app: &mut TodoApp,
    output: &Output,
    id: &TaskId,
    priority: Priority,
) -> Result<()> {
    app.tasks.set_priority(id, priority)?;
    report(app, output, id, |task| {
        format!("Set priority of {} to {}", task.id, task.priority)
    });
    Ok(())
}

pub fn delete(app: &mut TodoApp, output: &Output, id: &TaskId) -> Result<()> {
    app.tasks.delete_task(id)?;

    if output.is_json() {
        output.data(&serde_json::json!({ "deleted": id.to_string() }));
    } else {
        output.success(&format!("Deleted task: {}", id));
    }
    Ok(())
}

pub fn clear_completed(app: &mut TodoApp, output: &Output) -> Result<()> {
    let removed = app.tasks.clear_completed();

    if output.is_json() {
        output.data(&serde_json::json!({ "removed": removed }));
    } else if removed == 0 {
        output.success("No completed tasks to clear");
    } else {
        output.success(&format!("Cleared {}", pluralize_tasks(removed)));
    }
    Ok(())
}

pub fn stats(app: &TodoApp, output: &Output) -> Result<()> {
    let stats = app.tasks.stats();

    if output.is_json() {
        output.data(&stats);
        return Ok(());
    }

    println!("Total:     {}", stats.total);
    println!("Active:    {}", stats.active);
    println!("Completed: {}", stats.completed);
    if stats.total > 0 {
        println!("Progress:  {}%", stats.completion_rate);
    }
    Ok(())
}

// Prints the changed task as JSON, or `message(task)` as text
fn report(
    app: &TodoApp,
    output: &Output,
    id: &TaskId,
    message: impl FnOnce(&Task) -> String,
) {
    if let Some(task) = app.tasks.get(id) {
        if output.is_json() {
            output.data(task);
        } else {
            output.success(&message(task));
        }
    }
}
