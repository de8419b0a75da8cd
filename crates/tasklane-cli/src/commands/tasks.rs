use anyhow::{Result, anyhow, bail};
use colored::Colorize;
use tasklane_application::Route;
use tasklane_core::task::{NewTask, Task};

use super::context::AppContext;

/// Fails unless the dashboard is reachable with the current session.
fn require_dashboard(ctx: &AppContext) -> Result<()> {
    match ctx.land_on(Route::Dashboard) {
        Route::Dashboard => Ok(()),
        _ => bail!("Login required. Run `tasklane login` first."),
    }
}

/// Turns an unsuccessful controller operation into the error to report.
fn failure(ctx: &AppContext) -> anyhow::Error {
    if !ctx.session.is_authenticated() {
        return anyhow!("Session expired. Please log in again.");
    }
    match ctx.tasks.error_message() {
        Some(message) => anyhow!(message),
        None => anyhow!("The session changed before the server answered."),
    }
}

/// Loads the list and looks up `id` in it.
async fn find_task(ctx: &AppContext, id: &str) -> Result<Task> {
    if !ctx.tasks.refresh().await {
        return Err(failure(ctx));
    }
    ctx.tasks
        .tasks()
        .into_iter()
        .find(|t| t.id == id)
        .ok_or_else(|| anyhow!("No todo with id '{}'.", id))
}

pub(crate) fn format_task(task: &Task) -> String {
    let marker = if task.completed { "[x]" } else { "[ ]" };
    let title = if task.completed {
        task.title.strikethrough().dimmed().to_string()
    } else {
        task.title.bold().to_string()
    };

    let mut line = format!("{} {}  {}", marker, title, task.id.dimmed());
    if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
        line.push_str(&format!("\n    {}", description));
    }
    line
}

pub async fn list(ctx: &AppContext) -> Result<()> {
    require_dashboard(ctx)?;
    if !ctx.tasks.refresh().await {
        return Err(failure(ctx));
    }

    if let Some(user) = ctx.session.user() {
        println!("Welcome, {}", user.name.bold());
    }

    let tasks = ctx.tasks.tasks();
    if tasks.is_empty() {
        println!("No tasks yet. Add your first to-do with `tasklane add`.");
    }
    for task in &tasks {
        println!("{}", format_task(task));
    }
    println!("{} total", tasks.len());
    Ok(())
}

pub async fn add(ctx: &AppContext, title: String, description: Option<String>) -> Result<()> {
    require_dashboard(ctx)?;

    let mut fields = NewTask::new(title);
    if let Some(description) = description {
        fields = fields.with_description(description);
    }

    let created = ctx.tasks.create(fields).await.ok_or_else(|| failure(ctx))?;
    println!("{}", format!("Added: {}", created.title).green());
    println!("{}", format_task(&created));
    Ok(())
}

pub async fn toggle(ctx: &AppContext, id: &str) -> Result<()> {
    require_dashboard(ctx)?;

    let task = find_task(ctx, id).await?;
    let updated = ctx.tasks.toggle(&task).await.ok_or_else(|| failure(ctx))?;
    println!("{}", format_task(&updated));
    Ok(())
}

/// Without `--description` the current description is kept.
pub async fn edit(ctx: &AppContext, id: &str, title: &str, description: Option<&str>) -> Result<()> {
    require_dashboard(ctx)?;

    let current = find_task(ctx, id).await?;
    let description = description
        .or(current.description.as_deref())
        .unwrap_or_default();

    let updated = ctx
        .tasks
        .edit(id, title, description)
        .await
        .ok_or_else(|| failure(ctx))?;
    println!("{}", format_task(&updated));
    Ok(())
}

pub async fn remove(ctx: &AppContext, id: &str) -> Result<()> {
    require_dashboard(ctx)?;

    if !ctx.tasks.remove(id).await {
        return Err(failure(ctx));
    }
    println!("Deleted {}.", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_task_markers() {
        colored::control::set_override(false);

        let open = Task::new("t1", "Buy milk").with_description("2 litres");
        assert_eq!(format_task(&open), "[ ] Buy milk  t1\n    2 litres");

        let done = Task::new("t2", "Call Bob").with_completed(true);
        assert_eq!(format_task(&done), "[x] Call Bob  t2");
    }
}
