//! Pipeline agent logging commands.
//!
//! The agent scans stdout for `##vso[...]` lines; `task.complete` sets the
//! task result shown on the pipeline run.

/// Logging commands are single-line; the agent's escapes keep them that way.
fn escape(message: &str) -> String {
    message
        .replace('%', "%AZP25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
        .replace(']', "%5D")
        .replace(';', "%3B")
}

fn failure_commands(message: &str) -> [String; 2] {
    let message = escape(message);
    [
        format!("##vso[task.logissue type=error]{message}"),
        format!("##vso[task.complete result=Failed;]{message}"),
    ]
}

/// Mark the task failed with `message`.
pub fn set_failed(message: &str) {
    for command in failure_commands(message) {
        println!("{command}");
    }
}
