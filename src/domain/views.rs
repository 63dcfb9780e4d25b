use super::task::Task;

/// Keep open tasks whose title or list label contains `filter` (case-insensitive)
pub fn filter_open(tasks: Vec<Task>, filter: &str) -> Vec<Task> {
    if filter.is_empty() {
        return tasks;
    }
    let needle = filter.to_lowercase();
    tasks
        .into_iter()
        .filter(|t| {
            t.title.to_lowercase().contains(&needle)
                || t
                    .list_title
                    .as_deref()
                    .is_some_and(|list| list.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Keep done tasks whose title contains `filter` (case-insensitive)
pub fn filter_done(tasks: Vec<Task>, filter: &str) -> Vec<Task> {
    if filter.is_empty() {
        return tasks;
    }
    let needle = filter.to_lowercase();
    tasks
        .into_iter()
        .filter(|t| t.title.to_lowercase().contains(&needle))
        .collect()
}

/// Clamp a selection index into `[0, len-1]` (0 for an empty view)
pub fn clamp_index(index: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        index.min(len - 1)
    }
}

/// Format elapsed seconds as "HH:MM:SS" (negative values show as zero)
pub fn format_elapsed(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}
