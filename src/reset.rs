use crate::models::Checklist;

/// Reverts completed tasks to pending once per calendar day for checklists
/// that opted into daily reset. Returns true when the checklist changed.
///
/// Guarded by `last_reset_date`, so a second call for the same `today` is a
/// no-op.
pub fn auto_reset_checklist(checklist: &mut Checklist, today: &str) -> bool {
    if !checklist.auto_reset {
        return false;
    }
    if checklist.last_reset_date.as_deref() == Some(today) {
        return false;
    }

    let mut reopened = 0usize;
    for task in checklist.tasks.iter_mut().filter(|t| t.is_completed()) {
        task.reopen();
        reopened += 1;
    }
    checklist.last_reset_date = Some(today.to_string());
    log::info!(
        "reset: checklist_id={} date={} reopened={}",
        checklist.id,
        today,
        reopened
    );
    true
}

/// Returns the number of checklists that were reset.
pub fn auto_reset_all(checklists: &mut [Checklist], today: &str) -> usize {
    checklists
        .iter_mut()
        .map(|checklist| auto_reset_checklist(checklist, today))
        .filter(|changed| *changed)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Priority, Task, TaskStatus, Timestamp};

    fn stamp(raw: &str) -> Timestamp {
        raw.parse().unwrap()
    }

    fn task(id: &str, completed: bool) -> Task {
        let mut task = Task {
            id: id.to_string(),
            name: id.to_string(),
            scheduled_time: Some("09:00".to_string()),
            category_id: "c1".to_string(),
            priority: Priority::Normal,
            status: TaskStatus::Pending,
            notes: None,
            time_limit: None,
            created_at: stamp("2024-03-08T07:00:00Z"),
            completed_at: None,
        };
        if completed {
            task.complete(stamp("2024-03-08T09:05:00Z"));
        }
        task
    }

    fn checklist(auto_reset: bool, last_reset_date: Option<&str>) -> Checklist {
        Checklist {
            id: "cl1".to_string(),
            name: "Morning".to_string(),
            tasks: vec![task("a", true), task("b", false), task("c", true)],
            categories: vec![Category {
                id: "c1".to_string(),
                name: "General".to_string(),
                color: "#6b7280".to_string(),
            }],
            color: "#3b82f6".to_string(),
            auto_reset,
            last_reset_date: last_reset_date.map(str::to_string),
            notifications: true,
            created_at: stamp("2024-03-01T07:00:00Z"),
        }
    }

    #[test]
    fn reset_reopens_completed_tasks_and_records_the_date() {
        let mut list = checklist(true, Some("2024-03-08"));
        assert!(auto_reset_checklist(&mut list, "2024-03-09"));
        assert!(list.tasks.iter().all(|t| t.status == TaskStatus::Pending));
        assert!(list.tasks.iter().all(|t| t.completed_at.is_none()));
        assert_eq!(list.last_reset_date.as_deref(), Some("2024-03-09"));
    }

    #[test]
    fn reset_is_idempotent_within_a_day() {
        let mut list = checklist(true, None);
        assert!(auto_reset_checklist(&mut list, "2024-03-09"));

        list.tasks[1].complete(stamp("2024-03-09T10:00:00Z"));
        let before = list.clone();
        assert!(!auto_reset_checklist(&mut list, "2024-03-09"));
        assert_eq!(list, before);
        assert!(list.tasks[1].is_completed());
    }

    #[test]
    fn reset_skips_checklists_that_did_not_opt_in() {
        let mut list = checklist(false, Some("2024-03-01"));
        let before = list.clone();
        assert!(!auto_reset_checklist(&mut list, "2024-03-09"));
        assert_eq!(list, before);
    }

    #[test]
    fn reset_all_counts_changed_checklists() {
        let mut lists = vec![
            checklist(true, Some("2024-03-08")),
            checklist(false, None),
            checklist(true, Some("2024-03-09")),
        ];
        assert_eq!(auto_reset_all(&mut lists, "2024-03-09"), 1);
        assert_eq!(auto_reset_all(&mut lists, "2024-03-09"), 0);
        assert!(lists[1].tasks[0].is_completed());
        assert!(lists[2].tasks[0].is_completed());
    }
}
