//! Dashboard summary: headline stats plus a short recent-activity feed.

use chrono::{Days, NaiveDate, Utc};
use db::models::sprint::Sprint;
use db::models::task::{Task, TaskStatus};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

const ACTIVITY_FETCH_LIMIT: i64 = 10;
const ACTIVITY_SHOWN: usize = 5;

#[derive(Debug, Default, Serialize)]
pub struct DashboardStats {
    pub open_tasks: i64,
    pub overdue: i64,
    pub sprints_active: i64,
    pub completed_this_week: i64,
    pub total_sprints: i64,
    pub completion_rate: i64,
}

#[derive(Debug, Serialize)]
pub struct ActivityEntry {
    pub message: String,
    pub when: String,
}

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub stats: DashboardStats,
    pub recent_activity: Vec<ActivityEntry>,
}

fn describe(task: &Task) -> String {
    match task.status {
        TaskStatus::Done => format!("Completed \"{}\"", task.title),
        TaskStatus::Progress => format!("Moved \"{}\" to In Progress", task.title),
        _ => format!("Created task \"{}\"", task.title),
    }
}

fn relative_day(created: NaiveDate, today: NaiveDate) -> String {
    match (today - created).num_days() {
        d if d <= 0 => "Today".to_string(),
        1 => "1 day ago".to_string(),
        d => format!("{d} days ago"),
    }
}

fn build_stats(tasks: &[Task], sprints: &[Sprint], today: NaiveDate) -> DashboardStats {
    let total = tasks.len() as i64;
    let done = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Done)
        .count() as i64;
    let week_ago = today - Days::new(7);

    DashboardStats {
        open_tasks: total - done,
        overdue: tasks
            .iter()
            .filter(|t| {
                t.status != TaskStatus::Done && t.due_date.is_some_and(|due| due < today)
            })
            .count() as i64,
        sprints_active: sprints.iter().filter(|s| s.is_current(today)).count() as i64,
        // No completion timestamp is stored, so the due date stands in for
        // "finished this week".
        completed_this_week: tasks
            .iter()
            .filter(|t| {
                t.status == TaskStatus::Done && t.due_date.is_some_and(|due| due >= week_ago)
            })
            .count() as i64,
        total_sprints: sprints.len() as i64,
        completion_rate: if total > 0 {
            (done as f64 / total as f64 * 100.0).round() as i64
        } else {
            0
        },
    }
}

fn build_activity(recent: &[Task], today: NaiveDate) -> Vec<ActivityEntry> {
    recent
        .iter()
        .take(ACTIVITY_SHOWN)
        .map(|task| ActivityEntry {
            message: describe(task),
            when: relative_day(task.created_at.date_naive(), today),
        })
        .collect()
}

impl DashboardSummary {
    pub async fn fetch_for_user(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<DashboardSummary, sqlx::Error> {
        let today = Utc::now().date_naive();
        let tasks = Task::fetch_for_user(pool, user_id).await?;
        let sprints = Sprint::fetch_for_user(pool, user_id).await?;
        let recent = Task::fetch_recent_for_user(pool, user_id, ACTIVITY_FETCH_LIMIT).await?;

        Ok(DashboardSummary {
            stats: build_stats(&tasks, &sprints, today),
            recent_activity: build_activity(&recent, today),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone};
    use db::models::task::TaskPriority;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn at(day: &str) -> DateTime<Utc> {
        Utc.from_utc_datetime(&date(day).and_hms_opt(9, 0, 0).unwrap())
    }

    fn task(title: &str, status: TaskStatus, due: Option<&str>, created: &str) -> Task {
        Task {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: title.to_string(),
            priority: TaskPriority::Medium,
            status,
            due_date: due.map(date),
            subtasks_total: 0,
            subtasks_completed: 0,
            sprint_id: None,
            previous_status: None,
            created_at: at(created),
            updated_at: at(created),
        }
    }

    #[test]
    fn stats_count_open_overdue_and_weekly_completions() {
        let today = date("2026-08-28");
        let tasks = vec![
            task("open", TaskStatus::Todo, Some("2026-09-01"), "2026-08-20"),
            task("late", TaskStatus::Progress, Some("2026-08-25"), "2026-08-20"),
            task("shipped", TaskStatus::Done, Some("2026-08-26"), "2026-08-20"),
            task("old win", TaskStatus::Done, Some("2026-08-01"), "2026-07-20"),
        ];
        let sprints = vec![
            Sprint {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                project_title: "My Project".to_string(),
                title: "Sprint 1".to_string(),
                start_date: date("2026-08-24"),
                end_date: date("2026-08-30"),
                created_at: at("2026-08-24"),
            },
            Sprint {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                project_title: "My Project".to_string(),
                title: "Sprint 0".to_string(),
                start_date: date("2026-08-01"),
                end_date: date("2026-08-07"),
                created_at: at("2026-08-01"),
            },
        ];

        let stats = build_stats(&tasks, &sprints, today);
        assert_eq!(stats.open_tasks, 2);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.sprints_active, 1);
        assert_eq!(stats.completed_this_week, 1);
        assert_eq!(stats.total_sprints, 2);
        assert_eq!(stats.completion_rate, 50);
    }

    #[test]
    fn no_tasks_gives_a_zero_completion_rate() {
        let stats = build_stats(&[], &[], date("2026-08-28"));
        assert_eq!(stats.completion_rate, 0);
        assert_eq!(stats.open_tasks, 0);
    }

    #[test]
    fn activity_messages_follow_task_status() {
        let today = date("2026-08-28");
        let recent = vec![
            task("Ship login", TaskStatus::Done, None, "2026-08-28"),
            task("Write docs", TaskStatus::Progress, None, "2026-08-27"),
            task("Plan sprint", TaskStatus::Todo, None, "2026-08-25"),
        ];

        let activity = build_activity(&recent, today);
        assert_eq!(activity[0].message, "Completed \"Ship login\"");
        assert_eq!(activity[0].when, "Today");
        assert_eq!(activity[1].message, "Moved \"Write docs\" to In Progress");
        assert_eq!(activity[1].when, "1 day ago");
        assert_eq!(activity[2].message, "Created task \"Plan sprint\"");
        assert_eq!(activity[2].when, "3 days ago");
    }

    #[test]
    fn activity_is_capped_at_five_entries() {
        let today = date("2026-08-28");
        let recent: Vec<Task> = (0..8)
            .map(|i| task(&format!("t{i}"), TaskStatus::Todo, None, "2026-08-28"))
            .collect();

        assert_eq!(build_activity(&recent, today).len(), 5);
    }
}
