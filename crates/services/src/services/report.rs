//! Sprint reporting: per-sprint history, burn-down projection, work
//! distribution and the roll-up summary.

use chrono::{NaiveDate, Utc};
use db::models::sprint::Sprint;
use db::models::task::{Task, TaskPriority, TaskStatus};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;
use uuid::Uuid;

use super::classify::{TaskKind, classify_title};

/// Reports cover at most this many sprints, newest first. Older sprints
/// stay in storage and out of the charts.
pub const REPORT_SPRINT_CAP: i64 = 10;

const BURNDOWN_POINTS: usize = 8;
const DAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

#[derive(Debug, Clone, Serialize)]
pub struct SprintStats {
    pub name: String,
    pub committed: i64,
    pub completed: i64,
    pub bugs: i64,
    pub tech_debt: f64,
    pub is_current: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BurndownPoint {
    pub day: &'static str,
    pub ideal: i64,
    pub remaining: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DistributionSlice {
    pub name: &'static str,
    pub value: i64,
    pub color: &'static str,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportSummary {
    pub avg_velocity: i64,
    pub completion_rate: i64,
    pub total_tasks: i64,
    pub bug_ratio: f64,
}

#[derive(Debug, Serialize)]
pub struct SprintReport {
    pub historical: Vec<SprintStats>,
    pub burndown: Vec<BurndownPoint>,
    pub distribution: Vec<DistributionSlice>,
    pub summary: ReportSummary,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn sprint_stats(sprint: &Sprint, tasks: &[&Task], today: NaiveDate) -> SprintStats {
    let committed = tasks.len() as i64;
    let completed = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Done)
        .count() as i64;
    let bugs = tasks
        .iter()
        .filter(|t| t.priority == TaskPriority::High && t.status != TaskStatus::Done)
        .count() as i64;
    let debt_items = tasks
        .iter()
        .filter(|t| t.title.contains("refactor") || t.title.contains("tech debt"))
        .count() as i64;

    SprintStats {
        name: sprint.title.clone(),
        committed,
        completed,
        bugs,
        tech_debt: round1(debt_items as f64 / committed.max(1) as f64 * 100.0),
        is_current: sprint.is_current(today),
    }
}

/// Eight-point burn-down over a Mon-anchored week, the 8th point wrapping
/// back to Monday. `remaining` decays at 70% of the ideal slope so the
/// projected line sits above the ideal one for an unfinished sprint.
fn burndown(current: Option<&SprintStats>) -> Vec<BurndownPoint> {
    let (committed, completed) = match current {
        Some(stats) if stats.committed > 0 => (stats.committed as f64, stats.completed as f64),
        _ => {
            return (0..BURNDOWN_POINTS)
                .map(|i| BurndownPoint {
                    day: DAY_LABELS[i % 7],
                    ideal: 0,
                    remaining: 0,
                })
                .collect();
        }
    };

    let remaining = committed - completed;
    (0..BURNDOWN_POINTS)
        .map(|i| {
            let frac = i as f64 / 7.0;
            BurndownPoint {
                day: DAY_LABELS[i % 7],
                ideal: (committed * (1.0 - frac)).max(0.0).round() as i64,
                remaining: (remaining - remaining * frac * 0.7).max(0.0).round() as i64,
            }
        })
        .collect()
}

/// Integer percentage shares per work category across the reported tasks.
/// An empty task set renders as a single all-features slice.
fn distribution<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Vec<DistributionSlice> {
    let mut counts: HashMap<TaskKind, i64> = HashMap::new();
    let mut total = 0i64;
    for task in tasks {
        *counts.entry(classify_title(&task.title)).or_default() += 1;
        total += 1;
    }

    if total == 0 {
        return vec![DistributionSlice {
            name: TaskKind::Features.label(),
            value: 100,
            color: TaskKind::Features.color(),
        }];
    }

    TaskKind::ALL
        .into_iter()
        .filter_map(|kind| {
            let count = *counts.get(&kind)?;
            Some(DistributionSlice {
                name: kind.label(),
                value: (count as f64 / total as f64 * 100.0).round() as i64,
                color: kind.color(),
            })
        })
        .collect()
}

fn summary(historical: &[SprintStats]) -> ReportSummary {
    if historical.is_empty() {
        return ReportSummary::default();
    }

    let committed: i64 = historical.iter().map(|s| s.committed).sum();
    let completed: i64 = historical.iter().map(|s| s.completed).sum();
    let bugs: i64 = historical.iter().map(|s| s.bugs).sum();

    ReportSummary {
        avg_velocity: (completed as f64 / historical.len() as f64).round() as i64,
        completion_rate: if committed > 0 {
            (completed as f64 / committed as f64 * 100.0).round() as i64
        } else {
            0
        },
        total_tasks: committed,
        bug_ratio: round1(bugs as f64 / committed.max(1) as f64 * 100.0),
    }
}

impl SprintReport {
    /// Assemble a report from already-loaded sprints (newest first) and
    /// their tasks.
    pub fn build(sprints: &[Sprint], tasks: &[Task], today: NaiveDate) -> SprintReport {
        if sprints.is_empty() {
            return SprintReport {
                historical: Vec::new(),
                burndown: Vec::new(),
                distribution: Vec::new(),
                summary: ReportSummary::default(),
            };
        }

        let mut by_sprint: HashMap<Uuid, Vec<&Task>> = HashMap::new();
        for task in tasks {
            if let Some(sprint_id) = task.sprint_id {
                by_sprint.entry(sprint_id).or_default().push(task);
            }
        }

        let historical: Vec<SprintStats> = sprints
            .iter()
            .map(|sprint| {
                let sprint_tasks = by_sprint.get(&sprint.id).map_or(&[][..], Vec::as_slice);
                sprint_stats(sprint, sprint_tasks, today)
            })
            .collect();

        // First current sprint in newest-first order drives the burn-down.
        let current = historical.iter().find(|s| s.is_current);

        SprintReport {
            burndown: burndown(current),
            distribution: distribution(tasks.iter().filter(|t| t.sprint_id.is_some())),
            summary: summary(&historical),
            historical,
        }
    }

    pub async fn fetch_for_user(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<SprintReport, sqlx::Error> {
        let sprints = Sprint::fetch_recent(pool, user_id, REPORT_SPRINT_CAP).await?;
        let sprint_ids: Vec<Uuid> = sprints.iter().map(|s| s.id).collect();
        let tasks = Task::fetch_for_sprints(pool, &sprint_ids).await?;
        Ok(SprintReport::build(
            &sprints,
            &tasks,
            Utc::now().date_naive(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn sprint(title: &str, start: &str, end: &str) -> Sprint {
        Sprint {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            project_title: "My Project".to_string(),
            title: title.to_string(),
            start_date: date(start),
            end_date: date(end),
            created_at: Utc::now(),
        }
    }

    fn task(sprint_id: Uuid, title: &str, status: TaskStatus, priority: TaskPriority) -> Task {
        Task {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: title.to_string(),
            priority,
            status,
            due_date: None,
            subtasks_total: 0,
            subtasks_completed: 0,
            sprint_id: Some(sprint_id),
            previous_status: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn no_sprints_means_an_empty_report() {
        let report = SprintReport::build(&[], &[], date("2026-08-28"));

        assert!(report.historical.is_empty());
        assert!(report.burndown.is_empty());
        assert!(report.distribution.is_empty());
        assert_eq!(report.summary.total_tasks, 0);
        assert_eq!(report.summary.avg_velocity, 0);
    }

    #[test]
    fn burndown_follows_the_decay_curves() {
        let s = sprint("Sprint 1", "2026-08-24", "2026-08-30");
        let mut tasks: Vec<Task> = (0..7)
            .map(|i| {
                task(
                    s.id,
                    &format!("task {i}"),
                    TaskStatus::Todo,
                    TaskPriority::Medium,
                )
            })
            .collect();
        for t in tasks.iter_mut().take(3) {
            t.status = TaskStatus::Done;
        }

        let report = SprintReport::build(&[s], &tasks, date("2026-08-28"));
        let burndown = &report.burndown;
        assert_eq!(burndown.len(), 8);

        // committed = 7, remaining = 4.
        assert_eq!(burndown[0], BurndownPoint { day: "Mon", ideal: 7, remaining: 4 });
        // i = 7: ideal hits zero, remaining decays by 70%: 4 - 4*0.7 = 1.2.
        assert_eq!(burndown[7], BurndownPoint { day: "Mon", ideal: 0, remaining: 1 });
        // Labels wrap after Sunday.
        assert_eq!(burndown[6].day, "Sun");
    }

    #[test]
    fn without_a_current_sprint_the_burndown_is_flat_zero() {
        let s = sprint("Sprint 1", "2026-07-01", "2026-07-07");
        let tasks = vec![task(s.id, "a", TaskStatus::Todo, TaskPriority::Medium)];

        let report = SprintReport::build(&[s], &tasks, date("2026-08-28"));
        assert_eq!(report.burndown.len(), 8);
        assert!(report.burndown.iter().all(|p| p.ideal == 0 && p.remaining == 0));
    }

    #[test]
    fn distribution_splits_by_title_keywords() {
        let s = sprint("Sprint 1", "2026-08-24", "2026-08-30");
        let tasks = vec![
            task(s.id, "bug fix", TaskStatus::Todo, TaskPriority::Medium),
            task(s.id, "bug fix again", TaskStatus::Todo, TaskPriority::Medium),
            task(s.id, "feature one", TaskStatus::Todo, TaskPriority::Medium),
            task(s.id, "feature two", TaskStatus::Todo, TaskPriority::Medium),
        ];

        let report = SprintReport::build(&[s], &tasks, date("2026-08-28"));
        let shares: HashMap<&str, i64> = report
            .distribution
            .iter()
            .map(|slice| (slice.name, slice.value))
            .collect();
        assert_eq!(shares["Bugs"], 50);
        assert_eq!(shares["Features"], 50);
    }

    #[test]
    fn empty_distribution_renders_a_features_placeholder() {
        let s = sprint("Sprint 1", "2026-08-24", "2026-08-30");
        let report = SprintReport::build(&[s], &[], date("2026-08-28"));

        assert_eq!(report.distribution.len(), 1);
        assert_eq!(report.distribution[0].name, "Features");
        assert_eq!(report.distribution[0].value, 100);
        assert_eq!(report.distribution[0].color, "#7c3aed");
    }

    #[test]
    fn summary_and_stats_aggregate_over_sprints() {
        let s1 = sprint("Sprint 1", "2026-08-24", "2026-08-30");
        let s2 = sprint("Sprint 0", "2026-08-17", "2026-08-23");
        let tasks = vec![
            task(s1.id, "refactor parser", TaskStatus::Done, TaskPriority::Medium),
            task(s1.id, "urgent bug", TaskStatus::Todo, TaskPriority::High),
            task(s1.id, "feature", TaskStatus::Done, TaskPriority::Low),
            task(s2.id, "another feature", TaskStatus::Done, TaskPriority::Medium),
        ];

        let report = SprintReport::build(&[s1, s2], &tasks, date("2026-08-28"));

        let current = &report.historical[0];
        assert!(current.is_current);
        assert_eq!(current.committed, 3);
        assert_eq!(current.completed, 2);
        assert_eq!(current.bugs, 1);
        assert_eq!(current.tech_debt, 33.3);

        assert_eq!(report.summary.total_tasks, 4);
        // (2 + 1) / 2 sprints = 1.5, rounded to 2.
        assert_eq!(report.summary.avg_velocity, 2);
        assert_eq!(report.summary.completion_rate, 75);
        assert_eq!(report.summary.bug_ratio, 25.0);
    }
}
